// SPDX-FileCopyrightText: 2026 Kibitz Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Operator HTTP API for the Kibitz bot.
//!
//! Exposes status, the pending message queue, behavior settings and the
//! start/stop controls of a [`kibitz_agent::BotService`] over JSON.

pub mod auth;
pub mod error;
pub mod handlers;
pub mod server;

pub use error::{ApiError, ErrorBody};
pub use server::{GatewayState, ServerConfig, build_router, start_server};
