// SPDX-FileCopyrightText: 2026 Kibitz Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapter trait definitions.
//!
//! All adapters extend the [`PluginAdapter`] base trait and use
//! `#[async_trait]` for dynamic dispatch compatibility.

pub mod adapter;
pub mod generator;
pub mod platform;
pub mod random;

pub use adapter::PluginAdapter;
pub use generator::GeneratorAdapter;
pub use platform::PlatformAdapter;
pub use random::RandomSource;
