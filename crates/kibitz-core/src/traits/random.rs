// SPDX-FileCopyrightText: 2026 Kibitz Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Source of the uniform draws behind trigger decisions.

/// Uniform samples in `[0, 1)`.
///
/// Injected into the trigger evaluator so tests can pin every decision.
pub trait RandomSource: Send + Sync {
    fn sample(&self) -> f64;
}
