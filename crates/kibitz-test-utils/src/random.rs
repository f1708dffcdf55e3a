// SPDX-FileCopyrightText: 2026 Kibitz Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use kibitz_core::RandomSource;

/// A random source pinned to one sample value.
///
/// `FixedRandom(0.0)` fires every trigger with a positive probability;
/// `FixedRandom(0.999)` fires only keyword replies and probabilities above 0.999.
#[derive(Debug, Clone, Copy)]
pub struct FixedRandom(pub f64);

impl RandomSource for FixedRandom {
    fn sample(&self) -> f64 {
        self.0
    }
}
