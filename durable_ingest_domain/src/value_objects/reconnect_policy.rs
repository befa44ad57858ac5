// /////////////////////////////////////////////////////////////////////////////
// Durable Ingest
// Copyright (c) 2025 Durable Ingest Contributors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Reconnect Policy
//!
//! Exponential backoff parameters consulted between reconnect attempts.
//! The policy is pure and stateless: given an attempt count it produces a
//! delay, with optional uniform jitter around the exponential base.
//!
//! ## Algorithm
//!
//! ```text
//! base = min(max_delay_ms, floor(initial_delay_ms * multiplier^attempt))
//! d    = jitter == 0 ? base
//!        : floor(uniform(max(0, base - base*jitter), base + base*jitter))
//! ```
//!
//! The delay is therefore bounded by `max_delay_ms * (1 + jitter)` for
//! every attempt count. The exponential is computed in `f64` and clamped
//! before flooring, so large attempt counts saturate at the cap instead of
//! overflowing.
//!
//! ## Defaults
//!
//! `initial_delay_ms = 500`, `max_delay_ms = 30_000`, `multiplier = 2.0`,
//! `jitter = 0.2`.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::IngestError;

/// Default initial reconnect delay, in milliseconds.
pub const DEFAULT_INITIAL_DELAY_MS: u64 = 500;
/// Default reconnect delay cap, in milliseconds.
pub const DEFAULT_MAX_DELAY_MS: u64 = 30_000;
/// Default exponential growth factor.
pub const DEFAULT_MULTIPLIER: f64 = 2.0;
/// Default jitter ratio.
pub const DEFAULT_JITTER: f64 = 0.2;

/// Backoff parameters for the reconnect loop.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconnectPolicy {
    /// Delay before the first retry, in milliseconds.
    pub initial_delay_ms: u64,
    /// Upper bound on the exponential base, in milliseconds.
    pub max_delay_ms: u64,
    /// Growth factor applied per attempt. Must be at least 1.
    pub multiplier: f64,
    /// Jitter ratio in `[0, 1]`, applied symmetrically around the base.
    pub jitter: f64,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            initial_delay_ms: DEFAULT_INITIAL_DELAY_MS,
            max_delay_ms: DEFAULT_MAX_DELAY_MS,
            multiplier: DEFAULT_MULTIPLIER,
            jitter: DEFAULT_JITTER,
        }
    }
}

impl ReconnectPolicy {
    /// Creates a validated policy.
    ///
    /// # Errors
    /// Returns [`IngestError::InvalidConfiguration`] when `multiplier < 1`,
    /// `jitter` lies outside `[0, 1]`, either is not finite, or
    /// `max_delay_ms < initial_delay_ms`.
    pub fn new(
        initial_delay_ms: u64,
        max_delay_ms: u64,
        multiplier: f64,
        jitter: f64,
    ) -> Result<Self, IngestError> {
        let policy = Self {
            initial_delay_ms,
            max_delay_ms,
            multiplier,
            jitter,
        };
        policy.validate()?;
        Ok(policy)
    }

    /// Validates the policy fields.
    pub fn validate(&self) -> Result<(), IngestError> {
        if !self.multiplier.is_finite() || self.multiplier < 1.0 {
            return Err(IngestError::invalid_config(format!(
                "reconnect multiplier must be a finite value >= 1, got {}",
                self.multiplier
            )));
        }
        if !self.jitter.is_finite() || !(0.0..=1.0).contains(&self.jitter) {
            return Err(IngestError::invalid_config(format!(
                "reconnect jitter must lie in [0, 1], got {}",
                self.jitter
            )));
        }
        if self.max_delay_ms < self.initial_delay_ms {
            return Err(IngestError::invalid_config(format!(
                "reconnect max delay {}ms is below initial delay {}ms",
                self.max_delay_ms, self.initial_delay_ms
            )));
        }
        Ok(())
    }

    /// Computes the delay before retry number `attempt` (zero-based).
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        self.delay_for_attempt_with_rng(attempt, &mut rand::rng())
    }

    /// Computes the delay using a caller-supplied RNG.
    ///
    /// Deterministic for `jitter == 0`; tests pass a seeded RNG to pin
    /// down the jittered path.
    pub fn delay_for_attempt_with_rng<R: Rng + ?Sized>(
        &self,
        attempt: u32,
        rng: &mut R,
    ) -> Duration {
        let exponential = (self.initial_delay_ms as f64) * self.multiplier.powi(attempt as i32);
        let base = exponential.min(self.max_delay_ms as f64).floor();

        let millis = if self.jitter > 0.0 && base > 0.0 {
            let spread = base * self.jitter;
            let low = (base - spread).max(0.0);
            let high = base + spread;
            rng.random_range(low..=high).floor()
        } else {
            base
        };

        Duration::from_millis(millis as u64)
    }
}
