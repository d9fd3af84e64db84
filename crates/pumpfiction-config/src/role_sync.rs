//! Retry policy for writing an approved role into the role store.
//!
//! After an application is approved the user's role is written with bounded
//! exponential backoff. When every attempt fails the application keeps its
//! `role_sync = pending` marker and can be reconciled later.
//!
//! # Environment Variables
//!
//! - `ROLE_SYNC_MAX_ATTEMPTS`: total attempts, including the first (default: 3)
//! - `ROLE_SYNC_BASE_DELAY_MS`: delay before the first retry (default: 100)
//! - `ROLE_SYNC_MAX_DELAY_MS`: upper bound for any single delay (default: 2000)

use std::time::Duration;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RoleSyncConfig {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RoleSyncConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(100),
            max_delay: Duration::from_millis(2000),
        }
    }
}

impl RoleSyncConfig {
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            max_attempts: crate::env_or("ROLE_SYNC_MAX_ATTEMPTS", defaults.max_attempts).max(1),
            base_delay: Duration::from_millis(crate::env_or("ROLE_SYNC_BASE_DELAY_MS", 100)),
            max_delay: Duration::from_millis(crate::env_or("ROLE_SYNC_MAX_DELAY_MS", 2000)),
        }
    }

    /// A policy that never sleeps between attempts.
    #[must_use]
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
        }
    }

    /// Delay to wait after the failed attempt number `attempt` (1-based).
    #[must_use]
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        self.base_delay.saturating_mul(factor).min(self.max_delay)
    }
}
