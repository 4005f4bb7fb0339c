//! Production Environment implementation using system time and RNG.
//!
//! This module provides `SystemEnv`, the production implementation of the
//! `Environment` trait that uses the Tokio clock and OS entropy.

use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use lowvoice_core::Environment;

/// Production environment using system time and cryptographic RNG.
///
/// This implementation:
/// - Uses Tokio's clock for `now()` (identical to `Instant::now()` unless a
///   test pauses time)
/// - Uses `tokio::time::sleep()` for expiry timers
/// - Uses `getrandom` for cryptographic randomness
///
/// # Security
///
/// Whisper ids carry 64 bits from `getrandom`, so they cannot be enumerated.
#[derive(Clone, Default)]
pub struct SystemEnv;

impl SystemEnv {
    /// Create a new system environment.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Environment for SystemEnv {
    fn now(&self) -> Instant {
        tokio::time::Instant::now().into_std()
    }

    fn unix_secs(&self) -> u64 {
        SystemTime::now().duration_since(UNIX_EPOCH).map_or(0, |d| d.as_secs())
    }

    fn sleep(&self, duration: Duration) -> impl std::future::Future<Output = ()> + Send {
        tokio::time::sleep(duration)
    }

    fn random_bytes(&self, buffer: &mut [u8]) {
        getrandom::fill(buffer).unwrap_or_else(|e| {
            // NOTE: Should never fail on supported platforms. Ids lose their
            // unpredictability but stay unique through the vault's collision
            // check.
            tracing::error!("getrandom failed: {}", e);
            buffer.fill(0);
        });
    }
}
