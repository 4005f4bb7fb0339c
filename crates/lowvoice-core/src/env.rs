//! Environment abstraction for deterministic testing.
//!
//! The `Environment` trait decouples vault logic from system resources
//! (clocks, timers, randomness). This enables:
//!
//! - Deterministic Simulation: a seeded RNG and Tokio's paused clock make
//!   whisper ids and expiry timing reproducible.
//!
//! - Production Runtime: the server crate plugs in OS entropy and the real
//!   clock without any change to the vault.
//!
//! # Invariants
//!
//! - Monotonicity: `env.now()` must never go backwards
//! - Determinism: Given the same seed, `random_bytes()` produces the same
//!   sequence
//! - Isolation: Implementations must not share global state

use std::time::{Duration, Instant};

/// Abstract environment providing time, randomness, and async sleeping.
///
/// # Safety
///
/// Implementations MUST guarantee:
///
/// 1. Time monotonicity: `now()` never goes backwards
/// 2. Clock agreement: a `sleep(d)` started at `t` completes no earlier than
///    the point where `now()` reports `t + d`
/// 3. RNG quality: `random_bytes()` uses cryptographically secure entropy in
///    production
pub trait Environment: Clone + Send + Sync + 'static {
    /// Returns the current monotonic time.
    ///
    /// Whisper deadlines are computed and checked against this clock.
    fn now(&self) -> Instant;

    /// Returns wall-clock seconds since the Unix epoch.
    ///
    /// Only used as the time component of whisper ids; never for deadlines.
    fn unix_secs(&self) -> u64;

    /// Sleeps for the specified duration.
    ///
    /// This is the only async method in the trait. The scheduler awaits it
    /// inside spawned timer tasks.
    fn sleep(&self, duration: Duration) -> impl std::future::Future<Output = ()> + Send;

    /// Fills the provided buffer with random bytes.
    ///
    /// # Security
    ///
    /// Production implementations MUST use OS entropy (`getrandom`).
    /// Simulation implementations MUST use a seeded RNG and log the seed.
    fn random_bytes(&self, buffer: &mut [u8]);

    /// Generates a random `u64`.
    fn random_u64(&self) -> u64 {
        let mut bytes = [0u8; 8];
        self.random_bytes(&mut bytes);
        u64::from_be_bytes(bytes)
    }
}
