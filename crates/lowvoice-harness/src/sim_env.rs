//! Simulated environment.

use std::{
    sync::{Arc, Mutex, PoisonError},
    time::{Duration, Instant},
};

use lowvoice_core::Environment;
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Wall-clock origin reported by every `SimEnv` (2023-11-14T22:13:20Z).
pub const SIM_EPOCH_SECS: u64 = 1_700_000_000;

/// Deterministic environment for simulation.
///
/// - Time: Tokio's clock, which tests pause and advance by hand
/// - Randomness: ChaCha8 seeded at construction, shared across clones
///
/// Must be created and used inside a Tokio runtime.
#[derive(Clone)]
pub struct SimEnv {
    seed: u64,
    started: tokio::time::Instant,
    rng: Arc<Mutex<ChaCha8Rng>>,
}

impl SimEnv {
    /// Create an environment whose random stream is fixed by `seed`.
    pub fn with_seed(seed: u64) -> Self {
        tracing::debug!(seed, "simulation environment seeded");
        Self {
            seed,
            started: tokio::time::Instant::now(),
            rng: Arc::new(Mutex::new(ChaCha8Rng::seed_from_u64(seed))),
        }
    }

    /// Seed this environment was built with.
    pub fn seed(&self) -> u64 {
        self.seed
    }
}

impl Environment for SimEnv {
    fn now(&self) -> Instant {
        tokio::time::Instant::now().into_std()
    }

    fn unix_secs(&self) -> u64 {
        SIM_EPOCH_SECS + self.started.elapsed().as_secs()
    }

    fn sleep(&self, duration: Duration) -> impl std::future::Future<Output = ()> + Send {
        tokio::time::sleep(duration)
    }

    fn random_bytes(&self, buffer: &mut [u8]) {
        self.rng.lock().unwrap_or_else(PoisonError::into_inner).fill_bytes(buffer);
    }
}

impl std::fmt::Debug for SimEnv {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimEnv").field("seed", &self.seed).finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn same_seed_same_stream() {
        let a = SimEnv::with_seed(42);
        let b = SimEnv::with_seed(42);

        assert_eq!(a.random_u64(), b.random_u64());
        assert_eq!(a.random_u64(), b.random_u64());
    }

    #[tokio::test(start_paused = true)]
    async fn clones_share_the_stream() {
        let a = SimEnv::with_seed(7);
        let b = a.clone();
        let fresh = SimEnv::with_seed(7);

        let first = fresh.random_u64();
        let second = fresh.random_u64();
        assert_eq!(a.random_u64(), first);
        assert_eq!(b.random_u64(), second);
    }

    #[tokio::test(start_paused = true)]
    async fn wall_clock_follows_paused_time() {
        let env = SimEnv::with_seed(0);
        let before = env.now();
        assert_eq!(env.unix_secs(), SIM_EPOCH_SECS);

        tokio::time::advance(Duration::from_secs(90)).await;

        assert_eq!(env.unix_secs(), SIM_EPOCH_SECS + 90);
        assert_eq!(env.now() - before, Duration::from_secs(90));
    }
}
