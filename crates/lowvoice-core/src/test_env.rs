//! Test environment on Tokio's clock, so paused-time tests see virtual time
//! in both `now()` and `sleep()`.

use std::time::{Duration, Instant};

use rand::RngCore;

use crate::env::Environment;

#[derive(Clone, Default)]
pub(crate) struct TestEnv {
    /// Fixed output for every `random_bytes` call, if set.
    constant: Option<u8>,
}

impl TestEnv {
    /// Environment whose ids always collide.
    pub(crate) fn constant(byte: u8) -> Self {
        Self { constant: Some(byte) }
    }
}

impl Environment for TestEnv {
    fn now(&self) -> Instant {
        tokio::time::Instant::now().into_std()
    }

    fn unix_secs(&self) -> u64 {
        1_700_000_000
    }

    fn sleep(&self, duration: Duration) -> impl std::future::Future<Output = ()> + Send {
        tokio::time::sleep(duration)
    }

    fn random_bytes(&self, buffer: &mut [u8]) {
        match self.constant {
            Some(byte) => buffer.fill(byte),
            None => rand::thread_rng().fill_bytes(buffer),
        }
    }
}
