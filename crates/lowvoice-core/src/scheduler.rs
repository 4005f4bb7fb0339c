//! Expiration scheduler.
//!
//! One Tokio task per armed timer. The task sleeps on the environment's
//! clock and then runs its callback; the returned `TimerHandle` cancels it.
//!
//! The scheduler itself is stateless. Ownership of handles (and therefore
//! the "at most one armed timer per id" invariant) lives with the vault,
//! which stores each handle in the same slot as its record.

use std::time::Duration;

use tokio::task::AbortHandle;

use crate::env::Environment;

/// Spawns cancellable delayed callbacks.
#[derive(Debug, Clone)]
pub struct Scheduler<E> {
    env: E,
}

impl<E: Environment> Scheduler<E> {
    /// Create a scheduler sleeping on `env`'s clock.
    pub fn new(env: E) -> Self {
        Self { env }
    }

    /// Run `on_fire` once `after` has elapsed, unless disarmed first.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn arm<F>(&self, after: Duration, on_fire: F) -> TimerHandle
    where
        F: FnOnce() + Send + 'static,
    {
        let env = self.env.clone();
        let task = tokio::spawn(async move {
            env.sleep(after).await;
            on_fire();
        });
        TimerHandle { abort: task.abort_handle() }
    }
}

/// Cancellation handle for one armed timer.
///
/// Dropping the handle leaves the timer armed; call `disarm` to cancel.
#[derive(Debug)]
pub struct TimerHandle {
    abort: AbortHandle,
}

impl TimerHandle {
    /// Cancel the timer. No-op if it already fired.
    pub fn disarm(self) {
        self.abort.abort();
    }

    /// Whether the timer task has completed or been cancelled.
    pub fn is_finished(&self) -> bool {
        self.abort.is_finished()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    };

    use super::*;
    use crate::test_env::TestEnv;

    #[tokio::test(start_paused = true)]
    async fn fires_after_delay() {
        let scheduler = Scheduler::new(TestEnv::default());
        let fired = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&fired);

        let _handle = scheduler.arm(Duration::from_secs(10), move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        tokio::time::sleep(Duration::from_secs(9)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn disarmed_timer_never_fires() {
        let scheduler = Scheduler::new(TestEnv::default());
        let fired = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&fired);

        let handle = scheduler.arm(Duration::from_secs(10), move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        handle.disarm();

        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn disarm_after_fire_is_noop() {
        let scheduler = Scheduler::new(TestEnv::default());
        let fired = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&fired);

        let handle = scheduler.arm(Duration::from_millis(5), move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(handle.is_finished());
        handle.disarm();
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }
}
