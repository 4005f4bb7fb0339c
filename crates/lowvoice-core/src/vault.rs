//! Whisper Vault
//!
//! Owns every live whisper and its expiration timer.
//!
//! ## Responsibilities
//!
//! - Lifecycle: `ABSENT -> LIVE -> ABSENT`, one-shot per id
//! - Authorization: reveal/expire only for the sender or the named recipient
//! - Expiry: one armed timer per live id, disarmed atomically with deletion
//!
//! ## Design
//!
//! - Sharded map: each id hashes to one `Mutex<HashMap>`. Every operation on
//!   an id runs under that shard's lock, which linearizes create, peek,
//!   reveal, expire and timer fire for the id. Distinct ids rarely contend.
//! - Deadline check: a slot past its deadline is treated as absent (and
//!   swept) even if its timer task has not run yet.
//! - Timer tasks hold a `Weak` to the shared state, so a dropped vault turns
//!   pending fires into no-ops.

use std::{
    collections::HashMap,
    hash::{BuildHasher, RandomState},
    sync::{Arc, Mutex, MutexGuard, PoisonError, Weak},
    time::{Duration, Instant},
};

use crate::{
    env::Environment,
    error::{Denied, VaultError},
    scheduler::{Scheduler, TimerHandle},
    whisper::{Actor, Handle, Identity, SharedRecord, WhisperId, WhisperRecord},
};

/// Number of independently locked shards.
const SHARD_COUNT: usize = 16;

/// Id regeneration attempts before `create` gives up.
const MAX_ID_ATTEMPTS: u32 = 8;

/// A live record with its deadline and timer.
struct Slot {
    record: SharedRecord,
    expires_at: Instant,
    timer: Option<TimerHandle>,
}

impl Slot {
    fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }

    fn disarm(mut self) {
        if let Some(timer) = self.timer.take() {
            timer.disarm();
        }
    }
}

type Shard = HashMap<WhisperId, Slot>;

struct Shared<E> {
    shards: Box<[Mutex<Shard>]>,
    hasher: RandomState,
    scheduler: Scheduler<E>,
    env: E,
}

impl<E: Environment> Shared<E> {
    fn shard(&self, id: &WhisperId) -> MutexGuard<'_, Shard> {
        // Truncation is fine, only the low bits pick a shard.
        #[allow(clippy::cast_possible_truncation)]
        let index = self.hasher.hash_one(id) as usize % self.shards.len();
        // No code path panics while holding a shard lock.
        self.shards[index].lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Look up a live slot, sweeping it if its deadline has passed.
    fn live<'a>(&self, shard: &'a mut Shard, id: &WhisperId) -> Option<&'a Slot> {
        let now = self.env.now();
        if shard.get(id).is_some_and(|slot| slot.is_expired(now)) {
            if let Some(slot) = shard.remove(id) {
                tracing::debug!(whisper = %id, "whisper expired (deadline passed)");
                slot.disarm();
            }
            return None;
        }
        shard.get(id)
    }

    /// Timer callback.
    fn fire(&self, id: &WhisperId) {
        let removed = self.shard(id).remove(id);
        // The firing task's own handle is dropped, not aborted.
        if removed.is_some() {
            tracing::debug!(whisper = %id, "whisper expired (timer)");
        }
    }
}

impl<E> Drop for Shared<E> {
    fn drop(&mut self) {
        for shard in self.shards.iter_mut() {
            let shard = shard.get_mut().unwrap_or_else(PoisonError::into_inner);
            for (_, slot) in shard.drain() {
                if let Some(timer) = slot.timer {
                    timer.disarm();
                }
            }
        }
    }
}

/// Concurrent store of live whispers.
///
/// Cheap to clone; clones share state.
pub struct Vault<E: Environment> {
    shared: Arc<Shared<E>>,
}

impl<E: Environment> Clone for Vault<E> {
    fn clone(&self) -> Self {
        Self { shared: Arc::clone(&self.shared) }
    }
}

impl<E: Environment> Vault<E> {
    /// Create an empty vault.
    pub fn new(env: E) -> Self {
        let shards = (0..SHARD_COUNT).map(|_| Mutex::new(HashMap::new())).collect();
        Self {
            shared: Arc::new(Shared {
                shards,
                hasher: RandomState::new(),
                scheduler: Scheduler::new(env.clone()),
                env,
            }),
        }
    }

    /// Store a whisper and arm its expiration timer.
    ///
    /// Must be called from within a Tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns `VaultError::IdSpaceExhausted` if every generated id collided
    /// with a live one, or `VaultError::TtlOutOfRange` if the deadline does
    /// not fit the clock. Callers treat both as fatal.
    pub fn create(
        &self,
        sender: Identity,
        recipient: Handle,
        content: String,
        ttl: Duration,
    ) -> Result<WhisperId, VaultError> {
        let shared = &self.shared;
        let now = shared.env.now();
        let expires_at = now.checked_add(ttl).ok_or(VaultError::TtlOutOfRange { ttl })?;

        for _ in 0..MAX_ID_ATTEMPTS {
            let id = WhisperId::generate(&shared.env);
            let mut shard = shared.shard(&id);
            if shard.contains_key(&id) {
                tracing::warn!(whisper = %id, "whisper id collision, regenerating");
                continue;
            }

            let record = Arc::new(WhisperRecord {
                id: id.clone(),
                sender,
                recipient,
                content,
                created_at: now,
            });

            // Armed while the shard is locked: even a zero TTL fire has to
            // wait for the insert below.
            let weak: Weak<Shared<E>> = Arc::downgrade(shared);
            let fire_id = id.clone();
            let timer = shared.scheduler.arm(ttl, move || {
                if let Some(shared) = weak.upgrade() {
                    shared.fire(&fire_id);
                }
            });

            shard.insert(id.clone(), Slot { record, expires_at, timer: Some(timer) });
            tracing::debug!(whisper = %id, ttl_secs = ttl.as_secs(), "whisper created");
            return Ok(id);
        }

        Err(VaultError::IdSpaceExhausted { attempts: MAX_ID_ATTEMPTS })
    }

    /// Read a record without authorization.
    ///
    /// For callers that run their own access check. `None` covers both
    /// "never existed" and "expired".
    pub fn peek(&self, id: &WhisperId) -> Option<SharedRecord> {
        let mut shard = self.shared.shard(id);
        self.shared.live(&mut shard, id).map(|slot| Arc::clone(&slot.record))
    }

    /// Return the record to an authorized requester. Non-destructive.
    ///
    /// # Errors
    ///
    /// `Denied::NotFoundOrExpired` if the id is not live,
    /// `Denied::Unauthorized` if `actor` is neither sender nor recipient.
    pub fn reveal(&self, id: &WhisperId, actor: &Actor) -> Result<SharedRecord, Denied> {
        let mut shard = self.shared.shard(id);
        let slot = self.shared.live(&mut shard, id).ok_or(Denied::NotFoundOrExpired)?;
        if !slot.record.is_visible_to(actor) {
            return Err(Denied::Unauthorized);
        }
        Ok(Arc::clone(&slot.record))
    }

    /// Delete a whisper on request of an authorized actor.
    ///
    /// The timer is disarmed and the record removed under the same lock, so
    /// no reveal can observe the record once this returns `Ok`.
    ///
    /// # Errors
    ///
    /// Same as `reveal`; on error the record is untouched.
    pub fn expire(&self, id: &WhisperId, actor: &Actor) -> Result<(), Denied> {
        let mut shard = self.shared.shard(id);
        let slot = self.shared.live(&mut shard, id).ok_or(Denied::NotFoundOrExpired)?;
        if !slot.record.is_visible_to(actor) {
            return Err(Denied::Unauthorized);
        }
        if let Some(slot) = shard.remove(id) {
            slot.disarm();
        }
        tracing::debug!(whisper = %id, actor = %actor.id, "whisper expired (explicit)");
        Ok(())
    }

    /// Number of live whispers.
    pub fn len(&self) -> usize {
        let now = self.shared.env.now();
        self.shared
            .shards
            .iter()
            .map(|shard| {
                let shard = shard.lock().unwrap_or_else(PoisonError::into_inner);
                shard.values().filter(|slot| !slot.is_expired(now)).count()
            })
            .sum()
    }

    /// Whether no whisper is live.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<E: Environment> std::fmt::Debug for Vault<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Vault").field("live", &self.len()).finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{test_env::TestEnv, whisper::UserId};

    fn alice() -> Identity {
        Identity {
            id: UserId(1),
            handle: Some(Handle::parse("alice").unwrap()),
            name: "Alice".to_string(),
        }
    }

    fn bob() -> Actor {
        Actor { id: UserId(2), handle: Some(Handle::parse("bob").unwrap()) }
    }

    fn create(vault: &Vault<TestEnv>, ttl: Duration) -> WhisperId {
        vault.create(alice(), Handle::parse("bob").unwrap(), "hi".to_string(), ttl).unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn create_then_peek() {
        let vault = Vault::new(TestEnv::default());
        let id = create(&vault, Duration::from_secs(60));

        let record = vault.peek(&id).unwrap();
        assert_eq!(record.content, "hi");
        assert_eq!(record.recipient.as_str(), "bob");
        assert_eq!(vault.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn ids_are_unique() {
        let vault = Vault::new(TestEnv::default());
        let a = create(&vault, Duration::from_secs(60));
        let b = create(&vault, Duration::from_secs(60));
        assert_ne!(a, b);
        assert_eq!(vault.len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn collisions_exhaust_after_bounded_attempts() {
        let vault = Vault::new(TestEnv::constant(7));
        create(&vault, Duration::from_secs(60));

        let result =
            vault.create(alice(), Handle::parse("bob").unwrap(), "again".to_string(), Duration::ZERO);
        assert!(matches!(result, Err(VaultError::IdSpaceExhausted { attempts: MAX_ID_ATTEMPTS })));
        assert_eq!(vault.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn unrepresentable_ttl_is_rejected() {
        let vault = Vault::new(TestEnv::default());
        let ttl = Duration::from_secs(u64::MAX);

        let result = vault.create(alice(), Handle::parse("bob").unwrap(), "hi".to_string(), ttl);
        assert!(matches!(result, Err(VaultError::TtlOutOfRange { ttl: t }) if t == ttl));
        assert!(vault.is_empty());

        // Nothing was armed, and the vault keeps working.
        let id = create(&vault, Duration::from_secs(60));
        assert!(vault.peek(&id).is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn timer_removes_record() {
        let vault = Vault::new(TestEnv::default());
        let id = create(&vault, Duration::from_secs(1));

        tokio::time::sleep(Duration::from_millis(1500)).await;
        assert!(vault.peek(&id).is_none());
        assert!(vault.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn deadline_hides_record_before_timer_runs() {
        let vault = Vault::new(TestEnv::default());
        let id = create(&vault, Duration::from_secs(1));

        // Whether or not the timer task has run by now, the record is gone.
        tokio::time::advance(Duration::from_secs(2)).await;
        assert_eq!(vault.reveal(&id, &bob()), Err(Denied::NotFoundOrExpired));
    }

    #[tokio::test(start_paused = true)]
    async fn expire_disarms_timer() {
        let vault = Vault::new(TestEnv::default());
        let id = create(&vault, Duration::from_secs(10));

        vault.expire(&id, &bob()).unwrap();
        assert!(vault.peek(&id).is_none());

        tokio::time::sleep(Duration::from_secs(20)).await;
        assert!(vault.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn unauthorized_expire_leaves_record() {
        let vault = Vault::new(TestEnv::default());
        let id = create(&vault, Duration::from_secs(10));
        let eve = Actor { id: UserId(3), handle: Some(Handle::parse("eve").unwrap()) };

        assert_eq!(vault.expire(&id, &eve), Err(Denied::Unauthorized));
        assert!(vault.peek(&id).is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn unknown_id_is_not_found() {
        let vault = Vault::new(TestEnv::default());
        let id = WhisperId::parse("WHISPER-0-0000000000000000").unwrap();

        assert!(vault.peek(&id).is_none());
        assert_eq!(vault.reveal(&id, &bob()), Err(Denied::NotFoundOrExpired));
        assert_eq!(vault.expire(&id, &bob()), Err(Denied::NotFoundOrExpired));
    }

    #[tokio::test(start_paused = true)]
    async fn dropped_vault_ignores_pending_timers() {
        let vault = Vault::new(TestEnv::default());
        let _id = create(&vault, Duration::from_secs(1));
        drop(vault);

        tokio::time::sleep(Duration::from_secs(2)).await;
    }
}
