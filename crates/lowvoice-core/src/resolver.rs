//! Identity Resolver
//!
//! Turns a recipient handle into a display name for the creation notice.
//! Results (hits and misses alike) are memoized in a bounded LRU cache so
//! repeated notices for the same handle cost one lookup.
//!
//! The output is cosmetic. Authorization never consults the resolver.

use std::num::NonZeroUsize;

use async_trait::async_trait;
use lru::LruCache;
use tokio::sync::Mutex;

use crate::{error::LookupError, whisper::Handle};

/// Human-readable name shown next to a handle.
pub type DisplayName = String;

/// One network lookup of a handle's public profile.
#[async_trait]
pub trait ProfileLookup: Send + Sync {
    /// Fetch the display name for `handle`.
    async fn display_name(&self, handle: &Handle) -> Result<DisplayName, LookupError>;
}

/// Caching front for a `ProfileLookup`.
pub struct IdentityResolver<L> {
    lookup: L,
    cache: Mutex<LruCache<Handle, Option<DisplayName>>>,
}

impl<L: ProfileLookup> IdentityResolver<L> {
    /// Wrap `lookup` with a cache of `capacity` handles.
    pub fn new(lookup: L, capacity: NonZeroUsize) -> Self {
        Self { lookup, cache: Mutex::new(LruCache::new(capacity)) }
    }

    /// Resolve `handle`, or `None` on any failure.
    ///
    /// Never errors; failures are logged and cached like successes. The
    /// cache lock is released during the lookup, so two concurrent misses
    /// on one handle may both reach the network.
    pub async fn resolve(&self, handle: &Handle) -> Option<DisplayName> {
        if let Some(cached) = self.cache.lock().await.get(handle) {
            return cached.clone();
        }

        let resolved = match self.lookup.display_name(handle).await {
            Ok(name) => Some(name),
            Err(e) => {
                tracing::debug!(%handle, error = %e, "failed to resolve handle");
                None
            },
        };

        self.cache.lock().await.put(handle.clone(), resolved.clone());
        resolved
    }

    /// Number of cached handles.
    pub async fn cached(&self) -> usize {
        self.cache.lock().await.len()
    }
}

impl<L> std::fmt::Debug for IdentityResolver<L> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityResolver").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::{
        collections::HashMap,
        sync::{
            Arc,
            atomic::{AtomicUsize, Ordering},
        },
    };

    use super::*;

    /// Lookup backed by a fixed table, counting calls.
    #[derive(Clone, Default)]
    struct TableLookup {
        names: HashMap<String, String>,
        calls: Arc<AtomicUsize>,
    }

    impl TableLookup {
        fn with(names: &[(&str, &str)]) -> Self {
            Self {
                names: names.iter().map(|(h, n)| ((*h).to_string(), (*n).to_string())).collect(),
                calls: Arc::default(),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ProfileLookup for TableLookup {
        async fn display_name(&self, handle: &Handle) -> Result<DisplayName, LookupError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.names.get(handle.as_str()).cloned().ok_or(LookupError::NotFound)
        }
    }

    fn handle(s: &str) -> Handle {
        Handle::parse(s).unwrap()
    }

    fn capacity(n: usize) -> NonZeroUsize {
        NonZeroUsize::new(n).unwrap()
    }

    #[tokio::test]
    async fn resolves_known_handle() {
        let lookup = TableLookup::with(&[("bob", "Bob B.")]);
        let resolver = IdentityResolver::new(lookup, capacity(4));

        assert_eq!(resolver.resolve(&handle("bob")).await.as_deref(), Some("Bob B."));
    }

    #[tokio::test]
    async fn hit_skips_lookup() {
        let lookup = TableLookup::with(&[("bob", "Bob B.")]);
        let resolver = IdentityResolver::new(lookup.clone(), capacity(4));

        let first = resolver.resolve(&handle("bob")).await;
        let second = resolver.resolve(&handle("bob")).await;

        assert_eq!(first, second);
        assert_eq!(lookup.calls(), 1);
    }

    #[tokio::test]
    async fn miss_is_cached_too() {
        let lookup = TableLookup::default();
        let resolver = IdentityResolver::new(lookup.clone(), capacity(4));

        assert_eq!(resolver.resolve(&handle("ghost")).await, None);
        assert_eq!(resolver.resolve(&handle("ghost")).await, None);
        assert_eq!(lookup.calls(), 1);
    }

    #[tokio::test]
    async fn evicts_least_recently_used() {
        let lookup = TableLookup::with(&[("a", "A"), ("b", "B"), ("c", "C")]);
        let resolver = IdentityResolver::new(lookup.clone(), capacity(2));

        resolver.resolve(&handle("a")).await;
        resolver.resolve(&handle("b")).await;
        // Touch "a" so "b" is the eviction candidate.
        resolver.resolve(&handle("a")).await;
        resolver.resolve(&handle("c")).await;
        assert_eq!(lookup.calls(), 3);
        assert_eq!(resolver.cached().await, 2);

        resolver.resolve(&handle("a")).await;
        assert_eq!(lookup.calls(), 3);

        resolver.resolve(&handle("b")).await;
        assert_eq!(lookup.calls(), 4);
    }
}
