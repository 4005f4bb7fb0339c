//! Vault and resolver configuration.

use std::{num::NonZeroUsize, time::Duration};

/// Default whisper lifetime.
pub const DEFAULT_TTL: Duration = Duration::from_secs(30 * 60);

/// Longest whisper lifetime the server accepts.
pub const MAX_TTL: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// Default number of handles the resolver remembers.
pub const DEFAULT_RESOLVER_CAPACITY: NonZeroUsize = match NonZeroUsize::new(1024) {
    Some(n) => n,
    None => NonZeroUsize::MIN,
};

/// Fixed configuration, read once at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VaultConfig {
    /// How long a whisper lives unless expired sooner.
    pub ttl: Duration,
    /// Resolver cache size in entries.
    pub resolver_capacity: NonZeroUsize,
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self { ttl: DEFAULT_TTL, resolver_capacity: DEFAULT_RESOLVER_CAPACITY }
    }
}

impl VaultConfig {
    /// Whole minutes of the TTL, rounded up, for user-facing notices.
    pub fn ttl_minutes(&self) -> u64 {
        self.ttl.as_secs().div_ceil(60)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = VaultConfig::default();
        assert_eq!(config.ttl, Duration::from_secs(1800));
        assert_eq!(config.resolver_capacity.get(), 1024);
        assert_eq!(config.ttl_minutes(), 30);
    }

    #[test]
    fn max_ttl_fits_the_clock() {
        assert!(std::time::Instant::now().checked_add(MAX_TTL).is_some());
        assert!(DEFAULT_TTL <= MAX_TTL);
    }

    #[test]
    fn ttl_minutes_rounds_up() {
        let config = VaultConfig { ttl: Duration::from_secs(61), ..Default::default() };
        assert_eq!(config.ttl_minutes(), 2);
    }
}
