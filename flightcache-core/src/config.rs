//! Construction-time configuration.
//!
//! A [`CacheConfig`] picks the bound, the eviction policy and, optionally, a
//! TTL. [`CacheConfig::build`] turns it into a [`ConfiguredCache`], which is
//! one of the four concrete cache types behind the uniform [`Cache`] trait.

use std::borrow::Borrow;
use std::fmt;
use std::hash::Hash;
use std::time::Duration;

use crate::cache::{Cache, FifoCache, LruCache};
use crate::eviction_policy::EvictionPolicy;
use crate::ttl_cache::{TtlFifoCache, TtlLruCache};
#[cfg(feature = "stats")]
use crate::CacheStats;

/// Default bound used by [`CacheConfig::default`].
pub const DEFAULT_MAX_ENTRIES: usize = 1000;

/// Configuration for a cache instance.
///
/// # Examples
///
/// ```
/// use flightcache_core::{Cache, CacheConfig, EvictionPolicy};
/// use std::time::Duration;
///
/// let config = CacheConfig::builder()
///     .max_entries(500)
///     .eviction_policy(EvictionPolicy::FIFO)
///     .max_age(Duration::from_secs(30))
///     .build();
///
/// let cache = config.build::<String, u64, String>();
/// cache.add("hits".to_string(), 1);
/// assert_eq!(cache.get("hits"), Some(1));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    /// Upper bound on live entries.
    pub max_entries: usize,

    /// Which entry is evicted when the bound is reached.
    pub eviction_policy: EvictionPolicy,

    /// Entries older than this are treated as absent (None = no expiration).
    pub max_age: Option<Duration>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: DEFAULT_MAX_ENTRIES,
            eviction_policy: EvictionPolicy::default(),
            max_age: None,
        }
    }
}

impl CacheConfig {
    pub fn builder() -> CacheConfigBuilder {
        CacheConfigBuilder::default()
    }

    /// Quick preset for a FIFO cache
    ///
    /// # Example
    /// ```
    /// use flightcache_core::{CacheConfig, EvictionPolicy};
    ///
    /// let config = CacheConfig::fifo(100);
    /// assert_eq!(config.eviction_policy, EvictionPolicy::FIFO);
    /// ```
    pub fn fifo(max_entries: usize) -> Self {
        Self {
            max_entries,
            eviction_policy: EvictionPolicy::FIFO,
            max_age: None,
        }
    }

    /// Quick preset for an LRU cache
    pub fn lru(max_entries: usize) -> Self {
        Self {
            max_entries,
            eviction_policy: EvictionPolicy::LRU,
            max_age: None,
        }
    }

    /// Same configuration with entries expiring after `max_age`.
    pub fn with_max_age(mut self, max_age: Duration) -> Self {
        self.max_age = Some(max_age);
        self
    }

    /// Builds the cache this configuration describes.
    pub fn build<K, V, E>(&self) -> ConfiguredCache<K, V, E>
    where
        K: Eq + Hash + Clone + Send + Sync + 'static,
        V: Clone + Send + Sync + 'static,
        E: Clone + Send + 'static,
    {
        let max_entries = self.max_entries;
        match (self.eviction_policy, self.max_age) {
            (EvictionPolicy::FIFO, None) => ConfiguredCache::Fifo(FifoCache::new(max_entries)),
            (EvictionPolicy::LRU, None) => ConfiguredCache::Lru(LruCache::new(max_entries)),
            (EvictionPolicy::FIFO, Some(max_age)) => {
                ConfiguredCache::TtlFifo(TtlFifoCache::new(max_entries, max_age))
            }
            (EvictionPolicy::LRU, Some(max_age)) => {
                ConfiguredCache::TtlLru(TtlLruCache::new(max_entries, max_age))
            }
        }
    }
}

/// Builder for CacheConfig with fluent API
#[derive(Debug, Default)]
pub struct CacheConfigBuilder {
    config: CacheConfig,
}

impl CacheConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn max_entries(mut self, max_entries: usize) -> Self {
        self.config.max_entries = max_entries;
        self
    }

    pub fn eviction_policy(mut self, policy: EvictionPolicy) -> Self {
        self.config.eviction_policy = policy;
        self
    }

    /// Enables expiry after `max_age`.
    pub fn max_age(mut self, max_age: Duration) -> Self {
        self.config.max_age = Some(max_age);
        self
    }

    pub fn build(self) -> CacheConfig {
        self.config
    }
}

/// A cache built from a [`CacheConfig`].
///
/// All four variants share the [`Cache`] interface, so callers that only
/// know the policy at runtime (from a config file, say) can still use one
/// type.
pub enum ConfiguredCache<K: Eq + Hash, V, E> {
    Fifo(FifoCache<K, V, E>),
    Lru(LruCache<K, V, E>),
    TtlFifo(TtlFifoCache<K, V, E>),
    TtlLru(TtlLruCache<K, V, E>),
}

macro_rules! dispatch {
    ($self:expr, $cache:ident => $body:expr) => {
        match $self {
            ConfiguredCache::Fifo($cache) => $body,
            ConfiguredCache::Lru($cache) => $body,
            ConfiguredCache::TtlFifo($cache) => $body,
            ConfiguredCache::TtlLru($cache) => $body,
        }
    };
}

impl<K, V, E> ConfiguredCache<K, V, E>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
    E: Clone + Send + 'static,
{
    pub fn policy(&self) -> EvictionPolicy {
        dispatch!(self, cache => cache.policy())
    }

    pub fn max_entries(&self) -> usize {
        dispatch!(self, cache => cache.max_entries())
    }

    pub fn max_age(&self) -> Option<Duration> {
        match self {
            ConfiguredCache::TtlFifo(cache) => Some(cache.max_age()),
            ConfiguredCache::TtlLru(cache) => Some(cache.max_age()),
            ConfiguredCache::Fifo(_) | ConfiguredCache::Lru(_) => None,
        }
    }

    /// Removes expired entries. Always `0` without a TTL.
    pub fn remove_expired(&self) -> usize {
        match self {
            ConfiguredCache::TtlFifo(cache) => cache.remove_expired(),
            ConfiguredCache::TtlLru(cache) => cache.remove_expired(),
            ConfiguredCache::Fifo(_) | ConfiguredCache::Lru(_) => 0,
        }
    }

    pub fn clear(&self) {
        dispatch!(self, cache => cache.clear())
    }

    #[cfg(feature = "stats")]
    pub fn stats(&self) -> &CacheStats {
        dispatch!(self, cache => cache.stats())
    }
}

impl<K, V, E> Cache<K, V, E> for ConfiguredCache<K, V, E>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
    E: Clone + Send + 'static,
{
    fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        dispatch!(self, cache => cache.get(key))
    }

    fn add(&self, key: K, value: V) {
        dispatch!(self, cache => cache.add(key, value))
    }

    fn get_or_add<F>(&self, key: K, compute: F) -> Result<V, E>
    where
        F: FnOnce() -> Result<V, E> + Send + 'static,
    {
        dispatch!(self, cache => cache.get_or_add(key, compute))
    }

    fn delete<Q>(&self, key: &Q)
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        dispatch!(self, cache => cache.delete(key))
    }

    fn len(&self) -> usize {
        dispatch!(self, cache => cache.len())
    }
}

impl<K: Eq + Hash, V, E> Clone for ConfiguredCache<K, V, E> {
    fn clone(&self) -> Self {
        match self {
            ConfiguredCache::Fifo(cache) => ConfiguredCache::Fifo(cache.clone()),
            ConfiguredCache::Lru(cache) => ConfiguredCache::Lru(cache.clone()),
            ConfiguredCache::TtlFifo(cache) => ConfiguredCache::TtlFifo(cache.clone()),
            ConfiguredCache::TtlLru(cache) => ConfiguredCache::TtlLru(cache.clone()),
        }
    }
}

impl<K: Eq + Hash + Clone, V, E> fmt::Debug for ConfiguredCache<K, V, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        dispatch!(self, cache => fmt::Debug::fmt(cache, f))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_cache_config_default() {
        let config = CacheConfig::default();
        assert_eq!(config.max_entries, DEFAULT_MAX_ENTRIES);
        assert_eq!(config.eviction_policy, EvictionPolicy::LRU);
        assert!(config.max_age.is_none());
    }

    #[test]
    fn test_presets() {
        let fifo = CacheConfig::fifo(10);
        assert_eq!(fifo.eviction_policy, EvictionPolicy::FIFO);
        assert_eq!(fifo.max_entries, 10);

        let lru = CacheConfig::lru(20).with_max_age(Duration::from_secs(5));
        assert_eq!(lru.eviction_policy, EvictionPolicy::LRU);
        assert_eq!(lru.max_age, Some(Duration::from_secs(5)));
    }

    #[test]
    fn test_builder() {
        let config = CacheConfigBuilder::new()
            .max_entries(42)
            .eviction_policy(EvictionPolicy::FIFO)
            .max_age(Duration::from_millis(250))
            .build();

        assert_eq!(
            config,
            CacheConfig {
                max_entries: 42,
                eviction_policy: EvictionPolicy::FIFO,
                max_age: Some(Duration::from_millis(250)),
            }
        );
    }

    #[test]
    fn test_build_picks_variant() {
        let plain = CacheConfig::fifo(5).build::<u32, u32, String>();
        assert!(matches!(plain, ConfiguredCache::Fifo(_)));
        assert_eq!(plain.max_age(), None);

        let aged = CacheConfig::lru(5)
            .with_max_age(Duration::from_secs(1))
            .build::<u32, u32, String>();
        assert!(matches!(aged, ConfiguredCache::TtlLru(_)));
        assert_eq!(aged.policy(), EvictionPolicy::LRU);
        assert_eq!(aged.max_entries(), 5);
    }

    #[test]
    fn test_built_cache_honours_policy() {
        let cache = CacheConfig::fifo(2).build::<u32, u32, String>();
        cache.add(1, 1);
        cache.add(2, 2);
        let _ = cache.get(&1);
        cache.add(3, 3);
        assert_eq!(cache.get(&1), None);

        let cache = CacheConfig::lru(2).build::<u32, u32, String>();
        cache.add(1, 1);
        cache.add(2, 2);
        let _ = cache.get(&1);
        cache.add(3, 3);
        assert_eq!(cache.get(&2), None);
        assert_eq!(cache.get(&1), Some(1));
    }

    #[test]
    fn test_built_ttl_cache_expires() {
        let cache = CacheConfig::fifo(10)
            .with_max_age(Duration::from_millis(20))
            .build::<u32, u32, String>();
        cache.add(2, 2);
        cache.add(1, 1);
        thread::sleep(Duration::from_millis(40));

        assert_eq!(cache.remove_expired(), 2);
        assert!(cache.is_empty());
        assert_eq!(cache.get_or_add(1, || Ok(7)), Ok(7));
    }
}
