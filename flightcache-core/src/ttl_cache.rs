use std::borrow::Borrow;
use std::fmt;
use std::hash::Hash;
use std::time::Duration;

use tracing::{debug, trace};

use crate::cache::{BoundedCache, Cache, Lookup, WriteMode};
use crate::cache_entry::AgedValue;
use crate::eviction_policy::{EvictionPolicy, Fifo, Lru, Policy};
#[cfg(feature = "stats")]
use crate::CacheStats;

/// A [`BoundedCache`] whose entries expire after a fixed `max_age`.
///
/// Every value is stored as an [`AgedValue`] stamped when it is written. A
/// stale entry is never returned: reads treat it as a miss and remove it, and
/// [`get_or_add`](Cache::get_or_add) recomputes it through the wrapped cache,
/// so concurrent recomputations of an expired key are still collapsed into
/// one.
///
/// The decorator owns no storage and no lock of its own.
///
/// # Expiry
///
/// What gets removed when a stale entry is found depends on the policy:
///
/// - **FIFO**: list order is insertion order, so everything behind a stale
///   entry is older and stale too. The entry and the whole run behind it are
///   cut off in a single truncation.
/// - **LRU**: position says nothing about age, so only the stale key is removed.
///
/// Overwrites re-stamp the value and, under FIFO, move it to the front so the
/// list keeps tracking age order.
///
/// # Examples
///
/// ```
/// use flightcache_core::{Cache, TtlFifoCache};
/// use std::thread;
/// use std::time::Duration;
///
/// let cache: TtlFifoCache<u32, u32, String> = TtlFifoCache::new(10, Duration::from_millis(20));
/// cache.add(3, 30);
/// cache.add(2, 20);
/// cache.add(1, 10);
///
/// thread::sleep(Duration::from_millis(40));
///
/// // touching the newest entry prunes the whole expired run
/// assert_eq!(cache.get(&1), None);
/// assert!(cache.is_empty());
/// ```
pub struct TtlCache<K: Eq + Hash, V, E, P = Lru> {
    inner: BoundedCache<K, AgedValue<V>, E, P>,
    max_age: Duration,
}

/// A [`TtlCache`] over a FIFO store, pruning expired runs in one step.
pub type TtlFifoCache<K, V, E> = TtlCache<K, V, E, Fifo>;

/// A [`TtlCache`] over an LRU store, expiring keys one at a time.
pub type TtlLruCache<K, V, E> = TtlCache<K, V, E, Lru>;

impl<K, V, E, P> TtlCache<K, V, E, P>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
    E: Clone + Send + 'static,
    P: Policy,
{
    /// Creates a cache of at most `max_entries` entries that expire once
    /// older than `max_age`.
    pub fn new(max_entries: usize, max_age: Duration) -> Self {
        let writes = WriteMode {
            front_on_overwrite: P::AGE_ORDERED,
            on_write: Some(AgedValue::refresh as fn(&mut AgedValue<V>)),
        };
        Self {
            inner: BoundedCache::with_write_mode(max_entries, writes),
            max_age,
        }
    }

    pub fn max_age(&self) -> Duration {
        self.max_age
    }

    pub fn max_entries(&self) -> usize {
        self.inner.max_entries()
    }

    pub fn policy(&self) -> EvictionPolicy {
        P::kind()
    }

    pub fn clear(&self) {
        self.inner.clear();
    }

    /// Removes every expired entry and returns how many were removed.
    ///
    /// Under FIFO the sweep stops at the newest expired entry; under LRU every
    /// entry is checked.
    pub fn remove_expired(&self) -> usize {
        let max_age = self.max_age;
        let removed = self.inner.remove_matching(|aged| aged.is_expired(max_age));
        self.record_expired(removed);
        removed
    }

    /// Shares the wrapped cache's counters. A stale hit counts as an
    /// expiration plus a miss.
    #[cfg(feature = "stats")]
    pub fn stats(&self) -> &CacheStats {
        self.inner.stats()
    }

    /// Removes the stale entry for `key` along with whatever the policy lets
    /// go with it.
    ///
    /// Staleness is checked again under the write lock, so an entry refreshed
    /// in the meantime survives.
    fn expire<Q>(&self, key: &Q)
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let max_age = self.max_age;
        let removed = if P::AGE_ORDERED {
            self.inner
                .truncate_from_if(key, |aged| aged.is_expired(max_age))
        } else {
            usize::from(self.inner.remove_if(key, |aged| aged.is_expired(max_age)))
        };
        self.record_expired(removed);
    }

    fn record_expired(&self, removed: usize) {
        if removed == 0 {
            return;
        }
        debug!(policy = P::NAME, removed, "pruned expired entries");
        #[cfg(feature = "stats")]
        self.inner.stats().record_expirations(removed as u64);
    }
}

impl<K, V, E, P> Cache<K, V, E> for TtlCache<K, V, E, P>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
    E: Clone + Send + 'static,
    P: Policy,
{
    fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        match self.inner.lookup(key) {
            Some(aged) if !aged.is_expired(self.max_age) => {
                self.inner.record_lookup(true);
                Some(aged.into_inner())
            }
            Some(_) => {
                trace!(policy = P::NAME, "stale entry treated as a miss");
                self.expire(key);
                self.inner.record_lookup(false);
                None
            }
            None => {
                self.inner.record_lookup(false);
                None
            }
        }
    }

    fn add(&self, key: K, value: V) {
        self.inner.add(key, AgedValue::new(value));
    }

    fn get_or_add<F>(&self, key: K, compute: F) -> Result<V, E>
    where
        F: FnOnce() -> Result<V, E> + Send + 'static,
    {
        let compute = move || compute().map(AgedValue::new);

        let compute = match self.inner.try_get_or_add(key.clone(), compute) {
            Ok(Lookup::Hit(aged, compute)) => {
                if !aged.is_expired(self.max_age) {
                    self.inner.record_lookup(true);
                    return Ok(aged.into_inner());
                }
                compute
            }
            Ok(Lookup::Computed(aged)) => {
                self.inner.record_lookup(false);
                return Ok(aged.into_inner());
            }
            Err(err) => {
                self.inner.record_lookup(false);
                return Err(err);
            }
        };

        // Stale hit: drop it and go through the wrapped cache once more.
        trace!(policy = P::NAME, "stale entry, recomputing");
        self.expire(&key);
        self.inner.record_lookup(false);
        match self.inner.try_get_or_add(key, compute)? {
            Lookup::Hit(aged, _) | Lookup::Computed(aged) => Ok(aged.into_inner()),
        }
    }

    fn delete<Q>(&self, key: &Q)
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.inner.delete(key);
    }

    /// Includes expired entries not yet detected.
    fn len(&self) -> usize {
        self.inner.len()
    }
}

impl<K: Eq + Hash, V, E, P> Clone for TtlCache<K, V, E, P> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            max_age: self.max_age,
        }
    }
}

impl<K, V, E, P> fmt::Debug for TtlCache<K, V, E, P>
where
    K: Eq + Hash + Clone,
    P: Policy,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TtlCache")
            .field("inner", &self.inner)
            .field("max_age", &self.max_age)
            .finish()
    }
}
