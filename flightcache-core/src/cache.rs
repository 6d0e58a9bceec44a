use std::borrow::Borrow;
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, trace};

use crate::eviction_policy::{EvictionPolicy, Fifo, Lru, Policy};
use crate::single_flight::SingleFlight;
use crate::store::BoundedStore;
#[cfg(feature = "stats")]
use crate::CacheStats;

/// The operations shared by every cache in this crate.
///
/// Implemented by [`BoundedCache`], [`TtlCache`](crate::TtlCache) and
/// [`ConfiguredCache`](crate::ConfiguredCache), so call sites can be written
/// once against any of them.
///
/// Compute functions are supplied per call. They take no arguments (capture
/// what you need) and run at most once per concurrent burst of misses for a
/// key.
pub trait Cache<K, V, E> {
    /// Returns a clone of the cached value, if present.
    fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized;

    /// Inserts or overwrites `key` without consulting any compute function.
    fn add(&self, key: K, value: V);

    /// Returns the cached value, or computes, caches and returns it.
    ///
    /// Concurrent misses for the same key share one execution of `compute`
    /// and all observe the same outcome. A failed computation is returned to
    /// every waiter and never cached, so the next call retries.
    fn get_or_add<F>(&self, key: K, compute: F) -> Result<V, E>
    where
        F: FnOnce() -> Result<V, E> + Send + 'static;

    /// Removes `key`. Absent keys are a no-op.
    fn delete<Q>(&self, key: &Q)
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Like [`get_or_add`](Self::get_or_add), for compute functions that are
    /// known never to fail.
    ///
    /// # Panics
    ///
    /// Panics if `compute` returns an error. Use `get_or_add` when failures
    /// have to be handled.
    fn must_get_or_add<F>(&self, key: K, compute: F) -> V
    where
        F: FnOnce() -> Result<V, E> + Send + 'static,
        E: fmt::Debug,
    {
        match self.get_or_add(key, compute) {
            Ok(value) => value,
            Err(err) => panic!("must_get_or_add: compute function failed: {err:?}"),
        }
    }

    /// Returns the cached value, or `V::default()` when absent.
    fn get_or_default<Q>(&self, key: &Q) -> V
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
        V: Default,
    {
        self.get(key).unwrap_or_default()
    }
}

/// How values are written into the store.
pub(crate) struct WriteMode<V> {
    /// Overwrites move the entry to the front even under FIFO.
    pub(crate) front_on_overwrite: bool,
    /// Applied to every value under the write lock, right before it is stored.
    pub(crate) on_write: Option<fn(&mut V)>,
}

impl<V> Default for WriteMode<V> {
    fn default() -> Self {
        Self {
            front_on_overwrite: false,
            on_write: None,
        }
    }
}

/// Outcome of a lookup that may have triggered a computation.
pub(crate) enum Lookup<V, F> {
    /// Served from the store; the unused compute function is handed back.
    Hit(V, F),
    /// Produced by a (possibly shared) computation and stored.
    Computed(V),
}

struct Inner<K: Eq + Hash, V, E, P> {
    store: RwLock<BoundedStore<K, V, P>>,
    flights: SingleFlight<K, V, E>,
    writes: WriteMode<V>,
    #[cfg(feature = "stats")]
    stats: CacheStats,
}

impl<K, V, E, P> Inner<K, V, E, P>
where
    K: Eq + Hash + Clone,
    V: Clone,
    P: Policy,
{
    /// Stores `value` and returns the value exactly as stored.
    fn write(&self, key: K, mut value: V) -> V {
        let mut store = self.store.write();
        if let Some(stamp) = self.writes.on_write {
            stamp(&mut value);
        }
        let stored = value.clone();
        let evicted = if self.writes.front_on_overwrite {
            store.insert_front(key, value)
        } else {
            store.insert(key, value)
        };
        drop(store);

        if evicted.is_some() {
            debug!(policy = P::NAME, "evicted entry to stay within capacity");
            #[cfg(feature = "stats")]
            self.stats.record_evictions(1);
        }
        stored
    }
}

/// A bounded, thread-safe cache with single-flight computation of misses.
///
/// `BoundedCache` composes a [`BoundedStore`] (guarded by one
/// `parking_lot::RwLock`) with a [`SingleFlight`] coordinator (guarded by its
/// own registry). A miss in [`get_or_add`](Cache::get_or_add) hands the compute
/// function to the coordinator, so the store lock is never held while user code
/// runs. The producer stores a successful result before fanning it out, so a
/// caller arriving after the flight finished finds it in the store.
///
/// The handle is cheap to clone; clones share the same cache.
///
/// # Type Parameters
///
/// * `K` - Key type
/// * `V` - Value type, cloned out on every hit
/// * `E` - Error type of compute functions, cloned to every waiter of a flight
/// * `P` - Eviction policy, [`Lru`] (default) or [`Fifo`]
///
/// # Thread Safety
///
/// Under FIFO a lookup only takes the read lock; under LRU it takes the write
/// lock because it reorders. Inserts, deletes and evictions always take the
/// write lock. Eviction happens synchronously inside the insert that overflows
/// the bound; there is no background task.
///
/// Waiting on a computation blocks the calling thread, so these methods must
/// not be called from inside an async runtime worker.
///
/// # Examples
///
/// ```
/// use flightcache_core::{Cache, LruCache};
///
/// let cache: LruCache<u32, String, String> = LruCache::new(100);
///
/// let value = cache.get_or_add(7, || Ok("seven".to_string())).unwrap();
/// assert_eq!(value, "seven");
/// assert_eq!(cache.get(&7), Some("seven".to_string()));
///
/// // failed computations are returned, not cached
/// let err = cache.get_or_add(8, || Err("unavailable".to_string()));
/// assert_eq!(err, Err("unavailable".to_string()));
/// assert!(!cache.contains_key(&8));
/// ```
pub struct BoundedCache<K: Eq + Hash, V, E, P = Lru> {
    inner: Arc<Inner<K, V, E, P>>,
}

/// A [`BoundedCache`] evicting in insertion order.
pub type FifoCache<K, V, E> = BoundedCache<K, V, E, Fifo>;

/// A [`BoundedCache`] evicting the least recently used entry.
pub type LruCache<K, V, E> = BoundedCache<K, V, E, Lru>;

impl<K, V, E, P> BoundedCache<K, V, E, P>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
    E: Clone + Send + 'static,
    P: Policy,
{
    /// Creates a cache holding at most `max_entries` entries.
    ///
    /// With `max_entries == 0` nothing is ever stored; `get_or_add` still
    /// computes and returns values.
    pub fn new(max_entries: usize) -> Self {
        Self::with_write_mode(max_entries, WriteMode::default())
    }

    pub(crate) fn with_write_mode(max_entries: usize, writes: WriteMode<V>) -> Self {
        Self {
            inner: Arc::new(Inner {
                store: RwLock::new(BoundedStore::new(max_entries)),
                flights: SingleFlight::new(),
                writes,
                #[cfg(feature = "stats")]
                stats: CacheStats::new(),
            }),
        }
    }

    pub fn policy(&self) -> EvictionPolicy {
        P::kind()
    }

    pub fn max_entries(&self) -> usize {
        self.inner.store.read().max_entries()
    }

    /// Checks for `key` without counting an access or reordering.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.inner.store.read().contains_key(key)
    }

    /// Keys from most recent to next in line for eviction.
    pub fn keys(&self) -> Vec<K> {
        self.inner.store.read().keys().cloned().collect()
    }

    /// Drops every cached entry. In-flight computations are unaffected and
    /// will still store their results.
    pub fn clear(&self) {
        self.inner.store.write().clear();
    }

    /// Number of keys with a computation currently running.
    pub fn in_flight(&self) -> usize {
        self.inner.flights.in_flight()
    }

    #[cfg(feature = "stats")]
    pub fn stats(&self) -> &CacheStats {
        &self.inner.stats
    }

    /// Lookup without statistics, honouring the policy's lock discipline.
    pub(crate) fn lookup<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        if P::REORDER_ON_ACCESS {
            self.inner.store.write().get(key).cloned()
        } else {
            self.inner.store.read().peek(key).cloned()
        }
    }

    /// [`get_or_add`](Cache::get_or_add) without statistics, handing the
    /// compute function back on a hit.
    pub(crate) fn try_get_or_add<F>(&self, key: K, compute: F) -> Result<Lookup<V, F>, E>
    where
        F: FnOnce() -> Result<V, E> + Send + 'static,
    {
        if let Some(value) = self.lookup(&key) {
            return Ok(Lookup::Hit(value, compute));
        }

        let inner = Arc::clone(&self.inner);
        let stored_key = key.clone();
        let flight = self.inner.flights.wait_or_run(key, move || {
            let value = compute()?;
            Ok(inner.write(stored_key, value))
        });
        flight.wait().map(Lookup::Computed)
    }

    /// Removes `key` only if its current value satisfies `condition`,
    /// checked under the write lock.
    pub(crate) fn remove_if<Q, C>(&self, key: &Q, condition: C) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
        C: FnOnce(&V) -> bool,
    {
        let mut store = self.inner.store.write();
        if store.peek(key).map_or(false, condition) {
            store.remove(key);
            true
        } else {
            false
        }
    }

    /// Removes `key` and everything behind it if `key`'s current value
    /// satisfies `condition`, checked under the write lock.
    ///
    /// Returns the number of entries removed.
    pub(crate) fn truncate_from_if<Q, C>(&self, key: &Q, condition: C) -> usize
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
        C: FnOnce(&V) -> bool,
    {
        let mut store = self.inner.store.write();
        if store.peek(key).map_or(false, condition) {
            store.truncate_from_key(key).len()
        } else {
            0
        }
    }

    /// Removes every entry matching `is_expired`.
    ///
    /// Age-ordered policies stop at the first live entry from the back and
    /// cut the run in one truncation; others check every entry.
    pub(crate) fn remove_matching<C>(&self, is_expired: C) -> usize
    where
        C: Fn(&V) -> bool,
    {
        let mut store = self.inner.store.write();
        if P::AGE_ORDERED {
            store.remove_expired_suffix(is_expired).len()
        } else {
            store.retain(|value| !is_expired(value)).len()
        }
    }

    #[cfg(feature = "stats")]
    pub(crate) fn record_lookup(&self, hit: bool) {
        if hit {
            self.inner.stats.record_hit();
        } else {
            self.inner.stats.record_miss();
        }
    }

    #[cfg(not(feature = "stats"))]
    #[inline]
    pub(crate) fn record_lookup(&self, _hit: bool) {}
}

impl<K, V, E, P> Cache<K, V, E> for BoundedCache<K, V, E, P>
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
        let value = self.lookup(key);
        trace!(policy = P::NAME, hit = value.is_some(), "cache lookup");
        self.record_lookup(value.is_some());
        value
    }

    fn add(&self, key: K, value: V) {
        self.inner.write(key, value);
    }

    fn get_or_add<F>(&self, key: K, compute: F) -> Result<V, E>
    where
        F: FnOnce() -> Result<V, E> + Send + 'static,
    {
        match self.try_get_or_add(key, compute) {
            Ok(Lookup::Hit(value, _)) => {
                self.record_lookup(true);
                Ok(value)
            }
            Ok(Lookup::Computed(value)) => {
                self.record_lookup(false);
                Ok(value)
            }
            Err(err) => {
                self.record_lookup(false);
                Err(err)
            }
        }
    }

    fn delete<Q>(&self, key: &Q)
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.inner.store.write().remove(key);
    }

    fn len(&self) -> usize {
        self.inner.store.read().len()
    }
}

impl<K: Eq + Hash, V, E, P> Clone for BoundedCache<K, V, E, P> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<K, V, E, P> fmt::Debug for BoundedCache<K, V, E, P>
where
    K: Eq + Hash + Clone,
    P: Policy,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let store = self.inner.store.read();
        f.debug_struct("BoundedCache")
            .field("policy", &P::NAME)
            .field("len", &store.len())
            .field("max_entries", &store.max_entries())
            .finish()
    }
}
