use std::sync::atomic::{AtomicU64, Ordering};

/// Cache statistics for monitoring hit/miss rates, evictions and expirations.
///
/// This structure tracks cache activity using atomic operations for
/// thread-safe statistics collection with minimal overhead.
///
/// # Counters
///
/// * `hits` - lookups served from the store
/// * `misses` - lookups that found nothing (or only an expired value)
/// * `evictions` - entries dropped because the store was full
/// * `expirations` - entries dropped because they outlived the TTL
///
/// # Thread Safety
///
/// All operations are thread-safe using atomic operations with `Relaxed` ordering,
/// which provides the best performance while still maintaining consistency.
///
/// # Examples
///
/// ```
/// use flightcache_core::CacheStats;
///
/// let stats = CacheStats::new();
///
/// // Simulate cache operations
/// stats.record_hit();
/// stats.record_hit();
/// stats.record_miss();
///
/// assert_eq!(stats.hits(), 2);
/// assert_eq!(stats.misses(), 1);
/// assert_eq!(stats.total_accesses(), 3);
/// assert!((stats.hit_rate() - 0.6666).abs() < 0.001);
/// ```
#[derive(Debug)]
pub struct CacheStats {
    hits: AtomicU64,
    misses: AtomicU64,
    evictions: AtomicU64,
    expirations: AtomicU64,
}

impl CacheStats {
    /// Creates a new `CacheStats` instance with zero counters.
    pub fn new() -> Self {
        Self {
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            evictions: AtomicU64::new(0),
            expirations: AtomicU64::new(0),
        }
    }

    /// Records a cache hit (successful lookup).
    #[inline]
    pub fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a cache miss (failed lookup).
    ///
    /// This method is called internally when a cache lookup doesn't find an entry
    /// or finds an expired entry.
    #[inline]
    pub fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    /// Records entries evicted to make room for new ones.
    #[inline]
    pub fn record_evictions(&self, count: u64) {
        self.evictions.fetch_add(count, Ordering::Relaxed);
    }

    /// Records entries removed because their TTL elapsed.
    #[inline]
    pub fn record_expirations(&self, count: u64) {
        self.expirations.fetch_add(count, Ordering::Relaxed);
    }

    #[inline]
    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn evictions(&self) -> u64 {
        self.evictions.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn expirations(&self) -> u64 {
        self.expirations.load(Ordering::Relaxed)
    }

    /// Returns the total number of cache accesses (hits + misses).
    #[inline]
    pub fn total_accesses(&self) -> u64 {
        self.hits() + self.misses()
    }

    /// Calculates and returns the cache hit rate as a fraction (0.0 to 1.0).
    ///
    /// Returns 0.0 if there have been no accesses.
    #[inline]
    pub fn hit_rate(&self) -> f64 {
        let total = self.total_accesses();
        if total == 0 {
            0.0
        } else {
            self.hits() as f64 / total as f64
        }
    }

    /// Calculates and returns the cache miss rate as a fraction (0.0 to 1.0).
    ///
    /// Returns 0.0 if there have been no accesses.
    ///
    /// # Examples
    ///
    /// ```
    /// use flightcache_core::CacheStats;
    ///
    /// let stats = CacheStats::new();
    /// assert_eq!(stats.miss_rate(), 0.0);
    ///
    /// stats.record_hit();
    /// stats.record_miss();
    /// stats.record_miss();
    ///
    /// // 2 misses out of 3 total = 0.6666...
    /// assert!((stats.miss_rate() - 0.6666).abs() < 0.001);
    /// ```
    #[inline]
    pub fn miss_rate(&self) -> f64 {
        let total = self.total_accesses();
        if total == 0 {
            0.0
        } else {
            self.misses() as f64 / total as f64
        }
    }

    /// Resets all statistics counters to zero.
    ///
    /// This can be useful for measuring statistics over specific time periods.
    pub fn reset(&self) {
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
        self.evictions.store(0, Ordering::Relaxed);
        self.expirations.store(0, Ordering::Relaxed);
    }
}

impl Default for CacheStats {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for CacheStats {
    fn clone(&self) -> Self {
        Self {
            hits: AtomicU64::new(self.hits()),
            misses: AtomicU64::new(self.misses()),
            evictions: AtomicU64::new(self.evictions()),
            expirations: AtomicU64::new(self.expirations()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_new_stats() {
        let stats = CacheStats::new();
        assert_eq!(stats.hits(), 0);
        assert_eq!(stats.misses(), 0);
        assert_eq!(stats.evictions(), 0);
        assert_eq!(stats.expirations(), 0);
        assert_eq!(stats.hit_rate(), 0.0);
        assert_eq!(stats.miss_rate(), 0.0);
    }

    #[test]
    fn test_record_counters() {
        let stats = CacheStats::new();
        stats.record_hit();
        stats.record_miss();
        stats.record_evictions(2);
        stats.record_expirations(3);

        assert_eq!(stats.total_accesses(), 2);
        assert_eq!(stats.evictions(), 2);
        assert_eq!(stats.expirations(), 3);
        assert!((stats.hit_rate() - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_reset() {
        let stats = CacheStats::new();
        stats.record_hit();
        stats.record_evictions(1);
        stats.reset();
        assert_eq!(stats.total_accesses(), 0);
        assert_eq!(stats.evictions(), 0);
    }

    #[test]
    fn test_clone_snapshots_counters() {
        let stats = CacheStats::new();
        stats.record_hit();
        let snapshot = stats.clone();
        stats.record_hit();
        assert_eq!(snapshot.hits(), 1);
        assert_eq!(stats.hits(), 2);
    }

    #[test]
    fn test_concurrent_recording() {
        let stats = Arc::new(CacheStats::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let stats = Arc::clone(&stats);
                thread::spawn(move || {
                    for _ in 0..1000 {
                        stats.record_hit();
                        stats.record_miss();
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(stats.hits(), 8000);
        assert_eq!(stats.misses(), 8000);
    }
}
