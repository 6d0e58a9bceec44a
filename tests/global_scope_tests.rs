/// Integration tests for a process-wide cache held in a static

#[cfg(test)]
mod tests {
    use flightcache::{Cache, LruCache};
    use once_cell::sync::Lazy;
    use serial_test::serial;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;

    static USERS: Lazy<LruCache<u64, String, String>> = Lazy::new(|| LruCache::new(3));
    static LOADS: AtomicUsize = AtomicUsize::new(0);

    fn load_user(id: u64) -> Result<String, String> {
        LOADS.fetch_add(1, Ordering::SeqCst);
        if id == 0 {
            Err("no such user".to_string())
        } else {
            Ok(format!("user-{id}"))
        }
    }

    fn reset() {
        USERS.clear();
        LOADS.store(0, Ordering::SeqCst);
        #[cfg(feature = "stats")]
        USERS.stats().reset();
    }

    #[test]
    #[serial]
    fn test_global_cache_shared_between_threads() {
        reset();

        let handles: Vec<_> = (0..8)
            .map(|_| thread::spawn(|| USERS.get_or_add(1, || load_user(1))))
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), Ok("user-1".to_string()));
        }

        // later callers always hit; racing ones at most share flights
        assert!(LOADS.load(Ordering::SeqCst) >= 1);
        let before = LOADS.load(Ordering::SeqCst);
        assert_eq!(USERS.get(&1), Some("user-1".to_string()));
        assert_eq!(LOADS.load(Ordering::SeqCst), before);
    }

    #[test]
    #[serial]
    fn test_global_cache_eviction() {
        reset();

        for id in 1..=4 {
            USERS.must_get_or_add(id, move || load_user(id));
        }

        assert_eq!(USERS.len(), 3);
        assert!(!USERS.contains_key(&1));
        assert_eq!(LOADS.load(Ordering::SeqCst), 4);
    }

    #[test]
    #[serial]
    fn test_global_cache_errors() {
        reset();

        assert_eq!(
            USERS.get_or_add(0, || load_user(0)),
            Err("no such user".to_string())
        );
        assert_eq!(
            USERS.get_or_add(0, || load_user(0)),
            Err("no such user".to_string())
        );
        assert_eq!(LOADS.load(Ordering::SeqCst), 2);
        assert!(USERS.is_empty());
    }

    #[cfg(feature = "stats")]
    #[test]
    #[serial]
    fn test_global_cache_statistics() {
        reset();

        USERS.must_get_or_add(5, || load_user(5));
        USERS.must_get_or_add(5, || load_user(5));
        let _ = USERS.get(&6);

        let stats = USERS.stats();
        assert_eq!(stats.hits(), 1);
        assert_eq!(stats.misses(), 2);
        assert!((stats.hit_rate() - 1.0 / 3.0).abs() < 0.001);
    }
}
