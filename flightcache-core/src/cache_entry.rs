use std::time::{Duration, Instant};

/// A cached value stamped with the moment it was (re)inserted.
///
/// This structure is used internally by [`TtlCache`](crate::TtlCache): every
/// value stored through the decorator is wrapped in an `AgedValue`, and the
/// stamp is refreshed under the store's write lock each time the value is
/// written. A value older than the cache's `max_age` is treated as absent.
///
/// # Type Parameters
///
/// * `V` - The type of the cached value
///
/// # Examples
///
/// ```
/// use flightcache_core::AgedValue;
/// use std::time::Duration;
///
/// let entry = AgedValue::new(42);
/// assert_eq!(entry.value, 42);
/// assert!(!entry.is_expired(Duration::from_secs(60)));
/// ```
#[derive(Clone, Debug)]
pub struct AgedValue<V> {
    pub value: V,
    pub inserted_at: Instant,
}

impl<V> AgedValue<V> {
    /// Wraps `value` with `inserted_at` set to `Instant::now()`.
    pub fn new(value: V) -> Self {
        Self {
            value,
            inserted_at: Instant::now(),
        }
    }

    /// Time elapsed since the value was stamped.
    pub fn age(&self) -> Duration {
        self.inserted_at.elapsed()
    }

    /// Returns true if the entry is strictly older than `max_age`.
    ///
    /// # Examples
    ///
    /// ```
    /// use flightcache_core::AgedValue;
    /// use std::thread;
    /// use std::time::Duration;
    ///
    /// let entry = AgedValue::new("data");
    /// assert!(!entry.is_expired(Duration::from_millis(50)));
    ///
    /// thread::sleep(Duration::from_millis(60));
    /// assert!(entry.is_expired(Duration::from_millis(50)));
    /// ```
    pub fn is_expired(&self, max_age: Duration) -> bool {
        self.age() > max_age
    }

    /// Re-stamps the value with the current time.
    pub fn refresh(&mut self) {
        self.inserted_at = Instant::now();
    }

    pub fn into_inner(self) -> V {
        self.value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_new_entry_not_expired() {
        let entry = AgedValue::new(42);
        assert_eq!(entry.value, 42);
        assert!(!entry.is_expired(Duration::from_secs(10)));
    }

    #[test]
    fn test_entry_expiration() {
        let entry = AgedValue::new("data");
        thread::sleep(Duration::from_millis(30));
        assert!(entry.is_expired(Duration::from_millis(10)));
        assert!(!entry.is_expired(Duration::from_secs(3)));
    }

    #[test]
    fn test_refresh_resets_age() {
        let mut entry = AgedValue::new(1);
        thread::sleep(Duration::from_millis(60));
        assert!(entry.is_expired(Duration::from_millis(50)));

        entry.refresh();
        assert!(!entry.is_expired(Duration::from_millis(50)));
        assert_eq!(entry.into_inner(), 1);
    }
}
