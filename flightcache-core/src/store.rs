use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::Hash;
use std::marker::PhantomData;

use crate::eviction_policy::Policy;
use crate::list::{EntryList, NodeHandle};

/// A key/value pair owned by exactly one list node.
struct Entry<K, V> {
    key: K,
    value: V,
}

/// Bounded key-to-entry store with policy-driven eviction.
///
/// The store owns an [`EntryList`] holding the entries and a key index
/// pointing at their nodes. The two are kept in 1:1 correspondence: a key is
/// indexed iff its node is live in the list. Values live only in the list
/// nodes, so the index can never disagree with them.
///
/// Both policies keep the most relevant entry at the front, which makes the
/// back of the list the eviction target for either of them:
///
/// - **FIFO**: reads never reorder, overwrites keep their position
/// - **LRU**: reads and overwrites move the entry to the front
///
/// The store is not synchronized. [`BoundedCache`](crate::BoundedCache) wraps
/// it in a `parking_lot::RwLock`.
///
/// # Examples
///
/// ```
/// use flightcache_core::{BoundedStore, Lru};
///
/// let mut store: BoundedStore<u32, &str, Lru> = BoundedStore::new(2);
/// store.insert(1, "one");
/// store.insert(2, "two");
/// store.get(&1); // 1 becomes most recently used
///
/// let evicted = store.insert(3, "three");
/// assert_eq!(evicted, Some((2, "two")));
/// assert_eq!(store.keys().copied().collect::<Vec<_>>(), vec![3, 1]);
/// ```
pub struct BoundedStore<K, V, P> {
    list: EntryList<Entry<K, V>>,
    index: HashMap<K, NodeHandle>,
    max_entries: usize,
    _policy: PhantomData<P>,
}

impl<K, V, P> BoundedStore<K, V, P>
where
    K: Eq + Hash + Clone,
    P: Policy,
{
    /// Creates an empty store holding at most `max_entries` entries.
    ///
    /// A bound of `0` is accepted: every insert is rejected immediately and
    /// the store stays empty.
    pub fn new(max_entries: usize) -> Self {
        Self {
            list: EntryList::new(),
            index: HashMap::new(),
            max_entries,
            _policy: PhantomData,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.list.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    #[inline]
    pub fn max_entries(&self) -> usize {
        self.max_entries
    }

    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.index.contains_key(key)
    }

    /// Looks up `key`, moving it to the front when the policy reorders on access.
    pub fn get<Q>(&mut self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let handle = *self.index.get(key)?;
        if P::REORDER_ON_ACCESS {
            self.list.move_to_front(handle);
        }
        self.list.get(handle).map(|entry| &entry.value)
    }

    /// Looks up `key` without touching the list order.
    pub fn peek<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let handle = *self.index.get(key)?;
        self.list.get(handle).map(|entry| &entry.value)
    }

    /// Inserts or overwrites `key`.
    ///
    /// An existing key has its value replaced in place (and is moved to the
    /// front under LRU). A new key evicts the back entry first if the store is
    /// full, then goes to the front.
    ///
    /// # Returns
    ///
    /// The evicted entry, if any. With a bound of `0` the rejected entry
    /// itself is returned.
    pub fn insert(&mut self, key: K, value: V) -> Option<(K, V)> {
        if let Some(&handle) = self.index.get(&key) {
            if let Some(entry) = self.list.get_mut(handle) {
                entry.value = value;
            }
            if P::REORDER_ON_ACCESS {
                self.list.move_to_front(handle);
            }
            return None;
        }
        self.insert_new(key, value)
    }

    /// Like [`insert`](Self::insert), but an overwrite always moves the entry
    /// to the front, whatever the policy.
    ///
    /// Used when list order has to keep tracking insertion age under FIFO.
    pub fn insert_front(&mut self, key: K, value: V) -> Option<(K, V)> {
        if let Some(&handle) = self.index.get(&key) {
            if let Some(entry) = self.list.get_mut(handle) {
                entry.value = value;
            }
            self.list.move_to_front(handle);
            return None;
        }
        self.insert_new(key, value)
    }

    /// Removes `key`. Absent keys are a no-op.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let handle = self.index.remove(key)?;
        self.list.remove(handle).map(|entry| entry.value)
    }

    /// Removes `key` and every entry behind it in one truncation.
    ///
    /// Returns the removed pairs, front to back. Absent keys remove nothing.
    pub fn truncate_from_key<Q>(&mut self, key: &Q) -> Vec<(K, V)>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        match self.index.get(key) {
            Some(&handle) => self.truncate_from(handle),
            None => Vec::new(),
        }
    }

    /// Removes the longest suffix (back side) of entries matching `is_expired`.
    ///
    /// Walks from the back towards the front until the first entry that does
    /// not match, then detaches the whole matching run with a single
    /// truncation. Only meaningful when list order is age order.
    pub fn remove_expired_suffix<F>(&mut self, is_expired: F) -> Vec<(K, V)>
    where
        F: Fn(&V) -> bool,
    {
        let mut cut = None;
        let mut cursor = self.list.back();
        while let Some(handle) = cursor {
            match self.list.get(handle) {
                Some(entry) if is_expired(&entry.value) => {
                    cut = Some(handle);
                    cursor = self.list.prev(handle);
                }
                _ => break,
            }
        }

        match cut {
            Some(handle) => self.truncate_from(handle),
            None => Vec::new(),
        }
    }

    /// Keeps only the entries for which `keep` returns `true`.
    ///
    /// Returns the removed pairs. This visits every entry.
    pub fn retain<F>(&mut self, keep: F) -> Vec<(K, V)>
    where
        F: Fn(&V) -> bool,
    {
        let doomed: Vec<K> = self
            .list
            .iter()
            .filter(|entry| !keep(&entry.value))
            .map(|entry| entry.key.clone())
            .collect();

        doomed
            .into_iter()
            .filter_map(|key| {
                let value = self.remove(&key)?;
                Some((key, value))
            })
            .collect()
    }

    /// Keys from front (most recent) to back (next eviction).
    pub fn keys(&self) -> impl DoubleEndedIterator<Item = &K> + '_ {
        self.list.iter().map(|entry| &entry.key)
    }

    /// Entries from front to back.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = (&K, &V)> + '_ {
        self.list.iter().map(|entry| (&entry.key, &entry.value))
    }

    pub fn clear(&mut self) {
        self.list.clear();
        self.index.clear();
    }

    fn insert_new(&mut self, key: K, value: V) -> Option<(K, V)> {
        if self.max_entries == 0 {
            return Some((key, value));
        }

        let evicted = if self.list.len() >= self.max_entries {
            self.evict_back()
        } else {
            None
        };

        let handle = self.list.push_front(Entry {
            key: key.clone(),
            value,
        });
        self.index.insert(key, handle);

        evicted
    }

    fn evict_back(&mut self) -> Option<(K, V)> {
        let back = self.list.back()?;
        let entry = self.list.remove(back)?;
        self.index.remove(&entry.key);
        Some((entry.key, entry.value))
    }

    fn truncate_from(&mut self, handle: NodeHandle) -> Vec<(K, V)> {
        self.list
            .truncate_from(handle)
            .into_iter()
            .map(|entry| {
                self.index.remove(&entry.key);
                (entry.key, entry.value)
            })
            .collect()
    }

    #[cfg(test)]
    fn assert_consistent(&self) {
        assert_eq!(self.index.len(), self.list.len());
        assert!(self.list.len() <= self.max_entries);
        for entry in self.list.iter() {
            let handle = self.index[&entry.key];
            assert!(self.list.contains(handle));
        }
    }
}
