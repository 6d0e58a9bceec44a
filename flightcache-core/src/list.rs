use std::fmt;
use std::iter::FusedIterator;
use std::sync::atomic::{AtomicU64, Ordering};

/// Source of list identities, so handles from one list are rejected by another.
static NEXT_LIST_ID: AtomicU64 = AtomicU64::new(1);

/// Slot of the sentinel root. It never holds a value.
const ROOT: usize = 0;

/// Stable reference to a node of an [`EntryList`].
///
/// A handle stays valid until its node is removed. After that every operation
/// taking the handle is a no-op, even if the underlying slot has been reused
/// by a newer node: each node gets a fresh generation from its list.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeHandle {
    list: u64,
    slot: usize,
    generation: u64,
}

struct Node<T> {
    value: Option<T>,
    prev: usize,
    next: usize,
    generation: u64,
}

/// Doubly-linked list of entries stored in an arena, closed into a ring
/// through a sentinel root.
///
/// The front (`root.next`) is the most recently inserted or used entry and the
/// back (`root.prev`) is the eviction candidate. All single-node operations
/// are O(1); [`remove_all_after`](Self::remove_all_after) and
/// [`truncate_from`](Self::truncate_from) are O(k) in the number of detached
/// nodes.
///
/// The list is not synchronized; owners guard it with their own lock.
///
/// # Examples
///
/// ```
/// use flightcache_core::EntryList;
///
/// let mut list = EntryList::new();
/// list.push_front(3);
/// let two = list.push_front(2);
/// list.push_front(1);
///
/// // front -> back: 1, 2, 3
/// let removed = list.remove_all_after(two);
/// assert_eq!(removed, vec![3]);
/// assert_eq!(list.iter().copied().collect::<Vec<_>>(), vec![1, 2]);
/// ```
pub struct EntryList<T> {
    id: u64,
    nodes: Vec<Node<T>>,
    free: Vec<usize>,
    len: usize,
    next_generation: u64,
}

impl<T> EntryList<T> {
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Creates an empty list with room for `capacity` entries before the
    /// arena has to grow.
    pub fn with_capacity(capacity: usize) -> Self {
        let mut nodes = Vec::with_capacity(capacity.saturating_add(1));
        nodes.push(Node {
            value: None,
            prev: ROOT,
            next: ROOT,
            generation: 0,
        });
        Self {
            id: NEXT_LIST_ID.fetch_add(1, Ordering::Relaxed),
            nodes,
            free: Vec::new(),
            len: 0,
            next_generation: 1,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns `true` if `handle` refers to a live node of this list.
    pub fn contains(&self, handle: NodeHandle) -> bool {
        self.slot_of(handle).is_some()
    }

    /// Inserts `value` right after the root and returns its handle.
    pub fn push_front(&mut self, value: T) -> NodeHandle {
        let generation = self.next_generation;
        self.next_generation += 1;

        let node = Node {
            value: Some(value),
            prev: ROOT,
            next: ROOT,
            generation,
        };
        let slot = match self.free.pop() {
            Some(slot) => {
                self.nodes[slot] = node;
                slot
            }
            None => {
                self.nodes.push(node);
                self.nodes.len() - 1
            }
        };

        self.link_front(slot);
        self.len += 1;

        NodeHandle {
            list: self.id,
            slot,
            generation,
        }
    }

    /// Relinks a live node at the front without allocating.
    ///
    /// Returns `false` (and does nothing) for foreign or detached handles.
    pub fn move_to_front(&mut self, handle: NodeHandle) -> bool {
        let Some(slot) = self.slot_of(handle) else {
            return false;
        };
        if self.nodes[ROOT].next != slot {
            self.unlink(slot);
            self.link_front(slot);
        }
        true
    }

    /// Detaches a node and returns its value.
    ///
    /// Removing a node that does not belong to this list, or that was already
    /// removed, is a no-op returning `None`.
    pub fn remove(&mut self, handle: NodeHandle) -> Option<T> {
        let slot = self.slot_of(handle)?;
        self.unlink(slot);
        self.len -= 1;
        self.release(slot)
    }

    pub fn front(&self) -> Option<NodeHandle> {
        self.live_handle(self.nodes[ROOT].next)
    }

    /// The node adjacent to the root on the tail side: the eviction candidate.
    pub fn back(&self) -> Option<NodeHandle> {
        self.live_handle(self.nodes[ROOT].prev)
    }

    /// The neighbour of `handle` towards the front, if any.
    pub fn prev(&self, handle: NodeHandle) -> Option<NodeHandle> {
        let slot = self.slot_of(handle)?;
        self.live_handle(self.nodes[slot].prev)
    }

    /// The neighbour of `handle` towards the back, if any.
    pub fn next(&self, handle: NodeHandle) -> Option<NodeHandle> {
        let slot = self.slot_of(handle)?;
        self.live_handle(self.nodes[slot].next)
    }

    pub fn get(&self, handle: NodeHandle) -> Option<&T> {
        let slot = self.slot_of(handle)?;
        self.nodes[slot].value.as_ref()
    }

    pub fn get_mut(&mut self, handle: NodeHandle) -> Option<&mut T> {
        let slot = self.slot_of(handle)?;
        self.nodes[slot].value.as_mut()
    }

    /// Detaches every node strictly behind `handle`, re-closing the ring
    /// after it. The given node itself stays in the list.
    ///
    /// Returns the detached values ordered front to back. A foreign or
    /// detached handle leaves the list untouched and returns nothing.
    pub fn remove_all_after(&mut self, handle: NodeHandle) -> Vec<T> {
        match self.slot_of(handle) {
            Some(slot) => self.detach_after(slot),
            None => Vec::new(),
        }
    }

    /// Detaches `handle` and every node behind it.
    ///
    /// When `handle` is the first live node the whole list is cleared. Values
    /// are returned ordered front to back; a foreign or detached handle is a
    /// no-op.
    pub fn truncate_from(&mut self, handle: NodeHandle) -> Vec<T> {
        match self.slot_of(handle) {
            Some(slot) => {
                let prev = self.nodes[slot].prev;
                self.detach_after(prev)
            }
            None => Vec::new(),
        }
    }

    /// Drops every entry. Outstanding handles become invalid.
    pub fn clear(&mut self) {
        self.nodes.truncate(1);
        self.nodes[ROOT].prev = ROOT;
        self.nodes[ROOT].next = ROOT;
        self.free.clear();
        self.len = 0;
    }

    /// Iterates values from front (newest) to back (eviction candidate).
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            list: self,
            front: self.nodes[ROOT].next,
            back: self.nodes[ROOT].prev,
            remaining: self.len,
        }
    }

    fn slot_of(&self, handle: NodeHandle) -> Option<usize> {
        if handle.list != self.id || handle.slot == ROOT {
            return None;
        }
        let node = self.nodes.get(handle.slot)?;
        (node.value.is_some() && node.generation == handle.generation).then_some(handle.slot)
    }

    fn live_handle(&self, slot: usize) -> Option<NodeHandle> {
        if slot == ROOT {
            return None;
        }
        Some(NodeHandle {
            list: self.id,
            slot,
            generation: self.nodes[slot].generation,
        })
    }

    fn link_front(&mut self, slot: usize) {
        let first = self.nodes[ROOT].next;
        self.nodes[slot].prev = ROOT;
        self.nodes[slot].next = first;
        self.nodes[first].prev = slot;
        self.nodes[ROOT].next = slot;
    }

    fn unlink(&mut self, slot: usize) {
        let (prev, next) = (self.nodes[slot].prev, self.nodes[slot].next);
        self.nodes[prev].next = next;
        self.nodes[next].prev = prev;
    }

    /// Clears the node's links and hands its slot back to the free list.
    fn release(&mut self, slot: usize) -> Option<T> {
        let node = &mut self.nodes[slot];
        node.prev = ROOT;
        node.next = ROOT;
        self.free.push(slot);
        node.value.take()
    }

    /// `slot` may be the root, in which case the list is emptied.
    fn detach_after(&mut self, slot: usize) -> Vec<T> {
        let mut detached = Vec::new();
        let mut cursor = self.nodes[slot].next;
        while cursor != ROOT {
            let next = self.nodes[cursor].next;
            if let Some(value) = self.release(cursor) {
                detached.push(value);
            }
            cursor = next;
        }

        self.nodes[slot].next = ROOT;
        self.nodes[ROOT].prev = slot;
        self.len -= detached.len();
        detached
    }
}

impl<T> Default for EntryList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: fmt::Debug> fmt::Debug for EntryList<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

/// Front-to-back iterator over an [`EntryList`].
pub struct Iter<'a, T> {
    list: &'a EntryList<T>,
    front: usize,
    back: usize,
    remaining: usize,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let node = &self.list.nodes[self.front];
        self.front = node.next;
        self.remaining -= 1;
        node.value.as_ref()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> DoubleEndedIterator for Iter<'_, T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let node = &self.list.nodes[self.back];
        self.back = node.prev;
        self.remaining -= 1;
        node.value.as_ref()
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}

impl<T> FusedIterator for Iter<'_, T> {}

#[cfg(test)]
mod tests {
    use super::*;

    fn list_of(values: &[i32]) -> (EntryList<i32>, Vec<NodeHandle>) {
        let mut list = EntryList::new();
        // pushed in reverse so that front -> back matches `values`
        let mut handles: Vec<_> = values.iter().rev().map(|v| list.push_front(*v)).collect();
        handles.reverse();
        (list, handles)
    }

    fn contents(list: &EntryList<i32>) -> Vec<i32> {
        list.iter().copied().collect()
    }

    #[test]
    fn test_push_front_orders_newest_first() {
        let (list, handles) = list_of(&[1, 2, 3]);
        assert_eq!(contents(&list), vec![1, 2, 3]);
        assert_eq!(list.len(), 3);
        assert_eq!(list.front(), Some(handles[0]));
        assert_eq!(list.back(), Some(handles[2]));
    }

    #[test]
    fn test_empty_list_has_no_ends() {
        let list: EntryList<i32> = EntryList::new();
        assert!(list.is_empty());
        assert_eq!(list.front(), None);
        assert_eq!(list.back(), None);
        assert_eq!(list.iter().next(), None);
    }

    #[test]
    fn test_move_to_front() {
        let (mut list, handles) = list_of(&[1, 2, 3]);
        assert!(list.move_to_front(handles[2]));
        assert_eq!(contents(&list), vec![3, 1, 2]);
        assert!(list.move_to_front(handles[2]));
        assert_eq!(contents(&list), vec![3, 1, 2]);
        assert_eq!(list.len(), 3);
    }

    #[test]
    fn test_remove_is_idempotent() {
        let (mut list, handles) = list_of(&[1, 2, 3]);
        assert_eq!(list.remove(handles[1]), Some(2));
        assert_eq!(list.remove(handles[1]), None);
        assert_eq!(contents(&list), vec![1, 3]);
        assert_eq!(list.len(), 2);
        assert!(!list.move_to_front(handles[1]));
    }

    #[test]
    fn test_stale_handle_does_not_alias_reused_slot() {
        let (mut list, handles) = list_of(&[1]);
        list.remove(handles[0]);
        let fresh = list.push_front(7);
        assert_eq!(list.get(handles[0]), None);
        assert_eq!(list.remove(handles[0]), None);
        assert_eq!(list.get(fresh), Some(&7));
    }

    #[test]
    fn test_foreign_handle_is_rejected() {
        let (mut list, _) = list_of(&[1, 2, 3]);
        let (_, other) = list_of(&[1, 2, 3]);

        assert_eq!(list.remove(other[1]), None);
        assert!(list.remove_all_after(other[0]).is_empty());
        assert!(list.truncate_from(other[0]).is_empty());
        assert_eq!(list.len(), 3);
    }

    #[test]
    fn test_remove_all_after_keeps_given_node() {
        let (mut list, handles) = list_of(&[1, 2, 3]);

        let removed = list.remove_all_after(handles[0]);

        assert_eq!(removed, vec![2, 3]);
        assert_eq!(contents(&list), vec![1]);
        assert_eq!(list.len(), 1);
        assert_eq!(list.back(), Some(handles[0]));
        assert_eq!(list.next(handles[0]), None, "ring not closed");
        assert!(!list.contains(handles[1]));
    }

    #[test]
    fn test_remove_all_after_last_node_is_noop() {
        let (mut list, handles) = list_of(&[1, 2, 3]);
        assert!(list.remove_all_after(handles[2]).is_empty());
        assert_eq!(list.len(), 3);
    }

    #[test]
    fn test_truncate_from_first_node_clears_list() {
        let (mut list, handles) = list_of(&[1, 2, 3]);

        let removed = list.truncate_from(handles[0]);

        assert_eq!(removed, vec![1, 2, 3]);
        assert!(list.is_empty());
        assert_eq!(list.front(), None);
        assert_eq!(list.back(), None);
    }

    #[test]
    fn test_truncate_from_middle() {
        let (mut list, handles) = list_of(&[1, 2, 3]);

        let removed = list.truncate_from(handles[1]);

        assert_eq!(removed, vec![2, 3]);
        assert_eq!(contents(&list), vec![1]);
        // the list keeps working after a truncation
        list.push_front(0);
        assert_eq!(contents(&list), vec![0, 1]);
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn test_iter_both_directions() {
        let (list, _) = list_of(&[1, 2, 3, 4]);
        assert_eq!(list.iter().rev().copied().collect::<Vec<_>>(), vec![4, 3, 2, 1]);

        let mut iter = list.iter();
        assert_eq!(iter.next(), Some(&1));
        assert_eq!(iter.next_back(), Some(&4));
        assert_eq!(iter.len(), 2);
    }

    #[test]
    fn test_clear_invalidates_handles() {
        let (mut list, handles) = list_of(&[1, 2]);
        list.clear();
        assert!(list.is_empty());
        let fresh = list.push_front(9);
        assert_eq!(list.get(handles[0]), None);
        assert_eq!(list.get(fresh), Some(&9));
    }

    #[test]
    fn test_get_mut_updates_in_place() {
        let (mut list, handles) = list_of(&[1, 2]);
        if let Some(value) = list.get_mut(handles[1]) {
            *value = 20;
        }
        assert_eq!(contents(&list), vec![1, 20]);
    }
}
