//! Intrusive binary min-heap over an arena of items.
//!
//! The heap stores arena indices. Each item records its own heap slot, which
//! gives O(1) membership tests and lets a decreased key be sifted up in place
//! instead of pushing a duplicate entry.

use std::cmp::Ordering;

/// An element that can live in a [`PriorityQueue`].
pub trait HeapItem {
    /// The slot this item occupies, or `None` when it is not enqueued.
    fn heap_index(&self) -> Option<usize>;
    /// Records the slot this item occupies.
    fn set_heap_index(&mut self, index: Option<usize>);
    /// `Less` means `self` should be popped before `other`.
    fn priority_cmp(&self, other: &Self) -> Ordering;
}

/// Fixed-capacity min-heap of arena indices.
#[derive(Debug, Clone)]
pub struct PriorityQueue {
    items: Vec<usize>,
    capacity: usize,
}

impl PriorityQueue {
    /// Creates an empty queue that can hold up to `capacity` items.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            items: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Number of enqueued items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns true if nothing is enqueued.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Maximum number of simultaneously enqueued items.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Arena index of the minimum item without removing it.
    pub fn peek(&self) -> Option<usize> {
        self.items.first().copied()
    }

    /// Returns true if `idx` is currently enqueued in this queue.
    pub fn contains<T: HeapItem>(&self, arena: &[T], idx: usize) -> bool {
        match arena[idx].heap_index() {
            Some(slot) => self.items.get(slot) == Some(&idx),
            None => false,
        }
    }

    /// Inserts `idx`. The item must not already be enqueued.
    ///
    /// # Panics
    /// Panics if the queue is at capacity.
    pub fn push<T: HeapItem>(&mut self, arena: &mut [T], idx: usize) {
        debug_assert!(!self.contains(arena, idx), "item {idx} is already enqueued");
        assert!(
            self.items.len() < self.capacity,
            "priority queue capacity {} exceeded",
            self.capacity
        );

        let slot = self.items.len();
        self.items.push(idx);
        arena[idx].set_heap_index(Some(slot));
        self.sift_up(arena, slot);
    }

    /// Removes and returns the minimum item.
    pub fn pop_min<T: HeapItem>(&mut self, arena: &mut [T]) -> Option<usize> {
        if self.items.is_empty() {
            return None;
        }

        let last = self.items.len() - 1;
        self.items.swap(0, last);
        let min = self.items.pop()?;
        arena[min].set_heap_index(None);

        if let Some(&moved) = self.items.first() {
            arena[moved].set_heap_index(Some(0));
            self.sift_down(arena, 0);
        }

        Some(min)
    }

    /// Restores heap order after the key of an enqueued item was lowered.
    ///
    /// Keys of open-set members only ever decrease during a search, so the
    /// item is only sifted towards the root.
    pub fn decrease_key<T: HeapItem>(&mut self, arena: &mut [T], idx: usize) {
        debug_assert!(self.contains(arena, idx), "item {idx} is not enqueued");
        if let Some(slot) = arena[idx].heap_index() {
            self.sift_up(arena, slot);
        }
    }

    /// Dequeues everything, clearing the slot of each item.
    pub fn clear<T: HeapItem>(&mut self, arena: &mut [T]) {
        for idx in self.items.drain(..) {
            arena[idx].set_heap_index(None);
        }
    }

    fn less<T: HeapItem>(&self, arena: &[T], a: usize, b: usize) -> bool {
        arena[self.items[a]].priority_cmp(&arena[self.items[b]]) == Ordering::Less
    }

    fn swap_slots<T: HeapItem>(&mut self, arena: &mut [T], a: usize, b: usize) {
        self.items.swap(a, b);
        arena[self.items[a]].set_heap_index(Some(a));
        arena[self.items[b]].set_heap_index(Some(b));
    }

    fn sift_up<T: HeapItem>(&mut self, arena: &mut [T], mut slot: usize) {
        while slot > 0 {
            let parent = (slot - 1) / 2;
            if !self.less(arena, slot, parent) {
                break;
            }
            self.swap_slots(arena, slot, parent);
            slot = parent;
        }
    }

    fn sift_down<T: HeapItem>(&mut self, arena: &mut [T], mut slot: usize) {
        let len = self.items.len();
        loop {
            let left = 2 * slot + 1;
            let right = left + 1;
            if left >= len {
                break;
            }

            let child = if right < len && self.less(arena, right, left) {
                right
            } else {
                left
            };

            if !self.less(arena, child, slot) {
                break;
            }
            self.swap_slots(arena, slot, child);
            slot = child;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    #[derive(Debug, Default)]
    struct Item {
        key: i32,
        slot: Option<usize>,
    }

    impl HeapItem for Item {
        fn heap_index(&self) -> Option<usize> {
            self.slot
        }

        fn set_heap_index(&mut self, index: Option<usize>) {
            self.slot = index;
        }

        fn priority_cmp(&self, other: &Self) -> Ordering {
            self.key.cmp(&other.key)
        }
    }

    fn arena(keys: &[i32]) -> Vec<Item> {
        keys.iter().map(|&key| Item { key, slot: None }).collect()
    }

    fn assert_heap_valid(queue: &PriorityQueue, arena: &[Item]) {
        for (slot, &idx) in queue.items.iter().enumerate() {
            assert_eq!(arena[idx].slot, Some(slot), "slot of item {idx} is stale");
            if slot > 0 {
                let parent = queue.items[(slot - 1) / 2];
                assert!(arena[parent].key <= arena[idx].key, "heap order violated");
            }
        }
        for (idx, item) in arena.iter().enumerate() {
            assert_eq!(
                queue.contains(arena, idx),
                queue.items.contains(&idx),
                "contains() wrong for item {idx}"
            );
            if !queue.items.contains(&idx) {
                assert!(item.slot.is_none());
            }
        }
    }

    #[test]
    fn test_pop_returns_ascending_keys() {
        let mut items = arena(&[7, 3, 9, 1, 5, 3, 8]);
        let mut queue = PriorityQueue::with_capacity(items.len());
        for idx in 0..items.len() {
            queue.push(&mut items, idx);
        }
        assert_eq!(queue.len(), 7);
        assert_heap_valid(&queue, &items);

        let mut keys = Vec::new();
        while let Some(idx) = queue.pop_min(&mut items) {
            keys.push(items[idx].key);
            assert_heap_valid(&queue, &items);
        }
        assert_eq!(keys, vec![1, 3, 3, 5, 7, 8, 9]);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_decrease_key_moves_item_to_root() {
        let mut items = arena(&[10, 20, 30, 40]);
        let mut queue = PriorityQueue::with_capacity(4);
        for idx in 0..4 {
            queue.push(&mut items, idx);
        }

        items[3].key = 1;
        queue.decrease_key(&mut items, 3);
        assert_eq!(queue.peek(), Some(3));
        assert_heap_valid(&queue, &items);
    }

    #[test]
    fn test_contains_after_pop() {
        let mut items = arena(&[2, 1]);
        let mut queue = PriorityQueue::with_capacity(2);
        assert!(!queue.contains(&items, 0));
        queue.push(&mut items, 0);
        queue.push(&mut items, 1);
        assert_eq!(queue.pop_min(&mut items), Some(1));
        assert!(!queue.contains(&items, 1));
        assert!(queue.contains(&items, 0));
    }

    #[test]
    fn test_stale_slot_from_another_queue_is_not_membership() {
        let mut items = arena(&[5, 6]);
        let mut first = PriorityQueue::with_capacity(2);
        first.push(&mut items, 0);
        first.push(&mut items, 1);

        // A fresh queue must not trust slots written by the old one.
        let second = PriorityQueue::with_capacity(2);
        assert!(!second.contains(&items, 1));
    }

    #[test]
    #[should_panic(expected = "capacity")]
    fn test_push_beyond_capacity_panics() {
        let mut items = arena(&[1, 2]);
        let mut queue = PriorityQueue::with_capacity(1);
        queue.push(&mut items, 0);
        queue.push(&mut items, 1);
    }

    #[test]
    fn test_random_interleaving_keeps_invariant() {
        let mut rng = StdRng::seed_from_u64(0x5eed);
        let mut items: Vec<Item> = (0..64)
            .map(|_| Item {
                key: rng.random_range(0..1000),
                slot: None,
            })
            .collect();
        let mut queue = PriorityQueue::with_capacity(items.len());

        for _ in 0..2_000 {
            let idx = rng.random_range(0..items.len());
            match rng.random_range(0..3) {
                0 if !queue.contains(&items, idx) => queue.push(&mut items, idx),
                1 => {
                    let expected = queue.items.iter().map(|&i| items[i].key).min();
                    let popped = queue.pop_min(&mut items).map(|i| items[i].key);
                    assert_eq!(popped, expected);
                }
                2 if queue.contains(&items, idx) => {
                    items[idx].key -= rng.random_range(0..50);
                    queue.decrease_key(&mut items, idx);
                }
                _ => {}
            }
            assert_heap_valid(&queue, &items);
        }

        queue.clear(&mut items);
        assert!(queue.is_empty());
        assert!(items.iter().all(|item| item.slot.is_none()));
    }
}
