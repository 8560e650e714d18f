//! Bounded FIFO buffer used by the remote channel.

use std::collections::VecDeque;
use std::fmt;

/// Error returned when the queue is at capacity.
///
/// Carries the rejected item back to the caller, mirroring
/// `crossbeam_channel::TrySendError::Full`.
#[derive(PartialEq, Eq)]
pub struct QueueFull<T> {
    pub item: T,
    pub capacity: usize,
}

impl<T> QueueFull<T> {
    pub fn into_inner(self) -> T {
        self.item
    }
}

impl<T> fmt::Debug for QueueFull<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueueFull")
            .field("capacity", &self.capacity)
            .finish_non_exhaustive()
    }
}

/// Ordered buffer with a fixed capacity set at construction.
#[derive(Clone, Debug)]
pub struct BoundedQueue<T> {
    items: VecDeque<T>,
    capacity: usize,
}

impl<T> Default for BoundedQueue<T> {
    fn default() -> Self {
        Self::unbounded()
    }
}

impl<T> BoundedQueue<T> {
    /// Create a queue holding at most `capacity` items.
    pub fn new(capacity: usize) -> Self {
        Self {
            items: VecDeque::new(),
            capacity,
        }
    }

    /// Create a queue whose capacity is the largest representable count.
    pub fn unbounded() -> Self {
        Self::new(usize::MAX)
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.items.len() >= self.capacity
    }

    /// Append `item` at the back.
    pub fn enqueue(&mut self, item: T) -> Result<(), QueueFull<T>> {
        if self.is_full() {
            return Err(QueueFull {
                item,
                capacity: self.capacity,
            });
        }
        self.items.push_back(item);
        Ok(())
    }

    /// Put `item` back at the front, ahead of everything queued.
    ///
    /// Used to restore an item that was just dequeued, so the slot it
    /// vacated is still free.
    pub fn requeue_front(&mut self, item: T) -> Result<(), QueueFull<T>> {
        if self.is_full() {
            return Err(QueueFull {
                item,
                capacity: self.capacity,
            });
        }
        self.items.push_front(item);
        Ok(())
    }

    /// Remove and return the oldest item.
    pub fn dequeue(&mut self) -> Option<T> {
        self.items.pop_front()
    }

    pub fn peek(&self) -> Option<&T> {
        self.items.front()
    }

    /// Iterate over queued items, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn preserves_insertion_order() {
        let mut queue = BoundedQueue::unbounded();
        for item in ["a", "b", "c"] {
            queue.enqueue(item).expect("unbounded queue accepts items");
        }
        assert_eq!(queue.dequeue(), Some("a"));
        assert_eq!(queue.dequeue(), Some("b"));
        assert_eq!(queue.dequeue(), Some("c"));
        assert_eq!(queue.dequeue(), None);
    }

    #[rstest]
    fn rejects_newest_item_at_capacity() {
        let mut queue = BoundedQueue::new(2);
        queue.enqueue("a").expect("first item fits");
        queue.enqueue("b").expect("second item fits");
        let err = queue.enqueue("c").expect_err("third item must overflow");
        assert_eq!(err.capacity, 2);
        assert_eq!(err.into_inner(), "c");
        assert_eq!(queue.iter().copied().collect::<Vec<_>>(), ["a", "b"]);
    }

    #[rstest]
    fn requeue_front_restores_head() {
        let mut queue = BoundedQueue::new(3);
        for item in [1, 2, 3] {
            queue.enqueue(item).expect("item fits");
        }
        let head = queue.dequeue().expect("queue has a head");
        queue.requeue_front(head).expect("vacated slot is free");
        assert_eq!(queue.iter().copied().collect::<Vec<_>>(), [1, 2, 3]);
        assert!(queue.requeue_front(0).is_err());
    }

    #[rstest]
    fn default_is_unbounded() {
        let queue: BoundedQueue<u8> = BoundedQueue::default();
        assert_eq!(queue.capacity(), usize::MAX);
        assert!(queue.is_empty());
        assert_eq!(queue.peek(), None);
    }

    #[rstest]
    fn zero_capacity_rejects_everything() {
        let mut queue = BoundedQueue::new(0);
        assert!(queue.is_full());
        assert!(queue.enqueue(1).is_err());
        assert_eq!(queue.len(), 0);
    }
}
