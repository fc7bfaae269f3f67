// lodestar_core/src/queue.rs

use std::collections::VecDeque;
use std::sync::{Condvar, Mutex};

/// A thread-safe FIFO queue with a capacity cap and a drop-oldest overflow
/// policy, paired with a condition variable that wakes the consumer.
///
/// `push` and the consumer wake-up form one atomic unit from the producer's
/// perspective; the consumer side loops on the emptiness check, so spurious
/// or coalesced wake-ups are harmless.
#[derive(Debug)]
pub struct BoundedWorkQueue<T> {
    inner: Mutex<QueueInner<T>>,
    ready: Condvar,
}

#[derive(Debug)]
struct QueueInner<T> {
    items: VecDeque<T>,
    capacity: usize,
    closed: bool,
}

impl<T> BoundedWorkQueue<T> {
    pub fn new(capacity: usize) -> Self {
        // Capacity comes from deserialized config; a zero is clamped to
        // one rather than treated as fatal.
        let capacity = capacity.max(1);
        Self {
            inner: Mutex::new(QueueInner {
                items: VecDeque::with_capacity(capacity),
                capacity,
                closed: false,
            }),
            ready: Condvar::new(),
        }
    }

    /// Append an item, evicting the oldest entries if the queue would exceed
    /// its capacity, and wake one waiting consumer. Returns the number of
    /// evicted items so the caller can log the loss.
    pub fn push(&self, item: T) -> usize {
        let mut inner = self.inner.lock().unwrap();
        inner.items.push_back(item);
        let mut dropped = 0;
        while inner.items.len() > inner.capacity {
            inner.items.pop_front();
            dropped += 1;
        }
        drop(inner);
        self.ready.notify_one();
        dropped
    }

    /// Block until an item is available and take it. Returns `None` once the
    /// queue has been closed and drained.
    pub fn wait_pop(&self) -> Option<T> {
        let mut inner = self.inner.lock().unwrap();
        loop {
            if let Some(item) = inner.items.pop_front() {
                return Some(item);
            }
            if inner.closed {
                return None;
            }
            inner = self.ready.wait(inner).unwrap();
        }
    }

    /// Take an item if one is immediately available.
    pub fn try_pop(&self) -> Option<T> {
        self.inner.lock().unwrap().items.pop_front()
    }

    /// Mark the queue closed and wake every waiter. Items already queued can
    /// still be drained; the shutdown decision itself lives with the caller.
    pub fn close(&self) {
        self.inner.lock().unwrap().closed = true;
        self.ready.notify_all();
    }

    pub fn len(&self) -> usize {
        self.inner.lock().unwrap().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn zero_capacity_clamps_to_one() {
        let queue = BoundedWorkQueue::new(0);
        assert_eq!(queue.push(1), 0);
        assert_eq!(queue.push(2), 1);
        assert_eq!(queue.try_pop(), Some(2));
        assert_eq!(queue.try_pop(), None);
    }

    #[test]
    fn no_eviction_below_capacity() {
        let queue = BoundedWorkQueue::new(4);
        for i in 0..4 {
            assert_eq!(queue.push(i), 0);
        }
        assert_eq!(queue.len(), 4);
    }

    #[test]
    fn overflow_evicts_exactly_the_oldest() {
        let queue = BoundedWorkQueue::new(4);
        for i in 0..4 {
            queue.push(i);
        }
        // The fifth push evicts exactly one item, the oldest.
        assert_eq!(queue.push(4), 1);
        assert_eq!(queue.len(), 4);
        let drained: Vec<i32> = std::iter::from_fn(|| queue.try_pop()).collect();
        assert_eq!(drained, vec![1, 2, 3, 4]);
    }

    #[test]
    fn survivors_keep_fifo_order_under_sustained_overflow() {
        let queue = BoundedWorkQueue::new(100);
        let mut total_dropped = 0;
        for i in 0..150 {
            total_dropped += queue.push(i);
        }
        assert_eq!(total_dropped, 50);
        assert_eq!(queue.len(), 100);
        let drained: Vec<i32> = std::iter::from_fn(|| queue.try_pop()).collect();
        let expected: Vec<i32> = (50..150).collect();
        assert_eq!(drained, expected);
    }

    #[test]
    fn close_wakes_and_drains() {
        let queue = Arc::new(BoundedWorkQueue::new(8));
        queue.push(7);
        queue.close();
        // Queued items survive the close; afterwards the consumer sees None.
        assert_eq!(queue.wait_pop(), Some(7));
        assert_eq!(queue.wait_pop(), None);
    }

    #[test]
    fn consumer_thread_observes_fifo_order() {
        let queue = Arc::new(BoundedWorkQueue::new(64));
        let consumer_queue = Arc::clone(&queue);
        let consumer = thread::spawn(move || {
            let mut seen = Vec::new();
            while let Some(item) = consumer_queue.wait_pop() {
                seen.push(item);
            }
            seen
        });

        for i in 0..32 {
            queue.push(i);
        }
        queue.close();
        let seen = consumer.join().unwrap();
        assert_eq!(seen, (0..32).collect::<Vec<i32>>());
    }
}
