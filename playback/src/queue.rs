/*!
    Bounded producer/consumer queue.

    One queue type serves both roles in the pipeline: packet queues between
    the demultiplexer and the decoders, and frame queues between the
    decoders and the presentation side. Capacity and blocking semantics are
    the contract; packet queues get a large bound to absorb read jitter
    while frame queues stay tiny to keep presentation latency low.
*/

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

struct Inner<T> {
    items: VecDeque<T>,
    closed: bool,
}

/**
    A thread-safe bounded FIFO mailbox.

    `push` blocks while the queue is full and `pop` blocks while it is
    empty; `close` is sticky, fails all further pushes, and turns an empty
    queue's pops into the end-of-stream signal (`None`). Closing also wakes
    every blocked producer and consumer, which is what makes coordinated
    shutdown possible without leaking parked threads.
*/
pub struct BoundedQueue<T> {
    inner: Mutex<Inner<T>>,
    not_empty: Condvar,
    not_full: Condvar,
    capacity: usize,
}

impl<T> BoundedQueue<T> {
    /**
        Create a queue holding at most `capacity` items.

        # Panics

        Panics if `capacity` is zero.
    */
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "queue capacity must be at least 1");
        Self {
            inner: Mutex::new(Inner {
                items: VecDeque::with_capacity(capacity),
                closed: false,
            }),
            not_empty: Condvar::new(),
            not_full: Condvar::new(),
            capacity,
        }
    }

    /// The fixed capacity bound.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of items currently queued.
    pub fn len(&self) -> usize {
        self.inner.lock().items.len()
    }

    /// Returns true if no items are queued.
    pub fn is_empty(&self) -> bool {
        self.inner.lock().items.is_empty()
    }

    /// Returns true once the queue has been closed.
    pub fn is_closed(&self) -> bool {
        self.inner.lock().closed
    }

    /**
        Insert at the tail, blocking while the queue is full.

        Wakes one waiting consumer. Returns `false` if the queue is (or
        becomes, while blocked) closed — the item is dropped and the
        producer should wind down.
    */
    #[must_use]
    pub fn push(&self, item: T) -> bool {
        let mut inner = self.inner.lock();
        while inner.items.len() >= self.capacity {
            if inner.closed {
                return false;
            }
            self.not_full.wait(&mut inner);
        }
        if inner.closed {
            return false;
        }
        inner.items.push_back(item);
        self.not_empty.notify_one();
        true
    }

    /**
        Remove from the head, blocking while the queue is empty and open.

        `None` means closed-and-drained: the end of the stream. Wakes one
        waiting producer when an item is taken.
    */
    pub fn pop(&self) -> Option<T> {
        let mut inner = self.inner.lock();
        loop {
            if let Some(item) = inner.items.pop_front() {
                self.not_full.notify_one();
                return Some(item);
            }
            if inner.closed {
                return None;
            }
            self.not_empty.wait(&mut inner);
        }
    }

    /**
        Remove from the head without blocking.

        `None` means the queue is currently empty; check
        [`is_closed`](Self::is_closed) to tell "nothing yet" from "over".
    */
    pub fn try_pop(&self) -> Option<T> {
        let mut inner = self.inner.lock();
        let item = inner.items.pop_front();
        if item.is_some() {
            self.not_full.notify_one();
        }
        item
    }

    /**
        Remove from the head, waiting at most `timeout`.

        `None` on timeout or on closed-and-drained; callers on latency
        sensitive threads use this instead of [`pop`](Self::pop) so they
        can never be parked indefinitely.
    */
    pub fn pop_timeout(&self, timeout: Duration) -> Option<T> {
        let deadline = Instant::now() + timeout;
        let mut inner = self.inner.lock();
        loop {
            if let Some(item) = inner.items.pop_front() {
                self.not_full.notify_one();
                return Some(item);
            }
            if inner.closed {
                return None;
            }
            if self.not_empty.wait_until(&mut inner, deadline).timed_out() {
                let item = inner.items.pop_front();
                if item.is_some() {
                    self.not_full.notify_one();
                }
                return item;
            }
        }
    }

    /**
        Permanently close the queue.

        Queued items stay poppable; further pushes fail. All blocked
        producers and consumers wake up.
    */
    pub fn close(&self) {
        let mut inner = self.inner.lock();
        inner.closed = true;
        self.not_empty.notify_all();
        self.not_full.notify_all();
    }
}
