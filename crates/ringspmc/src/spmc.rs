//! Single-producer multi-consumer queue.
//!
//! Consumers race to advance `head` with a compare-and-swap; each value is
//! delivered to exactly one of them. Which consumer gets which value is
//! unspecified, but values leave the ring in the order they were pushed.
//!
//! # Usage
//!
//! ```
//! use ringspmc_rs::SpmcQueue;
//! use std::thread;
//!
//! let mut queue = SpmcQueue::<u32>::with_capacity(64).unwrap();
//! let (mut producer, consumer) = queue.split();
//!
//! for i in 0..64 {
//!     assert!(producer.push(i));
//! }
//!
//! let mut all: Vec<u32> = thread::scope(|s| {
//!     let workers: Vec<_> = (0..4)
//!         .map(|_| {
//!             let consumer = consumer.clone();
//!             s.spawn(move || {
//!                 let mut got = Vec::new();
//!                 while let Some(v) = consumer.pop() {
//!                     got.push(v);
//!                 }
//!                 got
//!             })
//!         })
//!         .collect();
//!     workers.into_iter().flat_map(|w| w.join().unwrap()).collect()
//! });
//!
//! all.sort_unstable();
//! assert_eq!(all, (0..64).collect::<Vec<_>>());
//! ```

use crate::capacity::{Capacity, Dynamic, Fixed, WrapPolicy};
use crate::error::CapacityError;
use crate::producer::Producer;
use crate::ring::Ring;
use std::fmt;

/// Bounded lock-free SPMC ring buffer.
///
/// `C` selects the capacity provider: [`Dynamic`] (default, runtime size) or
/// [`Fixed<N>`] (compile-time size, see [`FixedSpmcQueue`]).
///
/// [`pop`](Self::pop) is safe from any number of threads. Pushing is
/// restricted to one thread: use [`split`](Self::split), or the `unsafe`
/// raw [`push`](Self::push).
pub struct SpmcQueue<T, C: Capacity = Dynamic> {
    ring: Ring<T, C>,
}

/// SPMC queue with compile-time capacity `N` and inline storage.
pub type FixedSpmcQueue<T, const N: usize> = SpmcQueue<T, Fixed<N>>;

impl<T> SpmcQueue<T, Dynamic> {
    /// Creates a queue holding up to `capacity` values.
    ///
    /// # Errors
    ///
    /// Returns [`CapacityError`] if `capacity` is zero or too large for a
    /// 32-bit slot index.
    pub fn with_capacity(capacity: usize) -> Result<Self, CapacityError> {
        Ok(Self::from_capacity(Dynamic::new(capacity)?))
    }
}

impl<T, const N: usize> SpmcQueue<T, Fixed<N>> {
    /// Creates a queue holding up to `N` values.
    pub fn new() -> Self {
        Self::from_capacity(Fixed::new())
    }
}

impl<T, const N: usize> Default for SpmcQueue<T, Fixed<N>> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, C: Capacity> SpmcQueue<T, C> {
    /// Creates a queue from an already-validated capacity provider.
    pub fn from_capacity(capacity: C) -> Self {
        Self {
            ring: Ring::new(capacity),
        }
    }

    /// Usable capacity `N`. Constant for the queue's lifetime.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.ring.capacity()
    }

    /// Index wrap policy chosen for this capacity.
    #[inline]
    pub fn policy(&self) -> WrapPolicy {
        self.ring.policy()
    }

    /// Number of values currently enqueued (a snapshot under concurrency).
    #[inline]
    pub fn len(&self) -> usize {
        self.ring.len()
    }

    /// Returns true if no values are enqueued.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ring.is_empty()
    }

    /// Returns true if the next push would be rejected.
    #[inline]
    pub fn is_full(&self) -> bool {
        self.ring.is_full()
    }

    /// Splits the queue into its producer and a cloneable consumer handle.
    pub fn split(&mut self) -> (Producer<'_, T, C>, Consumer<'_, T, C>) {
        (Producer::new(&self.ring), Consumer { ring: &self.ring })
    }

    /// Dequeue the oldest value not yet claimed by another consumer, or
    /// `None` if the queue was observed empty.
    ///
    /// Never blocks. Under contention it retries the claim until it wins a
    /// slot or sees the queue empty.
    #[inline]
    pub fn pop(&self) -> Option<T> {
        // SAFETY: SpmcQueue never exposes the exclusive pop path.
        unsafe { self.ring.pop_shared() }
    }

    /// Enqueue `value`. Returns `false` (dropping `value`) if the queue is full.
    ///
    /// # Safety
    ///
    /// Only one thread may push to this queue (or at least no two pushes may
    /// overlap), and not while a [`Producer`] from [`split`](Self::split) is
    /// alive.
    #[inline]
    pub unsafe fn push(&self, value: T) -> bool {
        unsafe { self.ring.push(value).is_ok() }
    }

    /// Enqueue `value`, or return it as `Err(value)` if the queue is full.
    ///
    /// # Safety
    ///
    /// Same contract as [`push`](Self::push).
    #[inline]
    pub unsafe fn try_push(&self, value: T) -> Result<(), T> {
        unsafe { self.ring.push(value) }
    }
}

impl<T, C: Capacity> fmt::Debug for SpmcQueue<T, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpmcQueue")
            .field("capacity", &self.capacity())
            .field("len", &self.len())
            .field("policy", &self.policy())
            .finish()
    }
}

/// A consuming handle to an [`SpmcQueue`]. Clone it once per consumer thread.
pub struct Consumer<'a, T, C: Capacity> {
    ring: &'a Ring<T, C>,
}

impl<T, C: Capacity> Clone for Consumer<'_, T, C> {
    fn clone(&self) -> Self {
        Self { ring: self.ring }
    }
}

impl<T, C: Capacity> Consumer<'_, T, C> {
    /// Dequeue the oldest unclaimed value, or `None` if the queue was
    /// observed empty.
    #[inline]
    pub fn pop(&self) -> Option<T> {
        // SAFETY: every consumer of an SpmcQueue goes through pop_shared.
        unsafe { self.ring.pop_shared() }
    }

    /// Usable capacity `N`.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.ring.capacity()
    }

    /// Number of values currently enqueued (a snapshot under concurrency).
    #[inline]
    pub fn len(&self) -> usize {
        self.ring.len()
    }

    /// Returns true if no values are enqueued.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ring.is_empty()
    }
}

impl<T, C: Capacity> fmt::Debug for Consumer<'_, T, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("spmc::Consumer")
            .field("capacity", &self.capacity())
            .field("len", &self.len())
            .finish()
    }
}

#[cfg(all(test, not(feature = "loom")))]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_capacity_three_scenario() {
        let mut queue: FixedSpmcQueue<u32, 3> = FixedSpmcQueue::new();
        let (mut p, c) = queue.split();

        assert!(p.push(1));
        assert!(p.push(2));
        assert!(p.push(3));
        assert!(!p.push(4));
        assert_eq!(c.pop(), Some(1));
        assert_eq!(c.pop(), Some(2));
        assert_eq!(c.pop(), Some(3));
        assert_eq!(c.pop(), None);
        assert!(p.push(5));
        assert_eq!(c.pop(), Some(5));
    }

    #[test]
    fn test_two_consumers_capacity_eight() {
        let mut queue = SpmcQueue::<u32>::with_capacity(8).unwrap();
        assert_eq!(queue.policy(), WrapPolicy::Modulo);
        let (mut p, c) = queue.split();

        for i in 0..8 {
            assert!(p.push(i));
        }
        assert!(p.is_full());

        let (a, b) = thread::scope(|s| {
            let ca = c.clone();
            let cb = c.clone();
            let ha = s.spawn(move || std::iter::from_fn(|| ca.pop()).collect::<Vec<_>>());
            let hb = s.spawn(move || std::iter::from_fn(|| cb.pop()).collect::<Vec<_>>());
            (ha.join().unwrap(), hb.join().unwrap())
        });

        // Each consumer sees its own share in FIFO order.
        assert!(a.windows(2).all(|w| w[0] < w[1]));
        assert!(b.windows(2).all(|w| w[0] < w[1]));

        let mut all: Vec<u32> = a.into_iter().chain(b).collect();
        all.sort_unstable();
        assert_eq!(all, (0..8).collect::<Vec<_>>());
        assert!(c.is_empty());
    }

    #[test]
    fn test_queue_pop_is_shared() {
        let queue = SpmcQueue::<u64>::with_capacity(4).unwrap();
        unsafe {
            assert!(queue.push(10));
            assert!(queue.push(20));
        }
        assert_eq!(queue.pop(), Some(10));
        assert_eq!(queue.len(), 1);
        assert_eq!(queue.pop(), Some(20));
        assert_eq!(queue.pop(), None);
    }

    #[test]
    fn test_try_push_returns_value() {
        let mut queue: FixedSpmcQueue<Box<u32>, 1> = FixedSpmcQueue::default();
        let (mut p, c) = queue.split();
        assert_eq!(p.try_push(Box::new(1)), Ok(()));
        assert_eq!(p.try_push(Box::new(2)), Err(Box::new(2)));
        assert_eq!(c.pop(), Some(Box::new(1)));
        assert_eq!(p.try_push(Box::new(3)), Ok(()));
    }
}
