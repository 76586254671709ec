//! Single-producer single-consumer queue.
//!
//! # Usage
//!
//! ```
//! use ringspmc_rs::{FixedSpscQueue, SpscQueue};
//! use std::thread;
//!
//! // Runtime capacity, heap storage
//! let mut queue = SpscQueue::<u64>::with_capacity(1000).unwrap();
//! let (mut producer, mut consumer) = queue.split();
//!
//! thread::scope(|s| {
//!     s.spawn(move || {
//!         for i in 0..10_000u64 {
//!             while !producer.push(i) {
//!                 std::hint::spin_loop();
//!             }
//!         }
//!     });
//!
//!     let mut expected = 0;
//!     while expected < 10_000 {
//!         if let Some(v) = consumer.pop() {
//!             assert_eq!(v, expected);
//!             expected += 1;
//!         }
//!     }
//! });
//!
//! // Compile-time capacity, inline storage
//! let mut fixed: FixedSpscQueue<u32, 3> = FixedSpscQueue::new();
//! let (mut p, mut c) = fixed.split();
//! assert!(p.push(1) && p.push(2) && p.push(3));
//! assert!(!p.push(4));
//! assert_eq!(c.pop(), Some(1));
//! ```

use crate::capacity::{Capacity, Dynamic, Fixed, WrapPolicy};
use crate::error::CapacityError;
use crate::producer::Producer;
use crate::ring::Ring;
use std::fmt;

/// Bounded lock-free SPSC ring buffer.
///
/// `C` selects the capacity provider: [`Dynamic`] (default, runtime size) or
/// [`Fixed<N>`] (compile-time size, see [`FixedSpscQueue`]).
///
/// Safe access goes through [`split`](Self::split). The raw `push`/`pop`
/// methods are `unsafe` because nothing stops two threads from calling them
/// concurrently.
pub struct SpscQueue<T, C: Capacity = Dynamic> {
    ring: Ring<T, C>,
}

/// SPSC queue with compile-time capacity `N` and inline storage.
pub type FixedSpscQueue<T, const N: usize> = SpscQueue<T, Fixed<N>>;

impl<T> SpscQueue<T, Dynamic> {
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

impl<T, const N: usize> SpscQueue<T, Fixed<N>> {
    /// Creates a queue holding up to `N` values.
    pub fn new() -> Self {
        Self::from_capacity(Fixed::new())
    }
}

impl<T, const N: usize> Default for SpscQueue<T, Fixed<N>> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, C: Capacity> SpscQueue<T, C> {
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

    /// Splits the queue into its producer and consumer ends.
    ///
    /// The exclusive borrow guarantees exactly one of each while they live.
    pub fn split(&mut self) -> (Producer<'_, T, C>, Consumer<'_, T, C>) {
        (Producer::new(&self.ring), Consumer { ring: &self.ring })
    }

    // ---------------------------------------------------------------------
    // RAW API
    // ---------------------------------------------------------------------

    /// Enqueue `value`. Returns `false` (dropping `value`) if the queue is full.
    ///
    /// # Safety
    ///
    /// Only one thread may push to this queue for its lifetime (or at least
    /// no two pushes may overlap).
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

    /// Dequeue the oldest value, or `None` if the queue is empty.
    ///
    /// # Safety
    ///
    /// Only one thread may pop from this queue (or at least no two pops may
    /// overlap).
    #[inline]
    pub unsafe fn pop(&self) -> Option<T> {
        unsafe { self.ring.pop_exclusive() }
    }
}

impl<T, C: Capacity> fmt::Debug for SpscQueue<T, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpscQueue")
            .field("capacity", &self.capacity())
            .field("len", &self.len())
            .field("policy", &self.policy())
            .finish()
    }
}

/// The single consuming end of an [`SpscQueue`].
pub struct Consumer<'a, T, C: Capacity> {
    ring: &'a Ring<T, C>,
}

impl<T, C: Capacity> Consumer<'_, T, C> {
    /// Dequeue the oldest value, or `None` if the queue is empty.
    #[inline]
    pub fn pop(&mut self) -> Option<T> {
        // SAFETY: `split` hands out a single Consumer per queue and pop
        // requires `&mut self`.
        unsafe { self.ring.pop_exclusive() }
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
        f.debug_struct("spsc::Consumer")
            .field("capacity", &self.capacity())
            .field("len", &self.len())
            .finish()
    }
}

#[cfg(all(test, not(feature = "loom")))]
mod tests {
    use super::*;

    #[test]
    fn test_capacity_three_scenario() {
        let mut queue = SpscQueue::<u32>::with_capacity(3).unwrap();
        assert_eq!(queue.policy(), WrapPolicy::Mask);
        let (mut p, mut c) = queue.split();

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
    fn test_fixed_capacity_three_scenario() {
        let mut queue: FixedSpscQueue<u32, 3> = FixedSpscQueue::new();
        let (mut p, mut c) = queue.split();

        for v in 1..=3 {
            assert!(p.push(v));
        }
        assert_eq!(p.try_push(4), Err(4));
        assert!(p.is_full());
        for v in 1..=3 {
            assert_eq!(c.pop(), Some(v));
        }
        assert_eq!(c.pop(), None);
        assert!(c.is_empty());
        assert!(p.push(5));
        assert_eq!(c.pop(), Some(5));
    }

    #[test]
    fn test_non_power_of_two_wraps() {
        let mut queue: FixedSpscQueue<usize, 5> = FixedSpscQueue::new();
        assert_eq!(queue.policy(), WrapPolicy::Modulo);
        let (mut p, mut c) = queue.split();

        let mut next_in = 0;
        let mut next_out = 0;
        for _ in 0..50 {
            while p.push(next_in) {
                next_in += 1;
            }
            assert_eq!(c.len(), 5);
            for _ in 0..3 {
                assert_eq!(c.pop(), Some(next_out));
                next_out += 1;
            }
        }
    }

    #[test]
    fn test_capacity_is_constant() {
        let mut queue = SpscQueue::<u8>::with_capacity(10).unwrap();
        assert_eq!(queue.capacity(), 10);
        {
            let (mut p, c) = queue.split();
            for i in 0..7 {
                assert!(p.push(i));
                assert_eq!(p.capacity(), 10);
                assert_eq!(c.capacity(), 10);
            }
        }
        assert_eq!(queue.capacity(), 10);
        assert_eq!(queue.len(), 7);
    }

    #[test]
    fn test_raw_api() {
        let queue = SpscQueue::<String>::with_capacity(2).unwrap();
        unsafe {
            assert!(queue.push("a".to_string()));
            assert_eq!(queue.try_push("b".to_string()), Ok(()));
            assert_eq!(queue.try_push("c".to_string()), Err("c".to_string()));
            assert_eq!(queue.pop().as_deref(), Some("a"));
            assert_eq!(queue.pop().as_deref(), Some("b"));
            assert_eq!(queue.pop(), None);
        }
    }

    #[test]
    fn test_construction_errors() {
        assert_eq!(
            SpscQueue::<u8>::with_capacity(0).unwrap_err(),
            CapacityError::Zero
        );
        assert!(matches!(
            SpscQueue::<u8>::with_capacity(usize::MAX),
            Err(CapacityError::TooLarge { .. })
        ));
    }

    #[test]
    fn test_debug_output() {
        let queue: FixedSpscQueue<u8, 7> = FixedSpscQueue::default();
        let text = format!("{:?}", queue);
        assert!(text.contains("capacity: 7"));
        assert!(text.contains("Mask"));
    }
}
