use crate::capacity::Capacity;
use crate::ring::Ring;
use std::fmt;

/// The single producing end of an [`SpscQueue`](crate::SpscQueue) or
/// [`SpmcQueue`](crate::SpmcQueue).
///
/// Obtained from `split()`. There is never more than one `Producer` per
/// queue, and `push` takes `&mut self`, so the producer side of the ring is
/// driven by exactly one thread at a time. Move it to the producing thread.
pub struct Producer<'a, T, C: Capacity> {
    ring: &'a Ring<T, C>,
}

impl<'a, T, C: Capacity> Producer<'a, T, C> {
    pub(crate) fn new(ring: &'a Ring<T, C>) -> Self {
        Self { ring }
    }

    /// Enqueue `value`. Returns `false` (dropping `value`) if the queue is full.
    ///
    /// Use [`try_push`](Self::try_push) to keep a rejected value.
    #[inline]
    pub fn push(&mut self, value: T) -> bool {
        self.try_push(value).is_ok()
    }

    /// Enqueue `value`, or return it as `Err(value)` if the queue is full.
    #[inline]
    pub fn try_push(&mut self, value: T) -> Result<(), T> {
        // SAFETY: `split` hands out a single Producer per queue and push
        // requires `&mut self`, so no other thread is pushing.
        unsafe { self.ring.push(value) }
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

    /// Returns true if the next push would be rejected.
    #[inline]
    pub fn is_full(&self) -> bool {
        self.ring.is_full()
    }
}

impl<T, C: Capacity> fmt::Debug for Producer<'_, T, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Producer")
            .field("capacity", &self.capacity())
            .field("len", &self.len())
            .finish()
    }
}
