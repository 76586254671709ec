use crate::capacity::{Capacity, WrapPolicy};
use crate::invariants::{
    debug_assert_bounded_len, debug_assert_index_in_range, debug_assert_lap_step,
};
use crate::shim::{AtomicU64, Ordering};
use crate::trace::{debug, trace};
use crossbeam_utils::CachePadded;
use std::cell::UnsafeCell;
use std::marker::PhantomData;
use std::mem::MaybeUninit;

// =============================================================================
// MEMORY ORDERING & SYNCHRONIZATION STRATEGY
// =============================================================================
//
// ## Stamps
//
// `head` and `tail` each hold a 64-bit stamp:
//
//     63            32 31             0
//     ┌───────────────┬───────────────┐
//     │      lap      │  slot index   │
//     └───────────────┴───────────────┘
//
// The slot index is always in [0, N] and advances with `Capacity::next`. The
// lap counts how many times the index has wrapped back to slot 0. Every
// full/empty decision compares slot indices only:
//
// - empty  ⟺ index(head) == index(tail)
// - full   ⟺ next(index(tail)) == index(head)
//
// The lap exists for the SPMC compare-and-swap: a consumer that stalls long
// enough for `head` to come all the way around to the same slot index sees a
// different lap, so its CAS fails instead of claiming a recycled slot (ABA).
//
// ## Producer (push)
//
// 1. Load `tail` with Relaxed (only the producer writes tail)
// 2. Load `head` with Acquire (synchronizes with the consumer's publish, so
//    the consumer's read of the slot we are about to reuse is complete)
// 3. Full check; on full return the value untouched
// 4. Write the slot at index(tail) (no ordering needed - protected by protocol)
// 5. Store `tail` with Release (publishes the slot write to consumers)
//
// ## Single consumer (SPSC pop)
//
// 1. Load `head` with Relaxed (only this consumer writes head)
// 2. Load `tail` with Acquire (synchronizes with the producer's publish)
// 3. Empty check
// 4. Move the value out of the slot at index(head)
// 5. Store `head` with Release (hands the slot back to the producer)
//
// ## Shared consumers (SPMC pop)
//
// 1. Load `head` with Acquire as the CAS seed (synchronizes with the CAS
//    that produced it, whose owner had already seen a `tail` past it)
// 2. Load `tail` with Acquire; empty check against the seed
// 3. Copy the slot at index(seed) speculatively into a `MaybeUninit<T>`
// 4. CAS `head` seed -> next(seed) with AcqRel / Acquire
// 5. Success: the copy is ours. Failure: forget the copy (never dropped),
//    take the observed `head` as the new seed, go to 2.
//
// The copy in step 3 happens before this consumer owns the slot. The producer
// cannot overwrite that slot while `head` still designates it: its full check
// sees the old `head` and reports full one slot early. If another consumer
// wins instead, `head` moves on and the slot may be refilled while the loser
// is still copying; that copy is discarded unread because the loser's CAS is
// guaranteed to fail (the stamp has changed).
//
// =============================================================================

const INDEX_BITS: u32 = 32;
const INDEX_MASK: u64 = (1 << INDEX_BITS) - 1;

/// Slot index carried in a stamp.
#[inline]
pub(crate) const fn index(stamp: u64) -> usize {
    (stamp & INDEX_MASK) as usize
}

/// Lap counter carried in a stamp.
#[inline]
pub(crate) const fn lap(stamp: u64) -> u32 {
    (stamp >> INDEX_BITS) as u32
}

#[inline]
fn advance<C: Capacity>(capacity: &C, stamp: u64) -> u64 {
    let next = capacity.next(index(stamp));
    let lap = if next == 0 {
        lap(stamp).wrapping_add(1)
    } else {
        lap(stamp)
    };
    let advanced = (u64::from(lap) << INDEX_BITS) | next as u64;
    debug_assert_lap_step!(stamp, advanced);
    advanced
}

/// Bounded ring shared by the SPSC and SPMC queues.
///
/// Holds `N + 1` slots and the `head`/`tail` stamp pair. Which pop path may be
/// used, and by how many threads, is decided by the wrapping queue type.
///
/// # Memory Layout
///
/// ```text
/// ┌────────────────────────────────────────────────────────────────────┐
/// │ Consumer hot (cache-line padded)                                   │
/// │   head: AtomicU64      ← Consumers write, producer reads           │
/// ├────────────────────────────────────────────────────────────────────┤
/// │ Producer hot (cache-line padded)                                   │
/// │   tail: AtomicU64      ← Producer writes, consumers read           │
/// ├────────────────────────────────────────────────────────────────────┤
/// │ Capacity provider (read-only after construction)                   │
/// ├────────────────────────────────────────────────────────────────────┤
/// │ Slot storage (cache-line padded; inline or boxed)                  │
/// │   N + 1 × UnsafeCell<MaybeUninit<T>>                               │
/// └────────────────────────────────────────────────────────────────────┘
/// ```
pub(crate) struct Ring<T, C: Capacity> {
    // === CONSUMER HOT ===
    /// Stamp of the next slot to consume
    head: CachePadded<AtomicU64>,

    // === PRODUCER HOT ===
    /// Stamp of the next slot to produce into
    tail: CachePadded<AtomicU64>,

    // === CONFIG ===
    capacity: C,

    // === DATA BUFFER ===
    /// Slots in `[head, tail)` are initialized; every other slot is not.
    slots: CachePadded<C::Slots<T>>,

    _owns: PhantomData<T>,
}

// Safety: values move between threads through the slots, so T must be Send.
// Slot access is serialized by the head/tail protocol described above; the
// wrapping queue types uphold the producer/consumer discipline it relies on.
unsafe impl<T: Send, C: Capacity> Send for Ring<T, C> {}
unsafe impl<T: Send, C: Capacity> Sync for Ring<T, C> {}

impl<T, C: Capacity> Ring<T, C> {
    pub(crate) fn new(capacity: C) -> Self {
        let slots = capacity.allocate::<T>();

        debug!(
            capacity = capacity.capacity(),
            policy = ?capacity.policy(),
            element = std::any::type_name::<T>(),
            "ring created"
        );

        Self {
            head: CachePadded::new(AtomicU64::new(0)),
            tail: CachePadded::new(AtomicU64::new(0)),
            capacity,
            slots: CachePadded::new(slots),
            _owns: PhantomData,
        }
    }

    // ---------------------------------------------------------------------
    // STATUS
    // ---------------------------------------------------------------------

    #[inline]
    pub(crate) fn capacity(&self) -> usize {
        self.capacity.capacity()
    }

    #[inline]
    pub(crate) fn policy(&self) -> WrapPolicy {
        self.capacity.policy()
    }

    /// Number of values currently enqueued.
    ///
    /// Exact when no push/pop is in flight; a snapshot in `[0, N]` otherwise.
    pub(crate) fn len(&self) -> usize {
        // head first: a later tail can only be further ahead.
        let head = self.head.load(Ordering::Acquire);
        let tail = self.tail.load(Ordering::Acquire);

        let laps = lap(tail).wrapping_sub(lap(head)) as usize;
        let ahead = laps
            .saturating_mul(self.capacity.slots())
            .saturating_add(index(tail));
        ahead.saturating_sub(index(head)).min(self.capacity())
    }

    #[inline]
    pub(crate) fn is_empty(&self) -> bool {
        let head = self.head.load(Ordering::Acquire);
        let tail = self.tail.load(Ordering::Acquire);
        index(head) == index(tail)
    }

    #[inline]
    pub(crate) fn is_full(&self) -> bool {
        let tail = self.tail.load(Ordering::Acquire);
        let head = self.head.load(Ordering::Acquire);
        self.capacity.next(index(tail)) == index(head)
    }

    #[inline]
    fn slot(&self, index: usize) -> &UnsafeCell<MaybeUninit<T>> {
        debug_assert_index_in_range!(index, self.capacity());
        C::slot(&self.slots, index)
    }

    // ---------------------------------------------------------------------
    // PRODUCER API
    // ---------------------------------------------------------------------

    /// Enqueue `value`, or hand it back if the ring is full.
    ///
    /// # Safety
    ///
    /// At most one thread may be inside `push` for this ring at any time.
    #[inline]
    pub(crate) unsafe fn push(&self, value: T) -> Result<(), T> {
        let tail = self.tail.load(Ordering::Relaxed);
        let next_tail = advance(&self.capacity, tail);

        if index(next_tail) == index(self.head.load(Ordering::Acquire)) {
            return Err(value);
        }

        // SAFETY: the slot at index(tail) is outside [head, tail), so no
        // consumer reads it, and the Acquire load of head above ordered every
        // earlier read of it before this write. Only the single producer
        // writes slots.
        unsafe {
            self.slot(index(tail)).get().cast::<T>().write(value);
        }

        self.tail.store(next_tail, Ordering::Release);
        Ok(())
    }

    // ---------------------------------------------------------------------
    // CONSUMER API
    // ---------------------------------------------------------------------

    /// Dequeue the oldest value, assuming a single consumer.
    ///
    /// # Safety
    ///
    /// No other thread may pop from this ring, through either pop path, while
    /// this call runs.
    #[inline]
    pub(crate) unsafe fn pop_exclusive(&self) -> Option<T> {
        let head = self.head.load(Ordering::Relaxed);
        let tail = self.tail.load(Ordering::Acquire);

        if index(head) == index(tail) {
            return None;
        }

        // SAFETY: index(head) is inside [head, tail), initialized by the
        // producer and published by the Release store the Acquire load of
        // tail synchronized with. We are the only consumer, so the value is
        // moved out exactly once.
        let value = unsafe { self.slot(index(head)).get().cast::<T>().read() };

        self.head
            .store(advance(&self.capacity, head), Ordering::Release);
        Some(value)
    }

    /// Dequeue the oldest value, racing any number of other consumers.
    ///
    /// # Safety
    ///
    /// Every concurrent consumer of this ring must use `pop_shared`;
    /// `pop_exclusive` stores `head` without a CAS and would be lost.
    pub(crate) unsafe fn pop_shared(&self) -> Option<T> {
        // Acquire, not Relaxed: a seed written by another consumer's CAS must
        // bring that consumer's view of `tail` with it, or the empty check
        // below can compare against a stale `tail` and pass on an empty slot.
        let mut head = self.head.load(Ordering::Acquire);

        loop {
            let tail = self.tail.load(Ordering::Acquire);
            if index(head) == index(tail) {
                return None;
            }

            // SAFETY: speculative bitwise copy into MaybeUninit, which carries
            // no validity requirement and is never dropped. If `head` still
            // equals this stamp the slot is initialized and published (see
            // pop_exclusive) and the producer cannot touch it. If `head` has
            // moved on, the producer may be rewriting the slot concurrently.
            // That copy is a data race under the Rust memory model, volatile
            // or not; the CAS below fails and the bytes are discarded unread,
            // which is what keeps the race from being observed in practice.
            let candidate = unsafe { self.slot(index(head)).get().read_volatile() };

            match self.head.compare_exchange_weak(
                head,
                advance(&self.capacity, head),
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                // SAFETY: the CAS made us the sole owner of this slot's value,
                // and the copy was taken while the slot was initialized.
                Ok(_) => return Some(unsafe { candidate.assume_init() }),
                Err(current) => {
                    trace!(
                        expected = head,
                        observed = current,
                        "head contended, retrying"
                    );
                    head = current;
                }
            }
        }
    }
}

impl<T, C: Capacity> Drop for Ring<T, C> {
    fn drop(&mut self) {
        // `&mut self`: no push/pop can be in flight.
        let mut head = self.head.load(Ordering::Relaxed);
        let tail = self.tail.load(Ordering::Relaxed);

        let mut dropped = 0usize;
        while index(head) != index(tail) {
            // SAFETY: slots in [head, tail) hold initialized values that no
            // consumer took; each is dropped exactly once here.
            unsafe {
                self.slot(index(head)).get().cast::<T>().drop_in_place();
            }
            head = advance(&self.capacity, head);
            dropped += 1;
        }

        debug_assert_bounded_len!(dropped, self.capacity());
        if dropped > 0 {
            debug!(dropped, "ring dropped with unconsumed values");
        }
    }
}
