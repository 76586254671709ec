//! Slot storage and wraparound policy.
//!
//! A ring with usable capacity `N` owns `N + 1` slots. The extra slot is the
//! sentinel that lets two plain indices tell "empty" (`head == tail`) apart
//! from "full" (`next(tail) == head`) without a shared counter.
//!
//! Two capacity providers back the queues:
//!
//! - [`Fixed<N>`]: `N` is a const generic, the slots live inline in the queue
//!   and the wrap policy is an associated constant the compiler folds away.
//! - [`Dynamic`]: `N` is validated at runtime, the slots live in a boxed slice
//!   and the wrap policy is chosen once per instance.

use crate::error::{CapacityError, MAX_CAPACITY};
use std::cell::UnsafeCell;
use std::mem::MaybeUninit;

/// How an index advances to its successor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WrapPolicy {
    /// `N + 1` is a power of two: `next(i) = (i + 1) & N`.
    Mask,
    /// Any other size: `next(i) = (i + 1) % (N + 1)`.
    Modulo,
}

impl WrapPolicy {
    /// Picks the policy for a ring with usable capacity `capacity`.
    #[inline]
    pub const fn for_capacity(capacity: usize) -> Self {
        if capacity.wrapping_add(1).is_power_of_two() {
            Self::Mask
        } else {
            Self::Modulo
        }
    }

    /// Successor of `index` in a ring of `capacity + 1` slots.
    ///
    /// Both policies produce the same sequence `0, 1, ..., N, 0, 1, ...`;
    /// the mask is only a cheaper way to compute it.
    #[inline]
    pub const fn next(self, index: usize, capacity: usize) -> usize {
        match self {
            Self::Mask => (index + 1) & capacity,
            Self::Modulo => (index + 1) % (capacity + 1),
        }
    }
}

mod sealed {
    pub trait Sealed {}
}

/// Provides a ring's capacity, its slot storage and its index arithmetic.
///
/// Sealed: implemented only by [`Fixed`] and [`Dynamic`].
pub trait Capacity: sealed::Sealed {
    /// Backing storage for `capacity() + 1` slots of `T`.
    #[doc(hidden)]
    type Slots<T>;

    /// Usable slot count `N`.
    fn capacity(&self) -> usize;

    /// The wrap policy in effect for this capacity.
    fn policy(&self) -> WrapPolicy;

    /// Total slot count, sentinel included.
    #[inline]
    fn slots(&self) -> usize {
        self.capacity() + 1
    }

    /// Successor of `index`, wrapping after `N`.
    #[inline]
    fn next(&self, index: usize) -> usize {
        self.policy().next(index, self.capacity())
    }

    #[doc(hidden)]
    fn allocate<T>(&self) -> Self::Slots<T>;

    /// Slot at `index`, which must be in `[0, N]`.
    #[doc(hidden)]
    fn slot<T>(slots: &Self::Slots<T>, index: usize) -> &UnsafeCell<MaybeUninit<T>>;
}

// =============================================================================
// FIXED (compile-time) CAPACITY
// =============================================================================

/// Compile-time capacity `N`, with slots stored inline in the queue.
///
/// `N` must be in `1..=MAX_CAPACITY`; other values fail to compile once a
/// queue of that size is constructed.
///
/// Inline storage means the queue itself is roughly `(N + 1) * size_of::<T>()`
/// bytes. For large `N` put the queue in a `Box` or an `Arc`, or use
/// [`Dynamic`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fixed<const N: usize>(());

impl<const N: usize> Fixed<N> {
    const VALID: () = assert!(
        N >= 1 && N <= MAX_CAPACITY,
        "Fixed capacity must be between 1 and u32::MAX - 1"
    );

    /// Wrap policy, resolved at compile time.
    pub const POLICY: WrapPolicy = WrapPolicy::for_capacity(N);

    /// Creates the provider. Fails to compile for an out-of-range `N`.
    #[inline]
    pub const fn new() -> Self {
        let () = Self::VALID;
        Self(())
    }
}

impl<const N: usize> Default for Fixed<N> {
    fn default() -> Self {
        Self::new()
    }
}

/// Inline storage for `N + 1` slots.
///
/// The sentinel is a separate field because `[T; N + 1]` is not expressible
/// with stable const generics.
pub struct InlineSlots<T, const N: usize> {
    body: [UnsafeCell<MaybeUninit<T>>; N],
    sentinel: UnsafeCell<MaybeUninit<T>>,
}

impl<const N: usize> sealed::Sealed for Fixed<N> {}

impl<const N: usize> Capacity for Fixed<N> {
    type Slots<T> = InlineSlots<T, N>;

    #[inline]
    fn capacity(&self) -> usize {
        N
    }

    #[inline]
    fn policy(&self) -> WrapPolicy {
        Self::POLICY
    }

    #[inline]
    fn next(&self, index: usize) -> usize {
        Self::POLICY.next(index, N)
    }

    fn allocate<T>(&self) -> Self::Slots<T> {
        let () = Self::VALID;
        InlineSlots {
            body: std::array::from_fn(|_| UnsafeCell::new(MaybeUninit::uninit())),
            sentinel: UnsafeCell::new(MaybeUninit::uninit()),
        }
    }

    #[inline]
    fn slot<T>(slots: &Self::Slots<T>, index: usize) -> &UnsafeCell<MaybeUninit<T>> {
        slots.body.get(index).unwrap_or(&slots.sentinel)
    }
}

// =============================================================================
// DYNAMIC (runtime) CAPACITY
// =============================================================================

/// Runtime capacity, with slots stored in a heap-allocated boxed slice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dynamic {
    capacity: usize,
    policy: WrapPolicy,
}

impl Dynamic {
    /// Validates `capacity` and picks its wrap policy.
    ///
    /// # Errors
    ///
    /// - [`CapacityError::Zero`] if `capacity == 0`
    /// - [`CapacityError::TooLarge`] if `capacity > MAX_CAPACITY`
    pub const fn new(capacity: usize) -> Result<Self, CapacityError> {
        if capacity == 0 {
            return Err(CapacityError::Zero);
        }
        if capacity > MAX_CAPACITY {
            return Err(CapacityError::TooLarge {
                requested: capacity,
                max: MAX_CAPACITY,
            });
        }
        Ok(Self {
            capacity,
            policy: WrapPolicy::for_capacity(capacity),
        })
    }
}

impl sealed::Sealed for Dynamic {}

impl Capacity for Dynamic {
    type Slots<T> = Box<[UnsafeCell<MaybeUninit<T>>]>;

    #[inline]
    fn capacity(&self) -> usize {
        self.capacity
    }

    #[inline]
    fn policy(&self) -> WrapPolicy {
        self.policy
    }

    fn allocate<T>(&self) -> Self::Slots<T> {
        let slots = self.slots();
        let mut buffer = Vec::with_capacity(slots);
        buffer.resize_with(slots, || UnsafeCell::new(MaybeUninit::uninit()));
        buffer.into_boxed_slice()
    }

    #[inline]
    fn slot<T>(slots: &Self::Slots<T>, index: usize) -> &UnsafeCell<MaybeUninit<T>> {
        &slots[index]
    }
}
