//! Debug assertion macros for ring index invariants.
//!
//! Only active in debug builds (`debug_assert!`), so release builds carry no
//! extra work on the push/pop paths.
//!
//! Used by the shared ring core behind both `SpscQueue` and `SpmcQueue`.

// =============================================================================
// Slot index range
// =============================================================================

/// Assert that a slot index lies in `[0, N]`.
///
/// **Invariant**: `head` and `tail` always designate one of the `N + 1` slots.
///
/// Used in: `push()` and both pop paths, before touching a slot
macro_rules! debug_assert_index_in_range {
    ($index:expr, $capacity:expr) => {
        debug_assert!(
            $index <= $capacity,
            "slot index {} outside [0, {}]",
            $index,
            $capacity
        )
    };
}

// =============================================================================
// Lap progression
// =============================================================================

/// Assert that advancing a stamp moved exactly one slot forward.
///
/// **Invariant**: the lap counter increments exactly when the index wraps to
/// slot 0, and stays put otherwise.
///
/// Used in: `advance()`
macro_rules! debug_assert_lap_step {
    ($old:expr, $new:expr) => {
        debug_assert!(
            {
                let wrapped = $crate::ring::index($new) == 0;
                let expected = if wrapped {
                    $crate::ring::lap($old).wrapping_add(1)
                } else {
                    $crate::ring::lap($old)
                };
                $crate::ring::lap($new) == expected
            },
            "lap step violated: stamp {:#x} advanced to {:#x}",
            $old,
            $new
        )
    };
}

// =============================================================================
// Bounded occupancy
// =============================================================================

/// Assert that an occupancy snapshot never exceeds capacity.
///
/// **Invariant**: `0 ≤ len ≤ N`; the sentinel slot is never occupied.
///
/// Used in: `Drop` for the ring, over the values left behind
macro_rules! debug_assert_bounded_len {
    ($len:expr, $capacity:expr) => {
        debug_assert!(
            $len <= $capacity,
            "occupancy {} exceeds capacity {}",
            $len,
            $capacity
        )
    };
}

pub(crate) use debug_assert_bounded_len;
pub(crate) use debug_assert_index_in_range;
pub(crate) use debug_assert_lap_step;
