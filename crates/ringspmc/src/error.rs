//! Construction errors.

use thiserror::Error;

/// Largest usable capacity: the `N + 1` slot count must fit the 32-bit slot
/// index carried in each stamp.
pub const MAX_CAPACITY: usize = u32::MAX as usize - 1;

/// Error returned when a runtime capacity cannot back a ring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CapacityError {
    /// A ring needs at least one usable slot.
    #[error("queue capacity must be at least 1")]
    Zero,
    /// The requested capacity does not fit the 32-bit slot index.
    #[error("queue capacity {requested} exceeds the maximum of {max}")]
    TooLarge {
        /// The capacity that was asked for.
        requested: usize,
        /// The largest capacity a ring supports.
        max: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(
            CapacityError::Zero.to_string(),
            "queue capacity must be at least 1"
        );
        let err = CapacityError::TooLarge {
            requested: usize::MAX,
            max: MAX_CAPACITY,
        };
        assert!(err.to_string().contains("exceeds the maximum"));
    }
}
