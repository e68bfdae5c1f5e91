//! Error types for the Strata container library.
//!
//! Container operations report three kinds of failure: checked access past
//! the live window, an insertion position outside `[begin, end]`, and a
//! backing allocation that could not be satisfied. Configuration mistakes
//! have their own enum so they never mix with runtime container errors.

use std::error::Error;
use std::fmt;

/// Errors reported synchronously by container operations.
///
/// None of these are retried internally. Precondition violations on
/// unchecked accessors are not represented here; they panic (safe API) or
/// are undefined behaviour (`unsafe` API).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ContainerError {
    /// Checked access at or beyond the current length.
    OutOfRange {
        /// The requested index.
        index: usize,
        /// Number of live elements at the time of the request.
        len: usize,
    },
    /// An insertion position that does not address a slot in `[begin, end]`.
    InvalidArgument {
        /// The rejected position, as an element index.
        position: usize,
        /// Number of live elements at the time of the request.
        len: usize,
    },
    /// The backing memory request could not be satisfied.
    ///
    /// Also reported when the request size overflows `isize::MAX` bytes;
    /// in that case `bytes` is `usize::MAX`.
    AllocationFailure {
        /// Size of the failed request in bytes.
        bytes: usize,
        /// Alignment of the failed request in bytes.
        align: usize,
    },
}

impl ContainerError {
    /// Allocation failure for a request whose size computation overflowed.
    pub fn capacity_overflow(align: usize) -> Self {
        Self::AllocationFailure {
            bytes: usize::MAX,
            align,
        }
    }

    /// Whether this error came from the allocator rather than from the caller.
    pub fn is_allocation_failure(&self) -> bool {
        matches!(self, Self::AllocationFailure { .. })
    }
}

impl fmt::Display for ContainerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfRange { index, len } => {
                write!(f, "index {index} is out of range for length {len}")
            }
            Self::InvalidArgument { position, len } => {
                write!(
                    f,
                    "insertion position {position} is outside the valid range 0..={len}"
                )
            }
            Self::AllocationFailure { bytes, align } if *bytes == usize::MAX => {
                write!(f, "capacity overflow (align {align})")
            }
            Self::AllocationFailure { bytes, align } => {
                write!(f, "allocation of {bytes} bytes (align {align}) failed")
            }
        }
    }
}

impl Error for ContainerError {}

/// Errors from validating a [`DequeConfig`](crate::DequeConfig).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// The per-block byte budget was zero.
    ZeroBlockBytes,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroBlockBytes => write!(f, "block byte budget must be non-zero"),
        }
    }
}

impl Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_range_message_names_index_and_len() {
        let err = ContainerError::OutOfRange { index: 7, len: 3 };
        assert_eq!(err.to_string(), "index 7 is out of range for length 3");
    }

    #[test]
    fn invalid_argument_message_shows_inclusive_range() {
        let err = ContainerError::InvalidArgument {
            position: 9,
            len: 4,
        };
        assert!(err.to_string().contains("0..=4"));
    }

    #[test]
    fn capacity_overflow_is_an_allocation_failure() {
        let err = ContainerError::capacity_overflow(8);
        assert!(err.is_allocation_failure());
        assert_eq!(err.to_string(), "capacity overflow (align 8)");
    }

    #[test]
    fn plain_allocation_failure_display() {
        let err = ContainerError::AllocationFailure {
            bytes: 4096,
            align: 16,
        };
        assert_eq!(err.to_string(), "allocation of 4096 bytes (align 16) failed");
        assert!(!ContainerError::OutOfRange { index: 0, len: 0 }.is_allocation_failure());
    }

    #[test]
    fn config_error_display() {
        assert_eq!(
            ConfigError::ZeroBlockBytes.to_string(),
            "block byte budget must be non-zero"
        );
    }
}
