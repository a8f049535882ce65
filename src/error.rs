//! Errors reported by the sequence contract.
//!
//! Every variant signals a programming error on the caller's side. Nothing
//! here is transient, so nothing is ever retried.

use thiserror::Error;

/// Result type used throughout the crate.
pub type Result<T> = std::result::Result<T, SequenceError>;

/// Error returned when a sequence operation cannot be applied.
///
/// An operation that returns an error has not modified the sequence.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SequenceError {
    /// A single-element index fell outside the valid bounds.
    #[error("index {index} out of bounds (len: {len})")]
    IndexOutOfBounds { index: usize, len: usize },

    /// A range was reversed or reached past the end of the sequence.
    #[error("range {start}..{end} out of bounds (len: {len})")]
    RangeOutOfBounds { start: usize, end: usize, len: usize },

    /// A mutating operation was attempted on a read-only view.
    #[error("{operation} is not supported on an immutable sequence")]
    Unsupported { operation: &'static str },
}

impl SequenceError {
    pub(crate) fn unsupported(operation: &'static str) -> SequenceError {
        return SequenceError::Unsupported { operation };
    }
}

/// Check that `index` addresses an existing element.
pub(crate) fn check_index(index: usize, len: usize) -> Result<()> {
    if index >= len {
        return Err(SequenceError::IndexOutOfBounds { index, len });
    }
    return Ok(());
}

/// Check that `index` is a valid insertion point (`0..=len`).
pub(crate) fn check_insert_index(index: usize, len: usize) -> Result<()> {
    if index > len {
        return Err(SequenceError::IndexOutOfBounds { index, len });
    }
    return Ok(());
}

/// Check that `start..end` is an ordered sub-range of `0..len`.
pub(crate) fn check_range(start: usize, end: usize, len: usize) -> Result<()> {
    if start > end || end > len {
        return Err(SequenceError::RangeOutOfBounds { start, end, len });
    }
    return Ok(());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_checks() {
        assert!(check_index(0, 1).is_ok());
        assert_eq!(
            check_index(1, 1),
            Err(SequenceError::IndexOutOfBounds { index: 1, len: 1 })
        );
        assert!(check_insert_index(1, 1).is_ok());
        assert!(check_insert_index(2, 1).is_err());
    }

    #[test]
    fn range_checks() {
        assert!(check_range(0, 0, 0).is_ok());
        assert!(check_range(2, 5, 5).is_ok());
        assert_eq!(
            check_range(3, 2, 5),
            Err(SequenceError::RangeOutOfBounds { start: 3, end: 2, len: 5 })
        );
        assert!(check_range(0, 6, 5).is_err());
    }

    #[test]
    fn messages() {
        let err = SequenceError::unsupported("insert");
        assert_eq!(err.to_string(), "insert is not supported on an immutable sequence");
        let err = SequenceError::IndexOutOfBounds { index: 7, len: 3 };
        assert_eq!(err.to_string(), "index 7 out of bounds (len: 3)");
    }
}
