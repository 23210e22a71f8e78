//! hall_of_fame::errors — error type for the best-model ledger.
//!
//! Only construction and rank lookup can fail; `add` is total.
#[cfg(feature = "python-bindings")]
use pyo3::{
    PyErr,
    exceptions::{PyIndexError, PyValueError},
};

/// Result alias for Hall-of-Fame operations.
pub type HallOfFameResult<T> = Result<T, HallOfFameError>;

/// Error conditions for [`crate::hall_of_fame::HallOfFame`].
#[derive(Debug, Clone, PartialEq)]
pub enum HallOfFameError {
    /// A ledger must be able to hold at least one entry.
    ZeroCapacity,

    /// Rank lookup outside `[0, len)`.
    IndexOutOfRange { index: usize, len: usize },
}

impl std::error::Error for HallOfFameError {}

impl std::fmt::Display for HallOfFameError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HallOfFameError::ZeroCapacity => write!(f, "Hall of fame capacity must be >= 1."),
            HallOfFameError::IndexOutOfRange { index, len } => {
                write!(f, "Rank {index} is out of range for a hall of fame holding {len} entries.")
            }
        }
    }
}

#[cfg(feature = "python-bindings")]
impl From<HallOfFameError> for PyErr {
    fn from(err: HallOfFameError) -> PyErr {
        match err {
            HallOfFameError::IndexOutOfRange { .. } => PyIndexError::new_err(err.to_string()),
            HallOfFameError::ZeroCapacity => PyValueError::new_err(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    // Purpose
    // -------
    // The out-of-range message reports both the requested rank and the length.
    //
    // Given
    // -----
    // - `IndexOutOfRange { index: 7, len: 3 }`.
    //
    // Expect
    // ------
    // - "7" and "3" appear in the message.
    fn index_out_of_range_reports_rank_and_len() {
        // Arrange
        let err = HallOfFameError::IndexOutOfRange { index: 7, len: 3 };

        // Act
        let msg = err.to_string();

        // Assert
        assert!(msg.contains('7') && msg.contains('3'), "Got: {msg}");
    }
}
