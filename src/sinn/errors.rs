//! sinn::errors — error type for the recurrent sequence model.
//!
//! Covers configuration checks at construction time and shape checks at
//! call time (input features, carried state, flat parameter vectors).
#[cfg(feature = "python-bindings")]
use pyo3::{PyErr, exceptions::PyValueError};

/// Result alias for sequence-model operations.
pub type SinnResult<T> = Result<T, SinnError>;

/// Error conditions for [`crate::sinn::Sinn`].
#[derive(Debug, Clone, PartialEq)]
pub enum SinnError {
    // ---- Configuration ----
    /// A size in [`crate::sinn::SinnConfig`] is zero.
    InvalidConfig { param: &'static str, value: usize, reason: &'static str },

    /// Dropout probability must be finite and in `[0, 1)`.
    InvalidDropout { p: f64 },

    // ---- Call-time shapes ----
    /// Last input axis does not match `observed_dimension`.
    InputDimension { expected: usize, actual: usize },

    /// Carried `(h, c)` state is not `(num_layers, batch, hidden_size)`.
    StateShape { expected: [usize; 3], actual: [usize; 3] },

    /// Flat parameter vector has the wrong length.
    ParameterLength { expected: usize, actual: usize },
}

impl std::error::Error for SinnError {}

impl std::fmt::Display for SinnError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SinnError::InvalidConfig { param, value, reason } => {
                write!(f, "Invalid model configuration {param} = {value}: {reason}")
            }
            SinnError::InvalidDropout { p } => {
                write!(f, "Dropout probability must be finite and in [0, 1); got: {p}")
            }
            SinnError::InputDimension { expected, actual } => {
                write!(f, "Input has {actual} features per step; model expects {expected}.")
            }
            SinnError::StateShape { expected, actual } => {
                write!(f, "State shape {actual:?} does not match expected {expected:?}.")
            }
            SinnError::ParameterLength { expected, actual } => {
                write!(f, "Parameter vector has length {actual}; model has {expected} parameters.")
            }
        }
    }
}

#[cfg(feature = "python-bindings")]
impl From<SinnError> for PyErr {
    fn from(err: SinnError) -> PyErr {
        PyValueError::new_err(err.to_string())
    }
}
