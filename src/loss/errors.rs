//! loss::errors — error type for statistics and statistical losses.
#[cfg(feature = "python-bindings")]
use pyo3::{PyErr, exceptions::PyValueError};

/// Result alias for loss construction and evaluation.
pub type LossResult<T> = Result<T, LossError>;

/// Error conditions for [`crate::loss`].
#[derive(Debug, Clone, PartialEq)]
pub enum LossError {
    // ---- Construction ----
    /// Loss name not recognised by `LossKind::from_str`.
    UnknownLoss { name: String },

    /// A statistic option is non-finite or outside its admissible range.
    InvalidOption { name: &'static str, value: f64, reason: &'static str },

    /// Term weights must be finite and >= 0.
    InvalidWeight { weight: f64 },

    /// A `StatLoss` without terms cannot be evaluated.
    NoTerms,

    // ---- Evaluation ----
    /// Prediction and target (or their statistics) disagree in shape.
    ShapeMismatch { expected: Vec<usize>, actual: Vec<usize> },

    /// Too few time steps (or samples) for the requested statistic.
    InsufficientData { needed: usize, actual: usize },

    /// A component has zero (or non-finite) variance, so its
    /// autocorrelation is undefined.
    ZeroVariance { dim: usize },
}

impl std::error::Error for LossError {}

impl std::fmt::Display for LossError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LossError::UnknownLoss { name } => {
                write!(f, "Unknown loss {name:?}; expected 'mse', 'acf', or 'pdf'.")
            }
            LossError::InvalidOption { name, value, reason } => {
                write!(f, "Invalid loss option {name} = {value}: {reason}")
            }
            LossError::InvalidWeight { weight } => {
                write!(f, "Loss term weight must be finite and >= 0; got: {weight}")
            }
            LossError::NoTerms => write!(f, "StatLoss has no terms to evaluate."),
            LossError::ShapeMismatch { expected, actual } => {
                write!(f, "Shape mismatch: expected {expected:?}, got {actual:?}.")
            }
            LossError::InsufficientData { needed, actual } => {
                write!(f, "Need at least {needed} time steps; got {actual}.")
            }
            LossError::ZeroVariance { dim } => {
                write!(f, "Component {dim} has zero variance; autocorrelation is undefined.")
            }
        }
    }
}

#[cfg(feature = "python-bindings")]
impl From<LossError> for PyErr {
    fn from(err: LossError) -> PyErr {
        PyValueError::new_err(err.to_string())
    }
}
