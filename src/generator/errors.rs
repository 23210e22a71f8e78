//! generator::errors — error type for trajectory generation.
//!
//! Purpose
//! -------
//! Surface invalid physical or integrator parameters as explicit errors
//! instead of silently producing truncated or meaningless trajectories.
//!
//! Conventions
//! -----------
//! - Every variant carries the offending value(s) so messages are
//!   self-explanatory without additional context.
//! - With the `python-bindings` feature enabled, [`GeneratorError`] converts
//!   into a Python `ValueError`.
#[cfg(feature = "python-bindings")]
use pyo3::{PyErr, exceptions::PyValueError};

/// Result alias for trajectory generation.
pub type GeneratorResult<T> = Result<T, GeneratorError>;

/// Error conditions raised by [`crate::generator::fpu`] and the parameter
/// constructors.
#[derive(Debug, Clone, PartialEq)]
pub enum GeneratorError {
    // ---- Physical parameters ----
    /// A physical parameter is NaN/±inf or outside its admissible range.
    InvalidPhysicalParam { name: &'static str, value: f64, reason: &'static str },

    // ---- Integrator parameters ----
    /// An integrator time parameter is NaN/±inf or outside its admissible range.
    InvalidTimeParam { name: &'static str, value: f64, reason: &'static str },

    /// The save interval is shorter than the step size.
    SaveIntervalTooSmall { dt_save: f64, dt: f64 },

    /// Burn-in must end strictly before the end of the simulation.
    BurnInExceedsTotal { t_burnin: f64, t_total: f64 },

    /// At least one trajectory must be requested.
    EmptyBatch,

    /// The requested window `(t_total - t_burnin) / dt_save` holds no snapshot.
    NoSnapshots { t_burnin: f64, t_total: f64, dt_save: f64 },

    /// A derived step or buffer size does not fit in memory indexing
    /// (`isize::MAX`).
    ScheduleTooLarge { quantity: &'static str, value: f64 },
}

impl std::error::Error for GeneratorError {}

impl std::fmt::Display for GeneratorError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GeneratorError::InvalidPhysicalParam { name, value, reason } => {
                write!(f, "Invalid physical parameter {name} = {value}: {reason}")
            }
            GeneratorError::InvalidTimeParam { name, value, reason } => {
                write!(f, "Invalid integrator parameter {name} = {value}: {reason}")
            }
            GeneratorError::SaveIntervalTooSmall { dt_save, dt } => {
                write!(f, "dt_save ({dt_save}) must be >= dt ({dt}).")
            }
            GeneratorError::BurnInExceedsTotal { t_burnin, t_total } => {
                write!(f, "t_burnin ({t_burnin}) must be strictly less than t_total ({t_total}).")
            }
            GeneratorError::EmptyBatch => write!(f, "batch must be at least 1."),
            GeneratorError::NoSnapshots { t_burnin, t_total, dt_save } => {
                write!(
                    f,
                    "No snapshot fits in (t_total - t_burnin) / dt_save = ({t_total} - {t_burnin}) / {dt_save}."
                )
            }
            GeneratorError::ScheduleTooLarge { quantity, value } => {
                write!(f, "Schedule too large: {quantity} = {value:e} exceeds isize::MAX.")
            }
        }
    }
}

#[cfg(feature = "python-bindings")]
impl From<GeneratorError> for PyErr {
    fn from(err: GeneratorError) -> PyErr {
        PyValueError::new_err(err.to_string())
    }
}
