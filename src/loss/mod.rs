//! loss — statistics of trajectory ensembles and losses built on them.
//!
//! Purpose
//! -------
//! Score model output against target trajectories by comparing summary
//! statistics (autocorrelation, marginal density) rather than paths, plus a
//! plain MSE for supervised checks.
//!
//! Key behaviors
//! -------------
//! - [`acf`] / [`pdf`] compute the statistics of a `(time, batch, dim)` array.
//! - [`make_loss`] turns a [`LossKind`] and a target into a [`LossFn`].
//! - [`StatLoss`] combines named [`LossFn`]s with non-negative weights.
//! - Everything that scores a prediction implements [`Loss`].
//!
//! Conventions
//! -----------
//! - Inputs are `f32` (model precision); statistics and loss values are `f64`.
//! - Failures surface as [`LossError`]; no loss returns NaN for valid input.
pub mod errors;
pub mod losses;
pub mod stat_loss;
pub mod stats;

pub use self::errors::{LossError, LossResult};
pub use self::losses::{Loss, LossFn, LossKind, make_loss};
pub use self::stat_loss::{StatLoss, StatTerm};
pub use self::stats::{AcfOpts, PdfOpts, acf, pdf};
