//! sinn — recurrent sequence model for reconstructing stochastic dynamics.
//!
//! Purpose
//! -------
//! Provide the forward map of a statistics-informed neural network: a
//! multi-layer LSTM over the observed series followed by a linear readout,
//! with optional input dropout during training.
//!
//! Key behaviors
//! -------------
//! - [`SinnConfig`] validates the architecture (sizes, dropout probability).
//! - [`Sinn`] owns the weights, runs `forward` / `forward_train`, and exposes
//!   its parameters as a flat vector for an external optimizer.
//! - [`LstmState`] is the `(h, c)` pair the caller threads between calls.
//!
//! Invariants & assumptions
//! ------------------------
//! - Inputs are `(seq_len, batch, observed_dimension)` `f32` arrays; outputs
//!   are `(seq_len, batch, output_size)`.
//! - The model is stateless between calls; all recurrence state lives in the
//!   caller's [`LstmState`].
//! - Shape mismatches surface as [`SinnError`] values.
//!
//! Conventions
//! -----------
//! - Time-major layout, matching the trajectory generator's output.
//! - Gradients and the optimisation loop are out of scope; callers that need
//!   them drive the model through `parameters` / `set_parameters`.
pub mod config;
pub mod errors;
pub mod lstm;
pub mod model;

pub use self::config::SinnConfig;
pub use self::errors::{SinnError, SinnResult};
pub use self::lstm::{Linear, LstmLayer, LstmState};
pub use self::model::Sinn;
