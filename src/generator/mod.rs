//! generator — stochastic double-well ("FPU") trajectory generation.
//!
//! Purpose
//! -------
//! Produce batches of sample paths of a Langevin particle in a skewable
//! double-well potential, used as ground truth for training and scoring
//! sequence models.
//!
//! Key behaviors
//! -------------
//! - [`FpuParams`] holds the physical constants (coupling, inverse
//!   temperature, well depth, basin location, skewness).
//! - [`IntegratorOpts`] holds the Euler–Maruyama schedule (step, save
//!   interval, burn-in, horizon, batch size, seed).
//! - [`fpu`], [`fpu_with_rng`], and [`fpu_with_noise`] run the solver and
//!   return an `(n_save, batch, 2)` `f32` array of `(momentum, position)`.
//!
//! Invariants & assumptions
//! ------------------------
//! - Parameters are validated before any work is done; inconsistent
//!   schedules are reported as [`GeneratorError`] rather than producing
//!   truncated output.
//! - The save index never exceeds the preallocated buffer.
//! - Every trajectory starts at the origin `p = q = 0`.
//!
//! Conventions
//! -----------
//! - Time axis first, then batch, then the `(p, q)` pair.
//! - Integration runs in `f64`; only the saved snapshots are narrowed to `f32`.
//! - The generator is a pure function apart from consuming its RNG.
pub mod errors;
pub mod fpu;
pub mod params;

pub use self::errors::{GeneratorError, GeneratorResult};
pub use self::fpu::{fpu, fpu_with_noise, fpu_with_rng};
pub use self::params::{FpuParams, IntegratorOpts};
