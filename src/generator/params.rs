//! Physical and integrator parameters for the double-well generator.
//!
//! Purpose
//! -------
//! Keep the Langevin model constants ([`FpuParams`]) apart from the numerical
//! schedule of the Euler–Maruyama solver ([`IntegratorOpts`]) so callers can
//! vary one without touching the other.
//!
//! Conventions
//! -----------
//! - All times are in the same (arbitrary) unit; `dt` is the solver step.
//! - Step counts are derived with [`floor_div`], which tolerates the
//!   representation error of decimal step sizes (e.g. `0.2 / 0.001`).
//! - Constructors validate; the plain struct fields stay public so tests and
//!   callers can tweak a default and re-validate through `validate()`.
use crate::generator::errors::{GeneratorError, GeneratorResult};

/// Relative slack used when flooring ratios of decimal time parameters.
const FLOOR_EPS: f64 = 1e-9;

/// `floor(numerator / denominator)` robust to round-off just below an integer.
pub fn floor_div(numerator: f64, denominator: f64) -> usize {
    let ratio = numerator / denominator;
    (ratio + FLOOR_EPS * ratio.abs().max(1.0)).floor().max(0.0) as usize
}

/// FpuParams — constants of the double-well Langevin system.
///
/// Fields
/// ------
/// - `gamma`: coupling (friction) constant, `>= 0`.
/// - `beta`: inverse temperature, `> 0`.
/// - `u0`: depth of the wells.
/// - `x0`: location of the basins, non-zero.
/// - `sigma`: skewness of the double well.
///
/// Notes
/// -----
/// The defaults `(1, 1, 5, 1, 0)` give a symmetric double well with minima
/// at `q = ±1`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FpuParams {
    pub gamma: f64,
    pub beta: f64,
    pub u0: f64,
    pub x0: f64,
    pub sigma: f64,
}

impl FpuParams {
    /// Construct and validate a parameter set.
    ///
    /// # Errors
    /// [`GeneratorError::InvalidPhysicalParam`] when a value is non-finite,
    /// `gamma < 0`, `beta <= 0`, or `x0 == 0`.
    pub fn new(gamma: f64, beta: f64, u0: f64, x0: f64, sigma: f64) -> GeneratorResult<Self> {
        let params = FpuParams { gamma, beta, u0, x0, sigma };
        params.validate()?;
        Ok(params)
    }

    /// Re-run the constructor checks on the current field values.
    pub fn validate(&self) -> GeneratorResult<()> {
        let fields = [
            ("gamma", self.gamma),
            ("beta", self.beta),
            ("u0", self.u0),
            ("x0", self.x0),
            ("sigma", self.sigma),
        ];
        for (name, value) in fields {
            if !value.is_finite() {
                return Err(GeneratorError::InvalidPhysicalParam {
                    name,
                    value,
                    reason: "must be finite",
                });
            }
        }
        if self.gamma < 0.0 {
            return Err(GeneratorError::InvalidPhysicalParam {
                name: "gamma",
                value: self.gamma,
                reason: "must be >= 0",
            });
        }
        if self.beta <= 0.0 {
            return Err(GeneratorError::InvalidPhysicalParam {
                name: "beta",
                value: self.beta,
                reason: "must be > 0",
            });
        }
        if self.x0 == 0.0 {
            return Err(GeneratorError::InvalidPhysicalParam {
                name: "x0",
                value: self.x0,
                reason: "must be non-zero",
            });
        }
        Ok(())
    }

    /// Derivative of the double-well potential at position `q`:
    /// `4·U0/x0⁴·q³ − 4·U0/x0²·q + σ/(2·x0)`.
    ///
    /// The conservative force is the negative of this value.
    pub fn potential_gradient(&self, q: f64) -> f64 {
        let x0_sq = self.x0 * self.x0;
        4.0 * self.u0 / (x0_sq * x0_sq) * q * q * q - 4.0 * self.u0 / x0_sq * q
            + self.sigma / (2.0 * self.x0)
    }

    /// Standard deviation of the random impulse over one step,
    /// `sqrt(2·dt·γ/β)` (fluctuation–dissipation scaling).
    pub fn noise_scale(&self, dt: f64) -> f64 {
        (2.0 * dt * self.gamma / self.beta).sqrt()
    }
}

impl Default for FpuParams {
    fn default() -> Self {
        FpuParams { gamma: 1.0, beta: 1.0, u0: 5.0, x0: 1.0, sigma: 0.0 }
    }
}

/// IntegratorOpts — schedule of the Euler–Maruyama solver.
///
/// Fields
/// ------
/// - `dt`: solver step, `> 0`.
/// - `dt_save`: time between saved snapshots, `>= dt`.
/// - `t_burnin`: leading simulated time that is discarded, in `[0, t_total)`.
/// - `t_total`: total simulated time per trajectory.
/// - `batch`: number of independent trajectories, `>= 1`.
/// - `seed`: `Some(seed)` for reproducible noise, `None` for OS entropy.
/// - `verbose`: log progress when the `obs_slog` feature is enabled.
///
/// Invariants
/// ----------
/// - `n_save() >= 1` after validation.
/// - The output buffer has exactly `n_save()` rows; a save cadence that would
///   write more rows stops at the buffer end.
#[derive(Debug, Clone, PartialEq)]
pub struct IntegratorOpts {
    pub dt: f64,
    pub dt_save: f64,
    pub t_burnin: f64,
    pub t_total: f64,
    pub batch: usize,
    pub seed: Option<u64>,
    pub verbose: bool,
}

impl IntegratorOpts {
    /// Construct and validate a solver schedule.
    ///
    /// # Errors
    /// - [`GeneratorError::InvalidTimeParam`] for non-finite or non-positive times.
    /// - [`GeneratorError::SaveIntervalTooSmall`] when `dt_save < dt`.
    /// - [`GeneratorError::BurnInExceedsTotal`] when `t_burnin >= t_total`.
    /// - [`GeneratorError::EmptyBatch`] when `batch == 0`.
    /// - [`GeneratorError::ScheduleTooLarge`] when the step count or the output
    ///   size reaches `isize::MAX`.
    /// - [`GeneratorError::NoSnapshots`] when the save window holds no snapshot.
    pub fn new(
        dt: f64, dt_save: f64, t_burnin: f64, t_total: f64, batch: usize, seed: Option<u64>,
    ) -> GeneratorResult<Self> {
        let opts = IntegratorOpts { dt, dt_save, t_burnin, t_total, batch, seed, verbose: false };
        opts.validate()?;
        Ok(opts)
    }

    /// Builder-style toggle for progress logging.
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Re-run the constructor checks on the current field values.
    pub fn validate(&self) -> GeneratorResult<()> {
        for (name, value) in [("dt", self.dt), ("dt_save", self.dt_save), ("t_total", self.t_total)]
        {
            if !value.is_finite() || value <= 0.0 {
                return Err(GeneratorError::InvalidTimeParam {
                    name,
                    value,
                    reason: "must be finite and > 0",
                });
            }
        }
        if !self.t_burnin.is_finite() || self.t_burnin < 0.0 {
            return Err(GeneratorError::InvalidTimeParam {
                name: "t_burnin",
                value: self.t_burnin,
                reason: "must be finite and >= 0",
            });
        }
        if self.dt_save < self.dt {
            return Err(GeneratorError::SaveIntervalTooSmall { dt_save: self.dt_save, dt: self.dt });
        }
        if self.t_burnin >= self.t_total {
            return Err(GeneratorError::BurnInExceedsTotal {
                t_burnin: self.t_burnin,
                t_total: self.t_total,
            });
        }
        if self.batch == 0 {
            return Err(GeneratorError::EmptyBatch);
        }
        let limit = isize::MAX as f64;
        let steps = self.t_total / self.dt;
        let cells = (self.t_total - self.t_burnin) / self.dt_save * self.batch as f64 * 2.0;
        for (quantity, value) in [("t_total / dt", steps), ("output cells", cells)] {
            if !value.is_finite() || value >= limit {
                return Err(GeneratorError::ScheduleTooLarge { quantity, value });
            }
        }
        if self.n_save() == 0 {
            return Err(GeneratorError::NoSnapshots {
                t_burnin: self.t_burnin,
                t_total: self.t_total,
                dt_save: self.dt_save,
            });
        }
        Ok(())
    }

    /// Number of solver steps, `floor(t_total / dt)`.
    pub fn total_steps(&self) -> usize {
        floor_div(self.t_total, self.dt)
    }

    /// Steps between snapshots, `floor(dt_save / dt)`.
    pub fn save_every(&self) -> usize {
        floor_div(self.dt_save, self.dt).max(1)
    }

    /// Steps discarded before the first snapshot, `floor(t_burnin / dt)`.
    pub fn burnin_steps(&self) -> usize {
        floor_div(self.t_burnin, self.dt)
    }

    /// Number of snapshots per trajectory, `floor((t_total - t_burnin) / dt_save)`.
    pub fn n_save(&self) -> usize {
        floor_div(self.t_total - self.t_burnin, self.dt_save)
    }
}

impl Default for IntegratorOpts {
    fn default() -> Self {
        IntegratorOpts {
            dt: 0.001,
            dt_save: 0.2,
            t_burnin: 10.0,
            t_total: 100.0,
            batch: 400,
            seed: None,
            verbose: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    // Purpose
    // -------
    // Verify the derived step counts for the default schedule, including the
    // decimal ratio 0.2 / 0.001 that naive flooring would round down to 199.
    //
    // Given
    // -----
    // - `IntegratorOpts::default()`.
    //
    // Expect
    // ------
    // - 100_000 total steps, a save every 200 steps, 10_000 burn-in steps,
    //   and 450 snapshots.
    fn default_schedule_step_counts() {
        // Arrange
        let opts = IntegratorOpts::default();

        // Act / Assert
        assert_eq!(opts.total_steps(), 100_000);
        assert_eq!(opts.save_every(), 200);
        assert_eq!(opts.burnin_steps(), 10_000);
        assert_eq!(opts.n_save(), 450);
    }

    #[test]
    // Purpose
    // -------
    // Check the potential derivative at its analytic roots and the skew offset.
    //
    // Given
    // -----
    // - Default params (U0 = 5, x0 = 1, sigma = 0) and a skewed copy.
    //
    // Expect
    // ------
    // - Gradient vanishes at q = 0 and q = ±1 for the symmetric well.
    // - The skewed well has gradient sigma / (2 x0) at q = 0.
    fn potential_gradient_matches_closed_form() {
        // Arrange
        let params = FpuParams::default();
        let skewed = FpuParams { sigma: 0.5, x0: 2.0, ..params };

        // Act / Assert
        assert_abs_diff_eq!(params.potential_gradient(0.0), 0.0);
        assert_abs_diff_eq!(params.potential_gradient(1.0), 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(params.potential_gradient(-1.0), 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(params.potential_gradient(2.0), 20.0 * 8.0 - 20.0 * 2.0);
        assert_abs_diff_eq!(skewed.potential_gradient(0.0), 0.125);
    }

    #[test]
    // Purpose
    // -------
    // Ensure the noise scale follows sqrt(2 dt gamma / beta) and vanishes
    // without coupling.
    //
    // Given
    // -----
    // - gamma = 2, beta = 4, dt = 0.01, and a gamma = 0 copy.
    //
    // Expect
    // ------
    // - sqrt(0.01) = 0.1 and exactly 0 respectively.
    fn noise_scale_follows_fluctuation_dissipation() {
        // Arrange
        let params = FpuParams::new(2.0, 4.0, 5.0, 1.0, 0.0).expect("valid params");
        let frictionless = FpuParams { gamma: 0.0, ..params };

        // Act / Assert
        assert_abs_diff_eq!(params.noise_scale(0.01), 0.1, epsilon = 1e-12);
        assert_eq!(frictionless.noise_scale(0.01), 0.0);
    }

    #[test]
    // Purpose
    // -------
    // Reject physical parameters outside their admissible ranges.
    //
    // Given
    // -----
    // - beta = 0, x0 = 0, gamma = -1, and u0 = NaN.
    //
    // Expect
    // ------
    // - Each returns `InvalidPhysicalParam` naming the offending field.
    fn fpu_params_rejects_invalid_values() {
        let cases = [
            (FpuParams::new(1.0, 0.0, 5.0, 1.0, 0.0), "beta"),
            (FpuParams::new(1.0, 1.0, 5.0, 0.0, 0.0), "x0"),
            (FpuParams::new(-1.0, 1.0, 5.0, 1.0, 0.0), "gamma"),
            (FpuParams::new(1.0, 1.0, f64::NAN, 1.0, 0.0), "u0"),
        ];
        for (result, expected) in cases {
            match result {
                Err(GeneratorError::InvalidPhysicalParam { name, .. }) => {
                    assert_eq!(name, expected)
                }
                other => panic!("expected InvalidPhysicalParam for {expected}, got {other:?}"),
            }
        }
    }

    #[test]
    // Purpose
    // -------
    // Reject inconsistent solver schedules up front.
    //
    // Given
    // -----
    // - dt_save < dt, t_burnin >= t_total, batch = 0, and a window shorter
    //   than one save interval.
    //
    // Expect
    // ------
    // - The matching error variant for each case.
    fn integrator_opts_rejects_inconsistent_schedules() {
        assert!(matches!(
            IntegratorOpts::new(0.1, 0.05, 1.0, 10.0, 4, None),
            Err(GeneratorError::SaveIntervalTooSmall { .. })
        ));
        assert!(matches!(
            IntegratorOpts::new(0.1, 0.5, 10.0, 10.0, 4, None),
            Err(GeneratorError::BurnInExceedsTotal { .. })
        ));
        assert_eq!(IntegratorOpts::new(0.1, 0.5, 1.0, 10.0, 0, None), Err(GeneratorError::EmptyBatch));
        assert!(matches!(
            IntegratorOpts::new(0.1, 2.0, 9.0, 10.0, 4, None),
            Err(GeneratorError::NoSnapshots { .. })
        ));
        assert!(matches!(
            IntegratorOpts::new(-0.1, 0.5, 1.0, 10.0, 4, None),
            Err(GeneratorError::InvalidTimeParam { name: "dt", .. })
        ));
    }

    #[test]
    // Purpose
    // -------
    // Schedules whose step count or output size cannot be indexed are
    // rejected instead of saturating the step arithmetic.
    //
    // Given
    // -----
    // - dt = dt_save = 1e-300 over a unit window (~1e300 steps).
    // - dt = dt_save = 1e-10 with a batch of 1e9 (~2e19 output cells).
    //
    // Expect
    // ------
    // - `ScheduleTooLarge` naming the step count and the output size.
    fn integrator_opts_rejects_unindexable_schedules() {
        // Arrange / Act
        let steps = IntegratorOpts::new(1e-300, 1e-300, 0.0, 1.0, 1, None);
        let cells = IntegratorOpts::new(1e-10, 1e-10, 0.0, 1.0, 1_000_000_000, None);

        // Assert
        assert!(matches!(
            steps,
            Err(GeneratorError::ScheduleTooLarge { quantity: "t_total / dt", .. })
        ));
        assert!(matches!(
            cells,
            Err(GeneratorError::ScheduleTooLarge { quantity: "output cells", .. })
        ));
        assert!(IntegratorOpts::new(1e-6, 1e-3, 0.0, 1.0, 1_000, None).is_ok());
    }
}
