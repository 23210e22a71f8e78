//! Summary statistics of time-major ensembles.
//!
//! Inputs are `(time, batch, dim)` `f32` arrays (the layout produced by the
//! generator and the sequence model); statistics are computed in `f64` and
//! returned per component as `(rows, dim)` arrays.
//!
//! - [`acf`]: autocorrelation up to `max_lag - 1`, pooled over the batch.
//! - [`pdf`]: Gaussian kernel density estimate on a fixed grid.
use crate::loss::errors::{LossError, LossResult};
use ndarray::{Array1, Array2, ArrayView3, Axis, s};
use statrs::distribution::{Continuous, Normal};

/// Options for [`acf`].
///
/// `max_lag` is the number of lags returned (lags `0..max_lag`), `>= 1`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AcfOpts {
    pub max_lag: usize,
}

impl AcfOpts {
    /// # Errors
    /// [`LossError::InvalidOption`] when `max_lag == 0`.
    pub fn new(max_lag: usize) -> LossResult<Self> {
        if max_lag == 0 {
            return Err(LossError::InvalidOption {
                name: "max_lag",
                value: 0.0,
                reason: "must be >= 1",
            });
        }
        Ok(AcfOpts { max_lag })
    }
}

impl Default for AcfOpts {
    fn default() -> Self {
        AcfOpts { max_lag: 50 }
    }
}

/// Options for [`pdf`]: `n` evenly spaced grid points on `[lower, upper]`
/// and the kernel `bandwidth` (standard deviation).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PdfOpts {
    pub lower: f64,
    pub upper: f64,
    pub n: usize,
    pub bandwidth: f64,
}

impl PdfOpts {
    /// # Errors
    /// [`LossError::InvalidOption`] for non-finite bounds, `lower >= upper`,
    /// `n < 2`, or a non-positive bandwidth.
    pub fn new(lower: f64, upper: f64, n: usize, bandwidth: f64) -> LossResult<Self> {
        let opts = PdfOpts { lower, upper, n, bandwidth };
        opts.validate()?;
        Ok(opts)
    }

    pub fn validate(&self) -> LossResult<()> {
        if !self.lower.is_finite() || !self.upper.is_finite() || self.lower >= self.upper {
            return Err(LossError::InvalidOption {
                name: "lower/upper",
                value: self.upper - self.lower,
                reason: "bounds must be finite with lower < upper",
            });
        }
        if self.n < 2 {
            return Err(LossError::InvalidOption {
                name: "n",
                value: self.n as f64,
                reason: "need at least 2 grid points",
            });
        }
        if !self.bandwidth.is_finite() || self.bandwidth <= 0.0 {
            return Err(LossError::InvalidOption {
                name: "bandwidth",
                value: self.bandwidth,
                reason: "must be finite and > 0",
            });
        }
        Ok(())
    }

    /// Evaluation grid.
    pub fn grid(&self) -> Array1<f64> {
        Array1::linspace(self.lower, self.upper, self.n)
    }
}

impl Default for PdfOpts {
    fn default() -> Self {
        PdfOpts { lower: -3.0, upper: 3.0, n: 100, bandwidth: 0.1 }
    }
}

/// Autocorrelation of each component, pooled over the batch.
///
/// For component `d`, the series is centred by its mean over time and batch;
/// lag `k` is the mean of `x[t + k, b] · x[t, b]` over all valid `(t, b)`,
/// divided by the lag-0 value. Row 0 is therefore exactly 1.
///
/// # Returns
/// `(max_lag, dim)` array.
///
/// # Errors
/// - [`LossError::InsufficientData`] when `time < max_lag` or `batch == 0`.
/// - [`LossError::ZeroVariance`] when a component is constant or non-finite.
pub fn acf(x: ArrayView3<f32>, opts: &AcfOpts) -> LossResult<Array2<f64>> {
    acf_with(x, opts, ConstantComponent::Reject)
}

/// [`acf`] for scored outputs: a constant component reads as uncorrelated
/// (1 at lag 0, 0 elsewhere) so that a collapsed model still gets a finite
/// loss. Non-finite components are still rejected.
pub(crate) fn acf_of_output(x: ArrayView3<f32>, opts: &AcfOpts) -> LossResult<Array2<f64>> {
    acf_with(x, opts, ConstantComponent::Uncorrelated)
}

#[derive(Clone, Copy)]
enum ConstantComponent {
    Reject,
    Uncorrelated,
}

fn acf_with(
    x: ArrayView3<f32>, opts: &AcfOpts, constant: ConstantComponent,
) -> LossResult<Array2<f64>> {
    let (t_len, batch, dim) = x.dim();
    let max_lag = opts.max_lag;
    if max_lag == 0 {
        return Err(LossError::InvalidOption { name: "max_lag", value: 0.0, reason: "must be >= 1" });
    }
    if t_len < max_lag || batch == 0 {
        return Err(LossError::InsufficientData { needed: max_lag.max(1), actual: t_len });
    }

    let mut out = Array2::<f64>::zeros((max_lag, dim));
    for (d, component) in x.axis_iter(Axis(2)).enumerate() {
        let series = component.mapv(f64::from);
        let mean = series.mean().unwrap_or(0.0);
        let centred = series - mean;
        let variance = centred.mapv(|v| v * v).mean().unwrap_or(0.0);
        if !variance.is_finite() {
            return Err(LossError::ZeroVariance { dim: d });
        }
        if variance <= 0.0 {
            match constant {
                ConstantComponent::Reject => return Err(LossError::ZeroVariance { dim: d }),
                ConstantComponent::Uncorrelated => {
                    out[[0, d]] = 1.0;
                    continue;
                }
            }
        }
        for k in 0..max_lag {
            let lead = centred.slice(s![k.., ..]);
            let lag = centred.slice(s![..t_len - k, ..]);
            let cov = (&lead * &lag).mean().unwrap_or(0.0);
            out[[k, d]] = cov / variance;
        }
    }
    Ok(out)
}

/// Gaussian kernel density estimate of each component over all time steps
/// and batch members.
///
/// `density[g, d] = mean_s N(grid[g] - x_s; 0, bandwidth²)`.
///
/// # Returns
/// `(n, dim)` array.
///
/// # Errors
/// - [`LossError::InvalidOption`] for invalid [`PdfOpts`].
/// - [`LossError::InsufficientData`] when the array holds no samples.
pub fn pdf(x: ArrayView3<f32>, opts: &PdfOpts) -> LossResult<Array2<f64>> {
    opts.validate()?;
    let (t_len, batch, dim) = x.dim();
    if t_len == 0 || batch == 0 {
        return Err(LossError::InsufficientData { needed: 1, actual: t_len * batch });
    }
    let kernel = Normal::new(0.0, opts.bandwidth).map_err(|_| LossError::InvalidOption {
        name: "bandwidth",
        value: opts.bandwidth,
        reason: "must be finite and > 0",
    })?;

    let grid = opts.grid();
    let n_samples = (t_len * batch) as f64;
    let mut out = Array2::<f64>::zeros((opts.n, dim));
    for (d, component) in x.axis_iter(Axis(2)).enumerate() {
        for (g, &point) in grid.iter().enumerate() {
            let total: f64 = component.iter().map(|&s| kernel.pdf(point - f64::from(s))).sum();
            out[[g, d]] = total / n_samples;
        }
    }
    Ok(out)
}
