//! rust_sinn — statistics-informed neural networks for stochastic dynamics.
//!
//! Purpose
//! -------
//! Serve as the crate root for Rust callers and as the PyO3 bridge that exposes
//! the toolbox to Python via the `_rust_sinn` extension module. The toolbox
//! covers the pieces of a SINN workflow that are independent of a training
//! framework: target trajectories, the recurrent model's forward map,
//! statistical losses, and a leaderboard of the best models seen.
//!
//! Key behaviors
//! -------------
//! - [`generator`]: Euler–Maruyama trajectories of a noisy double-well
//!   oscillator, saved on a coarse grid after burn-in.
//! - [`sinn`]: stacked LSTM plus linear readout with carried `(h, c)` state.
//! - [`loss`]: autocorrelation and density statistics and the losses built
//!   on them.
//! - [`hall_of_fame`]: bounded ledger of the lowest-loss model snapshots.
//! - With `python-bindings`, `#[pyclass]` wrappers and the `#[pymodule]`
//!   initializer for `_rust_sinn`, with submodules registered under
//!   `rust_sinn` so that dot-notation imports work.
//!
//! Invariants & assumptions
//! ------------------------
//! - All numerical work lives in the inner modules; the binding layer only
//!   converts arrays, maps errors, and owns Python references.
//! - Time series are `(time, batch, dim)` arrays of `f32` throughout.
//!
//! Conventions
//! -----------
//! - Each component has its own error enum converted to `PyErr` at the PyO3
//!   boundary (`ValueError`, or `IndexError` for out-of-range ranks).
//! - Logging is opt-in behind the `obs_slog` feature.
//!
//! Downstream usage
//! ----------------
//! - Rust code depends on the inner modules directly and can ignore the items
//!   guarded by `python-bindings`.
//! - The Python package imports `_rust_sinn` and re-exports `fpu` (also as
//!   `FPU` with a `U0` keyword), `SINN`,
//!   `HallOfFame`, `StatLoss` and `make_loss`.
//!
//! Testing notes
//! -------------
//! - Unit tests live next to each component; `tests/` runs the composed
//!   generate → forward → score → rank workflow.

pub mod generator;
pub mod hall_of_fame;
#[cfg(feature = "obs_slog")]
pub mod logging;
pub mod loss;
pub mod sinn;
pub mod utils;

#[cfg(feature = "python-bindings")]
use numpy::{IntoPyArray, PyArray1, PyArray3};

#[cfg(feature = "python-bindings")]
use pyo3::{exceptions::PyIndexError, prelude::*, types::PyAny};

#[cfg(feature = "python-bindings")]
use crate::{
    generator::{FpuParams, IntegratorOpts},
    hall_of_fame::HallOfFame as Ledger,
    loss::{Loss, LossFn},
    sinn::{Sinn, SinnConfig},
    utils::{
        extract_acf_opts, extract_f32_array1, extract_f32_array3, extract_loss_kind,
        extract_pdf_opts, extract_state,
    },
};

/// fpu — simulate a batch of noisy double-well trajectories from Python.
///
/// Returns a `float32` array of shape `(n_save, batch, 2)` holding momentum
/// and position. Invalid parameters raise `ValueError`.
#[cfg(feature = "python-bindings")]
#[pyfunction]
#[pyo3(
    signature = (
        gamma = 1.0,
        beta = 1.0,
        u0 = 5.0,
        x0 = 1.0,
        sigma = 0.0,
        dt = 0.001,
        dt_save = 0.2,
        t_burnin = 10.0,
        t_total = 100.0,
        batch = 400,
        seed = None,
        verbose = false,
    ),
    text_signature = "(gamma=1.0, beta=1.0, u0=5.0, x0=1.0, sigma=0.0, dt=0.001, dt_save=0.2, \
                      t_burnin=10.0, t_total=100.0, batch=400, seed=None, verbose=False)"
)]
#[allow(clippy::too_many_arguments)]
pub fn fpu<'py>(
    py: Python<'py>, gamma: f64, beta: f64, u0: f64, x0: f64, sigma: f64, dt: f64, dt_save: f64,
    t_burnin: f64, t_total: f64, batch: usize, seed: Option<u64>, verbose: bool,
) -> PyResult<Bound<'py, PyArray3<f32>>> {
    let params = FpuParams::new(gamma, beta, u0, x0, sigma)?;
    let opts =
        IntegratorOpts::new(dt, dt_save, t_burnin, t_total, batch, seed)?.with_verbose(verbose);
    let trajectories = generator::fpu(&params, &opts)?;
    Ok(trajectories.into_pyarray(py))
}

/// `FPU(gamma=1, beta=1, U0=5, ...)`: [`fpu`] under its historical name, with
/// the barrier height spelled `U0`.
#[cfg(feature = "python-bindings")]
#[pyfunction]
#[pyo3(
    name = "FPU",
    signature = (
        gamma = 1.0,
        beta = 1.0,
        U0 = 5.0,
        x0 = 1.0,
        sigma = 0.0,
        dt = 0.001,
        dt_save = 0.2,
        t_burnin = 10.0,
        t_total = 100.0,
        batch = 400,
        seed = None,
        verbose = false,
    ),
    text_signature = "(gamma=1.0, beta=1.0, U0=5.0, x0=1.0, sigma=0.0, dt=0.001, dt_save=0.2, \
                      t_burnin=10.0, t_total=100.0, batch=400, seed=None, verbose=False)"
)]
#[allow(clippy::too_many_arguments, non_snake_case)]
pub fn fpu_named<'py>(
    py: Python<'py>, gamma: f64, beta: f64, U0: f64, x0: f64, sigma: f64, dt: f64, dt_save: f64,
    t_burnin: f64, t_total: f64, batch: usize, seed: Option<u64>, verbose: bool,
) -> PyResult<Bound<'py, PyArray3<f32>>> {
    fpu(py, gamma, beta, U0, x0, sigma, dt, dt_save, t_burnin, t_total, batch, seed, verbose)
}

/// HallOfFame — Python-facing ledger of the best models seen in training.
///
/// Purpose
/// -------
/// Keep the `capacity` lowest-loss snapshots of arbitrary Python objects
/// (typically `SINN` instances or state dicts), ordered by loss.
///
/// Key behaviors
/// -------------
/// - `add(model, loss)` stores `copy.deepcopy(model)` when admitted, so later
///   training steps cannot alter the snapshot. The copy is only made when the
///   loss qualifies.
/// - `hof[i]` returns the rank-`i` snapshot (0 is the best); negative indices
///   count from the worst end; out-of-range ranks raise `IndexError`.
///
/// Invariants
/// ----------
/// - Same admission and tie rules as [`Ledger`]: strict improvement over the
///   worst entry when full, NaN never admitted.
#[cfg(feature = "python-bindings")]
#[pyclass(module = "rust_sinn.hall_of_fame")]
pub struct HallOfFame {
    inner: Ledger<PyObject>,
}

#[cfg(feature = "python-bindings")]
#[pymethods]
impl HallOfFame {
    #[new]
    #[pyo3(text_signature = "(capacity)")]
    pub fn new(capacity: usize) -> PyResult<Self> {
        Ok(HallOfFame { inner: Ledger::new(capacity)? })
    }

    /// Offer `model` with its `loss`; returns whether it was admitted.
    #[pyo3(text_signature = "(self, model, loss)")]
    pub fn add<'py>(
        &mut self, py: Python<'py>, model: &Bound<'py, PyAny>, loss: f64,
    ) -> PyResult<bool> {
        if !self.inner.admits(loss) {
            return Ok(false);
        }
        let snapshot = py.import("copy")?.call_method1("deepcopy", (model,))?.unbind();
        Ok(self.inner.insert(snapshot, loss).is_admitted())
    }

    pub fn __getitem__(&self, py: Python<'_>, index: isize) -> PyResult<PyObject> {
        let len = self.inner.len();
        let resolved = if index < 0 { index + len as isize } else { index };
        let rank = usize::try_from(resolved).map_err(|_| {
            PyIndexError::new_err(format!(
                "Rank {index} is out of range for a hall of fame holding {len} entries."
            ))
        })?;
        Ok(self.inner.get(rank)?.clone_ref(py))
    }

    pub fn __len__(&self) -> usize {
        self.inner.len()
    }

    #[getter]
    pub fn capacity(&self) -> usize {
        self.inner.capacity()
    }

    /// Losses in ascending order.
    #[getter]
    pub fn losses(&self) -> Vec<f64> {
        self.inner.losses()
    }

    /// `(loss, model)` of the best entry, or `None` when empty.
    pub fn best(&self, py: Python<'_>) -> Option<(f64, PyObject)> {
        self.inner.best().map(|(loss, model)| (loss, model.clone_ref(py)))
    }
}

/// SINN — Python-facing wrapper for the recurrent sequence model.
///
/// Constructed as `SINN(observed_dimension, hidden_size, num_layers,
/// output_size, dropout_p=0.0, seed=None)`. `forward(x, state=None)` (also
/// `model(x, state)`) returns `(y, (h, c))` as `float32` arrays, and the
/// `(h, c)` pair can be passed back as `state` to continue a sequence. Input
/// dropout is applied only by `forward_train`.
#[cfg(feature = "python-bindings")]
#[pyclass(module = "rust_sinn.sinn")]
#[derive(Clone)]
pub struct SINN {
    pub inner: Sinn,
}

#[cfg(feature = "python-bindings")]
type ForwardOutput<'py> =
    (Bound<'py, PyArray3<f32>>, (Bound<'py, PyArray3<f32>>, Bound<'py, PyArray3<f32>>));

#[cfg(feature = "python-bindings")]
type StateArg<'py> = Option<(Bound<'py, PyAny>, Bound<'py, PyAny>)>;

#[cfg(feature = "python-bindings")]
#[pymethods]
impl SINN {
    #[new]
    #[pyo3(
        signature = (observed_dimension, hidden_size, num_layers, output_size, dropout_p = 0.0, seed = None),
        text_signature = "(observed_dimension, hidden_size, num_layers, output_size, /, \
                          dropout_p=0.0, seed=None)"
    )]
    pub fn new(
        observed_dimension: usize, hidden_size: usize, num_layers: usize, output_size: usize,
        dropout_p: f64, seed: Option<u64>,
    ) -> PyResult<Self> {
        let config =
            SinnConfig::new(observed_dimension, hidden_size, num_layers, output_size, dropout_p)?;
        Ok(SINN { inner: Sinn::new(config, seed)? })
    }

    #[pyo3(signature = (x, state = None), text_signature = "(self, x, /, state=None)")]
    pub fn forward<'py>(
        &self, py: Python<'py>, x: &Bound<'py, PyAny>, state: StateArg<'py>,
    ) -> PyResult<ForwardOutput<'py>> {
        let x = extract_f32_array3(py, x)?;
        let state = extract_state(py, state)?;
        let (y, state) = self.inner.forward(x.as_array(), state.as_ref())?;
        Ok((y.into_pyarray(py), (state.h.into_pyarray(py), state.c.into_pyarray(py))))
    }

    #[pyo3(signature = (x, state = None), text_signature = "(self, x, /, state=None)")]
    pub fn __call__<'py>(
        &self, py: Python<'py>, x: &Bound<'py, PyAny>, state: StateArg<'py>,
    ) -> PyResult<ForwardOutput<'py>> {
        self.forward(py, x, state)
    }

    #[pyo3(
        signature = (x, state = None, seed = None),
        text_signature = "(self, x, /, state=None, seed=None)"
    )]
    pub fn forward_train<'py>(
        &self, py: Python<'py>, x: &Bound<'py, PyAny>, state: StateArg<'py>, seed: Option<u64>,
    ) -> PyResult<ForwardOutput<'py>> {
        use rand::{SeedableRng, rngs::StdRng};

        let x = extract_f32_array3(py, x)?;
        let state = extract_state(py, state)?;
        let mut rng = seed.map_or_else(StdRng::from_entropy, StdRng::seed_from_u64);
        let (y, state) = self.inner.forward_train(x.as_array(), state.as_ref(), &mut rng)?;
        Ok((y.into_pyarray(py), (state.h.into_pyarray(py), state.c.into_pyarray(py))))
    }

    /// Flat copy of all weights and biases.
    pub fn parameters<'py>(&self, py: Python<'py>) -> Bound<'py, PyArray1<f32>> {
        self.inner.parameters().into_pyarray(py)
    }

    pub fn set_parameters<'py>(
        &mut self, py: Python<'py>, flat: &Bound<'py, PyAny>,
    ) -> PyResult<()> {
        let flat = extract_f32_array1(py, flat)?;
        self.inner.set_parameters(flat.as_array())?;
        Ok(())
    }

    #[getter]
    pub fn num_parameters(&self) -> usize {
        self.inner.num_parameters()
    }

    pub fn __deepcopy__(&self, _memo: &Bound<'_, PyAny>) -> Self {
        self.clone()
    }
}

/// LossFn — a single statistical loss built by `make_loss`; call it on a
/// prediction to get a non-negative float.
#[cfg(feature = "python-bindings")]
#[pyclass(module = "rust_sinn.loss", name = "LossFn")]
pub struct PyLossFn {
    inner: LossFn,
}

#[cfg(feature = "python-bindings")]
#[pymethods]
impl PyLossFn {
    pub fn __call__<'py>(&self, py: Python<'py>, predicted: &Bound<'py, PyAny>) -> PyResult<f64> {
        let predicted = extract_f32_array3(py, predicted)?;
        Ok(self.inner.eval(predicted.as_array())?)
    }

    #[getter]
    pub fn kind(&self) -> &'static str {
        self.inner.kind().name()
    }
}

/// make_loss — build `"mse"`, `"acf"` or `"pdf"` loss against `target`.
#[cfg(feature = "python-bindings")]
#[pyfunction]
#[pyo3(
    signature = (kind, target, max_lag = None, lower = None, upper = None, n = None, bandwidth = None),
    text_signature = "(kind, target, /, max_lag=50, lower=-3.0, upper=3.0, n=100, bandwidth=0.1)"
)]
#[allow(clippy::too_many_arguments)]
pub fn make_loss<'py>(
    py: Python<'py>, kind: &str, target: &Bound<'py, PyAny>, max_lag: Option<usize>,
    lower: Option<f64>, upper: Option<f64>, n: Option<usize>, bandwidth: Option<f64>,
) -> PyResult<PyLossFn> {
    let kind = extract_loss_kind(kind, max_lag, lower, upper, n, bandwidth)?;
    let target = extract_f32_array3(py, target)?;
    Ok(PyLossFn { inner: loss::make_loss(kind, target.as_array())? })
}

/// StatLoss — weighted ACF + density loss against a target ensemble.
///
/// `StatLoss(target, max_lag=50, lower=-3.0, upper=3.0, n=100,
/// bandwidth=0.1, acf_weight=1.0, pdf_weight=1.0)`; calling it returns the
/// weighted total, `terms(predicted)` the unweighted per-term values.
#[cfg(feature = "python-bindings")]
#[pyclass(module = "rust_sinn.loss")]
pub struct StatLoss {
    inner: loss::StatLoss,
}

#[cfg(feature = "python-bindings")]
#[pymethods]
impl StatLoss {
    #[new]
    #[pyo3(
        signature = (
            target,
            max_lag = None,
            lower = None,
            upper = None,
            n = None,
            bandwidth = None,
            acf_weight = 1.0,
            pdf_weight = 1.0,
        ),
        text_signature = "(target, /, max_lag=50, lower=-3.0, upper=3.0, n=100, bandwidth=0.1, \
                          acf_weight=1.0, pdf_weight=1.0)"
    )]
    #[allow(clippy::too_many_arguments)]
    pub fn new<'py>(
        py: Python<'py>, target: &Bound<'py, PyAny>, max_lag: Option<usize>, lower: Option<f64>,
        upper: Option<f64>, n: Option<usize>, bandwidth: Option<f64>, acf_weight: f64,
        pdf_weight: f64,
    ) -> PyResult<Self> {
        let target = extract_f32_array3(py, target)?;
        let inner = loss::StatLoss::acf_pdf(
            target.as_array(),
            extract_acf_opts(max_lag)?,
            extract_pdf_opts(lower, upper, n, bandwidth)?,
            acf_weight,
            pdf_weight,
        )?;
        Ok(StatLoss { inner })
    }

    pub fn __call__<'py>(&self, py: Python<'py>, predicted: &Bound<'py, PyAny>) -> PyResult<f64> {
        let predicted = extract_f32_array3(py, predicted)?;
        Ok(self.inner.eval(predicted.as_array())?)
    }

    pub fn terms<'py>(
        &self, py: Python<'py>, predicted: &Bound<'py, PyAny>,
    ) -> PyResult<Vec<(String, f64)>> {
        let predicted = extract_f32_array3(py, predicted)?;
        Ok(self.inner.eval_terms(predicted.as_array())?)
    }
}

/// _rust_sinn — PyO3 module initializer for the Python extension.
///
/// Creates the `generator`, `hall_of_fame`, `sinn` and `loss` submodules,
/// attaches them to `_rust_sinn`, and registers them in `sys.modules` under
/// `rust_sinn.<name>` so they are importable via dotted paths.
#[cfg(feature = "python-bindings")]
#[pymodule]
fn _rust_sinn<'py>(py: Python<'py>, m: &Bound<'py, PyModule>) -> PyResult<()> {
    let generator_mod = PyModule::new(py, "generator")?;
    generator_mod.add_function(wrap_pyfunction!(fpu, &generator_mod)?)?;
    generator_mod.add_function(wrap_pyfunction!(fpu_named, &generator_mod)?)?;

    let hall_of_fame_mod = PyModule::new(py, "hall_of_fame")?;
    hall_of_fame_mod.add_class::<HallOfFame>()?;

    let sinn_mod = PyModule::new(py, "sinn")?;
    sinn_mod.add_class::<SINN>()?;

    let loss_mod = PyModule::new(py, "loss")?;
    loss_mod.add_class::<PyLossFn>()?;
    loss_mod.add_class::<StatLoss>()?;
    loss_mod.add_function(wrap_pyfunction!(make_loss, &loss_mod)?)?;

    // Manually add submodules into sys.modules to allow for dot notation.
    let modules = py.import("sys")?.getattr("modules")?;
    for sub in [generator_mod, hall_of_fame_mod, sinn_mod, loss_mod] {
        m.add_submodule(&sub)?;
        modules.set_item(format!("rust_sinn.{}", sub.name()?), &sub)?;
    }
    Ok(())
}
