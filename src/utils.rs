#[cfg(feature = "python-bindings")]
use pyo3::{
    exceptions::PyTypeError,
    prelude::*,
    types::{PyAny, PyDict},
};

#[cfg(feature = "python-bindings")]
use numpy::{PyReadonlyArray1, PyReadonlyArray3};

#[cfg(feature = "python-bindings")]
use crate::{
    loss::{AcfOpts, LossKind, PdfOpts},
    sinn::LstmState,
};

/// Coerce `raw_data` into a contiguous `float32` numpy array via
/// `numpy.ascontiguousarray(raw_data, dtype="float32")`.
#[cfg(feature = "python-bindings")]
fn as_contiguous_f32<'py>(
    py: Python<'py>, raw_data: &Bound<'py, PyAny>,
) -> PyResult<Bound<'py, PyAny>> {
    let kwargs = PyDict::new(py);
    kwargs.set_item("dtype", "float32")?;
    py.import("numpy")?.call_method("ascontiguousarray", (raw_data,), Some(&kwargs))
}

#[cfg(feature = "python-bindings")]
#[inline]
pub fn extract_f32_array3<'py>(
    py: Python<'py>, raw_data: &Bound<'py, PyAny>,
) -> PyResult<PyReadonlyArray3<'py, f32>> {
    if let Ok(arr_ro) = raw_data.extract::<PyReadonlyArray3<f32>>() {
        return Ok(arr_ro);
    }

    // torch.Tensor
    if let Ok(obj) = raw_data.call_method0("numpy") {
        if let Ok(arr_ro) = as_contiguous_f32(py, &obj)?.extract::<PyReadonlyArray3<f32>>() {
            return Ok(arr_ro);
        }
    }

    as_contiguous_f32(py, raw_data)
        .ok()
        .and_then(|obj| obj.extract::<PyReadonlyArray3<f32>>().ok())
        .ok_or_else(|| {
            PyTypeError::new_err(
                "expected a 3-D (time, batch, dim) numpy.ndarray or nested sequence of float32",
            )
        })
}

#[cfg(feature = "python-bindings")]
#[inline]
pub fn extract_f32_array1<'py>(
    py: Python<'py>, raw_data: &Bound<'py, PyAny>,
) -> PyResult<PyReadonlyArray1<'py, f32>> {
    if let Ok(arr_ro) = raw_data.extract::<PyReadonlyArray1<f32>>() {
        return Ok(arr_ro);
    }
    as_contiguous_f32(py, raw_data)
        .ok()
        .and_then(|obj| obj.extract::<PyReadonlyArray1<f32>>().ok())
        .ok_or_else(|| {
            PyTypeError::new_err("expected a 1-D numpy.ndarray or sequence of float32")
        })
}

/// Rebuild a recurrent state from a Python `(h, c)` pair; `None` means zeros.
#[cfg(feature = "python-bindings")]
pub fn extract_state<'py>(
    py: Python<'py>, state: Option<(Bound<'py, PyAny>, Bound<'py, PyAny>)>,
) -> PyResult<Option<LstmState>> {
    let Some((h, c)) = state else {
        return Ok(None);
    };
    let h = extract_f32_array3(py, &h)?;
    let c = extract_f32_array3(py, &c)?;
    Ok(Some(LstmState { h: h.as_array().to_owned(), c: c.as_array().to_owned() }))
}

#[cfg(feature = "python-bindings")]
pub fn extract_pdf_opts(
    lower: Option<f64>, upper: Option<f64>, n: Option<usize>, bandwidth: Option<f64>,
) -> PyResult<PdfOpts> {
    let defaults = PdfOpts::default();
    let opts = PdfOpts::new(
        lower.unwrap_or(defaults.lower),
        upper.unwrap_or(defaults.upper),
        n.unwrap_or(defaults.n),
        bandwidth.unwrap_or(defaults.bandwidth),
    )?;
    Ok(opts)
}

#[cfg(feature = "python-bindings")]
pub fn extract_acf_opts(max_lag: Option<usize>) -> PyResult<AcfOpts> {
    let opts = AcfOpts::new(max_lag.unwrap_or(AcfOpts::default().max_lag))?;
    Ok(opts)
}

#[cfg(feature = "python-bindings")]
pub fn extract_loss_kind(
    kind: &str, max_lag: Option<usize>, lower: Option<f64>, upper: Option<f64>, n: Option<usize>,
    bandwidth: Option<f64>,
) -> PyResult<LossKind> {
    let kind = match kind.parse::<LossKind>()? {
        LossKind::Mse => LossKind::Mse,
        LossKind::Acf(_) => LossKind::Acf(extract_acf_opts(max_lag)?),
        LossKind::Pdf(_) => LossKind::Pdf(extract_pdf_opts(lower, upper, n, bandwidth)?),
    };
    Ok(kind)
}
