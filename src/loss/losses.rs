//! Single-statistic losses and their factory.
//!
//! A [`LossFn`] freezes a reference (the raw target, or one of its summary
//! statistics) at construction and scores predictions by the mean squared
//! difference to it. Every loss is non-negative and zero when the prediction
//! reproduces the reference.
use crate::loss::{
    errors::{LossError, LossResult},
    stats::{AcfOpts, PdfOpts, acf, acf_of_output, pdf},
};
use ndarray::{Array2, Array3, ArrayView3, Zip};
use std::str::FromStr;

/// Scores a `(time, batch, dim)` prediction.
///
/// Implemented by [`LossFn`] and [`crate::loss::StatLoss`] so a training loop
/// or a Hall-of-Fame ranking can take either.
pub trait Loss {
    fn eval(&self, predicted: ArrayView3<f32>) -> LossResult<f64>;
}

/// Which quantity a [`LossFn`] compares.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LossKind {
    /// Element-wise mean squared error against the raw target.
    Mse,
    /// Mean squared difference of the autocorrelation functions.
    Acf(AcfOpts),
    /// Mean squared difference of the kernel density estimates.
    Pdf(PdfOpts),
}

impl LossKind {
    pub fn name(&self) -> &'static str {
        match self {
            LossKind::Mse => "mse",
            LossKind::Acf(_) => "acf",
            LossKind::Pdf(_) => "pdf",
        }
    }
}

impl FromStr for LossKind {
    type Err = LossError;

    /// Parse `"mse"`, `"acf"`, or `"pdf"` (case-insensitive); statistic
    /// options take their defaults.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "mse" => Ok(LossKind::Mse),
            "acf" => Ok(LossKind::Acf(AcfOpts::default())),
            "pdf" => Ok(LossKind::Pdf(PdfOpts::default())),
            _ => Err(LossError::UnknownLoss { name: s.to_string() }),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Reference {
    Raw(Array3<f32>),
    Statistic(Array2<f64>),
}

/// A loss with its reference precomputed from the target.
#[derive(Debug, Clone, PartialEq)]
pub struct LossFn {
    kind: LossKind,
    reference: Reference,
}

/// Build a loss of `kind` against `target`.
///
/// The target statistic is computed once here, so repeated evaluation only
/// pays for the prediction's statistic.
///
/// # Errors
/// Whatever computing the statistic of `target` raises (invalid options,
/// too few time steps, constant components).
///
/// # Examples
/// ```rust
/// use ndarray::Array3;
/// use rust_sinn::loss::{Loss, LossKind, make_loss};
///
/// let target = Array3::from_shape_fn((20, 4, 1), |(t, b, _)| ((t + b) as f32).sin());
/// let loss = make_loss("mse".parse::<LossKind>().unwrap(), target.view()).unwrap();
/// assert_eq!(loss.eval(target.view()).unwrap(), 0.0);
/// ```
pub fn make_loss(kind: LossKind, target: ArrayView3<f32>) -> LossResult<LossFn> {
    let reference = match &kind {
        LossKind::Mse => Reference::Raw(target.to_owned()),
        LossKind::Acf(opts) => Reference::Statistic(acf(target, opts)?),
        LossKind::Pdf(opts) => Reference::Statistic(pdf(target, opts)?),
    };
    Ok(LossFn { kind, reference })
}

impl LossFn {
    pub fn kind(&self) -> &LossKind {
        &self.kind
    }

    /// The statistic this loss compares, evaluated on `x`.
    /// For [`LossKind::Mse`] this is `x` itself, widened to `f64` and
    /// flattened to `(time · batch, dim)`. A constant component of `x` has
    /// the autocorrelation of white noise rather than an error, unlike the
    /// target passed to [`make_loss`].
    pub fn statistic(&self, x: ArrayView3<f32>) -> LossResult<Array2<f64>> {
        match &self.kind {
            LossKind::Mse => {
                let (t_len, batch, dim) = x.dim();
                Ok(Array2::from_shape_fn((t_len * batch, dim), |(row, d)| {
                    f64::from(x[[row / batch, row % batch, d]])
                }))
            }
            LossKind::Acf(opts) => acf_of_output(x, opts),
            LossKind::Pdf(opts) => pdf(x, opts),
        }
    }
}

impl Loss for LossFn {
    fn eval(&self, predicted: ArrayView3<f32>) -> LossResult<f64> {
        match &self.reference {
            Reference::Raw(target) => {
                check_shape(target.shape(), predicted.shape())?;
                let mut total = 0.0;
                Zip::from(&predicted).and(target).for_each(|&p, &t| {
                    let diff = f64::from(p) - f64::from(t);
                    total += diff * diff;
                });
                Ok(total / target.len().max(1) as f64)
            }
            Reference::Statistic(reference) => {
                let stat = self.statistic(predicted)?;
                check_shape(reference.shape(), stat.shape())?;
                let mut total = 0.0;
                Zip::from(&stat).and(reference).for_each(|&s, &r| {
                    total += (s - r) * (s - r);
                });
                Ok(total / reference.len().max(1) as f64)
            }
        }
    }
}

fn check_shape(expected: &[usize], actual: &[usize]) -> LossResult<()> {
    if expected != actual {
        return Err(LossError::ShapeMismatch {
            expected: expected.to_vec(),
            actual: actual.to_vec(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn wave(t_len: usize, batch: usize, phase: f32) -> Array3<f32> {
        Array3::from_shape_fn((t_len, batch, 2), |(t, b, d)| {
            ((t as f32) * 0.3 + (b as f32) * 0.7 + (d as f32) + phase).sin()
        })
    }

    #[test]
    // Purpose
    // -------
    // Loss names parse case-insensitively; unknown names are reported.
    fn loss_kind_parses_known_names() {
        assert_eq!("MSE".parse::<LossKind>(), Ok(LossKind::Mse));
        assert_eq!(" acf ".parse::<LossKind>(), Ok(LossKind::Acf(AcfOpts::default())));
        assert_eq!("Pdf".parse::<LossKind>(), Ok(LossKind::Pdf(PdfOpts::default())));
        assert_eq!(
            "kl".parse::<LossKind>(),
            Err(LossError::UnknownLoss { name: "kl".to_string() })
        );
    }

    #[test]
    // Purpose
    // -------
    // Every loss is zero on its own target and positive on a perturbed one.
    //
    // Given
    // -----
    // - A (60, 4, 2) sinusoid target and a copy with an added
    //   higher-frequency component.
    //
    // Expect
    // ------
    // - eval(target) == 0 for mse, acf, pdf; eval(perturbed) > 0.
    fn losses_vanish_on_target_and_grow_with_error() {
        // Arrange
        let target = wave(60, 4, 0.0);
        let perturbed = Array3::from_shape_fn(target.dim(), |(t, b, d)| {
            target[[t, b, d]] + 0.8 * (t as f32 * 1.7).sin()
        });
        let kinds = [
            LossKind::Mse,
            LossKind::Acf(AcfOpts::new(10).expect("valid")),
            LossKind::Pdf(PdfOpts::new(-3.0, 3.0, 50, 0.2).expect("valid")),
        ];

        for kind in kinds {
            // Act
            let loss = make_loss(kind, target.view()).expect("make_loss");
            let on_target = loss.eval(target.view()).expect("eval target");
            let off_target = loss.eval(perturbed.view()).expect("eval perturbed");

            // Assert
            assert_abs_diff_eq!(on_target, 0.0, epsilon = 1e-12);
            assert!(off_target > 0.0, "{} should be positive, got {off_target}", kind.name());
        }
    }

    #[test]
    // Purpose
    // -------
    // The MSE matches a hand-computed value.
    //
    // Given
    // -----
    // - Target zeros (2, 1, 2); prediction [[1, 2]], [[3, 4]].
    //
    // Expect
    // ------
    // - (1 + 4 + 9 + 16) / 4 = 7.5.
    fn mse_matches_closed_form() {
        let target = Array3::<f32>::zeros((2, 1, 2));
        let predicted =
            Array3::from_shape_vec((2, 1, 2), vec![1.0, 2.0, 3.0, 4.0]).expect("shape");
        let loss = make_loss(LossKind::Mse, target.view()).expect("make_loss");
        assert_abs_diff_eq!(loss.eval(predicted.view()).expect("eval"), 7.5);
    }

    #[test]
    // Purpose
    // -------
    // Statistic losses compare distributions, not paths, so a time-shifted
    // copy scores far lower than under MSE; mismatched dims are rejected.
    fn statistic_losses_ignore_phase_and_check_dims() {
        // Arrange
        let target = wave(200, 8, 0.0);
        let shifted = wave(200, 8, 1.3);
        let mse = make_loss(LossKind::Mse, target.view()).expect("mse");
        let acf_loss =
            make_loss(LossKind::Acf(AcfOpts::new(5).expect("valid")), target.view()).expect("acf");

        // Act
        let mse_value = mse.eval(shifted.view()).expect("mse eval");
        let acf_value = acf_loss.eval(shifted.view()).expect("acf eval");
        let one_dim = Array3::from_shape_fn((200, 8, 1), |(t, _, _)| (t as f32 * 0.3).sin());

        // Assert
        assert!(acf_value < 0.1 * mse_value, "acf {acf_value} vs mse {mse_value}");
        assert!(matches!(acf_loss.eval(one_dim.view()), Err(LossError::ShapeMismatch { .. })));
    }

    #[test]
    // Purpose
    // -------
    // A collapsed prediction (all zeros) still gets a finite score, while a
    // constant target cannot anchor an autocorrelation loss.
    //
    // Given
    // -----
    // - A (40, 3, 2) sinusoid target and an all-zero prediction.
    // - An all-zero target.
    //
    // Expect
    // ------
    // - The ACF loss on the zero prediction is finite and > 0, and equals
    //   the loss of an uncorrelated series (1 at lag 0, 0 after).
    // - `make_loss` on the constant target reports `ZeroVariance`.
    fn constant_prediction_scores_as_uncorrelated() {
        // Arrange
        let target = wave(40, 3, 0.0);
        let collapsed = Array3::<f32>::zeros(target.dim());
        let opts = AcfOpts::new(8).expect("valid");
        let loss = make_loss(LossKind::Acf(opts), target.view()).expect("acf loss");

        // Act
        let value = loss.eval(collapsed.view()).expect("eval collapsed");
        let stat = loss.statistic(collapsed.view()).expect("statistic");

        // Assert
        let reference = acf(target.view(), &opts).expect("target acf");
        let expected = reference
            .indexed_iter()
            .map(|((k, _), &r)| {
                let white = if k == 0 { 1.0 } else { 0.0 };
                (white - r) * (white - r)
            })
            .sum::<f64>()
            / reference.len() as f64;
        assert!(value.is_finite() && value > 0.0);
        assert_abs_diff_eq!(value, expected, epsilon = 1e-12);
        assert_eq!(stat.row(0).to_vec(), vec![1.0, 1.0]);
        assert!(stat.slice(ndarray::s![1.., ..]).iter().all(|&v| v == 0.0));
        assert_eq!(
            make_loss(LossKind::Acf(opts), collapsed.view()),
            Err(LossError::ZeroVariance { dim: 0 })
        );
    }
}
