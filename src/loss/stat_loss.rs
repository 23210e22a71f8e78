//! loss::stat_loss — weighted combination of named statistic losses.
use crate::loss::{
    errors::{LossError, LossResult},
    losses::{Loss, LossFn, LossKind, make_loss},
    stats::{AcfOpts, PdfOpts},
};
use ndarray::ArrayView3;

/// One named, weighted term of a [`StatLoss`].
#[derive(Debug, Clone, PartialEq)]
pub struct StatTerm {
    pub name: String,
    pub weight: f64,
    pub loss: LossFn,
}

/// StatLoss — `Σ weight_i · loss_i(prediction)` over named terms.
///
/// Purpose
/// -------
/// Train against several statistics at once (typically the ACF and the
/// density of the target), with a per-term breakdown for monitoring.
///
/// Invariants
/// ----------
/// - Weights are finite and `>= 0`, so the total is non-negative.
/// - Evaluation order follows insertion order.
/// - Every term is evaluated, zero-weight ones included, so [`Loss::eval`]
///   and [`StatLoss::eval_terms`] fail on the same inputs.
///
/// Errors
/// ------
/// - [`LossError::InvalidWeight`] from [`StatLoss::with`].
/// - [`LossError::NoTerms`] when evaluating an empty combination.
/// - Any error of the underlying terms.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StatLoss {
    terms: Vec<StatTerm>,
}

impl StatLoss {
    pub fn new() -> Self {
        StatLoss { terms: Vec::new() }
    }

    /// Append a term; builder style.
    pub fn with(mut self, name: impl Into<String>, weight: f64, loss: LossFn) -> LossResult<Self> {
        if !weight.is_finite() || weight < 0.0 {
            return Err(LossError::InvalidWeight { weight });
        }
        self.terms.push(StatTerm { name: name.into(), weight, loss });
        Ok(self)
    }

    /// ACF plus density loss against `target`, the usual training objective
    /// for reconstructing a stationary process.
    pub fn acf_pdf(
        target: ArrayView3<f32>, acf_opts: AcfOpts, pdf_opts: PdfOpts, acf_weight: f64,
        pdf_weight: f64,
    ) -> LossResult<Self> {
        StatLoss::new()
            .with("acf", acf_weight, make_loss(LossKind::Acf(acf_opts), target)?)?
            .with("pdf", pdf_weight, make_loss(LossKind::Pdf(pdf_opts), target)?)
    }

    pub fn terms(&self) -> &[StatTerm] {
        &self.terms
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Unweighted value of each term, in insertion order.
    pub fn eval_terms(&self, predicted: ArrayView3<f32>) -> LossResult<Vec<(String, f64)>> {
        if self.terms.is_empty() {
            return Err(LossError::NoTerms);
        }
        self.terms
            .iter()
            .map(|term| Ok((term.name.clone(), term.loss.eval(predicted)?)))
            .collect()
    }
}

impl Loss for StatLoss {
    fn eval(&self, predicted: ArrayView3<f32>) -> LossResult<f64> {
        if self.terms.is_empty() {
            return Err(LossError::NoTerms);
        }
        let mut total = 0.0;
        for term in &self.terms {
            total += term.weight * term.loss.eval(predicted)?;
        }
        Ok(total)
    }
}
