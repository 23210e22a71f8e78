//! Integration tests for the SINN workflow.
//!
//! Purpose
//! -------
//! - Validate the end-to-end pipeline: simulate target trajectories, drive
//!   the sequence model with white noise, score its output with statistical
//!   losses, and keep the best candidates in a Hall of Fame.
//! - Use a realistic (if short) double-well regime rather than toy arrays.
//!
//! Coverage
//! --------
//! - `generator`: seeded `fpu` shape, finiteness, and reproducibility.
//! - `sinn::Sinn`: forward shapes on generator-sized inputs and parameter
//!   round-trips through `parameters` / `set_parameters`.
//! - `loss`: `StatLoss::acf_pdf` and `make_loss` against generated targets.
//! - `hall_of_fame::HallOfFame`: ranking of scored model snapshots and
//!   snapshot isolation.
//!
//! Exclusions
//! ----------
//! - Gradient-based training; the search below is a seeded random search.
//! - Python bindings, which are exercised from the Python package.
use ndarray::{Array1, Array3};
use rand::{Rng, SeedableRng, rngs::StdRng};
use rand_distr::StandardNormal;
use rust_sinn::{
    generator::{FpuParams, IntegratorOpts, fpu},
    hall_of_fame::{Admission, HallOfFame},
    loss::{AcfOpts, Loss, LossKind, PdfOpts, StatLoss, acf, make_loss},
    sinn::{Sinn, SinnConfig},
};

/// Purpose
/// -------
/// Short, seeded double-well ensemble used as the training target.
///
/// Returns
/// -------
/// - `(100, 16, 2)` array: `dt = 0.01`, `dt_save = 0.1`, burn-in 1, total 11.
fn target_ensemble(seed: u64) -> Array3<f32> {
    let params = FpuParams::default();
    let opts = IntegratorOpts::new(0.01, 0.1, 1.0, 11.0, 16, Some(seed))
        .expect("IntegratorOpts::new should accept a consistent schedule");
    fpu(&params, &opts).expect("fpu should succeed for default physical parameters")
}

/// Purpose
/// -------
/// White-noise driving input with the target's shape.
fn white_noise(shape: (usize, usize, usize), seed: u64) -> Array3<f32> {
    let mut rng = StdRng::seed_from_u64(seed);
    Array3::from_shape_simple_fn(shape, || rng.sample::<f32, _>(StandardNormal))
}

/// Purpose
/// -------
/// Training objective used throughout: ACF over 20 lags plus density on
/// `[-4, 4]`.
fn objective(target: &Array3<f32>) -> StatLoss {
    StatLoss::acf_pdf(
        target.view(),
        AcfOpts::new(20).expect("valid max_lag"),
        PdfOpts::new(-4.0, 4.0, 80, 0.2).expect("valid density grid"),
        1.0,
        1.0,
    )
    .expect("StatLoss::acf_pdf should accept a non-degenerate target")
}

fn model(seed: u64) -> Sinn {
    let config = SinnConfig::new(2, 8, 2, 2, 0.0).expect("valid config");
    Sinn::new(config, Some(seed)).expect("valid model")
}

#[test]
// Purpose
// -------
// The generator yields a finite, reproducible ensemble whose statistics are
// usable as loss references.
//
// Given
// -----
// - Two runs with seed 11, one with seed 12.
//
// Expect
// ------
// - Shape (100, 16, 2); all values finite; same seed ⇒ identical output,
//   different seed ⇒ different output; ACF lag 0 equals 1 in both dims.
fn generated_target_is_reproducible_and_well_formed() {
    // Arrange / Act
    let a = target_ensemble(11);
    let b = target_ensemble(11);
    let c = target_ensemble(12);
    let r = acf(a.view(), &AcfOpts::new(5).expect("valid")).expect("acf of target");

    // Assert
    assert_eq!(a.dim(), (100, 16, 2));
    assert!(a.iter().all(|v| v.is_finite()));
    assert_eq!(a, b);
    assert_ne!(a, c);
    assert!((r[[0, 0]] - 1.0).abs() < 1e-12);
    assert!((r[[0, 1]] - 1.0).abs() < 1e-12);
}

#[test]
// Purpose
// -------
// A seeded random search over model initialisations, ranked by the
// statistical objective, leaves the best candidates in the Hall of Fame.
//
// Given
// -----
// - Target ensemble, white-noise input, 8 candidate models (seeds 0..8).
// - Hall of Fame with capacity 3.
//
// Expect
// ------
// - Output shape matches the target; every loss is finite and >= 0.
// - The ledger holds the 3 smallest losses in ascending order.
// - Re-scoring the rank-0 snapshot reproduces the best loss.
fn random_search_keeps_best_models_in_hall_of_fame() {
    // Arrange
    let target = target_ensemble(3);
    let noise = white_noise(target.dim(), 99);
    let loss = objective(&target);
    let mut hof = HallOfFame::new(3).expect("capacity 3");
    let mut scores = Vec::new();

    // Act
    for seed in 0..8 {
        let candidate = model(seed);
        let (y, _) = candidate.forward(noise.view(), None).expect("forward");
        assert_eq!(y.dim(), target.dim());
        let value = loss.eval(y.view()).expect("loss eval");
        scores.push(value);
        hof.add(&candidate, value);
    }

    // Assert
    assert!(scores.iter().all(|v| v.is_finite() && *v >= 0.0));
    scores.sort_by(f64::total_cmp);
    assert_eq!(hof.len(), 3);
    assert_eq!(hof.losses(), scores[..3].to_vec());

    let (best_loss, best_model) = hof.best().expect("non-empty ledger");
    let (y, _) = best_model.forward(noise.view(), None).expect("forward best");
    assert_eq!(loss.eval(y.view()).expect("re-score"), best_loss);
}

#[test]
// Purpose
// -------
// Snapshots stored in the Hall of Fame are unaffected by later updates to
// the model they were taken from.
//
// Given
// -----
// - A model added at loss 1.0, then its parameters overwritten with zeros.
//
// Expect
// ------
// - The stored snapshot keeps the original parameters; the live model's
//   output changes while the snapshot's does not.
fn hall_of_fame_snapshots_survive_parameter_updates() {
    // Arrange
    let mut live = model(5);
    let original = live.parameters();
    let mut hof = HallOfFame::new(2).expect("capacity 2");
    assert_eq!(hof.add(&live, 1.0), Admission::Inserted);

    // Act
    live.set_parameters(Array1::<f32>::zeros(live.num_parameters()).view())
        .expect("same parameter count");

    // Assert
    let snapshot = hof.get(0).expect("rank 0");
    assert_eq!(snapshot.parameters(), original);
    assert_ne!(live.parameters(), original);

    let x = white_noise((10, 3, 2), 7);
    let (y_live, _) = live.forward(x.view(), None).expect("forward live");
    let (y_snap, _) = snapshot.forward(x.view(), None).expect("forward snapshot");
    assert!(y_live.iter().all(|&v| v == 0.0));
    assert_ne!(y_live, y_snap);
}

#[test]
// Purpose
// -------
// Single-statistic losses built from names agree with the combined
// objective's per-term breakdown.
//
// Given
// -----
// - `make_loss("acf" / "pdf")` with the objective's options, and a model
//   output to score.
//
// Expect
// ------
// - `eval_terms` returns the same values as the standalone losses; the
//   objective is zero on the target itself.
fn named_losses_match_objective_terms() {
    // Arrange
    let target = target_ensemble(21);
    let objective = objective(&target);
    let acf_kind = match "acf".parse::<LossKind>().expect("known name") {
        LossKind::Acf(_) => LossKind::Acf(AcfOpts::new(20).expect("valid")),
        other => other,
    };
    let pdf_kind = LossKind::Pdf(PdfOpts::new(-4.0, 4.0, 80, 0.2).expect("valid"));
    let acf_loss = make_loss(acf_kind, target.view()).expect("acf loss");
    let pdf_loss = make_loss(pdf_kind, target.view()).expect("pdf loss");

    let (y, _) = model(1).forward(white_noise(target.dim(), 4).view(), None).expect("forward");

    // Act
    let terms = objective.eval_terms(y.view()).expect("terms");

    // Assert
    assert_eq!(terms[0], ("acf".to_string(), acf_loss.eval(y.view()).expect("acf")));
    assert_eq!(terms[1], ("pdf".to_string(), pdf_loss.eval(y.view()).expect("pdf")));
    assert_eq!(objective.eval(target.view()).expect("on target"), 0.0);
}
