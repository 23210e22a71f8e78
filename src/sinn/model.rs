//! SINN — stacked LSTM followed by a linear readout.
use crate::sinn::{
    config::SinnConfig,
    errors::{SinnError, SinnResult},
    lstm::{Linear, LstmLayer, LstmState},
};
use ndarray::{Array1, Array3, ArrayView1, ArrayView3, ArrayViewD, ArrayViewMutD, s};
use rand::{Rng, SeedableRng, rngs::StdRng};
use rand_distr::Bernoulli;

/// Sinn — recurrent model mapping an observed series to reconstructed dynamics.
///
/// Purpose
/// -------
/// Evaluate `y, state' = readout(lstm(dropout(x), state))` for inputs shaped
/// `(seq_len, batch, observed_dimension)`. Training is left to the caller,
/// who reads and writes the weights through [`parameters`](Self::parameters)
/// and [`set_parameters`](Self::set_parameters).
///
/// Key behaviors
/// -------------
/// - [`forward`](Self::forward) is the inference path: dropout is skipped.
/// - [`forward_train`](Self::forward_train) applies inverted input dropout
///   with the configured probability.
/// - The carried [`LstmState`] is owned by the caller; a missing state
///   starts from zeros.
///
/// Invariants
/// ----------
/// - `layers.len() == config.num_layers`; layer `l` has input width
///   `config.layer_input_size(l)` and hidden width `config.hidden_size`.
/// - The flat parameter order is, per layer, `w_ih, w_hh, b_ih, b_hh`
///   (row-major), followed by the readout `weight, bias`.
///
/// Notes
/// -----
/// - `Clone` gives an independent snapshot, which is what
///   [`crate::hall_of_fame::HallOfFame`] stores.
#[derive(Debug, Clone, PartialEq)]
pub struct Sinn {
    config: SinnConfig,
    layers: Vec<LstmLayer>,
    readout: Linear,
}

impl Sinn {
    /// Build a freshly initialised model; `seed = None` draws from OS entropy.
    ///
    /// # Errors
    /// Any [`SinnConfig::validate`] failure.
    pub fn new(config: SinnConfig, seed: Option<u64>) -> SinnResult<Self> {
        let mut rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::with_rng(config, &mut rng)
    }

    /// Build a freshly initialised model from a caller-owned RNG.
    pub fn with_rng<R: Rng + ?Sized>(config: SinnConfig, rng: &mut R) -> SinnResult<Self> {
        config.validate()?;
        let layers = (0..config.num_layers)
            .map(|l| LstmLayer::uniform(config.layer_input_size(l), config.hidden_size, rng))
            .collect();
        let readout = Linear::uniform(config.hidden_size, config.output_size, rng);
        Ok(Sinn { config, layers, readout })
    }

    pub fn config(&self) -> &SinnConfig {
        &self.config
    }

    pub fn layers(&self) -> &[LstmLayer] {
        &self.layers
    }

    pub fn readout(&self) -> &Linear {
        &self.readout
    }

    /// Zero state for a batch of `batch` sequences.
    pub fn zero_state(&self, batch: usize) -> LstmState {
        LstmState::zeros(self.config.num_layers, batch, self.config.hidden_size)
    }

    /// Inference pass (no dropout).
    ///
    /// # Returns
    /// `(y, state')` with `y` shaped `(seq_len, batch, output_size)`.
    ///
    /// # Errors
    /// - [`SinnError::InputDimension`] when `x.dim().2 != observed_dimension`.
    /// - [`SinnError::StateShape`] when `state` is not
    ///   `(num_layers, batch, hidden_size)`.
    pub fn forward(
        &self, x: ArrayView3<f32>, state: Option<&LstmState>,
    ) -> SinnResult<(Array3<f32>, LstmState)> {
        self.check_input(&x)?;
        self.run(x.to_owned(), state)
    }

    /// Training pass: each input element is zeroed with probability
    /// `dropout_p` and survivors are scaled by `1 / (1 - dropout_p)`.
    ///
    /// # Errors
    /// Same as [`forward`](Self::forward).
    pub fn forward_train<R: Rng + ?Sized>(
        &self, x: ArrayView3<f32>, state: Option<&LstmState>, rng: &mut R,
    ) -> SinnResult<(Array3<f32>, LstmState)> {
        self.check_input(&x)?;
        let dropped = apply_dropout(x, self.config.dropout_p, rng)?;
        self.run(dropped, state)
    }

    pub fn num_parameters(&self) -> usize {
        self.tensors().iter().map(|t| t.len()).sum()
    }

    /// All weights and biases as one flat vector.
    pub fn parameters(&self) -> Array1<f32> {
        self.tensors().into_iter().flat_map(|t| t.into_iter().copied()).collect()
    }

    /// Overwrite all weights and biases from a flat vector laid out like
    /// [`parameters`](Self::parameters).
    ///
    /// # Errors
    /// [`SinnError::ParameterLength`] when `flat.len() != num_parameters()`;
    /// the model is left untouched in that case.
    pub fn set_parameters(&mut self, flat: ArrayView1<f32>) -> SinnResult<()> {
        let expected = self.num_parameters();
        if flat.len() != expected {
            return Err(SinnError::ParameterLength { expected, actual: flat.len() });
        }
        let mut values = flat.iter();
        for mut tensor in self.tensors_mut() {
            for (dst, src) in tensor.iter_mut().zip(&mut values) {
                *dst = *src;
            }
        }
        Ok(())
    }

    // ---- Helper Methods ----

    fn run(
        &self, x: Array3<f32>, state: Option<&LstmState>,
    ) -> SinnResult<(Array3<f32>, LstmState)> {
        let (_, batch, _) = x.dim();
        let mut next = match state {
            Some(state) => {
                self.check_state(state, batch)?;
                state.clone()
            }
            None => self.zero_state(batch),
        };

        let mut hidden = x;
        for (l, layer) in self.layers.iter().enumerate() {
            hidden = layer.forward(
                hidden.view(),
                next.h.slice_mut(s![l, .., ..]),
                next.c.slice_mut(s![l, .., ..]),
            );
        }

        let (seq_len, batch, _) = hidden.dim();
        let mut y = Array3::<f32>::zeros((seq_len, batch, self.config.output_size));
        for (mut y_t, h_t) in y.outer_iter_mut().zip(hidden.outer_iter()) {
            y_t.assign(&self.readout.forward(h_t));
        }
        Ok((y, next))
    }

    fn check_input(&self, x: &ArrayView3<f32>) -> SinnResult<()> {
        let actual = x.dim().2;
        if actual != self.config.observed_dimension {
            return Err(SinnError::InputDimension {
                expected: self.config.observed_dimension,
                actual,
            });
        }
        Ok(())
    }

    fn check_state(&self, state: &LstmState, batch: usize) -> SinnResult<()> {
        let expected = [self.config.num_layers, batch, self.config.hidden_size];
        for tensor in [&state.h, &state.c] {
            let (l, b, h) = tensor.dim();
            if [l, b, h] != expected {
                return Err(SinnError::StateShape { expected, actual: [l, b, h] });
            }
        }
        Ok(())
    }

    fn tensors(&self) -> Vec<ArrayViewD<'_, f32>> {
        let mut tensors: Vec<_> = self.layers.iter().flat_map(|layer| layer.tensors()).collect();
        tensors.extend(self.readout.tensors());
        tensors
    }

    fn tensors_mut(&mut self) -> Vec<ArrayViewMutD<'_, f32>> {
        let mut tensors: Vec<_> =
            self.layers.iter_mut().flat_map(|layer| layer.tensors_mut()).collect();
        tensors.extend(self.readout.tensors_mut());
        tensors
    }
}

/// Inverted dropout: zero each element with probability `p`, scale the rest
/// by `1 / (1 - p)`. `p == 0` returns an unchanged copy.
pub(crate) fn apply_dropout<R: Rng + ?Sized>(
    x: ArrayView3<f32>, p: f64, rng: &mut R,
) -> SinnResult<Array3<f32>> {
    if p == 0.0 {
        return Ok(x.to_owned());
    }
    let keep = Bernoulli::new(1.0 - p).map_err(|_| SinnError::InvalidDropout { p })?;
    let scale = (1.0 / (1.0 - p)) as f32;
    Ok(x.mapv(|v| if rng.sample(keep) { v * scale } else { 0.0 }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::Array;

    fn small_model(dropout_p: f64) -> Sinn {
        let config = SinnConfig::new(2, 4, 2, 3, dropout_p).expect("valid config");
        Sinn::new(config, Some(17)).expect("model")
    }

    fn ramp_input(seq_len: usize, batch: usize, dim: usize) -> Array3<f32> {
        Array::from_shape_fn((seq_len, batch, dim), |(t, b, d)| {
            ((t as f32) * 0.1 + (b as f32) * 0.5 - (d as f32) * 0.3).sin()
        })
    }

    #[test]
    // Purpose
    // -------
    // Output and state shapes follow the configuration.
    //
    // Given
    // -----
    // - observed 2, hidden 4, 2 layers, output 3; input (7, 5, 2), no state.
    //
    // Expect
    // ------
    // - y is (7, 5, 3); h and c are (2, 5, 4).
    fn forward_shapes_follow_configuration() {
        // Arrange
        let model = small_model(0.0);
        let x = ramp_input(7, 5, 2);

        // Act
        let (y, state) = model.forward(x.view(), None).expect("forward");

        // Assert
        assert_eq!(y.dim(), (7, 5, 3));
        assert_eq!(state.h.dim(), (2, 5, 4));
        assert_eq!(state.c.dim(), (2, 5, 4));
    }

    #[test]
    // Purpose
    // -------
    // Carrying the state across calls is equivalent to one long call.
    //
    // Given
    // -----
    // - A length-10 sequence split into halves of 6 and 4 steps.
    //
    // Expect
    // ------
    // - Concatenated outputs and the final state match the single pass.
    fn carried_state_matches_single_pass() {
        // Arrange
        let model = small_model(0.0);
        let x = ramp_input(10, 3, 2);

        // Act
        let (y_full, state_full) = model.forward(x.view(), None).expect("full");
        let (y_head, state_head) = model.forward(x.slice(s![..6, .., ..]), None).expect("head");
        let (y_tail, state_tail) =
            model.forward(x.slice(s![6.., .., ..]), Some(&state_head)).expect("tail");

        // Assert
        for (a, b) in y_full.slice(s![..6, .., ..]).iter().zip(y_head.iter()) {
            assert_abs_diff_eq!(*a, *b, epsilon = 1e-6);
        }
        for (a, b) in y_full.slice(s![6.., .., ..]).iter().zip(y_tail.iter()) {
            assert_abs_diff_eq!(*a, *b, epsilon = 1e-6);
        }
        for (a, b) in state_full.h.iter().zip(state_tail.h.iter()) {
            assert_abs_diff_eq!(*a, *b, epsilon = 1e-6);
        }
    }

    #[test]
    // Purpose
    // -------
    // Shape mismatches are reported, not panicked on.
    //
    // Given
    // -----
    // - An input with 3 features and a state for the wrong batch size.
    //
    // Expect
    // ------
    // - `InputDimension { expected: 2, actual: 3 }` and `StateShape`.
    fn rejects_mismatched_input_and_state() {
        let model = small_model(0.0);

        let bad_input = ramp_input(4, 2, 3);
        assert_eq!(
            model.forward(bad_input.view(), None).unwrap_err(),
            SinnError::InputDimension { expected: 2, actual: 3 }
        );

        let x = ramp_input(4, 2, 2);
        let wrong_batch = model.zero_state(5);
        assert_eq!(
            model.forward(x.view(), Some(&wrong_batch)).unwrap_err(),
            SinnError::StateShape { expected: [2, 2, 4], actual: [2, 5, 4] }
        );
    }

    #[test]
    // Purpose
    // -------
    // Flat parameters round-trip and drive the forward pass.
    //
    // Given
    // -----
    // - Two models with different seeds; copy A's parameters into B.
    //
    // Expect
    // ------
    // - Lengths equal `num_parameters()`; afterwards both models agree
    //   exactly; a wrong-length vector is rejected.
    fn set_parameters_copies_weights_between_models() {
        // Arrange
        let a = small_model(0.0);
        let config = *a.config();
        let mut b = Sinn::new(config, Some(99)).expect("model");
        let x = ramp_input(5, 2, 2);

        // Act
        let flat = a.parameters();
        b.set_parameters(flat.view()).expect("same layout");

        // Assert
        assert_eq!(flat.len(), config.num_parameters());
        assert_eq!(a, b);
        assert_eq!(a.forward(x.view(), None), b.forward(x.view(), None));
        assert_eq!(
            b.set_parameters(flat.slice(s![1..])).unwrap_err(),
            SinnError::ParameterLength { expected: flat.len(), actual: flat.len() - 1 }
        );
    }

    #[test]
    // Purpose
    // -------
    // Dropout is a no-op at inference and inverted-scaled in training.
    //
    // Given
    // -----
    // - p = 0.5 on an all-ones input.
    //
    // Expect
    // ------
    // - `apply_dropout` yields only 0.0 or 2.0 with both present;
    //   `forward` is unaffected by the configured p.
    fn dropout_only_applies_in_training() {
        // Arrange
        let mut rng = StdRng::seed_from_u64(4);
        let ones = Array3::<f32>::ones((20, 10, 2));
        let with_dropout = small_model(0.5);
        let without = small_model(0.0);

        // Act
        let dropped = apply_dropout(ones.view(), 0.5, &mut rng).expect("valid p");
        let (y_eval, _) = with_dropout.forward(ones.view(), None).expect("forward");
        let (y_ref, _) = without.forward(ones.view(), None).expect("forward");
        let (y_train, _) =
            with_dropout.forward_train(ones.view(), None, &mut rng).expect("forward_train");

        // Assert
        assert!(dropped.iter().all(|&v| v == 0.0 || v == 2.0));
        assert!(dropped.iter().any(|&v| v == 0.0));
        assert!(dropped.iter().any(|&v| v == 2.0));
        assert_eq!(y_eval, y_ref);
        assert_ne!(y_train, y_eval);
    }
}
