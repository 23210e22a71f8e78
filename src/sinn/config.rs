//! Architecture of the sequence model.
use crate::sinn::errors::{SinnError, SinnResult};

/// SinnConfig — sizes of the LSTM stack and its readout.
///
/// Fields
/// ------
/// - `observed_dimension`: features per input step.
/// - `hidden_size`: LSTM hidden/cell width (shared by every layer).
/// - `num_layers`: stacked LSTM layers; layer `l > 0` reads layer `l - 1`.
/// - `output_size`: features per reconstructed step.
/// - `dropout_p`: input dropout probability used by `forward_train`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SinnConfig {
    pub observed_dimension: usize,
    pub hidden_size: usize,
    pub num_layers: usize,
    pub output_size: usize,
    pub dropout_p: f64,
}

impl SinnConfig {
    /// Construct and validate a configuration.
    ///
    /// # Errors
    /// - [`SinnError::InvalidConfig`] when any size is zero.
    /// - [`SinnError::InvalidDropout`] when `dropout_p` is not in `[0, 1)`.
    pub fn new(
        observed_dimension: usize, hidden_size: usize, num_layers: usize, output_size: usize,
        dropout_p: f64,
    ) -> SinnResult<Self> {
        let config =
            SinnConfig { observed_dimension, hidden_size, num_layers, output_size, dropout_p };
        config.validate()?;
        Ok(config)
    }

    /// Re-run the constructor checks on the current field values.
    pub fn validate(&self) -> SinnResult<()> {
        let sizes = [
            ("observed_dimension", self.observed_dimension),
            ("hidden_size", self.hidden_size),
            ("num_layers", self.num_layers),
            ("output_size", self.output_size),
        ];
        for (param, value) in sizes {
            if value == 0 {
                return Err(SinnError::InvalidConfig { param, value, reason: "must be >= 1" });
            }
        }
        if !self.dropout_p.is_finite() || !(0.0..1.0).contains(&self.dropout_p) {
            return Err(SinnError::InvalidDropout { p: self.dropout_p });
        }
        Ok(())
    }

    /// Input width of layer `layer`.
    pub fn layer_input_size(&self, layer: usize) -> usize {
        if layer == 0 { self.observed_dimension } else { self.hidden_size }
    }

    /// Total number of scalar parameters implied by the configuration.
    pub fn num_parameters(&self) -> usize {
        let h = self.hidden_size;
        let lstm: usize =
            (0..self.num_layers).map(|l| 4 * h * (self.layer_input_size(l) + h) + 8 * h).sum();
        lstm + self.output_size * h + self.output_size
    }
}
