//! LSTM layer, linear readout, and the carried recurrent state.
//!
//! Gate layout follows the usual `(input, forget, cell, output)` stacking:
//! rows `[0, H)` of `w_ih`/`w_hh`/biases drive the input gate, `[H, 2H)` the
//! forget gate, `[2H, 3H)` the cell candidate, and `[3H, 4H)` the output gate.
//!
//! ```text
//! gates = x·W_ihᵀ + b_ih + h·W_hhᵀ + b_hh
//! c'    = σ(f)·c + σ(i)·tanh(g)
//! h'    = σ(o)·tanh(c')
//! ```
use ndarray::{
    Array1, Array2, Array3, ArrayView2, ArrayView3, ArrayViewD, ArrayViewMut2, ArrayViewMutD, Zip,
    s,
};
use rand::Rng;
use rand_distr::Uniform;

#[inline]
fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}

fn uniform_matrix<R: Rng + ?Sized>(
    rows: usize, cols: usize, bound: f32, rng: &mut R,
) -> Array2<f32> {
    let dist = Uniform::new_inclusive(-bound, bound);
    Array2::from_shape_simple_fn((rows, cols), || rng.sample(&dist))
}

fn uniform_vector<R: Rng + ?Sized>(len: usize, bound: f32, rng: &mut R) -> Array1<f32> {
    let dist = Uniform::new_inclusive(-bound, bound);
    Array1::from_shape_simple_fn(len, || rng.sample(&dist))
}

/// One LSTM layer.
///
/// Shapes: `w_ih` is `(4H, input)`, `w_hh` is `(4H, H)`, both biases `(4H,)`.
#[derive(Debug, Clone, PartialEq)]
pub struct LstmLayer {
    pub w_ih: Array2<f32>,
    pub w_hh: Array2<f32>,
    pub b_ih: Array1<f32>,
    pub b_hh: Array1<f32>,
}

impl LstmLayer {
    /// All weights and biases drawn from `U(-1/sqrt(H), 1/sqrt(H))`.
    pub fn uniform<R: Rng + ?Sized>(input_size: usize, hidden_size: usize, rng: &mut R) -> Self {
        let bound = 1.0 / (hidden_size as f32).sqrt();
        let gates = 4 * hidden_size;
        LstmLayer {
            w_ih: uniform_matrix(gates, input_size, bound, rng),
            w_hh: uniform_matrix(gates, hidden_size, bound, rng),
            b_ih: uniform_vector(gates, bound, rng),
            b_hh: uniform_vector(gates, bound, rng),
        }
    }

    pub fn input_size(&self) -> usize {
        self.w_ih.ncols()
    }

    pub fn hidden_size(&self) -> usize {
        self.w_hh.ncols()
    }

    /// Advance the whole batch by one step; `h` and `c` (`(batch, H)`) are
    /// updated in place.
    pub fn step(&self, x: ArrayView2<f32>, mut h: ArrayViewMut2<f32>, mut c: ArrayViewMut2<f32>) {
        let hs = self.hidden_size();
        let mut gates = x.dot(&self.w_ih.t()) + h.dot(&self.w_hh.t());
        gates += &self.b_ih;
        gates += &self.b_hh;

        let input_gate = gates.slice(s![.., 0..hs]);
        let forget_gate = gates.slice(s![.., hs..2 * hs]);
        let cell_gate = gates.slice(s![.., 2 * hs..3 * hs]);
        let output_gate = gates.slice(s![.., 3 * hs..]);

        Zip::from(&mut c).and(&input_gate).and(&forget_gate).and(&cell_gate).for_each(
            |c, &i, &f, &g| {
                *c = sigmoid(f) * *c + sigmoid(i) * g.tanh();
            },
        );
        Zip::from(&mut h).and(&output_gate).and(&c).for_each(|h, &o, &c| {
            *h = sigmoid(o) * c.tanh();
        });
    }

    /// Run a `(seq, batch, input)` sequence, returning the `(seq, batch, H)`
    /// hidden outputs. `h` and `c` hold the final state on return.
    pub fn forward(
        &self, x: ArrayView3<f32>, mut h: ArrayViewMut2<f32>, mut c: ArrayViewMut2<f32>,
    ) -> Array3<f32> {
        let (seq_len, batch, _) = x.dim();
        let mut out = Array3::<f32>::zeros((seq_len, batch, self.hidden_size()));
        for (x_t, mut out_t) in x.outer_iter().zip(out.outer_iter_mut()) {
            self.step(x_t, h.view_mut(), c.view_mut());
            out_t.assign(&h);
        }
        out
    }

    pub(crate) fn tensors(&self) -> [ArrayViewD<'_, f32>; 4] {
        [
            self.w_ih.view().into_dyn(),
            self.w_hh.view().into_dyn(),
            self.b_ih.view().into_dyn(),
            self.b_hh.view().into_dyn(),
        ]
    }

    pub(crate) fn tensors_mut(&mut self) -> [ArrayViewMutD<'_, f32>; 4] {
        [
            self.w_ih.view_mut().into_dyn(),
            self.w_hh.view_mut().into_dyn(),
            self.b_ih.view_mut().into_dyn(),
            self.b_hh.view_mut().into_dyn(),
        ]
    }
}

/// Affine readout `y = x·Wᵀ + b` with `weight` shaped `(out, in)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Linear {
    pub weight: Array2<f32>,
    pub bias: Array1<f32>,
}

impl Linear {
    /// Weights and bias drawn from `U(-1/sqrt(in), 1/sqrt(in))`.
    pub fn uniform<R: Rng + ?Sized>(in_features: usize, out_features: usize, rng: &mut R) -> Self {
        let bound = 1.0 / (in_features as f32).sqrt();
        Linear {
            weight: uniform_matrix(out_features, in_features, bound, rng),
            bias: uniform_vector(out_features, bound, rng),
        }
    }

    /// Map `(batch, in)` rows to `(batch, out)`.
    pub fn forward(&self, x: ArrayView2<f32>) -> Array2<f32> {
        x.dot(&self.weight.t()) + &self.bias
    }

    pub(crate) fn tensors(&self) -> [ArrayViewD<'_, f32>; 2] {
        [self.weight.view().into_dyn(), self.bias.view().into_dyn()]
    }

    pub(crate) fn tensors_mut(&mut self) -> [ArrayViewMutD<'_, f32>; 2] {
        [self.weight.view_mut().into_dyn(), self.bias.view_mut().into_dyn()]
    }
}

/// LstmState — hidden and cell tensors carried between calls.
///
/// Both are shaped `(num_layers, batch, hidden_size)`. The model never keeps
/// a state of its own; callers pass it in and receive the updated one.
#[derive(Debug, Clone, PartialEq)]
pub struct LstmState {
    pub h: Array3<f32>,
    pub c: Array3<f32>,
}

impl LstmState {
    pub fn zeros(num_layers: usize, batch: usize, hidden_size: usize) -> Self {
        let shape = (num_layers, batch, hidden_size);
        LstmState { h: Array3::zeros(shape), c: Array3::zeros(shape) }
    }

    /// `(num_layers, batch, hidden_size)` of the hidden tensor.
    pub fn dim(&self) -> (usize, usize, usize) {
        self.h.dim()
    }
}
