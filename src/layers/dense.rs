//! Dense Layer (affine transform + learnable activation)
//!
//! A dense layer performs `y = act(x · W + b)` where `act` is an
//! [`ActivationUnit`] with its own trainable coefficients.
//!
//! ## Forward Pass
//!
//! ```text
//! Input:  x [batch, in_dim]
//! Weight: W [in_dim, out_dim]
//! Bias:   b [1, out_dim]
//! z = x · W + b            [batch, out_dim]
//! y = act(z)               [batch, out_dim]
//! ```
//!
//! ## Backward Pass
//!
//! ```text
//! δz      = act.backward(grad_y)
//! grad_b += mean(δz, axis=0)
//! grad_W += xᵀ · δz / batch
//! grad_x  = δz · Wᵀ
//! ```
//!
//! Gradients accumulate; the optimizer zeroes them after each update.
//!
//! ## Implementation Notes
//!
//! - Weights are drawn uniformly from `±√(6 / in_dim)`
//! - Bias, gradients and momentum buffers start at zero
//! - The layer owns the optimizer state of its parameters (velocities and
//!   per-coefficient learning-rate multipliers) so no external map is needed

use super::activation::{ActivationKind, ActivationUnit, InitStrategy};
use crate::config::ActivationConfig;
use crate::matrix::Matrix;
use rand::Rng;

/// Fully connected layer followed by a learnable activation
#[derive(Clone, Debug)]
pub struct DenseLayer {
    pub weight: Matrix,
    pub bias: Matrix,
    pub grad_weight: Matrix,
    pub grad_bias: Matrix,
    pub velocity_weight: Matrix,
    pub velocity_bias: Matrix,
    /// One momentum entry per activation coefficient
    pub velocity_coefficients: Vec<f64>,
    /// Per-coefficient multiplier on the activation learning rate
    pub coefficient_lr_scale: Vec<f64>,
    activation: ActivationUnit,
    cached_input: Matrix,
}

impl DenseLayer {
    /// Create a layer mapping `in_dim` features to `out_dim`
    ///
    /// # Arguments
    ///
    /// * `in_dim` - Input width
    /// * `out_dim` - Output width
    /// * `kind` - Activation family
    /// * `strategy` - Activation coefficient initialization
    /// * `config` - Activation tunables
    /// * `rng` - Source for weight and coefficient initialization
    pub fn new<R: Rng + ?Sized>(
        in_dim: usize,
        out_dim: usize,
        kind: ActivationKind,
        strategy: InitStrategy,
        config: &ActivationConfig,
        rng: &mut R,
    ) -> Self {
        assert!(in_dim > 0 && out_dim > 0, "Layer widths must be positive");
        let bound = (6.0 / in_dim as f64).sqrt();
        let weight = Matrix::random_uniform(in_dim, out_dim, -bound, bound, rng);
        let activation = ActivationUnit::new(kind, strategy, out_dim, config, rng);
        Self::from_parts(weight, Matrix::zeros(1, out_dim), activation)
    }

    /// Assemble a layer from explicit parameters
    ///
    /// # Panics
    ///
    /// Panics if `bias` is not `1 × weight.cols`
    pub fn from_parts(weight: Matrix, bias: Matrix, activation: ActivationUnit) -> Self {
        assert!(
            bias.rows == 1 && bias.cols == weight.cols,
            "Bias shape [{}, {}] does not match weight [{}, {}]",
            bias.rows,
            bias.cols,
            weight.rows,
            weight.cols
        );
        let n_coefficients = activation.coefficients().len();
        Self {
            grad_weight: Matrix::zeros(weight.rows, weight.cols),
            grad_bias: Matrix::zeros(1, weight.cols),
            velocity_weight: Matrix::zeros(weight.rows, weight.cols),
            velocity_bias: Matrix::zeros(1, weight.cols),
            velocity_coefficients: vec![0.0; n_coefficients],
            coefficient_lr_scale: vec![1.0; n_coefficients],
            cached_input: Matrix::zeros(0, weight.rows),
            weight,
            bias,
            activation,
        }
    }

    pub fn in_dim(&self) -> usize {
        self.weight.rows
    }

    pub fn out_dim(&self) -> usize {
        self.weight.cols
    }

    pub fn activation(&self) -> &ActivationUnit {
        &self.activation
    }

    pub fn activation_mut(&mut self) -> &mut ActivationUnit {
        &mut self.activation
    }

    /// Input batch from the most recent forward call
    pub fn cached_input(&self) -> &Matrix {
        &self.cached_input
    }

    /// Coefficients, their velocities and learning-rate multipliers, borrowed
    /// together for the optimizer
    pub(crate) fn coefficient_state_mut(&mut self) -> (&mut [f64], &mut [f64], &[f64]) {
        (
            self.activation.coefficients_mut(),
            &mut self.velocity_coefficients,
            &self.coefficient_lr_scale,
        )
    }

    /// Scale the activation learning rate of one coefficient
    pub fn set_coefficient_lr_scale(&mut self, index: usize, scale: f64) {
        self.coefficient_lr_scale[index] = scale;
    }

    /// Forward pass
    ///
    /// Caches `x`, computes `z = x · W + b` and returns `act(z)`.
    ///
    /// # Panics
    ///
    /// Panics if `x.cols != in_dim`
    pub fn forward(&mut self, x: &Matrix) -> Matrix {
        self.cached_input.assign(x);
        let mut z = x.matmul(&self.weight);
        z.add_row_broadcast(&self.bias);
        self.activation.forward(&z)
    }

    /// Backward pass
    ///
    /// Must follow the forward call for the same batch. Accumulates into
    /// `grad_weight`, `grad_bias` and the activation's coefficient gradient.
    ///
    /// # Returns
    ///
    /// Gradient with respect to the layer input `[batch, in_dim]`
    pub fn backward(&mut self, grad_out: &Matrix) -> Matrix {
        assert_eq!(
            grad_out.rows, self.cached_input.rows,
            "Backward batch size {} does not match cached forward batch {}",
            grad_out.rows, self.cached_input.rows
        );
        let batch = grad_out.rows.max(1) as f64;

        let delta_z = self.activation.backward(grad_out);

        self.grad_bias.add_assign(&delta_z.mean_rows());

        let mut grad_w = self.cached_input.transpose().matmul(&delta_z);
        grad_w.scale(1.0 / batch);
        self.grad_weight.add_assign(&grad_w);

        delta_z.matmul(&self.weight.transpose())
    }

    /// Clip the weight and bias gradients independently to `max_norm`
    pub fn clip_gradients(&mut self, max_norm: f64) {
        self.grad_weight.clip_norm(max_norm);
        self.grad_bias.clip_norm(max_norm);
    }

    /// Reset every gradient accumulator, including the activation's
    pub fn zero_gradients(&mut self) {
        self.grad_weight.fill_zero();
        self.grad_bias.fill_zero();
        self.activation.zero_coefficient_grad();
    }

    /// Coefficient penalty of this layer's activation
    pub fn regularization(&self, lambda: f64) -> f64 {
        self.activation.regularization(lambda)
    }
}
