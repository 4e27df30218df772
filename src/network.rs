//! Feed-Forward Network
//!
//! A [`Network`] is an ordered stack of [`DenseLayer`]s, each ending in its own
//! learnable activation. It owns the forward/backward orchestration, the loss,
//! per-layer gradient clipping and accuracy evaluation. Parameter updates are
//! delegated to [`MomentumSgd`].
//!
//! ## One Training Step
//!
//! ```text
//! out   = layers[n-1].forward(... layers[0].forward(x))
//! loss  = L(out, y) + Σ regularization        # reported only
//! if loss is not finite -> Err(NumericalDivergence), nothing updated
//! grad  = dL/dout
//! for layer in reversed(layers):
//!     grad = layer.backward(grad)
//!     layer.clip_gradients(grad_clip_norm)
//! for layer in layers:
//!     optimizer.update(layer)
//! ```
//!
//! Backward runs to completion for every layer before the first update.
//!
//! ## Example
//!
//! ```rust
//! use learnact::config::ActivationConfig;
//! use learnact::{ActivationKind, InitStrategy, LossMode, Matrix, MomentumSgd, Network, OptimizerConfig};
//!
//! let mut net = Network::new(
//!     &[2, 3, 2],
//!     &[ActivationKind::PiecewiseLinear, ActivationKind::CubicPolynomial],
//!     &[InitStrategy::Default, InitStrategy::Default],
//!     &ActivationConfig::default(),
//!     1.0,
//!     7,
//! );
//! let optimizer = MomentumSgd::new(OptimizerConfig::default());
//!
//! let x = Matrix::new(vec![0.5, -0.5, 1.0, 1.0], 2, 2);
//! let y = Matrix::new(vec![0.0, 1.0], 2, 1);
//! let loss = net.train_step(&x, &y, &optimizer, LossMode::CrossEntropy).unwrap();
//! assert!(loss.is_finite());
//! assert_eq!(net.coefficient_count(), 7 + 4);
//! ```

use crate::config::{ActivationConfig, ExperimentConfig};
use crate::error::{Error, Result};
use crate::layers::{sigmoid, ActivationKind, DenseLayer, InitStrategy};
use crate::matrix::Matrix;
use crate::optimizer::MomentumSgd;
use log::{error, info};
use rand::rngs::StdRng;
use rand::SeedableRng;

pub use crate::loss::{LossAndGrad, LossMode};

/// Stack of dense layers with learnable activations
#[derive(Clone, Debug)]
pub struct Network {
    layers: Vec<DenseLayer>,
    activation_config: ActivationConfig,
    grad_clip_norm: f64,
}

impl Network {
    /// Build a network from layer widths
    ///
    /// # Arguments
    ///
    /// * `widths` - Layer widths, input first (`n + 1` entries for `n` layers)
    /// * `kinds` - Activation family of each layer
    /// * `strategies` - Coefficient initialization of each layer
    /// * `activation_config` - Clip bound and regularization weight
    /// * `grad_clip_norm` - Per-layer L2 clip on weight and bias gradients
    /// * `seed` - Seeds weight and coefficient initialization
    ///
    /// # Panics
    ///
    /// Panics if `widths.len() != kinds.len() + 1`, if `strategies.len()` differs
    /// from `kinds.len()`, or if `grad_clip_norm` is not positive
    pub fn new(
        widths: &[usize],
        kinds: &[ActivationKind],
        strategies: &[InitStrategy],
        activation_config: &ActivationConfig,
        grad_clip_norm: f64,
        seed: u64,
    ) -> Self {
        assert!(
            widths.len() == kinds.len() + 1,
            "{} widths cannot describe {} layers",
            widths.len(),
            kinds.len()
        );
        assert_eq!(
            strategies.len(),
            kinds.len(),
            "Every layer needs an init strategy"
        );
        assert!(
            grad_clip_norm > 0.0,
            "grad_clip_norm must be positive, got {}",
            grad_clip_norm
        );

        let mut rng = StdRng::seed_from_u64(seed);
        let layers: Vec<DenseLayer> = widths
            .windows(2)
            .zip(kinds.iter().zip(strategies))
            .map(|(dims, (&kind, &strategy))| {
                DenseLayer::new(dims[0], dims[1], kind, strategy, activation_config, &mut rng)
            })
            .collect();

        let network = Self {
            layers,
            activation_config: activation_config.clone(),
            grad_clip_norm,
        };
        info!(
            "Built network {:?} with activations {:?}: {} weights, {} activation coefficients",
            widths,
            kinds,
            network.parameter_count(),
            network.coefficient_count()
        );
        network
    }

    /// Build and seed a network from a validated experiment description
    pub fn from_config(config: &ExperimentConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::new(
            &config.widths,
            &config.activations,
            &config.strategies,
            &config.activation,
            config.grad_clip_norm,
            config.seed,
        ))
    }

    pub fn layers(&self) -> &[DenseLayer] {
        &self.layers
    }

    pub fn layers_mut(&mut self) -> &mut [DenseLayer] {
        &mut self.layers
    }

    pub fn activation_config(&self) -> &ActivationConfig {
        &self.activation_config
    }

    pub fn grad_clip_norm(&self) -> f64 {
        self.grad_clip_norm
    }

    /// Number of weight and bias entries
    pub fn parameter_count(&self) -> usize {
        self.layers
            .iter()
            .map(|l| l.weight.len() + l.bias.len())
            .sum()
    }

    /// Number of activation coefficients across all layers
    pub fn coefficient_count(&self) -> usize {
        self.layers
            .iter()
            .map(|l| l.activation().coefficients().len())
            .sum()
    }

    /// Every activation coefficient, layer by layer
    pub fn coefficients(&self) -> Vec<f64> {
        self.layers
            .iter()
            .flat_map(|l| l.activation().coefficients().iter().copied())
            .collect()
    }

    /// Column names matching [`coefficients`](Self::coefficients), e.g. `l0_a1`
    pub fn coefficient_names(&self) -> Vec<String> {
        self.layers
            .iter()
            .enumerate()
            .flat_map(|(i, l)| {
                l.activation()
                    .kind()
                    .coefficient_names()
                    .iter()
                    .map(move |name| format!("l{}_{}", i, name))
            })
            .collect()
    }

    /// Sum of every layer's coefficient penalty
    pub fn regularization(&self) -> f64 {
        let lambda = self.activation_config.reg_lambda;
        self.layers.iter().map(|l| l.regularization(lambda)).sum()
    }

    /// Run `x` through every layer
    pub fn forward(&mut self, x: &Matrix) -> Matrix {
        let mut out = x.clone();
        for layer in self.layers.iter_mut() {
            out = layer.forward(&out);
        }
        out
    }

    /// Forward, loss and backward for one batch
    ///
    /// Gradients are accumulated into every layer and clipped, but nothing is
    /// updated.
    ///
    /// # Returns
    ///
    /// The reported loss (including regularization) and the output gradient,
    /// or [`Error::NumericalDivergence`] if the loss is not finite. In that
    /// case no gradient has been accumulated.
    pub fn loss_and_grad(&mut self, x: &Matrix, y: &Matrix, mode: LossMode) -> Result<LossAndGrad> {
        let out = self.forward(x);
        let (data_loss, output_grad) = mode.evaluate(&out, y);
        let loss = data_loss + self.regularization();

        if !loss.is_finite() {
            error!("Numerical divergence: loss = {}", loss);
            return Err(Error::NumericalDivergence { loss });
        }

        let mut grad = output_grad.clone();
        let clip = self.grad_clip_norm;
        for layer in self.layers.iter_mut().rev() {
            grad = layer.backward(&grad);
            layer.clip_gradients(clip);
        }

        Ok(LossAndGrad { loss, output_grad })
    }

    /// One optimization step on a batch
    ///
    /// # Returns
    ///
    /// The loss reported before the update
    pub fn train_step(
        &mut self,
        x: &Matrix,
        y: &Matrix,
        optimizer: &MomentumSgd,
        mode: LossMode,
    ) -> Result<f64> {
        let LossAndGrad { loss, .. } = self.loss_and_grad(x, y, mode)?;
        for layer in self.layers.iter_mut() {
            optimizer.update(layer);
        }
        Ok(loss)
    }

    /// Fraction of rows classified correctly
    ///
    /// Multi-output networks predict the argmax and compare it with the class
    /// index in `y`. Single-output networks threshold a probability at 0.5;
    /// the raw output is passed through a sigmoid first unless the last
    /// activation already saturates into `[0, 1]`.
    ///
    /// # Panics
    ///
    /// Panics if `x` and `y` have different row counts
    pub fn evaluate_accuracy(&mut self, x: &Matrix, y: &Matrix) -> f64 {
        assert_eq!(
            x.rows, y.rows,
            "Targets have {} rows for {} inputs",
            y.rows, x.rows
        );
        let out = self.forward(x);
        if out.rows == 0 {
            return 0.0;
        }

        let correct = if out.cols == 1 {
            let saturating = self
                .layers
                .last()
                .map(|l| l.activation().kind().is_saturating())
                .unwrap_or(false);
            out.data
                .iter()
                .zip(&y.data)
                .filter(|&(&o, &t)| {
                    let p = if saturating { o } else { sigmoid(o) };
                    (p >= 0.5) == (t >= 0.5)
                })
                .count()
        } else {
            (0..out.rows)
                .filter(|&i| out.argmax_row(i) == y.data[i * y.cols] as usize)
                .count()
        };

        correct as f64 / out.rows as f64
    }
}
