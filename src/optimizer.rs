//! Dual-Track Momentum SGD
//!
//! This module implements the optimizer that updates both kinds of trainable
//! state in a network: the affine parameters (weights and biases) and the
//! activation coefficients. The two tracks share the update rule but not its
//! hyperparameters.
//!
//! ## Algorithm
//!
//! For every parameter θ with gradient g:
//!
//! ```text
//! v = μ * v - α * g
//! θ = θ + v
//! g = 0
//! ```
//!
//! Weights and biases use `(α, μ) = (lr, momentum)`. Activation coefficients
//! use `(act_lr * scale_i, act_momentum)` and get two extra steps:
//!
//! ```text
//! if ‖g‖ > act_grad_clip_norm:      # before the update
//!     g *= act_grad_clip_norm / ‖g‖
//! θ_i = clamp(θ_i, coeff_min, coeff_max)   # after the update
//! ```
//!
//! ## Coefficient Track
//!
//! A layer's coefficients are shared by every unit of that layer. They have
//! their own learning rate and momentum, a gradient clip applied to the
//! whole coefficient vector, and a hard value range. `coefficient_lr_scale`
//! on the layer scales the rate of individual coefficients.
//!
//! ## Example
//!
//! ```rust
//! use learnact::{ActivationKind, DenseLayer, InitStrategy, Matrix, MomentumSgd, OptimizerConfig};
//! use learnact::config::ActivationConfig;
//! use rand::SeedableRng;
//!
//! let mut rng = rand::rngs::StdRng::seed_from_u64(0);
//! let mut layer = DenseLayer::new(
//!     2, 2, ActivationKind::SelfGated, InitStrategy::Default,
//!     &ActivationConfig::default(), &mut rng,
//! );
//! let optimizer = MomentumSgd::new(OptimizerConfig::default());
//!
//! let x = Matrix::new(vec![1.0, -1.0], 1, 2);
//! let y = layer.forward(&x);
//! layer.backward(&y);
//! optimizer.update(&mut layer);
//! assert!(layer.grad_weight.data.iter().all(|&g| g == 0.0));
//! ```

use crate::config::OptimizerConfig;
use crate::layers::DenseLayer;
use crate::matrix::{clip_norm, Matrix};
use log::debug;

/// Momentum SGD with separate settings for activation coefficients
#[derive(Clone, Debug)]
pub struct MomentumSgd {
    pub config: OptimizerConfig,
}

/// `v = μv − αg; θ += v; g = 0` over matching buffers
fn momentum_step(param: &mut Matrix, grad: &mut Matrix, velocity: &mut Matrix, lr: f64, momentum: f64) {
    for ((p, g), v) in param
        .data
        .iter_mut()
        .zip(grad.data.iter_mut())
        .zip(velocity.data.iter_mut())
    {
        *v = momentum * *v - lr * *g;
        *p += *v;
        *g = 0.0;
    }
}

impl MomentumSgd {
    /// # Panics
    ///
    /// Panics if `config.coeff_min` is not below `config.coeff_max`
    pub fn new(config: OptimizerConfig) -> Self {
        assert!(
            config.coeff_min < config.coeff_max,
            "Empty coefficient range [{}, {}]",
            config.coeff_min,
            config.coeff_max
        );
        Self { config }
    }

    /// Apply one update to `layer` and reset its gradients
    ///
    /// Gradients must be fully accumulated (backward complete for every
    /// layer) before this runs, since it zeroes them as it consumes them.
    pub fn update(&self, layer: &mut DenseLayer) {
        let cfg = &self.config;

        momentum_step(
            &mut layer.weight,
            &mut layer.grad_weight,
            &mut layer.velocity_weight,
            cfg.lr,
            cfg.momentum,
        );
        momentum_step(
            &mut layer.bias,
            &mut layer.grad_bias,
            &mut layer.velocity_bias,
            cfg.lr,
            cfg.momentum,
        );

        if layer.activation().coefficients().is_empty() {
            return;
        }

        let (in_dim, out_dim) = (layer.in_dim(), layer.out_dim());
        let mut grad = layer.activation().coefficient_grad().to_vec();
        let norm = clip_norm(&mut grad, cfg.act_grad_clip_norm);
        if norm > cfg.act_grad_clip_norm {
            debug!(
                "Clipped activation gradient norm from {:.6} to {:.6} for layer (in={} out={})",
                norm, cfg.act_grad_clip_norm, in_dim, out_dim
            );
        }

        let (coefficients, velocities, scales) = layer.coefficient_state_mut();
        for (((c, v), scale), g) in coefficients.iter_mut().zip(velocities).zip(scales).zip(&grad) {
            *v = cfg.act_momentum * *v - cfg.act_lr * scale * g;
            *c = (*c + *v).clamp(cfg.coeff_min, cfg.coeff_max);
        }
        layer.activation_mut().zero_coefficient_grad();
    }
}
