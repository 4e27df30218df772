//! learnact: Neural Networks with Learnable Activation Functions
//!
//! A small feed-forward network library, implemented from scratch in Rust,
//! in which every layer's activation function has trainable coefficients.
//! Alongside the usual weights and biases, training shapes the nonlinearity
//! itself: a leaky slope, a cubic polynomial, a continuous piecewise-linear
//! curve with movable breakpoints, or a self-gated unit.
//!
//! # Modules
//!
//! - [`matrix`] - Row-major `f64` matrices with parallel matrix multiply
//! - [`layers`] - Learnable activation units and dense layers
//! - [`loss`] - Softmax cross-entropy and mean squared error
//! - [`network`] - Layer stack, training step and accuracy
//! - [`optimizer`] - Dual-track momentum SGD
//! - [`config`] - Activation, optimizer and experiment configuration
//! - [`data`] - Synthetic datasets, binary loader and mini-batching
//! - [`train`] - Epoch-level training driver
//! - [`training_logger`] - Per-epoch CSV logging of loss, accuracy and coefficients
//! - [`gradcheck`] - Finite-difference verification of coefficient gradients
//! - [`ablation`] - Activation family × init strategy sweeps
//!
//! # Example
//!
//! ```rust
//! use learnact::{data, train, ExperimentConfig, Network};
//!
//! let mut config = ExperimentConfig::spirals();
//! config.epochs = 2;
//! let (x, y) = data::spirals(50, config.seed);
//!
//! let mut network = Network::from_config(&config)?;
//! let summary = train::run(&mut network, &config, (&x, &y), (&x, &y), None)?;
//! println!("accuracy after {} epochs: {:.3}", summary.epochs_run, summary.final_accuracy);
//! # Ok::<(), learnact::Error>(())
//! ```

pub mod ablation;
pub mod config;
pub mod data;
pub mod error;
pub mod gradcheck;
pub mod layers;
pub mod loss;
pub mod matrix;
pub mod network;
pub mod optimizer;
pub mod train;
pub mod training_logger;

// Re-export main types for convenience
pub use config::{ActivationConfig, ConfigOverrides, ExperimentConfig, OptimizerConfig};
pub use error::{Error, Result};
pub use layers::{ActivationKind, ActivationUnit, DenseLayer, InitStrategy};
pub use loss::{LossAndGrad, LossMode};
pub use matrix::Matrix;
pub use network::Network;
pub use optimizer::MomentumSgd;
pub use train::TrainingSummary;
pub use training_logger::TrainingLogger;
