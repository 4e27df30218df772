//! Neural Network Layers
//!
//! This module contains the two building blocks of a network. Each provides
//! both forward and backward passes for training.
//!
//! ## Layers
//!
//! - **activation**: learnable elementwise activations (six families)
//! - **dense**: affine transform followed by an activation unit
//!
//! ## Design Pattern
//!
//! Layers keep their own forward cache and gradient accumulators:
//!
//! ```rust,ignore
//! impl Layer {
//!     pub fn forward(&mut self, x: &Matrix) -> Matrix { }        // caches x
//!     pub fn backward(&mut self, grad: &Matrix) -> Matrix { }    // accumulates grads
//! }
//! ```
//!
//! A backward call always refers to the most recent forward call, so the two
//! must be issued in order for the same batch.

pub mod activation;
pub mod dense;

// Re-export main types for convenience
pub use activation::{sigmoid, ActivationKind, ActivationUnit, InitStrategy};
pub use dense::DenseLayer;
