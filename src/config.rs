//! Training Configuration
//!
//! Every tunable of a run lives in one of three plain structs that are passed
//! explicitly at construction time:
//!
//! - [`ActivationConfig`]: clip bound for the piecewise family and the
//!   regularization weight reported in the loss
//! - [`OptimizerConfig`]: learning rates, momenta, coefficient gradient clip
//!   and the coefficient value range
//! - [`ExperimentConfig`]: architecture, data handling and both of the above;
//!   serializable to JSON so runs can be described in a file
//!
//! [`ConfigOverrides`] carries the command-line adjustments the demo programs
//! apply on top of a preset or file.
//!
//! ## Presets
//!
//! ```rust
//! use learnact::ExperimentConfig;
//!
//! let config = ExperimentConfig::spirals();
//! assert_eq!(config.widths, vec![2, 4, 1]);
//! assert!(config.validate().is_ok());
//! ```

use crate::error::{Error, Result};
use crate::layers::activation::{ActivationKind, InitStrategy};
use crate::network::LossMode;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Activation-side tunables
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ActivationConfig {
    /// Pre-activations are clipped to `[-B, B]` before the piecewise family
    /// evaluates them
    pub piecewise_bound: f64,
    /// Weight of the coefficient penalty added to the reported loss
    pub reg_lambda: f64,
}

impl Default for ActivationConfig {
    fn default() -> Self {
        Self {
            piecewise_bound: 5.0,
            reg_lambda: 1e-4,
        }
    }
}

/// Dual-track momentum SGD hyperparameters
///
/// Weights and biases use `lr`/`momentum`; activation coefficients use the
/// `act_*` fields and are clamped into `[coeff_min, coeff_max]` after every
/// update.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct OptimizerConfig {
    pub lr: f64,
    pub momentum: f64,
    pub act_lr: f64,
    pub act_momentum: f64,
    pub act_grad_clip_norm: f64,
    pub coeff_min: f64,
    pub coeff_max: f64,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            lr: 0.01,
            momentum: 0.9,
            act_lr: 0.01,
            act_momentum: 0.9,
            act_grad_clip_norm: 1.0,
            coeff_min: -10.0,
            coeff_max: 10.0,
        }
    }
}

impl OptimizerConfig {
    /// Check rates and ranges
    pub fn validate(&self) -> Result<()> {
        if !(self.lr > 0.0 && self.act_lr >= 0.0) {
            return Err(Error::Config(format!(
                "learning rates must be positive (lr={}, act_lr={})",
                self.lr, self.act_lr
            )));
        }
        if !(0.0..1.0).contains(&self.momentum) || !(0.0..1.0).contains(&self.act_momentum) {
            return Err(Error::Config(format!(
                "momentum must lie in [0, 1) (momentum={}, act_momentum={})",
                self.momentum, self.act_momentum
            )));
        }
        if !(self.act_grad_clip_norm > 0.0) {
            return Err(Error::Config(format!(
                "act_grad_clip_norm must be positive, got {}",
                self.act_grad_clip_norm
            )));
        }
        if !(self.coeff_min < self.coeff_max) {
            return Err(Error::Config(format!(
                "empty coefficient range [{}, {}]",
                self.coeff_min, self.coeff_max
            )));
        }
        Ok(())
    }
}

/// A complete description of one training run
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ExperimentConfig {
    /// Layer widths, input first; one more entry than `activations`
    pub widths: Vec<usize>,
    /// Activation family of each dense layer
    pub activations: Vec<ActivationKind>,
    /// Coefficient initialization of each dense layer
    pub strategies: Vec<InitStrategy>,
    #[serde(default)]
    pub activation: ActivationConfig,
    #[serde(default)]
    pub optimizer: OptimizerConfig,
    /// Per-layer L2 clip applied to weight and bias gradients
    #[serde(default = "default_grad_clip_norm")]
    pub grad_clip_norm: f64,
    pub loss: LossMode,
    pub epochs: usize,
    pub batch_size: usize,
    pub seed: u64,
    /// Stop early once evaluation accuracy reaches this value
    #[serde(default)]
    pub target_accuracy: Option<f64>,
    /// CSV file receiving one row per epoch
    #[serde(default)]
    pub log_path: Option<String>,
}

fn default_grad_clip_norm() -> f64 {
    1.0
}

/// Names accepted by [`ExperimentConfig::preset`]
pub const PRESET_NAMES: [&str; 3] = ["xor", "spirals", "mnist"];

/// Command-line adjustments applied on top of a preset or config file
///
/// Unset fields leave the configuration untouched. The hidden-layer fields
/// replace the activation and strategy of every layer except the output
/// layer.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ConfigOverrides {
    pub seed: Option<u64>,
    pub epochs: Option<usize>,
    pub lr: Option<f64>,
    pub act_lr: Option<f64>,
    pub log_path: Option<String>,
    pub hidden_activation: Option<ActivationKind>,
    pub hidden_strategy: Option<InitStrategy>,
}

impl ConfigOverrides {
    /// Apply the set fields to `config` and validate the result
    pub fn apply(&self, config: &mut ExperimentConfig) -> Result<()> {
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        if let Some(epochs) = self.epochs {
            config.epochs = epochs;
        }
        if let Some(lr) = self.lr {
            config.optimizer.lr = lr;
        }
        if let Some(act_lr) = self.act_lr {
            config.optimizer.act_lr = act_lr;
        }
        if let Some(path) = &self.log_path {
            config.log_path = Some(path.clone());
        }

        let hidden = config.activations.len().saturating_sub(1);
        if let Some(kind) = self.hidden_activation {
            config.activations[..hidden].fill(kind);
        }
        if let Some(strategy) = self.hidden_strategy {
            let hidden = config.strategies.len().saturating_sub(1).min(hidden);
            config.strategies[..hidden].fill(strategy);
        }

        config.validate()
    }
}

impl ExperimentConfig {
    /// 2-4-1 sigmoid network on the four XOR points
    pub fn xor() -> Self {
        Self {
            widths: vec![2, 4, 1],
            activations: vec![ActivationKind::FixedSigmoid, ActivationKind::FixedSigmoid],
            strategies: vec![InitStrategy::Default, InitStrategy::Default],
            activation: ActivationConfig::default(),
            optimizer: OptimizerConfig::default(),
            grad_clip_norm: default_grad_clip_norm(),
            loss: LossMode::MeanSquaredError,
            epochs: 100,
            batch_size: 4,
            seed: 42,
            target_accuracy: None,
            log_path: Some("xor_42.csv".to_string()),
        }
    }

    /// 2-4-1 cubic-then-sigmoid network on two interleaved spirals
    pub fn spirals() -> Self {
        Self {
            widths: vec![2, 4, 1],
            activations: vec![ActivationKind::CubicPolynomial, ActivationKind::FixedSigmoid],
            strategies: vec![InitStrategy::NoisyDefault, InitStrategy::Default],
            activation: ActivationConfig::default(),
            optimizer: OptimizerConfig::default(),
            grad_clip_norm: default_grad_clip_norm(),
            loss: LossMode::MeanSquaredError,
            epochs: 100,
            batch_size: 200,
            seed: 42,
            target_accuracy: Some(0.95),
            log_path: Some("spirals_42.csv".to_string()),
        }
    }

    /// 784-256-128-10 cubic network for digit classification
    pub fn mnist() -> Self {
        Self {
            widths: vec![784, 256, 128, 10],
            activations: vec![ActivationKind::CubicPolynomial; 3],
            strategies: vec![InitStrategy::NoisyDefault; 3],
            activation: ActivationConfig::default(),
            optimizer: OptimizerConfig::default(),
            grad_clip_norm: default_grad_clip_norm(),
            loss: LossMode::CrossEntropy,
            epochs: 5,
            batch_size: 32,
            seed: 42,
            target_accuracy: None,
            log_path: Some("mnist_42.csv".to_string()),
        }
    }

    /// Look up a preset by name
    ///
    /// # Errors
    ///
    /// [`Error::Config`] if `name` is not one of [`PRESET_NAMES`]
    pub fn preset(name: &str) -> Result<Self> {
        match name {
            "xor" => Ok(Self::xor()),
            "spirals" => Ok(Self::spirals()),
            "mnist" => Ok(Self::mnist()),
            _ => Err(Error::Config(format!(
                "unknown preset '{}' (expected one of {})",
                name,
                PRESET_NAMES.join(", ")
            ))),
        }
    }

    /// Check the architecture lists and hyperparameters for consistency
    pub fn validate(&self) -> Result<()> {
        if self.widths.len() < 2 {
            return Err(Error::Config("at least an input and an output width are required".into()));
        }
        if self.widths.iter().any(|&w| w == 0) {
            return Err(Error::Config(format!("zero-width layer in {:?}", self.widths)));
        }
        let n_layers = self.widths.len() - 1;
        if self.activations.len() != n_layers || self.strategies.len() != n_layers {
            return Err(Error::Config(format!(
                "{} layers need {} activations and strategies, got {} and {}",
                n_layers,
                n_layers,
                self.activations.len(),
                self.strategies.len()
            )));
        }
        if self.batch_size == 0 {
            return Err(Error::Config("batch_size must be at least 1".into()));
        }
        if !(self.grad_clip_norm > 0.0) {
            return Err(Error::Config(format!(
                "grad_clip_norm must be positive, got {}",
                self.grad_clip_norm
            )));
        }
        if !(self.activation.piecewise_bound > 0.0) {
            return Err(Error::Config(format!(
                "piecewise_bound must be positive, got {}",
                self.activation.piecewise_bound
            )));
        }
        self.optimizer.validate()
    }

    /// Load a configuration from a JSON file and validate it
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        let config: ExperimentConfig = serde_json::from_str(&json)?;
        config.validate()?;
        Ok(config)
    }

    /// Save the configuration as pretty-printed JSON
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets_validate() {
        for config in [
            ExperimentConfig::xor(),
            ExperimentConfig::spirals(),
            ExperimentConfig::mnist(),
        ] {
            config.validate().unwrap();
        }
    }

    #[test]
    fn test_preset_by_name() {
        for name in PRESET_NAMES {
            ExperimentConfig::preset(name).unwrap().validate().unwrap();
        }
        assert_eq!(ExperimentConfig::preset("mnist").unwrap().widths[0], 784);
        assert!(matches!(ExperimentConfig::preset("cifar"), Err(Error::Config(_))));
    }

    #[test]
    fn test_overrides_replace_only_set_fields() {
        let mut config = ExperimentConfig::mnist();
        let overrides = ConfigOverrides {
            seed: Some(7),
            act_lr: Some(0.002),
            hidden_activation: Some(ActivationKind::PiecewiseLinear),
            hidden_strategy: Some(InitStrategy::RandomSmall),
            ..ConfigOverrides::default()
        };
        overrides.apply(&mut config).unwrap();

        assert_eq!(config.seed, 7);
        assert_eq!(config.optimizer.act_lr, 0.002);
        assert_eq!(config.optimizer.lr, OptimizerConfig::default().lr);
        assert_eq!(config.epochs, 5);
        assert_eq!(
            config.activations,
            vec![
                ActivationKind::PiecewiseLinear,
                ActivationKind::PiecewiseLinear,
                ActivationKind::CubicPolynomial
            ]
        );
        assert_eq!(
            config.strategies,
            vec![
                InitStrategy::RandomSmall,
                InitStrategy::RandomSmall,
                InitStrategy::NoisyDefault
            ]
        );
    }

    #[test]
    fn test_overrides_are_validated() {
        let mut config = ExperimentConfig::xor();
        let overrides = ConfigOverrides {
            lr: Some(-1.0),
            ..ConfigOverrides::default()
        };
        assert!(matches!(overrides.apply(&mut config), Err(Error::Config(_))));
    }

    #[test]
    fn test_mismatched_lengths_rejected() {
        let mut config = ExperimentConfig::xor();
        config.activations.pop();
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_empty_coefficient_range_rejected() {
        let mut config = ExperimentConfig::xor();
        config.optimizer.coeff_min = 1.0;
        config.optimizer.coeff_max = 1.0;
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_json_roundtrip_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.json");

        let mut config = ExperimentConfig::spirals();
        config.optimizer.act_lr = 0.003;
        config.save_to_file(&path).unwrap();

        let loaded = ExperimentConfig::load_from_file(&path).unwrap();
        assert_eq!(loaded.widths, config.widths);
        assert_eq!(loaded.activations, config.activations);
        assert_eq!(loaded.optimizer, config.optimizer);
        assert_eq!(loaded.target_accuracy, Some(0.95));
    }

    #[test]
    fn test_missing_sections_use_defaults() {
        let json = r#"{
            "widths": [2, 3, 2],
            "activations": ["PiecewiseLinear", "FixedRectifier"],
            "strategies": ["IdentityLike", "Default"],
            "loss": "CrossEntropy",
            "epochs": 3,
            "batch_size": 2,
            "seed": 1
        }"#;
        let config: ExperimentConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.activation, ActivationConfig::default());
        assert_eq!(config.optimizer, OptimizerConfig::default());
        assert_eq!(config.grad_clip_norm, 1.0);
        assert!(config.log_path.is_none());
        config.validate().unwrap();
    }
}
