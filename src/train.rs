//! Training Driver
//!
//! Runs full epochs of mini-batch training for a [`Network`] described by an
//! [`ExperimentConfig`], evaluating accuracy after each epoch.
//!
//! ## Epoch Loop
//!
//! ```text
//! for epoch in 1..=epochs:
//!     for (x, y) in batches(train, batch_size):
//!         loss += network.train_step(x, y)      # stops on divergence
//!     acc = network.evaluate_accuracy(eval)
//!     logger.log(epoch, mean loss, acc, coefficients)
//!     if acc >= target_accuracy: stop
//! ```
//!
//! ## Example
//!
//! ```rust
//! use learnact::{data, train, ExperimentConfig, Network};
//!
//! let mut config = ExperimentConfig::xor();
//! config.epochs = 3;
//! let (x, y) = data::xor();
//!
//! let mut net = Network::from_config(&config)?;
//! let summary = train::run(&mut net, &config, (&x, &y), (&x, &y), None)?;
//! assert_eq!(summary.epochs_run, 3);
//! # Ok::<(), learnact::Error>(())
//! ```

use crate::config::ExperimentConfig;
use crate::data::Batches;
use crate::error::{Error, Result};
use crate::matrix::Matrix;
use crate::network::Network;
use crate::optimizer::MomentumSgd;
use crate::training_logger::TrainingLogger;
use log::info;

/// Inputs and targets of one dataset split
pub type Split<'a> = (&'a Matrix, &'a Matrix);

/// Outcome of a training run
#[derive(Clone, Debug, PartialEq)]
pub struct TrainingSummary {
    pub epochs_run: usize,
    /// Mean training loss of each completed epoch
    pub epoch_losses: Vec<f64>,
    pub final_accuracy: f64,
    pub best_accuracy: f64,
    /// Whether training stopped early at the target accuracy
    pub reached_target: bool,
}

impl TrainingSummary {
    pub fn final_loss(&self) -> Option<f64> {
        self.epoch_losses.last().copied()
    }
}

/// Train `network` for up to `config.epochs` epochs
///
/// # Arguments
///
/// * `network` - Network to train in place
/// * `config` - Loss mode, batch size, epochs, optimizer and early-stop target
/// * `train` - Training split, visited in order each epoch
/// * `eval` - Split used for the per-epoch accuracy
/// * `logger` - Optional CSV logger receiving one row per epoch
///
/// # Errors
///
/// Returns [`Error::Config`] if either split's inputs do not match the
/// network's input width, [`Error::NumericalDivergence`] as soon as a batch
/// produces a non-finite loss, and any I/O error from the logger.
pub fn run(
    network: &mut Network,
    config: &ExperimentConfig,
    train: Split<'_>,
    eval: Split<'_>,
    mut logger: Option<&mut TrainingLogger>,
) -> Result<TrainingSummary> {
    let optimizer = MomentumSgd::new(config.optimizer.clone());
    let (train_x, train_y) = train;
    let (eval_x, eval_y) = eval;

    let in_dim = network.layers().first().map_or(0, |l| l.in_dim());
    if train_x.cols != in_dim || eval_x.cols != in_dim {
        return Err(Error::Config(format!(
            "network takes {} inputs, data has {} (train) and {} (eval)",
            in_dim, train_x.cols, eval_x.cols
        )));
    }

    info!(
        "Training on {} samples for {} epochs (batch size {}, {:?})",
        train_x.rows, config.epochs, config.batch_size, config.loss
    );

    let mut summary = TrainingSummary {
        epochs_run: 0,
        epoch_losses: Vec::with_capacity(config.epochs),
        final_accuracy: 0.0,
        best_accuracy: 0.0,
        reached_target: false,
    };

    for epoch in 1..=config.epochs {
        let mut total = 0.0;
        let mut batches = 0usize;
        for (x, y) in Batches::new(train_x, train_y, config.batch_size) {
            total += network.train_step(&x, &y, &optimizer, config.loss)?;
            batches += 1;
        }
        let loss = total / batches.max(1) as f64;
        let accuracy = network.evaluate_accuracy(eval_x, eval_y);

        summary.epochs_run = epoch;
        summary.epoch_losses.push(loss);
        summary.final_accuracy = accuracy;
        summary.best_accuracy = summary.best_accuracy.max(accuracy);

        if let Some(logger) = logger.as_deref_mut() {
            logger.log(epoch, loss, accuracy, network)?;
        }

        if let Some(target) = config.target_accuracy {
            if accuracy >= target {
                info!("Reached accuracy {:.4} at epoch {}", accuracy, epoch);
                summary.reached_target = true;
                break;
            }
        }
    }

    info!(
        "Finished after {} epochs: loss {:.6}, accuracy {:.4}",
        summary.epochs_run,
        summary.final_loss().unwrap_or(f64::NAN),
        summary.final_accuracy
    );
    Ok(summary)
}
