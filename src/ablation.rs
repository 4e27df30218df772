//! Activation Ablations
//!
//! Sweeps hidden-layer activation families and coefficient init strategies
//! over a base configuration, training one fresh network per combination and
//! collecting the final metrics into a single CSV table.
//!
//! ## Grid
//!
//! ```text
//! for kind in kinds:
//!     for strategy in strategies:
//!         config = base with hidden layers set to (kind, strategy)
//!         summary = train::run(Network::from_config(config), ...)
//!         rows.push(dataset, kind, strategy, summary)
//! ```
//!
//! The output layer keeps the base configuration's activation and strategy.
//! A combination that diverges is logged and left out of the table; the rest
//! of the grid still runs.
//!
//! ## CSV Format
//!
//! ```text
//! dataset,act_hidden,act_init,seed,epochs,final_loss,final_acc,best_acc
//! spirals,cubic,noisy,42,100,0.201733,0.9100,0.9150
//! ```

use crate::config::{ConfigOverrides, ExperimentConfig};
use crate::error::{Error, Result};
use crate::layers::{ActivationKind, InitStrategy};
use crate::network::Network;
use crate::train::{self, Split};
use log::{info, warn};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Final metrics of one grid cell
#[derive(Clone, Debug, PartialEq)]
pub struct AblationRow {
    pub dataset: String,
    pub activation: ActivationKind,
    pub strategy: InitStrategy,
    pub seed: u64,
    pub epochs_run: usize,
    pub final_loss: f64,
    pub final_accuracy: f64,
    pub best_accuracy: f64,
}

/// Train every `(kind, strategy)` combination on one dataset
///
/// Per-run CSV logging is disabled; the returned rows are the record.
///
/// # Arguments
///
/// * `dataset` - Name written to the `dataset` column
/// * `base` - Configuration whose hidden layers are replaced per cell
/// * `train` - Training split
/// * `eval` - Split used for accuracy
/// * `kinds` - Hidden-layer activation families to try
/// * `strategies` - Hidden-layer init strategies to try
///
/// # Errors
///
/// Configuration and I/O errors abort the sweep. Divergence of a single cell
/// does not.
pub fn run_grid(
    dataset: &str,
    base: &ExperimentConfig,
    train: Split<'_>,
    eval: Split<'_>,
    kinds: &[ActivationKind],
    strategies: &[InitStrategy],
) -> Result<Vec<AblationRow>> {
    let mut rows = Vec::with_capacity(kinds.len() * strategies.len());

    for &kind in kinds {
        for &strategy in strategies {
            let mut config = base.clone();
            config.log_path = None;
            ConfigOverrides {
                hidden_activation: Some(kind),
                hidden_strategy: Some(strategy),
                ..ConfigOverrides::default()
            }
            .apply(&mut config)?;

            info!("Ablation {}: {} / {}", dataset, kind.name(), strategy.name());
            let mut network = Network::from_config(&config)?;
            let summary = match train::run(&mut network, &config, train, eval, None) {
                Ok(summary) => summary,
                Err(Error::NumericalDivergence { loss }) => {
                    warn!(
                        "Skipping {} / {} on {}: diverged with loss {}",
                        kind.name(),
                        strategy.name(),
                        dataset,
                        loss
                    );
                    continue;
                }
                Err(e) => return Err(e),
            };

            rows.push(AblationRow {
                dataset: dataset.to_string(),
                activation: kind,
                strategy,
                seed: config.seed,
                epochs_run: summary.epochs_run,
                final_loss: summary.final_loss().unwrap_or(f64::NAN),
                final_accuracy: summary.final_accuracy,
                best_accuracy: summary.best_accuracy,
            });
        }
    }

    Ok(rows)
}

/// Write `rows` as CSV, replacing any existing file
pub fn write_csv<P: AsRef<Path>>(path: P, rows: &[AblationRow]) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    writeln!(
        writer,
        "dataset,act_hidden,act_init,seed,epochs,final_loss,final_acc,best_acc"
    )?;
    for row in rows {
        writeln!(
            writer,
            "{},{},{},{},{},{:.6},{:.4},{:.4}",
            row.dataset,
            row.activation.name(),
            row.strategy.name(),
            row.seed,
            row.epochs_run,
            row.final_loss,
            row.final_accuracy,
            row.best_accuracy
        )?;
    }
    writer.flush()?;
    Ok(())
}
