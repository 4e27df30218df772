//! Training Logger
//!
//! Writes one CSV row per epoch so a run can be plotted afterwards, including
//! how every activation coefficient evolved.
//!
//! ## Example
//!
//! ```rust,no_run
//! use learnact::{ExperimentConfig, Network, TrainingLogger};
//!
//! let net = Network::from_config(&ExperimentConfig::xor())?;
//! let mut logger = TrainingLogger::new("xor_42.csv", &net)?;
//! logger.log(1, 0.25, 0.5, &net)?;
//! # Ok::<(), learnact::Error>(())
//! ```
//!
//! ## CSV Format
//!
//! - `epoch`: Epoch number, starting at 1
//! - `loss`: Mean training loss over the epoch's batches
//! - `acc`: Evaluation accuracy after the epoch
//! - `l<layer>_<name>`: One column per activation coefficient, e.g. `l0_a1` or
//!   `l1_s3`. Layers with a fixed activation contribute no columns.

use crate::error::Result;
use crate::network::Network;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::time::Instant;

/// Per-epoch CSV logger
///
/// Every row is flushed immediately, so a run that stops early (or diverges)
/// still leaves a complete log up to its last epoch.
pub struct TrainingLogger {
    writer: BufWriter<File>,
    columns: usize,
    start_time: Instant,
}

impl TrainingLogger {
    /// Create the CSV file and write its header for `network`'s coefficients
    pub fn new<P: AsRef<Path>>(log_path: P, network: &Network) -> Result<Self> {
        let mut writer = BufWriter::new(File::create(log_path)?);
        let names = network.coefficient_names();

        write!(writer, "epoch,loss,acc")?;
        for name in &names {
            write!(writer, ",{}", name)?;
        }
        writeln!(writer)?;
        writer.flush()?;

        Ok(Self {
            writer,
            columns: names.len(),
            start_time: Instant::now(),
        })
    }

    /// Append a row and echo a progress line to the console
    ///
    /// # Panics
    ///
    /// Panics if `network` has a different coefficient layout than the one the
    /// header was written for
    pub fn log(&mut self, epoch: usize, loss: f64, accuracy: f64, network: &Network) -> Result<()> {
        let coefficients = network.coefficients();
        assert_eq!(
            coefficients.len(),
            self.columns,
            "Coefficient count changed since the header was written"
        );

        write!(self.writer, "{},{:.6},{:.4}", epoch, loss, accuracy)?;
        for c in &coefficients {
            write!(self.writer, ",{:.6}", c)?;
        }
        writeln!(self.writer)?;
        self.writer.flush()?;

        println!(
            "Epoch {:4} | Time: {:7.1}s | Loss: {:.6} | Acc: {:.4}",
            epoch,
            self.start_time.elapsed().as_secs_f32(),
            loss,
            accuracy
        );
        Ok(())
    }
}
