//! Error types
//!
//! Shape mismatches are programming errors and panic at the call site. The
//! variants here cover the conditions a training run can actually hit:
//! divergence of the loss, and failures of the I/O, dataset and configuration
//! layers around the core.

use std::path::PathBuf;

/// Errors produced by training runs and their surrounding I/O
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The loss became NaN or infinite; training cannot continue
    #[error("numerical divergence: loss became {loss}")]
    NumericalDivergence { loss: f64 },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("malformed dataset {}: {reason}", path.display())]
    Dataset { path: PathBuf, reason: String },

    #[error("invalid configuration: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;
