//! Output Losses
//!
//! Two losses close the network: softmax cross-entropy for multi-class
//! classification and mean squared error for regression or single-output
//! binary targets. Each function returns the scalar loss together with the
//! gradient of that loss with respect to the network output.
//!
//! ## Cross-Entropy
//!
//! ```text
//! p = softmax(out - max(out))          # per row, shifted for stability
//! loss = mean_rows(-ln(p[label] + 1e-8))
//! grad = p - one_hot(label)
//! ```
//!
//! The gradient is not divided by the batch size here; the dense layers
//! already average over rows when they accumulate weight and bias gradients.
//!
//! ## Mean Squared Error
//!
//! ```text
//! d = out - target
//! loss = Σ d² / (batch · out_dim)
//! grad = 2 d / (batch · out_dim)
//! ```
//!
//! A target with a single column is broadcast across every output column.

use crate::matrix::Matrix;
use serde::{Deserialize, Serialize};

/// Added inside the logarithm so a zero probability stays finite
const LOG_EPSILON: f64 = 1e-8;

/// Which loss closes the network
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LossMode {
    /// Softmax cross-entropy; targets are one column of class indices
    CrossEntropy,
    /// Mean squared error; targets match the output or have one column
    MeanSquaredError,
}

/// Reported loss and the gradient with respect to the network output
#[derive(Clone, Debug)]
pub struct LossAndGrad {
    pub loss: f64,
    pub output_grad: Matrix,
}

/// Row-wise softmax with the row maximum subtracted first
pub fn softmax(logits: &Matrix) -> Matrix {
    let mut probs = logits.clone();
    for row in probs.data.chunks_mut(logits.cols.max(1)) {
        let max = row.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        let mut sum = 0.0;
        for v in row.iter_mut() {
            *v = (*v - max).exp();
            sum += *v;
        }
        for v in row.iter_mut() {
            *v /= sum;
        }
    }
    probs
}

/// Softmax cross-entropy against integer class labels
///
/// # Arguments
///
/// * `logits` - Network output `[batch, classes]`
/// * `labels` - Class index per row `[batch, 1]`, stored as `f64`
///
/// # Panics
///
/// Panics if `labels` is not one column per row or a label is out of range
pub fn cross_entropy(logits: &Matrix, labels: &Matrix) -> (f64, Matrix) {
    assert_eq!(
        (labels.rows, labels.cols),
        (logits.rows, 1),
        "Cross-entropy expects one label column per output row"
    );
    let mut grad = softmax(logits);
    let mut loss = 0.0;

    for (i, &label) in labels.data.iter().enumerate() {
        let class = label as usize;
        assert!(
            label >= 0.0 && class < logits.cols,
            "Label {} out of range for {} classes",
            label,
            logits.cols
        );
        let idx = i * logits.cols + class;
        loss -= (grad.data[idx] + LOG_EPSILON).ln();
        grad.data[idx] -= 1.0;
    }

    (loss / logits.rows.max(1) as f64, grad)
}

/// Mean squared error, broadcasting a single target column
///
/// # Panics
///
/// Panics if `targets` has neither `output.cols` nor one column, or a
/// different row count
pub fn mean_squared_error(output: &Matrix, targets: &Matrix) -> (f64, Matrix) {
    assert!(
        targets.rows == output.rows && (targets.cols == output.cols || targets.cols == 1),
        "Target shape [{}, {}] incompatible with output [{}, {}]",
        targets.rows,
        targets.cols,
        output.rows,
        output.cols
    );
    let denom = (output.rows * output.cols).max(1) as f64;
    let mut grad = Matrix::zeros(output.rows, output.cols);
    let mut sum_sq = 0.0;

    for i in 0..output.rows {
        for j in 0..output.cols {
            let target = if targets.cols == 1 {
                targets.data[i]
            } else {
                targets.data[i * targets.cols + j]
            };
            let d = output.data[i * output.cols + j] - target;
            sum_sq += d * d;
            grad.data[i * output.cols + j] = 2.0 * d / denom;
        }
    }

    (sum_sq / denom, grad)
}

impl LossMode {
    /// Evaluate this loss on a batch
    pub fn evaluate(self, output: &Matrix, targets: &Matrix) -> (f64, Matrix) {
        match self {
            LossMode::CrossEntropy => cross_entropy(output, targets),
            LossMode::MeanSquaredError => mean_squared_error(output, targets),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_softmax_rows_sum_to_one() {
        let logits = Matrix::new(vec![1.0, 2.0, 3.0, 1000.0, 1000.0, 1000.0], 2, 3);
        let p = softmax(&logits);
        for i in 0..2 {
            let sum: f64 = p.row(i).iter().sum();
            assert!((sum - 1.0).abs() < 1e-12);
        }
        assert!((p.data[3] - 1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_cross_entropy_gradient_is_softmax_minus_one_hot() {
        let logits = Matrix::new(vec![0.5, -1.0, 2.0], 1, 3);
        let labels = Matrix::new(vec![1.0], 1, 1);
        let (loss, grad) = cross_entropy(&logits, &labels);

        let p = softmax(&logits);
        assert!((grad.data[0] - p.data[0]).abs() < 1e-12);
        assert!((grad.data[1] - (p.data[1] - 1.0)).abs() < 1e-12);
        assert!((grad.data[2] - p.data[2]).abs() < 1e-12);
        assert!((loss + (p.data[1] + LOG_EPSILON).ln()).abs() < 1e-12);
    }

    #[test]
    fn test_cross_entropy_loss_is_batch_mean() {
        let logits = Matrix::new(vec![0.0, 0.0, 0.0, 0.0], 2, 2);
        let labels = Matrix::new(vec![0.0, 1.0], 2, 1);
        let (loss, _) = cross_entropy(&logits, &labels);
        assert!((loss - (0.5f64 + LOG_EPSILON).ln().abs()).abs() < 1e-12);
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_cross_entropy_label_out_of_range() {
        let logits = Matrix::zeros(1, 2);
        cross_entropy(&logits, &Matrix::new(vec![2.0], 1, 1));
    }

    #[test]
    fn test_mse_values() {
        let out = Matrix::new(vec![1.0, 2.0], 1, 2);
        let targets = Matrix::new(vec![0.0, 0.0], 1, 2);
        let (loss, grad) = mean_squared_error(&out, &targets);
        assert!((loss - 2.5).abs() < 1e-12);
        assert_eq!(grad.data, vec![1.0, 2.0]);
    }

    #[test]
    fn test_mse_broadcasts_single_target_column() {
        let out = Matrix::new(vec![1.0, 3.0, 0.0, 0.0], 2, 2);
        let targets = Matrix::new(vec![1.0, 0.0], 2, 1);
        let (loss, grad) = mean_squared_error(&out, &targets);
        // d = [0, 2, 0, 0]
        assert!((loss - 1.0).abs() < 1e-12);
        assert_eq!(grad.data, vec![0.0, 1.0, 0.0, 0.0]);
    }
}
