//! Finite-difference checks for activation coefficient gradients.
//!
//! The analytic coefficient gradient of an [`ActivationUnit`] is compared
//! against centered differences of the loss `L = Σ out²`, whose output
//! gradient is `2·out`.

use crate::layers::ActivationUnit;
use crate::matrix::Matrix;

/// Step used by the standard check
pub const DEFAULT_STEP: f64 = 1e-4;
/// Absolute tolerance of the standard check
pub const DEFAULT_TOLERANCE: f64 = 1e-2;
/// Analytic gradients at or below this magnitude are not checked
pub const MIN_ANALYTIC: f64 = 1e-12;

/// One coefficient's analytic and numeric gradient
#[derive(Clone, Debug, PartialEq)]
pub struct GradCheckEntry {
    pub index: usize,
    pub analytic: f64,
    pub numeric: f64,
}

impl GradCheckEntry {
    /// `|analytic − numeric| / max(|analytic|, |numeric|, 1e-8)`, reported
    /// alongside the absolute difference but not used by [`passes`](Self::passes)
    pub fn relative_error(&self) -> f64 {
        let scale = self.analytic.abs().max(self.numeric.abs()).max(1e-8);
        (self.analytic - self.numeric).abs() / scale
    }

    /// Whether the entry is skipped, or its absolute difference is within
    /// `tolerance`
    pub fn passes(&self, tolerance: f64) -> bool {
        self.analytic.abs() <= MIN_ANALYTIC || (self.analytic - self.numeric).abs() <= tolerance
    }
}

/// Compute gradients using central finite differences.
///
/// # Arguments
/// * `f` - Scalar function of the coefficient vector
/// * `point` - Coefficients at which to differentiate
/// * `step` - Perturbation applied to one coefficient at a time
pub fn finite_diff_grad<F>(mut f: F, point: &[f64], step: f64) -> Vec<f64>
where
    F: FnMut(&[f64]) -> f64,
{
    let mut perturbed = point.to_vec();
    let mut grads = Vec::with_capacity(point.len());

    for i in 0..point.len() {
        perturbed[i] = point[i] + step;
        let f_plus = f(&perturbed);

        perturbed[i] = point[i] - step;
        let f_minus = f(&perturbed);

        perturbed[i] = point[i];
        grads.push((f_plus - f_minus) / (2.0 * step));
    }

    grads
}

fn squared_output_loss(unit: &mut ActivationUnit, inputs: &Matrix) -> f64 {
    unit.forward(inputs).data.iter().map(|v| v * v).sum()
}

/// Compare the analytic coefficient gradient of `unit` with finite differences
///
/// The unit is cloned; its own coefficients and gradient are left untouched.
///
/// # Returns
///
/// One entry per coefficient, empty for fixed families
pub fn check_coefficient_gradients(
    unit: &ActivationUnit,
    inputs: &Matrix,
    step: f64,
) -> Vec<GradCheckEntry> {
    let mut work = unit.clone();
    work.zero_coefficient_grad();
    let mut out = work.forward(inputs);
    out.scale(2.0);
    work.backward(&out);
    let analytic = work.coefficient_grad().to_vec();

    let numeric = finite_diff_grad(
        |coefficients| {
            work.coefficients_mut().copy_from_slice(coefficients);
            squared_output_loss(&mut work, inputs)
        },
        unit.coefficients(),
        step,
    );

    analytic
        .into_iter()
        .zip(numeric)
        .enumerate()
        .map(|(index, (analytic, numeric))| GradCheckEntry {
            index,
            analytic,
            numeric,
        })
        .collect()
}
