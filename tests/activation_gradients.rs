//! Integration tests for activation coefficient gradients and the piecewise
//! family's structural guarantees.

use learnact::gradcheck::{check_coefficient_gradients, DEFAULT_STEP, DEFAULT_TOLERANCE};
use learnact::layers::activation::piecewise_breakpoints;
use learnact::{ActivationConfig, ActivationKind, ActivationUnit, Matrix};

// ============================================================================
// Test Utilities
// ============================================================================

fn unit(kind: ActivationKind, coefficients: &[f64], width: usize) -> ActivationUnit {
    ActivationUnit::with_coefficients(kind, coefficients.to_vec(), width, &ActivationConfig::default())
}

fn assert_gradients_match(unit: &ActivationUnit, inputs: &Matrix) {
    let entries = check_coefficient_gradients(unit, inputs, DEFAULT_STEP);
    assert_eq!(entries.len(), unit.kind().coefficient_count());
    for entry in entries {
        assert!(
            entry.passes(DEFAULT_TOLERANCE),
            "{:?} coefficient {}: analytic {} vs numeric {}",
            unit.kind(),
            entry.index,
            entry.analytic,
            entry.numeric
        );
    }
}

// ============================================================================
// Test: Finite-Difference Agreement
// ============================================================================

#[test]
fn test_leaky_slope_gradient() {
    let inputs = Matrix::new(vec![-1.5, -0.4, 0.7, 2.0, -0.9, 0.2], 2, 3);
    assert_gradients_match(&unit(ActivationKind::LeakyVariableSlope, &[0.3], 3), &inputs);
}

#[test]
fn test_cubic_gradient() {
    let inputs = Matrix::new(vec![-1.3, -0.2, 0.6, 1.1, 1.9, -2.2], 3, 2);
    assert_gradients_match(
        &unit(ActivationKind::CubicPolynomial, &[0.2, 0.8, -0.3, 0.1], 2),
        &inputs,
    );
}

#[test]
fn test_self_gated_gradient() {
    let inputs = Matrix::new(vec![-2.0, -0.5, 0.3, 1.4], 1, 4);
    assert_gradients_match(&unit(ActivationKind::SelfGated, &[0.8], 4), &inputs);
}

#[test]
fn test_piecewise_gradient_every_segment() {
    let coefficients = [-0.5, 0.2, -0.3, 0.5, 1.5, -0.7, 2.0];
    let taus = piecewise_breakpoints([coefficients[0], coefficients[1], coefficients[2]]);
    // τ ≈ (-0.5, 0.7214, 1.4622)
    assert!((taus[1] - 0.7214).abs() < 1e-3 && (taus[2] - 1.4622).abs() < 1e-3);

    // Two samples per segment, plus one beyond the clip bound
    let inputs = Matrix::new(
        vec![-2.0, -0.9, 0.1, 0.4, 0.9, 1.2, 2.5, 6.0],
        2,
        4,
    );
    let piecewise = unit(ActivationKind::PiecewiseLinear, &coefficients, 4);
    assert_gradients_match(&piecewise, &inputs);

    let entries = check_coefficient_gradients(&piecewise, &inputs, DEFAULT_STEP);
    assert!(
        entries.iter().all(|e| e.analytic.abs() > 1e-12),
        "every piecewise coefficient should receive gradient: {:?}",
        entries
    );
}

#[test]
fn test_fixed_families_have_nothing_to_check() {
    let inputs = Matrix::new(vec![-1.0, 1.0], 1, 2);
    for kind in [ActivationKind::FixedRectifier, ActivationKind::FixedSigmoid] {
        assert!(check_coefficient_gradients(&unit(kind, &[], 2), &inputs, DEFAULT_STEP).is_empty());
    }
}

// ============================================================================
// Test: Piecewise Structure
// ============================================================================

#[test]
fn test_breakpoints_strictly_ordered_over_grid() {
    let grid: Vec<f64> = (0..=20).map(|i| -10.0 + i as f64).collect();
    for &p0 in &grid {
        for &p1 in &grid {
            for &p2 in &grid {
                let [t0, t1, t2] = piecewise_breakpoints([p0, p1, p2]);
                assert!(t0 < t1 && t1 < t2, "p=({}, {}, {}) gave {:?}", p0, p1, p2, [t0, t1, t2]);
            }
        }
    }
}

#[test]
fn test_piecewise_continuous_at_breakpoints() {
    let h = 1e-12;
    for &p0 in &[-3.0, -1.0, 0.5] {
        for &p in &[-1.0, 0.0, 0.5] {
            for slopes in [[1.0, 1.0, 1.0, 1.0], [0.1, 2.0, -1.5, 3.0], [-3.0, 0.5, 2.5, -0.2]] {
                let coefficients = [p0, p, -p, slopes[0], slopes[1], slopes[2], slopes[3]];
                let mut u = unit(ActivationKind::PiecewiseLinear, &coefficients, 6);
                let taus = u.breakpoints().unwrap();

                let mut points = Vec::new();
                for tau in taus {
                    points.push(tau - h);
                    points.push(tau + h);
                }
                let out = u.forward(&Matrix::new(points, 1, 6));
                for pair in out.data.chunks(2) {
                    assert!(
                        (pair[0] - pair[1]).abs() < 1e-9,
                        "jump of {} at a breakpoint for {:?}",
                        (pair[0] - pair[1]).abs(),
                        coefficients
                    );
                }
            }
        }
    }
}

#[test]
fn test_piecewise_default_is_identity_inside_bound() {
    let mut u = unit(
        ActivationKind::PiecewiseLinear,
        &ActivationKind::PiecewiseLinear.default_coefficients(),
        5,
    );
    let z = Matrix::new(vec![-4.0, -0.5, 0.0, 0.5, 4.0], 1, 5);
    let out = u.forward(&z);
    for (o, z) in out.data.iter().zip(&z.data) {
        assert!((o - z).abs() < 1e-12);
    }
}

#[test]
fn test_piecewise_clips_to_bound() {
    let mut u = unit(
        ActivationKind::PiecewiseLinear,
        &ActivationKind::PiecewiseLinear.default_coefficients(),
        2,
    );
    let out = u.forward(&Matrix::new(vec![-50.0, 50.0], 1, 2));
    assert_eq!(out.data, vec![-5.0, 5.0]);
}
