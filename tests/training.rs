//! Integration tests for end-to-end training behaviour.

use learnact::{
    ActivationConfig, ActivationKind, InitStrategy, LossMode, Matrix, MomentumSgd, Network,
    OptimizerConfig,
};

// ============================================================================
// Test Utilities
// ============================================================================

/// Points on a 6×6 grid in [-2, 2]², labelled by the sign of x0 + x1.
/// Points on the boundary itself are left out.
fn separable_set() -> (Matrix, Matrix) {
    let mut xs = Vec::new();
    let mut ys = Vec::new();
    for i in 0..6 {
        for j in 0..6 {
            let a = -2.0 + 0.8 * i as f64;
            let b = -2.0 + 0.8 * j as f64;
            if (a + b).abs() < 1e-9 {
                continue;
            }
            xs.push(vec![a, b]);
            ys.push(vec![if a + b > 0.0 { 1.0 } else { 0.0 }]);
        }
    }
    (Matrix::from_rows(&xs), Matrix::from_rows(&ys))
}

fn optimizer() -> MomentumSgd {
    MomentumSgd::new(OptimizerConfig {
        lr: 0.05,
        momentum: 0.9,
        ..OptimizerConfig::default()
    })
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

fn train_losses(net: &mut Network, mode: LossMode, steps: usize) -> Vec<f64> {
    let (x, y) = separable_set();
    let opt = optimizer();
    (0..steps)
        .map(|_| net.train_step(&x, &y, &opt, mode).unwrap())
        .collect()
}

// ============================================================================
// Test: Loss Decreases on a Separable Problem
// ============================================================================

#[test]
fn test_every_hidden_family_trains_stably() {
    for kind in ActivationKind::ALL {
        let mut net = Network::new(
            &[2, 4, 2],
            &[kind, ActivationKind::LeakyVariableSlope],
            &[InitStrategy::NoisyDefault, InitStrategy::Default],
            &ActivationConfig::default(),
            1.0,
            42,
        );
        let losses = train_losses(&mut net, LossMode::CrossEntropy, 300);

        assert!(losses.iter().all(|l| l.is_finite()), "{:?} produced a non-finite loss", kind);
        let first = mean(&losses[..30]);
        let last = mean(&losses[losses.len() - 30..]);
        assert!(first > last, "{:?}: loss went from {} to {}", kind, first, last);
    }
}

#[test]
fn test_sigmoid_output_with_mse() {
    let mut net = Network::new(
        &[2, 4, 1],
        &[ActivationKind::CubicPolynomial, ActivationKind::FixedSigmoid],
        &[InitStrategy::NoisyDefault, InitStrategy::Default],
        &ActivationConfig::default(),
        1.0,
        7,
    );
    let losses = train_losses(&mut net, LossMode::MeanSquaredError, 300);
    assert!(losses.iter().all(|l| l.is_finite()));
    assert!(mean(&losses[..30]) > mean(&losses[270..]));
}

#[test]
fn test_training_keeps_coefficients_in_range_and_breakpoints_ordered() {
    let mut net = Network::new(
        &[2, 6, 2],
        &[ActivationKind::PiecewiseLinear, ActivationKind::SelfGated],
        &[InitStrategy::RandomSmall, InitStrategy::RandomSmall],
        &ActivationConfig::default(),
        1.0,
        3,
    );
    train_losses(&mut net, LossMode::CrossEntropy, 200);

    assert!(net.coefficients().iter().all(|c| (-10.0..=10.0).contains(c)));
    let [t0, t1, t2] = net.layers()[0].activation().breakpoints().unwrap();
    assert!(t0 < t1 && t1 < t2);
    // The optimizer leaves no gradient behind
    for layer in net.layers() {
        assert!(layer.activation().coefficient_grad().iter().all(|&g| g == 0.0));
        assert!(layer.grad_weight.data.iter().all(|&g| g == 0.0));
    }
}

#[test]
fn test_same_seed_reproduces_run() {
    let build = || {
        Network::new(
            &[2, 4, 2],
            &[ActivationKind::CubicPolynomial, ActivationKind::LeakyVariableSlope],
            &[InitStrategy::NoisyDefault, InitStrategy::NoisyDefault],
            &ActivationConfig::default(),
            1.0,
            99,
        )
    };
    let mut a = build();
    let mut b = build();
    assert_eq!(
        train_losses(&mut a, LossMode::CrossEntropy, 20),
        train_losses(&mut b, LossMode::CrossEntropy, 20)
    );
    assert_eq!(a.coefficients(), b.coefficients());
}

// ============================================================================
// Test: Network Weight Gradients
// ============================================================================

#[test]
fn test_cross_entropy_weight_gradient_matches_finite_difference() {
    let mut net = Network::new(
        &[2, 3, 2],
        &[ActivationKind::SelfGated, ActivationKind::CubicPolynomial],
        &[InitStrategy::RandomSmall, InitStrategy::RandomSmall],
        &ActivationConfig::default(),
        1e9,
        17,
    );
    let x = Matrix::new(vec![0.5, -1.0, 1.5, 0.25, -0.75, 0.8], 3, 2);
    let y = Matrix::new(vec![0.0, 1.0, 1.0], 3, 1);

    net.loss_and_grad(&x, &y, LossMode::CrossEntropy).unwrap();
    let analytic = net.layers()[0].grad_weight.clone();

    let step = 1e-6;
    for i in 0..analytic.len() {
        let loss_at = |delta: f64| {
            let mut perturbed = net.clone();
            perturbed.layers_mut()[0].weight.data[i] += delta;
            let out = perturbed.forward(&x);
            LossMode::CrossEntropy.evaluate(&out, &y).0
        };
        let numeric = (loss_at(step) - loss_at(-step)) / (2.0 * step);
        assert!(
            (analytic.data[i] - numeric).abs() < 1e-5,
            "weight {}: analytic {} vs numeric {}",
            i,
            analytic.data[i],
            numeric
        );
    }
}
