//! Learnable Activation Functions
//!
//! This module provides [`ActivationUnit`], an elementwise activation whose
//! shape is itself trained. Each unit evaluates one [`ActivationKind`] over a
//! batch, caches what the backward pass needs, and on backward returns the
//! gradient with respect to its input while accumulating the gradient with
//! respect to its own coefficients.
//!
//! ## Families
//!
//! | Kind                 | Coefficients                 | Formula                                  |
//! |----------------------|------------------------------|------------------------------------------|
//! | `LeakyVariableSlope` | `slope`                      | `z` if `z ≥ 0`, else `slope·z`           |
//! | `CubicPolynomial`    | `a0, a1, a2, a3`             | `a0 + a1·z + a2·z² + a3·z³`              |
//! | `PiecewiseLinear`    | `p0, p1, p2, s0, s1, s2, s3` | continuous 4-segment line (see below)    |
//! | `SelfGated`          | `gate`                       | `z · σ(gate·z)`                          |
//! | `FixedRectifier`     | none                         | `max(0, z)`                              |
//! | `FixedSigmoid`       | none                         | `σ(z)`                                   |
//!
//! ## Piecewise Linear Breakpoints
//!
//! The three breakpoints are not stored directly. The first three
//! coefficients parameterize them as
//!
//! ```text
//! τ0 = p0
//! τ1 = p0 + exp(p1)
//! τ2 = τ1 + exp(p2)
//! ```
//!
//! so `τ0 < τ1 < τ2` holds for any real `p1, p2` and the optimizer can move
//! them freely. The input is clipped to `[-B, B]`, the segment index is the
//! number of breakpoints the clipped value exceeds, and the output is
//!
//! ```text
//! f(z) = s[seg]·z + c(seg),   c(seg) = Σ_{m<seg} (s[m] − s[m+1])·τ[m]
//! ```
//!
//! where `c` is the unique offset making `f` continuous at every breakpoint.
//!
//! ## Gradient Accumulation
//!
//! `backward` adds into the coefficient gradient; it never overwrites. The
//! optimizer resets it after consuming it, once per update.

use crate::config::ActivationConfig;
use crate::error::{Error, Result};
use crate::matrix::Matrix;
use rand::Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// The closed set of activation families
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActivationKind {
    LeakyVariableSlope,
    CubicPolynomial,
    PiecewiseLinear,
    SelfGated,
    FixedRectifier,
    FixedSigmoid,
}

impl ActivationKind {
    pub const ALL: [ActivationKind; 6] = [
        ActivationKind::LeakyVariableSlope,
        ActivationKind::CubicPolynomial,
        ActivationKind::PiecewiseLinear,
        ActivationKind::SelfGated,
        ActivationKind::FixedRectifier,
        ActivationKind::FixedSigmoid,
    ];

    /// Number of learnable coefficients
    pub fn coefficient_count(self) -> usize {
        self.coefficient_names().len()
    }

    /// Human-readable coefficient names, in storage order
    pub fn coefficient_names(self) -> &'static [&'static str] {
        match self {
            ActivationKind::LeakyVariableSlope => &["slope"],
            ActivationKind::CubicPolynomial => &["a0", "a1", "a2", "a3"],
            ActivationKind::PiecewiseLinear => &["p0", "p1", "p2", "s0", "s1", "s2", "s3"],
            ActivationKind::SelfGated => &["gate"],
            ActivationKind::FixedRectifier | ActivationKind::FixedSigmoid => &[],
        }
    }

    /// Near-identity or otherwise stable starting coefficients
    pub fn default_coefficients(self) -> Vec<f64> {
        match self {
            ActivationKind::LeakyVariableSlope => vec![0.25],
            ActivationKind::CubicPolynomial => vec![0.0, 1.0, 0.0, 0.0],
            // τ = (-1, 0, 1): p1 = p2 = ln(1)
            ActivationKind::PiecewiseLinear => vec![-1.0, 0.0, 0.0, 1.0, 1.0, 1.0, 1.0],
            ActivationKind::SelfGated => vec![1.0],
            ActivationKind::FixedRectifier | ActivationKind::FixedSigmoid => Vec::new(),
        }
    }

    /// Whether a single-output network reads its raw output as a probability
    /// when measuring accuracy
    pub fn is_saturating(self) -> bool {
        matches!(self, ActivationKind::FixedSigmoid | ActivationKind::SelfGated)
    }

    /// Short name used on the command line and in result tables
    pub fn name(self) -> &'static str {
        match self {
            ActivationKind::LeakyVariableSlope => "leaky",
            ActivationKind::CubicPolynomial => "cubic",
            ActivationKind::PiecewiseLinear => "piecewise",
            ActivationKind::SelfGated => "gated",
            ActivationKind::FixedRectifier => "relu",
            ActivationKind::FixedSigmoid => "sigmoid",
        }
    }
}

impl FromStr for ActivationKind {
    type Err = Error;

    /// Accepts the short [`name`](ActivationKind::name) or the variant name,
    /// in any case
    fn from_str(s: &str) -> Result<Self> {
        ActivationKind::ALL
            .into_iter()
            .find(|kind| {
                s.eq_ignore_ascii_case(kind.name()) || s.eq_ignore_ascii_case(&format!("{:?}", kind))
            })
            .ok_or_else(|| {
                let names: Vec<_> = ActivationKind::ALL.iter().map(|k| k.name()).collect();
                Error::Config(format!(
                    "unknown activation '{}' (expected one of {})",
                    s,
                    names.join(", ")
                ))
            })
    }
}

/// How coefficients are initialized around the family defaults
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InitStrategy {
    Default,
    /// Defaults plus uniform noise in ±0.01
    NoisyDefault,
    /// Defaults plus uniform noise in ±0.05
    RandomSmall,
    IdentityLike,
}

impl InitStrategy {
    pub const ALL: [InitStrategy; 4] = [
        InitStrategy::Default,
        InitStrategy::NoisyDefault,
        InitStrategy::RandomSmall,
        InitStrategy::IdentityLike,
    ];

    fn noise_amplitude(self) -> f64 {
        match self {
            InitStrategy::Default | InitStrategy::IdentityLike => 0.0,
            InitStrategy::NoisyDefault => 0.01,
            InitStrategy::RandomSmall => 0.05,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            InitStrategy::Default => "default",
            InitStrategy::NoisyDefault => "noisy",
            InitStrategy::RandomSmall => "random-small",
            InitStrategy::IdentityLike => "identity",
        }
    }
}

impl FromStr for InitStrategy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        InitStrategy::ALL
            .into_iter()
            .find(|strategy| {
                s.eq_ignore_ascii_case(strategy.name())
                    || s.eq_ignore_ascii_case(&format!("{:?}", strategy))
            })
            .ok_or_else(|| {
                let names: Vec<_> = InitStrategy::ALL.iter().map(|k| k.name()).collect();
                Error::Config(format!(
                    "unknown init strategy '{}' (expected one of {})",
                    s,
                    names.join(", ")
                ))
            })
    }
}

/// Logistic sigmoid with the argument clamped to `[-500, 500]`
pub fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x.clamp(-500.0, 500.0)).exp())
}

/// Breakpoints derived from the reparameterization `(p0, p1, p2)`
///
/// ```rust
/// # use learnact::layers::activation::piecewise_breakpoints;
/// assert_eq!(piecewise_breakpoints([-1.0, 0.0, 0.0]), [-1.0, 0.0, 1.0]);
/// ```
pub fn piecewise_breakpoints(p: [f64; 3]) -> [f64; 3] {
    let tau0 = p[0];
    let tau1 = tau0 + p[1].exp();
    let tau2 = tau1 + p[2].exp();
    [tau0, tau1, tau2]
}

/// Derived form of the piecewise coefficients
#[derive(Clone, Copy, Debug)]
struct Piecewise {
    taus: [f64; 3],
    slopes: [f64; 4],
    /// Continuity offset `c(seg)` for each segment
    offsets: [f64; 4],
}

impl Piecewise {
    fn from_coefficients(c: &[f64]) -> Self {
        let taus = piecewise_breakpoints([c[0], c[1], c[2]]);
        let slopes = [c[3], c[4], c[5], c[6]];
        let mut offsets = [0.0; 4];
        for seg in 1..4 {
            offsets[seg] = offsets[seg - 1] + (slopes[seg - 1] - slopes[seg]) * taus[seg - 1];
        }
        Self {
            taus,
            slopes,
            offsets,
        }
    }

    fn segment(&self, zc: f64) -> usize {
        self.taus.iter().filter(|&&tau| zc > tau).count()
    }

    fn value(&self, zc: f64) -> f64 {
        let seg = self.segment(zc);
        self.slopes[seg] * zc + self.offsets[seg]
    }
}

/// Apply `f` to every element in parallel
fn map_elementwise<F>(input: &Matrix, f: F) -> Matrix
where
    F: Fn(f64) -> f64 + Sync + Send,
{
    let data = input.data.par_iter().map(|&z| f(z)).collect();
    Matrix::new(data, input.rows, input.cols)
}

/// A learnable elementwise activation with its forward cache
#[derive(Clone, Debug)]
pub struct ActivationUnit {
    kind: ActivationKind,
    coefficients: Vec<f64>,
    coefficient_grad: Vec<f64>,
    piecewise_bound: f64,
    cached_input: Matrix,
    cached_output: Matrix,
}

impl ActivationUnit {
    /// Create a unit for `width` features, initializing coefficients with
    /// `strategy`
    ///
    /// Noise for the perturbing strategies is drawn from `rng`.
    pub fn new<R: Rng + ?Sized>(
        kind: ActivationKind,
        strategy: InitStrategy,
        width: usize,
        config: &ActivationConfig,
        rng: &mut R,
    ) -> Self {
        let mut coefficients = kind.default_coefficients();
        let amplitude = strategy.noise_amplitude();
        if amplitude > 0.0 {
            for c in coefficients.iter_mut() {
                *c += rng.random_range(-amplitude..=amplitude);
            }
        }
        Self::with_coefficients(kind, coefficients, width, config)
    }

    /// Create a unit with explicit coefficient values
    ///
    /// # Panics
    ///
    /// Panics if `coefficients.len()` is not the family's coefficient count
    pub fn with_coefficients(
        kind: ActivationKind,
        coefficients: Vec<f64>,
        width: usize,
        config: &ActivationConfig,
    ) -> Self {
        assert_eq!(
            coefficients.len(),
            kind.coefficient_count(),
            "{:?} takes {} coefficients",
            kind,
            kind.coefficient_count()
        );
        let coefficient_grad = vec![0.0; coefficients.len()];
        Self {
            kind,
            coefficients,
            coefficient_grad,
            piecewise_bound: config.piecewise_bound,
            cached_input: Matrix::zeros(0, width),
            cached_output: Matrix::zeros(0, width),
        }
    }

    pub fn kind(&self) -> ActivationKind {
        self.kind
    }

    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    pub fn coefficients_mut(&mut self) -> &mut [f64] {
        &mut self.coefficients
    }

    pub fn coefficient_grad(&self) -> &[f64] {
        &self.coefficient_grad
    }

    pub fn coefficient_grad_mut(&mut self) -> &mut [f64] {
        &mut self.coefficient_grad
    }

    pub fn zero_coefficient_grad(&mut self) {
        self.coefficient_grad.iter_mut().for_each(|g| *g = 0.0);
    }

    /// Pre-activation batch from the most recent forward call
    pub fn cached_input(&self) -> &Matrix {
        &self.cached_input
    }

    /// Output batch from the most recent forward call
    pub fn cached_output(&self) -> &Matrix {
        &self.cached_output
    }

    /// Derived breakpoints, for the piecewise family only
    pub fn breakpoints(&self) -> Option<[f64; 3]> {
        match self.kind {
            ActivationKind::PiecewiseLinear => Some(piecewise_breakpoints([
                self.coefficients[0],
                self.coefficients[1],
                self.coefficients[2],
            ])),
            _ => None,
        }
    }

    /// Forward pass
    ///
    /// Evaluates the activation elementwise and caches both `input` and the
    /// result for the backward pass.
    ///
    /// # Returns
    ///
    /// Output of the same shape as `input`
    pub fn forward(&mut self, input: &Matrix) -> Matrix {
        self.cached_input.assign(input);
        let c = &self.coefficients;

        let output = match self.kind {
            ActivationKind::LeakyVariableSlope => {
                let slope = c[0];
                map_elementwise(input, |z| if z >= 0.0 { z } else { slope * z })
            }
            ActivationKind::CubicPolynomial => {
                let (a0, a1, a2, a3) = (c[0], c[1], c[2], c[3]);
                map_elementwise(input, |z| a0 + z * (a1 + z * (a2 + z * a3)))
            }
            ActivationKind::PiecewiseLinear => {
                let pw = Piecewise::from_coefficients(c);
                let bound = self.piecewise_bound;
                map_elementwise(input, |z| pw.value(z.clamp(-bound, bound)))
            }
            ActivationKind::SelfGated => {
                let gate = c[0];
                map_elementwise(input, |z| z * sigmoid(gate * z))
            }
            ActivationKind::FixedRectifier => map_elementwise(input, |z| z.max(0.0)),
            ActivationKind::FixedSigmoid => map_elementwise(input, sigmoid),
        };

        self.cached_output.assign(&output);
        output
    }

    /// Backward pass
    ///
    /// # Arguments
    ///
    /// * `grad_out` - Gradient of the loss with respect to this unit's output,
    ///   same shape as the most recent forward input
    ///
    /// # Returns
    ///
    /// Gradient with respect to the input. As a side effect the gradient with
    /// respect to each coefficient is added to the coefficient gradient.
    ///
    /// # Panics
    ///
    /// Panics if `grad_out` does not match the cached forward input
    pub fn backward(&mut self, grad_out: &Matrix) -> Matrix {
        assert_eq!(
            (grad_out.rows, grad_out.cols),
            (self.cached_input.rows, self.cached_input.cols),
            "Activation backward called with a batch that does not match the last forward"
        );

        let zs = &self.cached_input.data;
        let gs = &grad_out.data;
        let mut grad_in = vec![0.0; zs.len()];

        match self.kind {
            ActivationKind::LeakyVariableSlope => {
                let slope = self.coefficients[0];
                let mut d_slope = 0.0;
                for ((gi, &z), &g) in grad_in.iter_mut().zip(zs).zip(gs) {
                    if z >= 0.0 {
                        *gi = g;
                    } else {
                        *gi = g * slope;
                        d_slope += g * z;
                    }
                }
                self.coefficient_grad[0] += d_slope;
            }
            ActivationKind::CubicPolynomial => {
                let (a1, a2, a3) = (self.coefficients[1], self.coefficients[2], self.coefficients[3]);
                let mut d_a = [0.0; 4];
                for ((gi, &z), &g) in grad_in.iter_mut().zip(zs).zip(gs) {
                    let z2 = z * z;
                    *gi = g * (a1 + 2.0 * a2 * z + 3.0 * a3 * z2);
                    d_a[0] += g;
                    d_a[1] += g * z;
                    d_a[2] += g * z2;
                    d_a[3] += g * z2 * z;
                }
                for (acc, d) in self.coefficient_grad.iter_mut().zip(d_a) {
                    *acc += d;
                }
            }
            ActivationKind::PiecewiseLinear => {
                let pw = Piecewise::from_coefficients(&self.coefficients);
                let bound = self.piecewise_bound;
                let mut grad_tau = [0.0; 3];
                let mut grad_slope = [0.0; 4];

                for ((gi, &z), &g) in grad_in.iter_mut().zip(zs).zip(gs) {
                    let zc = z.clamp(-bound, bound);
                    let seg = pw.segment(zc);
                    *gi = g * pw.slopes[seg];

                    for m in 0..seg {
                        grad_tau[m] += g * (pw.slopes[m] - pw.slopes[m + 1]);
                    }
                    for (k, acc) in grad_slope.iter_mut().enumerate() {
                        let mut d = if k == seg { zc } else { 0.0 };
                        if k < seg {
                            d += pw.taus[k];
                        }
                        if k >= 1 && k - 1 < seg {
                            d -= pw.taus[k - 1];
                        }
                        *acc += g * d;
                    }
                }

                // Chain rule through τ0 = p0, τ1 = τ0 + e^p1, τ2 = τ1 + e^p2
                let e1 = self.coefficients[1].exp();
                let e2 = self.coefficients[2].exp();
                self.coefficient_grad[0] += grad_tau[0] + grad_tau[1] + grad_tau[2];
                self.coefficient_grad[1] += e1 * (grad_tau[1] + grad_tau[2]);
                self.coefficient_grad[2] += e2 * grad_tau[2];
                for (k, d) in grad_slope.iter().enumerate() {
                    self.coefficient_grad[3 + k] += d;
                }
            }
            ActivationKind::SelfGated => {
                let gate = self.coefficients[0];
                let mut d_gate = 0.0;
                for ((gi, &z), &g) in grad_in.iter_mut().zip(zs).zip(gs) {
                    let s = sigmoid(gate * z);
                    let s_prime = s * (1.0 - s);
                    *gi = g * (s + z * gate * s_prime);
                    d_gate += g * z * z * s_prime;
                }
                self.coefficient_grad[0] += d_gate;
            }
            ActivationKind::FixedRectifier => {
                for ((gi, &z), &g) in grad_in.iter_mut().zip(zs).zip(gs) {
                    *gi = if z > 0.0 { g } else { 0.0 };
                }
            }
            ActivationKind::FixedSigmoid => {
                for ((gi, &z), &g) in grad_in.iter_mut().zip(zs).zip(gs) {
                    let s = sigmoid(z);
                    *gi = g * s * (1.0 - s);
                }
            }
        }

        Matrix::new(grad_in, grad_out.rows, grad_out.cols)
    }

    /// Coefficient penalty reported alongside the loss
    ///
    /// `λ/2 · Σ c²`, plus `λ·(a2² + a3²)` for the cubic family and
    /// `λ·(slope − 1)²` for the leaky family. Fixed families contribute zero.
    pub fn regularization(&self, lambda: f64) -> f64 {
        if self.coefficients.is_empty() {
            return 0.0;
        }
        let c = &self.coefficients;
        let base = lambda / 2.0 * c.iter().map(|v| v * v).sum::<f64>();
        let extra = match self.kind {
            ActivationKind::CubicPolynomial => lambda * (c[2] * c[2] + c[3] * c[3]),
            ActivationKind::LeakyVariableSlope => lambda * (c[0] - 1.0) * (c[0] - 1.0),
            _ => 0.0,
        };
        base + extra
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn unit(kind: ActivationKind, coefficients: Vec<f64>) -> ActivationUnit {
        ActivationUnit::with_coefficients(kind, coefficients, 3, &ActivationConfig::default())
    }

    fn column(values: &[f64]) -> Matrix {
        Matrix::new(values.to_vec(), values.len(), 1)
    }

    #[test]
    fn test_parse_names() {
        assert_eq!("cubic".parse::<ActivationKind>().unwrap(), ActivationKind::CubicPolynomial);
        assert_eq!("PiecewiseLinear".parse::<ActivationKind>().unwrap(), ActivationKind::PiecewiseLinear);
        assert_eq!("GATED".parse::<ActivationKind>().unwrap(), ActivationKind::SelfGated);
        assert_eq!("random-small".parse::<InitStrategy>().unwrap(), InitStrategy::RandomSmall);
        assert_eq!("IdentityLike".parse::<InitStrategy>().unwrap(), InitStrategy::IdentityLike);
        for kind in ActivationKind::ALL {
            assert_eq!(kind.name().parse::<ActivationKind>().unwrap(), kind);
        }
        assert!(matches!("tanh".parse::<ActivationKind>(), Err(Error::Config(_))));
        assert!(matches!("zeros".parse::<InitStrategy>(), Err(Error::Config(_))));
    }

    #[test]
    fn test_saturating_families() {
        let saturating: Vec<_> = ActivationKind::ALL
            .into_iter()
            .filter(|k| k.is_saturating())
            .collect();
        assert_eq!(saturating, vec![ActivationKind::SelfGated, ActivationKind::FixedSigmoid]);
    }

    #[test]
    fn test_coefficient_counts() {
        let counts: Vec<usize> = ActivationKind::ALL.iter().map(|k| k.coefficient_count()).collect();
        assert_eq!(counts, vec![1, 4, 7, 1, 0, 0]);
        for kind in ActivationKind::ALL {
            assert_eq!(kind.default_coefficients().len(), kind.coefficient_count());
        }
    }

    #[test]
    fn test_fixed_families_have_empty_buffers() {
        let mut rng = StdRng::seed_from_u64(0);
        for kind in [ActivationKind::FixedRectifier, ActivationKind::FixedSigmoid] {
            let u = ActivationUnit::new(kind, InitStrategy::RandomSmall, 4, &ActivationConfig::default(), &mut rng);
            assert!(u.coefficients().is_empty());
            assert!(u.coefficient_grad().is_empty());
            assert_eq!(u.regularization(1.0), 0.0);
        }
    }

    #[test]
    fn test_identity_like_keeps_defaults() {
        let mut rng = StdRng::seed_from_u64(3);
        for kind in ActivationKind::ALL {
            let u = ActivationUnit::new(kind, InitStrategy::IdentityLike, 2, &ActivationConfig::default(), &mut rng);
            assert_eq!(u.coefficients(), kind.default_coefficients().as_slice());
        }
    }

    #[test]
    fn test_noise_stays_within_amplitude() {
        let mut rng = StdRng::seed_from_u64(11);
        for (strategy, amplitude) in [(InitStrategy::NoisyDefault, 0.01), (InitStrategy::RandomSmall, 0.05)] {
            for _ in 0..20 {
                let u = ActivationUnit::new(
                    ActivationKind::PiecewiseLinear,
                    strategy,
                    2,
                    &ActivationConfig::default(),
                    &mut rng,
                );
                let defaults = ActivationKind::PiecewiseLinear.default_coefficients();
                for (c, d) in u.coefficients().iter().zip(&defaults) {
                    assert!((c - d).abs() <= amplitude + 1e-12);
                }
            }
        }
    }

    #[test]
    fn test_forward_values() {
        let z = column(&[-2.0, 0.5]);

        let mut leaky = unit(ActivationKind::LeakyVariableSlope, vec![0.25]);
        assert_eq!(leaky.forward(&z).data, vec![-0.5, 0.5]);

        let mut cubic = unit(ActivationKind::CubicPolynomial, vec![1.0, 2.0, 3.0, 4.0]);
        // 1 - 4 + 12 - 32, 1 + 1 + 0.75 + 0.5
        assert_eq!(cubic.forward(&z).data, vec![-23.0, 3.25]);

        let mut relu = unit(ActivationKind::FixedRectifier, vec![]);
        assert_eq!(relu.forward(&z).data, vec![0.0, 0.5]);

        let mut gated = unit(ActivationKind::SelfGated, vec![1.0]);
        let out = gated.forward(&z);
        assert!((out.data[0] - (-2.0 * sigmoid(-2.0))).abs() < 1e-15);

        let mut sig = unit(ActivationKind::FixedSigmoid, vec![]);
        assert!((sig.forward(&column(&[0.0])).data[0] - 0.5).abs() < 1e-15);
    }

    #[test]
    fn test_forward_caches_input_and_output() {
        let mut u = unit(ActivationKind::LeakyVariableSlope, vec![0.1]);
        let z = Matrix::new(vec![-1.0, 2.0, 3.0, -4.0], 2, 2);
        let out = u.forward(&z);
        assert_eq!(u.cached_input(), &z);
        assert_eq!(u.cached_output(), &out);

        // A smaller batch replaces the cache contents
        let z_small = Matrix::new(vec![5.0, -5.0], 1, 2);
        u.forward(&z_small);
        assert_eq!(u.cached_input(), &z_small);
    }

    #[test]
    fn test_sigmoid_is_finite_for_extreme_inputs() {
        assert_eq!(sigmoid(1e6), 1.0);
        assert!(sigmoid(-1e6) >= 0.0 && sigmoid(-1e6).is_finite());
    }

    #[test]
    fn test_default_piecewise_is_identity_inside_bound() {
        let mut pw = unit(ActivationKind::PiecewiseLinear, ActivationKind::PiecewiseLinear.default_coefficients());
        let z = column(&[-4.0, -1.0, -0.3, 0.0, 0.7, 3.5]);
        assert_eq!(pw.forward(&z).data, z.data);
    }

    #[test]
    fn test_piecewise_clips_to_bound() {
        let mut pw = unit(ActivationKind::PiecewiseLinear, ActivationKind::PiecewiseLinear.default_coefficients());
        let out = pw.forward(&column(&[-9.0, 12.0]));
        assert_eq!(out.data, vec![-5.0, 5.0]);
    }

    #[test]
    fn test_piecewise_segment_offsets() {
        // τ = (-1, 0, 1), slopes (2, 0.5, -1, 3)
        let mut pw = unit(ActivationKind::PiecewiseLinear, vec![-1.0, 0.0, 0.0, 2.0, 0.5, -1.0, 3.0]);
        let out = pw.forward(&column(&[-2.0, -0.5, 0.5, 2.0]));
        // f(-1) = -2, f(0) = -1.5, f(1) = -2.5
        let expected = [-4.0, -1.75, -2.0, 0.5];
        for (o, e) in out.data.iter().zip(expected) {
            assert!((o - e).abs() < 1e-12, "{} vs {}", o, e);
        }
    }

    #[test]
    fn test_backward_input_gradients() {
        let z = column(&[-2.0, 0.5]);
        let ones = column(&[1.0, 1.0]);

        let mut leaky = unit(ActivationKind::LeakyVariableSlope, vec![0.25]);
        leaky.forward(&z);
        assert_eq!(leaky.backward(&ones).data, vec![0.25, 1.0]);
        assert_eq!(leaky.coefficient_grad(), &[-2.0]);

        let mut relu = unit(ActivationKind::FixedRectifier, vec![]);
        relu.forward(&column(&[-1.0, 0.0, 1.0]));
        assert_eq!(relu.backward(&column(&[1.0, 1.0, 1.0])).data, vec![0.0, 0.0, 1.0]);

        let mut cubic = unit(ActivationKind::CubicPolynomial, vec![0.0, 1.0, 1.0, 1.0]);
        cubic.forward(&z);
        // 1 + 2z + 3z²
        assert_eq!(cubic.backward(&ones).data, vec![9.0, 2.75]);
        assert_eq!(cubic.coefficient_grad(), &[2.0, -1.5, 4.25, -7.875]);
    }

    #[test]
    fn test_backward_accumulates() {
        let mut gated = unit(ActivationKind::SelfGated, vec![0.7]);
        let z = column(&[0.3, -1.2]);
        let g = column(&[1.0, -0.5]);

        gated.forward(&z);
        gated.backward(&g);
        let once = gated.coefficient_grad()[0];
        gated.backward(&g);
        assert!((gated.coefficient_grad()[0] - 2.0 * once).abs() < 1e-15);

        gated.zero_coefficient_grad();
        assert_eq!(gated.coefficient_grad(), &[0.0]);
    }

    #[test]
    #[should_panic(expected = "does not match the last forward")]
    fn test_backward_shape_mismatch_panics() {
        let mut u = unit(ActivationKind::FixedSigmoid, vec![]);
        u.forward(&column(&[1.0, 2.0]));
        u.backward(&column(&[1.0]));
    }

    #[test]
    fn test_regularization_terms() {
        let lambda = 0.1;
        let cubic = unit(ActivationKind::CubicPolynomial, vec![0.0, 1.0, 0.5, -0.5]);
        // 0.05 * 1.5 + 0.1 * 0.5
        assert!((cubic.regularization(lambda) - 0.125).abs() < 1e-15);

        let leaky = unit(ActivationKind::LeakyVariableSlope, vec![0.5]);
        // 0.05 * 0.25 + 0.1 * 0.25
        assert!((leaky.regularization(lambda) - 0.0375).abs() < 1e-15);

        let gated = unit(ActivationKind::SelfGated, vec![2.0]);
        assert!((gated.regularization(lambda) - 0.2).abs() < 1e-15);
    }

    #[test]
    fn test_breakpoints_only_for_piecewise() {
        let pw = unit(ActivationKind::PiecewiseLinear, vec![0.5, 1.0, -1.0, 1.0, 1.0, 1.0, 1.0]);
        let taus = pw.breakpoints().unwrap();
        assert_eq!(taus[0], 0.5);
        assert!((taus[1] - (0.5 + 1f64.exp())).abs() < 1e-15);
        assert!((taus[2] - (taus[1] + (-1f64).exp())).abs() < 1e-15);

        assert!(unit(ActivationKind::SelfGated, vec![1.0]).breakpoints().is_none());
    }
}
