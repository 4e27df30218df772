//! Verify activation coefficient gradients numerically
//!
//! For each parametric activation family, runs a forward/backward pass on a
//! random batch with the loss `L = Σ out²` and compares every analytic
//! coefficient gradient with a centered finite difference.
//!
//! # Usage
//!
//! ```bash
//! cargo run --release --bin act_grad_check
//! cargo run --release --bin act_grad_check -- --seed 7 --batch 16
//! ```
//!
//! Exits with status 1 if any coefficient fails the check.

use clap::Parser;
use learnact::gradcheck::{self, DEFAULT_STEP, DEFAULT_TOLERANCE, MIN_ANALYTIC};
use learnact::{ActivationConfig, ActivationKind, ActivationUnit, InitStrategy, Matrix};
use rand::rngs::StdRng;
use rand::SeedableRng;

#[derive(Parser)]
#[command(name = "act_grad_check", about = "Check activation coefficient gradients numerically")]
struct Args {
    /// Seed for coefficients and inputs
    #[arg(long, default_value = "123")]
    seed: u64,

    /// Features per unit
    #[arg(long, default_value = "8")]
    width: usize,

    /// Rows in the random batch
    #[arg(long, default_value = "4")]
    batch: usize,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let mut rng = StdRng::seed_from_u64(args.seed);
    let config = ActivationConfig::default();
    let mut all_ok = true;

    for kind in ActivationKind::ALL {
        if kind.coefficient_count() == 0 {
            println!("{:?} has no coefficients; skipping.", kind);
            continue;
        }

        let unit = ActivationUnit::new(kind, InitStrategy::RandomSmall, args.width, &config, &mut rng);
        let inputs = Matrix::random_uniform(args.batch, args.width, -1.0, 1.0, &mut rng);
        let names = kind.coefficient_names();

        for entry in gradcheck::check_coefficient_gradients(&unit, &inputs, DEFAULT_STEP) {
            let diff = (entry.analytic - entry.numeric).abs();
            let status = if entry.analytic.abs() <= MIN_ANALYTIC {
                "skipped"
            } else if entry.passes(DEFAULT_TOLERANCE) {
                "ok"
            } else {
                all_ok = false;
                "FAILED"
            };
            println!(
                "{:?} {:>5}: analytic={:.6e} numeric={:.6e} diff={:.6e} [{}]",
                kind, names[entry.index], entry.analytic, entry.numeric, diff, status
            );
        }
    }

    if all_ok {
        println!("All activation coefficient gradients match (within tolerance)");
    } else {
        println!("Some activation coefficient gradients differ from the numeric check");
        std::process::exit(1);
    }
}
