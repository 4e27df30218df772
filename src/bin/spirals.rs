//! Train on two interleaved spirals
//!
//! A 2-4-1 network with a learnable cubic hidden activation and a sigmoid
//! output, trained full-batch on 200 noisy spiral points. Training stops early
//! once accuracy reaches the configured target.
//!
//! # Usage
//!
//! ```bash
//! cargo run --release --bin spirals
//! cargo run --release --bin spirals -- --activation piecewise --act-lr 0.003
//! cargo run --release --bin spirals -- --config run.json --log spirals_run.csv
//! ```

use clap::Parser;
use learnact::{
    data, train, ActivationKind, ConfigOverrides, ExperimentConfig, InitStrategy, Network,
    TrainingLogger,
};

#[derive(Parser)]
#[command(name = "spirals", about = "Train a learnable-activation network on two spirals")]
struct Args {
    /// JSON experiment configuration (takes precedence over --preset)
    #[arg(long)]
    config: Option<String>,

    /// Named preset: xor, spirals or mnist
    #[arg(long, default_value = "spirals")]
    preset: String,

    /// Points generated per spiral arm
    #[arg(long, default_value = "100")]
    points: usize,

    /// Seed for the data, weights and coefficients
    #[arg(long)]
    seed: Option<u64>,

    /// Maximum number of epochs
    #[arg(long)]
    epochs: Option<usize>,

    /// Learning rate for weights and biases
    #[arg(long)]
    lr: Option<f64>,

    /// Learning rate for activation coefficients
    #[arg(long)]
    act_lr: Option<f64>,

    /// CSV file receiving one row per epoch
    #[arg(long)]
    log: Option<String>,

    /// Activation family of the hidden layers
    #[arg(long)]
    activation: Option<ActivationKind>,

    /// Coefficient init strategy of the hidden layers
    #[arg(long)]
    strategy: Option<InitStrategy>,
}

impl Args {
    fn experiment_config(&self) -> learnact::Result<ExperimentConfig> {
        let mut config = match &self.config {
            Some(path) => ExperimentConfig::load_from_file(path)?,
            None => ExperimentConfig::preset(&self.preset)?,
        };
        ConfigOverrides {
            seed: self.seed,
            epochs: self.epochs,
            lr: self.lr,
            act_lr: self.act_lr,
            log_path: self.log.clone(),
            hidden_activation: self.activation,
            hidden_strategy: self.strategy,
        }
        .apply(&mut config)?;
        Ok(config)
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    if let Err(e) = run(&args) {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

fn run(args: &Args) -> learnact::Result<()> {
    let config = args.experiment_config()?;
    let (x, y) = data::spirals(args.points, config.seed);

    let mut network = Network::from_config(&config)?;
    let mut logger = match &config.log_path {
        Some(path) => Some(TrainingLogger::new(path, &network)?),
        None => None,
    };

    let summary = train::run(&mut network, &config, (&x, &y), (&x, &y), logger.as_mut())?;

    println!("\nLearned activation coefficients:");
    for (name, value) in network.coefficient_names().iter().zip(network.coefficients()) {
        println!("  {:>8} = {:+.5}", name, value);
    }
    println!(
        "Final accuracy: {:.4} (best {:.4}) after {} epochs{}",
        summary.final_accuracy,
        summary.best_accuracy,
        summary.epochs_run,
        if summary.reached_target { ", target reached" } else { "" }
    );
    Ok(())
}
