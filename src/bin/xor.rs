//! Train a small network on XOR
//!
//! A 2-4-1 network with sigmoid activations and mean squared error, trained on
//! the four XOR points. Loss, accuracy and activation coefficients are logged
//! to `xor_42.csv` unless `--log` names another file.
//!
//! # Usage
//!
//! ```bash
//! cargo run --release --bin xor
//! cargo run --release --bin xor -- --activation cubic --strategy noisy --epochs 500
//! cargo run --release --bin xor -- --config run.json --seed 7
//! ```

use clap::Parser;
use learnact::{
    data, train, ActivationKind, ConfigOverrides, ExperimentConfig, InitStrategy, Network,
    TrainingLogger,
};

#[derive(Parser)]
#[command(name = "xor", about = "Train a learnable-activation network on XOR")]
struct Args {
    /// JSON experiment configuration (takes precedence over --preset)
    #[arg(long)]
    config: Option<String>,

    /// Named preset: xor, spirals or mnist
    #[arg(long, default_value = "xor")]
    preset: String,

    /// Seed for weight and coefficient initialization
    #[arg(long)]
    seed: Option<u64>,

    /// Number of epochs
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
    let (x, y) = data::xor();

    let mut network = Network::from_config(&config)?;
    let mut logger = match &config.log_path {
        Some(path) => Some(TrainingLogger::new(path, &network)?),
        None => None,
    };

    let summary = train::run(&mut network, &config, (&x, &y), (&x, &y), logger.as_mut())?;

    println!("\nPredictions:");
    let out = network.forward(&x);
    for i in 0..x.rows {
        println!(
            "  {:?} -> {:.4} (target {})",
            x.row(i),
            out.data[i * out.cols],
            y.data[i]
        );
    }
    println!(
        "Final accuracy: {:.4} after {} epochs",
        summary.final_accuracy, summary.epochs_run
    );
    Ok(())
}
