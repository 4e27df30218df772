//! Train a digit classifier from binary dataset files
//!
//! Expects train and test splits in the binary format read by
//! `learnact::data::load_binary` (784 inputs, one label column). Uses the
//! 784-256-128-10 cubic preset unless a JSON configuration is given.
//!
//! # Usage
//!
//! ```bash
//! cargo run --release --bin mnist -- mnist_train.bin mnist_test.bin
//! cargo run --release --bin mnist -- mnist_train.bin mnist_test.bin --epochs 2 --act-lr 0.001
//! ```

use clap::Parser;
use learnact::{
    data, train, ActivationKind, ConfigOverrides, ExperimentConfig, InitStrategy, Network,
    TrainingLogger,
};

#[derive(Parser)]
#[command(name = "mnist", about = "Train a learnable-activation digit classifier")]
struct Args {
    /// Training split in the binary dataset format
    train: String,

    /// Test split used for per-epoch accuracy
    test: String,

    /// JSON experiment configuration (takes precedence over --preset)
    #[arg(long)]
    config: Option<String>,

    /// Named preset: xor, spirals or mnist
    #[arg(long, default_value = "mnist")]
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

    println!("Loading data...");
    let (train_x, train_y) = data::load_binary(&args.train)?;
    let (test_x, test_y) = data::load_binary(&args.test)?;
    println!(
        "Loaded {} training and {} test samples ({} features)",
        train_x.rows, test_x.rows, train_x.cols
    );

    let mut network = Network::from_config(&config)?;
    let mut logger = match &config.log_path {
        Some(path) => Some(TrainingLogger::new(path, &network)?),
        None => None,
    };

    let summary = train::run(
        &mut network,
        &config,
        (&train_x, &train_y),
        (&test_x, &test_y),
        logger.as_mut(),
    )?;

    println!(
        "Test accuracy: {:.4} after {} epochs",
        summary.final_accuracy, summary.epochs_run
    );
    Ok(())
}
