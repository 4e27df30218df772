//! Sweep hidden activation families and init strategies
//!
//! Trains one network per dataset × activation × strategy combination, using
//! each dataset's preset for everything else, and writes the final loss and
//! accuracy of every run to a single CSV table.
//!
//! # Usage
//!
//! ```bash
//! cargo run --release --bin ablation
//! cargo run --release --bin ablation -- --datasets spirals --activation cubic,piecewise --epochs 50
//! cargo run --release --bin ablation -- --datasets xor,mnist \
//!     --mnist-train mnist_train.bin --mnist-test mnist_test.bin
//! ```

use clap::Parser;
use learnact::ablation::{self, AblationRow};
use learnact::{
    data, ActivationKind, ConfigOverrides, Error, ExperimentConfig, InitStrategy, Matrix,
};

#[derive(Parser)]
#[command(name = "ablation", about = "Compare activation families and init strategies")]
struct Args {
    /// CSV file receiving one row per run
    #[arg(long, default_value = "ablations.csv")]
    output: String,

    /// Datasets to sweep: xor, spirals, mnist
    #[arg(long, value_delimiter = ',', default_value = "xor,spirals")]
    datasets: Vec<String>,

    /// Hidden activation families (default: all)
    #[arg(long, value_delimiter = ',')]
    activation: Vec<ActivationKind>,

    /// Hidden init strategies (default: all)
    #[arg(long, value_delimiter = ',')]
    strategy: Vec<InitStrategy>,

    /// Override every preset's epoch count
    #[arg(long)]
    epochs: Option<usize>,

    /// Override every preset's seed
    #[arg(long)]
    seed: Option<u64>,

    /// Training split for the mnist dataset
    #[arg(long)]
    mnist_train: Option<String>,

    /// Test split for the mnist dataset
    #[arg(long)]
    mnist_test: Option<String>,
}

/// Preset configuration plus train and eval splits for one dataset
fn load_dataset(
    name: &str,
    args: &Args,
) -> learnact::Result<(ExperimentConfig, (Matrix, Matrix), (Matrix, Matrix))> {
    let mut config = ExperimentConfig::preset(name)?;
    ConfigOverrides {
        seed: args.seed,
        epochs: args.epochs,
        ..ConfigOverrides::default()
    }
    .apply(&mut config)?;

    match name {
        "xor" => {
            let split = data::xor();
            Ok((config, split.clone(), split))
        }
        "spirals" => {
            let split = data::spirals(100, config.seed);
            Ok((config, split.clone(), split))
        }
        _ => match (&args.mnist_train, &args.mnist_test) {
            (Some(train), Some(test)) => {
                let train = data::load_binary(train)?;
                let test = data::load_binary(test)?;
                Ok((config, train, test))
            }
            _ => Err(Error::Config(
                "the mnist dataset needs --mnist-train and --mnist-test".into(),
            )),
        },
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
    let kinds = if args.activation.is_empty() {
        ActivationKind::ALL.to_vec()
    } else {
        args.activation.clone()
    };
    let strategies = if args.strategy.is_empty() {
        InitStrategy::ALL.to_vec()
    } else {
        args.strategy.clone()
    };

    let mut rows: Vec<AblationRow> = Vec::new();
    for name in &args.datasets {
        let (config, (train_x, train_y), (eval_x, eval_y)) = load_dataset(name, args)?;
        println!(
            "\n{}: {} activations × {} strategies, {} epochs each",
            name,
            kinds.len(),
            strategies.len(),
            config.epochs
        );

        let dataset_rows = ablation::run_grid(
            name,
            &config,
            (&train_x, &train_y),
            (&eval_x, &eval_y),
            &kinds,
            &strategies,
        )?;
        for row in &dataset_rows {
            println!(
                "  {:>9} / {:<12} loss={:.4} acc={:.4}",
                row.activation.name(),
                row.strategy.name(),
                row.final_loss,
                row.final_accuracy
            );
        }
        rows.extend(dataset_rows);

        // Rewrite after every dataset so a long sweep leaves partial results
        ablation::write_csv(&args.output, &rows)?;
    }

    println!("\nWrote {} runs to {}", rows.len(), args.output);
    Ok(())
}
