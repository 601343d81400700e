//! learntree CLI: train and evaluate digit decision trees.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use learntree::{CsvOptions, PoolPreset, TreeConfig, TreeModel, TreeView, Verbosity, read_csv};

#[derive(Parser)]
#[command(name = "learntree")]
#[command(about = "Greedy entropy-guided decision trees for labeled images")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Train a tree and save it
    Train {
        /// Labeled examples (`label,pixel0,pixel1,...`)
        #[arg(default_value = "mnist_train.csv")]
        data: PathBuf,

        /// Output model file (`.json` for JSON, anything else binary)
        #[arg(default_value = "output_tree.tree")]
        output: PathBuf,

        /// Percentage of examples held out to pick the tree size
        #[arg(short = 'p', long, default_value_t = 15)]
        validation_percent: u8,

        /// Highest exploration level (the tree takes up to 2^L steps)
        #[arg(short = 'l', long, default_value_t = 10)]
        max_level: u32,

        /// Predicate pool preset (basic, standard, extended)
        #[arg(long, default_value_t = PoolPreset::Standard)]
        pool: PoolPreset,

        /// Seed for the training/validation shuffle
        #[arg(long, default_value_t = 42)]
        seed: u64,

        /// Log every growth step
        #[arg(long)]
        debug: bool,

        /// The data file has no header line
        #[arg(long)]
        no_header: bool,

        /// Also write the tree as Graphviz DOT
        #[arg(long)]
        dot: Option<PathBuf>,
    },

    /// Report a saved model's accuracy on labeled examples
    Eval {
        /// Model file
        model: PathBuf,

        /// Labeled examples
        data: PathBuf,

        /// The data file has no header line
        #[arg(long)]
        no_header: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_filter = match &cli.command {
        Commands::Train { debug: true, .. } => "debug",
        _ => "info",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter)).init();

    let result = match cli.command {
        Commands::Train {
            data,
            output,
            validation_percent,
            max_level,
            pool,
            seed,
            debug,
            no_header,
            dot,
        } => {
            let verbosity = if debug { Verbosity::Debug } else { Verbosity::Info };
            TreeConfig::builder()
                .max_level(max_level)
                .validation_percent(validation_percent)
                .seed(seed)
                .pool(pool)
                .verbosity(verbosity)
                .build()
                .map_err(|e| -> Box<dyn std::error::Error> { Box::new(e) })
                .and_then(|config| {
                    cmd_train(&config, &data, &output, csv_options(no_header), dot.as_deref())
                })
        }
        Commands::Eval {
            model,
            data,
            no_header,
        } => cmd_eval(&model, &data, csv_options(no_header)),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn csv_options(no_header: bool) -> CsvOptions {
    if no_header {
        CsvOptions::headerless()
    } else {
        CsvOptions::default()
    }
}

type CliResult = Result<(), Box<dyn std::error::Error>>;

fn cmd_train(
    config: &TreeConfig,
    data: &Path,
    output: &Path,
    options: CsvOptions,
    dot: Option<&Path>,
) -> CliResult {
    let examples = read_csv(data, options)?;
    log::info!(
        "loaded {} examples with {} features from {}",
        examples.n_examples(),
        examples.n_features(),
        data.display()
    );

    let (model, report) = TreeModel::fit(config, examples)?;

    // The trained tree is still reported when it cannot be written.
    match model.save(output) {
        Ok(()) => log::info!("saved model to {}", output.display()),
        Err(e) => log::error!("failed to save model to {}: {e}", output.display()),
    }
    if let Some(path) = dot {
        match std::fs::write(path, model.to_dot()) {
            Ok(()) => log::info!("wrote DOT graph to {}", path.display()),
            Err(e) => log::error!("failed to write DOT graph to {}: {e}", path.display()),
        }
    }

    println!("{report}");
    Ok(())
}

fn cmd_eval(model: &Path, data: &Path, options: CsvOptions) -> CliResult {
    let model = TreeModel::load(model)?;
    let examples = read_csv(data, options)?;
    model.check_features(&examples)?;

    let accuracy = model.accuracy(&examples);
    println!(
        "accuracy {:.4} on {} examples ({} internal nodes)",
        accuracy,
        examples.n_examples(),
        model.tree().n_internal()
    );
    Ok(())
}
