//! CLI entry point for the credit score preprocessing pipeline.

use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand};
use credit_processing::{
    ColumnSchema, FittedPipeline, PipelineConfig, PreprocessingPipeline, UnseenCategoryPolicy, io,
};
use dotenv::dotenv;
use polars::prelude::*;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(
    author = "Credit Inference Team",
    version,
    about = "Feature preprocessing for the credit score classifier",
    long_about = "Fits the preprocessing pipeline on a training CSV, saves the fitted state \
                  as JSON and transforms new batches into classifier features.\n\n\
                  EXAMPLES:\n  \
                  credit-processing fit -i train.csv -o pipeline.json\n  \
                  credit-processing transform -p pipeline.json -i test.csv -o features.csv --seed 42\n  \
                  credit-processing inspect -p pipeline.json"
)]
struct Args {
    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fit the pipeline on a training CSV and save the fitted state
    Fit {
        /// Training CSV
        #[arg(short, long)]
        input: PathBuf,

        /// Where to write the fitted state (JSON)
        #[arg(short, long, default_value = "pipeline.json")]
        output: PathBuf,

        /// Column schema JSON; the built-in credit schema when omitted
        #[arg(long)]
        schema: Option<PathBuf>,

        /// Fail on categories not seen during fit instead of reserving a code
        #[arg(long)]
        reject_unseen: bool,
    },

    /// Transform a CSV with a fitted state
    Transform {
        /// Fitted state written by `fit`
        #[arg(short, long)]
        pipeline: PathBuf,

        /// CSV to transform
        #[arg(short, long)]
        input: PathBuf,

        /// Feature CSV to write
        #[arg(short, long)]
        output: PathBuf,

        /// Seed for the sampling imputer
        #[arg(long)]
        seed: Option<u64>,

        /// Also write the label codes to this CSV
        #[arg(long)]
        labels: Option<PathBuf>,
    },

    /// Print the feature layout and per-column statistics of a fitted state
    Inspect {
        /// Fitted state written by `fit`
        #[arg(short, long)]
        pipeline: PathBuf,
    },
}

/// Initialize the tracing subscriber for logging.
fn init_logging(level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    dotenv().ok();
    let args = Args::parse();
    init_logging(&args.log_level);

    match args.command {
        Command::Fit {
            input,
            output,
            schema,
            reject_unseen,
        } => run_fit(input, output, schema, reject_unseen),
        Command::Transform {
            pipeline,
            input,
            output,
            seed,
            labels,
        } => run_transform(pipeline, input, output, seed, labels),
        Command::Inspect { pipeline } => run_inspect(pipeline),
    }
}

fn run_fit(
    input: PathBuf,
    output: PathBuf,
    schema: Option<PathBuf>,
    reject_unseen: bool,
) -> Result<()> {
    let schema = match schema {
        Some(path) => ColumnSchema::load(&path)
            .with_context(|| format!("Failed to load schema from {}", path.display()))?,
        None => ColumnSchema::credit_score(),
    };
    let policy = if reject_unseen {
        UnseenCategoryPolicy::Reject
    } else {
        UnseenCategoryPolicy::Reserved
    };
    let config = PipelineConfig::builder()
        .schema(schema)
        .unseen_category(policy)
        .build()?;

    info!("Loading training data from: {}", input.display());
    let df = io::read_csv_path(&input)?;

    let fitted = PreprocessingPipeline::new(config)?.fit(&df)?;
    fitted.save(&output)?;
    info!(
        "Saved fitted pipeline ({} features) to {}",
        fitted.n_features(),
        output.display()
    );
    Ok(())
}

fn run_transform(
    pipeline: PathBuf,
    input: PathBuf,
    output: PathBuf,
    seed: Option<u64>,
    labels: Option<PathBuf>,
) -> Result<()> {
    let fitted = FittedPipeline::load(&pipeline)
        .with_context(|| format!("Failed to load pipeline from {}", pipeline.display()))?;
    let df = io::read_csv_path(&input)?;

    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let batch = fitted.transform(&df, &mut rng)?;

    let mut features = batch.features.to_dataframe()?;
    io::write_csv(&mut features, &output)?;
    info!(
        "Wrote {} x {} features to {}",
        batch.features.n_rows(),
        batch.features.n_cols(),
        output.display()
    );

    if let Some(path) = labels {
        let codes = batch
            .labels
            .ok_or_else(|| anyhow!("Input has no label column; cannot write {}", path.display()))?;
        let column = fitted
            .schema()
            .label
            .as_ref()
            .map_or("label", |l| l.column.as_str());
        let mut frame = DataFrame::new(vec![Series::new(column.into(), codes).into_column()])?;
        io::write_csv(&mut frame, &path)?;
        info!("Wrote label codes to {}", path.display());
    }

    Ok(())
}

/// Print the fitted state.
///
/// Uses `println!` on purpose: this output is the command's result, not a log.
fn run_inspect(pipeline: PathBuf) -> Result<()> {
    let fitted = FittedPipeline::load(&pipeline)
        .with_context(|| format!("Failed to load pipeline from {}", pipeline.display()))?;

    println!("\n{}", "=".repeat(72));
    println!("FITTED PIPELINE  (schema v{})", fitted.schema().version);
    println!("{}\n", "=".repeat(72));

    println!("FEATURES ({})", fitted.n_features());
    println!("{}", "-".repeat(40));
    for (idx, name) in fitted.feature_names().iter().enumerate() {
        println!("  {:>3}  {}", idx, name);
    }
    println!();

    println!("NUMERIC");
    println!("{}", "-".repeat(40));
    println!(
        "  {:<26} {:>12} {:>12} {:>12} {:>12} {:>12}",
        "Column", "Lower", "Upper", "Median", "Min", "Max"
    );
    for column in fitted.numeric_columns() {
        println!(
            "  {:<26} {:>12.4} {:>12.4} {:>12.4} {:>12.4} {:>12.4}",
            column.column,
            column.bounds.lower,
            column.bounds.upper,
            column.median,
            column.scaler.min,
            column.scaler.max
        );
    }
    println!();

    if !fitted.durations().is_empty() {
        println!("DURATIONS");
        println!("{}", "-".repeat(40));
        for column in fitted.durations() {
            println!(
                "  {:<26} range=[{}, {}] median={:.4}",
                column.column, column.scaler.min, column.scaler.max, column.median
            );
        }
        println!();
    }

    println!("ORDINAL");
    println!("{}", "-".repeat(40));
    for column in fitted.ordinal_columns() {
        println!(
            "  {:<26} mode={:<12} categories={:?}",
            column.column, column.encoder.mode, column.encoder.categories
        );
    }
    println!();

    println!("FREQUENCY");
    println!("{}", "-".repeat(40));
    for column in fitted.frequency_columns() {
        let mut top: Vec<(&String, &f64)> = column.encoder.frequencies.iter().collect();
        top.sort_by(|a, b| b.1.total_cmp(a.1));
        let preview: Vec<String> = top
            .iter()
            .take(5)
            .map(|(k, f)| format!("{}={:.3}", k, f))
            .collect();
        println!(
            "  {:<26} {} categories, top: {}",
            column.column,
            column.encoder.frequencies.len(),
            preview.join(", ")
        );
    }
    println!();

    println!("REMAINDER");
    println!("{}", "-".repeat(40));
    for (name, kind) in fitted.remainder() {
        println!("  {:<26} {:?}", name, kind);
    }
    println!();

    Ok(())
}
