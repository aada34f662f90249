//! CLI entry point for the livability rater.
//!
//! Reads a table of raw per-location measurements, scores every row, and
//! writes the scored table as CSV and JSON.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{Parser, Subcommand};
use livability_rater::columns::{COLUMNS, COMPOSITE_COLUMN};
use livability_rater::config::{ConfigFile, ScoringConfig};
use livability_rater::output::write_outputs;
use livability_rater::pipeline::{ScoreOptions, score_table};
use livability_rater::scoring::WeightSet;
use livability_rater::summary::RunSummary;
use livability_rater::table::read_table;
use tracing::info;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "livability_rater")]
#[command(about = "Compute composite livability scores for location listings", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Score a CSV of listings and write CSV and JSON results
    Score {
        /// Input CSV with one row per location
        #[arg(short, long, default_value = "seed_listings.csv")]
        input: PathBuf,

        /// Where to write the scored CSV
        #[arg(long, default_value = "seed_listings_scored.csv")]
        output_csv: PathBuf,

        /// Where to write the scored JSON
        #[arg(long, default_value = "seed_listings_scored.json")]
        output_json: PathBuf,

        /// Optional: write a JSON run summary (ranges, weights, composite spread)
        #[arg(long)]
        summary: Option<PathBuf>,

        /// Optional: JSON file with "ranges" and "weights" overrides
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Fixed range for a raw column, e.g. aod:0.02:0.6 (repeatable)
        #[arg(long = "range", value_name = "FIELD:MIN:MAX")]
        ranges: Vec<String>,

        /// Weight for a sub-score, e.g. green_score=0.3 (repeatable)
        #[arg(long = "weight", value_name = "NAME=VALUE")]
        weights: Vec<String>,

        /// Reuse sub-scores already present in the input instead of recomputing them
        #[arg(long, default_value_t = false)]
        keep_existing_scores: bool,

        /// Column holding the location identifier
        #[arg(long, default_value = "id")]
        id_column: String,

        /// Column holding the display label
        #[arg(long, default_value = "label")]
        label_column: String,

        /// Gzip compress every output file (".gz" is appended)
        #[arg(long, default_value_t = false)]
        gzip: bool,
    },
    /// List the recognized raw columns and the default weights
    Columns,
}

/// Reads directives from `var`, falling back to `default` when it is unset.
fn log_filter(var: &str, default: LevelFilter) -> EnvFilter {
    EnvFilter::builder()
        .with_default_directive(default.into())
        .with_env_var(var)
        .from_env_lossy()
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path = std::env::var("LOG_FILE_PATH")
        .unwrap_or_else(|_| "logs/livability_rater.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("livability_rater.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(log_filter("RUST_LOG", LevelFilter::INFO));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(log_filter("RUST_LOG_JSON", LevelFilter::DEBUG));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Score {
            input,
            output_csv,
            output_json,
            summary,
            config,
            ranges,
            weights,
            keep_existing_scores,
            id_column,
            label_column,
            gzip,
        } => {
            // Configuration is validated before the input is touched.
            let file = config.as_deref().map(ConfigFile::load).transpose()?;
            let config = ScoringConfig::resolve(file.as_ref(), &ranges, &weights)?;

            let options = ScoreOptions {
                config,
                keep_existing_scores,
                id_column,
                label_column,
            };

            let table = read_table(&input)?;
            let scored = score_table(&table, &options);
            write_outputs(&scored, &output_csv, &output_json, gzip)?;

            if let Some(path) = summary {
                let run = RunSummary::from_scored(&input.display().to_string(), &scored);
                run.write(&path, gzip)?;
                info!(
                    path = %path.display(),
                    composite_mean = run.composite.mean,
                    "Run summary written"
                );
            }
        }
        Commands::Columns => {
            let weights = WeightSet::default();
            for spec in &COLUMNS {
                info!(
                    raw_column = spec.raw_column,
                    score_column = spec.score_column,
                    label = spec.label,
                    higher_is_better = spec.higher_is_better,
                    aliases = ?spec.aliases,
                    default_weight = weights.get(spec.field),
                    "Column"
                );
            }
            info!(composite_column = COMPOSITE_COLUMN, "Composite");
        }
    }

    Ok(())
}
