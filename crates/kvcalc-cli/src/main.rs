//! kv-cache-calc - estimate KV-cache memory for the model catalog
//!
//! Examples:
//!   kv-cache-calc 2048                          # every model, float16, batch 1
//!   kv-cache-calc 8192 --batch-size 4 --precision 4
//!   kv-cache-calc 4096 --model Mixtral --variant 8x7B
//!   kv-cache-calc --list --config my-models.yaml

use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::process::ExitCode;

mod error;
mod report;

use error::{CliError, Result};
use kvcalc_core::{default_config_path, load_registry, CacheParams, Precision};
use report::Selection;

/// KV Cache Size Estimator
///
/// Prints the estimated key/value cache size, in gigabytes, of every
/// registered model variant for the given sequence length.
#[derive(Parser)]
#[command(
    name = "kv-cache-calc",
    about = "KV Cache Size Estimator",
    version = env!("CARGO_PKG_VERSION"),
    arg_required_else_help = true
)]
pub struct Cli {
    /// Input sequence length
    #[arg(required_unless_present = "list")]
    pub sequence_length: Option<u64>,

    /// Batch size
    #[arg(long = "batch-size", visible_alias = "batch_size", default_value_t = 1)]
    pub batch_size: u64,

    /// Precision size: 2 for float16, 4 for float32
    #[arg(long, default_value = "2", value_parser = parse_precision)]
    pub precision: Precision,

    /// Extra catalog file merged over the built-in one (repeatable)
    #[arg(long, value_name = "PATH")]
    pub config: Vec<PathBuf>,

    /// Only estimate this model
    #[arg(short, long)]
    pub model: Option<String>,

    /// Only estimate this variant of --model
    #[arg(long, requires = "model")]
    pub variant: Option<String>,

    /// Print the model catalog instead of estimates
    #[arg(long)]
    pub list: bool,

    /// Output format
    #[arg(long = "output-format", value_enum, default_value = "table")]
    pub output_format: OutputFormat,

    /// Enable verbose output
    #[arg(long)]
    pub verbose: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output
    Table,
    /// JSON output
    Json,
}

fn parse_precision(raw: &str) -> std::result::Result<Precision, String> {
    let bytes: u32 = raw
        .parse()
        .map_err(|_| format!("expected 2 or 4, got '{raw}'"))?;
    Precision::from_bytes(bytes).map_err(|e| e.to_string())
}

fn init_tracing() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "kvcalc_core=debug,kv_cache_calc=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let mut sources: Vec<PathBuf> = default_config_path().into_iter().collect();
    sources.extend(cli.config.iter().cloned());
    let registry = load_registry(&sources)?;
    tracing::debug!("Catalog holds {} model(s)", registry.len());

    let mut stdout = std::io::stdout().lock();

    if cli.list {
        return report::write_catalog(&mut stdout, &registry, cli.output_format);
    }

    let sequence_length = cli
        .sequence_length
        .ok_or(CliError::MissingSequenceLength)?;
    let params = CacheParams::default()
        .with_sequence_length(sequence_length)
        .with_batch_size(cli.batch_size)
        .with_precision(cli.precision);

    let selection = Selection {
        model: cli.model.as_deref(),
        variant: cli.variant.as_deref(),
    };
    let report = report::build_report(&registry, &params, selection)?;
    report::write_report(&mut stdout, &report, cli.output_format)
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.verbose {
        init_tracing();
    }

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["kv-cache-calc", "2048"]).unwrap();
        assert_eq!(cli.sequence_length, Some(2048));
        assert_eq!(cli.batch_size, 1);
        assert_eq!(cli.precision, Precision::Float16);
        assert_eq!(cli.output_format, OutputFormat::Table);
        assert!(cli.config.is_empty());
    }

    #[test]
    fn test_flags() {
        let cli = Cli::try_parse_from([
            "kv-cache-calc",
            "4096",
            "--batch-size",
            "8",
            "--precision",
            "4",
            "--config",
            "a.yaml",
            "--config",
            "b.yaml",
        ])
        .unwrap();
        assert_eq!(cli.batch_size, 8);
        assert_eq!(cli.precision, Precision::Float32);
        assert_eq!(cli.config.len(), 2);
    }

    #[test]
    fn test_precision_code_is_restricted() {
        assert!(Cli::try_parse_from(["kv-cache-calc", "2048", "--precision", "8"]).is_err());
        assert!(Cli::try_parse_from(["kv-cache-calc", "2048", "--precision", "x"]).is_err());
    }

    #[test]
    fn test_sequence_length_required_unless_listing() {
        assert!(Cli::try_parse_from(["kv-cache-calc", "--batch-size", "2"]).is_err());
        let cli = Cli::try_parse_from(["kv-cache-calc", "--list"]).unwrap();
        assert!(cli.list);
        assert!(cli.sequence_length.is_none());
    }

    #[test]
    fn test_variant_requires_model() {
        assert!(Cli::try_parse_from(["kv-cache-calc", "2048", "--variant", "7B"]).is_err());
        assert!(
            Cli::try_parse_from(["kv-cache-calc", "2048", "--model", "LLaMA", "--variant", "7B"])
                .is_ok()
        );
    }

    #[test]
    fn test_zero_batch_surfaces_invalid_parameter() {
        let cli = Cli::try_parse_from(["kv-cache-calc", "2048", "--batch-size", "0"]).unwrap();
        let err = run(cli).unwrap_err();
        assert!(matches!(
            err,
            CliError::Core(kvcalc_core::Error::InvalidParameter(_))
        ));
    }
}
