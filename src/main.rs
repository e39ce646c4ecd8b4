// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

use anyhow::Context;
use clap::Parser;
use partition_updater::config::{
    ParserLimits, UpdaterConfig, WorkingPrecision, DEFAULT_MAX_DIMENSION_DIGITS,
    DEFAULT_MAX_PARTITION_PARTS, DEFAULT_OUTPUT_SCALE, DEFAULT_PRECISION_DIGITS,
};
use partition_updater::UpdatePipeline;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::error;
use tracing_subscriber::EnvFilter;

/// Fold a heuristic search log into the store of largest known S_n dimensions.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Text log with "--- Size n ---" blocks
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Store to update; created if missing
    #[arg(value_name = "STORE")]
    store: PathBuf,

    /// Working precision of c(lambda), in significant decimal digits
    #[arg(long, value_name = "DIGITS", default_value_t = DEFAULT_PRECISION_DIGITS)]
    precision: usize,

    /// Fractional digits written for c(lambda) (at least 16)
    #[arg(long, value_name = "DIGITS", default_value_t = DEFAULT_OUTPUT_SCALE)]
    scale: u32,

    /// Longest accepted dimension, in decimal digits
    #[arg(long, value_name = "DIGITS", default_value_t = DEFAULT_MAX_DIMENSION_DIGITS)]
    max_dimension_digits: usize,

    /// Longest accepted partition, in parts
    #[arg(long, value_name = "PARTS", default_value_t = DEFAULT_MAX_PARTITION_PARTS)]
    max_partition_parts: usize,

    /// Accept partitions whose parts do not sum to n
    #[arg(long)]
    allow_partition_sum_mismatch: bool,

    /// Read STORE in the legacy layout (one-time conversion)
    #[arg(long)]
    import_legacy: bool,

    /// Log every per-record decision
    #[arg(short, long, conflicts_with = "quiet")]
    verbose: bool,

    /// Log warnings and errors only
    #[arg(short, long)]
    quiet: bool,
}

impl Cli {
    fn config(&self) -> UpdaterConfig {
        UpdaterConfig {
            precision: WorkingPrecision::digits(self.precision),
            output_scale: self.scale,
            limits: ParserLimits {
                max_dimension_digits: self.max_dimension_digits,
                max_partition_parts: self.max_partition_parts,
                require_partition_sum: !self.allow_partition_sum_mismatch,
            },
            import_legacy: self.import_legacy,
        }
    }

    fn default_level(&self) -> &'static str {
        if self.verbose {
            "debug"
        } else if self.quiet {
            "warn"
        } else {
            "info"
        }
    }
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let pipeline = UpdatePipeline::new(cli.config());
    pipeline.run(&cli.input, &cli.store).with_context(|| {
        format!(
            "updating '{}' from '{}'",
            cli.store.display(),
            cli.input.display()
        )
    })?;
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cli.default_level())),
        )
        .init();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{:#}", err);
            ExitCode::FAILURE
        }
    }
}
