//! Command-line interface.

use crate::converter::{convert, ConvertOptions, InputKind, OutputKind};
use crate::logging::{init_logging, LogLevel};
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::error;

/// Memory-efficient CSV and tar archive to Parquet/CSV converter.
#[derive(Parser, Debug, Clone)]
#[command(name = "tabconv", version, about, long_about = None)]
pub struct Cli {
    /// Input file path (CSV or tar archive).
    #[arg(long)]
    pub input: PathBuf,

    /// Output file or directory path.
    #[arg(long)]
    pub output: PathBuf,

    /// Input type; detected from the extension when omitted.
    #[arg(long, value_enum)]
    pub input_type: Option<InputKind>,

    /// Output type.
    #[arg(long, value_enum, default_value_t = OutputKind::Columnar)]
    pub output_type: OutputKind,

    /// Read buffer size in MB (must be > 0).
    #[arg(long, default_value_t = 1.0, value_parser = positive_f64)]
    pub block_size_mb: f64,

    /// Max rows per Parquet row group (must be > 0).
    #[arg(long, value_parser = positive_usize)]
    pub row_group_size: Option<usize>,

    /// Rows sampled for schema inference (must be > 0).
    #[arg(long, default_value_t = 1000, value_parser = positive_usize)]
    pub schema_sample_rows: usize,

    /// Gzip-compress extracted CSV output.
    #[arg(long)]
    pub gzip: bool,

    /// Logging level.
    #[arg(long, value_enum, ignore_case = true, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,
}

impl Cli {
    /// Conversion settings described by these arguments.
    #[must_use]
    pub fn options(&self) -> ConvertOptions {
        ConvertOptions {
            input_kind: Some(
                self.input_type
                    .unwrap_or_else(|| InputKind::detect(&self.input)),
            ),
            output_kind: self.output_type,
            block_size_mb: self.block_size_mb,
            row_group_size: self.row_group_size,
            schema_sample_rows: self.schema_sample_rows,
            gzip: self.gzip,
        }
    }
}

fn positive_f64(s: &str) -> Result<f64, String> {
    let v: f64 = s
        .parse()
        .map_err(|_| format!("invalid float value: '{s}'"))?;
    if v.is_finite() && v > 0.0 {
        Ok(v)
    } else {
        Err(format!("value must be > 0, got {v}"))
    }
}

fn positive_usize(s: &str) -> Result<usize, String> {
    let v: i64 = s
        .parse()
        .map_err(|_| format!("invalid int value: '{s}'"))?;
    usize::try_from(v)
        .ok()
        .filter(|v| *v > 0)
        .ok_or_else(|| format!("value must be > 0, got {v}"))
}

/// Run the converter and map the outcome to a process exit code.
///
/// The summary report is printed to stdout on success.
pub fn run(cli: &Cli) -> ExitCode {
    init_logging(cli.log_level);
    match convert(&cli.input, &cli.output, &cli.options()) {
        Ok(summary) => {
            println!("{summary}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Conversion failed: {e:#}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positive_parsers() {
        assert_eq!(positive_f64("0.5"), Ok(0.5));
        assert!(positive_f64("0").is_err());
        assert!(positive_f64("-1").is_err());
        assert!(positive_f64("abc").is_err());
        assert_eq!(positive_usize("10"), Ok(10));
        assert!(positive_usize("0").is_err());
        assert!(positive_usize("-3").is_err());
        assert!(positive_usize("1.5").is_err());
    }
}
