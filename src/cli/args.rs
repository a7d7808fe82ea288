//! Command-line argument definitions using clap

use clap::Parser;
use std::path::PathBuf;
use tracing::Level;

/// Mortis - Build a single-page mortality report from spreadsheet inputs
#[derive(Parser, Debug)]
#[command(name = "mortis")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Directory holding the input files.
    /// Overrides `[data] directory` from the config file (default: data).
    #[arg(short, long)]
    pub data_dir: Option<PathBuf>,

    /// Configuration file (TOML). Defaults to ./mortis.toml when present.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Reporting year shown in titles
    #[arg(long, value_parser = validate_year)]
    pub year: Option<i32>,

    /// Host the report server binds to (default: 127.0.0.1)
    #[arg(long)]
    pub host: Option<String>,

    /// Port the report server listens on (default: 8050)
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Also write the rendered HTML page to this file
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Write every summary table as CSV, plus summaries.json and run.json, into this directory
    #[arg(long)]
    pub export_dir: Option<PathBuf>,

    /// Build the report and exit without starting the server
    #[arg(long, default_value = "false")]
    pub no_serve: bool,

    /// Enable debug logging
    #[arg(short, long, default_value = "false")]
    pub verbose: bool,
}

impl Cli {
    /// Log level selected by the verbosity flag
    pub fn log_level(&self) -> Level {
        if self.verbose {
            Level::DEBUG
        } else {
            Level::INFO
        }
    }

    /// True when the run produces no output at all
    pub fn has_no_output(&self) -> bool {
        self.no_serve && self.output.is_none() && self.export_dir.is_none()
    }
}

/// Validator for the year parameter
fn validate_year(s: &str) -> Result<i32, String> {
    let value: i32 = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid year", s))?;

    if !(1900..=2100).contains(&value) {
        Err(format!("year must be between 1900 and 2100, got {}", value))
    } else {
        Ok(value)
    }
}
