//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use clap::Parser;
use std::path::PathBuf;

/// Boipeba - sea and weather conditions for Ilha de Boipeba
///
/// Shows current temperature, wind, wave height, sunrise/sunset and the
/// moon phase, plus links to tide tables.
///
/// Examples:
///   boipeba
///   boipeba --format json
///   boipeba --watch 600
///   boipeba --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Path to configuration file
    ///
    /// If not specified, looks for .boipeba.toml in the current directory
    #[arg(short, long, value_name = "FILE", env = "BOIPEBA_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output format (text, json)
    #[arg(short, long, default_value = "text", value_name = "FORMAT")]
    pub format: OutputFormat,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Request timeout in seconds for each forecast source
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// IANA timezone for forecast times (e.g. America/Bahia)
    #[arg(long, value_name = "TZ")]
    pub timezone: Option<String>,

    /// Refresh every SECS seconds until interrupted
    #[arg(short, long, value_name = "SECS")]
    pub watch: Option<u64>,

    /// Do not print tide-table links
    #[arg(long)]
    pub no_links: bool,

    /// Generate a default .boipeba.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Output format for the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Plain text (default)
    #[default]
    Text,
    /// JSON format
    Json,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        if self.init_config {
            return Ok(());
        }

        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if let Some(timeout) = self.timeout {
            if timeout == 0 {
                return Err("Timeout must be at least 1 second".to_string());
            }
        }

        if let Some(interval) = self.watch {
            if interval == 0 {
                return Err("Watch interval must be at least 1 second".to_string());
            }
        }

        if let Some(ref tz) = self.timezone {
            if tz.trim().is_empty() {
                return Err("Timezone must not be empty".to_string());
            }
            crate::config::parse_zone(tz).map_err(|e| e.to_string())?;
        }

        if let Some(ref config_path) = self.config {
            if !config_path.is_file() {
                return Err(format!(
                    "Config file does not exist: {}",
                    config_path.display()
                ));
            }
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }

    /// Whether to animate a spinner while fetching.
    pub fn show_spinner(&self) -> bool {
        !self.quiet && self.format == OutputFormat::Text
    }
}
