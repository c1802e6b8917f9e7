//! Shared CLI functionality for all gpuplan commands
//!
//! This module provides the option groups that every subcommand flattens
//! into its own options so logging and output behave the same everywhere.

use crate::error::{GpuplanError, Result};
use clap::{Args, ValueEnum};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// Common logging options shared across all commands
#[derive(Args, Debug, Clone)]
pub struct LoggingOptions {
    /// Logging level (error, warn, info, debug, trace)
    #[arg(long, default_value = "warn", env = "GPUPLAN_LOG_LEVEL")]
    pub log_level: String,
}

/// Report rendering format
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Org-mode style tables for terminals
    #[default]
    Table,
    /// Pretty-printed JSON for scripts
    Json,
}

/// Common output options shared across all commands
#[derive(Args, Debug, Clone)]
pub struct OutputOptions {
    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Table, env = "GPUPLAN_FORMAT")]
    pub format: OutputFormat,
}

impl LoggingOptions {
    /// Initialize logging with the configured level
    ///
    /// Logs go to stderr so that reports on stdout stay machine readable.
    pub fn init_logging(&self) -> Result<()> {
        let level = self.parse_log_level();

        let subscriber = FmtSubscriber::builder()
            .with_max_level(level)
            .with_target(false)
            .with_writer(std::io::stderr)
            .finish();

        tracing::subscriber::set_global_default(subscriber).map_err(|e| {
            GpuplanError::configuration("Failed to set logging subscriber", Some(Box::new(e)))
        })
    }

    /// Parse the log level string into a tracing Level
    pub fn parse_log_level(&self) -> Level {
        match self.log_level.to_lowercase().as_str() {
            "error" => Level::ERROR,
            "warn" => Level::WARN,
            "info" => Level::INFO,
            "debug" => Level::DEBUG,
            "trace" => Level::TRACE,
            _ => Level::WARN,
        }
    }
}

/// Utility function to parse comma-separated strings
pub fn parse_string_list(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_log_level() {
        let opts = LoggingOptions {
            log_level: "debug".to_string(),
        };
        assert_eq!(opts.parse_log_level(), Level::DEBUG);

        let opts = LoggingOptions {
            log_level: "ERROR".to_string(),
        };
        assert_eq!(opts.parse_log_level(), Level::ERROR);

        let opts = LoggingOptions {
            log_level: "invalid".to_string(),
        };
        assert_eq!(opts.parse_log_level(), Level::WARN);
    }

    #[test]
    fn test_parse_string_list() {
        let list = parse_string_list("H100 PCIe, H100 SXM");
        assert_eq!(list, vec!["H100 PCIe", "H100 SXM"]);

        let list = parse_string_list("a,,b");
        assert_eq!(list, vec!["a", "b"]);
    }

    #[test]
    fn test_output_format_default() {
        assert_eq!(OutputFormat::default(), OutputFormat::Table);
    }
}
