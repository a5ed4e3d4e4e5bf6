//! CLI interface and argument parsing
//!
//! This module provides the command-line interface for es-sample using clap.

pub mod commands;

use clap::{Parser, Subcommand};

/// Configuration file read when `--config` is not given
pub const DEFAULT_CONFIG_PATH: &str = "es-sample.toml";

/// es-sample - bulk export and sampling for search indices
#[derive(Parser, Debug)]
#[command(name = "es-sample")]
#[command(version, about, long_about = None)]
#[command(author = "es-sample Contributors")]
pub struct Cli {
    /// Path to configuration file [default: es-sample.toml, skipped when missing]
    #[arg(long, global = true, env = "ES_SAMPLE_CONFIG")]
    pub config: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, env = "ES_SAMPLE_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Configuration path and whether it must exist
    pub fn config_source(&self) -> (&str, bool) {
        match &self.config {
            Some(path) => (path, true),
            None => (DEFAULT_CONFIG_PATH, false),
        }
    }
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Export a collection, then resolve its ids in further collections
    #[command(disable_help_flag = true)]
    Export(commands::export::ExportArgs),

    /// Validate configuration file
    ValidateConfig(commands::validate::ValidateArgs),
}
