//! Validate config command implementation
//!
//! This module implements the `validate-config` command for validating
//! the es-sample configuration file.

use super::{EXIT_CONFIG, EXIT_SUCCESS};
use crate::config::{load_config_or_default, SampleConfig};
use clap::Args;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    pub async fn execute(&self, config_path: &str, config_required: bool) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Validating configuration");

        println!("🔍 Validating configuration file: {config_path}");
        println!();

        // Loading also validates
        let config = match load_config_or_default(config_path, config_required) {
            Ok(c) => {
                println!("✅ Configuration is valid");
                c
            }
            Err(e) => {
                println!("❌ Configuration validation failed");
                println!("   Error: {e}");
                return Ok(EXIT_CONFIG);
            }
        };

        if let Err(e) = config.validate() {
            println!("❌ Configuration validation failed");
            println!("   Error: {e}");
            return Ok(EXIT_CONFIG);
        }

        print_summary(&config);
        Ok(EXIT_SUCCESS)
    }
}

fn print_summary(config: &SampleConfig) {
    let query = &config.query;
    let export = &config.export;

    println!();
    println!("Configuration Summary:");
    println!("  Log Level: {}", config.application.log_level);
    println!("  Store Host: {}", config.store.host);
    println!("  Scroll TTL: {}", config.store.scroll);
    println!("  Query: {}", query.query);
    println!("  Page Size: {}", query.size);
    println!("  Count: {}", query.count);
    println!("  Limit: {}", query.limit);
    println!("  Random: {}", query.random);
    println!("  Existing: {:?}", query.existing);
    println!("  Missing: {:?}", query.missing);
    println!(
        "  Output: {}",
        export.output.as_deref().unwrap_or("<collection>.jsonl")
    );
    println!("  Parallelism: {}", export.parallelism);
    println!("  Queue Size: {}", config.queue_capacity());
    println!("  Delete After Export: {}", export.delete);
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::loader::ENV_MUTEX;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[tokio::test]
    async fn test_valid_file() {
        let _guard = ENV_MUTEX.lock().unwrap();
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[query]\nsize = 10\ncount = \"-\"").unwrap();

        let code = ValidateArgs {}
            .execute(file.path().to_str().unwrap(), true)
            .await
            .unwrap();
        assert_eq!(code, EXIT_SUCCESS);
    }

    #[tokio::test]
    async fn test_unknown_key() {
        let _guard = ENV_MUTEX.lock().unwrap();
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[query]\nsise = 10").unwrap();

        let code = ValidateArgs {}
            .execute(file.path().to_str().unwrap(), true)
            .await
            .unwrap();
        assert_eq!(code, EXIT_CONFIG);
    }

    #[tokio::test]
    async fn test_missing_required_file() {
        let code = ValidateArgs {}
            .execute("/nonexistent/es-sample.toml", true)
            .await
            .unwrap();
        assert_eq!(code, EXIT_CONFIG);
    }
}
