// es-sample - Bulk export and sampling for search indices
// Copyright (c) 2026 es-sample Contributors
// Licensed under the MIT License

use clap::Parser;
use es_sample::cli::commands::{EXIT_CONFIG, EXIT_FATAL};
use es_sample::cli::{Cli, Commands};
use es_sample::config::{load_config_or_default, LoggingConfig};
use es_sample::logging::init_logging;
use std::process;
use tokio::sync::watch;

#[tokio::main]
async fn main() {
    // Load environment variables from .env file if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let (config_path, config_required) = cli.config_source();

    // Logging settings come from the config file when it loads; the command
    // reports load errors itself
    let file_config = load_config_or_default(config_path, config_required).ok();
    let log_level = cli
        .log_level
        .clone()
        .or_else(|| file_config.as_ref().map(|c| c.application.log_level.clone()))
        .unwrap_or_else(|| "info".to_string());
    let logging_config = file_config
        .map(|c| c.logging)
        .unwrap_or_else(LoggingConfig::default);

    let _logging_guard = match init_logging(&log_level, &logging_config) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {e}");
            process::exit(EXIT_CONFIG);
        }
    };

    tracing::debug!(version = env!("CARGO_PKG_VERSION"), "es-sample starting");

    // Create shutdown signal channel for graceful shutdown
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    tokio::spawn(async move {
        #[cfg(unix)]
        {
            use tokio::signal::unix::{signal, SignalKind};
            let mut sigterm = match signal(SignalKind::terminate()) {
                Ok(s) => s,
                Err(e) => {
                    tracing::error!(error = %e, "Failed to install SIGTERM handler");
                    return;
                }
            };

            tokio::select! {
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("Received SIGINT (Ctrl+C), stopping export");
                }
                _ = sigterm.recv() => {
                    tracing::info!("Received SIGTERM, stopping export");
                }
            }
            let _ = shutdown_tx.send(true);
        }

        #[cfg(not(unix))]
        {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            } else {
                tracing::info!("Received SIGINT (Ctrl+C), stopping export");
                let _ = shutdown_tx.send(true);
            }
        }
    });

    let exit_code = match execute_command(&cli, shutdown_rx).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!(error = %e, "Command execution failed");
            eprintln!("Error: {e}");
            EXIT_FATAL
        }
    };

    // Flush buffered file logs before exiting
    drop(_logging_guard);
    process::exit(exit_code);
}

/// Execute the CLI command
async fn execute_command(cli: &Cli, shutdown_signal: watch::Receiver<bool>) -> anyhow::Result<i32> {
    let (config_path, config_required) = cli.config_source();
    match &cli.command {
        Commands::Export(args) => {
            args.execute(config_path, config_required, shutdown_signal)
                .await
        }
        Commands::ValidateConfig(args) => args.execute(config_path, config_required).await,
    }
}
