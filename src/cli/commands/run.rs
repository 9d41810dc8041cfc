//! Run command implementation
//!
//! This module implements the `run` command, which builds the identifier
//! pools, generates one artifact per table and loads the target store.

use crate::cli::commands::exit_code_for;
use crate::config::load_config;
use crate::core::pipeline::{PufCoordinator, RunOptions};
use crate::log_error_with_context;
use clap::Args;

/// Arguments for the run command
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Only process these tables (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub tables: Vec<String>,

    /// Override the anonymity parameter k
    #[arg(short, long)]
    pub k: Option<usize>,

    /// Write artifacts but skip the target load
    #[arg(long)]
    pub dry_run: bool,

    /// Process one table at a time
    #[arg(long)]
    pub sequential: bool,
}

impl RunArgs {
    /// Execute the run command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!("Starting run command");

        let mut config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                log_error_with_context!(e, "Failed to load configuration");
                eprintln!("Failed to load configuration: {e}");
                return Ok(2);
            }
        };

        if let Some(k) = self.k {
            tracing::info!(k, "Overriding k from CLI");
            config.anonymization.k = k;
            if let Err(e) = config.anonymization.validate() {
                eprintln!("{e}");
                return Ok(exit_code_for(&e));
            }
        }

        if self.dry_run {
            tracing::info!("Enabling dry-run mode from CLI");
            config.application.dry_run = true;
        }

        if config.application.dry_run {
            println!("🔍 DRY RUN MODE - artifacts are written, the target is not loaded");
            println!();
        }

        let coordinator = match PufCoordinator::new(config).await {
            Ok(c) => c,
            Err(e) => {
                log_error_with_context!(e, "Failed to create run coordinator");
                eprintln!("Failed to initialize run: {e}");
                return Ok(exit_code_for(&e));
            }
        };

        println!("🚀 Starting run...");
        println!();

        let options = RunOptions {
            tables: self.tables.clone(),
            sequential: self.sequential,
        };
        let summary = match coordinator.execute(&options).await {
            Ok(s) => s,
            Err(e) => {
                log_error_with_context!(e, "Run failed");
                eprintln!("Run failed: {e}");
                return Ok(exit_code_for(&e));
            }
        };

        println!("{}", summary.format_summary());
        if !summary.verification.is_success() {
            println!("{}", summary.verification.format_summary());
        }

        if summary.is_successful() {
            println!("✅ Run completed successfully");
        } else {
            println!("⚠️  Run completed with {} failed table(s)", summary.failed_tables());
        }

        Ok(summary.exit_code())
    }
}
