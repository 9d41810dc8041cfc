//! Validate config command implementation
//!
//! This module implements the `validate-config` command, which loads the
//! configuration and resolves the schema catalog without touching any store.

use crate::config::load_config;
use crate::config::schema::SourceKind;
use crate::core::catalog::{ColumnKind, DomainKind, SchemaCatalog};
use clap::Args;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Validating configuration");

        println!("🔍 Validating configuration file: {config_path}");
        println!();

        let config = match load_config(config_path) {
            Ok(c) => {
                println!("✅ Configuration file loaded successfully");
                c
            }
            Err(e) => {
                println!("❌ Failed to load configuration file");
                println!("   Error: {e}");
                return Ok(2);
            }
        };

        let catalog = match SchemaCatalog::from_config(&config) {
            Ok(c) => {
                println!("✅ Schema declarations are valid");
                c
            }
            Err(e) => {
                println!("❌ Schema validation failed");
                println!("   Error: {e}");
                return Ok(2);
            }
        };

        println!();
        println!("Configuration Summary:");
        println!("  Log Level: {}", config.application.log_level);
        println!("  k: {}", config.anonymization.k);
        match config.source.kind {
            SourceKind::PostgreSQL => println!("  Source: PostgreSQL"),
            SourceKind::Csv => {
                if let Some(ref csv) = config.source.csv {
                    println!("  Source: CSV directory {}", csv.directory);
                }
            }
        }
        println!("  Output Directory: {}", config.output.directory);
        match config.target {
            Some(ref target) => println!(
                "  Target: PostgreSQL (suffix {}, recreate tables: {})",
                target.table_suffix, target.recreate_tables
            ),
            None => println!("  Target: none"),
        }
        println!("  Dry Run: {}", config.application.dry_run);

        println!("  Identifier Domains:");
        for domain in catalog.domains() {
            match &domain.kind {
                DomainKind::Primary {
                    source_table,
                    source_column,
                    alphabet,
                    ..
                } => println!(
                    "    - {} ({}.{}, {})",
                    domain.name, source_table, source_column, alphabet
                ),
                DomainKind::Alias { alias_of, .. } => {
                    println!("    - {} (alias of {})", domain.name, alias_of)
                }
            }
        }

        println!("  Tables:");
        for table in catalog.tables() {
            let identifiers = table
                .columns
                .iter()
                .filter(|c| matches!(c.kind, ColumnKind::Identifier { .. }))
                .count();
            println!(
                "    - {} ({} -> {}): {} columns, {} identifier(s)",
                table.name,
                table.source_table,
                table.target_table,
                table.columns.len(),
                identifiers
            );
        }
        println!();

        Ok(0)
    }
}
