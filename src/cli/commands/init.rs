//! Init command implementation
//!
//! This module implements the `init` command for generating a sample
//! configuration file.

use clap::Args;
use std::fs;
use std::path::Path;

/// Arguments for the init command
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Path where to create the configuration file
    #[arg(short, long, default_value = "pufgen.toml")]
    pub output: String,

    /// Overwrite existing file
    #[arg(long)]
    pub force: bool,
}

impl InitArgs {
    /// Execute the init command
    pub async fn execute(&self) -> anyhow::Result<i32> {
        tracing::info!(output = %self.output, "Initializing configuration file");

        println!("📝 Initializing pufgen configuration");
        println!();

        if Path::new(&self.output).exists() && !self.force {
            println!("❌ Configuration file already exists: {}", self.output);
            println!("   Use --force to overwrite");
            return Ok(2);
        }

        match fs::write(&self.output, SAMPLE_CONFIG) {
            Ok(_) => {
                println!("✅ Configuration file created: {}", self.output);
                println!();
                println!("Next steps:");
                println!("  1. Edit {} with your tables and identifier domains", self.output);
                println!("  2. For PostgreSQL, set PUFGEN_SOURCE_DSN (and PUFGEN_TARGET_DSN) in .env");
                println!("  3. Validate configuration: pufgen validate-config");
                println!("  4. Generate the public use file: pufgen run --dry-run");
                println!();
                Ok(0)
            }
            Err(e) => {
                println!("❌ Failed to write configuration file");
                println!("   Error: {e}");
                Ok(5)
            }
        }
    }
}

/// Sample configuration written by `pufgen init`
pub const SAMPLE_CONFIG: &str = r#"# pufgen configuration
# k-anonymous public use file generator

[application]
log_level = "info"
dry_run = false

[anonymization]
# Every retained value class must occur at least k times (k >= 2)
k = 5

[processing]
# Defaults to min(number of tables, CPUs)
# max_parallel_tables = 4

[output]
directory = "output_csv"

[source]
kind = "csv"

[source.csv]
# One <table>.csv with a header row per table
directory = "extract"
delimiter = ","

# PostgreSQL source instead of CSV:
# [source]
# kind = "postgresql"
#
# [source.postgresql]
# connection_string = "${PUFGEN_SOURCE_DSN}"
# max_connections = 10
# connection_timeout_seconds = 30

# Load finished tables into PostgreSQL:
# [target]
# table_suffix = "_puf"
# recreate_tables = true
#
# [target.postgresql]
# connection_string = "${PUFGEN_TARGET_DSN}"

[logging]
local_enabled = false
local_path = "logs"
local_rotation = "daily"
json = true

# Identifier domains: one pseudonym pool per primary domain
[[domains]]
name = "person"
source_table = "persons"
source_column = "person_id"
alphabet = "numeric"
primary_tables = ["persons"]

# Columns referring to the same entity share the pool
[[domains]]
name = "referrer"
alias_of = "person"

[[tables]]
name = "persons"

[[tables.columns]]
name = "person_id"
role = "identifier"
domain = "person"

[[tables.columns]]
name = "birth_year"
type = "year"

[[tables.columns]]
name = "sex"
type = "category"

[[tables.columns]]
name = "release"
role = "constant"
value = "2019"

[[tables]]
name = "visits"

[[tables.columns]]
name = "person_id"
role = "identifier"
domain = "person"

[[tables.columns]]
name = "referrer_id"
role = "identifier"
domain = "referrer"

[[tables.columns]]
name = "visit_date"
type = "date"

[[tables.columns]]
name = "diagnosis"
type = "string"
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parse_config;
    use crate::core::catalog::SchemaCatalog;

    #[test]
    fn test_sample_config_is_valid() {
        let config = parse_config(SAMPLE_CONFIG).unwrap();
        assert_eq!(config.anonymization.k, 5);
        assert_eq!(config.tables.len(), 2);

        let catalog = SchemaCatalog::from_config(&config).unwrap();
        assert_eq!(catalog.resolve_domain("referrer").unwrap(), "person");
    }

    #[tokio::test]
    async fn test_init_refuses_to_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("pufgen.toml");
        fs::write(&output, "existing").unwrap();

        let args = InitArgs {
            output: output.to_string_lossy().to_string(),
            force: false,
        };
        assert_eq!(args.execute().await.unwrap(), 2);
        assert_eq!(fs::read_to_string(&output).unwrap(), "existing");

        let args = InitArgs {
            output: output.to_string_lossy().to_string(),
            force: true,
        };
        assert_eq!(args.execute().await.unwrap(), 0);
        assert!(fs::read_to_string(&output).unwrap().contains("[anonymization]"));
    }
}
