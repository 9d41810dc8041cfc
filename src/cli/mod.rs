//! CLI interface and argument parsing
//!
//! This module provides the command-line interface for pufgen using clap.

pub mod commands;

use clap::{Parser, Subcommand};

/// pufgen - k-anonymous public use file generator
#[derive(Parser, Debug)]
#[command(name = "pufgen")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "pufgen.toml", env = "PUFGEN_CONFIG")]
    pub config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "PUFGEN_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate the public use file for the configured tables
    Run(commands::run::RunArgs),

    /// Validate configuration file and schema declarations
    ValidateConfig(commands::validate::ValidateArgs),

    /// Initialize a new configuration file
    Init(commands::init::InitArgs),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_run() {
        let cli = Cli::parse_from(["pufgen", "run"]);
        assert_eq!(cli.config, "pufgen.toml");
        assert!(matches!(cli.command, Commands::Run(_)));
    }

    #[test]
    fn test_cli_parse_run_options() {
        let cli = Cli::parse_from([
            "pufgen",
            "--config",
            "custom.toml",
            "run",
            "--tables",
            "SA151,SA651",
            "--k",
            "3",
            "--dry-run",
            "--sequential",
        ]);
        assert_eq!(cli.config, "custom.toml");
        let Commands::Run(args) = cli.command else {
            panic!("expected run command");
        };
        assert_eq!(args.tables, vec!["SA151", "SA651"]);
        assert_eq!(args.k, Some(3));
        assert!(args.dry_run);
        assert!(args.sequential);
    }

    #[test]
    fn test_cli_parse_with_log_level() {
        let cli = Cli::parse_from(["pufgen", "--log-level", "debug", "run"]);
        assert_eq!(cli.log_level, Some("debug".to_string()));
    }

    #[test]
    fn test_cli_parse_validate_config() {
        let cli = Cli::parse_from(["pufgen", "validate-config"]);
        assert!(matches!(cli.command, Commands::ValidateConfig(_)));
    }

    #[test]
    fn test_cli_parse_init() {
        let cli = Cli::parse_from(["pufgen", "init", "--force"]);
        assert!(matches!(cli.command, Commands::Init(ref args) if args.force));
    }
}
