use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub mod formatters;

/// Default location of the generated report
pub const DEFAULT_OUTPUT: &str = "data/latest.json";

#[derive(Parser)]
#[command(name = "portfolio-tracker")]
#[command(
    version,
    about = "Weighted ETF platform return reports from daily price series"
)]
#[command(
    long_about = "Fetch five years of daily prices for every holding of the configured platforms, compute 1M/1Y/5Y returns, aggregate them by weight, and write a chart-ready JSON report."
)]
pub struct Cli {
    /// Disable colorized/ANSI output
    #[arg(long = "no-color", global = true)]
    pub no_color: bool,

    /// Output results in JSON format
    #[arg(long = "json", global = true)]
    pub json: bool,

    /// Platform configuration file (TOML). Falls back to $TRACKER_CONFIG,
    /// then to the built-in platforms
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch prices and write the report
    Fetch {
        /// Use deterministic sample data instead of the network
        #[arg(long)]
        offline: bool,

        /// Where to write the report ("-" for stdout)
        #[arg(short, long, default_value = DEFAULT_OUTPUT)]
        output: String,
    },

    /// Check the structure of a report file
    Validate {
        /// Path to the JSON report
        path: PathBuf,
    },

    /// List configured platforms and their holdings
    Platforms,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_fetch_defaults() {
        let cli = Cli::try_parse_from(["portfolio-tracker", "fetch"]).unwrap();
        match cli.command {
            Commands::Fetch { offline, output } => {
                assert!(!offline);
                assert_eq!(output, DEFAULT_OUTPUT);
            }
            _ => panic!("expected fetch"),
        }
        assert!(!cli.json);
        assert!(cli.config.is_none());
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "portfolio-tracker",
            "fetch",
            "--offline",
            "-o",
            "-",
            "--json",
            "--config",
            "custom.toml",
        ])
        .unwrap();
        assert!(cli.json);
        assert_eq!(cli.config, Some(PathBuf::from("custom.toml")));
        assert!(matches!(cli.command, Commands::Fetch { offline: true, ref output } if output == "-"));
    }
}
