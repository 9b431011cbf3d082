//! Command line interface

use clap::Parser;
use std::path::PathBuf;

/// Validate a delimited transaction file against the config and account
/// validation services, splitting records into per-partition valid and
/// invalid output files.
#[derive(Parser, Debug, Clone)]
#[command(name = "txnvalidator", version, about)]
pub struct Cli {
    /// Path to the delimited transaction input file
    #[arg(long, short = 'i', env = "TXNVALIDATOR_INPUT_FILE")]
    pub input_file: Option<PathBuf>,

    /// TOML configuration file; CLI flags override its values
    #[arg(long, short = 'c')]
    pub config: Option<PathBuf>,

    /// Full output path; its directory receives the per-partition files
    #[arg(long, short = 'o', env = "TXNVALIDATOR_OUTPUT_FILE")]
    pub output_file: Option<PathBuf>,

    /// Records per read/write cycle
    #[arg(long)]
    pub chunk_size: Option<usize>,

    /// Desired partition count
    #[arg(long)]
    pub grid_size: Option<usize>,

    /// Config lookup service base URL
    #[arg(long, env = "TXNVALIDATOR_CONFIG_SERVICE_URL")]
    pub config_service_url: Option<String>,

    /// Account validation service base URL
    #[arg(long, env = "TXNVALIDATOR_ACCOUNT_SERVICE_URL")]
    pub account_service_url: Option<String>,

    /// Seconds between live progress lines (0 disables them)
    #[arg(long, default_value_t = 1)]
    pub status_interval: u64,

    /// Print the final status projection as JSON instead of text
    #[arg(long)]
    pub json: bool,

    /// Validate configuration and exit without running a job
    #[arg(long)]
    pub dry_run: bool,
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::parse_from(["txnvalidator"]);
        assert!(cli.input_file.is_none());
        assert!(cli.config.is_none());
        assert_eq!(cli.status_interval, 1);
        assert!(!cli.json);
        assert!(!cli.dry_run);
    }

    #[test]
    fn test_flags_parse() {
        let cli = Cli::parse_from([
            "txnvalidator",
            "--input-file",
            "transactions.csv",
            "--output-file",
            "out/result.csv",
            "--chunk-size",
            "50",
            "--grid-size",
            "4",
            "--config-service-url",
            "http://cfg:8081",
            "--account-service-url",
            "http://acct:8082",
            "--json",
            "--dry-run",
        ]);
        assert_eq!(cli.input_file.unwrap(), PathBuf::from("transactions.csv"));
        assert_eq!(cli.output_file.unwrap(), PathBuf::from("out/result.csv"));
        assert_eq!(cli.chunk_size, Some(50));
        assert_eq!(cli.grid_size, Some(4));
        assert_eq!(cli.config_service_url.as_deref(), Some("http://cfg:8081"));
        assert_eq!(cli.account_service_url.as_deref(), Some("http://acct:8082"));
        assert!(cli.json);
        assert!(cli.dry_run);
    }
}
