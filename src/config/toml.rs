//! TOML configuration file parsing

use super::*;
use crate::config::cli::Cli;
use anyhow::{Context, Result};
use std::fs;

/// Parse TOML configuration file
pub fn parse_toml_file(path: &Path) -> Result<Config> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    parse_toml_string(&contents)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Parse TOML configuration from string
pub fn parse_toml_string(contents: &str) -> Result<Config> {
    let config: Config =
        ::toml::from_str(contents).context("Failed to parse TOML configuration")?;

    Ok(config)
}

/// Resolve the effective configuration: the TOML file when given, otherwise
/// CLI arguments alone; CLI flags always take precedence.
pub fn resolve_config(cli: &Cli) -> Result<Config> {
    let config = match &cli.config {
        Some(path) => parse_toml_file(path)?,
        None => {
            let input_file = cli
                .input_file
                .clone()
                .ok_or_else(|| anyhow::anyhow!("--input-file is required without --config"))?;
            let output_file = cli
                .output_file
                .clone()
                .ok_or_else(|| anyhow::anyhow!("--output-file is required without --config"))?;
            Config {
                input_file,
                output_file,
                chunk_size: default_chunk_size(),
                grid_size: default_grid_size(),
                config_service: default_config_service(),
                account_validation_service: default_account_validation_service(),
                bulkheads: BulkheadsConfig::default(),
                request_timeout_ms: default_request_timeout_ms(),
            }
        }
    };

    merge_cli_with_config(cli, config)
}

/// Merge CLI arguments with a loaded configuration (CLI takes precedence)
pub fn merge_cli_with_config(cli: &Cli, mut config: Config) -> Result<Config> {
    if let Some(ref input_file) = cli.input_file {
        config.input_file = input_file.clone();
    }
    if let Some(ref output_file) = cli.output_file {
        config.output_file = output_file.clone();
    }
    if let Some(chunk_size) = cli.chunk_size {
        config.chunk_size = chunk_size;
    }
    if let Some(grid_size) = cli.grid_size {
        config.grid_size = grid_size;
    }
    if let Some(ref url) = cli.config_service_url {
        config.config_service.base_url = url.clone();
    }
    if let Some(ref url) = cli.account_service_url {
        config.account_validation_service.base_url = url.clone();
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_parse_toml_basic() {
        let toml = r#"
input_file = "transactions.csv"
output_file = "output/result.csv"
chunk_size = 50
grid_size = 4

[config_service]
base_url = "http://cfg:8081"

[account_validation_service]
base_url = "http://acct:8082"

[bulkheads.config]
max_concurrent_calls = 5
max_wait_duration_ms = 250

[bulkheads.pool]
core_pool_size = 2
max_pool_size = 4
queue_capacity = 8
keep_alive_duration_ms = 1000
"#;

        let config = parse_toml_string(toml).unwrap();
        assert_eq!(config.input_file, PathBuf::from("transactions.csv"));
        assert_eq!(config.chunk_size, 50);
        assert_eq!(config.grid_size, 4);
        assert_eq!(config.config_service.base_url, "http://cfg:8081");
        assert_eq!(config.bulkheads.config.max_concurrent_calls, 5);
        assert_eq!(config.bulkheads.pool.max_pool_size, 4);
        // Sections not present fall back to defaults.
        assert_eq!(config.bulkheads.account_validation.max_concurrent_calls, 25);
        assert_eq!(config.request_timeout_ms, 5_000);
    }

    #[test]
    fn test_parse_toml_minimal_uses_defaults() {
        let toml = r#"
input_file = "transactions.csv"
output_file = "result.csv"
"#;

        let config = parse_toml_string(toml).unwrap();
        assert_eq!(config.chunk_size, 100);
        assert_eq!(config.grid_size, 10);
        assert_eq!(config.config_service.base_url, "http://localhost:8081");
        assert_eq!(
            config.account_validation_service.base_url,
            "http://localhost:8082"
        );
    }

    #[test]
    fn test_cli_overrides_toml() {
        let toml = r#"
input_file = "from-toml.csv"
output_file = "result.csv"
chunk_size = 100
"#;
        let config = parse_toml_string(toml).unwrap();

        let cli = Cli::parse_from([
            "txnvalidator",
            "--input-file",
            "from-cli.csv",
            "--chunk-size",
            "25",
            "--config-service-url",
            "http://other:9000",
        ]);
        let merged = merge_cli_with_config(&cli, config).unwrap();

        assert_eq!(merged.input_file, PathBuf::from("from-cli.csv"));
        assert_eq!(merged.chunk_size, 25);
        assert_eq!(merged.config_service.base_url, "http://other:9000");
        // Untouched values survive the merge.
        assert_eq!(merged.output_file, PathBuf::from("result.csv"));
    }

    #[test]
    fn test_resolve_without_config_requires_paths() {
        let cli = Cli::parse_from(["txnvalidator"]);
        let err = resolve_config(&cli).unwrap_err();
        assert!(err.to_string().contains("--input-file"));
    }

    #[test]
    fn test_resolve_from_cli_only() {
        let cli = Cli::parse_from([
            "txnvalidator",
            "--input-file",
            "transactions.csv",
            "--output-file",
            "out/result.csv",
            "--grid-size",
            "2",
        ]);
        let config = resolve_config(&cli).unwrap();
        assert_eq!(config.grid_size, 2);
        assert_eq!(config.chunk_size, 100);
        assert_eq!(config.config_service.base_url, "http://localhost:8081");
    }
}
