//! Configuration validation

use super::*;
use anyhow::Result;

/// Validate complete configuration
pub fn validate_config(config: &Config) -> Result<()> {
    if config.chunk_size == 0 {
        anyhow::bail!("chunk_size must be at least 1");
    }
    if config.grid_size == 0 {
        anyhow::bail!("grid_size must be at least 1");
    }
    if config.request_timeout_ms == 0 {
        anyhow::bail!("request_timeout_ms must be at least 1");
    }

    validate_base_url(&config.config_service.base_url, "config_service")?;
    validate_base_url(
        &config.account_validation_service.base_url,
        "account_validation_service",
    )?;

    validate_semaphore(&config.bulkheads.config, "bulkheads.config")?;
    validate_semaphore(
        &config.bulkheads.account_validation,
        "bulkheads.account_validation",
    )?;
    validate_pool(&config.bulkheads.pool)?;

    Ok(())
}

fn validate_base_url(base_url: &str, section: &str) -> Result<()> {
    if base_url.is_empty() {
        anyhow::bail!("{}.base_url must not be empty", section);
    }
    if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
        anyhow::bail!(
            "{}.base_url must start with http:// or https://, got {}",
            section,
            base_url
        );
    }
    Ok(())
}

fn validate_semaphore(bulkhead: &SemaphoreBulkheadConfig, section: &str) -> Result<()> {
    if bulkhead.max_concurrent_calls == 0 {
        anyhow::bail!("{}.max_concurrent_calls must be at least 1", section);
    }
    Ok(())
}

fn validate_pool(pool: &PoolBulkheadConfig) -> Result<()> {
    if pool.core_pool_size == 0 {
        anyhow::bail!("bulkheads.pool.core_pool_size must be at least 1");
    }
    if pool.max_pool_size < pool.core_pool_size {
        anyhow::bail!(
            "bulkheads.pool.max_pool_size ({}) must be >= core_pool_size ({})",
            pool.max_pool_size,
            pool.core_pool_size
        );
    }
    if pool.queue_capacity == 0 {
        anyhow::bail!("bulkheads.pool.queue_capacity must be at least 1");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn valid_config() -> Config {
        Config {
            input_file: PathBuf::from("transactions.csv"),
            output_file: PathBuf::from("out/result.csv"),
            chunk_size: 100,
            grid_size: 10,
            config_service: ServiceConfig {
                base_url: "http://localhost:8081".to_string(),
            },
            account_validation_service: ServiceConfig {
                base_url: "http://localhost:8082".to_string(),
            },
            bulkheads: BulkheadsConfig::default(),
            request_timeout_ms: 5_000,
        }
    }

    #[test]
    fn test_valid_config_passes() {
        validate_config(&valid_config()).unwrap();
    }

    #[test]
    fn test_zero_chunk_size_rejected() {
        let mut config = valid_config();
        config.chunk_size = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_zero_grid_size_rejected() {
        let mut config = valid_config();
        config.grid_size = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_bad_base_url_rejected() {
        let mut config = valid_config();
        config.config_service.base_url = "localhost:8081".to_string();
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("config_service"));
    }

    #[test]
    fn test_pool_smaller_than_core_rejected() {
        let mut config = valid_config();
        config.bulkheads.pool.core_pool_size = 8;
        config.bulkheads.pool.max_pool_size = 4;
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("max_pool_size"));
    }

    #[test]
    fn test_zero_semaphore_permits_rejected() {
        let mut config = valid_config();
        config.bulkheads.config.max_concurrent_calls = 0;
        assert!(validate_config(&config).is_err());
    }
}
