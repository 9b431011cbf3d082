//! Configuration module
//!
//! Handles CLI argument parsing, TOML configuration files, and validation.

pub mod cli;
pub mod toml;
pub mod validator;

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Complete pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Path to the delimited transaction input file
    pub input_file: PathBuf,
    /// Full output path; its parent directory receives the per-partition
    /// valid/invalid files
    pub output_file: PathBuf,
    /// Records per read/write cycle
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    /// Desired partition count; fewer partitions are created when the input
    /// has fewer rows
    #[serde(default = "default_grid_size")]
    pub grid_size: usize,
    #[serde(default = "default_config_service")]
    pub config_service: ServiceConfig,
    #[serde(default = "default_account_validation_service")]
    pub account_validation_service: ServiceConfig,
    #[serde(default)]
    pub bulkheads: BulkheadsConfig,
    /// Per-request timeout for both downstream clients
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

impl Config {
    /// Directory receiving the per-partition output files
    pub fn output_dir(&self) -> PathBuf {
        match self.output_file.parent() {
            Some(parent) if parent != Path::new("") => parent.to_path_buf(),
            _ => PathBuf::from("."),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

fn default_chunk_size() -> usize {
    100
}

fn default_grid_size() -> usize {
    10
}

fn default_request_timeout_ms() -> u64 {
    5_000
}

fn default_config_service() -> ServiceConfig {
    ServiceConfig {
        base_url: "http://localhost:8081".to_string(),
    }
}

fn default_account_validation_service() -> ServiceConfig {
    ServiceConfig {
        base_url: "http://localhost:8082".to_string(),
    }
}

/// One downstream service endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    pub base_url: String,
}

/// Bulkhead sizing for both downstream dependencies.
///
/// The `account_validation` semaphore section is accepted for symmetry with
/// `config` but has no hot-path consumer: the account call is isolated by
/// the pool bulkhead alone.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BulkheadsConfig {
    #[serde(default)]
    pub config: SemaphoreBulkheadConfig,
    #[serde(default)]
    pub account_validation: SemaphoreBulkheadConfig,
    #[serde(default)]
    pub pool: PoolBulkheadConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SemaphoreBulkheadConfig {
    #[serde(default = "default_max_concurrent_calls")]
    pub max_concurrent_calls: usize,
    #[serde(default = "default_max_wait_duration_ms")]
    pub max_wait_duration_ms: u64,
}

impl Default for SemaphoreBulkheadConfig {
    fn default() -> Self {
        Self {
            max_concurrent_calls: default_max_concurrent_calls(),
            max_wait_duration_ms: default_max_wait_duration_ms(),
        }
    }
}

impl SemaphoreBulkheadConfig {
    pub fn max_wait(&self) -> Duration {
        Duration::from_millis(self.max_wait_duration_ms)
    }
}

fn default_max_concurrent_calls() -> usize {
    25
}

fn default_max_wait_duration_ms() -> u64 {
    500
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolBulkheadConfig {
    #[serde(default = "default_core_pool_size")]
    pub core_pool_size: usize,
    #[serde(default = "default_max_pool_size")]
    pub max_pool_size: usize,
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
    /// Idle time before an overflow worker exits
    #[serde(default = "default_keep_alive_duration_ms")]
    pub keep_alive_duration_ms: u64,
}

impl Default for PoolBulkheadConfig {
    fn default() -> Self {
        Self {
            core_pool_size: default_core_pool_size(),
            max_pool_size: default_max_pool_size(),
            queue_capacity: default_queue_capacity(),
            keep_alive_duration_ms: default_keep_alive_duration_ms(),
        }
    }
}

impl PoolBulkheadConfig {
    pub fn keep_alive(&self) -> Duration {
        Duration::from_millis(self.keep_alive_duration_ms)
    }
}

fn default_core_pool_size() -> usize {
    10
}

fn default_max_pool_size() -> usize {
    20
}

fn default_queue_capacity() -> usize {
    50
}

fn default_keep_alive_duration_ms() -> u64 {
    20_000
}
