//! Downstream service clients
//!
//! Typed HTTP facades over the two validation services. Both clients share
//! the same failure policy: any transport or remote failure degrades to a
//! negative result (invalid / empty) with a warning, never an error. The
//! validator cannot fabricate downstream decisions, so a record whose check
//! could not be performed is routed to the invalid stream with an
//! explanatory reason instead of being silently passed.

pub mod account_service;
pub mod config_service;

pub use account_service::{AccountServiceClient, AccountState, AccountStatus, MAX_BULK_ACCOUNTS};
pub use config_service::ConfigServiceClient;

use crate::Result;
use anyhow::Context;
use std::time::Duration;

/// HTTP client with the per-request timeout applied to every call
pub(crate) fn build_http_client(request_timeout: Duration) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(request_timeout)
        .build()
        .context("Failed to build HTTP client")
}

/// Base URLs are joined with path fragments, so strip any trailing slash
pub(crate) fn normalize_base_url(base_url: &str) -> String {
    base_url.trim_end_matches('/').to_string()
}
