//! Account validation service client
//!
//! One bulk operation: validate a list of (account, bank) pairs in a single
//! call. The service caps requests at [`MAX_BULK_ACCOUNTS`] pairs; larger
//! inputs are truncated rather than split, since the validator only ever
//! sends two pairs per record.

use crate::client::{build_http_client, normalize_base_url};
use crate::Result;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use tracing::{debug, warn};

/// Upper bound on pairs per bulk invocation, imposed by the service
pub const MAX_BULK_ACCOUNTS: usize = 100;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct BulkValidationRequest<'a> {
    accounts: Vec<AccountRef<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AccountRef<'a> {
    account_number: &'a str,
    bank_code: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BulkValidationResponse {
    total_requested: u32,
    total_valid: u32,
    total_invalid: u32,
    results: Vec<AccountStatus>,
}

/// Per-account answer from the bulk call.
///
/// `valid` is the authoritative field; `status` is descriptive and feeds the
/// human-readable failure reason.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountStatus {
    pub account_number: String,
    pub bank_code: String,
    #[serde(default)]
    pub account_name: Option<String>,
    pub valid: bool,
    pub status: AccountState,
    #[serde(default)]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccountState {
    Active,
    Inactive,
    Blocked,
    NotFound,
}

impl fmt::Display for AccountState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            AccountState::Active => "ACTIVE",
            AccountState::Inactive => "INACTIVE",
            AccountState::Blocked => "BLOCKED",
            AccountState::NotFound => "NOT_FOUND",
        };
        f.write_str(label)
    }
}

pub struct AccountServiceClient {
    http: reqwest::Client,
    base_url: String,
}

impl AccountServiceClient {
    pub fn new(base_url: &str, request_timeout: Duration) -> Result<Self> {
        Ok(Self {
            http: build_http_client(request_timeout)?,
            base_url: normalize_base_url(base_url),
        })
    }

    /// Validate `(account, bank)` pairs in one call.
    ///
    /// Transport or remote failure returns an empty list; the validator
    /// reads an empty list as "no results" and fails the record with a
    /// specific reason.
    pub async fn validate_bulk(&self, pairs: &[(String, String)]) -> Vec<AccountStatus> {
        let pairs = if pairs.len() > MAX_BULK_ACCOUNTS {
            warn!(
                requested = pairs.len(),
                limit = MAX_BULK_ACCOUNTS,
                "truncating bulk validation request"
            );
            &pairs[..MAX_BULK_ACCOUNTS]
        } else {
            pairs
        };

        match self.post_bulk(pairs).await {
            Ok(response) => {
                debug!(
                    requested = response.total_requested,
                    valid = response.total_valid,
                    invalid = response.total_invalid,
                    "bulk account validation"
                );
                response.results
            }
            Err(err) => {
                warn!(error = %err, "account validation call failed, treating as no results");
                Vec::new()
            }
        }
    }

    async fn post_bulk(&self, pairs: &[(String, String)]) -> reqwest::Result<BulkValidationResponse> {
        let request = BulkValidationRequest {
            accounts: pairs
                .iter()
                .map(|(account_number, bank_code)| AccountRef {
                    account_number,
                    bank_code,
                })
                .collect(),
        };
        self.http
            .post(format!("{}/api/v1/accounts/validate/bulk", self.base_url))
            .json(&request)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Match, Mock, MockServer, Request, ResponseTemplate};

    fn pair(account: &str, bank: &str) -> (String, String) {
        (account.to_string(), bank.to_string())
    }

    #[tokio::test]
    async fn test_validate_bulk_parses_results() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/accounts/validate/bulk"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "totalRequested": 2,
                "totalValid": 1,
                "totalInvalid": 1,
                "results": [
                    {
                        "accountNumber": "1234567890",
                        "bankCode": "BCA",
                        "accountName": "Budi Santoso",
                        "valid": true,
                        "status": "ACTIVE"
                    },
                    {
                        "accountNumber": "6677889900",
                        "bankCode": "CIMB",
                        "valid": false,
                        "status": "INACTIVE",
                        "reason": "account is inactive"
                    }
                ]
            })))
            .mount(&server)
            .await;

        let client = AccountServiceClient::new(&server.uri(), Duration::from_secs(1)).unwrap();
        let results = client
            .validate_bulk(&[pair("1234567890", "BCA"), pair("6677889900", "CIMB")])
            .await;

        assert_eq!(results.len(), 2);
        assert!(results[0].valid);
        assert_eq!(results[0].status, AccountState::Active);
        assert_eq!(results[0].account_name.as_deref(), Some("Budi Santoso"));
        assert!(!results[1].valid);
        assert_eq!(results[1].status, AccountState::Inactive);
    }

    #[tokio::test]
    async fn test_transport_failure_returns_empty() {
        let client =
            AccountServiceClient::new("http://127.0.0.1:9", Duration::from_millis(200)).unwrap();
        let results = client.validate_bulk(&[pair("1234567890", "BCA")]).await;
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_server_error_returns_empty() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let client = AccountServiceClient::new(&server.uri(), Duration::from_secs(1)).unwrap();
        let results = client.validate_bulk(&[pair("1234567890", "BCA")]).await;
        assert!(results.is_empty());
    }

    /// Matches when the request body carries exactly `expected` accounts
    struct AccountCount(usize);

    impl Match for AccountCount {
        fn matches(&self, request: &Request) -> bool {
            let body: serde_json::Value = match serde_json::from_slice(&request.body) {
                Ok(body) => body,
                Err(_) => return false,
            };
            body["accounts"].as_array().map(Vec::len) == Some(self.0)
        }
    }

    #[tokio::test]
    async fn test_oversized_request_is_truncated() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/accounts/validate/bulk"))
            .and(AccountCount(MAX_BULK_ACCOUNTS))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "totalRequested": 100,
                "totalValid": 0,
                "totalInvalid": 100,
                "results": []
            })))
            .expect(1)
            .mount(&server)
            .await;

        let pairs: Vec<(String, String)> = (0..150)
            .map(|i| pair(&format!("{:010}", i), "BCA"))
            .collect();

        let client = AccountServiceClient::new(&server.uri(), Duration::from_secs(1)).unwrap();
        let results = client.validate_bulk(&pairs).await;
        assert!(results.is_empty());
        server.verify().await;
    }

    #[tokio::test]
    async fn test_unknown_status_degrades_to_empty() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "totalRequested": 1,
                "totalValid": 0,
                "totalInvalid": 1,
                "results": [
                    {
                        "accountNumber": "1234567890",
                        "bankCode": "BCA",
                        "valid": false,
                        "status": "SUSPENDED"
                    }
                ]
            })))
            .mount(&server)
            .await;

        let client = AccountServiceClient::new(&server.uri(), Duration::from_secs(1)).unwrap();
        let results = client.validate_bulk(&[pair("1234567890", "BCA")]).await;
        assert!(results.is_empty());
    }
}
