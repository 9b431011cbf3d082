//! Config lookup service client
//!
//! Answers two boolean questions: is a bank code recognised, and does an
//! amount meet the minimum for a transaction type.

use crate::client::{build_http_client, normalize_base_url};
use crate::Result;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BankCodeValidation {
    code: String,
    valid: bool,
    #[serde(default)]
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TransactionLimitValidation {
    transaction_type: String,
    amount: Decimal,
    valid: bool,
    #[serde(default)]
    message: Option<String>,
}

pub struct ConfigServiceClient {
    http: reqwest::Client,
    base_url: String,
}

impl ConfigServiceClient {
    pub fn new(base_url: &str, request_timeout: Duration) -> Result<Self> {
        Ok(Self {
            http: build_http_client(request_timeout)?,
            base_url: normalize_base_url(base_url),
        })
    }

    /// True when the service recognises `code`. Transport or remote failure
    /// maps to false.
    pub async fn is_bank_code_valid(&self, code: &str) -> bool {
        match self.fetch_bank_code_validation(code).await {
            Ok(validation) => {
                debug!(
                    code = %validation.code,
                    valid = validation.valid,
                    bank = validation.name.as_deref().unwrap_or("-"),
                    "bank code lookup"
                );
                validation.valid
            }
            Err(err) => {
                warn!(code, error = %err, "bank code lookup failed, treating code as invalid");
                false
            }
        }
    }

    /// True when `amount` meets the configured minimum for
    /// `transaction_type`. Transport or remote failure maps to false.
    pub async fn is_amount_valid(&self, transaction_type: &str, amount: Decimal) -> bool {
        match self.fetch_limit_validation(transaction_type, amount).await {
            Ok(validation) => {
                if !validation.valid {
                    debug!(
                        transaction_type = %validation.transaction_type,
                        amount = %validation.amount,
                        message = validation.message.as_deref().unwrap_or("-"),
                        "amount below minimum"
                    );
                }
                validation.valid
            }
            Err(err) => {
                warn!(
                    transaction_type,
                    %amount,
                    error = %err,
                    "transaction limit lookup failed, treating amount as invalid"
                );
                false
            }
        }
    }

    async fn fetch_bank_code_validation(&self, code: &str) -> reqwest::Result<BankCodeValidation> {
        let url = format!("{}/api/v1/config/bank-codes/{}/validate", self.base_url, code);
        self.http
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
    }

    async fn fetch_limit_validation(
        &self,
        transaction_type: &str,
        amount: Decimal,
    ) -> reqwest::Result<TransactionLimitValidation> {
        let url = format!(
            "{}/api/v1/config/transaction-limits/{}/validate",
            self.base_url, transaction_type
        );
        self.http
            .get(url)
            .query(&[("amount", amount.normalize().to_string())])
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
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn client_for(server: &MockServer) -> ConfigServiceClient {
        ConfigServiceClient::new(&server.uri(), Duration::from_secs(1)).unwrap()
    }

    #[tokio::test]
    async fn test_bank_code_valid() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/config/bank-codes/BCA/validate"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "code": "BCA",
                "valid": true,
                "name": "Bank Central Asia"
            })))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        assert!(client.is_bank_code_valid("BCA").await);
    }

    #[tokio::test]
    async fn test_bank_code_invalid() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/config/bank-codes/XENDIT/validate"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "code": "XENDIT",
                "valid": false
            })))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        assert!(!client.is_bank_code_valid("XENDIT").await);
    }

    #[tokio::test]
    async fn test_bank_code_server_error_is_negative() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        assert!(!client.is_bank_code_valid("BCA").await);
    }

    #[tokio::test]
    async fn test_bank_code_connection_failure_is_negative() {
        // Nothing listens here
        let client =
            ConfigServiceClient::new("http://127.0.0.1:9", Duration::from_millis(200)).unwrap();
        assert!(!client.is_bank_code_valid("BCA").await);
    }

    #[tokio::test]
    async fn test_amount_valid_sends_canonical_amount() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/config/transaction-limits/TRANSFER/validate"))
            .and(query_param("amount", "500000"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "transactionType": "TRANSFER",
                "amount": "500000",
                "valid": true
            })))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        assert!(
            client
                .is_amount_valid("TRANSFER", Decimal::from(500000))
                .await
        );
    }

    #[tokio::test]
    async fn test_amount_below_minimum() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/config/transaction-limits/TRANSFER/validate"))
            .and(query_param("amount", "5000"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "transactionType": "TRANSFER",
                "amount": "5000",
                "valid": false,
                "message": "minimum for TRANSFER is 10000"
            })))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        assert!(!client.is_amount_valid("TRANSFER", Decimal::from(5000)).await);
    }

    #[tokio::test]
    async fn test_amount_lookup_failure_is_negative() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        assert!(!client.is_amount_valid("UNKNOWN", Decimal::from(100)).await);
    }
}
