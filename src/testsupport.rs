//! Shared test fixtures: seeded downstream service stubs
//!
//! Mounts wiremock responders that mimic the two downstream services with
//! the canonical seed data used across validator and pipeline tests.

use rust_decimal::Decimal;
use std::str::FromStr;
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};
use wiremock::matchers::{method, path_regex};

/// Bank codes the config service recognises
pub const VALID_BANK_CODES: [&str; 10] = [
    "BCA", "BNI", "BRI", "MANDIRI", "CIMB", "DANAMON", "PERMATA", "BTN", "BSI", "OCBC",
];

/// (account, bank, name, status, valid)
const SEEDED_ACCOUNTS: [(&str, &str, &str, &str, bool); 6] = [
    ("1234567890", "BCA", "Budi Santoso", "ACTIVE", true),
    ("0987654321", "BNI", "Siti Rahayu", "ACTIVE", true),
    ("1122334455", "BRI", "Ahmad Yani", "ACTIVE", true),
    ("6677889900", "CIMB", "Rudi Hartono", "INACTIVE", false),
    ("3344556677", "PERMATA", "Dewi Lestari", "BLOCKED", false),
    ("4444555566", "BNI", "Andi Wijaya", "INACTIVE", false),
];

fn minimum_for(transaction_type: &str) -> Option<Decimal> {
    let minimum = match transaction_type {
        "TRANSFER" => 10_000,
        "PAYMENT" => 1_000,
        "TOPUP" => 10_000,
        "WITHDRAWAL" => 50_000,
        _ => return None,
    };
    Some(Decimal::from(minimum))
}

struct BankCodeResponder;

impl Respond for BankCodeResponder {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let segments: Vec<&str> = request.url.path().split('/').collect();
        // /api/v1/config/bank-codes/{code}/validate
        let code = segments[segments.len() - 2];
        let valid = VALID_BANK_CODES.contains(&code);
        ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "code": code,
            "valid": valid,
        }))
    }
}

struct TransactionLimitResponder;

impl Respond for TransactionLimitResponder {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let segments: Vec<&str> = request.url.path().split('/').collect();
        // /api/v1/config/transaction-limits/{type}/validate
        let transaction_type = segments[segments.len() - 2].to_string();
        let amount = request
            .url
            .query_pairs()
            .find(|(key, _)| key == "amount")
            .and_then(|(_, value)| Decimal::from_str(&value).ok())
            .unwrap_or(Decimal::ZERO);

        let valid = minimum_for(&transaction_type).is_some_and(|minimum| amount >= minimum);
        ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "transactionType": transaction_type,
            "amount": amount,
            "valid": valid,
        }))
    }
}

struct AccountBulkResponder;

impl Respond for AccountBulkResponder {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let body: serde_json::Value = match serde_json::from_slice(&request.body) {
            Ok(body) => body,
            Err(_) => return ResponseTemplate::new(400),
        };
        let accounts = body["accounts"].as_array().cloned().unwrap_or_default();

        let mut results = Vec::new();
        let mut total_valid = 0;
        for entry in &accounts {
            let account_number = entry["accountNumber"].as_str().unwrap_or_default();
            let bank_code = entry["bankCode"].as_str().unwrap_or_default();
            match SEEDED_ACCOUNTS
                .iter()
                .find(|(account, _, _, _, _)| *account == account_number)
            {
                Some((account, bank, name, status, valid)) => {
                    if *valid {
                        total_valid += 1;
                    }
                    results.push(serde_json::json!({
                        "accountNumber": account,
                        "bankCode": bank,
                        "accountName": name,
                        "valid": valid,
                        "status": status,
                    }));
                }
                None => results.push(serde_json::json!({
                    "accountNumber": account_number,
                    "bankCode": bank_code,
                    "valid": false,
                    "status": "NOT_FOUND",
                    "reason": "account not found",
                })),
            }
        }

        ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "totalRequested": accounts.len(),
            "totalValid": total_valid,
            "totalInvalid": accounts.len() - total_valid,
            "results": results,
        }))
    }
}

/// Mount the seeded config service (bank codes + transaction limits)
pub async fn mount_config_service(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path_regex(r"^/api/v1/config/bank-codes/[^/]+/validate$"))
        .respond_with(BankCodeResponder)
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path_regex(r"^/api/v1/config/transaction-limits/[^/]+/validate$"))
        .respond_with(TransactionLimitResponder)
        .mount(server)
        .await;
}

/// Mount the seeded account validation service
pub async fn mount_account_service(server: &MockServer) {
    Mock::given(method("POST"))
        .and(wiremock::matchers::path("/api/v1/accounts/validate/bulk"))
        .respond_with(AccountBulkResponder)
        .mount(server)
        .await;
}
