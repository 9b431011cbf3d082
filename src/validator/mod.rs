//! Record validation pipeline
//!
//! Runs the four checks for one record and attaches the verdict:
//!
//! 1. source bank code recognised
//! 2. beneficiary bank code recognised
//! 3. amount meets the minimum for the transaction type
//! 4. both accounts valid (one bulk call)
//!
//! Checks 1-3 are short config lookups issued sequentially on the current
//! task under the config semaphore bulkhead. Check 4 dominates latency, so
//! it is dispatched to the pool bulkhead *before* check 1 starts and joined
//! after check 3 returns; record wall time is roughly
//! `max(3 x config call, account call)` while the pool has capacity.
//!
//! All failing checks contribute a reason; the validator never
//! short-circuits on the first failure. Reasons accumulate in check order:
//! 1, 2, 3, then source account, then beneficiary account.

use crate::bulkhead::{BulkheadError, PoolBulkhead, SemaphoreBulkhead};
use crate::client::{AccountServiceClient, AccountStatus, ConfigServiceClient};
use crate::record::TransactionRecord;
use std::collections::HashMap;
use std::sync::Arc;

const BULKHEAD_FULL_REASON: &str = "validation could not be performed (bulkhead full)";
const NO_RESULTS_REASON: &str = "account validation service returned no results";
const INTERRUPTED_REASON: &str = "validation interrupted";

/// Whether the validator ran to completion for this record.
///
/// `Interrupted` still leaves a verdict on the record; the worker should
/// stop after the current chunk and mark its step failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationOutcome {
    Completed,
    Interrupted,
}

/// Orchestrates the four checks for one record under the two bulkheads.
pub struct RecordValidator {
    config_client: Arc<ConfigServiceClient>,
    account_client: Arc<AccountServiceClient>,
    config_bulkhead: Arc<SemaphoreBulkhead>,
    account_pool: Arc<PoolBulkhead>,
}

impl RecordValidator {
    pub fn new(
        config_client: Arc<ConfigServiceClient>,
        account_client: Arc<AccountServiceClient>,
        config_bulkhead: Arc<SemaphoreBulkhead>,
        account_pool: Arc<PoolBulkhead>,
    ) -> Self {
        Self {
            config_client,
            account_client,
            config_bulkhead,
            account_pool,
        }
    }

    /// Validate one record in place, attaching `valid` and
    /// `validation_errors`.
    pub async fn validate(&self, record: &mut TransactionRecord) -> ValidationOutcome {
        let mut reasons: Vec<String> = Vec::new();
        let mut outcome = ValidationOutcome::Completed;

        // Dispatch the account check before the config checks so both run
        // concurrently; joined after check 3.
        let account_future = {
            let client = Arc::clone(&self.account_client);
            let pairs = vec![
                (record.source_account.clone(), record.source_bank_code.clone()),
                (
                    record.beneficiary_account.clone(),
                    record.beneficiary_bank_code.clone(),
                ),
            ];
            self.account_pool
                .submit(async move { client.validate_bulk(&pairs).await })
        };

        // Checks 1-3 hold one permit each for the duration of their own
        // call. A full semaphore replaces the failing check's reason and
        // aborts the remaining config checks; earlier reasons are kept.
        let mut config_aborted = false;

        match self
            .config_bulkhead
            .with_permit(self.config_client.is_bank_code_valid(&record.source_bank_code))
            .await
        {
            Ok(true) => {}
            Ok(false) => reasons.push(format!(
                "sourceBankCode '{}' is not a recognised bank code",
                record.source_bank_code
            )),
            Err(BulkheadError::Full) => {
                reasons.push(BULKHEAD_FULL_REASON.to_string());
                config_aborted = true;
            }
            Err(BulkheadError::Interrupted) => {
                reasons.push(INTERRUPTED_REASON.to_string());
                outcome = ValidationOutcome::Interrupted;
                config_aborted = true;
            }
        }

        if !config_aborted {
            match self
                .config_bulkhead
                .with_permit(
                    self.config_client
                        .is_bank_code_valid(&record.beneficiary_bank_code),
                )
                .await
            {
                Ok(true) => {}
                Ok(false) => reasons.push(format!(
                    "beneficiaryBankCode '{}' is not a recognised bank code",
                    record.beneficiary_bank_code
                )),
                Err(BulkheadError::Full) => {
                    reasons.push(BULKHEAD_FULL_REASON.to_string());
                    config_aborted = true;
                }
                Err(BulkheadError::Interrupted) => {
                    reasons.push(INTERRUPTED_REASON.to_string());
                    outcome = ValidationOutcome::Interrupted;
                    config_aborted = true;
                }
            }
        }

        if !config_aborted {
            match self
                .config_bulkhead
                .with_permit(
                    self.config_client
                        .is_amount_valid(&record.transaction_type, record.amount),
                )
                .await
            {
                Ok(true) => {}
                Ok(false) => reasons.push(format!(
                    "amount {} is below the minimum for {}",
                    record.canonical_amount(),
                    record.transaction_type
                )),
                Err(BulkheadError::Full) => reasons.push(BULKHEAD_FULL_REASON.to_string()),
                Err(BulkheadError::Interrupted) => {
                    reasons.push(INTERRUPTED_REASON.to_string());
                    outcome = ValidationOutcome::Interrupted;
                }
            }
        }

        match account_future {
            Ok(pending) => match pending.join().await {
                Ok(results) => apply_account_results(record, &results, &mut reasons),
                Err(_) => {
                    reasons.push(INTERRUPTED_REASON.to_string());
                    outcome = ValidationOutcome::Interrupted;
                }
            },
            Err(BulkheadError::Full) => reasons.push(BULKHEAD_FULL_REASON.to_string()),
            Err(BulkheadError::Interrupted) => {
                reasons.push(INTERRUPTED_REASON.to_string());
                outcome = ValidationOutcome::Interrupted;
            }
        }

        if !reasons.is_empty() {
            record.valid = false;
            record.validation_errors = Some(reasons.join("; "));
        }
        outcome
    }
}

/// Fold the bulk response into failure reasons for the two accounts, source
/// first. The response may reorder or duplicate results, so it is indexed
/// by account number with the first occurrence winning; `valid` is
/// authoritative even when the status is not ACTIVE.
fn apply_account_results(
    record: &TransactionRecord,
    results: &[AccountStatus],
    reasons: &mut Vec<String>,
) {
    if results.is_empty() {
        reasons.push(NO_RESULTS_REASON.to_string());
        return;
    }

    let mut by_account: HashMap<&str, &AccountStatus> = HashMap::new();
    for status in results {
        by_account.entry(status.account_number.as_str()).or_insert(status);
    }

    let lookups = [
        ("sourceAccount", &record.source_account),
        ("beneficiaryAccount", &record.beneficiary_account),
    ];
    for (label, account) in lookups {
        match by_account.get(account.as_str()) {
            Some(status) if status.valid => {}
            Some(status) => reasons.push(format!(
                "{} '{}' is invalid ({})",
                label, account, status.status
            )),
            None => reasons.push(format!("{} '{}' is invalid (NOT_FOUND)", label, account)),
        }
    }
}
