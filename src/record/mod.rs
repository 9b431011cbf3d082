//! Transaction record model
//!
//! In-memory representation of one input row plus the validation verdict
//! attached by the validator. Records are born in the reader, mutated exactly
//! once by the validator, and die at the writer.

use rust_decimal::Decimal;
use std::str::FromStr;
use thiserror::Error;

/// Field delimiter for input and output rows
pub const FIELD_DELIMITER: char = ',';

/// Columns in a full input row; the last column (note) is optional
pub const MAX_COLUMNS: usize = 11;
const MIN_COLUMNS: usize = 10;

/// Raised for rows that cannot be mapped onto the fixed column layout.
///
/// A malformed amount is NOT a parse error; it degrades to zero and fails
/// the minimum-amount check downstream.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RecordParseError {
    #[error("expected {MIN_COLUMNS} or {MAX_COLUMNS} columns, got {0}")]
    ColumnCount(usize),
}

/// One transaction row with its validation verdict.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionRecord {
    pub reference_id: String,
    pub source_account: String,
    pub source_account_name: String,
    pub source_bank_code: String,
    pub beneficiary_account: String,
    pub beneficiary_account_name: String,
    pub beneficiary_bank_code: String,
    pub currency: String,
    pub amount: Decimal,
    pub transaction_type: String,
    pub note: String,
    /// Verdict: true until the validator finds a failing check
    pub valid: bool,
    /// `"; "`-joined failure reasons, `None` while `valid`
    pub validation_errors: Option<String>,
}

impl TransactionRecord {
    /// Parse one data row. Fields are trimmed; a 10-column row parses with an
    /// empty note. Amount parse failure (or a negative amount) substitutes
    /// zero instead of failing the row.
    pub fn parse_line(line: &str) -> Result<Self, RecordParseError> {
        let fields: Vec<&str> = line.split(FIELD_DELIMITER).map(str::trim).collect();
        if fields.len() < MIN_COLUMNS || fields.len() > MAX_COLUMNS {
            return Err(RecordParseError::ColumnCount(fields.len()));
        }

        let amount = Decimal::from_str(fields[8])
            .ok()
            .filter(|a| !a.is_sign_negative())
            .unwrap_or(Decimal::ZERO);

        Ok(Self {
            reference_id: fields[0].to_string(),
            source_account: fields[1].to_string(),
            source_account_name: fields[2].to_string(),
            source_bank_code: fields[3].to_string(),
            beneficiary_account: fields[4].to_string(),
            beneficiary_account_name: fields[5].to_string(),
            beneficiary_bank_code: fields[6].to_string(),
            currency: fields[7].to_string(),
            amount,
            transaction_type: fields[9].to_string(),
            note: fields.get(10).unwrap_or(&"").to_string(),
            valid: true,
            validation_errors: None,
        })
    }

    /// Canonical decimal rendering: no scientific notation, no thousands
    /// separators, no trailing fractional zeros.
    pub fn canonical_amount(&self) -> String {
        self.amount.normalize().to_string()
    }
}
