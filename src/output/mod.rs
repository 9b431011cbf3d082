//! Dual-sink CSV output
//!
//! Every partition writes two files into the output directory:
//! `valid-p<i>-<ms>.csv` and `invalid-p<i>-<ms>.csv`, where `<ms>` is the
//! Unix-millisecond timestamp at open. Both start with a header line and
//! are truncated on open; re-running a job regenerates output from scratch.
//!
//! No quoting is applied. Input fields are comma-split on read, so they
//! cannot contain the delimiter, and the generated error reasons use `;`.

use crate::record::TransactionRecord;
use crate::Result;
use anyhow::Context;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

pub const VALID_HEADER: &str = "referenceId,sourceAccount,sourceAccountName,sourceBankCode,beneficiaryAccount,beneficiaryAccountName,beneficiaryBankCode,currency,amount,transactionType,note";
pub const INVALID_HEADER: &str = "referenceId,sourceAccount,sourceBankCode,beneficiaryAccount,beneficiaryBankCode,currency,amount,transactionType,validationErrors";

/// Paired valid/invalid sinks for one partition.
pub struct DualSinkWriter {
    valid: BufWriter<File>,
    invalid: BufWriter<File>,
    valid_path: PathBuf,
    invalid_path: PathBuf,
    valid_count: u64,
    invalid_count: u64,
}

impl DualSinkWriter {
    /// Create both sinks (truncating) and write their headers.
    pub fn open(output_dir: &Path, partition_index: usize) -> Result<Self> {
        let open_ms = crate::util::time::unix_millis();
        let valid_path = output_dir.join(format!("valid-p{}-{}.csv", partition_index, open_ms));
        let invalid_path = output_dir.join(format!("invalid-p{}-{}.csv", partition_index, open_ms));

        let mut valid = BufWriter::new(File::create(&valid_path).with_context(|| {
            format!("Failed to create output file {}", valid_path.display())
        })?);
        writeln!(valid, "{}", VALID_HEADER)
            .with_context(|| format!("Failed to write header to {}", valid_path.display()))?;

        let mut invalid = BufWriter::new(File::create(&invalid_path).with_context(|| {
            format!("Failed to create output file {}", invalid_path.display())
        })?);
        writeln!(invalid, "{}", INVALID_HEADER)
            .with_context(|| format!("Failed to write header to {}", invalid_path.display()))?;

        Ok(Self {
            valid,
            invalid,
            valid_path,
            invalid_path,
            valid_count: 0,
            invalid_count: 0,
        })
    }

    pub fn valid_path(&self) -> &Path {
        &self.valid_path
    }

    pub fn invalid_path(&self) -> &Path {
        &self.invalid_path
    }

    /// Append each record to exactly one sink, preserving chunk order.
    pub fn write(&mut self, records: &[TransactionRecord]) -> Result<()> {
        for record in records {
            if record.valid {
                writeln!(self.valid, "{}", valid_row(record)).with_context(|| {
                    format!("Failed to write to {}", self.valid_path.display())
                })?;
                self.valid_count += 1;
            } else {
                writeln!(self.invalid, "{}", invalid_row(record)).with_context(|| {
                    format!("Failed to write to {}", self.invalid_path.display())
                })?;
                self.invalid_count += 1;
            }
        }
        Ok(())
    }

    /// Flush and close both sinks, returning `(valid_count, invalid_count)`
    /// for this partition.
    pub fn close(mut self) -> Result<(u64, u64)> {
        self.valid
            .flush()
            .with_context(|| format!("Failed to flush {}", self.valid_path.display()))?;
        self.invalid
            .flush()
            .with_context(|| format!("Failed to flush {}", self.invalid_path.display()))?;
        Ok((self.valid_count, self.invalid_count))
    }
}

fn valid_row(record: &TransactionRecord) -> String {
    format!(
        "{},{},{},{},{},{},{},{},{},{},{}",
        record.reference_id,
        record.source_account,
        record.source_account_name,
        record.source_bank_code,
        record.beneficiary_account,
        record.beneficiary_account_name,
        record.beneficiary_bank_code,
        record.currency,
        record.canonical_amount(),
        record.transaction_type,
        record.note,
    )
}

fn invalid_row(record: &TransactionRecord) -> String {
    format!(
        "{},{},{},{},{},{},{},{},{}",
        record.reference_id,
        record.source_account,
        record.source_bank_code,
        record.beneficiary_account,
        record.beneficiary_bank_code,
        record.currency,
        record.canonical_amount(),
        record.transaction_type,
        record.validation_errors.as_deref().unwrap_or(""),
    )
}
