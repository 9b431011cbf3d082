//! Delimited input reading
//!
//! Each partition worker owns one [`PartitionReader`]: a single-use cursor
//! over its assigned line range. Opening the reader skips everything before
//! the range (including the line-1 header); `read_chunk` then parses up to
//! `chunk_size` records per call.
//!
//! Unparseable lines (wrong column count) are skipped and counted, not
//! fatal. IO errors are fatal to the owning step.

use crate::partition::Partition;
use crate::record::TransactionRecord;
use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::Path;
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
pub enum ReaderError {
    #[error("failed to open input file {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to read input line {line}: {source}")]
    Read {
        line: u64,
        #[source]
        source: std::io::Error,
    },
}

/// Records parsed from one read cycle plus the number of unparseable lines
/// skipped while producing them.
#[derive(Debug)]
pub struct Chunk {
    pub records: Vec<TransactionRecord>,
    pub skipped: u64,
}

impl Chunk {
    /// True once the reader produced nothing at all for this cycle
    pub fn is_empty(&self) -> bool {
        self.records.is_empty() && self.skipped == 0
    }
}

/// Single-use reader over one partition's line range.
pub struct PartitionReader {
    lines: Lines<BufReader<File>>,
    /// 1-based number of the next line to consume
    next_line: u64,
    end_line: u64,
}

impl PartitionReader {
    /// Open the input and position the cursor on the partition's first line.
    ///
    /// A file shorter than the partition start is not an error; subsequent
    /// reads simply produce nothing.
    pub fn open(path: &Path, partition: &Partition) -> Result<Self, ReaderError> {
        let file = File::open(path).map_err(|source| ReaderError::Open {
            path: path.display().to_string(),
            source,
        })?;
        let mut lines = BufReader::new(file).lines();

        for line in 1..partition.start_line {
            match lines.next() {
                Some(Ok(_)) => {}
                Some(Err(source)) => return Err(ReaderError::Read { line, source }),
                None => break,
            }
        }

        Ok(Self {
            lines,
            next_line: partition.start_line,
            end_line: partition.end_line,
        })
    }

    /// Read and parse up to `max_records` records.
    ///
    /// Stops at the partition boundary or end of file. The returned chunk is
    /// empty once the range is exhausted.
    pub fn read_chunk(&mut self, max_records: usize) -> Result<Chunk, ReaderError> {
        let mut records = Vec::with_capacity(max_records);
        let mut skipped = 0;

        while records.len() < max_records && self.next_line <= self.end_line {
            let line = match self.lines.next() {
                Some(Ok(line)) => line,
                Some(Err(source)) => {
                    return Err(ReaderError::Read {
                        line: self.next_line,
                        source,
                    })
                }
                None => break,
            };
            let line_number = self.next_line;
            self.next_line += 1;

            match TransactionRecord::parse_line(&line) {
                Ok(record) => records.push(record),
                Err(err) => {
                    skipped += 1;
                    warn!(line = line_number, error = %err, "skipping unparseable line");
                }
            }
        }

        Ok(Chunk { records, skipped })
    }
}
