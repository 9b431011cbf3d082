//! Line-range partitioning
//!
//! Splits the data-line range of an input file into up to `grid_size`
//! contiguous, disjoint partitions. Line 1 is always the header, so data
//! lines occupy `[2, total_rows + 1]`.

/// A contiguous range of data lines assigned to one worker.
///
/// Lines are 1-based and inclusive on both ends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Partition {
    pub index: usize,
    pub start_line: u64,
    pub end_line: u64,
}

impl Partition {
    /// Number of data lines in this partition
    pub fn len(&self) -> u64 {
        self.end_line - self.start_line + 1
    }

    pub fn is_empty(&self) -> bool {
        self.end_line < self.start_line
    }

    /// Step name used for bookkeeping and status reporting
    pub fn step_name(&self) -> String {
        format!("partition-{}", self.index)
    }
}

/// Split `total_rows` data lines into at most `grid_size` partitions.
///
/// Each partition holds `ceil(total_rows / grid_size)` lines except possibly
/// the last. Empty partitions are elided, so fewer than `grid_size`
/// partitions come back when `total_rows < grid_size`. Deterministic for a
/// fixed input.
pub fn partition(total_rows: u64, grid_size: usize) -> Vec<Partition> {
    if total_rows == 0 || grid_size == 0 {
        return Vec::new();
    }

    let grid = grid_size as u64;
    let per_partition = (total_rows + grid - 1) / grid;
    let last_data_line = total_rows + 1;

    let mut partitions = Vec::with_capacity(grid_size);
    for index in 0..grid_size {
        let start_line = 2 + index as u64 * per_partition;
        if start_line > last_data_line {
            break;
        }
        let end_line = (start_line + per_partition - 1).min(last_data_line);
        partitions.push(Partition {
            index,
            start_line,
            end_line,
        });
    }
    partitions
}
