//! CIDR reduction.
//!
//! Reduces a collection of address blocks to the blocks that are not
//! covered by a wider block starting at or before them. Blocks are
//! partitioned by family first and never compared across families.
//!
//! Within a family the blocks are sorted by start address, only the
//! widest block per start is kept, and a left-to-right sweep absorbs every
//! block that starts inside the current run. A run's representative is the
//! first block of the run; absorbed blocks are dropped with their payload.
//! A block starting exactly where the current run ends begins a new run.

use std::io::{BufRead, Write};

use crate::address::{CanonicalAddress, Family};
use crate::tsv::{first_column, read_rows, TsvWriter};
use crate::Result;

/// An address block with the row it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressBlock<T> {
    pub address: CanonicalAddress,
    pub payload: T,
}

impl<T> AddressBlock<T> {
    pub fn new(address: CanonicalAddress, payload: T) -> Self {
        Self { address, payload }
    }
}

/// Compute the minimal spanning set of `blocks`.
///
/// IPv4 blocks are returned before IPv6 blocks, each in ascending order.
pub fn reduce<T>(blocks: impl IntoIterator<Item = AddressBlock<T>>) -> Vec<AddressBlock<T>> {
    let (v4, v6): (Vec<_>, Vec<_>) = blocks
        .into_iter()
        .partition(|b| b.address.family == Family::V4);

    let mut reduced = sweep(v4);
    reduced.extend(sweep(v6));
    reduced
}

/// Reduce blocks of a single family.
fn sweep<T>(mut blocks: Vec<AddressBlock<T>>) -> Vec<AddressBlock<T>> {
    // Stable: equal (start, prefix) blocks keep input order
    blocks.sort_by_key(|b| (b.address.start, b.address.prefix_len));
    blocks.dedup_by_key(|b| b.address.start);

    let mut reduced = Vec::new();
    let mut iter = blocks.into_iter();
    let Some(mut run) = iter.next() else {
        return reduced;
    };
    let mut run_last = run.address.last();

    for block in iter {
        if block.address.start <= run_last {
            continue;
        }
        run_last = block.address.last();
        reduced.push(std::mem::replace(&mut run, block));
    }

    reduced.push(run);
    reduced
}

/// Counters for one TSV reduction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReduceSummary {
    /// Rows read
    pub rows_in: usize,
    /// Rows skipped because the prefix did not canonicalize
    pub rows_skipped: usize,
    /// Rows written
    pub rows_out: usize,
}

/// Reduce a TSV stream of records, writing the surviving rows unchanged.
pub fn reduce_tsv<R: BufRead, W: Write>(input: R, output: W) -> Result<ReduceSummary> {
    let mut summary = ReduceSummary::default();
    let mut blocks = Vec::new();

    for row in read_rows(input) {
        let row = row?;
        summary.rows_in += 1;
        match CanonicalAddress::parse(first_column(&row)) {
            Ok(address) => blocks.push(AddressBlock::new(address, row)),
            Err(e) => {
                summary.rows_skipped += 1;
                log::warn!("Skipping row {}: {}", summary.rows_in, e);
            }
        }
    }

    let mut writer = TsvWriter::new(output);
    for block in reduce(blocks) {
        writer.write_line(&block.payload)?;
    }
    writer.flush()?;

    summary.rows_out = writer.rows();
    log::info!(
        "Reduced {} rows to {} blocks ({} skipped)",
        summary.rows_in,
        summary.rows_out,
        summary.rows_skipped
    );
    Ok(summary)
}
