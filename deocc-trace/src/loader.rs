//! CSV trace ingestion: reads a recorded trace and groups it into blocks in
//! the order the harness's strategy drivers expect to replay them.

use std::collections::HashMap;
use std::path::Path;

use deocc_core::{Block, Transaction};
use serde::Deserialize;

use crate::error::TraceError;

/// One input row, addressed positionally rather than by header name: column
/// 0 is the block id, column 1 the transaction hash, column 2 an unused
/// notes field, columns 3 and 4 are tilde-separated read/write address
/// lists, column 5 is the execution cost.
#[derive(Debug, Deserialize)]
struct RawRecord(String, String, #[allow(dead_code)] String, String, String, String);

/// Loads a trace file and groups its transactions into blocks: first in the
/// order each block id is first seen, then sorted lexicographically by
/// block id (a plain string sort, not a numeric one, since block ids are not
/// assumed to be numeric).
pub fn load_trace(path: impl AsRef<Path>) -> Result<Vec<Block>, TraceError> {
    let path_ref = path.as_ref();
    let path_display = path_ref.display().to_string();
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path_ref)
        .map_err(|source| TraceError::Csv {
            path: path_display.clone(),
            source,
        })?;

    let mut order: Vec<String> = Vec::new();
    let mut by_block: HashMap<String, Vec<Transaction>> = HashMap::new();

    for (record_index, result) in reader.deserialize::<RawRecord>().enumerate() {
        let RawRecord(block_id, hash, _notes, reads_field, writes_field, cost_field) =
            result.map_err(|source| TraceError::Csv {
                path: path_display.clone(),
                source,
            })?;

        let cost_seconds: f64 = cost_field.trim().parse().map_err(|_| TraceError::MalformedCost {
            path: path_display.clone(),
            record: record_index,
            value: cost_field.clone(),
        })?;

        let tx = Transaction {
            block_id: block_id.clone(),
            hash: hash.trim().to_string(),
            reads: split_addresses(&reads_field),
            writes: split_addresses(&writes_field),
            cost_nanos: cost_seconds as i64,
        };

        by_block
            .entry(block_id.clone())
            .or_insert_with(|| {
                order.push(block_id);
                Vec::new()
            })
            .push(tx);
    }

    order.sort_unstable();
    Ok(order
        .into_iter()
        .map(|block_id| {
            let transactions = by_block.remove(&block_id).unwrap_or_default();
            Block::new(block_id, transactions)
        })
        .collect())
}

/// Splits a tilde-separated address list, stripping a single trailing empty
/// element produced by a trailing `~` (or an entirely empty field).
fn split_addresses(field: &str) -> Vec<String> {
    let mut parts: Vec<String> = field.trim().split('~').map(str::to_string).collect();
    if parts.last().map(String::is_empty).unwrap_or(false) {
        parts.pop();
    }
    parts
}
