//! The data model shared by every strategy driver: transactions, blocks, and
//! the state addresses they touch.

/// A state address as it appears in a recorded trace.
pub type Address = String;

/// A single transaction as replayed by the harness. Addresses may repeat
/// within `reads` or `writes`; execution cost is a simulated duration, not a
/// real gas/cycle count.
#[derive(Debug, Clone)]
pub struct Transaction {
    pub block_id: String,
    pub hash: String,
    pub reads: Vec<Address>,
    pub writes: Vec<Address>,
    /// Simulated execution cost, in nanoseconds. Never negative.
    pub cost_nanos: i64,
}

impl Transaction {
    /// Iterates the transaction's read and write addresses, in that order,
    /// duplicates included. This is the address set used both to snapshot
    /// versions before speculative execution and to "warm" the state store
    /// in phase 2 of deOCC.
    pub fn touched_addresses(&self) -> impl Iterator<Item = &str> {
        self.reads.iter().chain(self.writes.iter()).map(String::as_str)
    }
}

/// A group of transactions sharing a block id, replayed together by a
/// strategy driver. Block ids are compared lexicographically as strings,
/// not numerically; the sort happens once, at ingestion time, in
/// `deocc_trace::load_trace`.
#[derive(Debug, Clone)]
pub struct Block {
    pub block_id: String,
    pub transactions: Vec<Transaction>,
}

impl Block {
    pub fn new(block_id: impl Into<String>, transactions: Vec<Transaction>) -> Self {
        Self {
            block_id: block_id.into(),
            transactions,
        }
    }

    pub fn total_cost_nanos(&self) -> i64 {
        self.transactions.iter().map(|t| t.cost_nanos).sum()
    }
}
