//! Static conflict-graph construction: an edge i -> j means transaction i
//! must not be reordered before j has taken effect, because i reads
//! something j writes, or they write the same address.

use std::collections::HashSet;

use crate::graph::AdjMatrix;
use crate::transaction::Transaction;

/// Builds the conflict graph for a block of transactions. For every ordered
/// pair (i, j), i != j: an edge i -> j is added if i's reads intersect j's
/// writes, or i's writes intersect j's writes. Read/read overlap is ignored.
/// Complexity is O(n^2 * l) where l is the average address-set size, using a
/// per-transaction write-set for O(1) membership checks.
pub fn build_conflict_graph(transactions: &[Transaction]) -> AdjMatrix {
    let n = transactions.len();
    let mut graph = AdjMatrix::new(n);
    let write_sets: Vec<HashSet<&str>> = transactions
        .iter()
        .map(|t| t.writes.iter().map(String::as_str).collect())
        .collect();

    for i in 0..n {
        for j in 0..n {
            if i == j {
                continue;
            }
            let reads_after_writes = transactions[i]
                .reads
                .iter()
                .any(|r| write_sets[j].contains(r.as_str()));
            let write_write = transactions[i]
                .writes
                .iter()
                .any(|w| write_sets[j].contains(w.as_str()));
            if reads_after_writes || write_write {
                graph.add_edge(i, j);
            }
        }
    }
    graph
}
