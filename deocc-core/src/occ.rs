//! The OCC attempt loop: phase 1 of deOCC, and the entirety of OCC-WSI.
//! Drives repeated barrier-synchronized rounds until every transaction in
//! the block has committed. A conflicting attempt is never an error, it is
//! silently retried in the next round.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use parking_lot::RwLock;
use rayon::prelude::*;
use rayon::ThreadPool;

use crate::graph::AdjMatrix;
use crate::state::StateStore;
use crate::transaction::Transaction;

/// Runs the OCC attempt loop to completion: every transaction in
/// `transactions` has committed by the time this returns. Because any
/// non-conflicting transaction commits in its first successful round and
/// commits are monotone, the loop makes progress every round it isn't
/// already done, so it terminates in at most `transactions.len()` rounds.
///
/// When `dynamic_tdg` is `Some`, a successful commit of `i` adds an edge
/// `i -> j` for every already-committed `j` whose writes overlap `i`'s
/// touched addresses, OCC-WSI's dynamic TDG construction. Edges only ever
/// point from a later commit to an earlier one, so the graph stays acyclic
/// across concurrent commits by construction. When `None` (deOCC phase 1),
/// no graph is built; the loop exists purely to warm the state store.
pub fn run_occ_rounds(
    pool: &ThreadPool,
    store: &StateStore,
    transactions: &[Transaction],
    dynamic_tdg: Option<&RwLock<AdjMatrix>>,
) {
    let n = transactions.len();
    let finished: Vec<AtomicBool> = (0..n).map(|_| AtomicBool::new(false)).collect();
    let write_sets: Vec<HashSet<&str>> = transactions
        .iter()
        .map(|t| t.writes.iter().map(String::as_str).collect())
        .collect();

    loop {
        let pending: Vec<usize> = (0..n).filter(|&i| !finished[i].load(Ordering::Acquire)).collect();
        if pending.is_empty() {
            break;
        }

        pool.install(|| {
            pending.par_iter().for_each(|&i| {
                let tx = &transactions[i];
                let snapshot = store.snapshot_versions(tx.touched_addresses());
                std::thread::sleep(Duration::from_nanos(tx.cost_nanos.max(0) as u64));
                if !store.versions_unchanged(&snapshot) {
                    return;
                }
                store.commit(tx.writes.iter().map(String::as_str));

                if let Some(tdg) = dynamic_tdg {
                    let touched: HashSet<&str> = tx.touched_addresses().collect();
                    let mut graph = tdg.write();
                    for j in 0..n {
                        if j == i || !finished[j].load(Ordering::Acquire) {
                            continue;
                        }
                        if write_sets[j].iter().any(|a| touched.contains(a)) {
                            graph.add_edge(i, j);
                        }
                    }
                }

                finished[i].store(true, Ordering::Release);
            });
        });
    }
}
