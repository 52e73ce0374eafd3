//! Phase 2 of deOCC (and the validation phase of OCC-WSI): repeatedly
//! executes every current source vertex of a TDG in parallel, bounded by a
//! fixed-size worker pool, until at most one vertex is left. Completion is
//! tracked with an explicit bitset rather than a self-loop marker on the
//! matrix diagonal, so the source-set scan never needs to special-case it.

use parking_lot::RwLock;
use rayon::prelude::*;
use rayon::ThreadPool;
use std::time::Duration;

use crate::graph::AdjMatrix;
use crate::state::StateStore;
use crate::transaction::Transaction;

/// One wave: finds the current source set, runs it, and removes it from the
/// graph.
///
/// Terminates deliberately once the source set has at most one member: the
/// final lone vertex is left unexecuted, its cost already absorbed by phase
/// 1's warm-up. State writes are not committed here, phase 1 already did
/// that; this phase only reads addresses to simulate warm cache access.
pub fn run_waves(
    pool: &ThreadPool,
    graph: &RwLock<AdjMatrix>,
    completed: &RwLock<Vec<bool>>,
    transactions: &[Transaction],
    store: &StateStore,
) {
    loop {
        let sources = {
            let g = graph.read();
            let c = completed.read();
            g.source_vertices(&c)
        };
        if sources.len() <= 1 {
            break;
        }

        pool.install(|| {
            sources.par_iter().for_each(|&v| {
                let tx = &transactions[v];
                store.warm(tx.touched_addresses());
                std::thread::sleep(Duration::from_nanos(tx.cost_nanos.max(0) as u64));
                graph.write().remove_vertex(v);
                completed.write()[v] = true;
            });
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tx(cost: i64) -> Transaction {
        Transaction {
            block_id: "0".into(),
            hash: "h".into(),
            reads: vec![],
            writes: vec![],
            cost_nanos: cost,
        }
    }

    fn pool() -> ThreadPool {
        rayon::ThreadPoolBuilder::new().num_threads(4).build().unwrap()
    }

    #[test]
    fn single_vertex_never_runs() {
        let graph = RwLock::new(AdjMatrix::new(1));
        let completed = RwLock::new(vec![false; 1]);
        let txs = vec![tx(0)];
        let store = StateStore::new();
        run_waves(&pool(), &graph, &completed, &txs, &store);
        assert!(!completed.read()[0]);
    }

    #[test]
    fn two_independent_chains_run_wave_by_wave() {
        // 2 depends on 0, 3 depends on 1: first wave's sources are {0, 1},
        // second wave's are {2, 3}. Both waves have size 2, so both run to
        // completion; the loop then sees an empty source set and stops.
        let mut g = AdjMatrix::new(4);
        g.add_edge(2, 0);
        g.add_edge(3, 1);
        let graph = RwLock::new(g);
        let completed = RwLock::new(vec![false; 4]);
        let txs = vec![tx(0), tx(0), tx(0), tx(0)];
        let store = StateStore::new();
        run_waves(&pool(), &graph, &completed, &txs, &store);
        assert!(completed.read().iter().all(|&c| c));
    }

    #[test]
    fn lone_source_is_left_for_phase_one_to_have_already_paid_for() {
        // 1 depends on 0: the only source at the start is {0}, size 1, so
        // the wave executor exits immediately without running anything.
        let mut g = AdjMatrix::new(2);
        g.add_edge(1, 0);
        let graph = RwLock::new(g);
        let completed = RwLock::new(vec![false; 2]);
        let txs = vec![tx(0), tx(0)];
        let store = StateStore::new();
        run_waves(&pool(), &graph, &completed, &txs, &store);
        assert!(!completed.read()[0]);
        assert!(!completed.read()[1]);
    }

    #[test]
    fn empty_graph_terminates_immediately() {
        let graph = RwLock::new(AdjMatrix::new(0));
        let completed = RwLock::new(vec![]);
        let txs: Vec<Transaction> = vec![];
        let store = StateStore::new();
        run_waves(&pool(), &graph, &completed, &txs, &store);
    }
}
