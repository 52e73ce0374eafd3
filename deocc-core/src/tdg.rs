//! Transaction dependency graph construction: a reachability-sound acyclic
//! approximation of a static conflict graph, built by repeatedly extracting
//! a feedback vertex set and layering the rest into ranks.

use crate::error::CoreError;
use crate::fvs::greedy_fvs;
use crate::graph::AdjMatrix;
use crate::partition::{cut_inter_partition_edges, partition_transactions};
use crate::transaction::Transaction;

pub struct TdgResult {
    pub graph: AdjMatrix,
    pub need_rw: u64,
    /// Informational only: logged, never part of a strategy's reported
    /// output.
    pub max_reachable_subgraph_size: usize,
}

/// Builds the acyclic, reachability-sound TDG for a static conflict graph.
///
/// Each outer iteration extracts a feedback vertex set F from the current
/// residual graph W. Non-F vertices are promoted ("ranked"): edges among the
/// F-removed residual become within-rank TDG edges, and every not-yet-ranked
/// non-F vertex gets an edge to every already-ranked vertex, forcing later
/// ranks to wait on earlier ones. The loop terminates the first time F comes
/// back empty, which also ranks everything left in one final rank (the
/// "already acyclic" fast path).
pub fn build_tdg(cg: &AdjMatrix) -> Result<AdjMatrix, CoreError> {
    let n = cg.len();
    let mut tdg = AdjMatrix::new(n);
    let mut ranked = vec![false; n];
    let mut residual = cg.clone();

    loop {
        let fvs = greedy_fvs(&residual);
        let any_in_fvs = fvs.iter().any(|&b| b);

        let mut without_fvs = residual.clone();
        for (v, &removed) in fvs.iter().enumerate() {
            if removed {
                without_fvs.remove_vertex(v);
            }
        }
        for i in 0..n {
            for j in 0..n {
                if without_fvs.has_edge(i, j) {
                    tdg.add_edge(i, j);
                }
            }
        }

        for v in 0..n {
            if !fvs[v] && !ranked[v] {
                for u in 0..n {
                    if ranked[u] {
                        tdg.add_edge(v, u);
                    }
                }
            }
        }
        for v in 0..n {
            if !fvs[v] && !ranked[v] {
                ranked[v] = true;
                residual.remove_vertex(v);
            }
        }

        if !any_in_fvs {
            break;
        }
    }

    let ranked_count = ranked.iter().filter(|&&b| b).count();
    if ranked_count != n {
        return Err(CoreError::UnrankedVertices {
            ranked: ranked_count,
            total: n,
        });
    }

    Ok(tdg)
}

/// Runs the full TDG pipeline for a block: layering, redundant-edge removal,
/// and weight-based partitioning with inter-partition edge cutting.
pub fn build_and_partition(cg: &AdjMatrix, transactions: &[Transaction]) -> Result<TdgResult, CoreError> {
    let mut graph = build_tdg(cg)?;
    let max_reachable_subgraph_size = graph.max_reachable_subgraph_size();
    graph.remove_redundant_edges();

    let costs: Vec<i64> = transactions.iter().map(|t| t.cost_nanos).collect();
    let total_cost: i64 = costs.iter().sum();
    let threshold = total_cost / 20;
    let partitions = partition_transactions(&graph, &costs, threshold);
    let write_counts: Vec<usize> = transactions.iter().map(|t| t.writes.len()).collect();
    let need_rw = cut_inter_partition_edges(&mut graph, &partitions, &write_counts);

    Ok(TdgResult {
        graph,
        need_rw,
        max_reachable_subgraph_size,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conflict::build_conflict_graph;

    fn tx(reads: &[&str], writes: &[&str], cost: i64) -> Transaction {
        Transaction {
            block_id: "0".into(),
            hash: format!("{reads:?}{writes:?}{cost}"),
            reads: reads.iter().map(|s| s.to_string()).collect(),
            writes: writes.iter().map(|s| s.to_string()).collect(),
            cost_nanos: cost,
        }
    }

    #[test]
    fn tdg_of_acyclic_conflict_graph_is_a_fast_path() {
        let mut cg = AdjMatrix::new(2);
        cg.add_edge(1, 0);
        let tdg = build_tdg(&cg).unwrap();
        assert!(tdg.has_edge(1, 0));
        assert!(tdg.is_dag());
    }

    #[test]
    fn tdg_is_always_acyclic() {
        let txs = vec![
            tx(&["x"], &["y"], 1),
            tx(&["y"], &["z"], 1),
            tx(&["z"], &["x"], 1),
        ];
        let cg = build_conflict_graph(&txs);
        let tdg = build_tdg(&cg).unwrap();
        assert!(tdg.is_dag());
    }

    #[test]
    fn every_tdg_edge_is_sound_wrt_conflict_graph_reachability() {
        // Every TDG edge i->j must correspond to *some* conflict relation
        // reachable in the original CG between i and j (soundness, not
        // necessarily a direct CG edge, since layering can add rank edges).
        let txs = vec![
            tx(&["x"], &["y"], 1),
            tx(&["y"], &["z"], 1),
            tx(&["z"], &["x"], 1),
            tx(&[], &["w"], 1),
        ];
        let cg = build_conflict_graph(&txs);
        let tdg = build_tdg(&cg).unwrap();
        let cg_closure = cg.transitive_closure();
        for i in 0..txs.len() {
            for j in 0..txs.len() {
                if tdg.has_edge(i, j) {
                    assert!(cg.has_edge(i, j) || cg_closure.has_edge(i, j) || cg_closure.has_edge(j, i));
                }
            }
        }
    }

    #[test]
    fn dominated_edge_is_removed() {
        let mut g = AdjMatrix::new(4);
        g.add_edge(0, 1);
        g.add_edge(1, 2);
        g.add_edge(0, 2);
        g.add_edge(2, 3);
        g.remove_redundant_edges();
        assert!(g.has_edge(0, 1));
        assert!(g.has_edge(1, 2));
        assert!(g.has_edge(2, 3));
        assert!(!g.has_edge(0, 2));
    }

    #[test]
    fn independent_transactions_need_no_cutting() {
        let txs: Vec<Transaction> = (0..10).map(|i| tx(&[], &[&format!("a{i}")], 100)).collect();
        let cg = build_conflict_graph(&txs);
        let result = build_and_partition(&cg, &txs).unwrap();
        assert_eq!(result.need_rw, 0); // no conflicts, nothing to cut
    }

    #[test]
    fn hotspot_chain_cut_reports_need_rw() {
        // Every transaction writes the same address: after FVS + layering
        // the TDG reduces to a single chain. With a tiny threshold every
        // vertex lands in its own partition, so every chain edge is cut and
        // needRW sums the single write of each edge's target.
        let txs: Vec<Transaction> = (0..4).map(|_| tx(&[], &["h"], 100)).collect();
        let cg = build_conflict_graph(&txs);
        let result = build_and_partition(&cg, &txs).unwrap();
        assert!(result.graph.len() == 4);
        // threshold = 400/20 = 20, smaller than any single transaction's
        // cost, so every transaction is alone in its partition.
        let edges_before_cut = {
            let mut g = build_tdg(&cg).unwrap();
            g.remove_redundant_edges();
            (0..4)
                .flat_map(|i| (0..4).map(move |j| (i, j)))
                .filter(|&(i, j)| g.has_edge(i, j))
                .count()
        };
        assert_eq!(result.need_rw, edges_before_cut as u64); // each target has exactly one write
        for i in 0..4 {
            for j in 0..4 {
                assert!(!result.graph.has_edge(i, j)); // all cross-partition edges cut
            }
        }
    }

    #[test]
    fn empty_block_produces_empty_tdg() {
        let cg = AdjMatrix::new(0);
        let tdg = build_tdg(&cg).unwrap();
        assert_eq!(tdg.len(), 0);
    }

    use proptest::prelude::*;
    use proptest_derive::Arbitrary;

    /// A synthetic transaction touching a small, shared pool of addresses,
    /// small enough that conflicts (and cycles) show up often, which is the
    /// point: the TDG invariants below must hold even under heavy contention.
    #[derive(Debug, Clone, Arbitrary)]
    struct SyntheticTx {
        #[proptest(strategy = "0u8..4")]
        write_addr: u8,
        #[proptest(strategy = "prop::collection::vec(0u8..4, 0..3)")]
        read_addrs: Vec<u8>,
    }

    fn to_transactions(txs: &[SyntheticTx]) -> Vec<Transaction> {
        txs.iter()
            .enumerate()
            .map(|(i, t)| Transaction {
                block_id: "0".into(),
                hash: format!("synthetic{i}"),
                reads: t.read_addrs.iter().map(|a| format!("a{a}")).collect(),
                writes: vec![format!("a{}", t.write_addr)],
                cost_nanos: 0,
            })
            .collect()
    }

    proptest! {
        /// §8's "TDG acyclicity" and "TDG edge soundness" invariants, checked
        /// against randomly generated contention patterns rather than the
        /// handful of fixed scenarios above.
        #[test]
        fn tdg_is_acyclic_and_sound_for_arbitrary_contention(txs in prop::collection::vec(any::<SyntheticTx>(), 1..12)) {
            let transactions = to_transactions(&txs);
            let cg = build_conflict_graph(&transactions);
            let tdg = build_tdg(&cg).unwrap();
            prop_assert!(tdg.is_dag());

            let closure = cg.transitive_closure();
            for i in 0..transactions.len() {
                for j in 0..transactions.len() {
                    if tdg.has_edge(i, j) {
                        prop_assert!(cg.has_edge(i, j) || closure.has_edge(i, j) || closure.has_edge(j, i));
                    }
                }
            }
        }

        /// §8's "redundant-edge removal idempotence" invariant.
        #[test]
        fn redundant_edge_removal_is_idempotent_for_arbitrary_contention(txs in prop::collection::vec(any::<SyntheticTx>(), 1..12)) {
            let transactions = to_transactions(&txs);
            let cg = build_conflict_graph(&transactions);
            let mut tdg = build_tdg(&cg).unwrap();
            tdg.remove_redundant_edges();
            let once = tdg.clone();
            tdg.remove_redundant_edges();
            for i in 0..transactions.len() {
                for j in 0..transactions.len() {
                    prop_assert_eq!(once.has_edge(i, j), tdg.has_edge(i, j));
                }
            }
        }
    }
}
