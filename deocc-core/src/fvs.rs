//! Greedy Feedback Vertex Set extraction: a cheap cycle-breaker, not a
//! minimal FVS. Quality is acceptable because the TDG layering pass (see
//! `tdg.rs`) restores cross-rank edges for whatever this removes.

use crate::graph::AdjMatrix;

/// Computes a feedback vertex set for `cg`: a boolean mask where `true`
/// marks a vertex to remove so the residual graph is acyclic.
///
/// Per-SCC, vertices are pruned one at a time from a *single* working copy
/// shared across every SCC of the call (matching the reference algorithm):
/// at each step, select the remaining candidate with the largest
/// total-degree (out-edges to any vertex still in the working copy), with
/// ties broken by the smallest internal-out-degree (out-edges to other
/// still-remaining candidates in the same SCC), then by smallest index:
/// a documented, deterministic tie-break rather than leaving it to
/// whichever vertex happens to be encountered first.
pub fn greedy_fvs(cg: &AdjMatrix) -> Vec<bool> {
    let n = cg.len();
    let mut fvs = vec![false; n];
    let mut working = cg.clone();
    let sccs = cg.tarjan_scc();

    for scc in sccs {
        let has_self_loop = scc.len() == 1 && cg.has_edge(scc[0], scc[0]);
        if scc.len() < 2 && !has_self_loop {
            continue;
        }

        let mut candidates = vec![false; n];
        for &v in &scc {
            candidates[v] = true;
        }

        loop {
            let Some(victim) = select_vertex_to_prune(&working, &candidates) else {
                break;
            };
            fvs[victim] = true;
            candidates[victim] = false;
            working.remove_vertex(victim);

            // Any remaining candidate that can no longer participate in a
            // cycle within this SCC (no more out-edges at all, or no more
            // out-edges to other candidates) drops out too.
            let stale: Vec<usize> = (0..n)
                .filter(|&v| {
                    candidates[v]
                        && (working.out_degree(v) == 0 || working.out_degree_within(v, &candidates) == 0)
                })
                .collect();
            for v in stale {
                candidates[v] = false;
                working.remove_vertex(v);
            }
        }
    }

    fvs
}

fn select_vertex_to_prune(working: &AdjMatrix, candidates: &[bool]) -> Option<usize> {
    let mut best: Option<(usize, usize, usize)> = None; // (total_degree, internal_out_degree, index)
    for (v, &is_candidate) in candidates.iter().enumerate() {
        if !is_candidate {
            continue;
        }
        let total_degree = working.out_degree(v);
        let internal_out_degree = working.out_degree_within(v, candidates);
        let key = (total_degree, internal_out_degree, v);
        best = Some(match best {
            None => key,
            Some(current) => {
                if key.0 > current.0 {
                    key
                } else if key.0 == current.0 && key.1 < current.1 {
                    key
                } else {
                    current
                }
            }
        });
    }
    best.map(|(_, _, v)| v)
}
