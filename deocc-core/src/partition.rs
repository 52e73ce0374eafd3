//! Weight-based partitioning of a transaction dependency graph, used only to
//! compute which TDG edges would cross a partition boundary under a
//! partitioned executor: the resulting `needRW` statistic, not the
//! partitions themselves, is what strategy drivers report.

use crate::graph::AdjMatrix;

/// An ordered group of transaction indices whose total simulated cost is at
/// or below the partitioning threshold, except when a single transaction
/// alone exceeds the threshold, in which case that transaction then gets its
/// own partition.
#[derive(Debug, Clone)]
pub struct Partition {
    pub id: usize,
    pub members: Vec<usize>,
}

impl Partition {
    pub fn total_cost(&self, costs: &[i64]) -> i64 {
        self.members.iter().map(|&i| costs[i]).sum()
    }
}

/// Walks vertices in index order, accumulating a partition until the next
/// vertex (and each of its not-yet-visited direct TDG successors, visited
/// in order) would push the running total past `threshold`.
pub fn partition_transactions(graph: &AdjMatrix, costs: &[i64], threshold: i64) -> Vec<Partition> {
    let n = costs.len();
    let mut visited = vec![false; n];
    let mut partitions: Vec<Partition> = Vec::new();
    let mut current: Vec<usize> = Vec::new();
    let mut current_weight: i64 = 0;

    for i in 0..n {
        if visited[i] {
            continue;
        }
        maybe_flush(&mut partitions, &mut current, &mut current_weight, costs[i], threshold);
        visited[i] = true;
        current.push(i);
        current_weight += costs[i];

        for j in 0..n {
            if graph.has_edge(i, j) && !visited[j] {
                maybe_flush(&mut partitions, &mut current, &mut current_weight, costs[j], threshold);
                visited[j] = true;
                current.push(j);
                current_weight += costs[j];
            }
        }
    }
    if !current.is_empty() {
        let id = partitions.len();
        partitions.push(Partition { id, members: current });
    }
    partitions
}

fn maybe_flush(
    partitions: &mut Vec<Partition>,
    current: &mut Vec<usize>,
    current_weight: &mut i64,
    next_cost: i64,
    threshold: i64,
) {
    if !current.is_empty() && *current_weight + next_cost > threshold {
        let id = partitions.len();
        partitions.push(Partition {
            id,
            members: std::mem::take(current),
        });
        *current_weight = 0;
    }
}

/// Clears every TDG edge whose endpoints land in different partitions and
/// returns `needRW`: the sum, over every cut edge, of the number of write
/// addresses of the edge's target.
pub fn cut_inter_partition_edges(
    graph: &mut AdjMatrix,
    partitions: &[Partition],
    write_counts: &[usize],
) -> u64 {
    let n = graph.len();
    let mut partition_of = vec![usize::MAX; n];
    for p in partitions {
        for &idx in &p.members {
            partition_of[idx] = p.id;
        }
    }

    let mut need_rw = 0u64;
    for i in 0..n {
        for j in 0..n {
            if graph.has_edge(i, j) && partition_of[i] != partition_of[j] {
                graph.set_edge(i, j, false);
                need_rw += write_counts[j] as u64;
            }
        }
    }
    need_rw
}
