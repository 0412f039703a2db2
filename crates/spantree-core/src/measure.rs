//! Metrics derived from a stored MST result.
//!
//! All measurements are computed from the result's edge list alone, so they
//! describe the graph as it was when the MST was solved, never the live
//! (possibly since-mutated) session graph.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::strategy::MstResult;

/// Derived metrics of an MST result.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Measurements {
    /// Sum of the MST's edge weights.
    pub total_weight: i64,
    /// Longest shortest-path distance between any two tree vertices.
    pub diameter: i64,
    /// Mean shortest-path distance over all ordered pairs of distinct,
    /// mutually reachable vertices.
    pub average_distance: f64,
    /// Minimum edge weight among the MST's own edges.
    pub min_edge_weight: i64,
}

/// Computes all measurements of `result`.
///
/// Fails with [`CoreError::NoValidPairs`] when the result induces no
/// reachable vertex pair at all (empty or single-vertex tree).
pub fn measure(result: &MstResult) -> Result<Measurements, CoreError> {
    if result.is_empty() {
        return Err(CoreError::NoValidPairs);
    }

    let adj = induced_adjacency(result);

    let total_weight = result.total_weight();
    let min_edge_weight = result
        .edges()
        .iter()
        .map(|e| e.weight)
        .min()
        .unwrap_or(0);

    // Farthest-from-farthest is exact on a tree: the first sweep from vertex
    // 0 lands on one diameter endpoint, the second measures the diameter.
    let (endpoint, _) = farthest_vertex(&adj, 0);
    let (_, diameter) = farthest_vertex(&adj, endpoint);

    let mut distance_sum: i64 = 0;
    let mut pair_count: u64 = 0;
    for start in 0..adj.len() {
        for (v, dist) in distances_from(&adj, start).into_iter().enumerate() {
            if v != start && dist != i64::MAX {
                distance_sum += dist;
                pair_count += 1;
            }
        }
    }
    if pair_count == 0 {
        return Err(CoreError::NoValidPairs);
    }

    Ok(Measurements {
        total_weight,
        diameter,
        average_distance: distance_sum as f64 / pair_count as f64,
        min_edge_weight,
    })
}

/// Adjacency of the MST result alone, sized by its highest endpoint.
fn induced_adjacency(result: &MstResult) -> Vec<Vec<(usize, i64)>> {
    let mut adj = vec![Vec::new(); result.vertex_span()];
    for edge in result.edges() {
        adj[edge.u].push((edge.v, edge.weight));
        adj[edge.v].push((edge.u, edge.weight));
    }
    adj
}

/// Shortest-path relaxation from `start`. Unreachable vertices keep
/// `i64::MAX`.
fn distances_from(adj: &[Vec<(usize, i64)>], start: usize) -> Vec<i64> {
    let mut dist = vec![i64::MAX; adj.len()];
    if start >= adj.len() {
        return dist;
    }
    dist[start] = 0;

    let mut heap = BinaryHeap::new();
    heap.push(Reverse((0i64, start)));
    while let Some(Reverse((d, u))) = heap.pop() {
        if d > dist[u] {
            continue;
        }
        for &(v, weight) in &adj[u] {
            let candidate = d + weight;
            if candidate < dist[v] {
                dist[v] = candidate;
                heap.push(Reverse((candidate, v)));
            }
        }
    }
    dist
}

/// The vertex farthest from `start` (lowest index on ties) and its distance.
fn farthest_vertex(adj: &[Vec<(usize, i64)>], start: usize) -> (usize, i64) {
    let mut farthest = (start, 0);
    for (v, dist) in distances_from(adj, start).into_iter().enumerate() {
        if dist != i64::MAX && dist > farthest.1 {
            farthest = (v, dist);
        }
    }
    farthest
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Edge;

    fn star_result() -> MstResult {
        MstResult::new(vec![
            Edge { weight: 1, u: 0, v: 1 },
            Edge { weight: 2, u: 0, v: 2 },
            Edge { weight: 3, u: 0, v: 3 },
        ])
    }

    #[test]
    fn star_graph_measurements() {
        let m = measure(&star_result()).unwrap();

        assert_eq!(m.total_weight, 6);
        assert_eq!(m.min_edge_weight, 1);
        // leaf 2 to leaf 3 through the center
        assert_eq!(m.diameter, 5);
        // unordered distances 1,2,3,3,4,5 counted in both directions
        assert_eq!(m.average_distance, 3.0);
    }

    #[test]
    fn empty_result_has_no_valid_pairs() {
        let err = measure(&MstResult::default()).unwrap_err();
        assert!(matches!(err, CoreError::NoValidPairs));
    }

    #[test]
    fn single_edge_measurements() {
        let result = MstResult::new(vec![Edge { weight: 7, u: 0, v: 1 }]);
        let m = measure(&result).unwrap();

        assert_eq!(m.total_weight, 7);
        assert_eq!(m.diameter, 7);
        assert_eq!(m.average_distance, 7.0);
        assert_eq!(m.min_edge_weight, 7);
    }

    #[test]
    fn forest_averages_only_reachable_pairs() {
        // two components: 0-1 (weight 1) and 2-3 (weight 5)
        let result = MstResult::new(vec![
            Edge { weight: 1, u: 0, v: 1 },
            Edge { weight: 5, u: 2, v: 3 },
        ]);
        let m = measure(&result).unwrap();

        assert_eq!(m.total_weight, 6);
        assert_eq!(m.min_edge_weight, 1);
        // 4 ordered reachable pairs: 1,1,5,5
        assert_eq!(m.average_distance, 3.0);
        // diameter sweep starts at vertex 0, so it measures that component
        assert_eq!(m.diameter, 1);
    }

    #[test]
    fn path_diameter_spans_the_whole_path() {
        let result = MstResult::new(vec![
            Edge { weight: 2, u: 0, v: 1 },
            Edge { weight: 3, u: 1, v: 2 },
            Edge { weight: 4, u: 2, v: 3 },
        ]);
        let m = measure(&result).unwrap();
        assert_eq!(m.diameter, 9);
    }
}
