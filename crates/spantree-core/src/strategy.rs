//! Pluggable MST strategies: Kruskal and Prim.
//!
//! [`MstStrategy`] is the seam between the session orchestrator and the
//! algorithms. Both implementations are pure functions from a [`Graph`] to an
//! ordered edge list and accept disconnected input, returning a spanning
//! forest instead of failing.
//!
//! Determinism: Kruskal sorts by `(weight, u, v)` and Prim breaks equal
//! frontier weights toward the lowest vertex index, so both produce
//! reproducible results on multigraphs with repeated weights.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::graph::{Edge, Graph};

/// The ordered edge list chosen by a strategy.
///
/// `V - 1` edges for a connected graph, fewer for a forest. Edges are in
/// canonical `u < v` form, listed in the order the strategy accepted them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MstResult {
    edges: Vec<Edge>,
}

impl MstResult {
    /// Wraps an already-ordered edge list.
    pub fn new(edges: Vec<Edge>) -> Self {
        MstResult { edges }
    }

    /// The chosen edges, in acceptance order.
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Number of chosen edges.
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// True if the strategy chose no edges at all.
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Sum of the chosen edge weights.
    pub fn total_weight(&self) -> i64 {
        self.edges.iter().map(|e| e.weight).sum()
    }

    /// One past the highest vertex index referenced by any chosen edge.
    pub fn vertex_span(&self) -> usize {
        self.edges.iter().map(|e| e.v + 1).max().unwrap_or(0)
    }
}

impl std::fmt::Debug for dyn MstStrategy + Send + Sync {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MstStrategy").field("name", &self.name()).finish()
    }
}

/// Capability shared by all MST algorithms.
pub trait MstStrategy {
    /// The selector name this strategy answers to.
    fn name(&self) -> &'static str;

    /// Computes a minimum spanning tree (or forest) of `graph`.
    fn compute_mst(&self, graph: &Graph) -> MstResult;
}

/// Maps a case-sensitive strategy name to a strategy instance.
///
/// `"kruskal"` and `"prim"` are the only recognized names.
pub fn select_strategy(name: &str) -> Result<Box<dyn MstStrategy + Send + Sync>, CoreError> {
    match name {
        "kruskal" => Ok(Box::new(Kruskal)),
        "prim" => Ok(Box::new(Prim)),
        _ => Err(CoreError::UnknownStrategy {
            name: name.to_string(),
        }),
    }
}

/// Disjoint-set structure with path compression and union by rank.
struct UnionFind {
    parent: Vec<usize>,
    rank: Vec<u32>,
}

impl UnionFind {
    fn new(size: usize) -> Self {
        UnionFind {
            parent: (0..size).collect(),
            rank: vec![0; size],
        }
    }

    fn find(&mut self, x: usize) -> usize {
        let mut root = x;
        while self.parent[root] != root {
            root = self.parent[root];
        }
        // path compression
        let mut current = x;
        while self.parent[current] != root {
            let next = self.parent[current];
            self.parent[current] = root;
            current = next;
        }
        root
    }

    /// Merges the sets containing `x` and `y`. Returns false if they were
    /// already in the same set.
    fn union(&mut self, x: usize, y: usize) -> bool {
        let x_root = self.find(x);
        let y_root = self.find(y);
        if x_root == y_root {
            return false;
        }
        if self.rank[x_root] < self.rank[y_root] {
            self.parent[x_root] = y_root;
        } else if self.rank[x_root] > self.rank[y_root] {
            self.parent[y_root] = x_root;
        } else {
            self.parent[y_root] = x_root;
            self.rank[x_root] += 1;
        }
        true
    }
}

/// Kruskal's algorithm: globally sorted edge scan over a union-find.
pub struct Kruskal;

impl MstStrategy for Kruskal {
    fn name(&self) -> &'static str {
        "kruskal"
    }

    fn compute_mst(&self, graph: &Graph) -> MstResult {
        let mut edges = graph.edges();
        edges.sort(); // (weight, u, v) -- deterministic tie-break

        let mut sets = UnionFind::new(graph.vertex_count());
        let mut result = Vec::new();
        for edge in edges {
            if sets.union(edge.u, edge.v) {
                result.push(edge);
            }
        }
        MstResult::new(result)
    }
}

/// Prim's algorithm: frontier growth from vertex 0 with lazy deletion.
///
/// Vertices unreachable from 0 are silently omitted from the result.
pub struct Prim;

impl MstStrategy for Prim {
    fn name(&self) -> &'static str {
        "prim"
    }

    fn compute_mst(&self, graph: &Graph) -> MstResult {
        let vertices = graph.vertex_count();
        let mut result = Vec::new();
        if vertices == 0 {
            return MstResult::new(result);
        }

        let mut visited = vec![false; vertices];
        let mut key = vec![i64::MAX; vertices];
        let mut parent: Vec<Option<usize>> = vec![None; vertices];

        // Min-heap on (weight, vertex); equal weights pop the lowest index.
        let mut heap = BinaryHeap::new();
        key[0] = 0;
        heap.push(Reverse((0i64, 0usize)));

        while let Some(Reverse((_, u))) = heap.pop() {
            if visited[u] {
                // stale entry superseded by a better weight
                continue;
            }
            visited[u] = true;

            if let Some(p) = parent[u] {
                result.push(Edge::new(key[u], p, u));
            }

            // neighbors(u) cannot fail: u came off the heap, so it is valid
            for &(v, weight) in graph.neighbors(u).unwrap_or(&[]) {
                if !visited[v] && weight < key[v] {
                    key[v] = weight;
                    parent[v] = Some(u);
                    heap.push(Reverse((weight, v)));
                }
            }
        }

        MstResult::new(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    /// The connected 4-vertex graph used across strategy tests.
    fn square_with_diagonal() -> Graph {
        let mut graph = Graph::new(4);
        graph.add_edge(0, 1, 10).unwrap();
        graph.add_edge(1, 2, 6).unwrap();
        graph.add_edge(2, 3, 4).unwrap();
        graph.add_edge(3, 0, 5).unwrap();
        graph.add_edge(0, 2, 3).unwrap();
        graph
    }

    #[test]
    fn kruskal_picks_minimum_edges_in_weight_order() {
        let graph = square_with_diagonal();
        let result = Kruskal.compute_mst(&graph);

        assert_eq!(result.edge_count(), 3);
        assert_eq!(result.total_weight(), 13);
        // acceptance order is ascending weight order; (0,3,5) closes a cycle
        assert_eq!(
            result.edges(),
            &[
                Edge { weight: 3, u: 0, v: 2 },
                Edge { weight: 4, u: 2, v: 3 },
                Edge { weight: 6, u: 1, v: 2 },
            ]
        );
    }

    #[test]
    fn prim_matches_kruskal_total_weight() {
        let graph = square_with_diagonal();
        let kruskal = Kruskal.compute_mst(&graph);
        let prim = Prim.compute_mst(&graph);

        assert_eq!(kruskal.total_weight(), prim.total_weight());
        assert_eq!(prim.edge_count(), 3);
    }

    #[test]
    fn kruskal_tie_break_is_lowest_index_first() {
        let mut graph = Graph::new(3);
        graph.add_edge(1, 2, 1).unwrap();
        graph.add_edge(0, 1, 1).unwrap();
        graph.add_edge(0, 2, 1).unwrap();

        let result = Kruskal.compute_mst(&graph);
        assert_eq!(
            result.edges(),
            &[
                Edge { weight: 1, u: 0, v: 1 },
                Edge { weight: 1, u: 0, v: 2 },
            ]
        );
    }

    #[test]
    fn prim_tie_break_is_lowest_vertex_first() {
        // star with equal weights: both leaves connect with weight 1
        let mut graph = Graph::new(3);
        graph.add_edge(0, 2, 1).unwrap();
        graph.add_edge(0, 1, 1).unwrap();

        let result = Prim.compute_mst(&graph);
        assert_eq!(
            result.edges(),
            &[
                Edge { weight: 1, u: 0, v: 1 },
                Edge { weight: 1, u: 0, v: 2 },
            ]
        );
    }

    #[test]
    fn disconnected_graph_yields_forest() {
        let mut graph = Graph::new(5);
        graph.add_edge(0, 1, 2).unwrap();
        graph.add_edge(2, 3, 1).unwrap();
        // vertex 4 isolated

        let kruskal = Kruskal.compute_mst(&graph);
        assert_eq!(kruskal.edge_count(), 2);

        // Prim only covers the component of vertex 0
        let prim = Prim.compute_mst(&graph);
        assert_eq!(prim.edges(), &[Edge { weight: 2, u: 0, v: 1 }]);
    }

    #[test]
    fn empty_graph_produces_empty_result() {
        let graph = Graph::new(0);
        assert!(Kruskal.compute_mst(&graph).is_empty());
        assert!(Prim.compute_mst(&graph).is_empty());
    }

    #[test]
    fn multi_edge_uses_cheapest_parallel_edge() {
        let mut graph = Graph::new(2);
        graph.add_edge(0, 1, 9).unwrap();
        graph.add_edge(0, 1, 2).unwrap();

        assert_eq!(Kruskal.compute_mst(&graph).total_weight(), 2);
        assert_eq!(Prim.compute_mst(&graph).total_weight(), 2);
    }

    #[test]
    fn selector_is_case_sensitive() {
        assert_eq!(select_strategy("kruskal").unwrap().name(), "kruskal");
        assert_eq!(select_strategy("prim").unwrap().name(), "prim");

        let err = select_strategy("Prim").unwrap_err();
        assert!(matches!(err, CoreError::UnknownStrategy { name } if name == "Prim"));
    }

    proptest! {
        /// On any connected graph, both strategies agree on the MST total
        /// weight and Kruskal uses exactly V-1 edges.
        #[test]
        fn strategies_agree_on_connected_graphs(
            spine in proptest::collection::vec(1i64..100, 1..12),
            extras in proptest::collection::vec((0usize..12, 0usize..12, 1i64..100), 0..20),
        ) {
            // a path over V vertices guarantees connectivity
            let vertices = spine.len() + 1;
            let mut graph = Graph::new(vertices);
            for (i, w) in spine.iter().enumerate() {
                graph.add_edge(i, i + 1, *w).unwrap();
            }
            for (a, b, w) in extras {
                let (a, b) = (a % vertices, b % vertices);
                graph.add_edge(a, b, w).unwrap();
            }

            let kruskal = Kruskal.compute_mst(&graph);
            let prim = Prim.compute_mst(&graph);

            prop_assert_eq!(kruskal.edge_count(), vertices - 1);
            prop_assert_eq!(kruskal.total_weight(), prim.total_weight());
        }
    }
}
