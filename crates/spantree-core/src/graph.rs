//! Weighted undirected multigraph over contiguous vertex indices.
//!
//! [`Graph`] is the mutable per-session graph model. Vertices are the
//! integers `[0, V)` with no gaps; every undirected edge is stored
//! symmetrically in both endpoints' adjacency lists. Multi-edges and
//! self-loops are permitted and never deduplicated.
//!
//! The graph also carries a spanning-tree parent array populated by
//! [`Graph::build_spanning_tree`]. The parent pointers describe the *last*
//! depth-first traversal that was run; they are stale (or unset) until then,
//! and callers of [`Graph::path_to`] are expected to have built the tree
//! from the root they care about.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// A single undirected edge in canonical form.
///
/// For edges produced by [`Graph::edges`] and by the MST strategies the
/// endpoints satisfy `u < v`. The derived ordering (weight first, then
/// endpoints) is the deterministic tie-break used by Kruskal's sort.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Edge {
    /// Edge weight.
    pub weight: i64,
    /// Lower endpoint.
    pub u: usize,
    /// Higher endpoint.
    pub v: usize,
}

impl Edge {
    /// Creates an edge with endpoints put into canonical `u < v` order.
    pub fn new(weight: i64, a: usize, b: usize) -> Self {
        Edge {
            weight,
            u: a.min(b),
            v: a.max(b),
        }
    }
}

/// Mutable weighted undirected multigraph keyed by contiguous vertex indices.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Graph {
    /// Per-vertex adjacency: ordered `(neighbor, weight)` entries.
    adj: Vec<Vec<(usize, i64)>>,
    /// Parent pointers from the last depth-first traversal. `None` for the
    /// root and for vertices never reached.
    parent: Vec<Option<usize>>,
}

impl Graph {
    /// Creates a graph with `vertices` isolated vertices.
    pub fn new(vertices: usize) -> Self {
        Graph {
            adj: vec![Vec::new(); vertices],
            parent: vec![None; vertices],
        }
    }

    /// Number of vertices. Indices `0..vertex_count()` are all valid.
    pub fn vertex_count(&self) -> usize {
        self.adj.len()
    }

    /// Total number of adjacency entries (each undirected edge counts twice).
    pub fn adjacency_entry_count(&self) -> usize {
        self.adj.iter().map(Vec::len).sum()
    }

    fn check_vertex(&self, index: usize) -> Result<(), CoreError> {
        if index < self.adj.len() {
            Ok(())
        } else {
            Err(CoreError::OutOfRangeVertex {
                index,
                vertex_count: self.adj.len(),
            })
        }
    }

    /// The `(neighbor, weight)` entries of vertex `v`, in insertion order.
    pub fn neighbors(&self, v: usize) -> Result<&[(usize, i64)], CoreError> {
        self.check_vertex(v)?;
        Ok(&self.adj[v])
    }

    /// Appends the undirected edge `u -- v` with weight `w`.
    ///
    /// Both directions are recorded; a self-loop appends two entries to the
    /// same list. Duplicate edges are kept.
    pub fn add_edge(&mut self, u: usize, v: usize, w: i64) -> Result<(), CoreError> {
        self.check_vertex(u)?;
        self.check_vertex(v)?;
        self.adj[u].push((v, w));
        self.adj[v].push((u, w));
        Ok(())
    }

    /// Removes every edge between `u` and `v` from both adjacency lists.
    ///
    /// No-op if no such edge exists.
    pub fn remove_edge(&mut self, u: usize, v: usize) -> Result<(), CoreError> {
        self.check_vertex(u)?;
        self.check_vertex(v)?;
        self.adj[u].retain(|&(n, _)| n != v);
        if u != v {
            self.adj[v].retain(|&(n, _)| n != u);
        }
        Ok(())
    }

    /// Ensures vertex index `k` exists.
    ///
    /// If `k >= vertex_count()`, extends the graph so indices up to `k` exist
    /// with empty adjacency. If `k` already exists this is a no-op; the graph
    /// never shrinks here.
    pub fn add_vertex(&mut self, k: usize) {
        if k >= self.adj.len() {
            self.adj.resize(k + 1, Vec::new());
            self.parent.resize(k + 1, None);
        }
    }

    /// Removes vertex `i`, every edge referencing it, and relabels all
    /// remaining indices greater than `i` down by one so indices stay
    /// contiguous.
    ///
    /// Cost is proportional to the total edge count.
    pub fn remove_vertex(&mut self, i: usize) -> Result<(), CoreError> {
        self.check_vertex(i)?;

        self.adj.remove(i);
        self.parent.remove(i);

        for entries in &mut self.adj {
            entries.retain(|&(n, _)| n != i);
            for entry in entries.iter_mut() {
                if entry.0 > i {
                    entry.0 -= 1;
                }
            }
        }
        Ok(())
    }

    /// Every undirected edge exactly once, in canonical `u < v` direction.
    ///
    /// Self-loops are not listed (no canonical direction exists for them).
    pub fn edges(&self) -> Vec<Edge> {
        let mut edges = Vec::new();
        for (u, entries) in self.adj.iter().enumerate() {
            for &(v, weight) in entries {
                if u < v {
                    edges.push(Edge { weight, u, v });
                }
            }
        }
        edges
    }

    /// Runs a depth-first traversal from `root`, recording parent pointers.
    ///
    /// The root's own parent is `None`. Vertices unreachable from `root`
    /// keep `None` as well.
    pub fn build_spanning_tree(&mut self, root: usize) -> Result<(), CoreError> {
        self.check_vertex(root)?;

        for slot in &mut self.parent {
            *slot = None;
        }
        let mut visited = vec![false; self.adj.len()];
        // (vertex, discovered-from) pairs; neighbors pushed in reverse so the
        // pop order matches a recursive DFS over adjacency order.
        let mut stack = vec![(root, None)];
        while let Some((v, from)) = stack.pop() {
            if visited[v] {
                continue;
            }
            visited[v] = true;
            self.parent[v] = from;
            for &(u, _) in self.adj[v].iter().rev() {
                if !visited[u] {
                    stack.push((u, Some(v)));
                }
            }
        }
        Ok(())
    }

    /// Walks parent pointers from `v` back to the traversal root, returning
    /// the path in root-to-`v` order.
    ///
    /// Meaningful only after [`Graph::build_spanning_tree`] was run with the
    /// intended root; otherwise the pointers reflect a previous traversal.
    pub fn path_to(&self, v: usize) -> Result<Vec<usize>, CoreError> {
        self.check_vertex(v)?;
        let mut path = vec![v];
        let mut current = v;
        while let Some(p) = self.parent[current] {
            path.push(p);
            current = p;
        }
        path.reverse();
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn has_neighbor(graph: &Graph, u: usize, v: usize) -> bool {
        graph.neighbors(u).unwrap().iter().any(|&(n, _)| n == v)
    }

    #[test]
    fn add_edge_is_symmetric() {
        let mut graph = Graph::new(3);
        graph.add_edge(0, 2, 7).unwrap();

        assert_eq!(graph.neighbors(0).unwrap(), &[(2, 7)]);
        assert_eq!(graph.neighbors(2).unwrap(), &[(0, 7)]);
        assert!(graph.neighbors(1).unwrap().is_empty());
        assert_eq!(graph.adjacency_entry_count(), 2);
    }

    #[test]
    fn add_edge_out_of_range() {
        let mut graph = Graph::new(2);
        let err = graph.add_edge(0, 5, 1).unwrap_err();
        assert!(matches!(
            err,
            CoreError::OutOfRangeVertex { index: 5, vertex_count: 2 }
        ));
    }

    #[test]
    fn multi_edges_and_self_loops_are_kept() {
        let mut graph = Graph::new(2);
        graph.add_edge(0, 1, 1).unwrap();
        graph.add_edge(0, 1, 2).unwrap();
        graph.add_edge(1, 1, 3).unwrap();

        assert_eq!(graph.neighbors(0).unwrap().len(), 2);
        // two parallel edges plus both directions of the self-loop
        assert_eq!(graph.neighbors(1).unwrap().len(), 4);
    }

    #[test]
    fn remove_edge_clears_both_sides() {
        let mut graph = Graph::new(3);
        graph.add_edge(0, 1, 4).unwrap();
        graph.add_edge(0, 1, 9).unwrap();
        graph.add_edge(1, 2, 1).unwrap();

        graph.remove_edge(0, 1).unwrap();

        assert!(!has_neighbor(&graph, 0, 1));
        assert!(!has_neighbor(&graph, 1, 0));
        assert!(has_neighbor(&graph, 1, 2));
    }

    #[test]
    fn remove_edge_absent_is_noop() {
        let mut graph = Graph::new(3);
        graph.add_edge(0, 1, 4).unwrap();
        graph.remove_edge(1, 2).unwrap();
        assert_eq!(graph.edges().len(), 1);
    }

    #[test]
    fn add_vertex_grows_or_noops() {
        let mut graph = Graph::new(2);
        graph.add_vertex(4);
        assert_eq!(graph.vertex_count(), 5);

        graph.add_vertex(1);
        assert_eq!(graph.vertex_count(), 5);
    }

    #[test]
    fn remove_vertex_relabels_higher_indices() {
        let mut graph = Graph::new(4);
        graph.add_edge(0, 1, 1).unwrap();
        graph.add_edge(1, 3, 2).unwrap();
        graph.add_edge(2, 3, 3).unwrap();

        graph.remove_vertex(1).unwrap();

        assert_eq!(graph.vertex_count(), 3);
        // old vertex 2 is now 1, old vertex 3 is now 2
        let edges = graph.edges();
        assert_eq!(edges, vec![Edge { weight: 3, u: 1, v: 2 }]);
        for v in 0..graph.vertex_count() {
            for &(n, _) in graph.neighbors(v).unwrap() {
                assert!(n < graph.vertex_count());
            }
        }
    }

    #[test]
    fn remove_vertex_out_of_range() {
        let mut graph = Graph::new(2);
        assert!(graph.remove_vertex(2).is_err());
    }

    #[test]
    fn edges_are_canonical_and_unique() {
        let mut graph = Graph::new(3);
        graph.add_edge(2, 0, 5).unwrap();
        graph.add_edge(1, 2, 3).unwrap();
        graph.add_edge(1, 1, 9).unwrap(); // self-loop, not listed

        let edges = graph.edges();
        assert_eq!(edges.len(), 2);
        for edge in &edges {
            assert!(edge.u < edge.v);
        }
    }

    #[test]
    fn spanning_tree_path_runs_root_to_vertex() {
        let mut graph = Graph::new(5);
        graph.add_edge(0, 1, 1).unwrap();
        graph.add_edge(1, 2, 1).unwrap();
        graph.add_edge(2, 3, 1).unwrap();
        graph.add_edge(0, 4, 1).unwrap();

        graph.build_spanning_tree(0).unwrap();

        assert_eq!(graph.path_to(3).unwrap(), vec![0, 1, 2, 3]);
        assert_eq!(graph.path_to(4).unwrap(), vec![0, 4]);
        assert_eq!(graph.path_to(0).unwrap(), vec![0]);
    }

    #[test]
    fn spanning_tree_leaves_unreachable_vertices_rootless() {
        let mut graph = Graph::new(4);
        graph.add_edge(0, 1, 1).unwrap();
        graph.add_edge(2, 3, 1).unwrap();

        graph.build_spanning_tree(0).unwrap();

        // vertex 2 was never reached, so its "path" is just itself
        assert_eq!(graph.path_to(2).unwrap(), vec![2]);
    }

    #[test]
    fn serde_roundtrip() {
        let mut graph = Graph::new(3);
        graph.add_edge(0, 1, 4).unwrap();
        graph.add_edge(1, 2, 2).unwrap();

        let json = serde_json::to_string(&graph).unwrap();
        let back: Graph = serde_json::from_str(&json).unwrap();
        assert_eq!(back.vertex_count(), 3);
        assert_eq!(back.edges(), graph.edges());
    }
}
