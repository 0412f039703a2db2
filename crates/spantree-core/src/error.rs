//! Core error types for spantree-core.
//!
//! Uses `thiserror` for structured, matchable error variants covering
//! all anticipated failure modes in the graph model and MST engine.

use thiserror::Error;

/// Core errors produced by the spantree-core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A vertex index outside `[0, vertex_count)` was passed to a graph
    /// operation.
    #[error("vertex index {index} out of range (graph has {vertex_count} vertices)")]
    OutOfRangeVertex { index: usize, vertex_count: usize },

    /// A strategy name that is neither "kruskal" nor "prim".
    #[error("unknown strategy: '{name}'")]
    UnknownStrategy { name: String },

    /// Measurements were requested for an MST result with no reachable
    /// vertex pairs (empty or single-vertex tree).
    #[error("no valid vertex pairs in MST result")]
    NoValidPairs,
}
