//! Rendering seam between the orchestrator and the display collaborator.
//!
//! The orchestrator's `visualize_*` operations hand the stored graph (and
//! optionally the stored MST result) to a [`Renderer`] and block until it
//! returns, mirroring a viewer that holds the worker until dismissed. The
//! built-in [`TextRenderer`] writes the textual form; graphical viewers live
//! outside this crate and only need to implement the trait.

use std::io::Write;

use spantree_core::{Graph, MstResult};

/// Display-only consumer of the core's data. `render` may block
/// indefinitely; the calling worker stays occupied for its duration.
pub trait Renderer {
    fn render(&mut self, graph: &Graph, mst: Option<&MstResult>);
}

/// Formats a graph as one line per vertex: the index, then each
/// `(neighbor, weight)` pair in adjacency order.
pub fn render_graph(graph: &Graph) -> String {
    let mut out = String::from("Graph structure:\n");
    for v in 0..graph.vertex_count() {
        out.push_str(&format!("Vertex {v} ->"));
        // vertex_count bounds v, so neighbors cannot fail
        for &(n, w) in graph.neighbors(v).unwrap_or(&[]) {
            out.push_str(&format!(" ({n}, {w})"));
        }
        out.push('\n');
    }
    out
}

/// Formats an MST result as one line per chosen edge.
pub fn render_mst(mst: &MstResult) -> String {
    let mut out = String::from("MST edges:\n");
    for edge in mst.edges() {
        out.push_str(&format!("{} - {} (weight {})\n", edge.u, edge.v, edge.weight));
    }
    out
}

/// Renderer that writes the textual form to any `Write` sink.
pub struct TextRenderer<W: Write> {
    out: W,
}

impl<W: Write> TextRenderer<W> {
    pub fn new(out: W) -> Self {
        TextRenderer { out }
    }
}

impl<W: Write> Renderer for TextRenderer<W> {
    fn render(&mut self, graph: &Graph, mst: Option<&MstResult>) {
        let mut text = render_graph(graph);
        if let Some(mst) = mst {
            text.push_str(&render_mst(mst));
        }
        if let Err(err) = self.out.write_all(text.as_bytes()) {
            tracing::warn!(error = %err, "renderer sink write failed");
        }
    }
}
