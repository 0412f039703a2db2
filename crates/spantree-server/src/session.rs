//! Per-client session store and the operations the protocol layer calls.
//!
//! [`Orchestrator`] owns the shared client-id-to-session table. The table is
//! a `DashMap` because it is inserted into and looked up from multiple
//! workers concurrently whenever different clients are onboarded or served
//! at the same time; per-key isolation does not cover the table itself, so
//! the concurrent map is load-bearing. Each session's payload (graph, MST
//! result, measurements) is only ever touched by the one worker currently
//! serving that client.
//!
//! Staleness contract: the stored MST result and measurements describe the
//! graph *as of the last solve call*. Mutating the graph afterwards does not
//! invalidate or recompute them until `solve_mst` runs again.

use std::fmt;

use dashmap::DashMap;

use spantree_core::{measure, select_strategy, Edge, Graph, Measurements, MstResult};

use crate::error::ServerError;
use crate::render::Renderer;

/// Identifier of a connected client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClientId(pub u64);

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One client's state: owned graph, latest MST result, derived metrics.
#[derive(Debug, Default)]
struct Session {
    graph: Graph,
    result: Option<MstResult>,
    measurements: Option<Measurements>,
}

/// Owns every client session and exposes the client-facing operations.
#[derive(Default)]
pub struct Orchestrator {
    sessions: DashMap<ClientId, Session>,
}

impl Orchestrator {
    pub fn new() -> Self {
        Orchestrator {
            sessions: DashMap::new(),
        }
    }

    /// Number of live sessions.
    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    /// True if `client` has submitted a graph.
    pub fn has_session(&self, client: ClientId) -> bool {
        self.sessions.contains_key(&client)
    }

    /// Installs `graph` as the client's current graph, discarding any prior
    /// graph, MST result and measurements. Creates the session if needed.
    pub fn set_graph(&self, client: ClientId, graph: Graph) {
        self.sessions.insert(
            client,
            Session {
                graph,
                result: None,
                measurements: None,
            },
        );
    }

    /// Destroys a client's session. Returns false if none existed.
    pub fn remove_session(&self, client: ClientId) -> bool {
        self.sessions.remove(&client).is_some()
    }

    fn with_session<T>(
        &self,
        client: ClientId,
        f: impl FnOnce(&mut Session) -> Result<T, ServerError>,
    ) -> Result<T, ServerError> {
        let mut session = self
            .sessions
            .get_mut(&client)
            .ok_or(ServerError::ClientNotFound(client))?;
        f(&mut session)
    }

    /// Applies each change as an `add_edge` in list order.
    pub fn update_graph(&self, client: ClientId, changes: &[Edge]) -> Result<(), ServerError> {
        self.with_session(client, |session| {
            for change in changes {
                session.graph.add_edge(change.u, change.v, change.weight)?;
            }
            Ok(())
        })
    }

    /// Adds a single edge to the client's graph.
    pub fn add_edge(&self, client: ClientId, u: usize, v: usize, w: i64) -> Result<(), ServerError> {
        self.with_session(client, |session| Ok(session.graph.add_edge(u, v, w)?))
    }

    /// Removes all edges between `u` and `v` in the client's graph.
    pub fn remove_edge(&self, client: ClientId, u: usize, v: usize) -> Result<(), ServerError> {
        self.with_session(client, |session| Ok(session.graph.remove_edge(u, v)?))
    }

    /// Ensures vertex `k` exists in the client's graph.
    pub fn add_vertex(&self, client: ClientId, k: usize) -> Result<(), ServerError> {
        self.with_session(client, |session| {
            session.graph.add_vertex(k);
            Ok(())
        })
    }

    /// Removes vertex `i` from the client's graph, relabeling higher indices.
    pub fn remove_vertex(&self, client: ClientId, i: usize) -> Result<(), ServerError> {
        self.with_session(client, |session| Ok(session.graph.remove_vertex(i)?))
    }

    /// Resolves `strategy_name`, computes the MST of the client's current
    /// graph and stores the result wholesale, replacing any previous one.
    /// Previously derived measurements are dropped with it.
    pub fn solve_mst(&self, client: ClientId, strategy_name: &str) -> Result<MstResult, ServerError> {
        self.with_session(client, |session| {
            let strategy = select_strategy(strategy_name)?;
            let result = strategy.compute_mst(&session.graph);
            session.result = Some(result.clone());
            session.measurements = None;
            Ok(result)
        })
    }

    /// Computes and stores the derived metrics of the stored MST result.
    pub fn calculate_measurements(&self, client: ClientId) -> Result<Measurements, ServerError> {
        self.with_session(client, |session| {
            let result = session
                .result
                .as_ref()
                .ok_or(ServerError::ResultNotFound(client))?;
            let measurements = measure(result)?;
            session.measurements = Some(measurements);
            Ok(measurements)
        })
    }

    /// The measurements from the last `calculate_measurements` call, if any.
    pub fn measurements(&self, client: ClientId) -> Result<Option<Measurements>, ServerError> {
        self.with_session(client, |session| Ok(session.measurements))
    }

    /// A snapshot of the client's current graph.
    pub fn graph_snapshot(&self, client: ClientId) -> Result<Graph, ServerError> {
        self.with_session(client, |session| Ok(session.graph.clone()))
    }

    /// Hands the stored graph to `renderer`, blocking the calling worker
    /// until the renderer returns.
    pub fn visualize_graph(
        &self,
        client: ClientId,
        renderer: &mut dyn Renderer,
    ) -> Result<(), ServerError> {
        // clone out first so the shared table is not held across the
        // blocking render call
        let graph = self.graph_snapshot(client)?;
        renderer.render(&graph, None);
        Ok(())
    }

    /// Hands the stored graph and MST result to `renderer`, blocking the
    /// calling worker until the renderer returns.
    pub fn visualize_mst(
        &self,
        client: ClientId,
        renderer: &mut dyn Renderer,
    ) -> Result<(), ServerError> {
        let (graph, result) = self.with_session(client, |session| {
            let result = session
                .result
                .clone()
                .ok_or(ServerError::ResultNotFound(client))?;
            Ok((session.graph.clone(), result))
        })?;
        renderer.render(&graph, Some(&result));
        Ok(())
    }
}
