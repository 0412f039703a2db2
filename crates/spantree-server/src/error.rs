//! Server-side error types.
//!
//! [`ServerError`] covers session-level failures and wraps core errors from
//! the graph model and MST engine. Every variant is a synchronous,
//! recoverable failure reported to the protocol layer; none of them is
//! fatal to the worker pool or the orchestrator.

use thiserror::Error;

use spantree_core::CoreError;

use crate::session::ClientId;

/// Errors produced by the session orchestrator.
#[derive(Debug, Error)]
pub enum ServerError {
    /// No session exists for the given client.
    #[error("no session for client {0}")]
    ClientNotFound(ClientId),

    /// The client has a session but no MST result was solved yet.
    #[error("no MST result for client {0}")]
    ResultNotFound(ClientId),

    /// A graph or strategy error bubbled up from the core.
    #[error(transparent)]
    Core(#[from] CoreError),
}
