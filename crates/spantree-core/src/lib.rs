pub mod error;
pub mod graph;
pub mod measure;
pub mod strategy;

// Re-export commonly used types
pub use error::CoreError;
pub use graph::{Edge, Graph};
pub use measure::{measure, Measurements};
pub use strategy::{select_strategy, Kruskal, MstResult, MstStrategy, Prim};
