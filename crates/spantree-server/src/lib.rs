pub mod error;
pub mod pool;
pub mod protocol;
pub mod render;
pub mod session;

pub use error::ServerError;
pub use pool::{PoolError, WorkerPool};
pub use protocol::{ServerConfig, ShutdownFlag};
pub use render::{render_graph, Renderer, TextRenderer};
pub use session::{ClientId, Orchestrator};
