//! Binary entrypoint for the spantree MST server.
//!
//! Reads configuration from environment variables:
//! - `SPANTREE_PORT`: TCP listen port (default: 9034)
//! - `SPANTREE_WORKERS`: worker pool size (default: 4)

use spantree_server::protocol::{run, ServerConfig, ShutdownFlag};

fn main() {
    tracing_subscriber::fmt::init();

    let config = ServerConfig::from_env();
    tracing::info!(
        port = config.port,
        workers = config.workers,
        "spantree server starting"
    );

    let shutdown = ShutdownFlag::new();
    if let Err(err) = run(&config, shutdown) {
        tracing::error!(error = %err, "server failed");
        std::process::exit(1);
    }
}
