//! Line-based TCP protocol layer and accept loop.
//!
//! This is the thin I/O demultiplexer in front of the core: one long-lived
//! session task per client connection is submitted to the worker pool, and
//! the task repeatedly calls into the [`Orchestrator`]. Commands are
//! whitespace-trimmed lines (`init`, `change_graph`, `kruskal`, `prim`,
//! `quit`/`exit`); every response ends with a `> ` prompt.
//!
//! Cancellation is an explicit [`ShutdownFlag`] token threaded through the
//! accept loop and into each session task rather than ambient global state.

use std::io::{self, BufRead, BufReader, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use spantree_core::Graph;

use crate::pool::WorkerPool;
use crate::render::{render_graph, TextRenderer};
use crate::session::{ClientId, Orchestrator};

const DEFAULT_PORT: u16 = 9034;
const DEFAULT_WORKERS: usize = 4;

/// Listener configuration, read from the environment.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// TCP port to listen on.
    pub port: u16,
    /// Worker pool size; bounds concurrently served clients.
    pub workers: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            port: DEFAULT_PORT,
            workers: DEFAULT_WORKERS,
        }
    }
}

impl ServerConfig {
    /// Reads `SPANTREE_PORT` and `SPANTREE_WORKERS`, falling back to the
    /// defaults (9034, 4) when unset or unparsable.
    pub fn from_env() -> Self {
        let defaults = ServerConfig::default();
        let port = std::env::var("SPANTREE_PORT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.port);
        let workers = std::env::var("SPANTREE_WORKERS")
            .ok()
            .and_then(|v| v.parse().ok())
            .filter(|&w: &usize| w > 0)
            .unwrap_or(defaults.workers);
        ServerConfig { port, workers }
    }
}

/// Cancellation token for the accept loop and session tasks.
#[derive(Clone, Debug, Default)]
pub struct ShutdownFlag(Arc<AtomicBool>);

impl ShutdownFlag {
    pub fn new() -> Self {
        ShutdownFlag::default()
    }

    /// Signals every observer of this token to stop.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Binds the listener, spawns the worker pool and serves until the
/// shutdown token is cancelled or the listener fails.
pub fn run(config: &ServerConfig, shutdown: ShutdownFlag) -> io::Result<()> {
    let listener = TcpListener::bind(("0.0.0.0", config.port))?;
    let pool = WorkerPool::new(config.workers);
    let orchestrator = Arc::new(Orchestrator::new());

    tracing::info!(port = config.port, workers = config.workers, "listening");

    let mut next_client = 0u64;
    for stream in listener.incoming() {
        if shutdown.is_cancelled() {
            break;
        }
        let stream = match stream {
            Ok(stream) => stream,
            Err(err) => {
                tracing::warn!(error = %err, "accept failed");
                continue;
            }
        };

        next_client += 1;
        let client = ClientId(next_client);
        tracing::info!(client = %client, "new client connected");

        let orchestrator = Arc::clone(&orchestrator);
        let shutdown_task = shutdown.clone();
        let enqueued = pool.enqueue(client, move |worker| {
            if let Err(err) = handle_client(stream, &orchestrator, client, worker, &shutdown_task)
            {
                tracing::warn!(client = %client, error = %err, "session I/O error");
            }
            // the hosting process drops the client entry on disconnect
            orchestrator.remove_session(client);
            tracing::info!(client = %client, worker, "client disconnected, worker free");
        });
        if enqueued.is_err() {
            break;
        }
    }

    pool.shutdown();
    Ok(())
}

fn handle_client(
    stream: TcpStream,
    orchestrator: &Orchestrator,
    client: ClientId,
    worker: usize,
    shutdown: &ShutdownFlag,
) -> io::Result<()> {
    let reader = BufReader::new(stream.try_clone()?);
    handle_session(reader, stream, orchestrator, client, worker, shutdown)
}

/// Runs one client session over any line-oriented transport.
pub fn handle_session<R: BufRead, W: Write>(
    mut reader: R,
    mut writer: W,
    orchestrator: &Orchestrator,
    client: ClientId,
    worker: usize,
    shutdown: &ShutdownFlag,
) -> io::Result<()> {
    send(&mut writer, &format!("You are being served by worker {worker}"))?;
    show_options(&mut writer)?;

    while !shutdown.is_cancelled() {
        let command = match read_trimmed(&mut reader)? {
            Some(line) => line,
            None => break, // client hung up
        };
        tracing::debug!(client = %client, command = %command, "received command");

        match command.as_str() {
            "quit" | "exit" => {
                send(&mut writer, "Goodbye!")?;
                break;
            }
            "init" => {
                init_session(&mut reader, &mut writer, orchestrator, client)?;
                show_options(&mut writer)?;
            }
            "change_graph" => {
                change_graph(&mut reader, &mut writer, orchestrator, client)?;
                show_options(&mut writer)?;
            }
            "kruskal" | "prim" => {
                solve_and_report(&mut writer, orchestrator, client, &command)?;
                show_options(&mut writer)?;
            }
            _ => {
                send(&mut writer, "Invalid command.")?;
                show_options(&mut writer)?;
            }
        }
    }
    Ok(())
}

fn init_session<R: BufRead, W: Write>(
    reader: &mut R,
    writer: &mut W,
    orchestrator: &Orchestrator,
    client: ClientId,
) -> io::Result<()> {
    send(writer, "Enter number of vertices and edges:")?;
    let line = match read_trimmed(reader)? {
        Some(line) => line,
        None => return Ok(()),
    };
    let Some([vertices, edge_count]) = parse_fields::<2>(&line) else {
        send(writer, "Invalid number of vertices or edges.")?;
        return Ok(());
    };
    if vertices <= 0 || edge_count < 0 {
        send(writer, "Invalid number of vertices or edges.")?;
        return Ok(());
    }

    let mut graph = Graph::new(vertices as usize);
    send(writer, "Enter edges in format: source destination weight")?;
    for _ in 0..edge_count {
        let line = match read_trimmed(reader)? {
            Some(line) => line,
            None => return Ok(()),
        };
        match parse_edge_line(&line) {
            Some((u, v, w)) => {
                if let Err(err) = graph.add_edge(u, v, w) {
                    send(writer, &format!("Error: {err}"))?;
                }
            }
            None => send(writer, "Invalid edge line.")?,
        }
    }

    orchestrator.set_graph(client, graph);
    send(writer, "Graph initialized successfully. Visualizing graph...")?;
    // blocks this worker until the renderer is done, by contract
    let mut renderer = TextRenderer::new(&mut *writer);
    orchestrator
        .visualize_graph(client, &mut renderer)
        .expect("session was just created");
    Ok(())
}

fn change_graph<R: BufRead, W: Write>(
    reader: &mut R,
    writer: &mut W,
    orchestrator: &Orchestrator,
    client: ClientId,
) -> io::Result<()> {
    if !orchestrator.has_session(client) {
        return send(writer, "Please initialize a graph first using 'init' command.");
    }
    send(
        writer,
        "Enter what you want to do: add_edge, remove_edge, add_vertex, remove_vertex",
    )?;
    let subcommand = match read_trimmed(reader)? {
        Some(line) => line,
        None => return Ok(()),
    };

    let outcome = match subcommand.as_str() {
        "add_edge" => {
            send(writer, "Enter the edge in format: source destination weight")?;
            match read_trimmed(reader)? {
                Some(line) => match parse_edge_line(&line) {
                    Some((u, v, w)) => orchestrator
                        .add_edge(client, u, v, w)
                        .map(|()| "Edge added successfully."),
                    None => return send(writer, "Invalid edge line."),
                },
                None => return Ok(()),
            }
        }
        "remove_edge" => {
            send(writer, "Enter the edge in format: source destination")?;
            match read_trimmed(reader)? {
                Some(line) => match parse_vertex_pair(&line) {
                    Some((u, v)) => orchestrator
                        .remove_edge(client, u, v)
                        .map(|()| "Edge removed successfully."),
                    None => return send(writer, "Invalid edge line."),
                },
                None => return Ok(()),
            }
        }
        "add_vertex" => {
            send(writer, "Enter the vertex to add")?;
            match read_trimmed(reader)? {
                Some(line) => match parse_vertex(&line) {
                    Some(k) => orchestrator
                        .add_vertex(client, k)
                        .map(|()| "Vertex added successfully."),
                    None => return send(writer, "Invalid vertex."),
                },
                None => return Ok(()),
            }
        }
        "remove_vertex" => {
            send(writer, "Enter the vertex to remove")?;
            match read_trimmed(reader)? {
                Some(line) => match parse_vertex(&line) {
                    Some(i) => orchestrator
                        .remove_vertex(client, i)
                        .map(|()| "Vertex removed successfully."),
                    None => return send(writer, "Invalid vertex."),
                },
                None => return Ok(()),
            }
        }
        _ => return send(writer, "Invalid subcommand for change_graph."),
    };

    match outcome {
        Ok(message) => {
            let graph = orchestrator
                .graph_snapshot(client)
                .expect("session checked above");
            send(
                writer,
                &format!("{message} Updated graph:\n{}", render_graph(&graph)),
            )
        }
        Err(err) => send(writer, &format!("Error: {err}")),
    }
}

fn solve_and_report<W: Write>(
    writer: &mut W,
    orchestrator: &Orchestrator,
    client: ClientId,
    strategy: &str,
) -> io::Result<()> {
    if !orchestrator.has_session(client) {
        return send(writer, "Please initialize a graph first using 'init' command.");
    }

    if let Err(err) = orchestrator.solve_mst(client, strategy) {
        return send(writer, &format!("Error: {err}"));
    }
    let measurements = match orchestrator.calculate_measurements(client) {
        Ok(measurements) => measurements,
        Err(err) => return send(writer, &format!("Error: {err}")),
    };

    send(
        writer,
        &format!(
            "MST Results:\n\
             Total weight: {}\n\
             Longest distance: {}\n\
             Average distance: {}\n\
             Shortest MST distance: {}",
            measurements.total_weight,
            measurements.diameter,
            measurements.average_distance,
            measurements.min_edge_weight,
        ),
    )?;

    let mut renderer = TextRenderer::new(&mut *writer);
    orchestrator
        .visualize_mst(client, &mut renderer)
        .expect("result was just solved");
    Ok(())
}

fn send<W: Write>(writer: &mut W, message: &str) -> io::Result<()> {
    writer.write_all(message.as_bytes())?;
    writer.write_all(b"\n> ")?;
    writer.flush()
}

fn show_options<W: Write>(writer: &mut W) -> io::Result<()> {
    send(
        writer,
        "Available commands: init, change_graph, kruskal, prim, quit, exit",
    )
}

/// Reads one line, trimmed. `None` means the peer closed the connection.
fn read_trimmed<R: BufRead>(reader: &mut R) -> io::Result<Option<String>> {
    let mut line = String::new();
    if reader.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

/// Parses exactly `N` whitespace-separated integers.
fn parse_fields<const N: usize>(line: &str) -> Option<[i64; N]> {
    let mut fields = line.split_whitespace();
    let mut out = [0i64; N];
    for slot in &mut out {
        *slot = fields.next()?.parse().ok()?;
    }
    if fields.next().is_some() {
        return None;
    }
    Some(out)
}

fn parse_edge_line(line: &str) -> Option<(usize, usize, i64)> {
    let [u, v, w] = parse_fields::<3>(line)?;
    Some((usize::try_from(u).ok()?, usize::try_from(v).ok()?, w))
}

fn parse_vertex_pair(line: &str) -> Option<(usize, usize)> {
    let [u, v] = parse_fields::<2>(line)?;
    Some((usize::try_from(u).ok()?, usize::try_from(v).ok()?))
}

fn parse_vertex(line: &str) -> Option<usize> {
    let [v] = parse_fields::<1>(line)?;
    usize::try_from(v).ok()
}
