//! Fixed-size worker pool draining a shared FIFO task queue.
//!
//! `N` OS threads are spawned at startup and never grow or shrink. Each
//! worker takes one `(client, task)` pair at a time and runs the task
//! synchronously to completion, so at most `N` tasks execute concurrently
//! and a task that blocks (client I/O, a blocking render) occupies its
//! worker for its whole duration. There is no preemption, no priority and
//! no timeout.
//!
//! Shutdown is abrupt-drop by contract: the stop flag is raised, idle
//! workers wake and exit without starting new tasks, a worker mid-task
//! finishes that task first, and anything still queued is discarded. Callers
//! that need graceful completion must stop enqueueing and wait for in-flight
//! tasks before calling [`WorkerPool::shutdown`].

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

use crossbeam_channel::{Receiver, Sender};
use thiserror::Error;

use crate::session::ClientId;

/// A session task. Receives the identifier of the worker that runs it.
pub type Task = Box<dyn FnOnce(usize) + Send + 'static>;

enum Message {
    Run { client: ClientId, task: Task },
    /// Shutdown wake-up for a worker blocked on the queue.
    Wake,
}

/// Errors from worker pool operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PoolError {
    /// `enqueue` was called after the shutdown signal.
    #[error("worker pool has shut down")]
    ShutDown,
}

/// Fixed-size set of workers executing FIFO-queued session tasks.
pub struct WorkerPool {
    sender: Sender<Message>,
    stop: Arc<AtomicBool>,
    workers: Mutex<Vec<JoinHandle<()>>>,
    worker_count: usize,
}

impl WorkerPool {
    /// Spawns a pool with `worker_count` workers.
    ///
    /// # Panics
    /// Panics if `worker_count` is zero.
    pub fn new(worker_count: usize) -> Self {
        assert!(worker_count > 0, "worker pool needs at least one worker");

        let (sender, receiver) = crossbeam_channel::unbounded::<Message>();
        let stop = Arc::new(AtomicBool::new(false));

        let workers = (0..worker_count)
            .map(|id| {
                let receiver = receiver.clone();
                let stop = Arc::clone(&stop);
                std::thread::Builder::new()
                    .name(format!("spantree-worker-{id}"))
                    .spawn(move || worker_loop(id, receiver, stop))
                    .expect("failed to spawn worker thread")
            })
            .collect();

        WorkerPool {
            sender,
            stop,
            workers: Mutex::new(workers),
            worker_count,
        }
    }

    /// Number of workers, which bounds the number of concurrently served
    /// clients.
    pub fn worker_count(&self) -> usize {
        self.worker_count
    }

    /// Queues a task for `client`. Tasks start strictly in submission order.
    ///
    /// Rejected with [`PoolError::ShutDown`] once shutdown has been
    /// signaled.
    pub fn enqueue<F>(&self, client: ClientId, task: F) -> Result<(), PoolError>
    where
        F: FnOnce(usize) + Send + 'static,
    {
        if self.stop.load(Ordering::Acquire) {
            return Err(PoolError::ShutDown);
        }
        self.sender
            .send(Message::Run {
                client,
                task: Box::new(task),
            })
            .map_err(|_| PoolError::ShutDown)
    }

    /// Signals shutdown and blocks until every worker has exited.
    ///
    /// Idle workers exit without starting new tasks; workers mid-task finish
    /// that task first; queued tasks are discarded. Idempotent, and also
    /// invoked on drop.
    pub fn shutdown(&self) {
        self.stop.store(true, Ordering::Release);
        // one wake-up per worker; ignore failures once receivers are gone
        for _ in 0..self.worker_count {
            let _ = self.sender.send(Message::Wake);
        }

        let handles = {
            let mut workers = self.workers.lock().unwrap();
            std::mem::take(&mut *workers)
        };
        for handle in handles {
            let _ = handle.join();
        }
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn worker_loop(worker_id: usize, receiver: Receiver<Message>, stop: Arc<AtomicBool>) {
    loop {
        if stop.load(Ordering::Acquire) {
            break;
        }
        let message = match receiver.recv() {
            Ok(message) => message,
            Err(_) => break,
        };
        match message {
            Message::Run { client, task } => {
                if stop.load(Ordering::Acquire) {
                    // queued behind the stop signal: discard unrun
                    tracing::debug!(worker = worker_id, client = %client, "discarding queued task at shutdown");
                    break;
                }
                tracing::info!(worker = worker_id, client = %client, "serving client");
                task(worker_id);
            }
            Message::Wake => {}
        }
    }
    tracing::debug!(worker = worker_id, "worker exiting");
}
