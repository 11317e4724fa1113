//! Thread-pool completion dispatcher.
//!
//! Callers post a task together with a [`Completion`] record; a fixed pool
//! of worker threads drains the queue and invokes
//! [`Task::complete`] on each. The channel is the only synchronization:
//! tasks are shared via `Arc`, completions are plain values, and shutdown is
//! one poison message per worker.
//!
//! Dropping the [`Dispatcher`] delivers every completion posted before the
//! drop, then joins the workers. Completions posted through a
//! [`DispatchHandle`] after the dispatcher is gone are silently discarded.
//!
//! # Example
//!
//! ```
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use std::sync::Arc;
//! use weft_task::{Completion, Dispatcher, Task};
//!
//! struct Transfer {
//!     total: AtomicUsize,
//! }
//!
//! impl Task for Transfer {
//!     fn complete(&self, completion: Completion) {
//!         self.total.fetch_add(completion.bytes, Ordering::SeqCst);
//!     }
//! }
//!
//! let transfer = Arc::new(Transfer { total: AtomicUsize::new(0) });
//!
//! let dispatcher = Dispatcher::new(2).unwrap();
//! dispatcher.post(transfer.clone(), Completion { bytes: 512, token: 1 });
//! dispatcher.post(transfer.clone(), Completion { bytes: 256, token: 2 });
//! drop(dispatcher); // drains the queue
//!
//! assert_eq!(transfer.total.load(Ordering::SeqCst), 768);
//! ```

#![warn(missing_docs)]

use std::io;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam_channel::{Receiver, Sender};
use tracing::debug;

/// The result of one posted operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Completion {
    /// Number of bytes the operation transferred.
    pub bytes: usize,
    /// Caller-chosen context identifying the operation within the task.
    pub token: u64,
}

/// A unit of work that receives completion callbacks.
///
/// `complete` runs on a worker thread, possibly concurrently with other
/// completions for the same task; implementations synchronize their own
/// state.
pub trait Task: Send + Sync {
    /// Called once for each completion posted against this task.
    fn complete(&self, completion: Completion);
}

enum Message {
    Complete(Arc<dyn Task>, Completion),
    Shutdown,
}

/// Posts completions into a [`Dispatcher`]'s queue from anywhere.
///
/// Handles are cheap to clone and may outlive the dispatcher; posts after
/// the dispatcher is dropped are discarded.
#[derive(Clone)]
pub struct DispatchHandle {
    tx: Sender<Message>,
}

impl DispatchHandle {
    /// Queues a completion for delivery on a worker thread.
    pub fn post(&self, task: Arc<dyn Task>, completion: Completion) {
        let _ = self.tx.send(Message::Complete(task, completion));
    }
}

/// A fixed pool of worker threads delivering posted completions.
///
/// See the [module docs](self) for the shutdown contract.
pub struct Dispatcher {
    tx: Sender<Message>,
    workers: Vec<JoinHandle<()>>,
}

impl Dispatcher {
    /// Spawns `threads` worker threads over a shared unbounded queue.
    ///
    /// Returns the spawn error if the OS refuses a thread.
    ///
    /// # Panics
    ///
    /// Panics if `threads` is zero; a workerless dispatcher would queue
    /// completions forever.
    pub fn new(threads: usize) -> io::Result<Self> {
        assert!(threads > 0, "dispatcher needs at least one worker thread");

        let (tx, rx) = crossbeam_channel::unbounded();
        let mut workers = Vec::with_capacity(threads);
        for index in 0..threads {
            let rx = rx.clone();
            let handle = thread::Builder::new()
                .name(format!("task-{index}"))
                .spawn(move || worker(rx))?;
            workers.push(handle);
        }

        Ok(Self { tx, workers })
    }

    /// Queues a completion for delivery on a worker thread.
    pub fn post(&self, task: Arc<dyn Task>, completion: Completion) {
        let _ = self.tx.send(Message::Complete(task, completion));
    }

    /// Returns a cloneable posting handle.
    pub fn handle(&self) -> DispatchHandle {
        DispatchHandle {
            tx: self.tx.clone(),
        }
    }

    /// Returns the number of worker threads.
    pub fn workers(&self) -> usize {
        self.workers.len()
    }
}

impl Drop for Dispatcher {
    // One shutdown message per worker; the queue is FIFO, so everything
    // posted before the drop is delivered first.
    fn drop(&mut self) {
        for _ in &self.workers {
            let _ = self.tx.send(Message::Shutdown);
        }
        for handle in self.workers.drain(..) {
            let _ = handle.join();
        }
    }
}

fn worker(rx: Receiver<Message>) {
    debug!("dispatch worker started");
    while let Ok(message) = rx.recv() {
        match message {
            Message::Complete(task, completion) => task.complete(completion),
            Message::Shutdown => break,
        }
    }
    debug!("dispatch worker stopped");
}
