//! Fan-out write pipeline
//!
//! With parallelism `0` every document is written inline, in delivery order.
//! Otherwise documents go through a bounded queue to a fixed pool of worker
//! tasks that share one writer behind a mutex. A full queue blocks the
//! producer; order across workers is not preserved.

use crate::core::cancel::Cancellation;
use crate::core::sink::DocumentWriter;
use crate::domain::{Hit, Result, SampleError};
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;

type SharedReceiver = Arc<Mutex<mpsc::Receiver<Hit>>>;

enum Mode<W> {
    Inline(W),
    FanOut {
        sender: mpsc::Sender<Hit>,
        writer: Arc<Mutex<W>>,
        workers: Vec<JoinHandle<Result<u64>>>,
    },
}

/// Routes accepted documents to a writer
pub struct Pipeline<W> {
    mode: Mode<W>,
    cancel: Cancellation,
}

impl<W> Pipeline<W>
where
    W: DocumentWriter + 'static,
{
    /// Start a pipeline around `writer`
    ///
    /// `parallelism` is the worker count (`0` writes inline) and
    /// `queue_capacity` the number of documents that may wait in the queue.
    pub fn start(writer: W, parallelism: usize, queue_capacity: usize, cancel: Cancellation) -> Self {
        if parallelism == 0 {
            return Self {
                mode: Mode::Inline(writer),
                cancel,
            };
        }

        let (sender, receiver) = mpsc::channel(queue_capacity.max(1));
        let receiver: SharedReceiver = Arc::new(Mutex::new(receiver));
        let writer = Arc::new(Mutex::new(writer));

        let workers = (0..parallelism)
            .map(|worker| {
                tokio::spawn(run_worker(
                    worker,
                    Arc::clone(&receiver),
                    Arc::clone(&writer),
                    cancel.clone(),
                ))
            })
            .collect();

        tracing::debug!(parallelism, queue_capacity, "Started write workers");

        Self {
            mode: Mode::FanOut {
                sender,
                writer,
                workers,
            },
            cancel,
        }
    }

    /// Whether documents are written by a worker pool
    pub fn is_parallel(&self) -> bool {
        matches!(self.mode, Mode::FanOut { .. })
    }

    /// Hand one document to the writer
    ///
    /// Waits for queue space when the workers are behind.
    pub async fn deliver(&mut self, hit: Hit) -> Result<()> {
        match &mut self.mode {
            Mode::Inline(writer) => {
                self.cancel.check()?;
                writer.write_document(&hit)
            }
            Mode::FanOut { sender, .. } => {
                tokio::select! {
                    biased;
                    _ = self.cancel.cancelled() => Err(SampleError::Interrupted),
                    sent = sender.send(hit) => sent.map_err(|_| {
                        SampleError::Output("all write workers have stopped".to_string())
                    }),
                }
            }
        }
    }

    /// Drain the queue, stop the workers and hand the writer back
    ///
    /// # Errors
    ///
    /// Returns the first error reported by a worker.
    pub async fn finish(self) -> Result<W> {
        let (sender, writer, workers) = match self.mode {
            Mode::Inline(writer) => return Ok(writer),
            Mode::FanOut {
                sender,
                writer,
                workers,
            } => (sender, writer, workers),
        };

        drop(sender);

        let mut first_error = None;
        let mut written = 0;
        for outcome in futures::future::join_all(workers).await {
            match outcome {
                Ok(Ok(n)) => written += n,
                Ok(Err(e)) => {
                    first_error.get_or_insert(e);
                }
                Err(e) => {
                    first_error.get_or_insert(SampleError::Other(format!("write worker panicked: {e}")));
                }
            }
        }

        if let Some(e) = first_error {
            return Err(e);
        }

        tracing::debug!(written, "Write workers drained");

        Arc::try_unwrap(writer)
            .map(Mutex::into_inner)
            .map_err(|_| SampleError::Other("writer is still shared after shutdown".to_string()))
    }
}

async fn run_worker<W: DocumentWriter>(
    worker: usize,
    receiver: SharedReceiver,
    writer: Arc<Mutex<W>>,
    cancel: Cancellation,
) -> Result<u64> {
    let mut written = 0;

    loop {
        let next = {
            let mut receiver = receiver.lock().await;
            tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(SampleError::Interrupted),
                hit = receiver.recv() => hit,
            }
        };

        let Some(hit) = next else {
            break;
        };

        if let Err(e) = writer.lock().await.write_document(&hit) {
            tracing::error!(worker, id = %hit.id, error = %e, "Write worker failed");
            return Err(e);
        }
        written += 1;
    }

    Ok(written)
}
