//! Stage runner: the consumer loop at the boundary of the core.
//!
//! A stage owns exactly one cursor and one worker. Its loop drains the
//! cursor while items are ready, hands each item to the worker, and when
//! the cursor runs dry suspends until shutdown or the next poll tick. An
//! explicit bounded loop — long runs never grow the stack.
//!
//! The worker is opaque to the core: it just accepts one item and returns
//! when its work is done. The core does not retry or time out a worker
//! that hangs; bounded work time is the surrounding system's assumption.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Notify;
use tracing::{debug, info};

use crate::cursor::Cursor;
use crate::error::Result;
use crate::model::Item;

/// The unit of work a stage performs per item.
pub trait Worker: Send {
    fn process(&mut self, item: &Item);
}

impl<F: FnMut(&Item) + Send> Worker for F {
    fn process(&mut self, item: &Item) {
        self(item)
    }
}

/// Configuration for a stage's idle behavior.
#[derive(Debug, Clone)]
pub struct StageConfig {
    /// How long to wait between polls when the cursor is dry.
    pub poll_interval: Duration,
}

impl Default for StageConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(500),
        }
    }
}

/// A consumer loop over one cursor.
pub struct Stage<W: Worker> {
    name: String,
    cursor: Cursor,
    worker: W,
    config: StageConfig,
    shutdown: Arc<Notify>,
}

impl<W: Worker> Stage<W> {
    pub fn new(name: impl Into<String>, cursor: Cursor, worker: W, config: StageConfig) -> Self {
        Self {
            name: name.into(),
            cursor,
            worker,
            config,
            shutdown: Arc::new(Notify::new()),
        }
    }

    /// Handle for signalling this stage to stop. The stage finishes its
    /// current drain before exiting.
    pub fn shutdown_handle(&self) -> Arc<Notify> {
        Arc::clone(&self.shutdown)
    }

    /// Run until shutdown. Each pass drains every currently ready item,
    /// then waits for either the shutdown signal or the poll interval.
    pub async fn run(&mut self) -> Result<()> {
        info!(stage = %self.name, "stage started");

        loop {
            let mut processed = 0usize;
            while let Some(item) = self.cursor.advance()? {
                debug!(stage = %self.name, id = %item.id, kind = %item.kind, "processing item");
                self.worker.process(&item);
                processed += 1;
            }
            if processed > 0 {
                debug!(stage = %self.name, processed, "drained");
            }

            tokio::select! {
                _ = self.shutdown.notified() => {
                    info!(stage = %self.name, "stage shutting down");
                    return Ok(());
                }
                _ = tokio::time::sleep(self.config.poll_interval) => {}
            }
        }
    }
}
