//! Background appender that drains the sequencer and writes framed blocks to
//! log storage.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::RwLock;
use tokio::sync::Notify;
use tokio::task::JoinHandle;

use crate::contracts::{AppendEntry, ConsumerSignal, LogStorage, StorageError};
use crate::metrics::AppenderMetrics;
use crate::sequencer::{frame, Sequencer};

/// Configuration for the log storage appender.
#[derive(Debug, Clone)]
pub struct AppenderConfig {
    /// Safety-net drain interval when no wake-up signal arrives. The
    /// sequencer's signal is the primary trigger; this bounds staleness if a
    /// wake-up is lost to coalescing races.
    pub poll_interval: Duration,
}

impl Default for AppenderConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(100),
        }
    }
}

/// The single consumer of a [`Sequencer`].
///
/// Registers a wake-up signal with the sequencer, then drains the queue one
/// batch at a time: each sequenced batch becomes exactly one framed block,
/// appended with its `(lowest, highest)` position bounds. Blocks therefore
/// reach storage in position order.
///
/// Stopping the appender drains the queue once more before the task exits,
/// so a closed sequencer is fully flushed.
pub struct LogStorageAppender<E, S>
where
    E: AppendEntry + 'static,
    S: LogStorage + 'static,
{
    sequencer: Arc<Sequencer<E>>,
    storage: Arc<S>,
    config: AppenderConfig,
    /// Flag to signal shutdown
    shutdown: Arc<AtomicBool>,
    /// Wake-up registered with the sequencer
    wakeup: Arc<Notify>,
    /// Handle to the background task
    task_handle: RwLock<Option<JoinHandle<()>>>,
    metrics: Arc<AppenderMetrics>,
}

impl<E, S> LogStorageAppender<E, S>
where
    E: AppendEntry + 'static,
    S: LogStorage + 'static,
{
    pub fn new(storage: Arc<S>, sequencer: Arc<Sequencer<E>>, config: AppenderConfig) -> Self {
        let metrics = Arc::new(AppenderMetrics::new(sequencer.partition_id()));
        Self {
            sequencer,
            storage,
            config,
            shutdown: Arc::new(AtomicBool::new(false)),
            wakeup: Arc::new(Notify::new()),
            task_handle: RwLock::new(None),
            metrics,
        }
    }

    pub fn metrics(&self) -> Arc<AppenderMetrics> {
        Arc::clone(&self.metrics)
    }

    /// Starts the appender background task and registers its wake-up signal
    /// with the sequencer. Must be called from within a tokio runtime.
    pub fn start(&self) {
        self.shutdown.store(false, Ordering::SeqCst);
        self.sequencer
            .register_consumer(Arc::clone(&self.wakeup) as Arc<dyn ConsumerSignal>);

        let sequencer = Arc::clone(&self.sequencer);
        let storage = Arc::clone(&self.storage);
        let shutdown = Arc::clone(&self.shutdown);
        let wakeup = Arc::clone(&self.wakeup);
        let metrics = Arc::clone(&self.metrics);
        let poll_interval = self.config.poll_interval;

        let handle = tokio::spawn(async move {
            let partition_id = sequencer.partition_id();
            tracing::info!(partition_id, "appender task started");

            loop {
                if let Err(error) = Self::drain(&sequencer, &storage, &metrics).await {
                    tracing::error!(
                        partition_id,
                        error = %error,
                        "append to log storage failed, stopping appender"
                    );
                    break;
                }

                if shutdown.load(Ordering::SeqCst) {
                    break;
                }

                tokio::select! {
                    _ = wakeup.notified() => {}
                    _ = tokio::time::sleep(poll_interval) => {}
                }
            }

            tracing::info!(partition_id, "appender task stopped");
        });

        *self.task_handle.write() = Some(handle);
    }

    /// Stops the appender after a final drain of the sequencer queue.
    pub async fn stop(&self) {
        self.shutdown.store(true, Ordering::SeqCst);
        self.wakeup.notify_one();

        let handle = self.task_handle.write().take();
        if let Some(handle) = handle {
            let _ = handle.await;
        }
    }

    /// Drains the sequencer until `try_read` returns empty, appending one
    /// block per batch.
    async fn drain(
        sequencer: &Sequencer<E>,
        storage: &S,
        metrics: &AppenderMetrics,
    ) -> Result<(), StorageError> {
        while let Some(batch) = sequencer.try_read() {
            let started = Instant::now();
            let block = frame::frame_batch(sequencer.partition_id(), &batch);
            let block_length = block.len();

            storage
                .append(batch.first_position(), batch.highest_position(), block)
                .await?;

            metrics.record_append(
                batch.len() as u64,
                block_length as u64,
                started.elapsed().as_micros() as u64,
            );
            tracing::trace!(
                partition_id = sequencer.partition_id(),
                lowest_position = batch.first_position(),
                highest_position = batch.highest_position(),
                entries = batch.len(),
                bytes = block_length,
                "appended block to log storage"
            );
        }
        Ok(())
    }
}
