//! The sequencer is a multiple-producer, single-consumer queue of append
//! entries. It buffers a fixed number of batches and rejects writes when the
//! queue is full. The consumer reads at its own pace via [`Sequencer::try_read`]
//! or registers a [`ConsumerSignal`] to be woken when new batches arrive.
//!
//! All entries are assigned a position, and that position is made available
//! to the consumer. Entries are held by reference until hand-off; the
//! sequencer never copies or serializes them.

pub mod frame;

mod batch;

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};

pub use batch::SequencedBatch;

use crate::contracts::{AppendEntry, ConsumerSignal, WriteError};
use crate::metrics::SequencerMetrics;
use crate::sequencer::frame::{FRAME_ALIGNMENT, HEADER_LENGTH};

/// Fixed capacity of the batch queue.
pub const QUEUE_CAPACITY: usize = 128;

pub struct Sequencer<E> {
    partition_id: u32,
    max_fragment_size: usize,
    /// Mutated only inside the critical section; read without the lock by
    /// diagnostics, which may observe a slightly stale value.
    position: AtomicI64,
    closed: AtomicBool,
    consumer: RwLock<Option<Arc<dyn ConsumerSignal>>>,
    queue: Mutex<VecDeque<SequencedBatch<E>>>,
    metrics: Arc<SequencerMetrics>,
}

impl<E: AppendEntry> Sequencer<E> {
    /// Creates a sequencer for one partition. `initial_position` seeds the
    /// position counter; `max_fragment_size` bounds
    /// [`can_write_events`](Sequencer::can_write_events).
    pub fn new(partition_id: u32, initial_position: i64, max_fragment_size: usize) -> Self {
        tracing::trace!(partition_id, initial_position, "starting new sequencer");
        Self {
            partition_id,
            max_fragment_size,
            position: AtomicI64::new(initial_position),
            closed: AtomicBool::new(false),
            consumer: RwLock::new(None),
            queue: Mutex::new(VecDeque::with_capacity(QUEUE_CAPACITY)),
            metrics: Arc::new(SequencerMetrics::new(partition_id)),
        }
    }

    /// Pure size predicate: would a batch of `event_count` entries totalling
    /// `batch_size` bytes fit in one fragment once framed? Does not consult
    /// queue occupancy.
    pub fn can_write_events(&self, event_count: usize, batch_size: usize) -> bool {
        let framed_batch_length =
            batch_size + event_count * (HEADER_LENGTH + FRAME_ALIGNMENT) + FRAME_ALIGNMENT;
        framed_batch_length <= self.max_fragment_size
    }

    /// Appends a single entry.
    ///
    /// Returns the assigned position, or [`WriteError::QueueFull`] /
    /// [`WriteError::Closed`] if the write was rejected. A rejected write has
    /// no side effects: the position counter does not move.
    pub fn try_write(&self, entry: E, source_position: i64) -> Result<i64, WriteError> {
        if self.is_closed() {
            tracing::warn!(
                partition_id = self.partition_id,
                "rejecting write, sequencer is closed"
            );
            self.metrics.record_rejection();
            return Err(WriteError::Closed);
        }

        let mut queue = self.queue.lock();
        if queue.len() >= QUEUE_CAPACITY {
            tracing::trace!(
                partition_id = self.partition_id,
                "rejecting write, sequencer queue is full"
            );
            self.metrics.record_rejection();
            self.metrics.set_queue_depth(queue.len());
            return Err(WriteError::QueueFull);
        }

        let current_position = self.position.load(Ordering::Relaxed);
        queue.push_back(SequencedBatch::new(
            current_position,
            source_position,
            vec![entry],
        ));
        self.signal_consumer();
        self.metrics.observe_batch_size(1);
        self.metrics.record_accepted();
        self.position.store(current_position + 1, Ordering::Relaxed);
        self.metrics.set_queue_depth(queue.len());
        Ok(current_position)
    }

    /// Appends a batch of entries in iteration order.
    ///
    /// Returns the highest assigned position (`first + n - 1`) on success,
    /// `Ok(0)` if the batch was empty, or a [`WriteError`] if rejected. The
    /// empty-batch result is distinguishable from an assigned position
    /// because initial positions are always positive.
    pub fn try_write_batch<I>(&self, entries: I, source_position: i64) -> Result<i64, WriteError>
    where
        I: IntoIterator<Item = E>,
    {
        if self.is_closed() {
            tracing::warn!(
                partition_id = self.partition_id,
                "rejecting batch write, sequencer is closed"
            );
            self.metrics.record_rejection();
            return Err(WriteError::Closed);
        }

        // The iterator may be single-pass; materialize it before taking the
        // lock so its length is known and no user code runs under the lock.
        let entries: Vec<E> = entries.into_iter().collect();
        let batch_size = entries.len();
        if batch_size == 0 {
            return Ok(0);
        }

        let mut queue = self.queue.lock();
        if queue.len() >= QUEUE_CAPACITY {
            tracing::trace!(
                partition_id = self.partition_id,
                batch_size,
                "rejecting batch write, sequencer queue is full"
            );
            self.metrics.record_rejection();
            self.metrics.set_queue_depth(queue.len());
            // Drain hint: wake the consumer even though nothing was enqueued.
            self.signal_consumer();
            return Err(WriteError::QueueFull);
        }

        let first_position = self.position.load(Ordering::Relaxed);
        queue.push_back(SequencedBatch::new(
            first_position,
            source_position,
            entries,
        ));
        self.signal_consumer();
        self.metrics.observe_batch_size(batch_size);
        self.metrics.record_accepted();
        let next_position = first_position + batch_size as i64;
        self.position.store(next_position, Ordering::Relaxed);
        self.metrics.set_queue_depth(queue.len());
        Ok(next_position - 1)
    }

    /// Removes and returns the oldest batch, if any. Allowed after
    /// [`close`](Sequencer::close) so the queue can drain.
    pub fn try_read(&self) -> Option<SequencedBatch<E>> {
        self.queue.lock().pop_front()
    }

    /// Returns a copy of the oldest batch without removing it.
    pub fn peek(&self) -> Option<SequencedBatch<E>>
    where
        E: Clone,
    {
        self.queue.lock().front().cloned()
    }

    /// Closes the sequencer for writing; idempotent. Reads stay allowed so
    /// the consumer can drain. Closing is not atomic with in-flight writes:
    /// producers already inside the critical section complete.
    pub fn close(&self) {
        tracing::info!(
            partition_id = self.partition_id,
            "closing sequencer for writing"
        );
        self.closed.store(true, Ordering::Release);
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Registers the consumer's wake-up signal and fires it once, covering
    /// batches that were enqueued before registration.
    pub fn register_consumer(&self, signal: Arc<dyn ConsumerSignal>) {
        *self.consumer.write() = Some(Arc::clone(&signal));
        signal.signal();
    }

    /// Next position to be assigned. Diagnostic only; the value may be
    /// slightly stale under concurrent writes.
    pub fn position(&self) -> i64 {
        self.position.load(Ordering::Relaxed)
    }

    pub fn partition_id(&self) -> u32 {
        self.partition_id
    }

    pub fn metrics(&self) -> Arc<SequencerMetrics> {
        Arc::clone(&self.metrics)
    }

    fn signal_consumer(&self) {
        if let Some(consumer) = self.consumer.read().as_ref() {
            consumer.signal();
        }
    }
}
