//! Append sequencer for a partitioned log stream.
//!
//! Producers submit entries or batches of entries to the [`Sequencer`], which
//! assigns every entry a monotonically increasing log position and buffers
//! the batch in a bounded queue. The sequencer rejects writes when the queue
//! is full instead of blocking. A single consumer, typically the
//! [`appender::LogStorageAppender`], drains the queue at its own pace and may
//! register a [`ConsumerSignal`] to be woken when new batches arrive.
//!
//! The sequencer does not copy or serialize entry payloads; it only holds
//! them until they are handed off to the consumer.

pub mod appender;
pub mod contracts;
pub mod metrics;
pub mod sequencer;
pub mod storage;

pub use contracts::{
    AppendEntry, ConsumerSignal, LogStorage, LogStreamError, RecordEntry, StorageError, WriteError,
};
pub use sequencer::{SequencedBatch, Sequencer, QUEUE_CAPACITY};
