use thiserror::Error;

#[derive(Error, Debug)]
pub enum LogStreamError {
    #[error("Write rejected: {0}")]
    Write(#[from] WriteError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Producer-side rejections. Both are expected conditions: a full queue is
/// transient, a closed sequencer is terminal. Retry policy lives with the
/// producer.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteError {
    #[error("sequencer queue is full")]
    QueueFull,

    #[error("sequencer is closed")]
    Closed,
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("invalid block bounds: {lowest}..{highest}")]
    InvalidBounds { lowest: i64, highest: i64 },

    #[error("append out of order: block {lowest}..{highest} after position {last}")]
    OutOfOrderAppend { lowest: i64, highest: i64, last: i64 },

    #[error("IO error: {0}")]
    Io(String),
}
