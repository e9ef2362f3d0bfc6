pub mod entry;
pub mod error;
pub mod signal;
pub mod storage;

pub use entry::{AppendEntry, RecordEntry};
pub use error::{LogStreamError, StorageError, WriteError};
pub use signal::ConsumerSignal;
pub use storage::LogStorage;
