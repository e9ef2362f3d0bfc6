use std::future::Future;

use bytes::Bytes;

use crate::contracts::error::StorageError;

/// Durable storage the appender writes sequenced blocks into.
///
/// # Invariants
/// - Blocks arrive in position order: each call's `lowest_position` is
///   greater than the previous call's `highest_position`.
/// - One block holds exactly one sequenced batch; the positions
///   `lowest_position..=highest_position` map to its entries in order.
pub trait LogStorage: Send + Sync {
    /// Appends one framed block covering the given position range.
    fn append(
        &self,
        lowest_position: i64,
        highest_position: i64,
        block: Bytes,
    ) -> impl Future<Output = Result<(), StorageError>> + Send;
}
