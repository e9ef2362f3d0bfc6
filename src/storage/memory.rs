use bytes::Bytes;
use parking_lot::RwLock;
use tokio::sync::Notify;

use crate::contracts::{LogStorage, StorageError};

/// One appended block and the position range it covers.
#[derive(Debug, Clone)]
pub struct StoredBlock {
    pub lowest_position: i64,
    pub highest_position: i64,
    pub block: Bytes,
}

/// In-process log storage keeping appended blocks in order.
///
/// Used in tests and as the storage seam for embedders that handle
/// durability elsewhere. Rejects blocks that arrive out of position order.
#[derive(Default)]
pub struct InMemoryLogStorage {
    blocks: RwLock<Vec<StoredBlock>>,
    on_append: Notify,
}

impl InMemoryLogStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn blocks(&self) -> Vec<StoredBlock> {
        self.blocks.read().clone()
    }

    pub fn block_count(&self) -> usize {
        self.blocks.read().len()
    }

    /// Highest position appended so far, if any block has been appended.
    pub fn highest_position(&self) -> Option<i64> {
        self.blocks.read().last().map(|block| block.highest_position)
    }

    /// Waits until a block covering `position` has been appended.
    pub async fn wait_for_position(&self, position: i64) {
        loop {
            let notified = self.on_append.notified();
            if self.highest_position().is_some_and(|highest| highest >= position) {
                return;
            }
            notified.await;
        }
    }

    fn push_block(
        &self,
        lowest_position: i64,
        highest_position: i64,
        block: Bytes,
    ) -> Result<(), StorageError> {
        if highest_position < lowest_position {
            return Err(StorageError::InvalidBounds {
                lowest: lowest_position,
                highest: highest_position,
            });
        }

        let mut blocks = self.blocks.write();
        if let Some(last) = blocks.last() {
            if lowest_position <= last.highest_position {
                return Err(StorageError::OutOfOrderAppend {
                    lowest: lowest_position,
                    highest: highest_position,
                    last: last.highest_position,
                });
            }
        }
        blocks.push(StoredBlock {
            lowest_position,
            highest_position,
            block,
        });
        Ok(())
    }
}

impl LogStorage for InMemoryLogStorage {
    async fn append(
        &self,
        lowest_position: i64,
        highest_position: i64,
        block: Bytes,
    ) -> Result<(), StorageError> {
        self.push_block(lowest_position, highest_position, block)?;
        self.on_append.notify_waiters();
        Ok(())
    }
}
