//! Frame descriptor shared between the sequencer's size predicate and the
//! appender's block serializer.
//!
//! Each entry is framed as a fixed header followed by the payload, padded to
//! [`FRAME_ALIGNMENT`]. Header layout (little-endian):
//!
//! ```text
//! offset 0  u32  frame length (header + payload, unpadded)
//! offset 4  u16  frame version
//! offset 6  u8   flags
//! offset 7  u8   reserved
//! offset 8  u32  partition id
//! ```

use bytes::{BufMut, Bytes, BytesMut};

use crate::contracts::AppendEntry;
use crate::sequencer::SequencedBatch;

/// Byte alignment boundary for each framed entry and for the overall block.
pub const FRAME_ALIGNMENT: usize = 8;

/// Fixed byte count prepended to each framed entry.
pub const HEADER_LENGTH: usize = 12;

pub(crate) const FRAME_VERSION: u16 = 1;

/// Rounds `length` up to the next alignment boundary.
pub const fn align(length: usize) -> usize {
    (length + FRAME_ALIGNMENT - 1) & !(FRAME_ALIGNMENT - 1)
}

/// Aligned on-the-wire length of a single framed entry.
pub const fn framed_length(entry_length: usize) -> usize {
    align(entry_length + HEADER_LENGTH)
}

/// Serializes a sequenced batch into one contiguous block.
///
/// Entries keep their queue order, so the `i`-th frame in the block carries
/// the entry at position `first_position + i`.
pub fn frame_batch<E: AppendEntry>(partition_id: u32, batch: &SequencedBatch<E>) -> Bytes {
    let capacity: usize = batch
        .entries()
        .iter()
        .map(|entry| framed_length(entry.length()))
        .sum();
    let mut block = BytesMut::with_capacity(capacity);

    for entry in batch.entries() {
        let frame_length = HEADER_LENGTH + entry.length();
        block.put_u32_le(frame_length as u32);
        block.put_u16_le(FRAME_VERSION);
        block.put_u8(0); // flags
        block.put_u8(0); // reserved
        block.put_u32_le(partition_id);

        let payload_start = block.len();
        entry.write_to(&mut block);
        debug_assert_eq!(block.len() - payload_start, entry.length());

        block.put_bytes(0, align(frame_length) - frame_length);
    }

    block.freeze()
}
