use bytes::{BufMut, Bytes, BytesMut};

/// An entry to be appended to the log.
///
/// The sequencer treats entries as opaque: it only consults the recorded
/// length (for the size predicate) and holds the entry until the consumer
/// picks it up. Serialization happens downstream, in the appender.
pub trait AppendEntry: Send {
    /// Recorded length of the serialized entry in bytes, excluding framing.
    fn length(&self) -> usize;

    /// Writes exactly [`length`](AppendEntry::length) bytes into `buf`.
    fn write_to(&self, buf: &mut BytesMut);
}

/// A record entry backed by a shared byte payload.
///
/// Cloning is cheap; the payload is reference-counted, so hand-off to the
/// sequencer does not copy the data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordEntry {
    payload: Bytes,
}

impl RecordEntry {
    pub fn new(payload: impl Into<Bytes>) -> Self {
        Self {
            payload: payload.into(),
        }
    }

    pub fn payload(&self) -> &Bytes {
        &self.payload
    }
}

impl AppendEntry for RecordEntry {
    fn length(&self) -> usize {
        self.payload.len()
    }

    fn write_to(&self, buf: &mut BytesMut) {
        buf.put_slice(&self.payload);
    }
}
