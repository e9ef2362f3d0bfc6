/// A batch of entries with its assigned position range.
///
/// Created inside the sequencer's critical section on a successful write and
/// immutable from then on. The `i`-th entry implicitly has position
/// `first_position + i`; the consumer must preserve that mapping end-to-end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequencedBatch<E> {
    first_position: i64,
    source_position: i64,
    entries: Vec<E>,
}

impl<E> SequencedBatch<E> {
    pub(crate) fn new(first_position: i64, source_position: i64, entries: Vec<E>) -> Self {
        Self {
            first_position,
            source_position,
            entries,
        }
    }

    /// Position assigned to the first entry.
    pub fn first_position(&self) -> i64 {
        self.first_position
    }

    /// Position assigned to the last entry.
    pub fn highest_position(&self) -> i64 {
        self.first_position + self.entries.len() as i64 - 1
    }

    /// Back-pointer to the upstream record whose processing produced this
    /// batch. Transported verbatim, never interpreted.
    pub fn source_position(&self) -> i64 {
        self.source_position
    }

    pub fn entries(&self) -> &[E] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<E> {
        self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
