//! Property tests for the sequencer's position arithmetic and size predicate.

use bytes::Bytes;
use proptest::collection::vec;
use proptest::prelude::*;

use logstream::sequencer::frame::{FRAME_ALIGNMENT, HEADER_LENGTH};
use logstream::{RecordEntry, Sequencer, WriteError, QUEUE_CAPACITY};

fn entry() -> RecordEntry {
    RecordEntry::new(Bytes::from_static(b"p"))
}

proptest! {
    /// `can_write_events` is a pure function of its inputs and the
    /// configured fragment size.
    #[test]
    fn can_write_events_matches_the_framing_formula(
        event_count in 0usize..1_000,
        batch_size in 0usize..(1 << 20),
        max_fragment_size in 0usize..(1 << 22),
    ) {
        let sequencer: Sequencer<RecordEntry> = Sequencer::new(0, 1, max_fragment_size);

        let framed = batch_size
            + event_count * (HEADER_LENGTH + FRAME_ALIGNMENT)
            + FRAME_ALIGNMENT;
        let expected = framed <= max_fragment_size;

        prop_assert_eq!(sequencer.can_write_events(event_count, batch_size), expected);
        // Same answer on a second call: no state was touched.
        prop_assert_eq!(sequencer.can_write_events(event_count, batch_size), expected);
    }

    /// Successful batch writes fill `[first, first + n)` contiguously and
    /// return `first + n - 1`; empty batches return 0 and leave no trace.
    #[test]
    fn batch_writes_tile_positions_contiguously(
        initial_position in 1i64..(1 << 40),
        batch_sizes in vec(0usize..=8, 1..20),
    ) {
        let sequencer = Sequencer::new(0, initial_position, 4 * 1024 * 1024);

        let mut expected_next = initial_position;
        let mut expected_batches = Vec::new();
        for &batch_size in &batch_sizes {
            let entries: Vec<_> = (0..batch_size).map(|_| entry()).collect();
            let result = sequencer.try_write_batch(entries, 0).unwrap();
            if batch_size == 0 {
                prop_assert_eq!(result, 0);
            } else {
                prop_assert_eq!(result, expected_next + batch_size as i64 - 1);
                expected_batches.push((expected_next, batch_size));
                expected_next += batch_size as i64;
            }
        }
        prop_assert_eq!(sequencer.position(), expected_next);

        for (expected_first, expected_len) in expected_batches {
            let batch = sequencer.try_read().unwrap();
            prop_assert_eq!(batch.first_position(), expected_first);
            prop_assert_eq!(batch.len(), expected_len);
            prop_assert_eq!(
                batch.highest_position(),
                expected_first + expected_len as i64 - 1
            );
        }
        prop_assert!(sequencer.try_read().is_none());
    }

    /// A rejected write has no side effects: the next accepted write gets the
    /// position the rejected one would have received.
    #[test]
    fn rejection_does_not_advance_the_position(
        initial_position in 1i64..(1 << 40),
    ) {
        let sequencer = Sequencer::new(0, initial_position, 4 * 1024 * 1024);

        for _ in 0..QUEUE_CAPACITY {
            sequencer.try_write(entry(), 0).unwrap();
        }
        let tentative = sequencer.position();
        prop_assert_eq!(sequencer.try_write(entry(), 0), Err(WriteError::QueueFull));
        prop_assert_eq!(sequencer.position(), tentative);

        sequencer.try_read().unwrap();
        prop_assert_eq!(sequencer.try_write(entry(), 0), Ok(tentative));
    }

    /// Source positions are transported verbatim, whatever their value.
    #[test]
    fn source_positions_are_transported_verbatim(
        source_positions in vec(any::<i64>(), 1..20),
    ) {
        let sequencer = Sequencer::new(0, 1, 4 * 1024 * 1024);

        for &source_position in &source_positions {
            sequencer.try_write(entry(), source_position).unwrap();
        }
        for &source_position in &source_positions {
            let batch = sequencer.try_read().unwrap();
            prop_assert_eq!(batch.source_position(), source_position);
        }
    }
}
