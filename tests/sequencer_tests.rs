//! Integration tests exercising the producer/consumer contract through the
//! public API.

use std::sync::Arc;

use bytes::Bytes;
use logstream::metrics::MetricsRegistry;
use logstream::{LogStreamError, RecordEntry, Sequencer, WriteError, QUEUE_CAPACITY};

const MAX_FRAGMENT_SIZE: usize = 4 * 1024 * 1024;

fn entry(payload: &'static [u8]) -> RecordEntry {
    RecordEntry::new(Bytes::from_static(payload))
}

#[test]
fn writes_and_reads_interleave_without_reordering() {
    let sequencer = Sequencer::new(1, 2, MAX_FRAGMENT_SIZE);

    assert_eq!(sequencer.try_write(entry(b"a"), 0), Ok(2));
    assert_eq!(sequencer.try_write(entry(b"b"), 0), Ok(3));

    let first = sequencer.try_read().unwrap();
    assert_eq!(first.first_position(), 2);
    assert_eq!(first.entries()[0].payload().as_ref(), b"a");

    assert_eq!(sequencer.try_write(entry(b"c"), 0), Ok(4));

    let second = sequencer.try_read().unwrap();
    assert_eq!(second.first_position(), 3);
    let third = sequencer.try_read().unwrap();
    assert_eq!(third.first_position(), 4);
    assert_eq!(third.entries()[0].payload().as_ref(), b"c");
    assert!(sequencer.try_read().is_none());
}

#[test]
fn drain_after_recovery_from_full_queue_has_no_gaps() {
    let sequencer = Sequencer::new(1, 1, MAX_FRAGMENT_SIZE);

    for _ in 0..QUEUE_CAPACITY {
        sequencer.try_write(entry(b"x"), 0).unwrap();
    }
    assert_eq!(
        sequencer.try_write(entry(b"x"), 0),
        Err(WriteError::QueueFull)
    );

    // Drain everything, then keep writing: the position space stays gapless
    // across the rejection.
    let mut expected = 1;
    while let Some(batch) = sequencer.try_read() {
        assert_eq!(batch.first_position(), expected);
        expected += batch.len() as i64;
    }
    assert_eq!(sequencer.try_write(entry(b"x"), 0), Ok(expected));
}

#[test]
fn entries_keep_their_payloads_through_handoff() {
    let sequencer = Sequencer::new(1, 10, MAX_FRAGMENT_SIZE);
    let payloads: Vec<&'static [u8]> = vec![b"first", b"second", b"third"];

    let entries: Vec<_> = payloads.iter().map(|p| entry(p)).collect();
    assert_eq!(sequencer.try_write_batch(entries, 42), Ok(12));

    let batch = sequencer.try_read().unwrap();
    assert_eq!(batch.source_position(), 42);
    for (i, read_back) in batch.entries().iter().enumerate() {
        assert_eq!(read_back.payload().as_ref(), payloads[i]);
    }
}

#[test]
fn sequencer_metrics_reflect_queue_activity() {
    let sequencer = Sequencer::new(3, 1, MAX_FRAGMENT_SIZE);
    let metrics = sequencer.metrics();

    sequencer.try_write(entry(b"a"), 0).unwrap();
    sequencer
        .try_write_batch(vec![entry(b"b"), entry(b"c")], 0)
        .unwrap();
    assert_eq!(metrics.writes_accepted(), 2);
    assert_eq!(metrics.queue_depth(), 2);

    sequencer.close();
    assert_eq!(sequencer.try_write(entry(b"d"), 0), Err(WriteError::Closed));
    assert_eq!(metrics.writes_rejected(), 1);
}

#[test]
fn rejections_convert_into_the_umbrella_error() {
    let sequencer = Sequencer::new(1, 1, MAX_FRAGMENT_SIZE);
    sequencer.close();

    let error: LogStreamError = sequencer.try_write(entry(b"a"), 0).unwrap_err().into();
    assert!(matches!(
        error,
        LogStreamError::Write(WriteError::Closed)
    ));
    assert_eq!(error.to_string(), "Write rejected: sequencer is closed");
}

#[test]
fn registry_exposes_per_partition_metrics() {
    let registry = MetricsRegistry::new();
    let sequencer = Arc::new(Sequencer::new(5, 1, MAX_FRAGMENT_SIZE));
    registry.register_sequencer(sequencer.metrics());

    sequencer.try_write(entry(b"a"), 0).unwrap();

    let output = registry.format_prometheus();
    assert!(output.contains("logstream_sequencer_writes_accepted_total{partition=\"5\"} 1"));
    assert!(output.contains("logstream_sequencer_queue_depth{partition=\"5\"} 1"));
}
