//! Per-partition metrics for the sequencer and the appender, plus a registry
//! that aggregates them into Prometheus exposition format.

use std::fmt::Write;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::DashMap;

use super::histogram::{Histogram, BATCH_SIZE_BUCKETS};

/// Registry aggregating metrics for all partitions hosted by this process.
#[derive(Default)]
pub struct MetricsRegistry {
    sequencers: DashMap<u32, Arc<SequencerMetrics>>,
    appenders: DashMap<u32, Arc<AppenderMetrics>>,
}

impl MetricsRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_sequencer(&self, metrics: Arc<SequencerMetrics>) {
        self.sequencers.insert(metrics.partition_id(), metrics);
    }

    pub fn register_appender(&self, metrics: Arc<AppenderMetrics>) {
        self.appenders.insert(metrics.partition_id(), metrics);
    }

    /// Formats all registered metrics in Prometheus exposition format.
    pub fn format_prometheus(&self) -> String {
        let mut output = String::with_capacity(8192);

        for entry in self.sequencers.iter() {
            output.push_str(&entry.value().format_prometheus());
        }
        for entry in self.appenders.iter() {
            output.push_str(&entry.value().format_prometheus());
        }

        output
    }
}

/// Metrics for one partition's sequencer.
///
/// Every observation point is a plain atomic update, so calls are safe from
/// inside the sequencer's critical section.
pub struct SequencerMetrics {
    partition_id: u32,
    /// Histogram of accepted batch sizes in entries
    batch_size: Histogram,
    /// Batches currently buffered in the queue
    queue_depth: AtomicU64,
    /// Total accepted writes
    writes_accepted_total: AtomicU64,
    /// Total rejected writes (queue full or closed)
    writes_rejected_total: AtomicU64,
}

impl SequencerMetrics {
    pub fn new(partition_id: u32) -> Self {
        Self {
            partition_id,
            batch_size: Histogram::with_buckets(&BATCH_SIZE_BUCKETS),
            queue_depth: AtomicU64::new(0),
            writes_accepted_total: AtomicU64::new(0),
            writes_rejected_total: AtomicU64::new(0),
        }
    }

    pub fn partition_id(&self) -> u32 {
        self.partition_id
    }

    #[inline]
    pub fn observe_batch_size(&self, batch_size: usize) {
        self.batch_size.observe(batch_size as u64);
    }

    #[inline]
    pub fn set_queue_depth(&self, depth: usize) {
        self.queue_depth.store(depth as u64, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_accepted(&self) {
        self.writes_accepted_total.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_rejection(&self) {
        self.writes_rejected_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn queue_depth(&self) -> u64 {
        self.queue_depth.load(Ordering::Relaxed)
    }

    pub fn writes_accepted(&self) -> u64 {
        self.writes_accepted_total.load(Ordering::Relaxed)
    }

    pub fn writes_rejected(&self) -> u64 {
        self.writes_rejected_total.load(Ordering::Relaxed)
    }

    /// Formats sequencer metrics in Prometheus exposition format.
    pub fn format_prometheus(&self) -> String {
        let labels = format!("partition=\"{}\"", self.partition_id);
        let mut output = String::with_capacity(2048);

        let _ = writeln!(output, "# HELP logstream_sequencer_queue_depth Batches buffered in the sequencer queue");
        let _ = writeln!(output, "# TYPE logstream_sequencer_queue_depth gauge");
        let _ = writeln!(output, "logstream_sequencer_queue_depth{{{}}} {}", labels, self.queue_depth());
        output.push('\n');

        let _ = writeln!(output, "# HELP logstream_sequencer_writes_accepted_total Writes accepted by the sequencer");
        let _ = writeln!(output, "# TYPE logstream_sequencer_writes_accepted_total counter");
        let _ = writeln!(output, "logstream_sequencer_writes_accepted_total{{{}}} {}", labels, self.writes_accepted());
        output.push('\n');

        let _ = writeln!(output, "# HELP logstream_sequencer_writes_rejected_total Writes rejected by the sequencer");
        let _ = writeln!(output, "# TYPE logstream_sequencer_writes_rejected_total counter");
        let _ = writeln!(output, "logstream_sequencer_writes_rejected_total{{{}}} {}", labels, self.writes_rejected());
        output.push('\n');

        output.push_str(&self.batch_size.format_prometheus(
            "logstream_sequencer_batch_size",
            "Histogram of accepted batch sizes in entries",
            &labels,
        ));
        output.push('\n');

        output
    }
}

/// Metrics for one partition's log storage appender.
pub struct AppenderMetrics {
    partition_id: u32,
    /// Histogram of append durations in microseconds
    append_latency_us: Histogram,
    /// Total blocks appended to storage
    appended_blocks_total: AtomicU64,
    /// Total entries appended to storage
    appended_entries_total: AtomicU64,
    /// Total framed bytes appended to storage
    appended_bytes_total: AtomicU64,
}

impl AppenderMetrics {
    pub fn new(partition_id: u32) -> Self {
        Self {
            partition_id,
            append_latency_us: Histogram::new(),
            appended_blocks_total: AtomicU64::new(0),
            appended_entries_total: AtomicU64::new(0),
            appended_bytes_total: AtomicU64::new(0),
        }
    }

    pub fn partition_id(&self) -> u32 {
        self.partition_id
    }

    /// Records one appended block.
    #[inline]
    pub fn record_append(&self, entries: u64, bytes: u64, duration_us: u64) {
        self.appended_blocks_total.fetch_add(1, Ordering::Relaxed);
        self.appended_entries_total.fetch_add(entries, Ordering::Relaxed);
        self.appended_bytes_total.fetch_add(bytes, Ordering::Relaxed);
        self.append_latency_us.observe(duration_us);
    }

    pub fn appended_blocks(&self) -> u64 {
        self.appended_blocks_total.load(Ordering::Relaxed)
    }

    pub fn appended_entries(&self) -> u64 {
        self.appended_entries_total.load(Ordering::Relaxed)
    }

    pub fn appended_bytes(&self) -> u64 {
        self.appended_bytes_total.load(Ordering::Relaxed)
    }

    /// Formats appender metrics in Prometheus exposition format.
    pub fn format_prometheus(&self) -> String {
        let labels = format!("partition=\"{}\"", self.partition_id);
        let mut output = String::with_capacity(2048);

        let _ = writeln!(output, "# HELP logstream_appender_blocks_total Blocks appended to log storage");
        let _ = writeln!(output, "# TYPE logstream_appender_blocks_total counter");
        let _ = writeln!(output, "logstream_appender_blocks_total{{{}}} {}", labels, self.appended_blocks());
        output.push('\n');

        let _ = writeln!(output, "# HELP logstream_appender_entries_total Entries appended to log storage");
        let _ = writeln!(output, "# TYPE logstream_appender_entries_total counter");
        let _ = writeln!(output, "logstream_appender_entries_total{{{}}} {}", labels, self.appended_entries());
        output.push('\n');

        let _ = writeln!(output, "# HELP logstream_appender_bytes_total Framed bytes appended to log storage");
        let _ = writeln!(output, "# TYPE logstream_appender_bytes_total counter");
        let _ = writeln!(output, "logstream_appender_bytes_total{{{}}} {}", labels, self.appended_bytes());
        output.push('\n');

        output.push_str(&self.append_latency_us.format_prometheus(
            "logstream_appender_append_latency_us",
            "Histogram of append durations in microseconds",
            &labels,
        ));
        output.push('\n');

        output
    }
}
