//! Thread-safe histogram with fixed buckets, enabling
//! `histogram_quantile()` calculations in Prometheus.

use std::fmt::Write;
use std::sync::atomic::{AtomicU64, Ordering};

/// Buckets for appender latencies in microseconds (10μs to 50ms).
pub const LATENCY_BUCKETS_US: [u64; 12] = [
    10,     // 10μs
    25,     // 25μs
    50,     // 50μs
    100,    // 100μs
    250,    // 250μs
    500,    // 500μs
    1_000,  // 1ms
    2_500,  // 2.5ms
    5_000,  // 5ms
    10_000, // 10ms
    25_000, // 25ms
    50_000, // 50ms
];

/// Buckets for batch sizes in entries, up to the queue capacity.
pub const BATCH_SIZE_BUCKETS: [u64; 8] = [1, 2, 4, 8, 16, 32, 64, 128];

/// Thread-safe histogram for tracking value distributions.
///
/// Uses lock-free atomic operations for minimal overhead in the hot path.
/// Observations are placed into the fixed buckets supplied at construction;
/// bucket counts are cumulative, as Prometheus expects.
pub struct Histogram {
    /// Sum of all observed values (for average calculation)
    sum: AtomicU64,
    /// Total count of observations
    count: AtomicU64,
    /// Upper boundaries, one per bucket
    boundaries: &'static [u64],
    /// Bucket counts (cumulative)
    buckets: Box<[AtomicU64]>,
}

impl Default for Histogram {
    fn default() -> Self {
        Self::new()
    }
}

impl Histogram {
    /// Creates an empty histogram with the latency bucket set.
    pub fn new() -> Self {
        Self::with_buckets(&LATENCY_BUCKETS_US)
    }

    /// Creates an empty histogram with the given bucket boundaries.
    pub fn with_buckets(boundaries: &'static [u64]) -> Self {
        let buckets = boundaries.iter().map(|_| AtomicU64::new(0)).collect();
        Self {
            sum: AtomicU64::new(0),
            count: AtomicU64::new(0),
            boundaries,
            buckets,
        }
    }

    /// Records an observation.
    ///
    /// Lock-free and safe for concurrent use. Uses `Ordering::Relaxed` since
    /// exact ordering isn't critical for metrics.
    #[inline]
    pub fn observe(&self, value: u64) {
        self.sum.fetch_add(value, Ordering::Relaxed);
        self.count.fetch_add(1, Ordering::Relaxed);

        // Increment all buckets where value <= boundary, giving cumulative
        // counts as required by Prometheus.
        for (i, &boundary) in self.boundaries.iter().enumerate() {
            if value <= boundary {
                self.buckets[i].fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    /// Returns `(sum, count, bucket_counts)`; bucket counts are cumulative.
    pub fn snapshot(&self) -> (u64, u64, Vec<u64>) {
        let sum = self.sum.load(Ordering::Relaxed);
        let count = self.count.load(Ordering::Relaxed);
        let buckets = self
            .buckets
            .iter()
            .map(|bucket| bucket.load(Ordering::Relaxed))
            .collect();

        (sum, count, buckets)
    }

    #[inline]
    pub fn count(&self) -> u64 {
        self.count.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn sum(&self) -> u64 {
        self.sum.load(Ordering::Relaxed)
    }

    /// Formats the histogram in Prometheus exposition format.
    ///
    /// `labels` is either empty or a `key="value"` list to splice into each
    /// sample (e.g. `partition="1"`).
    pub fn format_prometheus(&self, name: &str, help: &str, labels: &str) -> String {
        let (sum, count, buckets) = self.snapshot();
        let separator = if labels.is_empty() { "" } else { "," };

        let mut output = String::with_capacity(1024);
        let _ = writeln!(output, "# HELP {} {}", name, help);
        let _ = writeln!(output, "# TYPE {} histogram", name);

        for (i, &boundary) in self.boundaries.iter().enumerate() {
            let _ = writeln!(
                output,
                "{}_bucket{{{}{}le=\"{}\"}} {}",
                name, labels, separator, boundary, buckets[i]
            );
        }

        let _ = writeln!(
            output,
            "{}_bucket{{{}{}le=\"+Inf\"}} {}",
            name, labels, separator, count
        );
        if labels.is_empty() {
            let _ = writeln!(output, "{}_sum {}", name, sum);
            let _ = writeln!(output, "{}_count {}", name, count);
        } else {
            let _ = writeln!(output, "{}_sum{{{}}} {}", name, labels, sum);
            let _ = writeln!(output, "{}_count{{{}}} {}", name, labels, count);
        }

        output
    }
}
