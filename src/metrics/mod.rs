//! Observability metrics for the log stream.
//!
//! All metrics use lock-free atomics so observation points stay non-blocking
//! inside the sequencer's critical section.

pub mod histogram;
pub mod registry;

pub use histogram::Histogram;
pub use registry::{AppenderMetrics, MetricsRegistry, SequencerMetrics};
