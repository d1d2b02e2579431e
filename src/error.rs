//! Error types for latency evaluation
//!
//! Every failure the evaluator can hit is one of these variants. The
//! orchestrator collapses all of them into a single `EVALUATION_ERROR`
//! verdict, but callers that want the reason can use
//! [`Evaluator::try_evaluate`](crate::latency::Evaluator::try_evaluate).

use thiserror::Error;

/// Errors that can occur while evaluating a device-mapper target
#[derive(Error, Debug)]
pub enum LatencyError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Target not found: {0}")]
    TargetNotFound(String),

    #[error("Not a block device: {0}")]
    NotABlockDevice(String),

    #[error("Failed to stat target {path}: {source}")]
    TargetStat {
        path: String,
        #[source]
        source: nix::errno::Errno,
    },

    #[error("Default thresholds unavailable: {0}")]
    ConfigUnavailable(String),

    #[error("Histogram unavailable at {path}: {source}")]
    HistogramUnavailable {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Empty histogram: no records found")]
    EmptyHistogram,

    #[error("Histogram parse error: {0}")]
    ParseError(String),

    #[error("Histogram truncated: input filled the {limit}-byte limit")]
    TruncatedInput { limit: usize },

    #[error("Latency threshold {threshold}ms is outside the histogram range {range}")]
    ThresholdOutOfRange { threshold: u64, range: String },
}

/// Result type for latency evaluation
pub type Result<T> = std::result::Result<T, LatencyError>;
