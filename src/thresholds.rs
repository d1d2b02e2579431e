//! Latency thresholds and the operator default-threshold file
//!
//! The default file holds a single `threshold:count` line, for example
//! `20:10` (warn when 10 or more I/Os took at least 20ms since the last
//! poll).

use crate::error::{LatencyError, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;

/// Default location of the operator threshold file
pub const DEFAULT_THRESHOLD_FILE: &str = "/etc/sysconfig/io_latency_threshold";

/// Files this large or larger are rejected
pub const MAX_THRESHOLD_FILE_BYTES: usize = 512;

/// Resolved latency threshold and warning count
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thresholds {
    /// Latency in milliseconds at and above which an I/O counts as slow
    pub latency_ms: u64,
    /// Growth in slow I/Os between polls that raises a warning
    pub warning_count: u64,
}

impl Thresholds {
    pub fn new(latency_ms: u64, warning_count: u64) -> Self {
        Self {
            latency_ms,
            warning_count,
        }
    }

    /// Build from caller-supplied signed values, rejecting negatives
    pub fn from_signed(latency_ms: i64, warning_count: i64) -> Result<Self> {
        let latency_ms = u64::try_from(latency_ms).map_err(|_| {
            LatencyError::InvalidArgument(format!(
                "latency threshold must be non-negative, got {}",
                latency_ms
            ))
        })?;
        let warning_count = u64::try_from(warning_count).map_err(|_| {
            LatencyError::InvalidArgument(format!(
                "warning count must be non-negative, got {}",
                warning_count
            ))
        })?;
        Ok(Self::new(latency_ms, warning_count))
    }

    /// Load thresholds from an operator threshold file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| {
            LatencyError::ConfigUnavailable(format!("cannot open {}: {}", path.display(), e))
        })?;

        let mut content = String::new();
        file.take(MAX_THRESHOLD_FILE_BYTES as u64)
            .read_to_string(&mut content)
            .map_err(|e| {
                LatencyError::ConfigUnavailable(format!("cannot read {}: {}", path.display(), e))
            })?;

        if content.len() >= MAX_THRESHOLD_FILE_BYTES {
            return Err(LatencyError::ConfigUnavailable(format!(
                "{} is too large (limit {} bytes)",
                path.display(),
                MAX_THRESHOLD_FILE_BYTES
            )));
        }

        content.parse()
    }
}

impl FromStr for Thresholds {
    type Err = LatencyError;

    /// Parse `<threshold>:<count>`, both strictly positive
    fn from_str(s: &str) -> Result<Self> {
        let line = s.trim();
        let (threshold, count) = line.split_once(':').ok_or_else(|| {
            LatencyError::ConfigUnavailable(format!(
                "expected <threshold>:<count>, got {:?}",
                line
            ))
        })?;

        Ok(Self::new(
            parse_positive(threshold, "threshold")?,
            parse_positive(count, "count")?,
        ))
    }
}

fn parse_positive(field: &str, what: &str) -> Result<u64> {
    let value: u64 = field.trim().parse().map_err(|_| {
        LatencyError::ConfigUnavailable(format!("{} {:?} is not a positive integer", what, field))
    })?;
    if value == 0 {
        return Err(LatencyError::ConfigUnavailable(format!(
            "{} must be positive",
            what
        )));
    }
    Ok(value)
}
