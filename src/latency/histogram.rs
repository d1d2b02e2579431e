// Latency histogram parsing
//
// The dm io-latency sysfs files print one bucket per line:
//
//   0-9(ms):100
//   10-19(ms):3
//
// The millisecond and second histograms share this format and differ only in
// the unit label, so a single parser handles both.

use crate::error::{LatencyError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::Read;

/// Byte limit for a single histogram read
pub const DEFAULT_MAX_HISTOGRAM_BYTES: usize = 4096;

/// Native unit of a latency histogram
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    /// Millisecond buckets (`io_latency_ms`)
    Millis,
    /// Second buckets (`io_latency_s`)
    Seconds,
}

impl Unit {
    /// Label printed between parentheses on each histogram line
    pub fn label(self) -> &'static str {
        match self {
            Unit::Millis => "ms",
            Unit::Seconds => "s",
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One histogram bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistogramRecord {
    /// First latency value covered by this bucket
    pub range_start: u64,
    /// Number of latency values covered (always >= 1)
    pub range_length: u64,
    /// Kernel-side cumulative event counter
    pub event_count: u64,
}

impl HistogramRecord {
    /// Exclusive upper bound of the bucket
    pub fn range_end(&self) -> u64 {
        self.range_start.saturating_add(self.range_length)
    }

    /// Whether `value` falls inside `[range_start, range_end)`
    pub fn contains(&self, value: u64) -> bool {
        value >= self.range_start && value < self.range_end()
    }
}

/// All buckets of one histogram, in source order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistogramSet {
    unit: Unit,
    records: Vec<HistogramRecord>,
}

impl HistogramSet {
    pub fn unit(&self) -> Unit {
        self.unit
    }

    pub fn records(&self) -> &[HistogramRecord] {
        &self.records
    }

    /// Sum of event counts from bucket `from` to the end
    pub fn events_from(&self, from: usize) -> u64 {
        self.records
            .iter()
            .skip(from)
            .fold(0u64, |acc, r| acc.saturating_add(r.event_count))
    }

    /// Sum of every bucket's event count
    pub fn total_events(&self) -> u64 {
        self.events_from(0)
    }

    /// Half-open latency interval covered by the set, e.g. `[0, 20)ms`
    pub fn describe_range(&self) -> String {
        match (self.records.first(), self.records.last()) {
            (Some(first), Some(last)) => format!(
                "[{}, {}){}",
                first.range_start,
                last.range_end(),
                self.unit
            ),
            _ => format!("[]{}", self.unit),
        }
    }
}

impl fmt::Display for HistogramSet {
    /// Renders the set back into the sysfs line format
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for r in &self.records {
            writeln!(
                f,
                "{}-{}({}):{}",
                r.range_start,
                r.range_end() - 1,
                self.unit,
                r.event_count
            )?;
        }
        Ok(())
    }
}

/// Parse histogram text for the given unit
///
/// The number of `:` separators fixes the expected record count up front.
/// Any line that does not decode, or a decoded count that disagrees with the
/// separator count, fails the whole parse. No partial set is ever returned.
pub fn parse_histogram(text: &str, unit: Unit) -> Result<HistogramSet> {
    let expected = text.matches(':').count();
    if expected == 0 {
        return Err(LatencyError::EmptyHistogram);
    }

    let mut records = Vec::with_capacity(expected);
    for (idx, line) in text.lines().enumerate() {
        let record = parse_line(line, unit).map_err(|reason| {
            LatencyError::ParseError(format!("line {}: {}", idx + 1, reason))
        })?;
        tracing::trace!(
            "{}-{}({}):{}",
            record.range_start,
            record.range_end() - 1,
            unit,
            record.event_count
        );
        records.push(record);
    }

    if records.len() != expected {
        return Err(LatencyError::ParseError(format!(
            "decoded {} records but found {} separators",
            records.len(),
            expected
        )));
    }

    Ok(HistogramSet { unit, records })
}

/// Decode `<start>-<end>(<unit>):<count>`
fn parse_line(line: &str, unit: Unit) -> std::result::Result<HistogramRecord, String> {
    let (range_part, count) = line
        .split_once(':')
        .ok_or_else(|| format!("missing ':' in {:?}", line))?;

    let range = range_part
        .strip_suffix(')')
        .and_then(|s| s.strip_suffix(unit.label()))
        .and_then(|s| s.strip_suffix('('))
        .ok_or_else(|| format!("expected '({})' unit suffix in {:?}", unit, line))?;

    let (start, end) = range
        .split_once('-')
        .ok_or_else(|| format!("missing '-' in range {:?}", range))?;

    let start = parse_number(start, "range start")?;
    let end = parse_number(end, "range end")?;
    if end < start {
        return Err(format!("range end {} is below range start {}", end, start));
    }

    let range_length = (end - start)
        .checked_add(1)
        .ok_or_else(|| format!("range {}-{} is too wide", start, end))?;

    Ok(HistogramRecord {
        range_start: start,
        range_length,
        event_count: parse_number(count, "event count")?,
    })
}

fn parse_number(field: &str, what: &str) -> std::result::Result<u64, String> {
    // u64::from_str accepts a leading '+', the kernel never prints one
    if field.is_empty() || !field.bytes().all(|b| b.is_ascii_digit()) {
        return Err(format!("{} {:?} is not an unsigned integer", what, field));
    }
    field
        .parse()
        .map_err(|e| format!("{} {:?}: {}", what, field, e))
}

/// Read histogram text, refusing anything that fills `limit` bytes
///
/// A read that reaches the limit may have been cut short by it, and a
/// truncated histogram would shift the bucket match, so it is an error.
pub fn read_histogram_text<R: Read>(reader: R, limit: usize) -> Result<String> {
    let mut buf = Vec::with_capacity(limit.min(DEFAULT_MAX_HISTOGRAM_BYTES));
    reader
        .take(limit as u64)
        .read_to_end(&mut buf)
        .map_err(|e| LatencyError::ParseError(format!("read failed: {}", e)))?;

    if buf.len() >= limit {
        return Err(LatencyError::TruncatedInput { limit });
    }

    String::from_utf8(buf)
        .map_err(|e| LatencyError::ParseError(format!("histogram is not valid UTF-8: {}", e)))
}
