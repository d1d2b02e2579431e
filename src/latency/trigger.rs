// Delta accumulation and the trigger state machine
//
// The kernel counters are cumulative, so a single reading says nothing about
// recent latency. Each target keeps the previous "at or above threshold"
// total and compares the growth since the last poll against the warning
// count. The first reading only establishes that baseline.

use super::histogram::HistogramSet;
use serde::{Deserialize, Serialize};

/// Events at or above the matched ms bucket, split by source histogram
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlowEventTotals {
    /// Sum of ms-scale buckets from the matched bucket onward
    pub millis: u64,
    /// Sum of every s-scale bucket
    pub seconds: u64,
}

impl SlowEventTotals {
    /// Accumulate slow events given the matched ms bucket index
    ///
    /// Every second-scale bucket lies above the top of the ms histogram, so
    /// all of it counts once an ms bucket has matched.
    pub fn accumulate(millis: &HistogramSet, seconds: &HistogramSet, bucket: usize) -> Self {
        Self {
            millis: millis.events_from(bucket),
            seconds: seconds.total_events(),
        }
    }

    pub fn combined(&self) -> u64 {
        self.millis.saturating_add(self.seconds)
    }
}

/// Per-target phase of the trigger state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerPhase {
    /// No successful evaluation yet
    Uninitialized,
    /// A baseline exists; deltas are meaningful
    Armed,
}

/// Rolling baseline kept between polls of one target
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerState {
    cumulative_total: u64,
    initialized: bool,
}

/// Outcome of advancing the state machine by one reading
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TriggerStep {
    /// Growth since the previous reading (0 on a counter reset)
    pub delta: u64,
    /// This reading only established the baseline
    pub baseline: bool,
    /// The new total was below the previous one
    pub counter_reset: bool,
    /// `delta >= warning_count` on an armed state
    pub triggered: bool,
}

impl TriggerState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last accumulated total
    pub fn cumulative_total(&self) -> u64 {
        self.cumulative_total
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn phase(&self) -> TriggerPhase {
        if self.initialized {
            TriggerPhase::Armed
        } else {
            TriggerPhase::Uninitialized
        }
    }

    /// Record a new total and decide whether the warning count was reached
    ///
    /// The baseline always moves to `total`, including on the first reading
    /// and after a counter reset.
    pub fn advance(&mut self, total: u64, warning_count: u64) -> TriggerStep {
        let counter_reset = total < self.cumulative_total;
        let delta = total.saturating_sub(self.cumulative_total);

        if counter_reset {
            tracing::warn!(
                "Latency counter went backwards ({} -> {}), treating delta as 0",
                self.cumulative_total,
                total
            );
        }

        let baseline = !self.initialized;
        let triggered = !baseline && delta >= warning_count;

        self.cumulative_total = total;
        self.initialized = true;

        TriggerStep {
            delta,
            baseline,
            counter_reset,
            triggered,
        }
    }
}
