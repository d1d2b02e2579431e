// Latency evaluation engine
//
// Reads the dm io-latency histograms of a target, finds the millisecond
// bucket containing the latency threshold and counts every event at or above
// it (the whole second-scale histogram included). A warning is raised when
// that count grows by at least the warning count between two polls.
//
// Pipeline:
// - histogram: bounded ingestion and parsing of `<start>-<end>(<unit>):<count>`
// - matcher: threshold -> bucket index
// - trigger: slow-event totals and the per-target baseline state machine
// - evaluator: the orchestrator tying these to an `Environment`

mod evaluator;
mod histogram;
mod matcher;
mod trigger;

pub use evaluator::{Environment, Evaluation, Evaluator, Verdict};
pub use histogram::{
    parse_histogram, read_histogram_text, HistogramRecord, HistogramSet, Unit,
    DEFAULT_MAX_HISTOGRAM_BYTES,
};
pub use matcher::find_bucket;
pub use trigger::{SlowEventTotals, TriggerPhase, TriggerState, TriggerStep};
