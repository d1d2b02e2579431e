// Evaluation orchestrator
//
// Resolves thresholds, validates the target, reads and parses both
// histograms, matches the ms threshold bucket and advances the per-target
// trigger state. Only a fully successful call touches the state.

use super::histogram::{parse_histogram, HistogramRecord, Unit};
use super::matcher::find_bucket;
use super::trigger::{SlowEventTotals, TriggerState};
use crate::error::{LatencyError, Result};
use crate::thresholds::Thresholds;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// External collaborators the evaluator depends on
///
/// [`SystemEnvironment`](crate::device::SystemEnvironment) talks to the
/// real `/etc`, `/dev` and `/sys` trees. Tests supply in-memory fakes.
pub trait Environment {
    /// Operator-configured thresholds, used when a caller passes `0`
    fn default_thresholds(&self) -> Result<Thresholds>;

    /// Confirm that `target` names an existing block device
    fn validate_target(&self, target: &str) -> Result<()>;

    /// Raw histogram text for `target` at the given scale
    fn read_histogram(&self, target: &str, unit: Unit) -> Result<String>;
}

/// Tri-state result of one evaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Verdict {
    /// Slow events grew by at least the warning count since the last poll
    Triggered,
    /// Below the warning count, or this was the baseline reading
    NoTrigger,
    /// The evaluation could not be completed
    EvaluationError,
}

impl Verdict {
    /// Short status word used by the polling driver
    pub fn status(self) -> &'static str {
        match self {
            Verdict::Triggered => "bad",
            Verdict::NoTrigger => "ok",
            Verdict::EvaluationError => "error",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Verdict::Triggered => "TRIGGERED",
            Verdict::NoTrigger => "NO_TRIGGER",
            Verdict::EvaluationError => "EVALUATION_ERROR",
        };
        f.write_str(name)
    }
}

/// Details of a successful evaluation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Evaluation {
    pub target: String,
    pub thresholds: Thresholds,
    /// Index of the ms bucket containing the latency threshold
    pub bucket_index: usize,
    pub bucket: HistogramRecord,
    pub totals: SlowEventTotals,
    /// Combined ms + s slow-event total
    pub total: u64,
    pub delta: u64,
    /// First reading for this target, never triggers
    pub baseline: bool,
    pub counter_reset: bool,
    pub verdict: Verdict,
}

/// Latency evaluator holding one rolling baseline per target
#[derive(Debug)]
pub struct Evaluator<E> {
    env: E,
    states: HashMap<String, TriggerState>,
}

impl<E: Environment> Evaluator<E> {
    pub fn new(env: E) -> Self {
        Self {
            env,
            states: HashMap::new(),
        }
    }

    pub fn environment(&self) -> &E {
        &self.env
    }

    pub fn environment_mut(&mut self) -> &mut E {
        &mut self.env
    }

    /// Evaluate `target` and collapse any failure into `EvaluationError`
    ///
    /// A threshold argument of `0` loads both thresholds from the
    /// environment's defaults. Negative values are rejected.
    ///
    /// # Example
    /// ```no_run
    /// use dmlatency::device::SystemEnvironment;
    /// use dmlatency::latency::{Evaluator, Verdict};
    ///
    /// let mut evaluator = Evaluator::new(SystemEnvironment::default());
    /// // First reading only records the baseline
    /// let verdict = evaluator.evaluate("dm-0", 20, 10);
    /// assert_ne!(verdict, Verdict::Triggered);
    /// ```
    pub fn evaluate(&mut self, target: &str, latency_threshold: i64, warning_count: i64) -> Verdict {
        match self.try_evaluate(target, latency_threshold, warning_count) {
            Ok(evaluation) => evaluation.verdict,
            Err(e) => {
                tracing::warn!("Latency evaluation of {} failed: {}", target.trim(), e);
                Verdict::EvaluationError
            }
        }
    }

    /// Evaluate `target`, returning the details or the reason for failure
    ///
    /// On error the target's state is left exactly as it was.
    pub fn try_evaluate(
        &mut self,
        target: &str,
        latency_threshold: i64,
        warning_count: i64,
    ) -> Result<Evaluation> {
        let thresholds = self.resolve_thresholds(latency_threshold, warning_count)?;

        let target = target.trim();
        if target.is_empty() {
            return Err(LatencyError::InvalidArgument(
                "target name is empty".to_string(),
            ));
        }
        self.env.validate_target(target)?;

        let millis_text = self.env.read_histogram(target, Unit::Millis)?;
        let seconds_text = self.env.read_histogram(target, Unit::Seconds)?;
        let millis = parse_histogram(&millis_text, Unit::Millis)?;
        let seconds = parse_histogram(&seconds_text, Unit::Seconds)?;

        let bucket_index = find_bucket(millis.records(), thresholds.latency_ms).ok_or_else(|| {
            LatencyError::ThresholdOutOfRange {
                threshold: thresholds.latency_ms,
                range: millis.describe_range(),
            }
        })?;
        let bucket = millis.records()[bucket_index];
        let totals = SlowEventTotals::accumulate(&millis, &seconds, bucket_index);
        let total = totals.combined();

        let state = self.states.entry(target.to_string()).or_default();
        let step = state.advance(total, thresholds.warning_count);

        let verdict = if step.triggered {
            Verdict::Triggered
        } else {
            Verdict::NoTrigger
        };

        tracing::debug!(
            "{}: bucket {} [{}, {})ms, total={} (ms={}, s={}), delta={}, warning_count={}, baseline={} -> {}",
            target,
            bucket_index,
            bucket.range_start,
            bucket.range_end(),
            total,
            totals.millis,
            totals.seconds,
            step.delta,
            thresholds.warning_count,
            step.baseline,
            verdict
        );

        Ok(Evaluation {
            target: target.to_string(),
            thresholds,
            bucket_index,
            bucket,
            totals,
            total,
            delta: step.delta,
            baseline: step.baseline,
            counter_reset: step.counter_reset,
            verdict,
        })
    }

    /// Rolling baseline for `target`, if it has been evaluated successfully
    pub fn state(&self, target: &str) -> Option<&TriggerState> {
        self.states.get(target.trim())
    }

    /// Forget the baseline of `target`; the next reading is a baseline again
    pub fn reset(&mut self, target: &str) -> bool {
        self.states.remove(target.trim()).is_some()
    }

    /// Targets with an established baseline
    pub fn tracked_targets(&self) -> impl Iterator<Item = &str> {
        self.states.keys().map(String::as_str)
    }

    fn resolve_thresholds(&self, latency_threshold: i64, warning_count: i64) -> Result<Thresholds> {
        if latency_threshold == 0 || warning_count == 0 {
            let defaults = self.env.default_thresholds()?;
            tracing::debug!(
                "Using default thresholds: {}ms, {} events",
                defaults.latency_ms,
                defaults.warning_count
            );
            return Ok(defaults);
        }
        Thresholds::from_signed(latency_threshold, warning_count)
    }
}
