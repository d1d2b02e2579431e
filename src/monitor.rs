//! Polling driver
//!
//! Evaluates every configured target once per round, writes one report line
//! per target and sleeps between rounds.

use crate::cli::OutputFormat;
use crate::config::TargetConfig;
use crate::latency::{Environment, Evaluation, Evaluator, Verdict};
use anyhow::{Context, Result};
use serde::Serialize;
use std::io::Write;
use std::thread;
use std::time::Duration;

/// Result of polling one target in one round
#[derive(Debug, Clone, Serialize)]
pub struct PollReport {
    pub round: u64,
    pub target: String,
    pub verdict: Verdict,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub evaluation: Option<Evaluation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PollReport {
    /// `latency of <target> is bad|ok|error`
    pub fn to_text(&self) -> String {
        format!("latency of {} is {}", self.target, self.verdict.status())
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).context("Failed to serialize poll report")
    }
}

/// Counts accumulated over a monitor run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub rounds: u64,
    pub triggered: u64,
    pub errors: u64,
}

/// Periodic evaluator over a fixed set of targets
#[derive(Debug)]
pub struct Monitor<E> {
    evaluator: Evaluator<E>,
    targets: Vec<TargetConfig>,
    format: OutputFormat,
    round: u64,
}

impl<E: Environment> Monitor<E> {
    pub fn new(evaluator: Evaluator<E>, targets: Vec<TargetConfig>, format: OutputFormat) -> Self {
        Self {
            evaluator,
            targets,
            format,
            round: 0,
        }
    }

    pub fn evaluator(&self) -> &Evaluator<E> {
        &self.evaluator
    }

    pub fn evaluator_mut(&mut self) -> &mut Evaluator<E> {
        &mut self.evaluator
    }

    /// Evaluate each target once
    pub fn poll_once(&mut self) -> Vec<PollReport> {
        self.round += 1;
        let round = self.round;

        let evaluator = &mut self.evaluator;
        self.targets
            .iter()
            .map(|target| {
                match evaluator.try_evaluate(
                    &target.name,
                    target.latency_threshold,
                    target.warning_count,
                ) {
                    Ok(evaluation) => PollReport {
                        round,
                        target: target.name.clone(),
                        verdict: evaluation.verdict,
                        evaluation: Some(evaluation),
                        error: None,
                    },
                    Err(e) => {
                        tracing::warn!("Latency evaluation of {} failed: {}", target.name, e);
                        PollReport {
                            round,
                            target: target.name.clone(),
                            verdict: Verdict::EvaluationError,
                            evaluation: None,
                            error: Some(e.to_string()),
                        }
                    }
                }
            })
            .collect()
    }

    /// Write reports in the configured format, one line each
    pub fn write_reports<W: Write>(&self, reports: &[PollReport], out: &mut W) -> Result<()> {
        for report in reports {
            let line = match self.format {
                OutputFormat::Text => report.to_text(),
                OutputFormat::Json => report.to_json()?,
            };
            writeln!(out, "{}", line).context("Failed to write report")?;
        }
        out.flush().context("Failed to flush output")?;
        Ok(())
    }

    /// Poll until `rounds` rounds have run (`None` = forever)
    pub fn run<W: Write>(
        &mut self,
        rounds: Option<u64>,
        interval: Duration,
        out: &mut W,
    ) -> Result<RunSummary> {
        let mut summary = RunSummary::default();

        loop {
            let reports = self.poll_once();
            self.write_reports(&reports, out)?;

            summary.rounds += 1;
            for report in &reports {
                match report.verdict {
                    Verdict::Triggered => summary.triggered += 1,
                    Verdict::EvaluationError => summary.errors += 1,
                    Verdict::NoTrigger => {}
                }
            }

            if rounds.is_some_and(|limit| summary.rounds >= limit) {
                break;
            }
            thread::sleep(interval);
        }

        tracing::debug!(
            "Monitor finished: {} rounds, {} triggered, {} errors",
            summary.rounds,
            summary.triggered,
            summary.errors
        );
        Ok(summary)
    }
}
