//! CLI argument parsing for dmlatency

use crate::config::{MonitorConfig, TargetConfig};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Output format for poll reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// `latency of <target> is bad|ok|error` (default)
    Text,
    /// One JSON object per target per round
    Json,
}

#[derive(Parser, Debug)]
#[command(name = "dmlatency")]
#[command(version)]
#[command(
    about = "Warn when device-mapper I/O latency crosses a threshold too often",
    long_about = None
)]
pub struct Cli {
    /// Targets to monitor (e.g. dm-0 or /dev/mapper/vg-lv); replaces configured targets
    #[arg(value_name = "TARGET")]
    pub targets: Vec<String>,

    /// Latency threshold in milliseconds for CLI targets (0 = use threshold file)
    #[arg(
        short = 't',
        long = "threshold",
        value_name = "MS",
        default_value = "0",
        allow_negative_numbers = true
    )]
    pub latency_threshold: i64,

    /// Growth in slow I/Os per poll that raises a warning (0 = use threshold file)
    #[arg(
        short = 'n',
        long = "count",
        value_name = "COUNT",
        default_value = "0",
        allow_negative_numbers = true
    )]
    pub warning_count: i64,

    /// Seconds between polling rounds [default: 5]
    #[arg(short = 'i', long = "interval", value_name = "SECS")]
    pub interval: Option<u64>,

    /// Number of polling rounds, 0 = forever [default: 100]
    #[arg(short = 'l', long = "loops", value_name = "N")]
    pub loops: Option<u64>,

    /// TOML configuration file
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Operator threshold file in threshold:count format
    #[arg(long = "threshold-file", value_name = "FILE")]
    pub threshold_file: Option<PathBuf>,

    /// sysfs mount point
    #[arg(long = "sysfs-root", value_name = "DIR")]
    pub sysfs_root: Option<PathBuf>,

    /// Directory bare target names resolve against
    #[arg(long = "dev-root", value_name = "DIR")]
    pub dev_root: Option<PathBuf>,

    /// Output format
    #[arg(long = "format", value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Enable debug logging to stderr
    #[arg(long = "debug")]
    pub debug: bool,
}

impl Cli {
    /// Overlay command-line settings on top of `config`
    pub fn apply_to(&self, config: &mut MonitorConfig) {
        if let Some(interval) = self.interval {
            config.interval_secs = interval;
        }
        if let Some(loops) = self.loops {
            config.loops = loops;
        }
        if let Some(path) = &self.threshold_file {
            config.threshold_file = path.clone();
        }
        if let Some(path) = &self.sysfs_root {
            config.sysfs_root = path.clone();
        }
        if let Some(path) = &self.dev_root {
            config.dev_root = path.clone();
        }
        if !self.targets.is_empty() {
            config.targets = self
                .targets
                .iter()
                .map(|name| TargetConfig {
                    name: name.clone(),
                    latency_threshold: self.latency_threshold,
                    warning_count: self.warning_count,
                })
                .collect();
        }
    }
}
