//! Monitor configuration
//!
//! Layering, later wins: built-in defaults, an optional TOML file
//! (`--config`), then command-line flags.
//!
//! # Example dmlatency.toml
//!
//! ```toml
//! interval_secs = 5
//! loops = 0                 # poll forever
//! threshold_file = "/etc/sysconfig/io_latency_threshold"
//!
//! [[target]]
//! name = "dm-0"
//! latency_threshold = 20    # 0 = use threshold_file
//! warning_count = 10
//!
//! [[target]]
//! name = "/dev/mapper/vg-data"
//! ```

use crate::device::SystemEnvironment;
use crate::latency::DEFAULT_MAX_HISTOGRAM_BYTES;
use crate::thresholds::DEFAULT_THRESHOLD_FILE;
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Target monitored when nothing else is configured
pub const DEFAULT_TARGET: &str = "dm-0";

/// One monitored device-mapper target
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetConfig {
    /// Device name (`dm-0`) or path (`/dev/mapper/vg-lv`)
    pub name: String,

    /// Latency threshold in ms, 0 = operator default
    #[serde(default)]
    pub latency_threshold: i64,

    /// Warning count, 0 = operator default
    #[serde(default)]
    pub warning_count: i64,
}

impl TargetConfig {
    /// Target that takes both thresholds from the operator default file
    pub fn with_defaults(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            latency_threshold: 0,
            warning_count: 0,
        }
    }
}

/// Configuration for the polling monitor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MonitorConfig {
    /// Seconds to sleep between polling rounds
    pub interval_secs: u64,

    /// Number of polling rounds, 0 = run until killed
    pub loops: u64,

    /// Operator `threshold:count` file
    pub threshold_file: PathBuf,

    /// sysfs mount point
    pub sysfs_root: PathBuf,

    /// Directory bare target names resolve against
    pub dev_root: PathBuf,

    /// Byte limit for one histogram read
    pub max_histogram_bytes: usize,

    /// Targets to poll
    #[serde(rename = "target")]
    pub targets: Vec<TargetConfig>,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            interval_secs: 5,
            loops: 100,
            threshold_file: PathBuf::from(DEFAULT_THRESHOLD_FILE),
            sysfs_root: PathBuf::from("/sys"),
            dev_root: PathBuf::from("/dev"),
            max_histogram_bytes: DEFAULT_MAX_HISTOGRAM_BYTES,
            targets: Vec::new(),
        }
    }
}

impl MonitorConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;

        Self::from_toml_str(&content)
            .with_context(|| format!("Invalid config file {}", path.display()))
    }

    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse TOML")
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.max_histogram_bytes == 0 {
            bail!("max_histogram_bytes must be positive");
        }

        let mut seen = HashSet::new();
        for target in &self.targets {
            let name = target.name.trim();
            if name.is_empty() {
                bail!("target name must not be empty");
            }
            if !seen.insert(name) {
                bail!("target '{}' is configured more than once", name);
            }
        }

        Ok(())
    }

    /// Configured targets, or the default `dm-0` when none are given
    pub fn effective_targets(&self) -> Vec<TargetConfig> {
        if self.targets.is_empty() {
            vec![TargetConfig::with_defaults(DEFAULT_TARGET)]
        } else {
            self.targets.clone()
        }
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    /// Round limit, `None` for an unbounded run
    pub fn round_limit(&self) -> Option<u64> {
        (self.loops > 0).then_some(self.loops)
    }

    /// Filesystem environment described by this configuration
    pub fn environment(&self) -> SystemEnvironment {
        SystemEnvironment {
            threshold_file: self.threshold_file.clone(),
            dev_root: self.dev_root.clone(),
            sysfs_root: self.sysfs_root.clone(),
            max_histogram_bytes: self.max_histogram_bytes,
        }
    }
}
