//! Device-mapper target resolution and histogram acquisition
//!
//! Targets are given either as a bare device name (`dm-0`, resolved under
//! `/dev`) or as a path (`/dev/mapper/vg-lv`). The kernel exposes the
//! latency histograms of a dm device at
//! `/sys/block/<dev>/dm/io_latency_ms` and `/sys/block/<dev>/dm/io_latency_s`.

use crate::error::{LatencyError, Result};
use crate::latency::{read_histogram_text, Environment, Unit, DEFAULT_MAX_HISTOGRAM_BYTES};
use crate::thresholds::{Thresholds, DEFAULT_THRESHOLD_FILE};
use nix::errno::Errno;
use nix::sys::stat::{stat, SFlag};
use std::fs::{self, File};
use std::path::{Path, PathBuf};

/// Production environment backed by the local filesystem
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemEnvironment {
    /// Operator `threshold:count` file
    pub threshold_file: PathBuf,
    /// Directory bare target names are resolved against
    pub dev_root: PathBuf,
    /// Mount point of sysfs
    pub sysfs_root: PathBuf,
    /// Byte limit for one histogram read
    pub max_histogram_bytes: usize,
}

impl Default for SystemEnvironment {
    fn default() -> Self {
        Self {
            threshold_file: PathBuf::from(DEFAULT_THRESHOLD_FILE),
            dev_root: PathBuf::from("/dev"),
            sysfs_root: PathBuf::from("/sys"),
            max_histogram_bytes: DEFAULT_MAX_HISTOGRAM_BYTES,
        }
    }
}

impl SystemEnvironment {
    /// Device node path for a target name
    pub fn device_path(&self, target: &str) -> PathBuf {
        let target = target.trim();
        if target.contains('/') {
            PathBuf::from(target)
        } else {
            self.dev_root.join(target)
        }
    }

    /// Kernel block device name (`dm-0`) for a target
    ///
    /// Symlinks such as `/dev/mapper/vg-lv` are followed so the name matches
    /// the `/sys/block` entry. Falls back to the literal basename.
    pub fn device_name(&self, target: &str) -> Option<String> {
        let path = self.device_path(target);
        let resolved = fs::canonicalize(&path).unwrap_or(path);
        resolved
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
    }

    /// sysfs histogram file for a target and scale
    pub fn histogram_path(&self, target: &str, unit: Unit) -> Option<PathBuf> {
        let name = self.device_name(target)?;
        let file = match unit {
            Unit::Millis => "io_latency_ms",
            Unit::Seconds => "io_latency_s",
        };
        Some(
            self.sysfs_root
                .join("block")
                .join(name)
                .join("dm")
                .join(file),
        )
    }
}

impl Environment for SystemEnvironment {
    fn default_thresholds(&self) -> Result<Thresholds> {
        Thresholds::from_file(&self.threshold_file)
    }

    fn validate_target(&self, target: &str) -> Result<()> {
        let path = self.device_path(target);
        check_block_device(&path)
    }

    fn read_histogram(&self, target: &str, unit: Unit) -> Result<String> {
        let path = self.histogram_path(target, unit).ok_or_else(|| {
            LatencyError::InvalidArgument(format!("cannot derive a device name from {:?}", target))
        })?;
        let file = File::open(&path).map_err(|source| LatencyError::HistogramUnavailable {
            path: path.display().to_string(),
            source,
        })?;
        read_histogram_text(file, self.max_histogram_bytes)
    }
}

/// Confirm that `path` exists and is a block device
pub fn check_block_device(path: &Path) -> Result<()> {
    let st = match stat(path) {
        Ok(st) => st,
        Err(Errno::ENOENT) | Err(Errno::ENOTDIR) => {
            return Err(LatencyError::TargetNotFound(path.display().to_string()));
        }
        Err(source) => {
            return Err(LatencyError::TargetStat {
                path: path.display().to_string(),
                source,
            });
        }
    };

    let file_type = SFlag::from_bits_truncate(st.st_mode) & SFlag::S_IFMT;
    if file_type != SFlag::S_IFBLK {
        return Err(LatencyError::NotABlockDevice(path.display().to_string()));
    }
    Ok(())
}
