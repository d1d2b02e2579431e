// Integration test utilities
//
// Builds throwaway sysfs/dev trees and threshold files under a TempDir so the
// binary can be pointed at them with --sysfs-root, --dev-root and
// --threshold-file.

#![allow(dead_code)]

use std::fs;
use std::os::unix::fs::FileTypeExt;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Fake filesystem layout for one test
pub struct FakeSystem {
    pub dir: TempDir,
}

impl FakeSystem {
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("sys/block")).unwrap();
        fs::create_dir_all(dir.path().join("dev")).unwrap();
        Self { dir }
    }

    pub fn sysfs_root(&self) -> PathBuf {
        self.dir.path().join("sys")
    }

    pub fn dev_root(&self) -> PathBuf {
        self.dir.path().join("dev")
    }

    pub fn threshold_file(&self) -> PathBuf {
        self.dir.path().join("io_latency_threshold")
    }

    /// Write both latency histograms for `dev`
    pub fn write_histograms(&self, dev: &str, millis: &str, seconds: &str) {
        let dm = self.sysfs_root().join("block").join(dev).join("dm");
        fs::create_dir_all(&dm).unwrap();
        fs::write(dm.join("io_latency_ms"), millis).unwrap();
        fs::write(dm.join("io_latency_s"), seconds).unwrap();
    }

    /// Create a regular file where a device node would be
    pub fn write_fake_device(&self, dev: &str) {
        fs::write(self.dev_root().join(dev), "").unwrap();
    }

    pub fn write_thresholds(&self, content: &str) {
        fs::write(self.threshold_file(), content).unwrap();
    }

    pub fn write_config(&self, content: &str) -> PathBuf {
        let path = self.dir.path().join("dmlatency.toml");
        fs::write(&path, content).unwrap();
        path
    }
}

/// Name of some real block device present under both /sys/block and /dev
pub fn find_real_block_device() -> Option<String> {
    let entries = fs::read_dir("/sys/block").ok()?;
    entries
        .filter_map(|e| e.ok())
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .find(|name| is_block_device(&Path::new("/dev").join(name)))
}

fn is_block_device(path: &Path) -> bool {
    // Symlinked nodes would resolve to a different sysfs name
    fs::symlink_metadata(path)
        .map(|m| m.file_type().is_block_device())
        .unwrap_or(false)
}
