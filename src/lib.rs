//! dmlatency - I/O latency warnings for device-mapper targets
//!
//! This library reads the kernel's per-device latency histograms
//! (`/sys/block/<dev>/dm/io_latency_ms` and `io_latency_s`), counts the I/Os
//! at or above a latency threshold and reports when that count grows by at
//! least a warning count between two polls.

pub mod cli;
pub mod config;
pub mod device;
pub mod error;
pub mod latency;
pub mod monitor;
pub mod thresholds;
