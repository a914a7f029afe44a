//! Inventory-building configuration.
//!
//! This module defines how data directories are measured, what happens when
//! a package's metadata cannot be resolved, and how the device is reached.

use std::path::PathBuf;

use clap::ValueEnum;
use serde::Serialize;

/// How the size of a data directory is measured.
#[derive(Clone, Copy, PartialEq, Eq, Debug, ValueEnum, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SizeMode {
    /// Size attribute of the directory entry itself (compatible default)
    #[default]
    Entry,

    /// Sum of the sizes of every file below the directory
    Recursive,
}

/// What the builder does when metadata lookup fails for one package.
#[derive(Clone, Copy, PartialEq, Eq, Debug, ValueEnum, Default)]
pub enum LookupPolicy {
    /// Record the failure and continue with the next package
    #[default]
    Skip,

    /// Stop enumerating and keep only the packages collected so far
    Abort,
}

/// Options controlling a single inventory pass.
#[derive(Clone, Debug, Default)]
pub struct InventoryOptions {
    pub size_mode: SizeMode,

    pub lookup_policy: LookupPolicy,

    /// Number of threads used to probe sizes (0 = rayon default)
    pub threads: usize,
}

/// How the device is reached.
#[derive(Clone, Debug)]
pub struct DeviceOptions {
    /// Path to the `adb` binary
    pub adb_path: PathBuf,

    /// Device serial passed as `adb -s`; `None` uses the only attached device
    pub serial: Option<String>,

    /// Run size probes through `su -c` on the device
    pub use_su: bool,

    /// Run on the device itself: `sh -c` instead of `adb shell`, local size probes
    pub local: bool,
}

impl Default for DeviceOptions {
    fn default() -> Self {
        Self {
            adb_path: PathBuf::from("adb"),
            serial: None,
            use_su: false,
            local: false,
        }
    }
}
