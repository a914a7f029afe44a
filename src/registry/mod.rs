//! Capability interfaces over the platform's package registry.
//!
//! The inventory builder never talks to a device directly. It is handed a
//! [`PackageRegistry`] to enumerate packages and resolve their metadata, and
//! a [`SizeProbe`] to measure data directories. The `adb`-backed
//! implementations live in [`adb`]; [`local`] measures paths on the machine
//! the tool runs on.
//!
//! ## Main Parts
//!
//! - [`PackageRegistry`] - listing and per-package metadata lookup
//! - [`SizeProbe`] - size of a data directory, entry or recursive
//! - [`PackageDescriptor`] / [`ApplicationMetadata`] - what the registry returns
//! - [`RegistryError`] - every failure the adapters can raise

pub mod adb;
pub mod error;
pub mod local;

pub use adb::{Adb, AdbRegistry, AdbSizeProbe};
pub use error::RegistryError;
pub use local::LocalSizeProbe;

use crate::config::SizeMode;

/// One row of the installed-packages listing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PackageDescriptor {
    /// Unique package identifier (e.g. `com.android.chrome`)
    pub package_id: String,

    /// Localized display label, when the registry can provide one
    pub label: Option<String>,

    /// Path of the installed base APK, when known
    pub apk_path: Option<String>,
}

impl PackageDescriptor {
    /// Create a descriptor that carries only a package id.
    #[must_use]
    pub fn new(package_id: impl Into<String>) -> Self {
        Self {
            package_id: package_id.into(),
            label: None,
            apk_path: None,
        }
    }

    /// Attach a display label.
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Attach the base APK path.
    #[must_use]
    pub fn with_apk_path(mut self, apk_path: impl Into<String>) -> Self {
        self.apk_path = Some(apk_path.into());
        self
    }
}

/// Extended application metadata resolved for a single package.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApplicationMetadata {
    pub package_id: String,

    /// Private data directory of the package on the device
    pub data_dir: String,

    /// Whether the package is part of the system image
    pub is_system: bool,

    /// Install location of the package code
    pub code_path: Option<String>,
}

/// Enumerates installed packages and resolves their metadata.
pub trait PackageRegistry {
    /// List every installed package, system packages included, in the
    /// registry's own order.
    ///
    /// # Errors
    ///
    /// Returns an error if the listing cannot be obtained at all.
    fn list_installed_packages(&self) -> Result<Vec<PackageDescriptor>, RegistryError>;

    /// Resolve extended metadata for one package.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::PackageNotFound`] when the package is
    /// unknown to the registry, or another variant when the query fails.
    fn get_application_metadata(
        &self,
        package_id: &str,
    ) -> Result<ApplicationMetadata, RegistryError>;
}

/// Measures the size of a path.
///
/// Implementations are shared across the size-probing thread pool.
pub trait SizeProbe: Sync {
    /// Size of `path` in bytes according to `mode`.
    ///
    /// # Errors
    ///
    /// Returns an error if the path cannot be measured.
    fn size_of(&self, path: &str, mode: SizeMode) -> Result<u64, RegistryError>;
}

/// Fallback data directory for the primary user when metadata omits one.
#[must_use]
pub fn default_data_dir(package_id: &str) -> String {
    format!("/data/user/0/{package_id}")
}

/// Install prefixes that belong to the system image.
const SYSTEM_PREFIXES: &[&str] = &["/system/", "/product/", "/vendor/", "/system_ext/", "/apex/"];

/// Classify a package as part of the system image from its install path.
#[must_use]
pub fn is_system_path(path: &str) -> bool {
    SYSTEM_PREFIXES.iter().any(|prefix| path.starts_with(prefix))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descriptor_builders() {
        let descriptor = PackageDescriptor::new("com.example.app")
            .with_label("Example")
            .with_apk_path("/data/app/com.example.app-1/base.apk");

        assert_eq!(descriptor.package_id, "com.example.app");
        assert_eq!(descriptor.label.as_deref(), Some("Example"));
        assert_eq!(
            descriptor.apk_path.as_deref(),
            Some("/data/app/com.example.app-1/base.apk")
        );
    }

    #[test]
    fn test_default_data_dir() {
        assert_eq!(
            default_data_dir("com.example.app"),
            "/data/user/0/com.example.app"
        );
    }

    #[test]
    fn test_is_system_path() {
        assert!(is_system_path("/system/app/Camera/Camera.apk"));
        assert!(is_system_path("/product/priv-app/Phonesky/Phonesky.apk"));
        assert!(is_system_path("/apex/com.android.permission/priv-app/x.apk"));
        assert!(!is_system_path("/data/app/com.example-1/base.apk"));
        assert!(!is_system_path("/systematic/base.apk"));
    }
}
