//! Core inventory data structures.
//!
//! This module defines [`AppItem`], one installed application as shown in
//! the list, along with the small value types it carries.

use std::fmt::{Display, Formatter, Result};

use serde::Serialize;

use crate::{
    registry::{ApplicationMetadata, PackageDescriptor},
    utils::format_size,
};

/// Whether a package ships with the system image or was installed by the user.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AppKind {
    User,
    System,
}

impl AppKind {
    #[must_use]
    pub const fn from_is_system(is_system: bool) -> Self {
        if is_system { Self::System } else { Self::User }
    }
}

/// Opaque handle to an application's icon.
///
/// The inventory never decodes icons. Adapters store whatever identifies
/// the icon source (for `adb`, the base APK holding the icon resource) and
/// renderers decide what to do with it.
#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct IconRef(Option<String>);

impl IconRef {
    #[must_use]
    pub const fn new(source: Option<String>) -> Self {
        Self(source)
    }

    /// Where the icon can be loaded from, if the registry said.
    #[must_use]
    pub fn source(&self) -> Option<&str> {
        self.0.as_deref()
    }
}

/// One installed application in the inventory.
///
/// Items are immutable once built; every field is read through an accessor.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppItem {
    name: String,
    icon: IconRef,
    package_id: String,
    size_bytes: u64,
    kind: AppKind,
    data_dir: String,
}

impl AppItem {
    /// Create an item from its parts.
    #[must_use]
    pub const fn new(
        name: String,
        icon: IconRef,
        package_id: String,
        size_bytes: u64,
        kind: AppKind,
        data_dir: String,
    ) -> Self {
        Self {
            name,
            icon,
            package_id,
            size_bytes,
            kind,
            data_dir,
        }
    }

    /// Assemble an item from a registry listing row, its resolved metadata
    /// and the measured data-directory size.
    ///
    /// The display name falls back to the package id when the registry has
    /// no label.
    #[must_use]
    pub fn from_lookup(
        descriptor: PackageDescriptor,
        metadata: ApplicationMetadata,
        size_bytes: u64,
    ) -> Self {
        let name = descriptor
            .label
            .unwrap_or_else(|| descriptor.package_id.clone());

        Self {
            name,
            icon: IconRef::new(descriptor.apk_path),
            package_id: descriptor.package_id,
            size_bytes,
            kind: AppKind::from_is_system(metadata.is_system),
            data_dir: metadata.data_dir,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub const fn icon(&self) -> &IconRef {
        &self.icon
    }

    #[must_use]
    pub fn package_id(&self) -> &str {
        &self.package_id
    }

    /// Data-directory size in bytes at query time.
    #[must_use]
    pub const fn size_bytes(&self) -> u64 {
        self.size_bytes
    }

    #[must_use]
    pub const fn kind(&self) -> AppKind {
        self.kind
    }

    #[must_use]
    pub fn data_dir(&self) -> &str {
        &self.data_dir
    }

    /// The size as shown in the list, e.g. `"12.40 MB"`.
    #[must_use]
    pub fn size_formatted(&self) -> String {
        format_size(self.size_bytes)
    }
}

impl Display for AppItem {
    /// `Name (package.id) - 1.00 KB`, or `package.id - 1.00 KB` when the
    /// name is just the package id.
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        if self.name == self.package_id {
            write!(f, "{} - {}", self.package_id, self.size_formatted())
        } else {
            write!(
                f,
                "{} ({}) - {}",
                self.name,
                self.package_id,
                self.size_formatted()
            )
        }
    }
}
