//! Structured JSON output for scripting and piping.
//!
//! When `--json` is passed, the inventory is serialized to stdout as a
//! single JSON object, replacing all human-readable output.

use std::collections::BTreeMap;

use chrono::Local;
use serde::Serialize;

use crate::config::SizeMode;
use crate::inventory::{AppItem, AppKind, LookupFailure};
use crate::utils::format_size;

/// Top-level JSON output emitted when `--json` is active.
#[derive(Debug, Serialize)]
pub struct JsonOutput {
    /// Device serial the inventory was taken from, or `null` for the
    /// default device.
    pub device: Option<String>,

    /// When the inventory was taken (RFC 3339, local offset).
    pub captured_at: String,

    /// How data directories were measured: `"entry"` or `"recursive"`.
    pub size_mode: SizeMode,

    /// Apps that matched the filters, in display order.
    pub apps: Vec<JsonAppEntry>,

    /// Aggregated summary statistics over `apps`.
    pub summary: JsonSummary,

    /// Packages whose metadata lookup failed.
    pub failures: Vec<JsonFailure>,

    /// `true` when enumeration stopped at the first failure.
    pub aborted: bool,

    /// Number of listed apps whose data directory could not be measured
    /// and are reported with a size of `0`.
    pub unmeasured: usize,
}

/// A single app entry in the JSON output.
#[derive(Debug, Serialize)]
pub struct JsonAppEntry {
    pub name: String,
    pub package_id: String,

    /// `"user"` or `"system"`.
    pub kind: AppKind,

    pub data_dir: String,

    /// Data size in bytes.
    pub size: u64,

    /// Human-readable formatted size (e.g. `"12.40 MB"`).
    pub size_formatted: String,
}

/// Aggregated summary across all listed apps.
#[derive(Debug, Serialize)]
pub struct JsonSummary {
    pub total_apps: usize,
    pub total_size: u64,
    pub total_size_formatted: String,

    /// Per-kind breakdown (`"user"`, `"system"`).
    pub by_kind: BTreeMap<String, JsonKindSummary>,
}

/// Per-kind count and size.
#[derive(Debug, Serialize)]
pub struct JsonKindSummary {
    pub count: usize,
    pub size: u64,
    pub size_formatted: String,
}

/// A package left out of the inventory.
#[derive(Debug, Serialize)]
pub struct JsonFailure {
    pub package_id: String,
    pub error: String,
}

impl JsonOutput {
    /// Build the document for a finished inventory pass, stamped with the
    /// current local time.
    #[must_use]
    pub fn new(
        device: Option<String>,
        size_mode: SizeMode,
        apps: &[AppItem],
        failures: &[LookupFailure],
        aborted: bool,
    ) -> Self {
        Self {
            device,
            captured_at: Local::now().to_rfc3339(),
            size_mode,
            apps: apps.iter().map(JsonAppEntry::from_item).collect(),
            summary: JsonSummary::from_items(apps),
            failures: failures.iter().map(JsonFailure::from_failure).collect(),
            aborted,
            unmeasured: 0,
        }
    }

    /// Record how many data directories could not be measured.
    #[must_use]
    pub const fn with_unmeasured(mut self, unmeasured: usize) -> Self {
        self.unmeasured = unmeasured;
        self
    }
}

impl JsonAppEntry {
    #[must_use]
    pub fn from_item(item: &AppItem) -> Self {
        Self {
            name: item.name().to_string(),
            package_id: item.package_id().to_string(),
            kind: item.kind(),
            data_dir: item.data_dir().to_string(),
            size: item.size_bytes(),
            size_formatted: item.size_formatted(),
        }
    }
}

impl JsonSummary {
    /// Compute summary statistics from a slice of apps.
    #[must_use]
    pub fn from_items(items: &[AppItem]) -> Self {
        let mut by_kind: BTreeMap<String, (usize, u64)> = BTreeMap::new();

        for item in items {
            let key = match item.kind() {
                AppKind::User => "user",
                AppKind::System => "system",
            };

            let entry = by_kind.entry(key.to_string()).or_insert((0, 0));
            entry.0 += 1;
            entry.1 += item.size_bytes();
        }

        let total_size: u64 = items.iter().map(AppItem::size_bytes).sum();

        Self {
            total_apps: items.len(),
            total_size,
            total_size_formatted: format_size(total_size),
            by_kind: by_kind
                .into_iter()
                .map(|(k, (count, size))| {
                    (
                        k,
                        JsonKindSummary {
                            count,
                            size,
                            size_formatted: format_size(size),
                        },
                    )
                })
                .collect(),
        }
    }
}

impl JsonFailure {
    #[must_use]
    pub fn from_failure(failure: &LookupFailure) -> Self {
        Self {
            package_id: failure.package_id.clone(),
            error: failure.error.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::DateTime;

    use super::*;
    use crate::inventory::IconRef;
    use crate::registry::RegistryError;

    fn item(name: &str, package_id: &str, size: u64, kind: AppKind) -> AppItem {
        AppItem::new(
            name.to_string(),
            IconRef::default(),
            package_id.to_string(),
            size,
            kind,
            format!("/data/user/0/{package_id}"),
        )
    }

    fn sample() -> Vec<AppItem> {
        vec![
            item("Maps", "org.example.maps", 2_048, AppKind::User),
            item("Phone", "com.android.phone", 1_024, AppKind::System),
            item("Notes", "org.example.notes", 1_024, AppKind::User),
        ]
    }

    #[test]
    fn test_json_shape() {
        let failures = vec![LookupFailure {
            package_id: "com.gone".to_string(),
            error: RegistryError::PackageNotFound {
                package_id: "com.gone".to_string(),
            },
        }];
        let output = JsonOutput::new(
            Some("emulator-5554".to_string()),
            SizeMode::Entry,
            &sample(),
            &failures,
            false,
        );
        let value = serde_json::to_value(&output).unwrap();

        assert_eq!(value["device"], "emulator-5554");
        assert_eq!(value["size_mode"], "entry");
        assert_eq!(value["aborted"], false);
        assert_eq!(value["unmeasured"], 0);
        assert!(DateTime::parse_from_rfc3339(value["captured_at"].as_str().unwrap()).is_ok());

        let apps = value["apps"].as_array().unwrap();
        assert_eq!(apps.len(), 3);
        assert_eq!(apps[0]["package_id"], "org.example.maps");
        assert_eq!(apps[0]["kind"], "user");
        assert_eq!(apps[0]["size"], 2_048);
        assert_eq!(apps[0]["size_formatted"], "2.00 KB");
        assert_eq!(apps[1]["data_dir"], "/data/user/0/com.android.phone");

        assert_eq!(value["failures"][0]["package_id"], "com.gone");
        assert!(
            value["failures"][0]["error"]
                .as_str()
                .unwrap()
                .contains("com.gone")
        );
    }

    #[test]
    fn test_summary_by_kind() {
        let summary = JsonSummary::from_items(&sample());

        assert_eq!(summary.total_apps, 3);
        assert_eq!(summary.total_size, 4_096);
        assert_eq!(summary.total_size_formatted, "4.00 KB");
        assert_eq!(summary.by_kind["user"].count, 2);
        assert_eq!(summary.by_kind["user"].size, 3_072);
        assert_eq!(summary.by_kind["system"].count, 1);
        assert_eq!(summary.by_kind["system"].size_formatted, "1.00 KB");
    }

    #[test]
    fn test_empty_output() {
        let output = JsonOutput::new(None, SizeMode::Recursive, &[], &[], true);
        let value = serde_json::to_value(&output).unwrap();

        assert!(value["device"].is_null());
        assert_eq!(value["size_mode"], "recursive");
        assert_eq!(value["summary"]["total_apps"], 0);
        assert_eq!(value["summary"]["total_size_formatted"], "0B");
        assert!(value["summary"]["by_kind"].as_object().unwrap().is_empty());
        assert_eq!(value["aborted"], true);
    }

    #[test]
    fn test_unmeasured_count() {
        let output = JsonOutput::new(None, SizeMode::Entry, &sample(), &[], false).with_unmeasured(2);
        let value = serde_json::to_value(&output).unwrap();

        assert_eq!(value["unmeasured"], 2);
        assert_eq!(value["summary"]["total_apps"], 3);
    }
}
