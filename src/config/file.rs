//! Configuration file support for persistent settings.
//!
//! Settings are loaded from `~/.config/app-sizes/config.toml` (or the
//! platform-specific equivalent) and act as defaults that CLI arguments can
//! override.
//!
//! # Layering
//!
//! The precedence order is: **CLI argument > config file > hardcoded default**.
//!
//! # Example config
//!
//! ```toml
//! serial = "emulator-5554"
//! adb_path = "~/Android/Sdk/platform-tools/adb"
//! log_level = "info"
//!
//! [inventory]
//! size_mode = "recursive"
//! on_lookup_error = "abort"
//! threads = 4
//! use_su = true
//!
//! [filtering]
//! kind = "user"
//! min_size = "10MB"
//! exclude = ["com.google.android.*"]
//! sort = "name"
//! reverse = false
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Top-level configuration file structure.
///
/// All fields are `Option<T>` so we can tell which values the file sets and
/// layer them under the CLI arguments.
#[derive(Deserialize, Default, Debug)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    /// Default device serial
    pub serial: Option<String>,

    /// Path to the `adb` binary (`~` is expanded)
    pub adb_path: Option<PathBuf>,

    /// Log filter used when neither `RUST_LOG` nor `--verbose` is set
    pub log_level: Option<String>,

    /// Inventory options
    #[serde(default)]
    pub inventory: FileInventoryConfig,

    /// Filtering options
    #[serde(default)]
    pub filtering: FileFilterConfig,
}

/// Inventory options from the configuration file.
#[derive(Deserialize, Default, Debug)]
#[serde(deny_unknown_fields)]
pub struct FileInventoryConfig {
    /// `"entry"` or `"recursive"`
    pub size_mode: Option<String>,

    /// `"skip"` or `"abort"`
    pub on_lookup_error: Option<String>,

    /// Number of size-probing threads
    pub threads: Option<usize>,

    /// Whether to probe sizes through `su -c`
    pub use_su: Option<bool>,

    /// Run device commands through `sh -c` on this machine instead of `adb`
    pub local: Option<bool>,
}

/// Filtering options from the configuration file.
#[derive(Deserialize, Default, Debug)]
#[serde(deny_unknown_fields)]
pub struct FileFilterConfig {
    /// `"all"`, `"user"` or `"system"`
    pub kind: Option<String>,

    /// Minimum data size to show (e.g. `"10MB"`)
    pub min_size: Option<String>,

    /// Package id globs to hide
    pub exclude: Option<Vec<String>>,

    /// Sort criterion (`"size"`, `"name"`, `"package"`)
    pub sort: Option<String>,

    /// Whether to reverse the sort order
    pub reverse: Option<bool>,
}

/// Expand a leading `~` in a path to the user's home directory.
///
/// Paths that don't start with `~` are returned unchanged.
#[must_use]
pub fn expand_tilde(path: &Path) -> PathBuf {
    if let Ok(rest) = path.strip_prefix("~")
        && let Some(home) = dirs::home_dir()
    {
        return home.join(rest);
    }
    path.to_path_buf()
}

impl FileConfig {
    /// Returns the path where the configuration file is expected:
    /// `<config_dir>/app-sizes/config.toml`.
    ///
    /// Returns `None` if the platform config directory cannot be determined.
    #[must_use]
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("app-sizes").join("config.toml"))
    }

    /// Load configuration from the default config file location.
    ///
    /// A missing file yields the default (empty) configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load() -> anyhow::Result<Self> {
        let Some(path) = Self::config_path() else {
            return Ok(Self::default());
        };

        if !path.exists() {
            return Ok(Self::default());
        }

        Self::load_from(&path)
    }

    /// Load configuration from an explicit path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or contains invalid TOML
    /// or unknown keys.
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            anyhow::anyhow!("Failed to read config file at {}: {e}", path.display())
        })?;

        toml::from_str(&content).map_err(|e| {
            anyhow::anyhow!("Failed to parse config file at {}: {e}", path.display())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_file_config() {
        let config = FileConfig::default();

        assert!(config.serial.is_none());
        assert!(config.adb_path.is_none());
        assert!(config.log_level.is_none());
        assert!(config.inventory.size_mode.is_none());
        assert!(config.inventory.on_lookup_error.is_none());
        assert!(config.inventory.threads.is_none());
        assert!(config.inventory.use_su.is_none());
        assert!(config.inventory.local.is_none());
        assert!(config.filtering.kind.is_none());
        assert!(config.filtering.min_size.is_none());
        assert!(config.filtering.exclude.is_none());
        assert!(config.filtering.sort.is_none());
        assert!(config.filtering.reverse.is_none());
    }

    #[test]
    fn test_parse_full_config() {
        let toml_content = r#"
serial = "emulator-5554"
adb_path = "~/sdk/platform-tools/adb"
log_level = "debug"

[inventory]
size_mode = "recursive"
on_lookup_error = "abort"
threads = 4
use_su = true
local = false

[filtering]
kind = "user"
min_size = "10MB"
exclude = ["com.google.*", "com.android.vending"]
sort = "name"
reverse = true
"#;

        let config: FileConfig = toml::from_str(toml_content).unwrap();

        assert_eq!(config.serial.as_deref(), Some("emulator-5554"));
        assert_eq!(
            config.adb_path,
            Some(PathBuf::from("~/sdk/platform-tools/adb"))
        );
        assert_eq!(config.log_level.as_deref(), Some("debug"));
        assert_eq!(config.inventory.size_mode.as_deref(), Some("recursive"));
        assert_eq!(config.inventory.on_lookup_error.as_deref(), Some("abort"));
        assert_eq!(config.inventory.threads, Some(4));
        assert_eq!(config.inventory.use_su, Some(true));
        assert_eq!(config.inventory.local, Some(false));
        assert_eq!(config.filtering.kind.as_deref(), Some("user"));
        assert_eq!(config.filtering.min_size.as_deref(), Some("10MB"));
        assert_eq!(
            config.filtering.exclude,
            Some(vec![
                "com.google.*".to_string(),
                "com.android.vending".to_string()
            ])
        );
        assert_eq!(config.filtering.sort.as_deref(), Some("name"));
        assert_eq!(config.filtering.reverse, Some(true));
    }

    #[test]
    fn test_parse_partial_config() {
        let config: FileConfig = toml::from_str("[filtering]\nmin_size = \"1MB\"\n").unwrap();

        assert!(config.serial.is_none());
        assert_eq!(config.filtering.min_size.as_deref(), Some("1MB"));
        assert!(config.inventory.size_mode.is_none());
    }

    #[test]
    fn test_parse_empty_config() {
        let config: FileConfig = toml::from_str("").unwrap();
        assert!(config.serial.is_none());
    }

    #[test]
    fn test_malformed_config_errors() {
        assert!(toml::from_str::<FileConfig>("[inventory]\nthreads = \"many\"\n").is_err());
        assert!(toml::from_str::<FileConfig>("unknown_key = 1\n").is_err());
    }

    #[test]
    fn test_load_from_reports_path() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "serial = 5\n").unwrap();

        let err = FileConfig::load_from(&path).unwrap_err().to_string();
        assert!(err.contains("Failed to parse config file"));
        assert!(err.contains("config.toml"));
    }

    #[test]
    fn test_load_from_missing_file() {
        let err = FileConfig::load_from(Path::new("/no/such/config.toml")).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }

    #[test]
    fn test_config_path_returns_expected_suffix() {
        if let Some(p) = FileConfig::config_path() {
            assert!(p.ends_with(Path::new("app-sizes").join("config.toml")));
        }
    }

    #[test]
    fn test_expand_tilde_with_home() {
        let expanded = expand_tilde(Path::new("~/sdk/adb"));

        if let Some(home) = dirs::home_dir() {
            assert_eq!(expanded, home.join("sdk").join("adb"));
        }
    }

    #[test]
    fn test_expand_tilde_leaves_other_paths() {
        assert_eq!(expand_tilde(Path::new("/usr/bin/adb")), PathBuf::from("/usr/bin/adb"));
        assert_eq!(expand_tilde(Path::new("adb")), PathBuf::from("adb"));
    }
}
