//! Command-line interface definition and argument parsing.
//!
//! This module defines all command-line arguments, options, and their validation
//! using the [clap](https://docs.rs/clap/) library.
//!
//! Helper methods on [`Cli`] accept a [`FileConfig`] reference so that config-file
//! values act as defaults that CLI arguments can override (layered config).

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use app_sizes::config::file::{FileConfig, expand_tilde};
use app_sizes::config::{
    AppFilter, DeviceOptions, FilterOptions, InventoryOptions, LookupPolicy, SizeMode,
    SortCriteria, SortOptions,
};

/// Command-line arguments selecting the device and how it is reached.
#[derive(Parser)]
struct DeviceArgs {
    /// Serial of the device to query (passed to `adb -s`)
    ///
    /// Required when more than one device or emulator is attached.
    #[arg(short = 's', long)]
    serial: Option<String>,

    /// Path to the adb binary
    #[arg(long = "adb", value_name = "PATH")]
    adb_path: Option<PathBuf>,

    /// Run size probes through `su -c`
    ///
    /// App data directories are usually unreadable to the shell user; on a
    /// rooted device this makes the probes succeed instead of reporting 0B.
    #[arg(long)]
    su: bool,

    /// Run on the device itself instead of over adb
    ///
    /// `pm`, `dumpsys` and `am` are invoked through `sh -c` and data
    /// directories are measured on the local filesystem, e.g. from Termux.
    /// `--serial` and `--adb` are ignored.
    #[arg(long)]
    local: bool,
}

/// Command-line arguments controlling how the inventory is built.
#[derive(Parser)]
struct InventoryArgs {
    /// Measure the total size of everything under each data directory
    ///
    /// By default only the size of the data directory entry itself is read,
    /// which is fast but does not reflect its contents.
    #[arg(long)]
    recursive: bool,

    /// Stop at the first package whose metadata cannot be resolved
    ///
    /// Apps collected before the failure are still listed. Without this flag
    /// the failing package is skipped and enumeration continues.
    #[arg(long)]
    abort_on_error: bool,

    /// The number of threads used to measure data directories
    ///
    /// A value of 0 uses the default number of threads (typically the number of CPU cores).
    #[arg(short = 't', long)]
    threads: Option<usize>,
}

/// Command-line arguments for filtering and ordering the list.
#[derive(Parser)]
struct FilteringArgs {
    /// Kind of apps to list (all, user, system)
    #[arg(short = 'k', long)]
    kind: Option<AppFilter>,

    /// Hide apps whose data size is smaller than the specified value
    ///
    /// Supports B, KB, MB and GB (base 1024), case-insensitive, with
    /// optional decimals: 512KB, 1.5GB, 1048576.
    #[arg(short = 'm', long)]
    min_size: Option<String>,

    /// Hide packages whose id matches this glob pattern
    ///
    /// Can be specified multiple times, e.g. `--exclude 'com.google.*'`.
    #[arg(long, action = clap::ArgAction::Append)]
    exclude: Vec<String>,

    /// Sort apps by the given criterion
    ///
    /// Supported values: size (largest first), name (alphabetical),
    /// package (by package id). Use --reverse to flip the order.
    #[arg(long, value_enum)]
    sort: Option<SortCriteria>,

    /// Reverse the sort order
    #[arg(long)]
    reverse: bool,
}

/// Top-level subcommands.
#[derive(Subcommand)]
pub enum Commands {
    /// Inspect or initialise the configuration file
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },

    /// Open the application-details settings screen for a package
    Open {
        /// Package id, e.g. `com.android.chrome`
        package: String,
    },
}

/// Subcommands for `config`.
#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Print the effective configuration (file values + defaults for unset keys)
    Show,
    /// Write a default config.toml if none exists yet
    Init,
    /// Print the path to the config file
    Path,
}

/// Main command-line interface structure.
///
/// Helper methods accept a [`FileConfig`] reference so that config-file values act as
/// defaults when the corresponding CLI argument is not provided.
#[derive(Parser)]
#[command(name = "app-sizes")]
#[command(
    about = "List the apps installed on an Android device sorted by data size, and open their settings page"
)]
#[command(version)]
#[command(author)]
pub struct Cli {
    /// Subcommand (e.g. `config`, `open`)
    #[command(subcommand)]
    pub subcommand: Option<Commands>,

    /// Output results as a single JSON object for scripting/piping
    ///
    /// When enabled, all human-readable output (colors, spinner, emojis)
    /// is suppressed and a single JSON document is printed to stdout.
    #[arg(long)]
    json: bool,

    /// Pick an app from the list and open its details screen
    #[arg(short = 'i', long, conflicts_with = "json")]
    interactive: bool,

    /// Enable debug logging on stderr
    ///
    /// `RUST_LOG` takes precedence when set.
    #[arg(short = 'v', long)]
    verbose: bool,

    /// Device options
    #[command(flatten)]
    device: DeviceArgs,

    /// Inventory options
    #[command(flatten)]
    inventory: InventoryArgs,

    /// Filtering options
    #[command(flatten)]
    filtering: FilteringArgs,
}

impl Cli {
    /// Whether `--json` structured output mode is enabled.
    #[must_use]
    pub const fn json(&self) -> bool {
        self.json
    }

    /// Whether `--interactive` selection is enabled.
    #[must_use]
    pub const fn interactive(&self) -> bool {
        self.interactive
    }

    /// Log filter directive used when `RUST_LOG` is not set.
    ///
    /// Priority: `--verbose` (`debug`) > config `log_level` > `warn`.
    #[must_use]
    pub fn log_filter(&self, config: &FileConfig) -> String {
        if self.verbose {
            return "debug".to_string();
        }

        config
            .log_level
            .clone()
            .unwrap_or_else(|| "warn".to_string())
    }

    /// Extract device options from CLI args and config file.
    ///
    /// - **`adb_path`**: CLI > config (tilde-expanded) > `adb`
    /// - **serial**: CLI > config > none
    /// - **`use_su`** / **local**: CLI flag `||` config value `||` `false`
    #[must_use]
    pub fn device_options(&self, config: &FileConfig) -> DeviceOptions {
        let defaults = DeviceOptions::default();

        DeviceOptions {
            adb_path: self
                .device
                .adb_path
                .clone()
                .or_else(|| config.adb_path.as_deref().map(expand_tilde))
                .unwrap_or(defaults.adb_path),
            serial: self
                .device
                .serial
                .clone()
                .or_else(|| config.serial.clone()),
            use_su: self.device.su || config.inventory.use_su.unwrap_or(false),
            local: self.device.local || config.inventory.local.unwrap_or(false),
        }
    }

    /// Extract inventory options from CLI args and config file.
    ///
    /// `--recursive` and `--abort-on-error` switch away from the defaults
    /// (`entry`, `skip`); otherwise the config values apply.
    #[must_use]
    pub fn inventory_options(&self, config: &FileConfig) -> InventoryOptions {
        let size_mode = if self.inventory.recursive {
            SizeMode::Recursive
        } else {
            config
                .inventory
                .size_mode
                .as_ref()
                .and_then(|s| SizeMode::from_str(s, true).ok())
                .unwrap_or_default()
        };

        let lookup_policy = if self.inventory.abort_on_error {
            LookupPolicy::Abort
        } else {
            config
                .inventory
                .on_lookup_error
                .as_ref()
                .and_then(|s| LookupPolicy::from_str(s, true).ok())
                .unwrap_or_default()
        };

        InventoryOptions {
            size_mode,
            lookup_policy,
            threads: self
                .inventory
                .threads
                .or(config.inventory.threads)
                .unwrap_or(0),
        }
    }

    /// Extract filtering options from CLI args and config file.
    ///
    /// Priority: CLI argument > config file > hardcoded default. Exclude
    /// patterns are merged from both sources (config values first).
    #[must_use]
    pub fn filter_options(&self, config: &FileConfig) -> FilterOptions {
        let mut exclude = config.filtering.exclude.clone().unwrap_or_default();
        exclude.extend(self.filtering.exclude.iter().cloned());

        FilterOptions {
            kind: self
                .filtering
                .kind
                .or_else(|| {
                    config
                        .filtering
                        .kind
                        .as_ref()
                        .and_then(|s| AppFilter::from_str(s, true).ok())
                })
                .unwrap_or_default(),
            min_size: self
                .filtering
                .min_size
                .clone()
                .or_else(|| config.filtering.min_size.clone())
                .unwrap_or_else(|| "0".to_string()),
            exclude,
        }
    }

    /// Extract sorting options from CLI args and config file.
    ///
    /// Priority: CLI argument > config file > default (size, largest first).
    #[must_use]
    pub fn sort_options(&self, config: &FileConfig) -> SortOptions {
        SortOptions {
            criteria: self
                .filtering
                .sort
                .or_else(|| {
                    config
                        .filtering
                        .sort
                        .as_ref()
                        .and_then(|s| SortCriteria::from_str(s, true).ok())
                })
                .unwrap_or_default(),
            reverse: self.filtering.reverse || config.filtering.reverse.unwrap_or(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use app_sizes::config::file::{FileFilterConfig, FileInventoryConfig};
    use clap::Parser;

    #[test]
    fn test_default_values() {
        let args = Cli::parse_from(["app-sizes"]);
        let config = FileConfig::default();

        assert!(args.subcommand.is_none());
        assert!(!args.json());
        assert!(!args.interactive());
        assert_eq!(args.log_filter(&config), "warn");

        let device = args.device_options(&config);
        assert_eq!(device.adb_path, PathBuf::from("adb"));
        assert!(device.serial.is_none());
        assert!(!device.use_su);
        assert!(!device.local);

        let inventory = args.inventory_options(&config);
        assert_eq!(inventory.size_mode, SizeMode::Entry);
        assert_eq!(inventory.lookup_policy, LookupPolicy::Skip);
        assert_eq!(inventory.threads, 0);

        let filter = args.filter_options(&config);
        assert_eq!(filter.kind, AppFilter::All);
        assert_eq!(filter.min_size, "0");
        assert!(filter.exclude.is_empty());

        let sort = args.sort_options(&config);
        assert_eq!(sort.criteria, SortCriteria::Size);
        assert!(!sort.reverse);
    }

    #[test]
    fn test_short_flags() {
        let config = FileConfig::default();
        let args = Cli::parse_from([
            "app-sizes",
            "-s",
            "emulator-5554",
            "-k",
            "user",
            "-t",
            "4",
            "-m",
            "10MB",
            "-i",
            "-v",
        ]);

        assert_eq!(
            args.device_options(&config).serial.as_deref(),
            Some("emulator-5554")
        );
        assert_eq!(args.filter_options(&config).kind, AppFilter::User);
        assert_eq!(args.inventory_options(&config).threads, 4);
        assert_eq!(args.filter_options(&config).min_size, "10MB");
        assert!(args.interactive());
        assert_eq!(args.log_filter(&config), "debug");
    }

    #[test]
    fn test_device_flags() {
        let config = FileConfig::default();
        let args = Cli::parse_from(["app-sizes", "--adb", "/opt/sdk/adb", "--su", "--local"]);
        let device = args.device_options(&config);

        assert_eq!(device.adb_path, PathBuf::from("/opt/sdk/adb"));
        assert!(device.use_su);
        assert!(device.local);
    }

    #[test]
    fn test_inventory_flags() {
        let config = FileConfig::default();
        let args = Cli::parse_from(["app-sizes", "--recursive", "--abort-on-error"]);
        let inventory = args.inventory_options(&config);

        assert_eq!(inventory.size_mode, SizeMode::Recursive);
        assert_eq!(inventory.lookup_policy, LookupPolicy::Abort);
    }

    #[test]
    fn test_kind_filters() {
        let config = FileConfig::default();

        for (input, expected) in [
            ("all", AppFilter::All),
            ("user", AppFilter::User),
            ("system", AppFilter::System),
        ] {
            let args = Cli::parse_from(["app-sizes", "--kind", input]);
            assert_eq!(args.filter_options(&config).kind, expected);
        }
    }

    #[test]
    fn test_multiple_excludes() {
        let config = FileConfig::default();
        let args = Cli::parse_from([
            "app-sizes",
            "--exclude",
            "com.google.*",
            "--exclude",
            "com.android.*",
        ]);

        assert_eq!(
            args.filter_options(&config).exclude,
            vec!["com.google.*".to_string(), "com.android.*".to_string()]
        );
    }

    #[test]
    fn test_sort_options_cli_all_criteria() {
        let config = FileConfig::default();

        for (input, expected) in [
            ("size", SortCriteria::Size),
            ("name", SortCriteria::Name),
            ("package", SortCriteria::Package),
        ] {
            let args = Cli::parse_from(["app-sizes", "--sort", input, "--reverse"]);
            let sort_opts = args.sort_options(&config);
            assert_eq!(sort_opts.criteria, expected);
            assert!(sort_opts.reverse);
        }
    }

    #[test]
    fn test_json_conflicts_with_interactive() {
        assert!(Cli::try_parse_from(["app-sizes", "--json", "--interactive"]).is_err());
        assert!(Cli::try_parse_from(["app-sizes", "--json"]).is_ok());
    }

    #[test]
    fn test_subcommands() {
        let args = Cli::parse_from(["app-sizes", "open", "com.android.chrome"]);
        assert!(matches!(
            args.subcommand,
            Some(Commands::Open { ref package }) if package == "com.android.chrome"
        ));

        let args = Cli::parse_from(["app-sizes", "config", "path"]);
        assert!(matches!(
            args.subcommand,
            Some(Commands::Config {
                command: ConfigCommand::Path
            })
        ));

        assert!(Cli::try_parse_from(["app-sizes", "open"]).is_err());
    }

    #[test]
    fn test_config_values_used_when_cli_absent() {
        let args = Cli::parse_from(["app-sizes"]);
        let config = FileConfig {
            serial: Some("R58M123".to_string()),
            adb_path: Some(PathBuf::from("/usr/local/bin/adb")),
            log_level: Some("info".to_string()),
            inventory: FileInventoryConfig {
                size_mode: Some("recursive".to_string()),
                on_lookup_error: Some("abort".to_string()),
                threads: Some(8),
                use_su: Some(true),
                local: Some(false),
            },
            filtering: FileFilterConfig {
                kind: Some("system".to_string()),
                min_size: Some("1MB".to_string()),
                exclude: Some(vec!["com.example.*".to_string()]),
                sort: Some("name".to_string()),
                reverse: Some(true),
            },
        };

        let device = args.device_options(&config);
        assert_eq!(device.serial.as_deref(), Some("R58M123"));
        assert_eq!(device.adb_path, PathBuf::from("/usr/local/bin/adb"));
        assert!(device.use_su);
        assert!(!device.local);

        let inventory = args.inventory_options(&config);
        assert_eq!(inventory.size_mode, SizeMode::Recursive);
        assert_eq!(inventory.lookup_policy, LookupPolicy::Abort);
        assert_eq!(inventory.threads, 8);

        let filter = args.filter_options(&config);
        assert_eq!(filter.kind, AppFilter::System);
        assert_eq!(filter.min_size, "1MB");
        assert_eq!(filter.exclude, vec!["com.example.*".to_string()]);

        let sort = args.sort_options(&config);
        assert_eq!(sort.criteria, SortCriteria::Name);
        assert!(sort.reverse);

        assert_eq!(args.log_filter(&config), "info");
    }

    #[test]
    fn test_cli_overrides_config_values() {
        let args = Cli::parse_from([
            "app-sizes",
            "--serial",
            "emulator-5556",
            "--kind",
            "user",
            "--min-size",
            "5KB",
            "--sort",
            "package",
            "--threads",
            "2",
            "--verbose",
        ]);
        let config = FileConfig {
            serial: Some("R58M123".to_string()),
            log_level: Some("info".to_string()),
            inventory: FileInventoryConfig {
                threads: Some(8),
                ..FileInventoryConfig::default()
            },
            filtering: FileFilterConfig {
                kind: Some("system".to_string()),
                min_size: Some("1MB".to_string()),
                sort: Some("name".to_string()),
                ..FileFilterConfig::default()
            },
            ..FileConfig::default()
        };

        assert_eq!(
            args.device_options(&config).serial.as_deref(),
            Some("emulator-5556")
        );
        assert_eq!(args.inventory_options(&config).threads, 2);
        assert_eq!(args.filter_options(&config).kind, AppFilter::User);
        assert_eq!(args.filter_options(&config).min_size, "5KB");
        assert_eq!(args.sort_options(&config).criteria, SortCriteria::Package);
        assert_eq!(args.log_filter(&config), "debug");
    }

    #[test]
    fn test_excludes_merged_from_both_sources() {
        let args = Cli::parse_from(["app-sizes", "--exclude", "org.cli.*"]);
        let config = FileConfig {
            filtering: FileFilterConfig {
                exclude: Some(vec!["org.config.*".to_string()]),
                ..FileFilterConfig::default()
            },
            ..FileConfig::default()
        };

        assert_eq!(
            args.filter_options(&config).exclude,
            vec!["org.config.*".to_string(), "org.cli.*".to_string()]
        );
    }

    #[test]
    fn test_config_adb_path_tilde_expansion() {
        let args = Cli::parse_from(["app-sizes"]);
        let config = FileConfig {
            adb_path: Some(PathBuf::from("~/Android/Sdk/platform-tools/adb")),
            ..FileConfig::default()
        };
        let adb_path = args.device_options(&config).adb_path;

        if let Some(home) = dirs::home_dir() {
            assert_eq!(adb_path, home.join("Android/Sdk/platform-tools/adb"));
        }
    }

    #[test]
    fn test_config_values_case_insensitive() {
        let args = Cli::parse_from(["app-sizes"]);
        let config = FileConfig {
            inventory: FileInventoryConfig {
                size_mode: Some("Recursive".to_string()),
                ..FileInventoryConfig::default()
            },
            filtering: FileFilterConfig {
                kind: Some("USER".to_string()),
                ..FileFilterConfig::default()
            },
            ..FileConfig::default()
        };

        assert_eq!(args.inventory_options(&config).size_mode, SizeMode::Recursive);
        assert_eq!(args.filter_options(&config).kind, AppFilter::User);
    }

    #[test]
    fn test_invalid_config_values_fall_back_to_default() {
        let args = Cli::parse_from(["app-sizes"]);
        let config = FileConfig {
            inventory: FileInventoryConfig {
                on_lookup_error: Some("explode".to_string()),
                ..FileInventoryConfig::default()
            },
            filtering: FileFilterConfig {
                sort: Some("age".to_string()),
                ..FileFilterConfig::default()
            },
            ..FileConfig::default()
        };

        assert_eq!(
            args.inventory_options(&config).lookup_policy,
            LookupPolicy::Skip
        );
        assert_eq!(args.sort_options(&config).criteria, SortCriteria::Size);
    }
}
