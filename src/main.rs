//! # app-sizes
//!
//! A CLI tool that lists the apps installed on an Android device sorted by
//! how much data they store, and opens an app's system details screen.
//!
//! ## Features
//!
//! - Every installed package, user and system, largest data directory first
//! - Entry or recursive size measurement, optionally through `su`
//! - Kind, size and package-pattern filters
//! - Interactive selection that opens the app's settings page on the device
//! - JSON output for scripting
//! - Persistent configuration via `~/.config/app-sizes/config.toml`
//!
//! ## Usage
//!
//! ```bash
//! # List all apps on the attached device
//! app-sizes
//!
//! # Only user apps of at least 10 MB, measured recursively as root
//! app-sizes --kind user --min-size 10MB --recursive --su
//!
//! # Pick an app and jump to its settings page
//! app-sizes --interactive
//!
//! # Open a settings page directly
//! app-sizes open com.android.chrome
//! ```

mod cli;

use std::process::exit;

use anyhow::{Result, bail};
use app_sizes::{
    config::{DeviceOptions, FileConfig},
    filtering::{filter_items, sort_items},
    inventory::{BuildReport, Inventory, InventoryBuilder, LookupFailure},
    navigator::{AdbNavigator, Navigator},
    output::JsonOutput,
    registry::{Adb, AdbRegistry, AdbSizeProbe, LocalSizeProbe, SizeProbe},
};
use clap::Parser;
use cli::{Cli, Commands, ConfigCommand};
use colored::Colorize;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Entry point for the app-sizes application.
///
/// This function handles all errors gracefully by calling [`inner_main`] and printing
/// any errors to stderr before exiting with a non-zero status code.
fn main() {
    if let Err(err) = inner_main() {
        eprintln!("Error: {err}");

        exit(1);
    }
}

/// Main application logic that can return errors.
///
/// This function orchestrates the full pipeline: parse arguments, build the
/// inventory, filter/sort, render it, and optionally open the selected app.
///
/// # Errors
///
/// Returns errors from thread-pool configuration, the package listing,
/// filtering, interactive selection, navigation, or JSON serialization.
fn inner_main() -> Result<()> {
    let args = Cli::parse();

    if let Some(Commands::Config { command }) = &args.subcommand {
        return handle_config_command(command);
    }

    let json_mode = args.json();
    let file_config = load_config(json_mode);
    init_logging(&args.log_filter(&file_config));

    let device_options = args.device_options(&file_config);
    let adb = adb_for(&device_options);

    if let Some(Commands::Open { package }) = &args.subcommand {
        return open_details(&AdbNavigator::new(adb), package);
    }

    let inventory_options = args.inventory_options(&file_config);
    let filter_options = args.filter_options(&file_config);
    let sort_options = args.sort_options(&file_config);

    if inventory_options.threads > 0 {
        rayon::ThreadPoolBuilder::new()
            .num_threads(inventory_options.threads)
            .build_global()?;
    }

    let registry = AdbRegistry::new(adb.clone());
    let probe: Box<dyn SizeProbe> = if adb.is_local() && !device_options.use_su {
        Box::new(LocalSizeProbe)
    } else {
        Box::new(AdbSizeProbe::new(adb.clone(), device_options.use_su))
    };
    debug!("device options: {device_options:?}");

    let size_mode = inventory_options.size_mode;
    let BuildReport {
        inventory,
        failures,
        aborted,
        unmeasured,
    } = InventoryBuilder::new(&registry, probe.as_ref(), inventory_options)
        .with_quiet(json_mode)
        .build()?;

    if !json_mode {
        println!(
            "{} {}",
            "Total installed apps:".bold(),
            inventory.len().to_string().bright_white()
        );
    }

    let mut items = filter_items(inventory.into_vec(), &filter_options)?;
    sort_items(&mut items, &sort_options);

    if json_mode {
        let output = JsonOutput::new(device_options.serial, size_mode, &items, &failures, aborted)
            .with_unmeasured(unmeasured);
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    let inventory: Inventory = items.into();
    if inventory.is_empty() {
        println!("{}", "✨ No apps match the specified criteria!".green());
    } else {
        println!();
        inventory.print_list();
        println!();
        inventory.print_summary();
    }

    print_failures(&failures, aborted);
    print_unmeasured(unmeasured, device_options.use_su);

    if args.interactive()
        && let Some(item) = inventory.interactive_selection()?
    {
        open_details(&AdbNavigator::new(adb), item.package_id())?;
    }

    Ok(())
}

// ── Helper functions ────────────────────────────────────────────────────

/// Install the stderr log subscriber. `RUST_LOG` wins over `default_filter`.
fn init_logging(default_filter: &str) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Shell used for every device command: `adb shell`, or `sh -c` with `--local`.
fn adb_for(device_options: &DeviceOptions) -> Adb {
    if device_options.local {
        return Adb::local();
    }
    Adb::new(device_options.adb_path.clone()).with_serial(device_options.serial.clone())
}

/// Ask the navigator to show `package_id`'s details screen.
fn open_details(navigator: &dyn Navigator, package_id: &str) -> Result<()> {
    navigator.open_app_details(package_id)?;
    println!(
        "{} {}",
        "📲 Opened app details for".green(),
        package_id.bright_white()
    );
    Ok(())
}

/// Print the packages that were left out of the list, if any.
fn print_failures(failures: &[LookupFailure], aborted: bool) {
    if failures.is_empty() {
        return;
    }

    println!();
    println!(
        "{}",
        format!("⚠️  {} package(s) could not be resolved:", failures.len()).yellow()
    );
    for failure in failures {
        println!("  {} {}", failure.package_id.yellow(), failure.error);
    }

    if aborted {
        println!(
            "{}",
            "Enumeration stopped at the first failure; the list above is partial.".yellow()
        );
    }
}

/// Point out data directories that were shown as 0B because they could not be read.
fn print_unmeasured(unmeasured: usize, use_su: bool) {
    if unmeasured == 0 {
        return;
    }

    println!();
    println!(
        "{}",
        format!("⚠️  {unmeasured} data director(ies) could not be measured and show as 0B.").yellow()
    );
    if !use_su {
        println!(
            "{}",
            "App data is usually only readable as root; try --su on a rooted device.".yellow()
        );
    }
}

// ── Config subcommand ────────────────────────────────────────────────

/// Default config file template written by `config init`.
const CONFIG_TEMPLATE: &str = r#"# app-sizes configuration
# All values shown are their defaults. Uncomment and change as needed.

# Serial of the device to query when several are attached
# serial = "emulator-5554"

# Path to the adb binary ("~" is expanded)
# adb_path = "adb"

# Log filter used when RUST_LOG is not set (error, warn, info, debug, trace)
# log_level = "warn"

[inventory]
# How to measure data directories: entry (size of the directory entry) or
# recursive (total size of its contents)
# size_mode = "entry"

# What to do when a package's metadata cannot be resolved: skip or abort
# on_lookup_error = "skip"

# Number of threads used to measure data directories (0 = all CPU cores)
# threads = 0

# Run size probes through `su -c` (rooted devices)
# use_su = false

# Run on the device itself: commands go through `sh -c` instead of adb
# local = false

[filtering]
# Kind of apps to list: all, user, system
# kind = "all"

# Hide apps smaller than this (e.g. "512KB", "10MB", "1.5GB")
# min_size = "0"

# Hide packages whose id matches one of these glob patterns
# exclude = []

# Sort output by: size, name, package
# sort = "size"

# Reverse the sort order
# reverse = false
"#;

/// Dispatch a `config` subcommand.
fn handle_config_command(cmd: &ConfigCommand) -> Result<()> {
    match cmd {
        ConfigCommand::Path => match FileConfig::config_path() {
            Some(path) => println!("{}", path.display()),
            None => bail!("Could not determine the config directory on this platform"),
        },
        ConfigCommand::Show => show_config()?,
        ConfigCommand::Init => init_config()?,
    }
    Ok(())
}

/// Print the effective configuration (file values merged with defaults).
fn show_config() -> Result<()> {
    let path = FileConfig::config_path();

    let (file_exists, config) = match &path {
        Some(p) if p.exists() => (true, FileConfig::load()?),
        _ => (false, FileConfig::default()),
    };

    match &path {
        Some(p) if file_exists => println!("Config file: {} (found)", p.display()),
        Some(p) => println!(
            "Config file: {} (not found - showing defaults)",
            p.display()
        ),
        None => println!("Config file: (cannot determine path on this platform)"),
    }

    println!();
    println!("{}", format_config(&config));
    Ok(())
}

/// Format a [`FileConfig`] as a human-readable table, showing defaults for `None` fields.
fn format_config(config: &FileConfig) -> String {
    fn show_str(val: Option<&str>, default: &str) -> String {
        val.map_or_else(
            || format!("\"{default}\"  (default)"),
            |v| format!("\"{v}\""),
        )
    }
    fn show_bool(val: Option<bool>, default: bool) -> String {
        val.map_or_else(|| format!("{default}  (default)"), |v| v.to_string())
    }
    fn show_usize(val: Option<usize>, default: &str) -> String {
        val.map_or_else(|| format!("{default}  (default)"), |v| v.to_string())
    }
    fn show_list(val: Option<&[String]>) -> String {
        match val {
            Some(v) if !v.is_empty() => {
                let items: Vec<String> = v.iter().map(|p| format!("\"{p}\"")).collect();
                format!("[{}]", items.join(", "))
            }
            _ => "[]  (default)".to_string(),
        }
    }

    let serial = config.serial.as_deref().map_or_else(
        || "(none)  (default)".to_string(),
        |v| format!("\"{v}\""),
    );
    let adb_path = config.adb_path.as_ref().map_or_else(
        || "\"adb\"  (default)".to_string(),
        |p| format!("\"{}\"", p.display()),
    );

    format!(
        "\
serial        = {serial}
adb_path      = {adb_path}
log_level     = {log_level}

[inventory]
size_mode       = {size_mode}
on_lookup_error = {on_lookup_error}
threads         = {threads}
use_su          = {use_su}
local           = {local}

[filtering]
kind          = {kind}
min_size      = {min_size}
exclude       = {exclude}
sort          = {sort}
reverse       = {reverse}",
        log_level = show_str(config.log_level.as_deref(), "warn"),
        size_mode = show_str(config.inventory.size_mode.as_deref(), "entry"),
        on_lookup_error = show_str(config.inventory.on_lookup_error.as_deref(), "skip"),
        threads = show_usize(config.inventory.threads, "0 (all cores)"),
        use_su = show_bool(config.inventory.use_su, false),
        local = show_bool(config.inventory.local, false),
        kind = show_str(config.filtering.kind.as_deref(), "all"),
        min_size = show_str(config.filtering.min_size.as_deref(), "0"),
        exclude = show_list(config.filtering.exclude.as_deref()),
        sort = show_str(config.filtering.sort.as_deref(), "size"),
        reverse = show_bool(config.filtering.reverse, false),
    )
}

/// Write a default config template to the config file path if it does not exist yet.
fn init_config() -> Result<()> {
    let Some(path) = FileConfig::config_path() else {
        bail!("Could not determine the config directory on this platform");
    };

    if path.exists() {
        println!("Config file already exists at: {}", path.display());
        println!("Remove it first if you want to regenerate it.");
        return Ok(());
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| {
            anyhow::anyhow!(
                "Failed to create config directory {}: {e}",
                parent.display()
            )
        })?;
    }

    std::fs::write(&path, CONFIG_TEMPLATE)
        .map_err(|e| anyhow::anyhow!("Failed to write config file {}: {e}", path.display()))?;

    println!("Config file written to: {}", path.display());
    Ok(())
}

/// Load the configuration file, falling back to defaults on failure.
fn load_config(json_mode: bool) -> FileConfig {
    match FileConfig::load() {
        Ok(config) => config,
        Err(e) => {
            if !json_mode {
                eprintln!("{} {e}", "Warning: Failed to load config file:".yellow());
            }
            FileConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_template_parses_to_defaults() {
        let config: FileConfig = toml::from_str(CONFIG_TEMPLATE).unwrap();

        assert!(config.serial.is_none());
        assert!(config.inventory.size_mode.is_none());
        assert!(config.filtering.exclude.is_none());
    }

    #[test]
    fn test_format_config_defaults() {
        let text = format_config(&FileConfig::default());

        assert!(text.contains("adb_path      = \"adb\"  (default)"));
        assert!(text.contains("size_mode       = \"entry\"  (default)"));
        assert!(text.contains("exclude       = []  (default)"));
    }

    #[test]
    fn test_format_config_values() {
        let config: FileConfig = toml::from_str(
            r#"
serial = "emulator-5554"

[inventory]
use_su = true

[filtering]
exclude = ["com.google.*"]
"#,
        )
        .unwrap();
        let text = format_config(&config);

        assert!(text.contains("serial        = \"emulator-5554\""));
        assert!(text.contains("use_su          = true"));
        assert!(text.contains("exclude       = [\"com.google.*\"]"));
    }
}
