//! `adb`-backed package registry and size probe.
//!
//! Everything here goes through `adb shell` on the host:
//!
//! - `pm list packages -f` enumerates installed packages with their APK paths
//! - `dumpsys package <id>` resolves the data directory and system flags
//! - `stat -c %s` / `du -s -k` measure a data directory
//!
//! The text parsers are public so they can be exercised without a device.

use std::{path::PathBuf, process::Command, sync::LazyLock};

use regex::Regex;
use tracing::{debug, trace};

use crate::config::SizeMode;

use super::{
    ApplicationMetadata, PackageDescriptor, PackageRegistry, RegistryError, SizeProbe,
    default_data_dir, is_system_path,
};

static PACKAGE_HEADER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\s*)Package \[([^\]]+)\]").expect("valid regex"));
static DATA_DIR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:^|\s)dataDir=(\S+)").expect("valid regex"));
static CODE_PATH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:^|\s)codePath=(\S+)").expect("valid regex"));
static FLAGS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(?:pkgF|f)lags=\[\s*(.*?)\s*\]").expect("valid regex"));

/// Thin wrapper around the `adb` binary, optionally pinned to one device.
///
/// [`Adb::local`] runs the same shell commands through `sh -c` on this
/// machine, for when the tool runs on the device itself.
#[derive(Clone, Debug)]
pub struct Adb {
    binary: PathBuf,
    serial: Option<String>,
    local: bool,
}

impl Adb {
    /// Use the given `adb` binary against the default device.
    #[must_use]
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            serial: None,
            local: false,
        }
    }

    /// Run shell commands locally instead of through `adb shell`.
    #[must_use]
    pub fn local() -> Self {
        Self {
            binary: PathBuf::from("sh"),
            serial: None,
            local: true,
        }
    }

    /// Whether commands run on this machine rather than over `adb`.
    #[must_use]
    pub const fn is_local(&self) -> bool {
        self.local
    }

    /// Pin every command to the device with this serial (`adb -s`).
    #[must_use]
    pub fn with_serial(mut self, serial: Option<String>) -> Self {
        self.serial = serial;
        self
    }

    /// The pinned device serial, if any.
    #[must_use]
    pub fn serial(&self) -> Option<&str> {
        self.serial.as_deref()
    }

    /// Run `adb shell <args...>` (or `sh -c "<args...>"` when local) and
    /// return its stdout.
    ///
    /// The arguments are joined with spaces and interpreted by the shell in
    /// both modes.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Io`] if the process cannot be spawned and
    /// [`RegistryError::CommandFailed`] if it exits unsuccessfully.
    pub fn shell(&self, args: &[&str]) -> Result<String, RegistryError> {
        let script = args.join(" ");
        let mut command = Command::new(&self.binary);
        let label = if self.local {
            command.arg("-c").arg(&script);
            format!("sh -c {script}")
        } else {
            if let Some(serial) = &self.serial {
                command.arg("-s").arg(serial);
            }
            command.arg("shell").args(args);
            format!("adb shell {script}")
        };

        trace!("running {label}");
        let output = command.output()?;

        if output.status.success() {
            Ok(String::from_utf8_lossy(&output.stdout).into_owned())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            debug!("{label} failed: {stderr}");
            Err(RegistryError::CommandFailed {
                command: label,
                stderr,
            })
        }
    }
}

/// Package registry backed by `pm` and `dumpsys` over `adb`.
#[derive(Clone, Debug)]
pub struct AdbRegistry {
    adb: Adb,
}

impl AdbRegistry {
    #[must_use]
    pub const fn new(adb: Adb) -> Self {
        Self { adb }
    }
}

impl PackageRegistry for AdbRegistry {
    fn list_installed_packages(&self) -> Result<Vec<PackageDescriptor>, RegistryError> {
        let text = self.adb.shell(&["pm", "list", "packages", "-f"])?;
        let packages = parse_package_list(&text);
        debug!("pm listed {} packages", packages.len());

        if packages.is_empty() && !text.trim().is_empty() {
            return Err(RegistryError::UnexpectedOutput {
                command: "pm list packages -f".to_string(),
                output: text.lines().next().unwrap_or_default().to_string(),
            });
        }

        Ok(packages)
    }

    fn get_application_metadata(
        &self,
        package_id: &str,
    ) -> Result<ApplicationMetadata, RegistryError> {
        let text = self.adb.shell(&["dumpsys", "package", package_id])?;
        parse_package_dump(package_id, &text).ok_or_else(|| RegistryError::PackageNotFound {
            package_id: package_id.to_string(),
        })
    }
}

/// Size probe that runs `stat` or `du` on the device.
#[derive(Clone, Debug)]
pub struct AdbSizeProbe {
    adb: Adb,
    use_su: bool,
}

impl AdbSizeProbe {
    /// Create a probe; with `use_su` every command runs through `su -c`,
    /// which app data directories normally require.
    #[must_use]
    pub const fn new(adb: Adb, use_su: bool) -> Self {
        Self { adb, use_su }
    }
}

impl SizeProbe for AdbSizeProbe {
    fn size_of(&self, path: &str, mode: SizeMode) -> Result<u64, RegistryError> {
        let script = probe_script(path, mode);
        let text = if self.use_su {
            let wrapped = format!("\"{script}\"");
            self.adb.shell(&["su", "-c", wrapped.as_str()])?
        } else {
            self.adb.shell(&[script.as_str()])?
        };

        let size = match mode {
            SizeMode::Entry => parse_stat_size(&text),
            SizeMode::Recursive => parse_du_kib(&text),
        };

        size.ok_or_else(|| RegistryError::UnexpectedOutput {
            command: script,
            output: text.trim().to_string(),
        })
    }
}

/// Device-side command measuring `path` in the given mode.
fn probe_script(path: &str, mode: SizeMode) -> String {
    let quoted = shell_quote(path);
    match mode {
        SizeMode::Entry => format!("stat -c %s {quoted}"),
        SizeMode::Recursive => format!("du -s -k {quoted}"),
    }
}

/// Single-quote a string for the device shell.
fn shell_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', r"'\''"))
}

/// Parse `pm list packages -f` output.
///
/// Each line looks like `package:/data/app/~~x==/com.example-y==/base.apk=com.example`.
/// APK paths may themselves contain `=`, so the split happens at the last one.
#[must_use]
pub fn parse_package_list(text: &str) -> Vec<PackageDescriptor> {
    text.lines()
        .filter_map(|line| {
            let rest = line.trim().strip_prefix("package:")?;
            let (path, package_id) = rest.rsplit_once('=')?;
            let (path, package_id) = (path.trim(), package_id.trim());
            if path.is_empty() || package_id.is_empty() {
                return None;
            }
            Some(PackageDescriptor::new(package_id).with_apk_path(path))
        })
        .collect()
}

/// Parse `dumpsys package <id>` output into metadata for `package_id`.
///
/// Only the first `Package [<id>]` block is read; later blocks (such as the
/// hidden factory copy of an updated system app) are ignored. Returns `None`
/// when the dump has no block for the package.
#[must_use]
pub fn parse_package_dump(package_id: &str, text: &str) -> Option<ApplicationMetadata> {
    let mut lines = text.lines();

    let header_indent = lines.by_ref().find_map(|line| {
        let caps = PACKAGE_HEADER_RE.captures(line)?;
        (caps.get(2)?.as_str() == package_id).then(|| caps.get(1).map_or(0, |m| m.len()))
    })?;

    let mut data_dir = None;
    let mut code_path = None;
    let mut flags: Option<String> = None;

    for line in lines {
        let indent = line.len() - line.trim_start().len();
        if !line.trim().is_empty() && indent <= header_indent {
            break;
        }

        if data_dir.is_none() {
            data_dir = capture(&DATA_DIR_RE, line);
        }
        if code_path.is_none() {
            code_path = capture(&CODE_PATH_RE, line);
        }
        if flags.is_none() {
            flags = capture(&FLAGS_RE, line);
        }
    }

    let is_system = flags.map_or_else(
        || code_path.as_deref().is_some_and(is_system_path),
        |flags| flags.split_whitespace().any(|flag| flag == "SYSTEM"),
    );

    Some(ApplicationMetadata {
        package_id: package_id.to_string(),
        data_dir: data_dir.unwrap_or_else(|| default_data_dir(package_id)),
        is_system,
        code_path,
    })
}

fn capture(re: &Regex, line: &str) -> Option<String> {
    re.captures(line)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Parse `stat -c %s` output: a single byte count.
#[must_use]
pub fn parse_stat_size(text: &str) -> Option<u64> {
    text.trim().parse().ok()
}

/// Parse `du -s -k` output (`<kib>\t<path>`) into bytes.
#[must_use]
pub fn parse_du_kib(text: &str) -> Option<u64> {
    text.split_whitespace()
        .next()?
        .parse::<u64>()
        .ok()?
        .checked_mul(1024)
}
