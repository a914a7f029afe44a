//! Size formatting, parsing and measurement utilities.
//!
//! Sizes are carried around as `u64` byte counts everywhere in the crate.
//! Floating point only appears at the display boundary in [`format_size`].
//! All units are binary (1 KB = 1024 bytes) so that what [`parse_size`]
//! accepts lines up with what [`format_size`] prints.

use std::path::Path;

use anyhow::Result;
use walkdir::WalkDir;

const KB: u64 = 1_024;
const MB: u64 = 1_048_576;
const GB: u64 = 1_073_741_824;

/// Format a byte count as a human-readable string with two decimals.
///
/// | Input range            | Output            |
/// |------------------------|-------------------|
/// | `0`                    | `"0B"`            |
/// | `1..1024`              | `"500.00 B"`      |
/// | `1024..1048576`        | `"1.50 KB"`       |
/// | `1048576..1073741824`  | `"12.00 MB"`      |
/// | `1073741824..`         | `"2.25 GB"`       |
///
/// The zero case has no space before the unit; every other case does.
/// There is no unit above GB.
///
/// # Examples
///
/// ```
/// # use app_sizes::utils::format_size;
/// assert_eq!(format_size(0), "0B");
/// assert_eq!(format_size(1024), "1.00 KB");
/// ```
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn format_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0B".to_string();
    }

    let (divisor, unit) = if bytes < KB {
        (1, "B")
    } else if bytes < MB {
        (KB, "KB")
    } else if bytes < GB {
        (MB, "MB")
    } else {
        (GB, "GB")
    };

    format!("{:.2} {unit}", bytes as f64 / divisor as f64)
}

/// Parse a human-readable size string into bytes.
///
/// Accepts the units printed by [`format_size`] (`B`, `KB`, `MB`, `GB`),
/// case-insensitively, with an optional decimal fraction and optional
/// whitespace before the unit. A bare number is a byte count.
///
/// # Errors
///
/// Returns an error if the number is malformed, negative, has more than
/// nine fractional digits, or the result overflows `u64`.
///
/// # Examples
///
/// ```
/// # use app_sizes::utils::parse_size;
/// assert_eq!(parse_size("10KB").unwrap(), 10_240);
/// assert_eq!(parse_size("1.5 MB").unwrap(), 1_572_864);
/// ```
pub fn parse_size(size_str: &str) -> Result<u64> {
    let upper = size_str.trim().to_uppercase();
    let (number, multiplier) = split_unit(&upper);
    let number = number.trim_end();

    if number.is_empty() {
        anyhow::bail!("Missing number in size: {size_str:?}");
    }

    match number.split_once('.') {
        Some((whole, fraction)) => parse_decimal(whole, fraction, multiplier),
        None => number
            .parse::<u64>()?
            .checked_mul(multiplier)
            .ok_or_else(|| anyhow::anyhow!("Size value overflow: {size_str}")),
    }
}

/// Split a trailing unit off an uppercased size string.
fn split_unit(size_str: &str) -> (&str, u64) {
    const UNITS: &[(&str, u64)] = &[("GB", GB), ("MB", MB), ("KB", KB), ("B", 1)];

    UNITS
        .iter()
        .find_map(|(suffix, multiplier)| {
            size_str
                .strip_suffix(suffix)
                .map(|number| (number, *multiplier))
        })
        .unwrap_or((size_str, 1))
}

/// Combine `whole.fraction` with a unit multiplier using integer math only.
fn parse_decimal(whole: &str, fraction: &str, multiplier: u64) -> Result<u64> {
    if fraction.len() > 9 || !fraction.bytes().all(|b| b.is_ascii_digit()) {
        anyhow::bail!("Invalid decimal fraction: {fraction:?}");
    }

    let whole: u64 = if whole.is_empty() { 0 } else { whole.parse()? };
    let scale = 10u64.pow(u32::try_from(fraction.len())?);
    let fraction: u64 = if fraction.is_empty() { 0 } else { fraction.parse()? };

    let whole_bytes = whole
        .checked_mul(multiplier)
        .ok_or_else(|| anyhow::anyhow!("Size value overflow: {whole} * {multiplier}"))?;
    let fraction_bytes = u128::from(fraction) * u128::from(multiplier) / u128::from(scale);

    whole_bytes
        .checked_add(u64::try_from(fraction_bytes)?)
        .ok_or_else(|| anyhow::anyhow!("Size value overflow: {whole}.{fraction}"))
}

/// Calculate the total size of a directory and all its contents, in bytes.
///
/// Entries that cannot be read are skipped. Returns `0` if the path does
/// not exist.
pub fn calculate_dir_size(path: &Path) -> u64 {
    WalkDir::new(path)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .filter_map(|entry| entry.metadata().ok())
        .map(|metadata| metadata.len())
        .sum()
}
