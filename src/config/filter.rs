//! Filtering and ordering configuration for the app list.
//!
//! The inventory itself is always complete and sorted by size. These options
//! decide which of its entries are shown and in what order.

use clap::ValueEnum;

/// Which kinds of packages to show.
#[derive(Clone, Copy, PartialEq, Eq, Debug, ValueEnum, Default)]
pub enum AppFilter {
    /// Show every installed package
    #[default]
    All,

    /// Show only packages installed by the user
    User,

    /// Show only packages that are part of the system image
    System,
}

/// Criteria for hiding entries from the list.
#[derive(Clone, Debug)]
pub struct FilterOptions {
    pub kind: AppFilter,

    /// Hide apps whose data size is below this value (e.g. `"10MB"`)
    pub min_size: String,

    /// Glob patterns matched against package ids; matches are hidden
    pub exclude: Vec<String>,
}

impl Default for FilterOptions {
    fn default() -> Self {
        Self {
            kind: AppFilter::All,
            min_size: "0".to_string(),
            exclude: Vec::new(),
        }
    }
}

/// Sorting criteria for the app list.
///
/// - `Size`: largest first
/// - `Name`: alphabetical by display name, case-insensitive
/// - `Package`: alphabetical by package id
#[derive(Clone, Copy, PartialEq, Eq, Debug, ValueEnum, Default)]
pub enum SortCriteria {
    #[default]
    Size,
    Name,
    Package,
}

/// Configuration for list ordering.
#[derive(Clone, Debug, Default)]
pub struct SortOptions {
    pub criteria: SortCriteria,

    /// Whether to reverse the order
    pub reverse: bool,
}
