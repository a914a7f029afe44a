//! App list filtering and ordering.
//!
//! The builder always produces the complete inventory sorted by size. This
//! module narrows it down (by kind, minimum size and excluded package
//! patterns) and optionally re-orders it for display.

use std::cmp::Reverse;

use anyhow::{Context, Result};
use glob::Pattern;
use rayon::prelude::*;

use crate::config::{AppFilter, FilterOptions, SortCriteria, SortOptions};
use crate::inventory::{AppItem, AppKind};
use crate::utils::parse_size;

/// Filter apps by kind, minimum size and excluded package patterns.
///
/// The relative order of the remaining items is preserved.
///
/// # Errors
///
/// Returns an error if `filter_opts.min_size` is not a valid size or an
/// exclude pattern is not a valid glob.
///
/// # Examples
///
/// ```no_run
/// # use app_sizes::{filtering::filter_items, config::FilterOptions, inventory::AppItem};
/// # fn example(items: Vec<AppItem>) -> anyhow::Result<()> {
/// let filter_opts = FilterOptions {
///     min_size: "10MB".to_string(),
///     exclude: vec!["com.google.*".to_string()],
///     ..FilterOptions::default()
/// };
/// let visible = filter_items(items, &filter_opts)?;
/// # Ok(())
/// # }
/// ```
pub fn filter_items(items: Vec<AppItem>, filter_opts: &FilterOptions) -> Result<Vec<AppItem>> {
    let min_size = parse_size(&filter_opts.min_size)
        .with_context(|| format!("Invalid minimum size: {}", filter_opts.min_size))?;
    let excluded = compile_patterns(&filter_opts.exclude)?;
    let kind = filter_opts.kind;

    Ok(items
        .into_par_iter()
        .filter(|item| matches_kind(item, kind))
        .filter(|item| item.size_bytes() >= min_size)
        .filter(|item| !excluded.iter().any(|p| p.matches(item.package_id())))
        .collect())
}

fn compile_patterns(patterns: &[String]) -> Result<Vec<Pattern>> {
    patterns
        .iter()
        .map(|p| Pattern::new(p).with_context(|| format!("Invalid exclude pattern: {p}")))
        .collect()
}

const fn matches_kind(item: &AppItem, filter: AppFilter) -> bool {
    match filter {
        AppFilter::All => true,
        AppFilter::User => matches!(item.kind(), AppKind::User),
        AppFilter::System => matches!(item.kind(), AppKind::System),
    }
}

/// Sort apps in place.
///
/// - `Size`: largest first
/// - `Name`: display name, case-insensitive, A-Z
/// - `Package`: package id, A-Z
///
/// All orders are stable, so equal keys keep their current relative order.
/// Setting `sort_opts.reverse` flips the result.
pub fn sort_items(items: &mut [AppItem], sort_opts: &SortOptions) {
    match sort_opts.criteria {
        SortCriteria::Size => items.sort_by_key(|item| Reverse(item.size_bytes())),
        SortCriteria::Name => items.sort_by_cached_key(|item| item.name().to_lowercase()),
        SortCriteria::Package => items.sort_by(|a, b| a.package_id().cmp(b.package_id())),
    }

    if sort_opts.reverse {
        items.reverse();
    }
}
