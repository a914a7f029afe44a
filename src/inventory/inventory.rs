//! The ordered collection of apps produced by one inventory pass.
//!
//! [`Inventory`] owns its [`AppItem`]s. Everything that renders or selects
//! from it only borrows: the terminal list, the summary, the interactive
//! picker and the JSON output.

use anyhow::Result;
use colored::Colorize;
use inquire::{InquireError, Select};

use crate::utils::format_size;

use super::{AppItem, AppKind};

/// An ordered, read-only collection of installed apps.
#[derive(Debug, Default)]
pub struct Inventory(Vec<AppItem>);

impl From<Vec<AppItem>> for Inventory {
    fn from(items: Vec<AppItem>) -> Self {
        Self(items)
    }
}

impl<'a> IntoIterator for &'a Inventory {
    type Item = &'a AppItem;
    type IntoIter = std::slice::Iter<'a, AppItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl Inventory {
    #[must_use]
    pub const fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Borrow the items in their current order.
    #[must_use]
    pub fn as_slice(&self) -> &[AppItem] {
        &self.0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, AppItem> {
        self.0.iter()
    }

    /// Hand the items over, for filtering or re-sorting.
    #[must_use]
    pub fn into_vec(self) -> Vec<AppItem> {
        self.0
    }

    /// Sum of every item's data size, in bytes.
    #[must_use]
    pub fn get_total_size(&self) -> u64 {
        self.0.iter().map(AppItem::size_bytes).sum()
    }

    /// Print one row per app: icon, name, package id and size.
    ///
    /// The package column is left blank for apps whose name is their
    /// package id, and dropped entirely when that holds for every app.
    ///
    /// # Output Format
    ///
    /// ```text
    ///   📱 Maps                          org.example.maps             12.40 MB
    ///   ⚙️ com.android.phone                                          3.42 KB
    /// ```
    pub fn print_list(&self) {
        let name_width = self.column_width(AppItem::name);
        let package_width = self.column_width(|item| package_column(item).unwrap_or(""));

        for item in &self.0 {
            let package = package_column(item).unwrap_or("");
            let package_cell = if package_width == 0 {
                String::new()
            } else {
                format!("  {:<package_width$}", package.dimmed())
            };

            println!(
                "  {} {:<name_width$}{package_cell}  {:>10}",
                icon_for_kind(item.kind()),
                item.name().bold(),
                item.size_formatted().bright_white(),
            );
        }
    }

    fn column_width(&self, field: impl Fn(&AppItem) -> &str) -> usize {
        self.0
            .iter()
            .map(|item| field(item).chars().count())
            .max()
            .unwrap_or(0)
    }

    /// Print per-kind counts and sizes followed by the total.
    ///
    /// # Output Format
    ///
    /// ```text
    ///   📱 42 user apps (1.20 GB)
    ///   ⚙️ 180 system apps (310.55 MB)
    ///   💾 Total data size: 1.50 GB
    /// ```
    pub fn print_summary(&self) {
        let kinds: &[(AppKind, &str)] = &[(AppKind::User, "user"), (AppKind::System, "system")];

        for (kind, label) in kinds {
            let (count, size) = self.0.iter().fold((0usize, 0u64), |(c, s), item| {
                if item.kind() == *kind {
                    (c + 1, s + item.size_bytes())
                } else {
                    (c, s)
                }
            });

            if count > 0 {
                println!(
                    "  {} {} {label} apps ({})",
                    icon_for_kind(*kind),
                    count.to_string().bright_white(),
                    format_size(size).bright_white()
                );
            }
        }

        println!(
            "  💾 Total data size: {}",
            format_size(self.get_total_size()).bright_green().bold()
        );
    }

    /// Let the user pick one app from the list.
    ///
    /// Returns `Ok(None)` when the inventory is empty or the prompt is
    /// cancelled (Esc / Ctrl-C).
    ///
    /// # Errors
    ///
    /// Fails if the terminal is not interactive.
    pub fn interactive_selection(&self) -> Result<Option<&AppItem>> {
        if self.0.is_empty() {
            return Ok(None);
        }

        let options: Vec<String> = self.0.iter().map(selection_label).collect();
        let choice = match Select::new("Open app details for:", options)
            .with_page_size(15)
            .raw_prompt()
        {
            Ok(choice) => choice,
            Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => {
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };

        Ok(self.0.get(choice.index))
    }
}

/// The package id to show next to the name, unless it would repeat it.
fn package_column(item: &AppItem) -> Option<&str> {
    (item.name() != item.package_id()).then_some(item.package_id())
}

fn selection_label(item: &AppItem) -> String {
    format!("{} {item}", icon_for_kind(item.kind()))
}

/// Glyph drawn in place of the app icon.
#[must_use]
pub const fn icon_for_kind(kind: AppKind) -> &'static str {
    match kind {
        AppKind::User => "📱",
        AppKind::System => "⚙️",
    }
}
