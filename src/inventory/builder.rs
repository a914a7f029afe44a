//! Inventory construction.
//!
//! [`InventoryBuilder`] performs one pass over the package registry:
//!
//! 1. list every installed package (system packages included)
//! 2. resolve each package's metadata, in listing order
//! 3. measure each data directory, in parallel
//! 4. sort the result by size, largest first
//!
//! Metadata lookups run sequentially so that the abort policy stops at a
//! well-defined point. Size probes are independent and run on rayon's pool.

use std::{
    fmt,
    sync::atomic::{AtomicUsize, Ordering},
    time::Duration,
};

use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::{
    config::{InventoryOptions, LookupPolicy, SizeMode, SortOptions},
    filtering::sort_items,
    registry::{ApplicationMetadata, PackageDescriptor, PackageRegistry, RegistryError, SizeProbe},
};

use super::{AppItem, Inventory};

/// A package whose metadata could not be resolved.
#[derive(Debug)]
pub struct LookupFailure {
    pub package_id: String,
    pub error: RegistryError,
}

/// Outcome of one inventory pass.
#[derive(Debug)]
pub struct BuildReport {
    /// Every package that was resolved, sorted by size descending
    pub inventory: Inventory,

    /// Packages left out because their metadata lookup failed
    pub failures: Vec<LookupFailure>,

    /// `true` when the abort policy stopped enumeration early
    pub aborted: bool,

    /// Listed apps whose data directory could not be measured (shown as 0B)
    pub unmeasured: usize,
}

/// Builds a size-sorted [`Inventory`] from a registry and a size probe.
pub struct InventoryBuilder<'a> {
    registry: &'a dyn PackageRegistry,
    probe: &'a dyn SizeProbe,
    options: InventoryOptions,
    quiet: bool,
}

impl fmt::Debug for InventoryBuilder<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InventoryBuilder")
            .field("options", &self.options)
            .field("quiet", &self.quiet)
            .finish_non_exhaustive()
    }
}

impl<'a> InventoryBuilder<'a> {
    #[must_use]
    pub const fn new(
        registry: &'a dyn PackageRegistry,
        probe: &'a dyn SizeProbe,
        options: InventoryOptions,
    ) -> Self {
        Self {
            registry,
            probe,
            options,
            quiet: false,
        }
    }

    /// Enable or disable quiet mode (hides the progress spinner).
    ///
    /// Quiet mode is required for `--json` output so that only the final
    /// document reaches the terminal.
    #[must_use]
    pub const fn with_quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    /// Run one inventory pass.
    ///
    /// Lookup failures never fail the build: they are logged, recorded in
    /// [`BuildReport::failures`] and handled according to the configured
    /// [`LookupPolicy`]. Size probe failures count as a size of `0`.
    ///
    /// # Errors
    ///
    /// Returns an error only if the installed-packages listing itself
    /// cannot be obtained.
    pub fn build(&self) -> Result<BuildReport, RegistryError> {
        let progress = self.spinner();

        progress.set_message("Listing installed packages...");
        let descriptors = match self.registry.list_installed_packages() {
            Ok(descriptors) => descriptors,
            Err(e) => {
                progress.finish_and_clear();
                return Err(e);
            }
        };
        info!("registry listed {} packages", descriptors.len());

        let (resolved, failures, aborted) = self.resolve(descriptors, &progress);
        let (mut items, unmeasured) = self.measure(resolved, &progress);
        progress.finish_and_clear();

        if unmeasured > 0 && unmeasured == items.len() {
            warn!("No data directory could be measured; all {unmeasured} sizes show as 0B");
        } else if unmeasured > 0 {
            warn!("{unmeasured} data directories could not be measured and count as 0B");
        }

        sort_items(&mut items, &SortOptions::default());

        Ok(BuildReport {
            inventory: items.into(),
            failures,
            aborted,
            unmeasured,
        })
    }

    /// Resolve metadata for each descriptor, in order, applying the lookup policy.
    fn resolve(
        &self,
        descriptors: Vec<PackageDescriptor>,
        progress: &ProgressBar,
    ) -> (
        Vec<(PackageDescriptor, ApplicationMetadata)>,
        Vec<LookupFailure>,
        bool,
    ) {
        let total = descriptors.len();
        let mut resolved = Vec::with_capacity(total);
        let mut failures = Vec::new();

        for (index, descriptor) in descriptors.into_iter().enumerate() {
            progress.set_message(format!("Resolving packages... {}/{total}", index + 1));

            match self.registry.get_application_metadata(&descriptor.package_id) {
                Ok(metadata) => resolved.push((descriptor, metadata)),
                Err(error) => {
                    warn!("Metadata lookup failed for {}: {error}", descriptor.package_id);
                    failures.push(LookupFailure {
                        package_id: descriptor.package_id,
                        error,
                    });

                    if self.options.lookup_policy == LookupPolicy::Abort {
                        warn!(
                            "Aborting inventory after {} of {total} packages",
                            resolved.len()
                        );
                        return (resolved, failures, true);
                    }
                }
            }
        }

        (resolved, failures, false)
    }

    /// Measure every resolved package's data directory in parallel.
    ///
    /// The output keeps the input order. Also returns how many directories
    /// could not be measured.
    fn measure(
        &self,
        resolved: Vec<(PackageDescriptor, ApplicationMetadata)>,
        progress: &ProgressBar,
    ) -> (Vec<AppItem>, usize) {
        let probe = self.probe;
        let mode = self.options.size_mode;
        let total = resolved.len();
        let measured = AtomicUsize::new(0);
        let unmeasured = AtomicUsize::new(0);

        let items: Vec<AppItem> = resolved
            .into_par_iter()
            .map(|(descriptor, metadata)| {
                let size = probe_size(probe, &metadata.data_dir, mode).unwrap_or_else(|| {
                    unmeasured.fetch_add(1, Ordering::Relaxed);
                    0
                });

                let n = measured.fetch_add(1, Ordering::Relaxed) + 1;
                progress.set_message(format!("Measuring data directories... {n}/{total}"));

                AppItem::from_lookup(descriptor, metadata, size)
            })
            .collect();

        (items, unmeasured.into_inner())
    }

    fn spinner(&self) -> ProgressBar {
        if self.quiet {
            return ProgressBar::hidden();
        }

        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.enable_steady_tick(Duration::from_millis(100));
        pb
    }
}

/// Measure one path; `None` when it cannot be measured.
fn probe_size(probe: &dyn SizeProbe, path: &str, mode: SizeMode) -> Option<u64> {
    match probe.size_of(path, mode) {
        Ok(size) => {
            debug!("{path} - {size}");
            Some(size)
        }
        Err(e) => {
            debug!("Could not measure {path}: {e}");
            None
        }
    }
}
