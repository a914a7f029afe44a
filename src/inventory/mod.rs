//! Installed-app inventory.
//!
//! ## Main Parts
//!
//! - [`AppItem`] - one installed application with its data size
//! - [`Inventory`] - the ordered collection and its renderers
//! - [`InventoryBuilder`] - the enumerate, measure and sort pass
//! - [`BuildReport`] - the inventory plus any lookup failures

pub mod app_item;
pub mod builder;
#[allow(clippy::module_inception)]
pub mod inventory;

pub use app_item::{AppItem, AppKind, IconRef};
pub use builder::{BuildReport, InventoryBuilder, LookupFailure};
pub use inventory::{Inventory, icon_for_kind};
