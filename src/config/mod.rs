//! Configuration types for building, filtering and displaying the inventory.
//!
//! Option structs are assembled by the CLI from command-line arguments
//! layered over the [`FileConfig`] loaded from disk.

pub mod file;
pub mod filter;
pub mod inventory;

pub use file::FileConfig;
pub use filter::{AppFilter, FilterOptions, SortCriteria, SortOptions};
pub use inventory::{DeviceOptions, InventoryOptions, LookupPolicy, SizeMode};
