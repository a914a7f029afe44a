//! # app-sizes
//!
//! List the apps installed on an Android device sorted by how much data
//! they store, and open an app's system details screen from the list.
//!
//! ## Main Parts
//!
//! - [`registry`] - package enumeration, metadata lookup and size probes (`adb`, local)
//! - [`inventory`] - the size-sorted app list and how it is built
//! - [`filtering`] - narrowing and re-ordering the list for display
//! - [`navigator`] - opening the application-details screen for a package
//! - [`output`] - JSON output for scripting
//! - [`config`] - option types and the config file
//! - [`utils`] - size formatting, parsing and measurement

pub mod config;
pub mod filtering;
pub mod inventory;
pub mod navigator;
pub mod output;
pub mod registry;
pub mod utils;
