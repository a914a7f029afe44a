//! Utility functions and helpers.
//!
//! This module contains the size helpers used throughout the application:
//! the human-readable formatter shown next to every app, the parser used for
//! size thresholds, and recursive directory measurement.

pub mod size;

pub use size::{calculate_dir_size, format_size, parse_size};
