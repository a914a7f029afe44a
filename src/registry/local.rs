//! Size probe for paths on the local filesystem.

use std::{fs, path::Path};

use crate::{config::SizeMode, utils::calculate_dir_size};

use super::{RegistryError, SizeProbe};

/// Measures paths with `std::fs` on the machine the tool runs on.
///
/// `Entry` mode reports the length attribute of the path itself, which for
/// a directory is the size of the directory entry and not of its contents.
#[derive(Clone, Copy, Debug, Default)]
pub struct LocalSizeProbe;

impl SizeProbe for LocalSizeProbe {
    fn size_of(&self, path: &str, mode: SizeMode) -> Result<u64, RegistryError> {
        let path = Path::new(path);
        let metadata = fs::metadata(path)?;

        Ok(match mode {
            SizeMode::Entry => metadata.len(),
            SizeMode::Recursive if metadata.is_dir() => calculate_dir_size(path),
            SizeMode::Recursive => metadata.len(),
        })
    }
}
