//! Path and filter utilities

use std::path::{Path, PathBuf};

/// Returns true if `path` is one of the excluded directories or sits anywhere
/// under one. Comparison is by path prefix, on the paths as configured.
pub fn is_under_excluded(path: &Path, excluded_dirs: &[PathBuf]) -> bool {
    excluded_dirs.iter().any(|dir| path.starts_with(dir))
}
