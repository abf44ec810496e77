//! Filesystem access abstraction used by validation and the dispatch engine.
//!
//! Exactly one context is chosen per run and passed explicitly through the
//! pipeline. [`LocalFs`] covers the local operating environment; a remote
//! transport would implement the same trait behind a connect-on-enter,
//! disconnect-on-drop wrapper.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::error::FsError;

/// The two capabilities the core needs from a filesystem.
///
/// Streams returned by `open_for_read` are closed when dropped, so the open
/// window in the dispatch engine is scoped on every exit path.
pub trait FsContext: Send + Sync {
    fn is_directory(&self, path: &Path) -> bool;

    fn open_for_read(&self, path: &Path) -> Result<Box<dyn Read + Send>, FsError>;
}

/// Local filesystem context backed by `std::fs`.
#[derive(Clone, Copy, Debug, Default)]
pub struct LocalFs;

impl FsContext for LocalFs {
    fn is_directory(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn open_for_read(&self, path: &Path) -> Result<Box<dyn Read + Send>, FsError> {
        File::open(path)
            .map(|f| Box::new(f) as Box<dyn Read + Send>)
            .map_err(|source| FsError::Open {
                path: path.to_path_buf(),
                source,
            })
    }
}
