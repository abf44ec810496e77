//! Public and internal types for the fsimager API and pipeline.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// What kind of filesystem node a crawled entry is.
///
/// Converted from [`std::fs::FileType`]; anything that is neither a regular
/// file, a directory, nor a symlink (sockets, fifos, devices) maps to `Other`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    Regular,
    Directory,
    Symlink,
    Other,
}

impl FileKind {
    pub fn is_directory(self) -> bool {
        matches!(self, FileKind::Directory)
    }
}

impl From<std::fs::FileType> for FileKind {
    fn from(ft: std::fs::FileType) -> Self {
        if ft.is_symlink() {
            FileKind::Symlink
        } else if ft.is_dir() {
            FileKind::Directory
        } else if ft.is_file() {
            FileKind::Regular
        } else {
            FileKind::Other
        }
    }
}

/// One crawled filesystem entry: the path and what kind of node it is.
///
/// Produced once per entry by the crawl thread and consumed exactly once by a
/// dispatch worker.
#[derive(Clone, Debug)]
pub struct FileDescriptor {
    pub path: PathBuf,
    pub kind: FileKind,
}

/// Options for an imaging run.
#[derive(Clone, Debug)]
pub struct ImageOpts {
    /// Number of dispatch workers. 1 means fully sequential.
    pub threads: usize,
    /// Skip crawling anything under these directories.
    pub excluded_dirs: Vec<PathBuf>,
}

impl Default for ImageOpts {
    fn default() -> Self {
        ImageOpts {
            threads: 1,
            excluded_dirs: Vec::new(),
        }
    }
}
