//! The image store: the shared catalog of crawled files built during a run.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::types::FileKind;

/// Per-file metadata accumulated by the dispatch engine and event handlers.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FileRecord {
    pub kind: FileKind,
    /// Free-form attributes set by extensions (hash, size, tags, ...).
    pub attributes: BTreeMap<String, serde_json::Value>,
}

impl FileRecord {
    fn new(kind: FileKind) -> Self {
        FileRecord {
            kind,
            attributes: BTreeMap::new(),
        }
    }
}

/// Serializable snapshot of an [`Image`]. BTreeMaps keep the output a
/// deterministic function of the image contents.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ImageDocument {
    pub generator: String,
    pub created_unix: u64,
    pub entrypoints: Vec<PathBuf>,
    pub files: BTreeMap<PathBuf, FileRecord>,
}

/// The in-memory catalog being built. Created once per run, populated by the
/// dispatch workers, then handed to the serializer.
///
/// All mutation goes through `&self` methods behind an internal mutex, so any
/// number of workers (and the handlers running on them) may call in
/// concurrently without losing an insertion.
#[derive(Debug)]
pub struct Image {
    entrypoints: Vec<PathBuf>,
    created_unix: u64,
    files: Mutex<BTreeMap<PathBuf, FileRecord>>,
}

impl Image {
    pub fn new(entrypoints: &[PathBuf]) -> Self {
        let created_unix = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        Image {
            entrypoints: entrypoints.to_vec(),
            created_unix,
            files: Mutex::new(BTreeMap::new()),
        }
    }

    /// Register a path in the catalog. Idempotent: re-registering a path keeps
    /// the existing record, so the first registration wins for `kind` and any
    /// attributes already set are preserved. The catalog only grows.
    pub fn add_file(&self, path: &Path, kind: FileKind) {
        self.files
            .lock()
            .unwrap()
            .entry(path.to_path_buf())
            .or_insert_with(|| FileRecord::new(kind));
    }

    /// Attach an attribute to a registered path. A path that was never
    /// registered is added with kind `Other` rather than dropping the value;
    /// handlers normally run after `add_file` so this is a fallback only.
    pub fn set_attribute(&self, path: &Path, key: &str, value: serde_json::Value) {
        self.files
            .lock()
            .unwrap()
            .entry(path.to_path_buf())
            .or_insert_with(|| FileRecord::new(FileKind::Other))
            .attributes
            .insert(key.to_string(), value);
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.files.lock().unwrap().contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.files.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.lock().unwrap().is_empty()
    }

    /// Registered paths in sorted order.
    pub fn paths(&self) -> Vec<PathBuf> {
        self.files.lock().unwrap().keys().cloned().collect()
    }

    /// Look up a copy of one record.
    pub fn record(&self, path: &Path) -> Option<FileRecord> {
        self.files.lock().unwrap().get(path).cloned()
    }

    /// Copy the catalog out into a serializable document.
    pub fn snapshot(&self) -> ImageDocument {
        ImageDocument {
            generator: format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION")),
            created_unix: self.created_unix,
            entrypoints: self.entrypoints.clone(),
            files: self.files.lock().unwrap().clone(),
        }
    }
}
