//! Typed errors for run-level failures and per-file open failures.
//!
//! Orchestration otherwise uses [`anyhow`]; these exist so the CLI handler
//! can match on the failure kind and pick an exit code, and so the dispatch
//! engine gets an explicit result for the open step instead of a bare io
//! error.

use std::path::PathBuf;
use thiserror::Error;

/// Fatal errors that terminate a whole run.
#[derive(Debug, Error)]
pub enum ImagerError {
    /// None of the configured entrypoints is a directory.
    #[error("no valid entrypoints found")]
    NoValidEntrypoints,

    /// A remote connection string was given but no remote transport is
    /// compiled into this build.
    #[error("remote transport support is not available")]
    RemoteUnavailable,
}

/// Per-file failure from a [`FsContext`](crate::context::FsContext) open.
#[derive(Debug, Error)]
pub enum FsError {
    #[error("could not open '{path}': {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
