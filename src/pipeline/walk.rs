//! Crawl thread: walks each entrypoint and feeds descriptors to the workers.
//!
//! The walk is serial and lazy; the dispatch pool provides the concurrency.
//! Paths under an excluded directory are pruned as whole subtrees. Walk
//! errors (unreadable directories and the like) are logged and skipped; they
//! never abort the run.

use crossbeam_channel::Sender;
use std::thread::{self, JoinHandle};
use walkdir::WalkDir;

use crate::engine::tools::is_under_excluded;
use crate::types::{FileDescriptor, FileKind};

use super::context::CrawlContext;

/// Convert a walkdir entry into a [`FileDescriptor`].
pub fn to_descriptor(entry: walkdir::DirEntry) -> FileDescriptor {
    FileDescriptor {
        kind: FileKind::from(entry.file_type()),
        path: entry.into_path(),
    }
}

pub fn spawn_crawl_thread(desc_tx: Sender<FileDescriptor>, ctx: CrawlContext) -> JoinHandle<usize> {
    thread::spawn(move || run_crawl_loop(desc_tx, &ctx))
}

/// Walk every entrypoint in order, sending each included entry on `desc_tx`.
/// Drops the sender when done so the workers see the channel close. Returns
/// the number of descriptors yielded.
pub fn run_crawl_loop(desc_tx: Sender<FileDescriptor>, ctx: &CrawlContext) -> usize {
    let mut count = 0_usize;
    'crawl: for root in &ctx.entrypoints {
        let excluded = &ctx.excluded_dirs;
        let iter = WalkDir::new(root)
            .follow_links(false)
            .into_iter()
            .filter_entry(|e| !is_under_excluded(e.path(), excluded));
        for entry_result in iter {
            match entry_result {
                Ok(entry) => {
                    if desc_tx.send(to_descriptor(entry)).is_err() {
                        // Receivers are gone; nothing left to feed.
                        break 'crawl;
                    }
                    count += 1;
                }
                Err(err) => {
                    log::warn!("Could not access path during crawl: {}", err);
                }
            }
        }
    }
    drop(desc_tx);
    count
}
