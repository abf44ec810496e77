//! Channel construction and the context handed to the crawl thread.

use crossbeam_channel::{Receiver, Sender, bounded};
use std::path::PathBuf;

use crate::types::{FileDescriptor, ImageOpts};

use super::DISPATCH_CHANNEL_CAP;

/// Everything the crawl thread needs: where to start and what to prune.
pub struct CrawlContext {
    pub entrypoints: Vec<PathBuf>,
    pub excluded_dirs: Vec<PathBuf>,
}

/// Channels for one run. The crawl thread takes `desc_tx` and drops it when
/// the walk finishes, which closes the channel and lets the workers exit.
pub struct DispatchChannels {
    pub desc_tx: Sender<FileDescriptor>,
    pub desc_rx: Receiver<FileDescriptor>,
    pub crawl_ctx: CrawlContext,
}

pub fn create_dispatch_channels(entrypoints: &[PathBuf], opts: &ImageOpts) -> DispatchChannels {
    let (desc_tx, desc_rx) = bounded::<FileDescriptor>(DISPATCH_CHANNEL_CAP);

    let crawl_ctx = CrawlContext {
        entrypoints: entrypoints.to_vec(),
        excluded_dirs: opts.excluded_dirs.clone(),
    };

    DispatchChannels {
        desc_tx,
        desc_rx,
        crawl_ctx,
    }
}
