//! Run orchestration: entrypoint validation, pool lifecycle, sequencing.

use anyhow::Result;
use log::debug;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::context::FsContext;
use crate::error::ImagerError;
use crate::events::{EndArgs, EventRegistry, StartArgs};
use crate::extensions::load_extension_list;
use crate::image::Image;
use crate::serializer::{ImageSerializer, JsonSerializer};
use crate::types::ImageOpts;

use super::context::create_dispatch_channels;
use super::dispatch::{DispatchShared, spawn_dispatch_workers};
use super::walk::spawn_crawl_thread;

/// Everything a full CLI-style run needs.
pub struct RunConfig {
    pub entrypoints: Vec<PathBuf>,
    pub image_file: PathBuf,
    pub extensions: Vec<String>,
    pub opts: ImageOpts,
}

/// Counts reported once the pool has drained.
#[derive(Clone, Copy, Debug)]
pub struct RunReport {
    /// Descriptors dispatched through the per-file protocol.
    pub processed: usize,
    /// Descriptors yielded by the crawl. Equal to `processed` when the run
    /// completed normally.
    pub crawled: usize,
}

/// Check each entrypoint against the context and keep the directories.
/// Invalid entrypoints are logged and excluded; an empty result is the one
/// fatal configuration error that aborts the whole run before any dispatch.
pub fn validate_entrypoints(entrypoints: &[PathBuf], fs: &dyn FsContext) -> Result<Vec<PathBuf>> {
    let mut valid = Vec::new();
    for entrypoint in entrypoints {
        if fs.is_directory(entrypoint) {
            valid.push(entrypoint.clone());
        } else {
            log::error!("Entrypoint '{}' is not a directory", entrypoint.display());
        }
    }
    if valid.is_empty() {
        return Err(ImagerError::NoValidEntrypoints.into());
    }
    Ok(valid)
}

/// Run the crawl thread and the worker pool to exhaustion.
///
/// Returns only after the crawl thread and every worker have been joined, so
/// the image is final when this returns. That join is the drain barrier: no
/// caller may hand the image to the serializer before it.
pub fn run_dispatch(
    entrypoints: &[PathBuf],
    opts: &ImageOpts,
    shared: DispatchShared,
) -> Result<RunReport> {
    let channels = create_dispatch_channels(entrypoints, opts);

    let crawl_handle = spawn_crawl_thread(channels.desc_tx, channels.crawl_ctx);
    let worker_handles = spawn_dispatch_workers(channels.desc_rx, &shared, opts.threads.max(1));

    let crawled = crawl_handle
        .join()
        .map_err(|_| anyhow::anyhow!("crawl thread panicked"))?;
    for handle in worker_handles {
        handle
            .join()
            .map_err(|_| anyhow::anyhow!("dispatch worker panicked"))?;
    }

    let processed = shared.processed.load(Ordering::Relaxed);
    debug!(
        "pool drained: {} crawled, {} processed",
        crawled, processed
    );

    Ok(RunReport { processed, crawled })
}

/// Full run sequence: validate entrypoints, load extensions, `on_start`,
/// crawl + dispatch to drain, report the processed count, serialize, then
/// `on_end` exactly once. Returns the path the serializer wrote.
pub fn run(config: &RunConfig, fs: Arc<dyn FsContext>) -> Result<PathBuf> {
    let entrypoints = validate_entrypoints(&config.entrypoints, fs.as_ref())?;

    let mut registry = EventRegistry::new();
    load_extension_list(&config.extensions, &mut registry);
    let registry = Arc::new(registry);

    let image = Arc::new(Image::new(&entrypoints));
    registry.invoke_on_start(&StartArgs {
        image: &image,
        entrypoints: &entrypoints,
    });

    let shared = DispatchShared {
        image: Arc::clone(&image),
        registry: Arc::clone(&registry),
        fs,
        processed: Arc::new(AtomicUsize::new(0)),
    };
    let report = run_dispatch(&entrypoints, &config.opts, shared)?;

    log::info!("Processed {} files", report.processed);
    log::info!("Image generated");

    let written = JsonSerializer.write(&image, &config.image_file)?;
    log::info!("Stored image to '{}'", written.display());

    registry.invoke_on_end(&EndArgs { image: &image });
    Ok(written)
}
