//! Fsimager: crawl directory trees and build a structured image of every
//! reachable file, with an event-hook extension model for per-file enrichment

pub mod context;
pub mod engine;
pub mod error;
pub mod events;
pub mod extensions;
pub mod image;
pub mod pipeline;
pub mod serializer;
pub mod types;
pub mod utils;

/// Re-export types for API
pub use types::*;

use log::debug;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::AtomicUsize;

use crate::context::FsContext;
use crate::events::{EndArgs, EventRegistry, StartArgs};
use crate::image::Image;
use crate::pipeline::dispatch::DispatchShared;
use crate::pipeline::orchestrator::{RunReport, run_dispatch, validate_entrypoints};

/// Result alias used by the public fsimager API
pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, Error>;

/// Single lib entry point: image `entrypoints` with `opts` under `fs`, firing
/// the events in `registry`, and return the image plus the run counts.
///
/// Runs validate → `on_start` → crawl + dispatch to drain → `on_end`. Unlike
/// the CLI path ([`pipeline::orchestrator::run`]) nothing is serialized, so
/// `on_end` fires right after the pool drains. The registry is frozen for the
/// duration of the run; populate it (built-ins, [`extensions`]) before
/// calling.
pub fn image_dirs(
    entrypoints: &[PathBuf],
    opts: &ImageOpts,
    registry: EventRegistry,
    fs: Arc<dyn FsContext>,
) -> Result<(Arc<Image>, RunReport)> {
    let config_str = format!(
        "{} CONFIG:{:#?}",
        env!("CARGO_PKG_NAME").to_string().to_uppercase(),
        opts
    );
    debug!("{}", config_str);

    let entrypoints = validate_entrypoints(entrypoints, fs.as_ref())?;
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
    let report = run_dispatch(&entrypoints, opts, shared)?;

    registry.invoke_on_end(&EndArgs { image: &image });
    Ok((image, report))
}
