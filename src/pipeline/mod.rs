//! Pipeline components: crawl thread, dispatch workers, run orchestration.

pub mod context;
pub mod dispatch;
pub mod orchestrator;
pub mod walk;

pub use context::{CrawlContext, DispatchChannels, create_dispatch_channels};
pub use dispatch::{DispatchShared, process_descriptor, spawn_dispatch_workers};
pub use orchestrator::{RunConfig, RunReport, run, run_dispatch, validate_entrypoints};
pub use walk::{run_crawl_loop, spawn_crawl_thread, to_descriptor};

/// Descriptor channel capacity. Large enough that the crawl rarely blocks on
/// send for typical trees; bounded so a slow worker pool still backpressures
/// the walk instead of buffering an unbounded descriptor list.
pub const DISPATCH_CHANNEL_CAP: usize = 50_000;
