//! Typed event registry: the extension points of the per-file protocol.
//!
//! Five events exist: `on_start`, `pre_open`, `with_open`, `post_close`,
//! `on_end`. Each has a fixed argument struct, so a handler can only be
//! registered against an event that exists and always receives the shape that
//! event declares. Handlers for one event run synchronously in registration
//! order on the invoking thread; invoking an event with no handlers is a
//! no-op.
//!
//! The registry is populated before any descriptor is dispatched (built-ins
//! plus `--load-extensions`) and then frozen behind an `Arc` for the rest of
//! the run.

use std::io::Read;
use std::path::{Path, PathBuf};

use crate::context::FsContext;
use crate::image::Image;
use crate::types::FileKind;

/// Arguments for `on_start`, fired once before crawling begins.
pub struct StartArgs<'a> {
    pub image: &'a Image,
    pub entrypoints: &'a [PathBuf],
}

/// Arguments for `pre_open`, fired for every descriptor regardless of kind.
pub struct PreOpenArgs<'a> {
    pub image: &'a Image,
    pub file_path: &'a Path,
    pub file_type: FileKind,
    pub fs: &'a dyn FsContext,
}

/// Arguments for `with_open`, fired while the file's read stream is open.
///
/// All handlers share the one stream; a handler sees it positioned wherever
/// the previous handler left it.
pub struct WithOpenArgs<'a> {
    pub image: &'a Image,
    pub file_path: &'a Path,
    pub file_type: FileKind,
    pub fd: &'a mut (dyn Read + Send),
}

/// Arguments for `post_close`, fired after the stream has been closed.
pub struct PostCloseArgs<'a> {
    pub image: &'a Image,
    pub file_path: &'a Path,
    pub file_type: FileKind,
    pub fs: &'a dyn FsContext,
}

/// Arguments for `on_end`, fired once after the run completes.
pub struct EndArgs<'a> {
    pub image: &'a Image,
}

type StartHandler = Box<dyn Fn(&StartArgs) + Send + Sync>;
type PreOpenHandler = Box<dyn Fn(&PreOpenArgs) + Send + Sync>;
type WithOpenHandler = Box<dyn Fn(&mut WithOpenArgs) -> crate::Result<()> + Send + Sync>;
type PostCloseHandler = Box<dyn Fn(&PostCloseArgs) + Send + Sync>;
type EndHandler = Box<dyn Fn(&EndArgs) + Send + Sync>;

/// One ordered handler list per declared event. There is exactly one registry
/// per run.
///
/// `with_open` handlers are fallible because they drive I/O on the open
/// stream; a handler error there is a per-file failure, caught by the
/// dispatch engine. The other events' handlers are infallible.
#[derive(Default)]
pub struct EventRegistry {
    on_start: Vec<StartHandler>,
    pre_open: Vec<PreOpenHandler>,
    with_open: Vec<WithOpenHandler>,
    post_close: Vec<PostCloseHandler>,
    on_end: Vec<EndHandler>,
}

impl EventRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_on_start(&mut self, handler: impl Fn(&StartArgs) + Send + Sync + 'static) {
        self.on_start.push(Box::new(handler));
    }

    pub fn register_pre_open(&mut self, handler: impl Fn(&PreOpenArgs) + Send + Sync + 'static) {
        self.pre_open.push(Box::new(handler));
    }

    pub fn register_with_open(
        &mut self,
        handler: impl Fn(&mut WithOpenArgs) -> crate::Result<()> + Send + Sync + 'static,
    ) {
        self.with_open.push(Box::new(handler));
    }

    pub fn register_post_close(&mut self, handler: impl Fn(&PostCloseArgs) + Send + Sync + 'static) {
        self.post_close.push(Box::new(handler));
    }

    pub fn register_on_end(&mut self, handler: impl Fn(&EndArgs) + Send + Sync + 'static) {
        self.on_end.push(Box::new(handler));
    }

    pub fn invoke_on_start(&self, args: &StartArgs) {
        for handler in &self.on_start {
            handler(args);
        }
    }

    pub fn invoke_pre_open(&self, args: &PreOpenArgs) {
        for handler in &self.pre_open {
            handler(args);
        }
    }

    /// Run all `with_open` handlers against the open stream. Stops at the
    /// first handler error and returns it; the caller treats that the same as
    /// a failed open.
    pub fn invoke_with_open(&self, args: &mut WithOpenArgs) -> crate::Result<()> {
        for handler in &self.with_open {
            handler(args)?;
        }
        Ok(())
    }

    pub fn invoke_post_close(&self, args: &PostCloseArgs) {
        for handler in &self.post_close {
            handler(args);
        }
    }

    pub fn invoke_on_end(&self, args: &EndArgs) {
        for handler in &self.on_end {
            handler(args);
        }
    }

    /// Whether any `with_open` handler is registered. The dispatch engine
    /// never opens a file when this is false.
    pub fn has_with_open(&self) -> bool {
        !self.with_open.is_empty()
    }

    pub fn is_empty(&self) -> bool {
        self.on_start.is_empty()
            && self.pre_open.is_empty()
            && self.with_open.is_empty()
            && self.post_close.is_empty()
            && self.on_end.is_empty()
    }
}
