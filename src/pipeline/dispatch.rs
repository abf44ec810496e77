//! Dispatch workers: consume descriptors and run the per-file protocol.
//!
//! Per descriptor, in order: count it, register it in the image, fire
//! `pre_open`, and for non-directories with at least one `with_open` handler,
//! open the file, fire `with_open`, close the stream, fire `post_close`.
//! There is no ordering across files, and a file that fails to open (or whose
//! `with_open` handler errors) is logged and skipped past, never retried and
//! never allowed to take the run down with it.

use crossbeam_channel::Receiver;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread::{self, JoinHandle};

use crate::context::FsContext;
use crate::events::{EventRegistry, PostCloseArgs, PreOpenArgs, WithOpenArgs};
use crate::image::Image;
use crate::types::FileDescriptor;

/// State shared by every dispatch worker. The image and the processed counter
/// are the only pieces mutated concurrently; the registry and context are
/// read-only for the whole run.
#[derive(Clone)]
pub struct DispatchShared {
    pub image: Arc<Image>,
    pub registry: Arc<EventRegistry>,
    pub fs: Arc<dyn FsContext>,
    pub processed: Arc<AtomicUsize>,
}

fn dispatch_worker_loop(desc_rx: Receiver<FileDescriptor>, shared: DispatchShared) {
    while let Ok(desc) = desc_rx.recv() {
        process_descriptor(&shared, &desc);
    }
}

/// Spawn `num_threads` long-lived workers sharing `desc_rx`. They exit when
/// the crawl thread drops its sender and the channel drains.
pub fn spawn_dispatch_workers(
    desc_rx: Receiver<FileDescriptor>,
    shared: &DispatchShared,
    num_threads: usize,
) -> Vec<JoinHandle<()>> {
    (0..num_threads)
        .map(|_| {
            let desc_rx = desc_rx.clone();
            let shared = shared.clone();
            thread::spawn(move || dispatch_worker_loop(desc_rx, shared))
        })
        .collect()
}

/// Run the per-file protocol for one descriptor.
pub fn process_descriptor(shared: &DispatchShared, desc: &FileDescriptor) {
    shared.processed.fetch_add(1, Ordering::Relaxed);
    shared.image.add_file(&desc.path, desc.kind);

    shared.registry.invoke_pre_open(&PreOpenArgs {
        image: &shared.image,
        file_path: &desc.path,
        file_type: desc.kind,
        fs: shared.fs.as_ref(),
    });

    if desc.kind.is_directory() || !shared.registry.has_with_open() {
        return;
    }

    match shared.fs.open_for_read(&desc.path) {
        Ok(mut fd) => {
            let result = shared.registry.invoke_with_open(&mut WithOpenArgs {
                image: &shared.image,
                file_path: &desc.path,
                file_type: desc.kind,
                fd: fd.as_mut(),
            });
            drop(fd);
            match result {
                Ok(()) => shared.registry.invoke_post_close(&PostCloseArgs {
                    image: &shared.image,
                    file_path: &desc.path,
                    file_type: desc.kind,
                    fs: shared.fs.as_ref(),
                }),
                Err(err) => {
                    log::info!("{}. File '{}' could not be read.", err, desc.path.display());
                }
            }
        }
        Err(err) => {
            log::info!("{}. File '{}' could not be opened.", err, desc.path.display());
        }
    }
}
