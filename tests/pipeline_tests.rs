use fsimager::context::{FsContext, LocalFs};
use fsimager::error::{FsError, ImagerError};
use fsimager::events::EventRegistry;
use fsimager::extensions::load_extension_list;
use fsimager::image_dirs;
use fsimager::pipeline::validate_entrypoints;
use fsimager::types::ImageOpts;
use std::collections::BTreeSet;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

/// Temp tree with 5 descriptors: the root, `sub`, and three regular files.
fn build_tree() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir(dir.path().join("sub")).unwrap();
    std::fs::write(dir.path().join("a.txt"), b"alpha").unwrap();
    std::fs::write(dir.path().join("b.txt"), b"beta").unwrap();
    std::fs::write(dir.path().join("sub").join("c.txt"), b"gamma").unwrap();
    dir
}

fn opts_with_threads(threads: usize) -> ImageOpts {
    ImageOpts {
        threads,
        ..Default::default()
    }
}

type PathLog = Arc<Mutex<Vec<PathBuf>>>;

fn path_log() -> PathLog {
    Arc::new(Mutex::new(Vec::new()))
}

/// Context that counts every open it serves, delegating to the local fs.
struct CountingFs {
    opens: Arc<AtomicUsize>,
}

impl FsContext for CountingFs {
    fn is_directory(&self, path: &Path) -> bool {
        LocalFs.is_directory(path)
    }

    fn open_for_read(&self, path: &Path) -> Result<Box<dyn Read + Send>, FsError> {
        self.opens.fetch_add(1, Ordering::SeqCst);
        LocalFs.open_for_read(path)
    }
}

/// Context that refuses to open any path whose file name starts with `secret`.
struct FailingFs;

impl FsContext for FailingFs {
    fn is_directory(&self, path: &Path) -> bool {
        LocalFs.is_directory(path)
    }

    fn open_for_read(&self, path: &Path) -> Result<Box<dyn Read + Send>, FsError> {
        let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
        if name.starts_with("secret") {
            return Err(FsError::Open {
                path: path.to_path_buf(),
                source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
            });
        }
        LocalFs.open_for_read(path)
    }
}

// --- counter and membership across thread counts ---

#[test]
fn test_processed_count_matches_crawled_for_all_thread_counts() {
    let tree = build_tree();
    let entrypoints = vec![tree.path().to_path_buf()];

    let mut memberships: Vec<BTreeSet<PathBuf>> = Vec::new();
    for threads in [1, 2, 8, 64] {
        let (image, report) = image_dirs(
            &entrypoints,
            &opts_with_threads(threads),
            EventRegistry::new(),
            Arc::new(LocalFs),
        )
        .unwrap();

        assert_eq!(report.processed, report.crawled, "threads={threads}");
        assert_eq!(report.crawled, 5, "threads={threads}");
        assert_eq!(image.len(), 5, "threads={threads}");
        memberships.push(image.paths().into_iter().collect());
    }

    for membership in &memberships[1..] {
        assert_eq!(membership, &memberships[0]);
    }
}

// --- hook cardinality ---

#[test]
fn test_pre_open_fires_once_per_descriptor_including_directories() {
    let tree = build_tree();
    let entrypoints = vec![tree.path().to_path_buf()];

    let seen = path_log();
    let log = Arc::clone(&seen);
    let mut registry = EventRegistry::new();
    registry.register_pre_open(move |args| {
        log.lock().unwrap().push(args.file_path.to_path_buf());
    });

    let (_image, report) = image_dirs(
        &entrypoints,
        &opts_with_threads(4),
        registry,
        Arc::new(LocalFs),
    )
    .unwrap();

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), report.crawled);
    assert!(seen.contains(&tree.path().to_path_buf()));
    assert!(seen.contains(&tree.path().join("sub")));
    // Exactly once each
    let unique: BTreeSet<_> = seen.iter().cloned().collect();
    assert_eq!(unique.len(), seen.len());
}

#[test]
fn test_with_open_and_post_close_fire_once_per_opened_file() {
    let tree = build_tree();
    let entrypoints = vec![tree.path().to_path_buf()];

    let opened = path_log();
    let closed = path_log();
    let opened_log = Arc::clone(&opened);
    let closed_log = Arc::clone(&closed);
    let mut registry = EventRegistry::new();
    registry.register_with_open(move |args| {
        opened_log.lock().unwrap().push(args.file_path.to_path_buf());
        Ok(())
    });
    registry.register_post_close(move |args| {
        closed_log.lock().unwrap().push(args.file_path.to_path_buf());
    });

    image_dirs(
        &entrypoints,
        &opts_with_threads(2),
        registry,
        Arc::new(LocalFs),
    )
    .unwrap();

    let opened: BTreeSet<_> = opened.lock().unwrap().iter().cloned().collect();
    let closed: BTreeSet<_> = closed.lock().unwrap().iter().cloned().collect();
    let expected: BTreeSet<_> = [
        tree.path().join("a.txt"),
        tree.path().join("b.txt"),
        tree.path().join("sub").join("c.txt"),
    ]
    .into_iter()
    .collect();
    assert_eq!(opened, expected);
    assert_eq!(closed, expected);
}

#[test]
fn test_no_file_is_opened_without_with_open_handlers() {
    let tree = build_tree();
    let entrypoints = vec![tree.path().to_path_buf()];

    let opens = Arc::new(AtomicUsize::new(0));
    let mut registry = EventRegistry::new();
    registry.register_pre_open(|_| {});

    image_dirs(
        &entrypoints,
        &opts_with_threads(2),
        registry,
        Arc::new(CountingFs {
            opens: Arc::clone(&opens),
        }),
    )
    .unwrap();

    assert_eq!(opens.load(Ordering::SeqCst), 0);
}

// --- per-file failure isolation ---

#[test]
fn test_open_failure_registers_path_but_skips_post_close() {
    let tree = tempfile::tempdir().unwrap();
    std::fs::write(tree.path().join("secret.txt"), b"hidden").unwrap();
    std::fs::write(tree.path().join("public.txt"), b"visible").unwrap();
    let entrypoints = vec![tree.path().to_path_buf()];

    let closed = path_log();
    let closed_log = Arc::clone(&closed);
    let mut registry = EventRegistry::new();
    registry.register_with_open(|_| Ok(()));
    registry.register_post_close(move |args| {
        closed_log.lock().unwrap().push(args.file_path.to_path_buf());
    });

    let (image, report) = image_dirs(
        &entrypoints,
        &opts_with_threads(2),
        registry,
        Arc::new(FailingFs),
    )
    .unwrap();

    // The failed file still counts and still lands in the image.
    assert_eq!(report.processed, report.crawled);
    assert!(image.contains(&tree.path().join("secret.txt")));
    assert!(image.contains(&tree.path().join("public.txt")));

    let closed = closed.lock().unwrap();
    assert_eq!(*closed, vec![tree.path().join("public.txt")]);
}

#[test]
fn test_with_open_handler_error_skips_post_close_for_that_file_only() {
    let tree = tempfile::tempdir().unwrap();
    std::fs::write(tree.path().join("bad.txt"), b"x").unwrap();
    std::fs::write(tree.path().join("good.txt"), b"y").unwrap();
    let entrypoints = vec![tree.path().to_path_buf()];

    let closed = path_log();
    let closed_log = Arc::clone(&closed);
    let mut registry = EventRegistry::new();
    registry.register_with_open(|args| {
        if args.file_path.file_name().and_then(|n| n.to_str()) == Some("bad.txt") {
            anyhow::bail!("handler rejected file");
        }
        Ok(())
    });
    registry.register_post_close(move |args| {
        closed_log.lock().unwrap().push(args.file_path.to_path_buf());
    });

    let (image, report) = image_dirs(
        &entrypoints,
        &opts_with_threads(2),
        registry,
        Arc::new(LocalFs),
    )
    .unwrap();

    assert_eq!(report.processed, report.crawled);
    assert!(image.contains(&tree.path().join("bad.txt")));
    let closed = closed.lock().unwrap();
    assert_eq!(*closed, vec![tree.path().join("good.txt")]);
}

// --- entrypoint validation ---

#[test]
fn test_run_aborts_when_no_entrypoint_is_a_directory() {
    let tree = tempfile::tempdir().unwrap();
    let file = tree.path().join("not-a-dir.txt");
    std::fs::write(&file, b"x").unwrap();

    let err = image_dirs(
        &[file],
        &opts_with_threads(1),
        EventRegistry::new(),
        Arc::new(LocalFs),
    )
    .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<ImagerError>(),
        Some(ImagerError::NoValidEntrypoints)
    ));
}

#[test]
fn test_invalid_entrypoints_are_excluded_not_fatal() {
    let tree = build_tree();
    let file = tree.path().join("a.txt");

    let valid = validate_entrypoints(&[file, tree.path().to_path_buf()], &LocalFs).unwrap();
    assert_eq!(valid, vec![tree.path().to_path_buf()]);
}

// --- exclusions ---

#[test]
fn test_excluded_dirs_are_pruned_from_the_crawl() {
    let tree = build_tree();
    let entrypoints = vec![tree.path().to_path_buf()];
    let opts = ImageOpts {
        threads: 2,
        excluded_dirs: vec![tree.path().join("sub")],
    };

    let (image, report) = image_dirs(&entrypoints, &opts, EventRegistry::new(), Arc::new(LocalFs))
        .unwrap();

    assert_eq!(report.crawled, 3);
    assert!(!image.contains(&tree.path().join("sub")));
    assert!(!image.contains(&tree.path().join("sub").join("c.txt")));
    assert!(image.contains(&tree.path().join("a.txt")));
}

// --- built-in extensions end to end ---

#[test]
fn test_hash_extension_records_blake3_of_contents() {
    let tree = tempfile::tempdir().unwrap();
    std::fs::write(tree.path().join("a.txt"), b"alpha").unwrap();
    let entrypoints = vec![tree.path().to_path_buf()];

    let mut registry = EventRegistry::new();
    load_extension_list(&["hash".to_string()], &mut registry);

    let (image, _report) = image_dirs(
        &entrypoints,
        &opts_with_threads(2),
        registry,
        Arc::new(LocalFs),
    )
    .unwrap();

    let record = image.record(&tree.path().join("a.txt")).unwrap();
    let expected = blake3::hash(b"alpha").to_hex().to_string();
    assert_eq!(
        record.attributes.get("blake3").and_then(|v| v.as_str()),
        Some(expected.as_str())
    );
    // Directories never enter the open window, so they carry no hash.
    let root = image.record(tree.path()).unwrap();
    assert!(root.attributes.get("blake3").is_none());
}

// --- lifecycle events ---

#[test]
fn test_on_start_and_on_end_fire_exactly_once() {
    let tree = build_tree();
    let entrypoints = vec![tree.path().to_path_buf()];

    let starts = Arc::new(AtomicUsize::new(0));
    let ends = Arc::new(AtomicUsize::new(0));
    let start_count = Arc::clone(&starts);
    let end_count = Arc::clone(&ends);
    let mut registry = EventRegistry::new();
    registry.register_on_start(move |_| {
        start_count.fetch_add(1, Ordering::SeqCst);
    });
    registry.register_on_end(move |args| {
        // The pool has drained by on_end time; the image must be complete.
        assert_eq!(args.image.len(), 5);
        end_count.fetch_add(1, Ordering::SeqCst);
    });

    image_dirs(
        &entrypoints,
        &opts_with_threads(8),
        registry,
        Arc::new(LocalFs),
    )
    .unwrap();

    assert_eq!(starts.load(Ordering::SeqCst), 1);
    assert_eq!(ends.load(Ordering::SeqCst), 1);
}
