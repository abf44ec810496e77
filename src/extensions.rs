//! Built-in extensions selectable with `--load-extensions`.
//!
//! Each extension registers handlers against the shared event registry
//! before any descriptor is dispatched. Unknown names are logged and skipped;
//! a bad extension name never aborts the run.

use crate::events::EventRegistry;

/// Resolve each name against the built-in table and let it register its
/// handlers.
pub fn load_extension_list(names: &[String], registry: &mut EventRegistry) {
    for name in names {
        match name.as_str() {
            "hash" => register_hash(registry),
            "stat" => register_stat(registry),
            other => log::error!("Unknown extension '{}', skipping", other),
        }
    }
}

/// `hash`: blake3 of the file contents, recorded as a hex attribute while the
/// stream is open.
fn register_hash(registry: &mut EventRegistry) {
    registry.register_with_open(|args| {
        let mut hasher = blake3::Hasher::new();
        std::io::copy(&mut *args.fd, &mut hasher)?;
        let hex = hasher.finalize().to_hex().to_string();
        args.image
            .set_attribute(args.file_path, "blake3", serde_json::Value::String(hex));
        Ok(())
    });
}

/// `stat`: size and mtime at pre_open time. Reads metadata through `std::fs`,
/// so it only yields attributes on local runs; failures are skipped silently
/// per path.
fn register_stat(registry: &mut EventRegistry) {
    registry.register_pre_open(|args| {
        if let Ok(meta) = std::fs::metadata(args.file_path) {
            args.image
                .set_attribute(args.file_path, "size", meta.len().into());
            if let Ok(mtime) = meta.modified() {
                let secs = mtime
                    .duration_since(std::time::UNIX_EPOCH)
                    .map(|d| d.as_secs())
                    .unwrap_or(0);
                args.image
                    .set_attribute(args.file_path, "mtime_unix", secs.into());
            }
        }
    });
}
