//! Persisting a finished image to disk.

use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::image::Image;

/// A sink for finished images. Output must be a deterministic function of the
/// image contents: writing the same image twice yields identical bytes.
pub trait ImageSerializer {
    /// Persist `image` at `dest` and return the path actually written.
    fn write(&self, image: &Image, dest: &Path) -> Result<PathBuf>;
}

/// Pretty-printed JSON of the image snapshot. The snapshot's BTreeMaps give a
/// stable key order.
pub struct JsonSerializer;

impl ImageSerializer for JsonSerializer {
    fn write(&self, image: &Image, dest: &Path) -> Result<PathBuf> {
        let doc = image.snapshot();
        let file = File::create(dest)
            .with_context(|| format!("create image file '{}'", dest.display()))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, &doc)
            .with_context(|| format!("serialize image to '{}'", dest.display()))?;
        writer.flush().context("flush image file")?;
        Ok(dest.to_path_buf())
    }
}
