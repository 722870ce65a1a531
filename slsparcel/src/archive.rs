//! Zip a service tree into a function artifact.

use anyhow::{Context, Result};
use std::fs::{self, File};
use std::io;
use std::path::Path;
use walkdir::WalkDir;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Write every file under `src` into the zip at `dest`, skipping top-level
/// entries named in `exclude`. Returns the number of files written.
pub fn zip_dir(src: &Path, dest: &Path, exclude: &[&str]) -> Result<usize> {
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let file = File::create(dest).with_context(|| format!("Failed to create {}", dest.display()))?;
    let mut zip = ZipWriter::new(file);
    let options = FileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .unix_permissions(0o644);

    let mut written = 0;
    let walker = WalkDir::new(src)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| !is_excluded(src, e.path(), exclude));
    for entry in walker {
        let entry = entry.context("Failed to walk service directory")?;
        let path = entry.path();
        if path == dest {
            continue;
        }
        let rel = path.strip_prefix(src)?;
        if rel.as_os_str().is_empty() {
            continue;
        }
        let name = rel.to_string_lossy().replace('\\', "/");
        if entry.file_type().is_dir() {
            zip.add_directory(name, options)?;
        } else if entry.file_type().is_file() {
            zip.start_file(name, options)?;
            let mut input =
                File::open(path).with_context(|| format!("Failed to read {}", path.display()))?;
            io::copy(&mut input, &mut zip)?;
            written += 1;
        }
    }
    zip.finish()?;
    Ok(written)
}

fn is_excluded(root: &Path, path: &Path, exclude: &[&str]) -> bool {
    path.strip_prefix(root)
        .ok()
        .and_then(|rel| rel.components().next())
        .map_or(false, |first| {
            exclude.iter().any(|e| first.as_os_str() == *e)
        })
}
