//! File relocation primitives.
//!
//! `move_overwrite` and `remove_all` are the only two operations the packaging
//! cycle performs on artifacts and the build tree. A failed move leaves the
//! source in place; a cross-device move falls back to copy + remove.

mod path;

pub use path::{normalize, relative_to};

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

/// Errors returned by the relocation primitives.
#[derive(Debug, Error)]
pub enum FsError {
    #[error("source does not exist: {}", .0.display())]
    NotFound(PathBuf),

    #[error("cannot move {} into its own subdirectory {}", .from.display(), .to.display())]
    IntoItself { from: PathBuf, to: PathBuf },

    #[error("failed to move {} to {}: {source}", .from.display(), .to.display())]
    Move {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to remove {}: {source}", .path.display())]
    Remove {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to create directory {}: {source}", .path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

pub type Result<T> = std::result::Result<T, FsError>;

/// Move `from` to `to`, replacing whatever is at `to`.
///
/// Parent directories of `to` are created. Works for files and directories.
pub fn move_overwrite(from: &Path, to: &Path) -> Result<()> {
    if fs::symlink_metadata(from).is_err() {
        return Err(FsError::NotFound(from.to_path_buf()));
    }
    let from_norm = normalize(from);
    let to_norm = normalize(to);
    if from_norm == to_norm {
        return Ok(());
    }
    if from.is_dir() && to_norm.starts_with(&from_norm) {
        return Err(FsError::IntoItself {
            from: from.to_path_buf(),
            to: to.to_path_buf(),
        });
    }

    if let Some(parent) = to.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| FsError::CreateDir {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    remove_all(to)?;

    match fs::rename(from, to) {
        Ok(()) => {
            tracing::debug!("moved {} -> {}", from.display(), to.display());
            Ok(())
        }
        Err(e) if is_cross_device(&e) => {
            tracing::debug!(
                "rename across devices, copying {} -> {}",
                from.display(),
                to.display()
            );
            copy_then_remove(from, to)
        }
        Err(source) => Err(FsError::Move {
            from: from.to_path_buf(),
            to: to.to_path_buf(),
            source,
        }),
    }
}

/// Recursively remove `path` (file or directory).
///
/// Returns `false` when there was nothing to remove.
pub fn remove_all(path: &Path) -> Result<bool> {
    let meta = match fs::symlink_metadata(path) {
        Ok(m) => m,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(false),
        Err(source) => {
            return Err(FsError::Remove {
                path: path.to_path_buf(),
                source,
            })
        }
    };
    let res = if meta.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    };
    match res {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(source) => Err(FsError::Remove {
            path: path.to_path_buf(),
            source,
        }),
    }
}

fn copy_then_remove(from: &Path, to: &Path) -> Result<()> {
    let move_err = |source: io::Error| FsError::Move {
        from: from.to_path_buf(),
        to: to.to_path_buf(),
        source,
    };

    if from.is_dir() {
        for entry in WalkDir::new(from) {
            let entry = entry.map_err(|e| move_err(io::Error::from(e)))?;
            let rel = entry
                .path()
                .strip_prefix(from)
                .map_err(|e| move_err(io::Error::new(io::ErrorKind::Other, e)))?;
            let target = to.join(rel);
            if entry.file_type().is_dir() {
                fs::create_dir_all(&target).map_err(move_err)?;
            } else {
                fs::copy(entry.path(), &target).map_err(move_err)?;
            }
        }
    } else if let Err(e) = fs::copy(from, to) {
        // Leave the source untouched and drop the half-written copy.
        let _ = fs::remove_file(to);
        return Err(move_err(e));
    }

    remove_all(from)?;
    Ok(())
}

#[cfg(unix)]
fn is_cross_device(e: &io::Error) -> bool {
    // EXDEV
    e.raw_os_error() == Some(18)
}

#[cfg(windows)]
fn is_cross_device(e: &io::Error) -> bool {
    // ERROR_NOT_SAME_DEVICE
    e.raw_os_error() == Some(17)
}

#[cfg(not(any(unix, windows)))]
fn is_cross_device(_e: &io::Error) -> bool {
    false
}
