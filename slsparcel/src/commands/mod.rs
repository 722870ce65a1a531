//! Subcommand implementations. `package` plays the host: it owns the
//! service, fires the lifecycle hooks and zips functions in between.

pub mod hooks;
pub mod package;
pub mod resolve;

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// `--service-dir` made absolute against the invocation directory. Bundler
/// processes run inside the service root, so nothing downstream may hold a
/// path relative to where slsparcel was started.
pub fn service_root(dir: &Path) -> Result<PathBuf> {
    std::path::absolute(dir)
        .with_context(|| format!("Invalid service directory {}", dir.display()))
}
