//! Bundler contract: the external engine that turns one entry into output
//! files under the job's output directory.
//!
//! Implement this trait to plug in another engine (esbuild, a test fake, ...).
//! The runner calls `bundle` from several threads at once.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::job::BuildJob;

/// Successful bundler invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BundleReport {
    pub elapsed: Duration,
    /// Output directory the engine wrote to, if known.
    pub out_dir: Option<PathBuf>,
}

/// Why a bundler invocation failed.
#[derive(Debug, Error)]
pub enum BundleFailure {
    #[error("bundler executable not found ({0}); install parcel-bundler or set SLSPARCEL_PARCEL_BIN")]
    NotFound(String),

    #[error("failed to launch {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("bundler exited with {status}: {stderr}")]
    Exit { status: String, stderr: String },

    #[error("{0}")]
    Other(String),
}

pub trait Bundler: Send + Sync {
    /// Short engine name for logs.
    fn name(&self) -> &str;

    /// Bundle `job`, with relative paths resolved against `cwd` (the
    /// service root). Returns once output has been written.
    fn bundle(&self, job: &BuildJob, cwd: &Path) -> Result<BundleReport, BundleFailure>;
}

impl<B: Bundler + ?Sized> Bundler for Arc<B> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn bundle(&self, job: &BuildJob, cwd: &Path) -> Result<BundleReport, BundleFailure> {
        (**self).bundle(job, cwd)
    }
}

impl<B: Bundler + ?Sized> Bundler for Box<B> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn bundle(&self, job: &BuildJob, cwd: &Path) -> Result<BundleReport, BundleFailure> {
        (**self).bundle(job, cwd)
    }
}
