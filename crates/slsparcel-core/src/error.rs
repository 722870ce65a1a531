//! Error taxonomy for a packaging cycle.
//!
//! Every variant surfaces to the host's hook error channel unchanged; nothing
//! here is retried.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// One failed bundler invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobFailure {
    /// Human-readable job label, e.g. `function hello` or `entry src/worker.ts`.
    pub job: String,
    pub message: String,
}

impl fmt::Display for JobFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.job, self.message)
    }
}

#[derive(Debug, Error)]
pub enum PackError {
    /// Malformed or missing configuration. Raised before any bundler call.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// At least one bundle job failed; the service path was not redirected.
    #[error("bundling failed for {} of {total} entries:\n  {}", .failures.len(), join_failures(.failures))]
    Bundle {
        total: usize,
        failures: Vec<JobFailure>,
    },

    /// Moving a packaged artifact into the deploy folder failed.
    #[error("failed to relocate artifact of function '{function}' ({}): {source}", .artifact.display())]
    Relocation {
        function: String,
        artifact: PathBuf,
        #[source]
        source: slsparcel_fs::FsError,
    },

    /// A function selected for relocation has no `package.artifact`.
    #[error("function '{0}' has no packaged artifact to relocate")]
    MissingArtifact(String),

    /// Hook fired out of order (e.g. a second bundle before cleanup).
    #[error("packaging cycle error: {0}")]
    Cycle(String),

    /// Removing the temporary build root failed.
    #[error("failed to clean up build folder: {0}")]
    Cleanup(#[source] slsparcel_fs::FsError),

    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl PackError {
    pub fn config(msg: impl Into<String>) -> Self {
        PackError::Configuration(msg.into())
    }
}

fn join_failures(failures: &[JobFailure]) -> String {
    failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n  ")
}
