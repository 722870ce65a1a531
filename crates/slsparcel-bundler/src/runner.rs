//! Fan-out over independent build jobs, fan-in on every outcome.
//!
//! Jobs never depend on one another, so they run on a bounded rayon pool.
//! Every job runs to completion even when a sibling fails: the caller needs
//! the full picture before deciding whether the cycle may advance.

use rayon::prelude::*;
use std::path::Path;

use crate::bundler::{BundleFailure, BundleReport, Bundler};
use crate::job::BuildJob;

/// Result of one job, paired with the job that produced it.
#[derive(Debug)]
pub struct JobOutcome<'a> {
    pub job: &'a BuildJob,
    pub result: Result<BundleReport, BundleFailure>,
}

impl JobOutcome<'_> {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// Run every job and return all outcomes in job order.
///
/// `parallelism` caps concurrent bundler processes; `1` runs sequentially on
/// the calling thread.
pub fn run_jobs<'a, B>(
    bundler: &B,
    jobs: &'a [BuildJob],
    cwd: &Path,
    parallelism: usize,
) -> Vec<JobOutcome<'a>>
where
    B: Bundler + ?Sized,
{
    let run_one = |job: &'a BuildJob| {
        tracing::info!("{}: bundling {}", job.origin, job.source);
        let result = bundler.bundle(job, cwd);
        match &result {
            Ok(report) => match &report.out_dir {
                Some(dir) => tracing::info!(
                    "{}: bundled into {} in {} ms",
                    job.origin,
                    dir.display(),
                    report.elapsed.as_millis()
                ),
                None => tracing::info!(
                    "{}: bundled in {} ms",
                    job.origin,
                    report.elapsed.as_millis()
                ),
            },
            Err(e) => tracing::error!("{}: {}", job.origin, e),
        }
        JobOutcome { job, result }
    };

    let threads = parallelism.max(1).min(jobs.len().max(1));
    if threads == 1 {
        return jobs.iter().map(run_one).collect();
    }

    match rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .thread_name(|i| format!("slsparcel-bundle-{}", i))
        .build()
    {
        Ok(pool) => pool.install(|| jobs.par_iter().map(run_one).collect()),
        Err(e) => {
            tracing::warn!("bundle thread pool unavailable ({}), running sequentially", e);
            jobs.iter().map(run_one).collect()
        }
    }
}
