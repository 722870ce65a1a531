//! `ParcelCli`: drives the parcel command-line bundler as a child process.

use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Instant;

use crate::args::parcel_args;
use crate::bundler::{BundleFailure, BundleReport, Bundler};
use crate::job::BuildJob;

/// Keep error messages readable when parcel dumps a long stack.
const STDERR_TAIL_BYTES: usize = 4096;

#[derive(Debug, Clone)]
pub struct ParcelCli {
    program: PathBuf,
    /// Arguments placed before `build`, e.g. `["--no-install", "parcel"]` for npx.
    leading_args: Vec<String>,
}

impl ParcelCli {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self::via(program, Vec::<String>::new())
    }

    /// Run parcel through a launcher such as `npx`.
    pub fn via<I, S>(program: impl Into<PathBuf>, leading_args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            leading_args: leading_args.into_iter().map(Into::into).collect(),
        }
    }

    /// Find the parcel executable: explicit path, then the service's
    /// `node_modules/.bin`, then `PATH`, then `npx --no-install parcel`.
    ///
    /// Paths with a directory part come back absolute, since the bundler
    /// runs with the service root as its working directory.
    pub fn locate(service_root: &Path, explicit: Option<&str>) -> Result<Self, BundleFailure> {
        if let Some(bin) = explicit {
            return Ok(Self::new(anchored(PathBuf::from(bin))));
        }

        let local = service_root
            .join("node_modules")
            .join(".bin")
            .join(local_bin_name());
        if local.is_file() {
            tracing::debug!("using project-local parcel at {}", local.display());
            return Ok(Self::new(anchored(local)));
        }

        match which::which("parcel") {
            Ok(path) => Ok(Self::new(path)),
            Err(e) => match which::which("npx") {
                Ok(npx) => {
                    tracing::debug!("parcel not on PATH, falling back to npx");
                    Ok(Self::via(npx, ["--no-install", "parcel"]))
                }
                Err(_) => Err(BundleFailure::NotFound(e.to_string())),
            },
        }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Full argv (without the program) for `job`.
    pub fn command_args(&self, job: &BuildJob, cwd: &Path) -> Vec<String> {
        let mut args = self.leading_args.clone();
        args.extend(parcel_args(&job.source.bundler_arg(cwd), &job.options));
        args
    }
}

impl Bundler for ParcelCli {
    fn name(&self) -> &str {
        "parcel"
    }

    fn bundle(&self, job: &BuildJob, cwd: &Path) -> Result<BundleReport, BundleFailure> {
        if job.wants_watch() {
            tracing::warn!(
                "{}: watch mode is not supported while packaging, running a single build",
                job.origin
            );
        }

        let args = self.command_args(job, cwd);
        tracing::debug!("{}: {} {}", job.origin, self.program.display(), args.join(" "));

        let started = Instant::now();
        let output = Command::new(&self.program)
            .args(&args)
            .current_dir(cwd)
            .output()
            .map_err(|source| BundleFailure::Spawn {
                program: self.program.display().to_string(),
                source,
            })?;

        if !output.status.success() {
            let mut stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            if stderr.is_empty() {
                // parcel 1.x reports build errors on stdout
                stderr = String::from_utf8_lossy(&output.stdout).trim().to_string();
            }
            return Err(BundleFailure::Exit {
                status: output.status.to_string(),
                stderr: tail(&stderr, STDERR_TAIL_BYTES),
            });
        }

        Ok(BundleReport {
            elapsed: started.elapsed(),
            out_dir: job.out_dir().map(|d| cwd.join(d)),
        })
    }
}

/// Bare names stay as they are for `PATH` lookup.
fn anchored(program: PathBuf) -> PathBuf {
    if program.is_absolute() || program.components().count() < 2 {
        return program;
    }
    std::path::absolute(&program).unwrap_or(program)
}

#[cfg(windows)]
fn local_bin_name() -> &'static str {
    "parcel.cmd"
}

#[cfg(not(windows))]
fn local_bin_name() -> &'static str {
    "parcel"
}

fn tail(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_string();
    }
    let mut start = s.len() - max;
    while !s.is_char_boundary(start) {
        start += 1;
    }
    format!("...{}", &s[start..])
}
