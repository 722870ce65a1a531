//! Bundler side of slsparcel.
//!
//! - `job`: `BuildJob` descriptors and option merging
//! - `bundler`: the `Bundler` contract an external engine fulfils
//! - `parcel`: `ParcelCli`, which shells out to `parcel build`
//! - `args`: option object → parcel argv
//! - `runner`: fan-out over independent jobs, fan-in on every outcome

pub mod args;
pub mod bundler;
pub mod job;
pub mod parcel;
pub mod runner;

pub use bundler::{BundleFailure, BundleReport, Bundler};
pub use job::{merge_options, BuildJob, BundleOptions, EntrySource, JobOrigin};
pub use parcel::ParcelCli;
pub use runner::{run_jobs, JobOutcome};
