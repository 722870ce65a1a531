use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// slsparcel - bundle Serverless function handlers with Parcel before packaging
#[derive(Parser, Debug)]
#[command(name = "slsparcel")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Debug logging for every slsparcel crate, including the bundler command lines
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a full packaging cycle: bundle, zip each function, relocate artifacts
    Package {
        /// Service root containing serverless.yml
        #[arg(long, value_name = "DIR", env = "SLSPARCEL_SERVICE_DIR", default_value = ".")]
        service_dir: PathBuf,

        /// Package a single function (deploy-function cycle)
        #[arg(long, short)]
        function: Option<String>,

        /// Concurrent bundle jobs (default: SLSPARCEL_JOBS or available parallelism)
        #[arg(long, short)]
        jobs: Option<usize>,

        /// Parcel executable (default: SLSPARCEL_PARCEL_BIN, node_modules/.bin, PATH, npx)
        #[arg(long, value_name = "PATH")]
        parcel_bin: Option<String>,
    },

    /// Print the build jobs a cycle would run, as JSON, without bundling
    Resolve {
        /// Service root containing serverless.yml
        #[arg(long, value_name = "DIR", env = "SLSPARCEL_SERVICE_DIR", default_value = ".")]
        service_dir: PathBuf,

        /// Resolve a single function only
        #[arg(long, short)]
        function: Option<String>,
    },

    /// List the lifecycle hooks the plugin registers
    Hooks,
}
