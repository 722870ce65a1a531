mod archive;
mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use slsparcel_core::observability::{self, TracingMode};

fn main() -> Result<()> {
    let cli = Cli::parse();
    observability::init_tracing(if cli.verbose {
        TracingMode::Verbose
    } else {
        TracingMode::Default
    });

    match cli.command {
        Commands::Package {
            service_dir,
            function,
            jobs,
            parcel_bin,
        } => {
            let artifacts = commands::package::run(&service_dir, function, jobs, parcel_bin)?;
            for (name, artifact) in artifacts {
                println!("{}\t{}", name, artifact.display());
            }
        }
        Commands::Resolve {
            service_dir,
            function,
        } => {
            let jobs = commands::resolve::run(&service_dir, function)?;
            println!("{}", serde_json::to_string_pretty(&jobs)?);
        }
        Commands::Hooks => {
            for line in commands::hooks::describe() {
                println!("{}", line);
            }
        }
    }
    Ok(())
}
