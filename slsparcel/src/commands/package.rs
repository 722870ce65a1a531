//! `slsparcel package`: a minimal host around the plugin.
//!
//! Fires the bundle hook, zips each selected function from wherever the
//! service path now points, fires the cleanup hook, and reports the final
//! artifact of every function.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use slsparcel_bundler::{Bundler, ParcelCli};
use slsparcel_core::config::{load_dotenv_from_dir, BuildConfig};
use slsparcel_core::Service;
use slsparcel_plugin::resolver::selected_functions;
use slsparcel_plugin::{LifecycleHook, ParcelPlugin, PluginOptions, Selection};

use crate::archive::zip_dir;

/// Never packaged into a function artifact.
const ALWAYS_EXCLUDED: &str = "node_modules";

pub fn run(
    service_dir: &Path,
    function: Option<String>,
    jobs: Option<usize>,
    parcel_bin: Option<String>,
) -> Result<Vec<(String, PathBuf)>> {
    let service_dir = super::service_root(service_dir)?;
    // Before any rayon pool exists.
    load_dotenv_from_dir(&service_dir);
    let config = BuildConfig::from_env().with_cli_overrides(jobs, parcel_bin);
    let mut service = Service::load(&service_dir)?;
    let bundler = ParcelCli::locate(&service_dir, config.parcel_bin.as_deref())?;
    tracing::debug!("using {}", bundler.program().display());

    package_service(&mut service, bundler, config, function)
}

/// One packaging cycle over `service` with any bundler.
pub fn package_service<B: Bundler>(
    service: &mut Service,
    bundler: B,
    config: BuildConfig,
    function: Option<String>,
) -> Result<Vec<(String, PathBuf)>> {
    let deploy_folder = config.deploy_folder.clone();
    let (before, after, selection) = match &function {
        Some(name) => (
            LifecycleHook::BeforeFunctionPackage,
            LifecycleHook::AfterFunctionPackage,
            Selection::Function(name.clone()),
        ),
        None => (
            LifecycleHook::BeforePackage,
            LifecycleHook::AfterPackage,
            Selection::All,
        ),
    };
    let mut plugin = ParcelPlugin::new(service, bundler, config, PluginOptions { function })?;

    plugin
        .run_hook(before, service)
        .with_context(|| format!("{} failed", before))?;

    let names = selected_functions(service, &selection)?;
    if let Err(e) = zip_functions(service, &names, &deploy_folder) {
        if let Err(abort_err) = plugin.abort(service) {
            tracing::warn!("abort after packaging failure also failed: {}", abort_err);
        }
        return Err(e);
    }

    plugin
        .run_hook(after, service)
        .with_context(|| format!("{} failed", after))?;

    Ok(names
        .into_iter()
        .filter_map(|name| {
            let artifact = service.functions.get(&name)?.package.artifact.clone()?;
            Some((name, artifact))
        })
        .collect())
}

/// Zip the current service path once per function into
/// `<service path>/<deploy folder>/<name>.zip`; artifacts are recorded
/// relative to the service path.
fn zip_functions(service: &mut Service, names: &[String], deploy_folder: &str) -> Result<()> {
    let root = service.service_path.get().to_path_buf();
    let exclude = [ALWAYS_EXCLUDED, deploy_folder];
    for name in names {
        let rel = Path::new(deploy_folder).join(format!("{}.zip", name));
        let files = zip_dir(&root, &root.join(&rel), &exclude)
            .with_context(|| format!("Failed to package function '{}'", name))?;
        tracing::info!("{}: packaged {} files into {}", name, files, rel.display());
        if let Some(spec) = service.functions.get_mut(name) {
            spec.package.artifact = Some(rel);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use slsparcel_bundler::{BuildJob, BundleFailure, BundleReport};
    use std::fs;

    /// Writes `<outDir>/<entry stem>.js` for every job.
    struct WritesOutput;

    impl Bundler for WritesOutput {
        fn name(&self) -> &str {
            "writes-output"
        }

        fn bundle(&self, job: &BuildJob, cwd: &Path) -> Result<BundleReport, BundleFailure> {
            let out = cwd.join(job.out_dir().ok_or_else(|| BundleFailure::Other("no outDir".into()))?);
            fs::create_dir_all(&out).map_err(|e| BundleFailure::Other(e.to_string()))?;
            let stem = job.source.to_string().replace(".[jt]s", "");
            let file = Path::new(&stem).file_name().unwrap().to_string_lossy().to_string();
            fs::write(out.join(format!("{}.js", file)), "bundled")
                .map_err(|e| BundleFailure::Other(e.to_string()))?;
            Ok(BundleReport::default())
        }
    }

    fn service_dir() -> tempfile::TempDir {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(
            tmp.path().join("serverless.yml"),
            "service: demo\nfunctions:\n  hello:\n    handler: handlers/hello.handler\n  bye:\n    handler: bye.handler\ncustom:\n  parcel: {}\n",
        )
        .unwrap();
        fs::create_dir_all(tmp.path().join("handlers")).unwrap();
        fs::write(tmp.path().join("handlers").join("hello.ts"), "export {}").unwrap();
        tmp
    }

    #[test]
    fn test_full_cycle_leaves_artifacts_in_deploy_folder() {
        let tmp = service_dir();
        let mut service = Service::load(tmp.path()).unwrap();

        let artifacts =
            package_service(&mut service, WritesOutput, BuildConfig::default(), None).unwrap();

        let deploy = tmp.path().join(".serverless");
        assert_eq!(
            artifacts,
            vec![
                ("bye".to_string(), deploy.join("bye.zip")),
                ("hello".to_string(), deploy.join("hello.zip")),
            ]
        );
        assert!(deploy.join("hello.zip").is_file());
        assert!(!tmp.path().join(".serverless_parcel").exists());
        assert_eq!(service.service_path.get(), tmp.path());

        let mut archive =
            zip::ZipArchive::new(fs::File::open(deploy.join("hello.zip")).unwrap()).unwrap();
        assert!(archive.by_name("handlers/hello.js").is_ok());
        assert!(archive.by_name("handlers/hello.ts").is_err());
    }

    #[test]
    fn test_single_function_cycle() {
        let tmp = service_dir();
        let mut service = Service::load(tmp.path()).unwrap();

        let artifacts = package_service(
            &mut service,
            WritesOutput,
            BuildConfig::default(),
            Some("bye".into()),
        )
        .unwrap();

        assert_eq!(artifacts.len(), 1);
        assert_eq!(artifacts[0].0, "bye");
        assert!(!tmp.path().join(".serverless").join("hello.zip").exists());
    }
}
