use anyhow::Result;
use std::path::Path;

use slsparcel_bundler::BuildJob;
use slsparcel_core::config::{load_dotenv_from_dir, BuildConfig};
use slsparcel_core::Service;
use slsparcel_plugin::{resolve_jobs, BuildLayout, Selection};

/// Dry run: the jobs a packaging cycle would hand to the bundler.
pub fn run(service_dir: &Path, function: Option<String>) -> Result<Vec<BuildJob>> {
    let service_dir = super::service_root(service_dir)?;
    load_dotenv_from_dir(&service_dir);
    let config = BuildConfig::from_env();
    let service = Service::load(&service_dir)?;
    let layout = BuildLayout::new(&service_dir, &config)?;
    let selection = function.map_or(Selection::All, Selection::Function);
    Ok(resolve_jobs(&service, &layout, &selection)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const SERVICE: &str = r#"
service: hello
functions:
  hello:
    handler: handlers/hello.handler
  image:
    handler: image.resize
custom:
  parcel:
    options:
      target: node
    entries:
      - file: src/worker.ts
        outDir: public
"#;

    #[test]
    fn test_resolves_functions_then_entries() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join("serverless.yml"), SERVICE).unwrap();

        let jobs = run(tmp.path(), None).unwrap();
        let sources: Vec<_> = jobs.iter().map(|j| j.source.to_string()).collect();
        assert_eq!(sources, vec!["handlers/hello.[jt]s", "image.[jt]s", "src/worker.ts"]);

        let json = serde_json::to_value(&jobs).unwrap();
        assert_eq!(json[0]["origin"]["name"], "hello");
        assert_eq!(json[2]["options"]["outDir"], "public");
    }

    #[test]
    fn test_single_function_and_unknown_function() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join("serverless.yml"), SERVICE).unwrap();

        let jobs = run(tmp.path(), Some("image".into())).unwrap();
        assert_eq!(jobs.len(), 2);
        assert!(run(tmp.path(), Some("missing".into())).is_err());
    }

    #[test]
    fn test_relative_service_dir() {
        let tmp = tempfile::tempdir_in(".").unwrap();
        fs::write(tmp.path().join("serverless.yml"), SERVICE).unwrap();

        let jobs = run(tmp.path(), Some("hello".into())).unwrap();
        assert_eq!(jobs[0].out_dir(), Some(Path::new(".serverless_parcel/handlers")));
    }

    #[test]
    fn test_missing_service_file() {
        let tmp = tempfile::tempdir().unwrap();
        assert!(run(tmp.path(), None).is_err());
    }
}
