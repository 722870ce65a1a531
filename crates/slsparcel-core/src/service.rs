//! Service model: the host-owned configuration the plugin reads, plus the
//! single mutable service-path cell it redirects during a packaging cycle.
//!
//! Loaded from `serverless.yml` (or `.yaml` / `.json`). Only the keys the
//! plugin needs are modeled; `${...}` variables are not resolved.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::PackError;

/// Service definition file names, in lookup priority order.
pub const SERVICE_FILE_NAMES: &[&str] = &["serverless.yml", "serverless.yaml", "serverless.json"];

/// `functions.<name>.package`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PackageSpec {
    /// Packaged artifact, assigned by the host after zipping.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artifact: Option<PathBuf>,
}

/// `functions.<name>`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionSpec {
    #[serde(skip)]
    pub name: String,
    /// `<module-path>.<exported-symbol>`, e.g. `handlers/hello.handler`
    #[serde(default)]
    pub handler: Option<String>,
    #[serde(default)]
    pub package: PackageSpec,
}

impl FunctionSpec {
    pub fn new(name: impl Into<String>, handler: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            handler: Some(handler.into()),
            package: PackageSpec::default(),
        }
    }
}

/// `custom.parcel.entries[]`: a file bundled independently of any function.
/// Every key other than `file` is a bundler option.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomEntry {
    pub file: String,
    #[serde(flatten)]
    pub options: Map<String, Value>,
}

/// `custom.parcel`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParcelConfig {
    #[serde(default)]
    pub entries: Vec<CustomEntry>,
    /// Global options applied to every function entry.
    #[serde(default)]
    pub options: Map<String, Value>,
}

/// The host's service path. Exactly one writer at a time: mutation needs
/// `&mut`, and the plugin only receives that for the duration of a hook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServicePath(PathBuf);

impl ServicePath {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self(path.into())
    }

    pub fn get(&self) -> &Path {
        &self.0
    }

    /// Point the host at `to`, returning the previous value.
    pub fn redirect(&mut self, to: PathBuf) -> PathBuf {
        std::mem::replace(&mut self.0, to)
    }

    /// Put back a value previously returned by [`ServicePath::redirect`].
    pub fn restore(&mut self, original: PathBuf) {
        self.0 = original;
    }
}

impl fmt::Display for ServicePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ServiceName {
    Plain(String),
    Named { name: String },
}

#[derive(Debug, Default, Deserialize)]
struct CustomSection {
    #[serde(default)]
    parcel: Option<ParcelConfig>,
}

#[derive(Debug, Deserialize)]
struct ServiceFile {
    #[serde(default)]
    service: Option<ServiceName>,
    #[serde(default)]
    functions: Option<BTreeMap<String, FunctionSpec>>,
    #[serde(default)]
    custom: Option<CustomSection>,
}

/// Host-owned service state for one packaging cycle.
#[derive(Debug, Clone)]
pub struct Service {
    pub name: String,
    pub service_path: ServicePath,
    pub functions: BTreeMap<String, FunctionSpec>,
    /// `custom.parcel`; `None` when the block is absent.
    pub parcel: Option<ParcelConfig>,
}

impl Service {
    pub fn new(name: impl Into<String>, root: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            service_path: ServicePath::new(root),
            functions: BTreeMap::new(),
            parcel: None,
        }
    }

    pub fn with_function(mut self, name: &str, handler: &str) -> Self {
        self.functions
            .insert(name.to_string(), FunctionSpec::new(name, handler));
        self
    }

    pub fn with_parcel(mut self, parcel: ParcelConfig) -> Self {
        self.parcel = Some(parcel);
        self
    }

    /// Locate the service definition file in `dir`.
    pub fn find_definition(dir: &Path) -> Option<PathBuf> {
        SERVICE_FILE_NAMES
            .iter()
            .map(|name| dir.join(name))
            .find(|p| p.is_file())
    }

    /// Load the service rooted at `dir`.
    pub fn load(dir: &Path) -> Result<Self, PackError> {
        let path = Self::find_definition(dir).ok_or_else(|| {
            PackError::config(format!(
                "no service definition ({}) found in {}",
                SERVICE_FILE_NAMES.join(", "),
                dir.display()
            ))
        })?;
        let content = std::fs::read_to_string(&path).map_err(|source| PackError::Read {
            path: path.clone(),
            source,
        })?;
        tracing::debug!("loading service definition {}", path.display());
        Self::from_yaml_str(&content, dir)
    }

    /// Parse a service definition. JSON is accepted as a YAML subset.
    pub fn from_yaml_str(content: &str, root: &Path) -> Result<Self, PackError> {
        let file: ServiceFile = serde_yaml::from_str(content)
            .map_err(|e| PackError::config(format!("invalid service definition: {}", e)))?;

        let name = match file.service {
            Some(ServiceName::Plain(s)) | Some(ServiceName::Named { name: s }) => s,
            None => root
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| "service".to_string()),
        };

        let functions = file
            .functions
            .unwrap_or_default()
            .into_iter()
            .map(|(key, mut spec)| {
                spec.name = key.clone();
                (key, spec)
            })
            .collect();

        Ok(Self {
            name,
            service_path: ServicePath::new(root),
            functions,
            parcel: file.custom.and_then(|c| c.parcel),
        })
    }

    /// `custom.parcel`, or a ConfigurationError when the block is missing.
    pub fn parcel_config(&self) -> Result<&ParcelConfig, PackError> {
        self.parcel
            .as_ref()
            .ok_or_else(|| PackError::config("missing `custom.parcel` block in service definition"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HELLO: &str = r#"
service: hello-svc
provider:
  name: aws
  runtime: nodejs18.x
functions:
  hello:
    handler: handlers/hello.handler
  world:
    handler: world.main
    package:
      artifact: .serverless/world.zip
custom:
  parcel:
    entries:
      - file: src/worker.ts
        outDir: dist/worker
        minify: true
    options:
      sourceMaps: false
"#;

    #[test]
    fn test_from_yaml_str_reads_functions_and_parcel_block() {
        let svc = Service::from_yaml_str(HELLO, Path::new("/srv/app")).unwrap();
        assert_eq!(svc.name, "hello-svc");
        assert_eq!(svc.service_path.get(), Path::new("/srv/app"));
        assert_eq!(svc.functions.len(), 2);

        let hello = &svc.functions["hello"];
        assert_eq!(hello.name, "hello");
        assert_eq!(hello.handler.as_deref(), Some("handlers/hello.handler"));
        assert_eq!(hello.package.artifact, None);
        assert_eq!(
            svc.functions["world"].package.artifact,
            Some(PathBuf::from(".serverless/world.zip"))
        );

        let parcel = svc.parcel_config().unwrap();
        assert_eq!(parcel.entries.len(), 1);
        assert_eq!(parcel.entries[0].file, "src/worker.ts");
        assert_eq!(parcel.entries[0].options["outDir"], Value::from("dist/worker"));
        assert_eq!(parcel.entries[0].options["minify"], Value::from(true));
        assert!(!parcel.entries[0].options.contains_key("file"));
        assert_eq!(parcel.options["sourceMaps"], Value::from(false));
    }

    #[test]
    fn test_missing_parcel_block_is_configuration_error() {
        let svc = Service::from_yaml_str(
            "service: x\nfunctions:\n  a:\n    handler: a.handler\n",
            Path::new("/srv/x"),
        )
        .unwrap();
        assert!(matches!(svc.parcel_config(), Err(PackError::Configuration(_))));
    }

    #[test]
    fn test_empty_parcel_block_defaults() {
        let svc = Service::from_yaml_str(
            "service:\n  name: legacy\ncustom:\n  parcel: {}\n",
            Path::new("/srv/x"),
        )
        .unwrap();
        assert_eq!(svc.name, "legacy");
        assert!(svc.functions.is_empty());
        assert_eq!(svc.parcel_config().unwrap(), &ParcelConfig::default());
    }

    #[test]
    fn test_load_finds_json_definition() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(
            tmp.path().join("serverless.json"),
            r#"{"service":"j","functions":{"f":{"handler":"f.h"}},"custom":{"parcel":{"entries":[],"options":{}}}}"#,
        )
        .unwrap();
        let svc = Service::load(tmp.path()).unwrap();
        assert_eq!(svc.name, "j");
        assert!(svc.functions.contains_key("f"));
    }

    #[test]
    fn test_load_without_definition_fails() {
        let tmp = tempfile::tempdir().unwrap();
        assert!(matches!(
            Service::load(tmp.path()),
            Err(PackError::Configuration(_))
        ));
    }

    #[test]
    fn test_service_path_redirect_and_restore() {
        let mut sp = ServicePath::new("/srv/app");
        let original = sp.redirect(PathBuf::from("/srv/app/.serverless_parcel"));
        assert_eq!(sp.get(), Path::new("/srv/app/.serverless_parcel"));
        sp.restore(original);
        assert_eq!(sp.get(), Path::new("/srv/app"));
    }
}
