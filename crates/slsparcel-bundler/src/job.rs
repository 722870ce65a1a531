//! Build job descriptors.
//!
//! A `BuildJob` is created per function or custom entry when a cycle starts
//! and dropped once its bundler call returns. No job reads another job's
//! output, so jobs can run in any order.

use serde::{Serialize, Serializer};
use serde_json::{Map, Value};
use std::fmt;
use std::path::{Path, PathBuf};

/// Bundler option object (`{"target": "node", "cache": false, ...}`).
pub type BundleOptions = Map<String, Value>;

/// Script extensions a handler module may be written in, in lookup order.
pub const SUPPORTED_EXTENSIONS: &[&str] = &["js", "ts"];

/// Glob matching any of [`SUPPORTED_EXTENSIONS`].
pub const EXTENSION_WILDCARD: &str = "[jt]s";

/// Option key holding the output directory.
pub const OUT_DIR_KEY: &str = "outDir";

/// What the bundler is pointed at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntrySource {
    /// `<module>.[jt]s`: whichever supported script exists on disk.
    Pattern { module: String },
    /// A literal file path from a custom entry.
    File(String),
}

impl EntrySource {
    pub fn pattern(module: impl Into<String>) -> Self {
        EntrySource::Pattern {
            module: module.into(),
        }
    }

    /// Directory containing the entry (`.` for root-level entries).
    pub fn dir(&self) -> PathBuf {
        let text = match self {
            EntrySource::Pattern { module } => module.as_str(),
            EntrySource::File(file) => file.as_str(),
        };
        match Path::new(text).parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        }
    }

    /// Find the entry on disk under `root`. Returns the path relative to
    /// `root`, or `None` when no candidate exists.
    pub fn resolve(&self, root: &Path) -> Option<PathBuf> {
        match self {
            EntrySource::Pattern { module } => SUPPORTED_EXTENSIONS
                .iter()
                .map(|ext| PathBuf::from(format!("{}.{}", module, ext)))
                .find(|rel| root.join(rel).is_file()),
            EntrySource::File(file) => {
                let p = PathBuf::from(file);
                let on_disk = if p.is_absolute() { p.clone() } else { root.join(&p) };
                on_disk.is_file().then_some(p)
            }
        }
    }

    /// Argument handed to the bundler: the resolved file when one exists,
    /// otherwise the raw pattern (parcel expands globs itself).
    pub fn bundler_arg(&self, root: &Path) -> String {
        let rel = self
            .resolve(root)
            .map(|p| p.to_string_lossy().replace('\\', "/"))
            .unwrap_or_else(|| self.to_string());
        if Path::new(&rel).is_absolute() || rel.starts_with("./") || rel.starts_with("../") {
            rel
        } else {
            format!("./{}", rel)
        }
    }
}

impl fmt::Display for EntrySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntrySource::Pattern { module } => write!(f, "{}.{}", module, EXTENSION_WILDCARD),
            EntrySource::File(file) => write!(f, "{}", file),
        }
    }
}

impl Serialize for EntrySource {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Where a job came from, for logs and error messages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "name", rename_all = "snake_case")]
pub enum JobOrigin {
    Function(String),
    Custom(String),
}

impl fmt::Display for JobOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobOrigin::Function(name) => write!(f, "function {}", name),
            JobOrigin::Custom(file) => write!(f, "entry {}", file),
        }
    }
}

/// One bundler invocation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BuildJob {
    pub origin: JobOrigin,
    pub source: EntrySource,
    pub options: BundleOptions,
}

impl BuildJob {
    pub fn new(origin: JobOrigin, source: EntrySource, options: BundleOptions) -> Self {
        Self {
            origin,
            source,
            options,
        }
    }

    /// Output directory, relative to the service root when not absolute.
    pub fn out_dir(&self) -> Option<&Path> {
        self.options
            .get(OUT_DIR_KEY)
            .and_then(Value::as_str)
            .map(Path::new)
    }

    /// `watch: true` in the merged options.
    pub fn wants_watch(&self) -> bool {
        self.options
            .get("watch")
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }
}

/// Merge option layers; later layers win on key conflicts.
pub fn merge_options(layers: &[&BundleOptions]) -> BundleOptions {
    let mut merged = BundleOptions::new();
    for layer in layers {
        for (k, v) in layer.iter() {
            merged.insert(k.clone(), v.clone());
        }
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn obj(v: Value) -> BundleOptions {
        v.as_object().cloned().unwrap()
    }

    #[test]
    fn test_pattern_display_and_dir() {
        let src = EntrySource::pattern("handlers/hello");
        assert_eq!(src.to_string(), "handlers/hello.[jt]s");
        assert_eq!(src.dir(), PathBuf::from("handlers"));
        assert_eq!(EntrySource::pattern("hello").dir(), PathBuf::from("."));
    }

    #[test]
    fn test_pattern_resolves_first_existing_extension() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(tmp.path().join("src")).unwrap();
        std::fs::write(tmp.path().join("src").join("foo.ts"), "export {}").unwrap();

        let src = EntrySource::pattern("src/foo");
        assert_eq!(src.resolve(tmp.path()), Some(PathBuf::from("src/foo.ts")));
        assert_eq!(src.bundler_arg(tmp.path()), "./src/foo.ts");

        std::fs::write(tmp.path().join("src").join("foo.js"), "").unwrap();
        assert_eq!(src.resolve(tmp.path()), Some(PathBuf::from("src/foo.js")));
    }

    #[test]
    fn test_unresolved_pattern_passes_glob_through() {
        let tmp = tempfile::tempdir().unwrap();
        let src = EntrySource::pattern("src/missing");
        assert_eq!(src.resolve(tmp.path()), None);
        assert_eq!(src.bundler_arg(tmp.path()), "./src/missing.[jt]s");
    }

    #[test]
    fn test_file_entry_keeps_relative_prefix() {
        let tmp = tempfile::tempdir().unwrap();
        assert_eq!(
            EntrySource::File("./src/worker.ts".into()).bundler_arg(tmp.path()),
            "./src/worker.ts"
        );
    }

    #[test]
    fn test_merge_later_layers_win() {
        let defaults = obj(json!({"target": "node", "cache": false}));
        let user = obj(json!({"cache": true, "minify": false}));
        let forced = obj(json!({"outDir": ".serverless_parcel/src"}));
        let merged = merge_options(&[&defaults, &user, &forced]);
        assert_eq!(
            Value::Object(merged),
            json!({"target": "node", "cache": true, "minify": false, "outDir": ".serverless_parcel/src"})
        );
    }

    #[test]
    fn test_job_out_dir_and_watch() {
        let job = BuildJob::new(
            JobOrigin::Function("hello".into()),
            EntrySource::pattern("hello"),
            obj(json!({"outDir": ".serverless_parcel", "watch": true})),
        );
        assert_eq!(job.out_dir(), Some(Path::new(".serverless_parcel")));
        assert!(job.wants_watch());
        assert_eq!(job.origin.to_string(), "function hello");
    }

    #[test]
    fn test_job_serializes_source_as_pattern() {
        let job = BuildJob::new(
            JobOrigin::Custom("src/w.ts".into()),
            EntrySource::File("src/w.ts".into()),
            BundleOptions::new(),
        );
        let v = serde_json::to_value(&job).unwrap();
        assert_eq!(v["source"], json!("src/w.ts"));
        assert_eq!(v["origin"], json!({"kind": "custom", "name": "src/w.ts"}));
    }
}
