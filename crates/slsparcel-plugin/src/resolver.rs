//! Entry resolution: turn the service definition into the list of build jobs
//! for one packaging cycle.
//!
//! Resolution is pure. It reads the service and the layout, touches nothing
//! on disk, and any error aborts the cycle before the first bundler call.

use serde_json::{json, Value};
use std::path::Path;

use slsparcel_bundler::{merge_options, BuildJob, BundleOptions, EntrySource, JobOrigin};
use slsparcel_bundler::job::OUT_DIR_KEY;
use slsparcel_core::{CustomEntry, FunctionSpec, PackError, ParcelConfig, Service};
use slsparcel_fs::relative_to;

use crate::layout::BuildLayout;

/// Which functions a cycle covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    All,
    /// Single-function deploy.
    Function(String),
}

/// A handler split into module path and exported symbol:
/// `handlers/hello.handler` → (`handlers/hello`, `handler`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerRef {
    pub module: String,
    pub symbol: String,
}

impl HandlerRef {
    /// Source entry matching any supported script extension.
    pub fn entry(&self) -> EntrySource {
        EntrySource::pattern(self.module.clone())
    }
}

pub fn parse_handler(handler: &str) -> Result<HandlerRef, PackError> {
    let (dir, base) = match handler.rfind(['/', '\\']) {
        Some(i) => (&handler[..=i], &handler[i + 1..]),
        None => ("", handler),
    };
    let malformed = |why: &str| {
        PackError::config(format!(
            "handler '{}' {} (expected <module-path>.<exported-symbol>)",
            handler, why
        ))
    };
    let (module, symbol) = base
        .rsplit_once('.')
        .ok_or_else(|| malformed("has no extension segment"))?;
    if module.is_empty() {
        return Err(malformed("has an empty module name"));
    }
    if symbol.is_empty() {
        return Err(malformed("has an empty exported symbol"));
    }
    Ok(HandlerRef {
        module: format!("{}{}", dir, module),
        symbol: symbol.to_string(),
    })
}

/// Built-in defaults for function entries (lowest precedence).
pub fn function_defaults() -> BundleOptions {
    to_options(json!({
        "target": "node",
        "cache": false,
        "watch": false,
        "bundleNodeModules": true,
    }))
}

/// Built-in defaults for custom entries.
pub fn custom_defaults() -> BundleOptions {
    to_options(json!({
        "cache": false,
        "watch": false,
    }))
}

fn to_options(v: Value) -> BundleOptions {
    match v {
        Value::Object(map) => map,
        _ => BundleOptions::new(),
    }
}

/// One job per function: `outDir` is the entry's directory mirrored under the
/// build root, relative to the service root, and always wins over user options.
pub fn resolve_function_job(
    spec: &FunctionSpec,
    parcel: &ParcelConfig,
    layout: &BuildLayout,
) -> Result<BuildJob, PackError> {
    let handler = spec.handler.as_deref().ok_or_else(|| {
        PackError::config(format!("function '{}' has no handler", spec.name))
    })?;
    let source = parse_handler(handler)?.entry();

    let out_dir = relative_to(&layout.service_root, &layout.build_root.join(source.dir()));
    let mut forced = BundleOptions::new();
    forced.insert(OUT_DIR_KEY.to_string(), Value::String(path_string(&out_dir)));

    let options = merge_options(&[&function_defaults(), &parcel.options, &forced]);
    Ok(BuildJob::new(
        JobOrigin::Function(spec.name.clone()),
        source,
        options,
    ))
}

/// Custom entries keep their own destination; only cache/watch are defaulted.
pub fn resolve_custom_job(entry: &CustomEntry) -> Result<BuildJob, PackError> {
    if entry.file.trim().is_empty() {
        return Err(PackError::config("custom.parcel entry has an empty `file`"));
    }
    let options = merge_options(&[&custom_defaults(), &entry.options]);
    Ok(BuildJob::new(
        JobOrigin::Custom(entry.file.clone()),
        EntrySource::File(entry.file.clone()),
        options,
    ))
}

/// Names of the functions a selection covers, in service order.
pub fn selected_functions(service: &Service, selection: &Selection) -> Result<Vec<String>, PackError> {
    match selection {
        Selection::All => Ok(service.functions.keys().cloned().collect()),
        Selection::Function(name) if service.functions.contains_key(name) => Ok(vec![name.clone()]),
        Selection::Function(name) => Err(PackError::config(format!(
            "function '{}' is not defined in service '{}'",
            name, service.name
        ))),
    }
}

/// Every job for one cycle: selected functions (by name), then custom entries
/// in declaration order.
pub fn resolve_jobs(
    service: &Service,
    layout: &BuildLayout,
    selection: &Selection,
) -> Result<Vec<BuildJob>, PackError> {
    let parcel = service.parcel_config()?;
    let names = selected_functions(service, selection)?;

    let mut jobs = Vec::with_capacity(names.len() + parcel.entries.len());
    for name in &names {
        jobs.push(resolve_function_job(&service.functions[name], parcel, layout)?);
    }
    for entry in &parcel.entries {
        jobs.push(resolve_custom_job(entry)?);
    }
    tracing::debug!(
        "resolved {} function entries and {} custom entries",
        names.len(),
        parcel.entries.len()
    );
    Ok(jobs)
}

fn path_string(p: &Path) -> String {
    p.to_string_lossy().replace('\\', "/")
}
