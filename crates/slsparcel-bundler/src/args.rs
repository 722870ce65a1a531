//! Translate a bundler option object into `parcel build` arguments.
//!
//! camelCase keys become `--kebab-case` flags. Booleans become bare flags:
//! options parcel enables by default only ever emit `--no-<flag>`, options it
//! disables by default only ever emit `--<flag>`.

use serde_json::Value;

use crate::job::BundleOptions;

/// Options parcel turns on unless told otherwise.
const DEFAULT_ON: &[&str] = &[
    "cache",
    "minify",
    "sourceMaps",
    "contentHash",
    "autoinstall",
    "hmr",
];

/// Keys that never reach the command line.
const SKIPPED: &[&str] = &["file", "watch", "production"];

/// Keys whose flag name does not follow the kebab-case rule.
const RENAMED: &[(&str, &str)] = &[("scopeHoist", "experimental-scope-hoisting")];

/// `parcel build <entry> ...flags`
pub fn parcel_args(entry: &str, options: &BundleOptions) -> Vec<String> {
    let mut args = vec!["build".to_string(), entry.to_string()];
    for (key, value) in options {
        if SKIPPED.contains(&key.as_str()) {
            continue;
        }
        let flag = flag_name(key);
        match value {
            Value::Bool(true) if DEFAULT_ON.contains(&key.as_str()) => {}
            Value::Bool(true) => args.push(format!("--{}", flag)),
            Value::Bool(false) if DEFAULT_ON.contains(&key.as_str()) => {
                args.push(format!("--no-{}", flag))
            }
            Value::Bool(false) => {}
            Value::String(s) => {
                args.push(format!("--{}", flag));
                args.push(s.clone());
            }
            Value::Number(n) => {
                args.push(format!("--{}", flag));
                args.push(n.to_string());
            }
            Value::Null | Value::Array(_) | Value::Object(_) => {
                tracing::debug!("option '{}' has no command-line form, skipped", key);
            }
        }
    }
    args
}

fn flag_name(key: &str) -> String {
    if let Some((_, renamed)) = RENAMED.iter().find(|(k, _)| *k == key) {
        return renamed.to_string();
    }
    let mut out = String::with_capacity(key.len() + 4);
    for c in key.chars() {
        if c.is_ascii_uppercase() {
            if !out.is_empty() {
                out.push('-');
            }
            out.push(c.to_ascii_lowercase());
        } else if c == '_' {
            out.push('-');
        } else {
            out.push(c);
        }
    }
    out
}
