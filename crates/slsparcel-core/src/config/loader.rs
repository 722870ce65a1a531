//! 统一环境变量加载逻辑
//!
//! 集中维护 fallback 链，避免在业务代码中重复 `or_else` 调用。

use std::env;
use std::path::Path;

/// 废弃变量 → 推荐变量映射（用于检测并提示迁移）
const DEPRECATED_PAIRS: &[(&str, &str)] = &[
    ("SLSPARCEL_BUILD_DIR", "SLSPARCEL_BUILD_FOLDER"),
    ("SLS_PARCEL_LOG_LEVEL", "SLSPARCEL_LOG_LEVEL"),
];

/// 检测废弃变量：若使用了废弃变量且未设置推荐变量，打印一次迁移提示
fn warn_deprecated_env_vars() {
    use std::sync::Once;
    static WARNED: Once = Once::new();
    WARNED.call_once(|| {
        let mut hints = Vec::new();
        for (deprecated, recommended) in DEPRECATED_PAIRS {
            if env::var(deprecated).is_ok() && env::var(recommended).is_err() {
                hints.push(format!("{} → {}", deprecated, recommended));
            }
        }
        if !hints.is_empty() {
            tracing::warn!(
                "[DEPRECATED] the following environment variables are deprecated:\n   {}",
                hints.join("\n   ")
            );
        }
    });
}

/// 加载当前目录下的 `.env` 到环境变量（不覆盖已存在的变量）
pub fn load_dotenv() {
    use std::sync::Once;
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let dir = env::current_dir().unwrap_or_else(|_| std::path::PathBuf::from("."));
        apply_dotenv_file(&dir.join(".env"));
        warn_deprecated_env_vars();
    });
}

/// 加载指定目录（通常是 service 根目录）下的 `.env`，不覆盖已存在的变量。
///
/// 必须在启动 rayon 线程池之前调用。
pub fn load_dotenv_from_dir(dir: &Path) {
    apply_dotenv_file(&dir.join(".env"));
    warn_deprecated_env_vars();
}

fn apply_dotenv_file(path: &Path) {
    let Ok(content) = std::fs::read_to_string(path) else {
        return;
    };
    for (key, value) in parse_dotenv(&content) {
        if env::var(&key).is_err() {
            env::set_var(&key, value);
        }
    }
}

/// 解析 `KEY=value` 行：跳过空行与 `#` 注释，去掉引号，丢弃未加引号的行尾 `# 注释`
pub(crate) fn parse_dotenv(content: &str) -> Vec<(String, String)> {
    let mut pairs = Vec::new();
    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let line = line.strip_prefix("export ").unwrap_or(line);
        let Some(eq_pos) = line.find('=') else {
            continue;
        };
        let key = line[..eq_pos].trim();
        let mut value = line[eq_pos + 1..].trim();
        if let Some(hash_pos) = value.find('#') {
            let before_hash = value[..hash_pos].trim_end();
            if !before_hash.contains('"') && !before_hash.contains('\'') {
                value = before_hash;
            }
        }
        if value.len() >= 2
            && ((value.starts_with('"') && value.ends_with('"'))
                || (value.starts_with('\'') && value.ends_with('\'')))
        {
            value = &value[1..value.len() - 1];
        }
        if !key.is_empty() {
            pairs.push((key.to_string(), value.to_string()));
        }
    }
    pairs
}

/// 从主变量或别名链读取环境变量，失败时使用默认值
pub fn env_or<F>(primary: &str, aliases: &[&str], default: F) -> String
where
    F: FnOnce() -> String,
{
    env::var(primary)
        .ok()
        .or_else(|| aliases.iter().find_map(|a| env::var(a).ok()))
        .filter(|s| !s.is_empty())
        .unwrap_or_else(default)
}

/// 从主变量或别名链读取，返回 Option（空值视为未设置）
pub fn env_optional(primary: &str, aliases: &[&str]) -> Option<String> {
    env::var(primary)
        .ok()
        .or_else(|| aliases.iter().find_map(|a| env::var(a).ok()))
        .and_then(|s| {
            let s = s.trim().to_string();
            if s.is_empty() {
                None
            } else {
                Some(s)
            }
        })
}

/// 解析布尔型环境变量：0/false/no/off 为 false，其余非空值为 true
pub fn env_bool(primary: &str, aliases: &[&str], default: bool) -> bool {
    let v = env::var(primary)
        .ok()
        .or_else(|| aliases.iter().find_map(|a| env::var(a).ok()));
    match v.as_deref() {
        Some(s) => !matches!(
            s.trim().to_lowercase().as_str(),
            "0" | "false" | "no" | "off"
        ),
        None => default,
    }
}

/// 解析正整数环境变量；无法解析或为 0 时返回 None
pub fn env_usize(primary: &str, aliases: &[&str]) -> Option<usize> {
    env_optional(primary, aliases)
        .and_then(|s| s.parse::<usize>().ok())
        .filter(|n| *n > 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_dotenv_strips_quotes_and_comments() {
        let content = r#"
# comment
SLSPARCEL_JOBS=4 # inline
export SLSPARCEL_PARCEL_BIN="/opt/parcel/bin/parcel"
SLSPARCEL_LOG_LEVEL='slsparcel=debug'
NOEQUALS
"#;
        let pairs = parse_dotenv(content);
        assert_eq!(
            pairs,
            vec![
                ("SLSPARCEL_JOBS".to_string(), "4".to_string()),
                (
                    "SLSPARCEL_PARCEL_BIN".to_string(),
                    "/opt/parcel/bin/parcel".to_string()
                ),
                (
                    "SLSPARCEL_LOG_LEVEL".to_string(),
                    "slsparcel=debug".to_string()
                ),
            ]
        );
    }

    #[test]
    fn test_env_bool_and_alias_fallback() {
        env::set_var("SLSPARCEL_TEST_BOOL_ALIAS", "off");
        assert!(!env_bool("SLSPARCEL_TEST_BOOL_PRIMARY", &["SLSPARCEL_TEST_BOOL_ALIAS"], true));
        assert!(env_bool("SLSPARCEL_TEST_BOOL_UNSET", &[], true));
        env::remove_var("SLSPARCEL_TEST_BOOL_ALIAS");
    }

    #[test]
    fn test_env_usize_rejects_zero() {
        env::set_var("SLSPARCEL_TEST_USIZE_ZERO", "0");
        assert_eq!(env_usize("SLSPARCEL_TEST_USIZE_ZERO", &[]), None);
        env::set_var("SLSPARCEL_TEST_USIZE_ZERO", "3");
        assert_eq!(env_usize("SLSPARCEL_TEST_USIZE_ZERO", &[]), Some(3));
        env::remove_var("SLSPARCEL_TEST_USIZE_ZERO");
    }
}
