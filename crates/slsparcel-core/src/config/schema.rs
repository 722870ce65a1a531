//! 按领域分组的配置结构体
//!
//! 从环境变量加载，统一 fallback 逻辑。

use super::env_keys::{build as build_keys, bundler as bundler_keys, observability as obv_keys};
use super::loader::{env_bool, env_optional, env_or, env_usize};

/// 默认临时构建目录（相对 service 根目录）
pub const DEFAULT_BUILD_FOLDER: &str = ".serverless_parcel";
/// 默认部署目录（相对 service 根目录）
pub const DEFAULT_DEPLOY_FOLDER: &str = ".serverless";

/// 构建配置：build/deploy 目录名、parcel 路径、并发数
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildConfig {
    pub build_folder: String,
    pub deploy_folder: String,
    /// 显式指定的 parcel 可执行文件；`None` 表示自动探测
    pub parcel_bin: Option<String>,
    pub jobs: usize,
    pub keep_build_on_failure: bool,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            build_folder: DEFAULT_BUILD_FOLDER.to_string(),
            deploy_folder: DEFAULT_DEPLOY_FOLDER.to_string(),
            parcel_bin: None,
            jobs: default_jobs(),
            keep_build_on_failure: false,
        }
    }
}

impl BuildConfig {
    /// 从环境变量加载，空值使用默认（会自动加载 .env）
    pub fn from_env() -> Self {
        super::loader::load_dotenv();
        Self {
            build_folder: env_or(
                build_keys::SLSPARCEL_BUILD_FOLDER,
                build_keys::BUILD_FOLDER_ALIASES,
                || DEFAULT_BUILD_FOLDER.to_string(),
            ),
            deploy_folder: env_or(build_keys::SLSPARCEL_DEPLOY_FOLDER, &[], || {
                DEFAULT_DEPLOY_FOLDER.to_string()
            }),
            parcel_bin: env_optional(
                bundler_keys::SLSPARCEL_PARCEL_BIN,
                bundler_keys::PARCEL_BIN_ALIASES,
            ),
            jobs: env_usize(bundler_keys::SLSPARCEL_JOBS, &[]).unwrap_or_else(default_jobs),
            keep_build_on_failure: env_bool(
                build_keys::SLSPARCEL_KEEP_BUILD_ON_FAILURE,
                &[],
                false,
            ),
        }
    }

    /// CLI 参数覆盖环境变量
    pub fn with_cli_overrides(mut self, jobs: Option<usize>, parcel_bin: Option<String>) -> Self {
        if let Some(n) = jobs.filter(|n| *n > 0) {
            self.jobs = n;
        }
        if parcel_bin.is_some() {
            self.parcel_bin = parcel_bin;
        }
        self
    }
}

fn default_jobs() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

/// 可观测性配置：quiet、log_level、log_json
#[derive(Debug, Clone)]
pub struct ObservabilityConfig {
    pub quiet: bool,
    pub log_level: String,
    pub log_json: bool,
}

impl ObservabilityConfig {
    pub fn from_env() -> &'static Self {
        use std::sync::OnceLock;
        static CACHE: OnceLock<ObservabilityConfig> = OnceLock::new();
        CACHE.get_or_init(|| {
            super::loader::load_dotenv();
            Self {
                quiet: env_bool(obv_keys::SLSPARCEL_QUIET, &[], false),
                log_level: env_or(
                    obv_keys::SLSPARCEL_LOG_LEVEL,
                    obv_keys::LOG_LEVEL_ALIASES,
                    || "slsparcel=info".to_string(),
                ),
                log_json: env_bool(obv_keys::SLSPARCEL_LOG_JSON, &[], false),
            }
        })
    }
}
