//! 环境变量 key 常量与别名定义
//!
//! 主变量优先使用 `SLSPARCEL_*`，兼容 `PARCEL_*` 等。

/// 构建目录与部署目录
pub mod build {
    /// 临时构建目录名（相对 service 根目录）
    pub const SLSPARCEL_BUILD_FOLDER: &str = "SLSPARCEL_BUILD_FOLDER";
    pub const BUILD_FOLDER_ALIASES: &[&str] = &["SLSPARCEL_BUILD_DIR"];

    /// 部署目录名（相对 service 根目录）
    pub const SLSPARCEL_DEPLOY_FOLDER: &str = "SLSPARCEL_DEPLOY_FOLDER";

    /// 打包失败时保留不完整的构建目录（调试用）
    pub const SLSPARCEL_KEEP_BUILD_ON_FAILURE: &str = "SLSPARCEL_KEEP_BUILD_ON_FAILURE";
}

/// Parcel 可执行文件与并发
pub mod bundler {
    pub const SLSPARCEL_PARCEL_BIN: &str = "SLSPARCEL_PARCEL_BIN";
    pub const PARCEL_BIN_ALIASES: &[&str] = &["PARCEL_BIN"];

    /// 最大并发打包任务数，默认：可用 CPU 并行度
    pub const SLSPARCEL_JOBS: &str = "SLSPARCEL_JOBS";
}

/// 可观测性与日志
pub mod observability {
    pub const SLSPARCEL_QUIET: &str = "SLSPARCEL_QUIET";

    pub const SLSPARCEL_LOG_LEVEL: &str = "SLSPARCEL_LOG_LEVEL";
    pub const LOG_LEVEL_ALIASES: &[&str] = &["SLS_PARCEL_LOG_LEVEL"];

    pub const SLSPARCEL_LOG_JSON: &str = "SLSPARCEL_LOG_JSON";
}
