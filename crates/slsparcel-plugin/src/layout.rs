//! Where a packaging cycle reads and writes.

use std::path::{Component, Path, PathBuf};

use slsparcel_core::config::BuildConfig;
use slsparcel_core::PackError;
use slsparcel_fs::relative_to;

/// Directories of one packaging cycle, all derived from the service root the
/// host reported when the plugin was created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildLayout {
    pub service_root: PathBuf,
    /// Temporary build root; deleted at the end of every cycle.
    pub build_root: PathBuf,
    /// Canonical deploy folder receiving the final artifacts.
    pub deploy_dir: PathBuf,
}

impl BuildLayout {
    /// The build folder must stay strictly inside the service root, since the
    /// whole tree is removed recursively at cleanup.
    pub fn new(service_root: &Path, config: &BuildConfig) -> Result<Self, PackError> {
        let build_root = service_root.join(&config.build_folder);
        let rel = relative_to(service_root, &build_root);
        let escapes = rel
            .components()
            .next()
            .map_or(true, |c| !matches!(c, Component::Normal(_)));
        if config.build_folder.trim().is_empty() || escapes {
            return Err(PackError::config(format!(
                "build folder '{}' must be a sub-directory of the service root",
                config.build_folder
            )));
        }
        if config.deploy_folder.trim().is_empty() {
            return Err(PackError::config("deploy folder must not be empty"));
        }
        Ok(Self {
            service_root: service_root.to_path_buf(),
            build_root: slsparcel_fs::normalize(&build_root),
            deploy_dir: slsparcel_fs::normalize(&service_root.join(&config.deploy_folder)),
        })
    }

    /// Build root relative to the service root (e.g. `.serverless_parcel`).
    pub fn build_root_rel(&self) -> PathBuf {
        relative_to(&self.service_root, &self.build_root)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg(build: &str) -> BuildConfig {
        BuildConfig {
            build_folder: build.to_string(),
            ..BuildConfig::default()
        }
    }

    #[test]
    fn test_default_layout() {
        let layout = BuildLayout::new(Path::new("/srv/app"), &BuildConfig::default()).unwrap();
        assert_eq!(layout.build_root, PathBuf::from("/srv/app/.serverless_parcel"));
        assert_eq!(layout.deploy_dir, PathBuf::from("/srv/app/.serverless"));
        assert_eq!(layout.build_root_rel(), PathBuf::from(".serverless_parcel"));
    }

    #[test]
    fn test_build_folder_may_not_escape_service_root() {
        for bad in ["", ".", "..", "../elsewhere", "/tmp/build", "a/../.."] {
            assert!(
                BuildLayout::new(Path::new("/srv/app"), &cfg(bad)).is_err(),
                "accepted {:?}",
                bad
            );
        }
        assert!(BuildLayout::new(Path::new("/srv/app"), &cfg("build/parcel")).is_ok());
    }
}
