//! Move packaged artifacts from the redirected build tree into the deploy
//! folder and point each function at its new location.

use std::path::{Path, PathBuf};

use slsparcel_core::{PackError, Service};
use slsparcel_fs::{move_overwrite, FsError};

/// One pending move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relocation {
    pub function: String,
    pub from: PathBuf,
    pub to: PathBuf,
}

/// Compute every move and check that each source exists, without touching
/// anything. A relative artifact is resolved against the current (redirected)
/// service path.
pub fn plan(service: &Service, functions: &[String], deploy_dir: &Path) -> Result<Vec<Relocation>, PackError> {
    let mut moves = Vec::with_capacity(functions.len());
    for name in functions {
        let spec = service
            .functions
            .get(name)
            .ok_or_else(|| PackError::Cycle(format!("function '{}' disappeared during packaging", name)))?;
        let artifact = spec
            .package
            .artifact
            .as_ref()
            .ok_or_else(|| PackError::MissingArtifact(name.clone()))?;

        let from = if artifact.is_absolute() {
            artifact.clone()
        } else {
            service.service_path.get().join(artifact)
        };
        let file_name = from.file_name().ok_or_else(|| PackError::Relocation {
            function: name.clone(),
            artifact: artifact.clone(),
            source: FsError::NotFound(from.clone()),
        })?;
        if !from.exists() {
            return Err(PackError::Relocation {
                function: name.clone(),
                artifact: artifact.clone(),
                source: FsError::NotFound(from.clone()),
            });
        }

        moves.push(Relocation {
            function: name.clone(),
            to: deploy_dir.join(file_name),
            from,
        });
    }
    Ok(moves)
}

/// Perform the moves in order, updating each function's artifact as soon as
/// its move succeeds. Stops at the first failure; earlier moves stay done.
pub fn apply(service: &mut Service, moves: Vec<Relocation>) -> Result<usize, PackError> {
    let mut done = 0;
    for mv in moves {
        move_overwrite(&mv.from, &mv.to).map_err(|source| PackError::Relocation {
            function: mv.function.clone(),
            artifact: mv.from.clone(),
            source,
        })?;
        tracing::debug!("{}: artifact moved to {}", mv.function, mv.to.display());
        if let Some(spec) = service.functions.get_mut(&mv.function) {
            spec.package.artifact = Some(mv.to);
        }
        done += 1;
    }
    Ok(done)
}

/// `plan` then `apply`: a missing artifact is detected before anything moves.
pub fn relocate_artifacts(
    service: &mut Service,
    functions: &[String],
    deploy_dir: &Path,
) -> Result<usize, PackError> {
    let moves = plan(service, functions, deploy_dir)?;
    apply(service, moves)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn service_with_artifacts(root: &Path, artifacts: &[(&str, Option<&str>)]) -> Service {
        let mut svc = Service::new("svc", root);
        for (name, artifact) in artifacts {
            svc = svc.with_function(name, &format!("{}.handler", name));
            svc.functions.get_mut(*name).unwrap().package.artifact = artifact.map(PathBuf::from);
        }
        svc
    }

    #[test]
    fn test_relocates_and_updates_artifact_fields() {
        let tmp = tempfile::tempdir().unwrap();
        let build = tmp.path().join(".serverless_parcel").join(".serverless");
        fs::create_dir_all(&build).unwrap();
        fs::write(build.join("a.zip"), "a").unwrap();
        fs::write(build.join("b.zip"), "b").unwrap();
        let a = build.join("a.zip").to_string_lossy().to_string();
        let mut svc = service_with_artifacts(tmp.path(), &[("a", Some(a.as_str())), ("b", Some(".serverless_parcel/.serverless/b.zip"))]);

        let deploy = tmp.path().join(".serverless");
        let n = relocate_artifacts(&mut svc, &["a".into(), "b".into()], &deploy).unwrap();

        assert_eq!(n, 2);
        assert_eq!(svc.functions["a"].package.artifact, Some(deploy.join("a.zip")));
        assert_eq!(svc.functions["b"].package.artifact, Some(deploy.join("b.zip")));
        assert_eq!(fs::read_to_string(deploy.join("b.zip")).unwrap(), "b");
        assert!(!build.join("a.zip").exists());
    }

    #[test]
    fn test_missing_source_moves_nothing() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join("a.zip"), "a").unwrap();
        let mut svc = service_with_artifacts(tmp.path(), &[("a", Some("a.zip")), ("b", Some("gone.zip"))]);

        let deploy = tmp.path().join(".serverless");
        let err = relocate_artifacts(&mut svc, &["a".into(), "b".into()], &deploy).unwrap_err();

        assert!(matches!(err, PackError::Relocation { ref function, .. } if function == "b"));
        assert!(tmp.path().join("a.zip").exists());
        assert_eq!(svc.functions["a"].package.artifact, Some(PathBuf::from("a.zip")));
    }

    #[test]
    fn test_function_without_artifact() {
        let tmp = tempfile::tempdir().unwrap();
        let mut svc = service_with_artifacts(tmp.path(), &[("a", None)]);
        let err = relocate_artifacts(&mut svc, &["a".into()], tmp.path()).unwrap_err();
        assert!(matches!(err, PackError::MissingArtifact(ref f) if f == "a"));
    }

    #[test]
    fn test_apply_stops_at_first_failure_without_rollback() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join("a.zip"), "a").unwrap();
        let mut svc = service_with_artifacts(tmp.path(), &[("a", Some("a.zip")), ("b", Some("b.zip"))]);
        let deploy = tmp.path().join("deploy");
        let moves = vec![
            Relocation {
                function: "a".into(),
                from: tmp.path().join("a.zip"),
                to: deploy.join("a.zip"),
            },
            Relocation {
                function: "b".into(),
                from: tmp.path().join("b.zip"),
                to: deploy.join("b.zip"),
            },
        ];

        assert!(apply(&mut svc, moves).is_err());
        assert_eq!(svc.functions["a"].package.artifact, Some(deploy.join("a.zip")));
        assert_eq!(svc.functions["b"].package.artifact, Some(PathBuf::from("b.zip")));
    }
}
