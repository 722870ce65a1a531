//! Lexical path helpers. Nothing here touches the filesystem.

use std::path::{Component, Path, PathBuf};

/// Resolve `.` and `..` components without consulting the filesystem.
///
/// A leading `..` on a relative path is kept; `..` above the root of an
/// absolute path is dropped.
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for comp in path.components() {
        match comp {
            Component::CurDir => {}
            Component::ParentDir => {
                let last = out.components().next_back();
                match last {
                    Some(Component::Normal(_)) => {
                        out.pop();
                    }
                    Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                    _ => out.push(".."),
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Path of `path` relative to `base`, computed lexically.
///
/// Both inputs should be either absolute or relative to the same directory.
/// Returns `.` when they are equal.
pub fn relative_to(base: &Path, path: &Path) -> PathBuf {
    let base = normalize(base);
    let path = normalize(path);

    let base_parts: Vec<Component<'_>> = base.components().collect();
    let path_parts: Vec<Component<'_>> = path.components().collect();
    let common = base_parts
        .iter()
        .zip(path_parts.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut rel = PathBuf::new();
    for _ in common..base_parts.len() {
        rel.push("..");
    }
    for part in &path_parts[common..] {
        rel.push(part.as_os_str());
    }
    if rel.as_os_str().is_empty() {
        PathBuf::from(".")
    } else {
        rel
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize() {
        assert_eq!(normalize(Path::new("a/./b/../c")), PathBuf::from("a/c"));
        assert_eq!(normalize(Path::new("../a")), PathBuf::from("../a"));
        assert_eq!(normalize(Path::new("/../a")), PathBuf::from("/a"));
        assert_eq!(normalize(Path::new("./")), PathBuf::new());
    }

    #[test]
    fn test_relative_to_child() {
        assert_eq!(
            relative_to(Path::new("/srv/app"), Path::new("/srv/app/.serverless_parcel/handlers")),
            PathBuf::from(".serverless_parcel/handlers")
        );
    }

    #[test]
    fn test_relative_to_sibling_and_same() {
        assert_eq!(
            relative_to(Path::new("/srv/app/a"), Path::new("/srv/app/b/c")),
            PathBuf::from("../b/c")
        );
        assert_eq!(relative_to(Path::new("/srv/app"), Path::new("/srv/app/")), PathBuf::from("."));
    }

    #[test]
    fn test_relative_to_ignores_cur_dir_segments() {
        assert_eq!(
            relative_to(Path::new("/srv/app"), Path::new("/srv/app/.serverless_parcel/.")),
            PathBuf::from(".serverless_parcel")
        );
    }
}
