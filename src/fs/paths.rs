//! Lexical path resolution.
//!
//! Inventory paths often name directories that do not exist yet, so they are
//! normalised lexically rather than through `fs::canonicalize`.

use std::path::{Component, Path, PathBuf};

/// Remove `.` components and fold `..` into the preceding component.
///
/// `..` directly under the root is dropped; leading `..` on a relative path
/// is kept.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => out.push(".."),
            },
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Resolve `maybe_relative` against `base` and normalise the result.
pub fn resolve_relative<P: AsRef<Path>>(base: &Path, maybe_relative: P) -> PathBuf {
    normalize_path(&base.join(maybe_relative.as_ref()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_folds_parent_and_current() {
        assert_eq!(
            normalize_path(Path::new("/srv/inventory/../instances/./core/config")),
            PathBuf::from("/srv/instances/core/config")
        );
    }

    #[test]
    fn test_normalize_parent_at_root_is_dropped() {
        assert_eq!(normalize_path(Path::new("/../etc")), PathBuf::from("/etc"));
    }

    #[test]
    fn test_normalize_relative_keeps_leading_parent() {
        assert_eq!(normalize_path(Path::new("../a/./b/..")), PathBuf::from("../a"));
    }

    #[test]
    fn test_resolve_relative_with_absolute_target() {
        assert_eq!(
            resolve_relative(Path::new("/srv/inventory"), "/opt/cfg/../base.json5"),
            PathBuf::from("/opt/base.json5")
        );
    }

    #[test]
    fn test_equivalent_spellings_resolve_equal() {
        let base = Path::new("/srv/inventory");
        assert_eq!(
            resolve_relative(base, "../instances/core/state"),
            resolve_relative(base, "./../instances/core/./state/")
        );
    }
}
