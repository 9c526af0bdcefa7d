use std::path::{Component, Path, PathBuf};

use crate::error::SyncError;

pub use fnv::{FnvHashMap, FnvHashSet};

/// Lexically resolves `.` and `..` components. A `..` that would climb above
/// the start of a relative path is kept.
pub fn normalize(path: &Path) -> PathBuf {
    let mut result = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                let can_pop = match result.components().next_back() {
                    Some(Component::Normal(_)) => true,
                    _ => false,
                };
                if can_pop {
                    result.pop();
                } else if !result.has_root() {
                    result.push("..");
                }
            }
            other => result.push(other.as_os_str()),
        }
    }
    result
}

/// Makes `path` relative to `base`, returning the forward-slash form used as the
/// join key between two trees.
pub fn relative_to(path: &Path, base: &Path) -> Result<String, SyncError> {
    let outside = || SyncError::OutsideBase {
        path: path.to_path_buf(),
        base: base.to_path_buf(),
    };

    let normalized = normalize(path);
    let relative = normalized
        .strip_prefix(normalize(base))
        .map_err(|_| outside())?;

    let mut parts = Vec::new();
    for component in relative.components() {
        match component {
            Component::Normal(part) => parts.push(part.to_string_lossy().into_owned()),
            _ => return Err(outside()),
        }
    }
    Ok(parts.join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_removes_dots() {
        assert_eq!(normalize(Path::new("/a/./b/../c")), Path::new("/a/c"));
        assert_eq!(normalize(Path::new("a/../../b")), Path::new("../b"));
        assert_eq!(normalize(Path::new("/../a")), Path::new("/a"));
    }

    #[test]
    fn relative_paths_use_forward_slashes() {
        let rel = relative_to(Path::new("/base/foo/./bar.txt"), Path::new("/base")).unwrap();
        assert_eq!(rel, "foo/bar.txt");
    }

    #[test]
    fn relative_path_of_the_base_is_empty() {
        assert_eq!(relative_to(Path::new("/base/"), Path::new("/base")).unwrap(), "");
    }

    #[test]
    fn escaping_the_base_is_rejected() {
        match relative_to(Path::new("/base/../other/x"), Path::new("/base")) {
            Err(SyncError::OutsideBase { .. }) => {}
            other => panic!("unexpected {:?}", other),
        }
        assert!(relative_to(Path::new("/elsewhere/x"), Path::new("/base")).is_err());
    }
}
