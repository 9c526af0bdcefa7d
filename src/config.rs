use std::ffi::OsString;
use std::path::{Path, PathBuf};

use regex::Regex;

/// The configuration for a reconciliation run.
#[derive(Debug)]
pub struct ReconcileInfo {
    pub ignore: Ignore,
    pub sidecar: Option<Sidecar>,
    /// Byte-identical conflicts are resolved without asking the decider.
    pub compare_file_contents: bool,
    pub renames: RenameMap,
}

impl ReconcileInfo {
    pub fn new() -> Self {
        ReconcileInfo {
            ignore: Ignore::nothing(),
            sidecar: None,
            compare_file_contents: true,
            renames: RenameMap::default(),
        }
    }

    pub fn with_sidecar_suffix<S: Into<String>>(mut self, suffix: S) -> Self {
        self.sidecar = Some(Sidecar::new(suffix));
        self
    }

    /// Checks if the relative path should be left out of a snapshot.
    pub fn excludes(&self, relative_path: &Path) -> bool {
        if let Some(ref sidecar) = self.sidecar {
            if sidecar.is_sidecar(relative_path) {
                return true;
            }
        }
        self.ignore.is_ignored(relative_path)
    }
}

impl Default for ReconcileInfo {
    fn default() -> Self {
        ReconcileInfo::new()
    }
}

#[derive(Debug)]
/// Determines which files should be ignored when building snapshots.
pub struct Ignore {
    pub regexes: Vec<Regex>,
    pub paths: Vec<PathBuf>,
}

impl Ignore {
    /// An `Ignore` struct that ignores nothing
    pub fn nothing() -> Self {
        Ignore {
            regexes: Vec::new(),
            paths: Vec::new(),
        }
    }

    /// Regexes are matched against the forward-slash form of the path.
    pub fn is_ignored(&self, relative_path: &Path) -> bool {
        if self.paths.iter().any(|ignore| relative_path.starts_with(ignore)) {
            return true;
        }
        let as_str = relative_path.to_string_lossy().replace('\\', "/");
        self.regexes.iter().any(|ignore| ignore.is_match(&as_str))
    }
}

/// An auxiliary file stored next to a primary file, at the primary's path plus a fixed suffix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sidecar {
    pub suffix: String,
}

impl Sidecar {
    pub fn new<S: Into<String>>(suffix: S) -> Self {
        Sidecar {
            suffix: suffix.into(),
        }
    }

    pub fn path_for(&self, primary: &Path) -> PathBuf {
        let mut name: OsString = primary.as_os_str().to_owned();
        name.push(&self.suffix);
        PathBuf::from(name)
    }

    pub fn is_sidecar(&self, path: &Path) -> bool {
        !self.suffix.is_empty()
            && path
                .file_name()
                .map(|name| name.to_string_lossy().ends_with(&self.suffix))
                .unwrap_or(false)
    }
}

/// Directories the host renamed on arrival because a directory of the same name
/// already existed, stored as `(renamed, pre_existing)` pairs.
#[derive(Debug, Clone, Default)]
pub struct RenameMap {
    pairs: Vec<(PathBuf, PathBuf)>,
}

impl RenameMap {
    pub fn insert<P: Into<PathBuf>, Q: Into<PathBuf>>(&mut self, renamed: P, pre_existing: Q) {
        self.pairs.push((renamed.into(), pre_existing.into()));
    }

    /// Maps a path under a renamed directory back to the pre-existing location.
    pub fn to_pre_existing(&self, path: &Path) -> PathBuf {
        for &(ref renamed, ref pre_existing) in &self.pairs {
            if let Ok(rest) = path.strip_prefix(renamed) {
                return pre_existing.join(rest);
            }
        }
        path.to_path_buf()
    }

    /// True for a pre-existing directory and anything beneath it, unless the path
    /// actually lies under a renamed directory.
    pub fn is_protected(&self, path: &Path) -> bool {
        if self.to_pre_existing(path) != path {
            return false;
        }
        self.pairs
            .iter()
            .any(|&(_, ref pre_existing)| path.starts_with(pre_existing))
    }
}

/// A set of roots together with the directory their relative paths are computed from.
#[derive(Debug, Clone)]
pub struct Roots {
    pub paths: Vec<PathBuf>,
    pub base: PathBuf,
}

impl Roots {
    pub fn new<P: Into<PathBuf>>(paths: Vec<PathBuf>, base: P) -> Self {
        Roots {
            paths,
            base: base.into(),
        }
    }
}
