use std::fs;
use std::path::{Path, PathBuf};
use std::slice;

use serde::{Deserialize, Serialize};
use walkdir::WalkDir;

use crate::config::{Ignore, ReconcileInfo};
use crate::error::{DescribeIoError, SyncError};
use crate::util::relative_to;

/// A file on disk, along with its location relative to a base directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathEntry {
    /// Where the file actually lives
    pub path: PathBuf,
    /// Forward-slash path relative to the base; the key used to match two trees
    pub relative_path: String,
    pub file_name: String,
}

impl PathEntry {
    pub fn new(path: &Path, base: &Path) -> Result<Self, SyncError> {
        let relative_path = relative_to(path, base)?;
        Ok(PathEntry::with_relative_path(path, relative_path))
    }

    fn with_relative_path(path: &Path, relative_path: String) -> Self {
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        PathEntry {
            path: path.to_path_buf(),
            relative_path,
            file_name,
        }
    }
}

/// Decides which paths are left out of a snapshot. Receives the path relative to the base.
pub trait Exclude {
    fn is_excluded(&self, relative_path: &Path) -> bool;
}

impl<F> Exclude for F
where
    F: Fn(&Path) -> bool,
{
    fn is_excluded(&self, relative_path: &Path) -> bool {
        self(relative_path)
    }
}

impl Exclude for Ignore {
    fn is_excluded(&self, relative_path: &Path) -> bool {
        self.is_ignored(relative_path)
    }
}

impl Exclude for ReconcileInfo {
    fn is_excluded(&self, relative_path: &Path) -> bool {
        self.excludes(relative_path)
    }
}

/// Every file found beneath a set of roots at one point in time.
#[derive(Debug, Clone)]
pub struct TreeSnapshot {
    base: PathBuf,
    entries: Vec<PathEntry>,
    /// the roots that were directories
    directories: Vec<PathBuf>,
}

impl TreeSnapshot {
    /// Expands `roots` into the files beneath them. Directory contents are visited in
    /// file name order so the result is stable for a given file system.
    ///
    /// Every root is checked before any is walked, so a missing root fails the
    /// whole snapshot.
    pub fn build<P, E>(roots: &[P], base: &Path, exclude: &E) -> Result<TreeSnapshot, SyncError>
    where
        P: AsRef<Path>,
        E: Exclude + ?Sized,
    {
        for root in roots {
            if !root.as_ref().exists() {
                return Err(SyncError::RootDoesntExist(root.as_ref().to_path_buf()));
            }
        }

        let mut snapshot = TreeSnapshot::empty(base);
        for root in roots {
            let root = root.as_ref();
            let metadata = fs::metadata(root).describe(|| format!("when reading root {:?}", root))?;

            if metadata.is_dir() {
                snapshot.add_directory(root, exclude)?;
            } else {
                let relative_path = relative_to(root, base)?;
                if exclude.is_excluded(Path::new(&relative_path)) {
                    debug!("Excluding root {:?}", root);
                    continue;
                }
                trace!("Adding root file {:?}", root);
                snapshot
                    .entries
                    .push(PathEntry::with_relative_path(root, relative_path));
            }
        }

        info!(
            "Snapshot of {} root(s) under {:?} holds {} file(s)",
            roots.len(),
            base,
            snapshot.entries.len()
        );
        Ok(snapshot)
    }

    pub fn empty(base: &Path) -> Self {
        TreeSnapshot {
            base: base.to_path_buf(),
            entries: Vec::new(),
            directories: Vec::new(),
        }
    }

    /// Wraps a list of entries captured elsewhere, such as a host's own file index.
    pub fn from_entries(base: &Path, entries: Vec<PathEntry>) -> Self {
        TreeSnapshot {
            base: base.to_path_buf(),
            entries,
            directories: Vec::new(),
        }
    }

    fn add_directory<E>(&mut self, root: &Path, exclude: &E) -> Result<(), SyncError>
    where
        E: Exclude + ?Sized,
    {
        debug!("Reading dir {:?}", root);
        self.directories.push(root.to_path_buf());

        let mut walker = WalkDir::new(root)
            .sort_by(|a, b| a.file_name().cmp(b.file_name()))
            .into_iter();
        while let Some(item) = walker.next() {
            let item = item?;
            let relative_path = relative_to(item.path(), &self.base)?;

            if item.depth() > 0 && exclude.is_excluded(Path::new(&relative_path)) {
                debug!("Excluding {:?}", relative_path);
                if item.file_type().is_dir() {
                    walker.skip_current_dir();
                }
                continue;
            }

            if item.file_type().is_file() {
                trace!("Found file {:?}", item.path());
                self.entries
                    .push(PathEntry::with_relative_path(item.path(), relative_path));
            }
        }
        Ok(())
    }

    pub fn base(&self) -> &Path {
        &self.base
    }

    pub fn entries(&self) -> &[PathEntry] {
        &self.entries
    }

    pub fn iter(&self) -> slice::Iter<PathEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The roots of this snapshot that were directories.
    pub fn directory_roots(&self) -> &[PathBuf] {
        &self.directories
    }
}

impl<'a> IntoIterator for &'a TreeSnapshot {
    type Item = &'a PathEntry;
    type IntoIter = slice::Iter<'a, PathEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
