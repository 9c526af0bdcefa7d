use std::path::{Path, PathBuf};

use crate::config::ReconcileInfo;
use crate::error::SyncError;
use crate::propagate::FileOperations;
use crate::snapshot::TreeSnapshot;
use crate::util::FnvHashSet;

/// Removes the directories under the source's directory roots that held nothing
/// but files which have since been consumed (replaced into the destination or skipped).
/// Directories that still contain anything are left alone.
///
/// Failures don't stop the cleanup; they are returned.
pub fn remove_consumed_directories<'a, I, O>(
    source: &TreeSnapshot,
    consumed: I,
    info: &ReconcileInfo,
    operations: &O,
) -> Vec<SyncError>
where
    I: IntoIterator<Item = &'a Path>,
    O: FileOperations + ?Sized,
{
    let mut candidates: FnvHashSet<PathBuf> = Default::default();
    for file in consumed {
        let root = match source
            .directory_roots()
            .iter()
            .find(|root| file.starts_with(root))
        {
            Some(root) => root,
            None => continue,
        };
        for ancestor in file.ancestors().skip(1) {
            if !ancestor.starts_with(root) {
                break;
            }
            candidates.insert(ancestor.to_path_buf());
        }
    }

    // deepest first, so a parent is only looked at once its children are gone
    let mut candidates: Vec<PathBuf> = candidates.into_iter().collect();
    candidates.sort_by(|a, b| {
        b.components()
            .count()
            .cmp(&a.components().count())
            .then_with(|| a.cmp(b))
    });

    let mut errors = Vec::new();
    for directory in candidates {
        if info.renames.is_protected(&directory) {
            debug!("Not removing pre-existing directory {:?}", directory);
            continue;
        }
        if !directory.is_dir() {
            continue;
        }

        match operations.remove_dir_if_empty(&directory) {
            Ok(true) => {
                info!("Removed emptied directory {:?}", directory);
                if let Some(ref sidecar) = info.sidecar {
                    let sidecar_path = sidecar.path_for(&directory);
                    if sidecar_path.is_file() {
                        info!("Removing file {:?}", sidecar_path);
                        if let Err(error) = operations.remove_file(&sidecar_path) {
                            warn!("Couldn't remove {:?}: {}", sidecar_path, error);
                            errors.push(SyncError::Delete {
                                path: sidecar_path,
                                error,
                            });
                        }
                    }
                }
            }
            Ok(false) => trace!("{:?} still has contents, keeping it", directory),
            Err(error) => {
                warn!("Couldn't remove directory {:?}: {}", directory, error);
                errors.push(SyncError::Delete {
                    path: directory,
                    error,
                });
            }
        }
    }
    errors
}
