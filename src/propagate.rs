use std::fs::{self, File};
use std::io;
use std::path::Path;

use tempfile::NamedTempFile;

use crate::config::Sidecar;
use crate::detect::Conflict;
use crate::error::SyncError;
use crate::resolve::Resolution;

/// FileOperations allow the client to customize how files are replaced/deleted.
pub trait FileOperations {
    /// Overwrites `destination` with the contents of `source`.
    /// On failure `destination` must be left exactly as it was.
    fn replace_file(&self, source: &Path, destination: &Path) -> io::Result<()>;

    /// Deletes the file, or moves it to the trash.
    /// This must return an error if the file was not removed.
    fn remove_file(&self, path: &Path) -> io::Result<()>;

    /// Removes the directory if it has no entries left. Returns whether it was removed.
    fn remove_dir_if_empty(&self, path: &Path) -> io::Result<bool>;
}

/// A zero-sized struct implementing FileOperations on the local file system.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultFileOperations;

impl FileOperations for DefaultFileOperations {
    fn replace_file(&self, source: &Path, destination: &Path) -> io::Result<()> {
        let parent = match destination.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let needed = fs::metadata(source)?.len();
        let available = fs2::available_space(parent)?;
        if needed > available {
            return Err(io::Error::new(
                io::ErrorKind::Other,
                format!(
                    "not enough space in {:?}: {} bytes needed, {} available",
                    parent, needed, available
                ),
            ));
        }

        // written next to the destination so the final rename stays on one file system
        let mut temp = NamedTempFile::new_in(parent)?;
        io::copy(&mut File::open(source)?, temp.as_file_mut())?;
        temp.as_file().sync_all()?;
        if let Ok(metadata) = fs::metadata(destination) {
            temp.as_file().set_permissions(metadata.permissions())?;
        }
        temp.persist(destination).map_err(|e| e.error)?;
        Ok(())
    }

    fn remove_file(&self, path: &Path) -> io::Result<()> {
        fs::remove_file(path)
    }

    fn remove_dir_if_empty(&self, path: &Path) -> io::Result<bool> {
        if fs::read_dir(path)?.next().is_some() {
            return Ok(false);
        }
        fs::remove_dir(path)?;
        Ok(true)
    }
}

/// Carries out `resolution` for a single conflict.
pub fn apply<O>(
    conflict: &Conflict,
    resolution: Resolution,
    sidecar: Option<&Sidecar>,
    operations: &O,
) -> Result<(), SyncError>
where
    O: FileOperations + ?Sized,
{
    let source = &conflict.source.path;
    let destination = &conflict.destination.path;

    match resolution {
        Resolution::Replace => {
            info!("Replacing {:?} with {:?}", destination, source);
            operations
                .replace_file(source, destination)
                .map_err(|error| SyncError::Replace {
                    source: source.clone(),
                    destination: destination.clone(),
                    error,
                })?;
            remove_with_sidecar(source, sidecar, operations)
        }
        Resolution::Skip => {
            info!("Discarding {:?}", source);
            remove_with_sidecar(source, sidecar, operations)
        }
        Resolution::KeepBoth => {
            debug!("Keeping both {:?} and {:?}", source, destination);
            Ok(())
        }
    }
}

fn remove_with_sidecar<O>(
    path: &Path,
    sidecar: Option<&Sidecar>,
    operations: &O,
) -> Result<(), SyncError>
where
    O: FileOperations + ?Sized,
{
    remove_file(path, operations)?;
    if let Some(sidecar) = sidecar {
        let sidecar_path = sidecar.path_for(path);
        if sidecar_path.exists() {
            remove_file(&sidecar_path, operations)?;
        }
    }
    Ok(())
}

fn remove_file<O>(path: &Path, operations: &O) -> Result<(), SyncError>
where
    O: FileOperations + ?Sized,
{
    info!("Removing file {:?}", path);
    // delegate the actual removal to the client
    operations
        .remove_file(path)
        .map_err(|error| SyncError::Delete {
            path: path.to_path_buf(),
            error,
        })
}
