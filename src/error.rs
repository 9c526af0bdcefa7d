use std::error::Error;
use std::fmt;
use std::io;
use std::path::PathBuf;
use walkdir::Error as WalkDirError;

#[derive(Debug)]
pub enum SyncError {
    /// A declared root vanished before it could be snapshotted.
    RootDoesntExist(PathBuf),
    /// The path can't be expressed relative to the base directory without leaving it.
    OutsideBase { path: PathBuf, base: PathBuf },
    /// The destination could not be overwritten. It is left as it was before the attempt.
    Replace {
        source: PathBuf,
        destination: PathBuf,
        error: io::Error,
    },
    /// An absorbed source file (or its sidecar) could not be removed.
    Delete { path: PathBuf, error: io::Error },
    /// The decision provider produced something that isn't a resolution.
    InvalidResolution(String),
    IoError(io::Error),
    DescribedIoError(io::Error, String),
    WalkDirError(WalkDirError),
}

impl SyncError {
    /// True for the failures that are recorded against a single conflict
    /// rather than aborting the whole run.
    pub fn is_recordable(&self) -> bool {
        match *self {
            SyncError::Replace { .. } | SyncError::Delete { .. } => true,
            _ => false,
        }
    }
}

impl From<io::Error> for SyncError {
    fn from(e: io::Error) -> Self {
        SyncError::IoError(e)
    }
}

impl From<WalkDirError> for SyncError {
    fn from(e: WalkDirError) -> Self {
        SyncError::WalkDirError(e)
    }
}

impl fmt::Display for SyncError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            SyncError::RootDoesntExist(ref root) => write!(f, "root does not exist: {:?}", root),
            SyncError::OutsideBase { ref path, ref base } => write!(
                f,
                "the path {:?} is not inside the base directory {:?}",
                path, base
            ),
            SyncError::Replace {
                ref source,
                ref destination,
                ref error,
            } => write!(
                f,
                "couldn't replace {:?} with {:?}: {}",
                destination, source, error
            ),
            SyncError::Delete {
                ref path,
                ref error,
            } => write!(f, "couldn't delete {:?}: {}", path, error),
            SyncError::InvalidResolution(ref value) => {
                write!(f, "invalid conflict resolution: {:?}", value)
            }
            SyncError::IoError(ref io) => write!(f, "io error: {}", io),
            SyncError::DescribedIoError(ref io, ref description) => {
                write!(f, "io error: {} ({})", io, description)
            }
            SyncError::WalkDirError(ref e) => write!(f, "walk dir error: {}", e),
        }
    }
}

impl Error for SyncError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match *self {
            SyncError::Replace { ref error, .. } | SyncError::Delete { ref error, .. } => {
                Some(error)
            }
            SyncError::IoError(ref e) | SyncError::DescribedIoError(ref e, _) => Some(e),
            SyncError::WalkDirError(ref e) => Some(e),
            _ => None,
        }
    }
}

/// Attaches a lazily built description to an `io::Error`.
pub trait DescribeIoError<T> {
    fn describe<F: FnOnce() -> String>(self, f: F) -> Result<T, SyncError>;
}

impl<T> DescribeIoError<T> for Result<T, io::Error> {
    fn describe<F: FnOnce() -> String>(self, f: F) -> Result<T, SyncError> {
        self.map_err(|e| SyncError::DescribedIoError(e, f()))
    }
}
