use std::fs;
use std::path::Path;
use std::slice;

use crate::cleanup::remove_consumed_directories;
use crate::compare_files::{files_equal, Equality};
use crate::config::{ReconcileInfo, Roots};
use crate::detect::{find_conflicts_on_disk, Conflict};
use crate::error::SyncError;
use crate::propagate::{self, FileOperations};
use crate::resolve::{Decider, Resolution, Resolver, State};
use crate::snapshot::TreeSnapshot;

/// What happened to a single conflict.
#[derive(Debug)]
pub struct Outcome {
    pub relative_path: String,
    pub resolution: Resolution,
    /// The files were byte-identical, or were one and the same file, so the
    /// decider wasn't asked.
    pub identical: bool,
    /// A replace or delete that failed. The run carried on regardless.
    pub error: Option<SyncError>,
}

/// The result of `reconcile`.
#[derive(Debug)]
pub struct RunResult {
    outcomes: Vec<Outcome>,
    state: State,
    /// The decider stopped the run before every conflict was resolved.
    pub cancelled: bool,
    /// Directories that should have been removed once emptied, but couldn't be.
    pub cleanup_errors: Vec<SyncError>,
}

impl RunResult {
    fn new() -> Self {
        RunResult {
            outcomes: Vec::new(),
            state: State::Idle,
            cancelled: false,
            cleanup_errors: Vec::new(),
        }
    }

    /// One entry per conflict that was resolved, in the order they were resolved.
    pub fn outcomes(&self) -> &[Outcome] {
        &self.outcomes
    }

    pub fn iter(&self) -> slice::Iter<Outcome> {
        self.outcomes.iter()
    }

    pub fn get(&self, relative_path: &str) -> Option<&Outcome> {
        self.outcomes
            .iter()
            .find(|outcome| outcome.relative_path == relative_path)
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    pub fn state(&self) -> State {
        self.state
    }

    pub fn errors(&self) -> impl Iterator<Item = &SyncError> {
        self.outcomes
            .iter()
            .filter_map(|outcome| outcome.error.as_ref())
            .chain(self.cleanup_errors.iter())
    }

    pub fn has_errors(&self) -> bool {
        self.errors().next().is_some()
    }
}

/// Merges `source` into `destination`.
///
/// Every source file whose relative path already exists in the destination is a
/// conflict. Conflicts are resolved strictly in source order through `decider`,
/// then directories left empty by consumed source files are removed, and finally
/// `on_complete` is called once.
///
/// A failed replace or delete is recorded in that conflict's `Outcome` and the run
/// continues. Any other error ends the run immediately, leaves the changes made
/// so far in place and skips `on_complete`.
///
/// Nothing is locked: no other process may modify these paths while this runs.
pub fn reconcile<D, O, C>(
    source: &TreeSnapshot,
    destination: &TreeSnapshot,
    info: &ReconcileInfo,
    decider: &mut D,
    operations: &O,
    on_complete: C,
) -> Result<RunResult, SyncError>
where
    D: Decider + ?Sized,
    O: FileOperations + ?Sized,
    C: FnOnce(&RunResult),
{
    let conflicts = find_conflicts_on_disk(source, destination);
    info!("{} conflicts", conflicts.len());

    let mut resolver = Resolver::new();
    let mut result = RunResult::new();
    let mut consumed: Vec<&Path> = Vec::new();

    for conflict in &conflicts {
        if is_same_file(conflict) {
            // both trees list this very file, there is nothing to merge
            info!("{:?} is the same file in both trees", conflict.relative_path());
            let resolution = resolver.choose_automatically(Resolution::KeepBoth);
            result.outcomes.push(Outcome {
                relative_path: conflict.relative_path().to_owned(),
                resolution,
                identical: true,
                error: None,
            });
            resolver.applied();
            continue;
        }

        let identical = info.compare_file_contents && are_identical(conflict);
        let resolution = if identical {
            info!("{:?} is identical in both trees", conflict.relative_path());
            resolver.choose_automatically(Resolution::Skip)
        } else {
            match resolver.choose(conflict, &mut *decider)? {
                Some(resolution) => resolution,
                None => {
                    result.cancelled = true;
                    break;
                }
            }
        };

        let sidecar = info.sidecar.as_ref();
        let error = match propagate::apply(conflict, resolution, sidecar, operations) {
            Ok(()) => None,
            Err(e) => {
                if !e.is_recordable() {
                    return Err(e);
                }
                warn!("Couldn't {} {:?}: {}", resolution, conflict.relative_path(), e);
                Some(e)
            }
        };

        if error.is_none() && resolution != Resolution::KeepBoth {
            consumed.push(conflict.source.path.as_path());
        }

        result.outcomes.push(Outcome {
            relative_path: conflict.relative_path().to_owned(),
            resolution,
            identical,
            error,
        });
        resolver.applied();
    }
    resolver.finish();

    result.cleanup_errors = remove_consumed_directories(source, consumed, info, operations);
    result.state = resolver.state();

    debug!("Run finished with {} outcome(s)", result.len());
    on_complete(&result);
    Ok(result)
}

/// Snapshots both sets of roots and then reconciles them. A missing root fails the
/// run before anything on disk is touched.
pub fn reconcile_roots<D, O, C>(
    source: &Roots,
    destination: &Roots,
    info: &ReconcileInfo,
    decider: &mut D,
    operations: &O,
    on_complete: C,
) -> Result<RunResult, SyncError>
where
    D: Decider + ?Sized,
    O: FileOperations + ?Sized,
    C: FnOnce(&RunResult),
{
    let source_snapshot = TreeSnapshot::build(&source.paths, &source.base, info)?;
    let destination_snapshot =
        TreeSnapshot::build(&destination.paths, &destination.base, info)?;
    reconcile(
        &source_snapshot,
        &destination_snapshot,
        info,
        decider,
        operations,
        on_complete,
    )
}

/// True when both entries name one file on disk, even through different spellings.
fn is_same_file(conflict: &Conflict) -> bool {
    let source = &conflict.source.path;
    let destination = &conflict.destination.path;
    if source == destination {
        return true;
    }
    match (fs::canonicalize(source), fs::canonicalize(destination)) {
        (Ok(source), Ok(destination)) => source == destination,
        _ => false,
    }
}

fn are_identical(conflict: &Conflict) -> bool {
    match files_equal(&conflict.source.path, &conflict.destination.path) {
        Equality::Equal => true,
        Equality::Different => false,
        // fail closed, the decider gets asked as usual
        Equality::Unknown(_) => false,
    }
}
