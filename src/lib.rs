//! Merges an incoming file tree into an existing one.
//!
//! Incoming files are matched to existing files by their path relative to a base
//! directory. Each collision is settled by a `Decider` as a replace, a skip or
//! keep-both, optionally applying the first answer to every later collision.

#[macro_use]
extern crate log;

pub mod cleanup;
pub mod compare_files;
pub mod config;
pub mod detect;
pub mod error;
pub mod propagate;
pub mod reconcile;
pub mod resolve;
pub mod snapshot;
pub mod util;

pub use crate::compare_files::{files_equal, Equality};
pub use crate::config::{Ignore, ReconcileInfo, RenameMap, Roots, Sidecar};
pub use crate::detect::{find_conflicts, find_conflicts_on_disk, Conflict};
pub use crate::error::SyncError;
pub use crate::propagate::{DefaultFileOperations, FileOperations};
pub use crate::reconcile::{reconcile, reconcile_roots, Outcome, RunResult};
pub use crate::resolve::{
    Decider, Decision, FixedDecider, Resolution, Resolver, ScriptedDecider, State,
};
pub use crate::snapshot::{Exclude, PathEntry, TreeSnapshot};
