use serde::{Deserialize, Serialize};

use crate::snapshot::{PathEntry, TreeSnapshot};
use crate::util::FnvHashMap;

/// An incoming file whose relative path is already occupied in the destination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conflict {
    pub source: PathEntry,
    pub destination: PathEntry,
}

impl Conflict {
    pub fn relative_path(&self) -> &str {
        &self.source.relative_path
    }
}

/// Pairs every source entry with the destination entry of the same relative path,
/// provided that destination entry passes `exists_on_disk`.
///
/// Conflicts are returned in source order. When the destination lists the same
/// relative path more than once, the last listing wins.
pub fn find_conflicts<F>(
    source: &TreeSnapshot,
    destination: &TreeSnapshot,
    exists_on_disk: F,
) -> Vec<Conflict>
where
    F: Fn(&PathEntry) -> bool,
{
    let mut index: FnvHashMap<&str, &PathEntry> = Default::default();
    for entry in destination {
        index.insert(entry.relative_path.as_str(), entry);
    }

    let mut conflicts = Vec::new();
    for entry in source {
        let existing = match index.get(entry.relative_path.as_str()) {
            Some(existing) => *existing,
            None => continue,
        };

        if !exists_on_disk(existing) {
            debug!(
                "{:?} is no longer on disk, not a conflict",
                existing.path
            );
            continue;
        }

        info!("Conflict at {:?}", entry.relative_path);
        conflicts.push(Conflict {
            source: entry.clone(),
            destination: existing.clone(),
        });
    }
    conflicts
}

/// `find_conflicts`, checking the file system for the destination entries.
pub fn find_conflicts_on_disk(source: &TreeSnapshot, destination: &TreeSnapshot) -> Vec<Conflict> {
    find_conflicts(source, destination, |entry| entry.path.is_file())
}
