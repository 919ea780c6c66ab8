// src/detect/diff.rs

//! The diff engine.
//!
//! Line mode is positional: line `i` of the old snapshot is only ever
//! compared with line `i` of the new one. Inserting a line near the top
//! therefore reports every following line as removed and re-added.

use crate::detect::snapshot::Snapshot;
use crate::fetch::{FetchError, ScriptSet};
use crate::report::ChangeEntry;

/// Positional line delta between `previous` and `next`.
///
/// Entries are ordered by line number; at the same line `Removed` comes
/// before `Added`. Line numbers are 1-based.
pub fn diff_lines<S: AsRef<str>>(previous: &[S], next: &[S]) -> Vec<ChangeEntry> {
    let len = previous.len().max(next.len());
    let mut entries = Vec::new();

    for idx in 0..len {
        let old = previous.get(idx).map(AsRef::as_ref);
        let new = next.get(idx).map(AsRef::as_ref);
        if old == new {
            continue;
        }
        if let Some(old) = old {
            entries.push(ChangeEntry::removed(idx + 1, old));
        }
        if let Some(new) = new {
            entries.push(ChangeEntry::added(idx + 1, new));
        }
    }

    entries
}

/// Set delta between two script sets.
///
/// All removals come first (in the previous page's discovery order), then
/// all additions (in the new page's discovery order).
pub fn diff_sets(previous: &ScriptSet, next: &ScriptSet) -> Vec<ChangeEntry> {
    let removed = previous
        .iter()
        .filter(|s| !next.contains(&s.reference))
        .map(|s| ChangeEntry::removed_ref(s.reference.clone(), s.line));

    let added = next
        .iter()
        .filter(|s| !previous.contains(&s.reference))
        .map(|s| ChangeEntry::added_ref(s.reference.clone(), s.line));

    removed.chain(added).collect()
}

/// Diff two snapshots of the same kind.
///
/// Mixing kinds means the content cannot be compared at all; that is reported
/// as a [`FetchError::KindMismatch`] so the caller treats it like a failed
/// fetch instead of diffing part of it.
pub fn diff_snapshots(previous: &Snapshot, next: &Snapshot) -> Result<Vec<ChangeEntry>, FetchError> {
    match (previous, next) {
        (Snapshot::Lines { lines: old, .. }, Snapshot::Lines { lines: new, .. }) => {
            Ok(diff_lines(old.as_slice(), new.as_slice()))
        }
        (Snapshot::Scripts { scripts: old, .. }, Snapshot::Scripts { scripts: new, .. }) => {
            Ok(diff_sets(old, new))
        }
        _ => Err(FetchError::KindMismatch {
            expected: previous.kind_label(),
            actual: next.kind_label(),
        }),
    }
}
