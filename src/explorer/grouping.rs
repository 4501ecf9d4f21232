//! Grouping of the current listing by type label.

use std::collections::{BTreeMap, BTreeSet};

use crate::listing::FileEntry;

/// One bucket of entries sharing a type label.
#[derive(Debug)]
pub struct EntryGroup<'a> {
    pub key: String,
    pub entries: Vec<&'a FileEntry>,
}

/// Partition `entries` by [`FileEntry::file_type`]. Buckets come back sorted
/// by label; entries keep the order they were given in.
pub fn group_entries<'a>(entries: &[&'a FileEntry]) -> Vec<EntryGroup<'a>> {
    let mut buckets: BTreeMap<String, Vec<&'a FileEntry>> = BTreeMap::new();
    for entry in entries {
        buckets.entry(entry.file_type()).or_default().push(entry);
    }
    buckets
        .into_iter()
        .map(|(key, entries)| EntryGroup { key, entries })
        .collect()
}

/// Labels of the buckets the user folded away.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollapsedGroups(BTreeSet<String>);

impl CollapsedGroups {
    pub fn is_collapsed(&self, key: &str) -> bool {
        self.0.contains(key)
    }

    /// Flip a bucket; returns whether it is now collapsed.
    pub fn toggle(&mut self, key: &str) -> bool {
        if !self.0.remove(key) {
            self.0.insert(key.to_string());
            true
        } else {
            false
        }
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }
}
