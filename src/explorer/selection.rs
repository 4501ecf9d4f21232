//! Multi-selection over the current directory's entry paths.

use std::collections::BTreeSet;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    paths: BTreeSet<String>,
}

impl Selection {
    /// Plain click: the clicked entry becomes the whole selection.
    pub fn click(&mut self, path: &str) {
        self.paths.clear();
        self.paths.insert(path.to_string());
    }

    /// Modifier click: flip membership of one entry.
    pub fn toggle(&mut self, path: &str) {
        if !self.paths.remove(path) {
            self.paths.insert(path.to_string());
        }
    }

    /// Context-menu invocation. An unselected entry replaces the selection so
    /// the menu always acts on what is visibly selected; a selected entry
    /// keeps the current selection.
    pub fn context(&mut self, path: &str) {
        if !self.paths.contains(path) {
            self.click(path);
        }
    }

    pub fn clear(&mut self) {
        self.paths.clear();
    }

    pub fn select_all<'a>(&mut self, paths: impl IntoIterator<Item = &'a str>) {
        self.paths = paths.into_iter().map(str::to_string).collect();
    }

    /// Drop paths that are not in `present`.
    pub fn retain_existing(&mut self, present: &BTreeSet<&str>) {
        self.paths.retain(|p| present.contains(p.as_str()));
    }

    pub fn contains(&self, path: &str) -> bool {
        self.paths.contains(path)
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.paths.iter().map(String::as_str)
    }
}
