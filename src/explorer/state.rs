//! Explorer view state: navigation, load cycle, sort/group projection,
//! selection and overlays.

use std::collections::BTreeSet;

use tracing::{debug, info, warn};

use super::grouping::{CollapsedGroups, group_entries};
use super::menu::ContextMenu;
use super::selection::Selection;
use super::sorting::{SortKey, SortState, sort_entries};
use crate::error::{AppError, Result};
use crate::listing::{FileEntry, ListingParser, LongFormatParser, normalize_device_path, parent_path};

/// Per-directory load cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadState {
    Idle,
    Loading { path: String },
    Loaded,
    Error(String),
}

/// Issued for every listing request. Only the most recently issued ticket
/// may update the view, so late responses from superseded requests are
/// dropped instead of overwriting newer state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadTicket {
    pub seq: u64,
    pub path: String,
}

#[derive(Debug)]
pub enum LoadOutcome {
    Applied { changed_directory: bool },
    Stale,
    Failed(AppError),
}

/// A rendered row: either a group header or an entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExplorerRow<'a> {
    Group {
        key: String,
        count: usize,
        collapsed: bool,
    },
    Entry(&'a FileEntry),
}

pub struct ExplorerState<P: ListingParser = LongFormatParser> {
    parser: P,
    current_path: String,
    entries: Vec<FileEntry>,
    sort: SortState,
    grouped: bool,
    collapsed: CollapsedGroups,
    selection: Selection,
    load: LoadState,
    last_issued: u64,
    cursor: usize,
    pub menu: Option<ContextMenu>,
    pub info: Option<FileEntry>,
}

impl ExplorerState<LongFormatParser> {
    pub fn new(start_path: impl Into<String>) -> Self {
        Self::with_parser(start_path, LongFormatParser)
    }
}

impl<P: ListingParser> ExplorerState<P> {
    pub fn with_parser(start_path: impl Into<String>, parser: P) -> Self {
        Self {
            parser,
            current_path: normalize_device_path(&start_path.into()),
            entries: Vec::new(),
            sort: SortState::default(),
            grouped: false,
            collapsed: CollapsedGroups::default(),
            selection: Selection::default(),
            load: LoadState::Idle,
            last_issued: 0,
            cursor: 0,
            menu: None,
            info: None,
        }
    }

    pub fn current_path(&self) -> &str {
        &self.current_path
    }

    pub fn entries(&self) -> &[FileEntry] {
        &self.entries
    }

    pub fn load_state(&self) -> &LoadState {
        &self.load
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.load, LoadState::Loading { .. })
    }

    pub fn sort(&self) -> SortState {
        self.sort
    }

    pub fn is_grouped(&self) -> bool {
        self.grouped
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn at_root(&self) -> bool {
        self.current_path == "/"
    }

    // ---- navigation -------------------------------------------------------

    /// Start loading `path`. The caller fetches the listing and hands the
    /// result back through [`finish_load`](Self::finish_load).
    pub fn begin_load(&mut self, path: &str) -> LoadTicket {
        self.last_issued += 1;
        let path = normalize_device_path(path);
        debug!("Listing request #{} for {}", self.last_issued, path);
        self.load = LoadState::Loading { path: path.clone() };
        LoadTicket {
            seq: self.last_issued,
            path,
        }
    }

    pub fn refresh(&mut self) -> LoadTicket {
        let path = self.current_path.clone();
        self.begin_load(&path)
    }

    /// Parent directory; `None` at the root.
    pub fn go_up(&mut self) -> Option<LoadTicket> {
        if self.at_root() {
            return None;
        }
        let parent = parent_path(&self.current_path);
        Some(self.begin_load(&parent))
    }

    /// Give up on any in-flight listing: outstanding tickets go stale and a
    /// pending load becomes `Error(reason)`. A settled view is kept as is.
    pub fn abandon_load(&mut self, reason: &str) {
        self.last_issued += 1;
        if self.is_loading() {
            debug!("Abandoning listing: {}", reason);
            self.load = LoadState::Error(reason.to_string());
        }
    }

    pub fn is_latest(&self, ticket: &LoadTicket) -> bool {
        ticket.seq == self.last_issued
    }

    /// Apply a listing result. Success replaces the entry set wholesale and
    /// clears the selection; failure leaves the previous view untouched.
    pub fn finish_load(&mut self, ticket: &LoadTicket, result: Result<String>) -> LoadOutcome {
        if !self.is_latest(ticket) {
            debug!(
                "Discarding stale listing #{} for {} (latest #{})",
                ticket.seq, ticket.path, self.last_issued
            );
            return LoadOutcome::Stale;
        }

        match result {
            Ok(text) => {
                let changed_directory = ticket.path != self.current_path;
                let cursor_path = self.cursor_entry().map(|e| e.path.clone());

                self.entries = self.parser.parse(&ticket.path, &text);
                self.current_path = ticket.path.clone();
                self.selection.clear();
                self.menu = None;
                self.info = None;
                self.load = LoadState::Loaded;

                if changed_directory {
                    self.collapsed.clear();
                    self.cursor = 0;
                } else if let Some(path) = cursor_path {
                    self.focus_path(&path);
                }
                self.clamp_cursor();

                info!(
                    "Loaded {} ({} entries)",
                    self.current_path,
                    self.entries.len()
                );
                LoadOutcome::Applied { changed_directory }
            }
            Err(e) => {
                warn!("Listing {} failed: {}", ticket.path, e);
                self.load = LoadState::Error(e.to_string());
                LoadOutcome::Failed(e)
            }
        }
    }

    // ---- projections ------------------------------------------------------

    pub fn sorted_entries(&self) -> Vec<&FileEntry> {
        let mut refs: Vec<&FileEntry> = self.entries.iter().collect();
        sort_entries(&mut refs, self.sort);
        refs
    }

    pub fn rows(&self) -> Vec<ExplorerRow<'_>> {
        let sorted = self.sorted_entries();
        if !self.grouped {
            return sorted.into_iter().map(ExplorerRow::Entry).collect();
        }

        let mut rows = Vec::with_capacity(sorted.len());
        for group in group_entries(&sorted) {
            let collapsed = self.collapsed.is_collapsed(&group.key);
            let count = group.entries.len();
            rows.push(ExplorerRow::Group {
                key: group.key,
                count,
                collapsed,
            });
            if !collapsed {
                rows.extend(group.entries.into_iter().map(ExplorerRow::Entry));
            }
        }
        rows
    }

    pub fn select_sort(&mut self, key: SortKey) {
        self.keep_cursor(|state| state.sort.select(key));
    }

    pub fn toggle_grouping(&mut self) {
        self.keep_cursor(|state| state.grouped = !state.grouped);
    }

    pub fn toggle_group(&mut self, key: &str) {
        self.collapsed.toggle(key);
        self.clamp_cursor();
    }

    pub fn is_group_collapsed(&self, key: &str) -> bool {
        self.collapsed.is_collapsed(key)
    }

    // ---- cursor -----------------------------------------------------------

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn set_cursor(&mut self, row: usize) {
        self.cursor = row;
        self.clamp_cursor();
    }

    pub fn move_cursor(&mut self, delta: isize) {
        let len = self.rows().len();
        if len == 0 {
            self.cursor = 0;
            return;
        }
        let target = (self.cursor as isize + delta).clamp(0, len as isize - 1);
        self.cursor = target as usize;
    }

    pub fn cursor_to_end(&mut self) {
        self.cursor = self.rows().len().saturating_sub(1);
    }

    pub fn cursor_row(&self) -> Option<ExplorerRow<'_>> {
        self.rows().into_iter().nth(self.cursor)
    }

    pub fn cursor_entry(&self) -> Option<&FileEntry> {
        match self.cursor_row() {
            Some(ExplorerRow::Entry(entry)) => Some(entry),
            _ => None,
        }
    }

    /// Move the cursor onto the row showing `path`, if visible.
    pub fn focus_path(&mut self, path: &str) -> bool {
        let found = self
            .rows()
            .iter()
            .position(|row| matches!(row, ExplorerRow::Entry(e) if e.path == path));
        if let Some(idx) = found {
            self.cursor = idx;
        }
        found.is_some()
    }

    fn clamp_cursor(&mut self) {
        let len = self.rows().len();
        if self.cursor >= len {
            self.cursor = len.saturating_sub(1);
        }
    }

    fn keep_cursor(&mut self, change: impl FnOnce(&mut Self)) {
        let focused = self.cursor_entry().map(|e| e.path.clone());
        change(self);
        if let Some(path) = focused {
            self.focus_path(&path);
        }
        self.clamp_cursor();
    }

    // ---- selection --------------------------------------------------------

    pub fn entry_by_path(&self, path: &str) -> Option<&FileEntry> {
        self.entries.iter().find(|e| e.path == path)
    }

    fn contains_path(&self, path: &str) -> bool {
        self.entry_by_path(path).is_some()
    }

    pub fn click(&mut self, path: &str) {
        if self.contains_path(path) {
            self.selection.click(path);
        }
    }

    pub fn toggle_selected(&mut self, path: &str) {
        if self.contains_path(path) {
            self.selection.toggle(path);
        }
    }

    pub fn context_select(&mut self, path: &str) {
        if self.contains_path(path) {
            self.selection.context(path);
        }
    }

    pub fn select_all(&mut self) {
        let paths: Vec<&str> = self.entries.iter().map(|e| e.path.as_str()).collect();
        self.selection.select_all(paths);
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    pub fn is_selected(&self, path: &str) -> bool {
        self.selection.contains(path)
    }

    /// Selected entries in display order.
    pub fn selected_entries(&self) -> Vec<&FileEntry> {
        let present: BTreeSet<&str> = self.selection.iter().collect();
        self.sorted_entries()
            .into_iter()
            .filter(|e| present.contains(e.path.as_str()))
            .collect()
    }

    /// Entries a batch action applies to. With nothing selected the entry
    /// under the cursor is selected first, the same way a context menu would.
    pub fn action_targets(&mut self) -> Vec<FileEntry> {
        if self.selection.is_empty() {
            if let Some(path) = self.cursor_entry().map(|e| e.path.clone()) {
                self.selection.context(&path);
            }
        }
        self.selected_entries().into_iter().cloned().collect()
    }

    // ---- overlays ---------------------------------------------------------

    /// Open the context menu for the row under the cursor, or the background
    /// menu when the cursor is not on an entry.
    pub fn open_context_menu(&mut self) {
        let menu = match self.cursor_entry().cloned() {
            Some(entry) => {
                self.selection.context(&entry.path);
                ContextMenu::for_entry(entry)
            }
            None => ContextMenu::for_background(),
        };
        self.menu = Some(menu);
    }

    /// Menu for the directory itself, e.g. a right click below the last row.
    pub fn open_background_menu(&mut self) {
        self.menu = Some(ContextMenu::for_background());
    }

    pub fn close_menu(&mut self) {
        self.menu = None;
    }

    pub fn show_info(&mut self, entry: FileEntry) {
        self.info = Some(entry);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::explorer::sorting::SortDirection;

    const SDCARD: &str = "\
total 32
drwxrwx--x 2 root sdcard_rw 4096 2023-03-04 08:15 DCIM
drwxrwx--x 2 root sdcard_rw 4096 2023-03-04 08:16 Music
-rw-rw---- 1 root sdcard_rw 1234 2023-02-01 09:30 notes.txt
-rw-rw---- 1 root sdcard_rw 99 2023-02-01 09:31 My File.txt
-rw-rw---- 1 root sdcard_rw 5000 2023-02-02 10:00 song.mp3
";

    const DCIM: &str = "\
-rw-rw---- 1 root sdcard_rw 2048 2023-03-04 08:15 IMG_0001.jpg
";

    fn loaded() -> ExplorerState {
        let mut state = ExplorerState::new("/sdcard");
        let ticket = state.refresh();
        assert!(matches!(
            state.finish_load(&ticket, Ok(SDCARD.to_string())),
            LoadOutcome::Applied { .. }
        ));
        state
    }

    fn row_names(state: &ExplorerState) -> Vec<String> {
        state
            .rows()
            .iter()
            .map(|row| match row {
                ExplorerRow::Group { key, .. } => format!("[{key}]"),
                ExplorerRow::Entry(e) => e.name.clone(),
            })
            .collect()
    }

    #[test]
    fn test_load_cycle() {
        let mut state = ExplorerState::new("/sdcard/");
        assert_eq!(state.load_state(), &LoadState::Idle);
        assert_eq!(state.current_path(), "/sdcard");

        let ticket = state.refresh();
        assert!(state.is_loading());

        state.finish_load(&ticket, Ok(SDCARD.to_string()));
        assert_eq!(state.load_state(), &LoadState::Loaded);
        assert_eq!(state.entries().len(), 5);
        assert_eq!(
            row_names(&state),
            vec!["DCIM", "Music", "My File.txt", "notes.txt", "song.mp3"]
        );
    }

    #[test]
    fn test_failure_keeps_previous_view() {
        let mut state = loaded();
        state.click("/sdcard/notes.txt");

        let ticket = state.begin_load("/data");
        let outcome = state.finish_load(&ticket, Err(AppError::PermissionDenied("/data".into())));

        assert!(matches!(outcome, LoadOutcome::Failed(AppError::PermissionDenied(_))));
        assert_eq!(state.current_path(), "/sdcard");
        assert_eq!(state.entries().len(), 5);
        assert!(state.is_selected("/sdcard/notes.txt"));
        assert!(matches!(state.load_state(), LoadState::Error(_)));

        // Retry goes back through Loading.
        let retry = state.begin_load("/data");
        assert!(state.is_loading());
        assert_eq!(retry.seq, ticket.seq + 1);
    }

    #[test]
    fn test_stale_response_is_discarded() {
        let mut state = loaded();

        let first = state.begin_load("/sdcard/DCIM");
        let second = state.begin_load("/sdcard/Music");

        // The newer request resolves first, the older one arrives late.
        assert!(matches!(
            state.finish_load(&second, Ok(String::new())),
            LoadOutcome::Applied {
                changed_directory: true
            }
        ));
        assert!(matches!(
            state.finish_load(&first, Ok(DCIM.to_string())),
            LoadOutcome::Stale
        ));

        assert_eq!(state.current_path(), "/sdcard/Music");
        assert!(state.entries().is_empty());
        assert_eq!(state.load_state(), &LoadState::Loaded);
    }

    #[test]
    fn test_abandoned_load_stops_waiting() {
        let mut state = loaded();
        let pending = state.begin_load("/sdcard/DCIM");
        state.abandon_load("Device disconnected");

        assert!(!state.is_loading());
        assert_eq!(
            state.load_state(),
            &LoadState::Error("Device disconnected".to_string())
        );
        assert!(matches!(
            state.finish_load(&pending, Ok(DCIM.to_string())),
            LoadOutcome::Stale
        ));
        assert_eq!(state.current_path(), "/sdcard");

        // Nothing in flight: the loaded view stays.
        let mut settled = loaded();
        settled.abandon_load("Device disconnected");
        assert_eq!(settled.load_state(), &LoadState::Loaded);
    }

    #[test]
    fn test_selection_cleared_on_every_successful_load() {
        let mut state = loaded();
        state.click("/sdcard/notes.txt");
        state.toggle_selected("/sdcard/song.mp3");
        assert_eq!(state.selection().len(), 2);

        let ticket = state.refresh();
        state.finish_load(&ticket, Ok(SDCARD.to_string()));
        assert!(state.selection().is_empty());
    }

    #[test]
    fn test_selection_ignores_paths_outside_directory() {
        let mut state = loaded();
        state.click("/sdcard/DCIM/IMG_0001.jpg");
        state.toggle_selected("/elsewhere");
        assert!(state.selection().is_empty());
    }

    #[test]
    fn test_go_up_clamps_at_root() {
        let mut state = loaded();
        let ticket = state.go_up().unwrap();
        assert_eq!(ticket.path, "/");
        state.finish_load(&ticket, Ok(String::new()));
        assert!(state.at_root());
        assert!(state.go_up().is_none());
    }

    #[test]
    fn test_sort_keeps_cursor_on_entry() {
        let mut state = loaded();
        assert!(state.focus_path("/sdcard/song.mp3"));

        state.select_sort(SortKey::Size);
        state.select_sort(SortKey::Size);
        assert_eq!(state.sort().direction, SortDirection::Descending);
        assert_eq!(
            row_names(&state),
            vec!["DCIM", "Music", "song.mp3", "notes.txt", "My File.txt"]
        );
        assert_eq!(state.cursor_entry().unwrap().name, "song.mp3");
    }

    #[test]
    fn test_grouped_rows_and_collapse() {
        let mut state = loaded();
        state.toggle_grouping();
        assert_eq!(
            row_names(&state),
            vec![
                "[Folder]",
                "DCIM",
                "Music",
                "[MP3]",
                "song.mp3",
                "[TXT]",
                "My File.txt",
                "notes.txt"
            ]
        );

        state.toggle_group("TXT");
        assert_eq!(
            row_names(&state),
            vec!["[Folder]", "DCIM", "Music", "[MP3]", "song.mp3", "[TXT]"]
        );

        // Collapse state survives re-sorting and refreshing the same directory.
        state.select_sort(SortKey::Date);
        let ticket = state.refresh();
        state.finish_load(&ticket, Ok(SDCARD.to_string()));
        assert!(state.is_group_collapsed("TXT"));

        // ...and resets when the directory changes.
        let ticket = state.begin_load("/sdcard/DCIM");
        state.finish_load(&ticket, Ok(DCIM.to_string()));
        assert!(!state.is_group_collapsed("TXT"));
    }

    #[test]
    fn test_action_targets_fall_back_to_cursor() {
        let mut state = loaded();
        state.focus_path("/sdcard/notes.txt");

        let targets = state.action_targets();
        assert_eq!(targets.len(), 1);
        assert_eq!(targets[0].path, "/sdcard/notes.txt");
        assert!(state.is_selected("/sdcard/notes.txt"));
    }

    #[test]
    fn test_action_targets_in_display_order() {
        let mut state = loaded();
        state.toggle_selected("/sdcard/song.mp3");
        state.toggle_selected("/sdcard/DCIM");
        state.toggle_selected("/sdcard/My File.txt");

        let names: Vec<String> = state.action_targets().into_iter().map(|e| e.name).collect();
        assert_eq!(names, vec!["DCIM", "My File.txt", "song.mp3"]);
    }

    #[test]
    fn test_context_menu_on_unselected_entry_replaces_selection() {
        let mut state = loaded();
        state.click("/sdcard/DCIM");
        state.toggle_selected("/sdcard/Music");

        state.focus_path("/sdcard/song.mp3");
        state.open_context_menu();

        let menu = state.menu.as_ref().unwrap();
        assert_eq!(menu.target.as_ref().unwrap().name, "song.mp3");
        assert_eq!(
            state.selection().iter().collect::<Vec<_>>(),
            vec!["/sdcard/song.mp3"]
        );
    }

    #[test]
    fn test_background_menu_when_empty() {
        let mut state = ExplorerState::new("/sdcard/empty");
        let ticket = state.refresh();
        state.finish_load(&ticket, Ok("total 0\n".to_string()));
        state.open_context_menu();
        assert!(state.menu.as_ref().unwrap().target.is_none());
    }

    #[test]
    fn test_move_cursor_clamps() {
        let mut state = loaded();
        state.move_cursor(-3);
        assert_eq!(state.cursor(), 0);
        state.move_cursor(100);
        assert_eq!(state.cursor(), 4);
        state.set_cursor(99);
        assert_eq!(state.cursor(), 4);
    }
}
