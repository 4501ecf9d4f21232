//! Context menu model.

use crate::listing::FileEntry;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    Open,
    Info,
    CopyPath,
    SaveToLocal,
    UploadHere,
    Delete,
}

impl MenuAction {
    pub fn label(self) -> &'static str {
        match self {
            MenuAction::Open => "Open",
            MenuAction::Info => "Get Info",
            MenuAction::CopyPath => "Copy Path",
            MenuAction::SaveToLocal => "Save to Local...",
            MenuAction::UploadHere => "Upload Files Here...",
            MenuAction::Delete => "Delete",
        }
    }

    pub fn is_destructive(self) -> bool {
        matches!(self, MenuAction::Delete)
    }
}

/// An open context menu. `target` is `None` for the directory background.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextMenu {
    pub target: Option<FileEntry>,
    pub items: Vec<MenuAction>,
    pub selected: usize,
}

impl ContextMenu {
    pub fn for_entry(entry: FileEntry) -> Self {
        let mut items = vec![
            MenuAction::Open,
            MenuAction::Info,
            MenuAction::CopyPath,
            MenuAction::SaveToLocal,
        ];
        if entry.is_dir {
            items.push(MenuAction::UploadHere);
        }
        items.push(MenuAction::Delete);

        Self {
            target: Some(entry),
            items,
            selected: 0,
        }
    }

    pub fn for_background() -> Self {
        Self {
            target: None,
            items: vec![MenuAction::UploadHere],
            selected: 0,
        }
    }

    pub fn next(&mut self) {
        if !self.items.is_empty() {
            self.selected = (self.selected + 1) % self.items.len();
        }
    }

    pub fn prev(&mut self) {
        if !self.items.is_empty() {
            self.selected = if self.selected == 0 {
                self.items.len() - 1
            } else {
                self.selected - 1
            };
        }
    }

    pub fn current(&self) -> Option<MenuAction> {
        self.items.get(self.selected).copied()
    }
}
