use std::io::Write;

use crossterm::event::{
    KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use ratatui::prelude::Backend;

use crate::app::{App, AppMode, Focus};
use crate::explorer::ExplorerRow;
use crate::local_path::parse_dropped_paths;

pub mod devices;
pub mod explorer;
pub mod popup;

pub use devices::handle_device_list_key;
pub use explorer::{handle_context_menu_key, handle_explorer_key};
pub use popup::{handle_delete_confirmation_key, handle_prompt_key};

const MOUSE_SCROLL_STEP: isize = 3;

/// Result of handling a key event
pub enum KeyFlow {
    Continue,
    Quit,
}

/// Top-level key event handler: popup dismissal first, then modal state, then
/// the focused panel.
pub fn handle_key_event<B: Backend + Write>(app: &mut App<B>, key: KeyEvent) -> KeyFlow {
    // Only handle actual key presses (ignore repeats/releases)
    if key.kind != KeyEventKind::Press {
        return KeyFlow::Continue;
    }

    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return KeyFlow::Quit;
    }

    app.notice = None;

    // If error popup is visible, handle dismissal only
    if app.error.is_some() {
        if matches!(key.code, KeyCode::Enter | KeyCode::Esc) {
            app.error = None;
        }
        return KeyFlow::Continue;
    }

    // If info popup is visible, handle dismissal only
    if app.info.is_some() {
        if matches!(key.code, KeyCode::Enter | KeyCode::Esc) {
            app.info = None;
        }
        return KeyFlow::Continue;
    }

    match &app.mode {
        AppMode::Prompt(_) => return handle_prompt_key(app, key),
        AppMode::DeleteConfirmation(_) => return handle_delete_confirmation_key(app, key),
        AppMode::Browse => {}
    }

    if app.explorer.info.is_some() {
        if matches!(
            key.code,
            KeyCode::Enter | KeyCode::Esc | KeyCode::Char('i') | KeyCode::Char('q')
        ) {
            app.explorer.info = None;
        }
        return KeyFlow::Continue;
    }

    if app.explorer.menu.is_some() {
        return handle_context_menu_key(app, key);
    }

    match app.focus {
        Focus::Files => handle_explorer_key(app, key),
        Focus::Devices => handle_device_list_key(app, key),
    }
}

fn contains(area: ratatui::layout::Rect, column: u16, row: u16) -> bool {
    column >= area.x && column < area.x + area.width && row >= area.y && row < area.y + area.height
}

/// Mouse handler: clicks select, double clicks open, right clicks open the
/// context menu, the wheel scrolls.
pub fn handle_mouse_event<B: Backend + Write>(app: &mut App<B>, mouse: MouseEvent) {
    // Popups and prompts are keyboard driven
    if app.error.is_some()
        || app.info.is_some()
        || app.explorer.info.is_some()
        || !matches!(app.mode, AppMode::Browse)
    {
        return;
    }

    let (column, row) = (mouse.column, mouse.row);

    if app.explorer.menu.is_some() {
        if let MouseEventKind::Down(MouseButton::Left) = mouse.kind {
            let menu_area = app.regions.menu;
            // Items start one row below the top border
            if contains(menu_area, column, row) && row > menu_area.y {
                let idx = (row - menu_area.y - 1) as usize;
                let action = app
                    .explorer
                    .menu
                    .as_ref()
                    .and_then(|menu| menu.items.get(idx).copied());
                if let Some(action) = action {
                    app.run_menu_action(action);
                }
            } else {
                app.explorer.close_menu();
            }
        }
        return;
    }

    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) if contains(app.regions.devices, column, row) => {
            app.focus = Focus::Devices;
            if let Some(idx) = app.devices.index_at(app.regions.devices, row) {
                app.devices.selected = idx;
                app.activate_selected_device();
            }
        }
        MouseEventKind::Down(MouseButton::Left) if contains(app.regions.files, column, row) => {
            app.focus = Focus::Files;
            let Some(idx) = app.file_row_at(column, row) else {
                app.clear_click_tracking();
                return;
            };
            app.explorer.set_cursor(idx);

            let target = match app.explorer.cursor_row() {
                Some(ExplorerRow::Group { key, .. }) => Err(key),
                Some(ExplorerRow::Entry(entry)) => Ok(entry.path.clone()),
                None => return,
            };
            match target {
                Err(key) => {
                    app.clear_click_tracking();
                    app.explorer.toggle_group(&key);
                }
                Ok(path) if mouse.modifiers.contains(KeyModifiers::CONTROL) => {
                    app.clear_click_tracking();
                    app.explorer.toggle_selected(&path);
                }
                Ok(path) => {
                    app.explorer.click(&path);
                    if app.register_left_click(idx) {
                        app.activate_cursor_row();
                    }
                }
            }
        }
        MouseEventKind::Down(MouseButton::Right) if contains(app.regions.files, column, row) => {
            app.focus = Focus::Files;
            app.clear_click_tracking();
            match app.file_row_at(column, row) {
                Some(idx) => {
                    app.explorer.set_cursor(idx);
                    if app.explorer.cursor_entry().is_some() {
                        app.explorer.open_context_menu();
                    }
                }
                None if !app.explorer.is_loading() => app.explorer.open_background_menu(),
                None => {}
            }
        }
        MouseEventKind::ScrollDown if contains(app.regions.files, column, row) => {
            app.explorer.move_cursor(MOUSE_SCROLL_STEP);
        }
        MouseEventKind::ScrollUp if contains(app.regions.files, column, row) => {
            app.explorer.move_cursor(-MOUSE_SCROLL_STEP);
        }
        _ => {}
    }
}

/// Paste handler. In a prompt the text is inserted; in the file list pasted
/// local paths are uploaded into the current directory, which is how
/// terminals deliver files dragged onto the window.
pub fn handle_paste_event<B: Backend + Write>(app: &mut App<B>, data: &str) {
    if let AppMode::Prompt(prompt) = &mut app.mode {
        prompt.insert_text(data);
        return;
    }

    if !matches!(app.mode, AppMode::Browse) || app.focus != Focus::Files {
        return;
    }

    let paths = parse_dropped_paths(data);
    if paths.is_empty() {
        app.set_notice("Pasted text does not name a local file");
        return;
    }
    let remote_dir = app.explorer.current_path().to_string();
    app.start_upload(paths, remote_dir);
}
