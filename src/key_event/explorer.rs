use std::io::Write;

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::Backend;

use super::KeyFlow;
use crate::app::{App, Focus};
use crate::explorer::SortKey;

const PAGE_STEP: isize = 10;

fn sort_key_for(c: char) -> Option<SortKey> {
    match c {
        '1' => Some(SortKey::Name),
        '2' => Some(SortKey::Type),
        '3' => Some(SortKey::Size),
        '4' => Some(SortKey::Date),
        _ => None,
    }
}

/// Keys for the file list.
pub fn handle_explorer_key<B: Backend + Write>(app: &mut App<B>, key: KeyEvent) -> KeyFlow {
    match key.code {
        KeyCode::Char('q') => return KeyFlow::Quit,
        KeyCode::Tab | KeyCode::BackTab => app.focus = Focus::Devices,

        KeyCode::Up | KeyCode::Char('k') => app.explorer.move_cursor(-1),
        KeyCode::Down | KeyCode::Char('j') => app.explorer.move_cursor(1),
        KeyCode::PageUp => app.explorer.move_cursor(-PAGE_STEP),
        KeyCode::PageDown => app.explorer.move_cursor(PAGE_STEP),
        KeyCode::Home => app.explorer.set_cursor(0),
        KeyCode::End => app.explorer.cursor_to_end(),

        KeyCode::Enter | KeyCode::Right | KeyCode::Char('l') => app.activate_cursor_row(),
        KeyCode::Backspace | KeyCode::Left | KeyCode::Char('h') => app.go_up(),
        KeyCode::Char('r') => app.refresh(),
        KeyCode::Char('g') => app.prompt_goto(),

        KeyCode::Char(c @ '1'..='4') => {
            if let Some(sort_key) = sort_key_for(c) {
                app.explorer.select_sort(sort_key);
            }
        }
        KeyCode::Char('G') => app.explorer.toggle_grouping(),

        KeyCode::Char(' ') => {
            if let Some(path) = app.explorer.cursor_entry().map(|e| e.path.clone()) {
                app.explorer.toggle_selected(&path);
                app.explorer.move_cursor(1);
            }
        }
        KeyCode::Char('a') => app.explorer.select_all(),
        KeyCode::Esc => app.explorer.clear_selection(),

        KeyCode::Char('m') => app.explorer.open_context_menu(),
        KeyCode::Char('i') => app.show_cursor_info(),
        KeyCode::Char('y') => app.copy_selected_paths(),
        KeyCode::Char('s') => app.prompt_save(),
        KeyCode::Char('u') => {
            let remote_dir = app.explorer.current_path().to_string();
            app.prompt_upload(remote_dir);
        }
        KeyCode::Char('d') | KeyCode::Delete => app.confirm_delete(),
        _ => {}
    }
    KeyFlow::Continue
}

/// Keys while the context menu is open.
pub fn handle_context_menu_key<B: Backend + Write>(app: &mut App<B>, key: KeyEvent) -> KeyFlow {
    let Some(menu) = app.explorer.menu.as_mut() else {
        return KeyFlow::Continue;
    };
    match key.code {
        KeyCode::Up | KeyCode::Char('k') => menu.prev(),
        KeyCode::Down | KeyCode::Char('j') => menu.next(),
        KeyCode::Enter => {
            if let Some(action) = menu.current() {
                app.run_menu_action(action);
            }
        }
        KeyCode::Esc | KeyCode::Char('m') | KeyCode::Char('q') => app.explorer.close_menu(),
        _ => {}
    }
    KeyFlow::Continue
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_keys() {
        assert_eq!(sort_key_for('1'), Some(SortKey::Name));
        assert_eq!(sort_key_for('4'), Some(SortKey::Date));
        assert_eq!(sort_key_for('5'), None);
    }
}
