use std::io::Write;

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::Backend;

use super::KeyFlow;
use crate::app::{App, Focus};

/// Keys for the device sidebar.
pub fn handle_device_list_key<B: Backend + Write>(app: &mut App<B>, key: KeyEvent) -> KeyFlow {
    match key.code {
        KeyCode::Char('q') => return KeyFlow::Quit,
        KeyCode::Tab | KeyCode::BackTab | KeyCode::Esc => app.focus = Focus::Files,
        KeyCode::Up | KeyCode::Char('k') => app.devices.move_selection(-1),
        KeyCode::Down | KeyCode::Char('j') => app.devices.move_selection(1),
        KeyCode::Enter | KeyCode::Right | KeyCode::Char('l') => {
            let selected_is_active = app
                .devices
                .devices
                .get(app.devices.selected)
                .is_some_and(|d| app.devices.active.as_deref() == Some(d.id.as_str()));
            if selected_is_active {
                app.focus = Focus::Files;
            } else {
                app.activate_selected_device();
            }
        }
        KeyCode::Char('r') => app.poll_devices(),
        _ => {}
    }
    KeyFlow::Continue
}
