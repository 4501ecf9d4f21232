use std::io::Write;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::prelude::Backend;
use tui_textarea::Input;

use super::KeyFlow;
use crate::app::{App, AppMode};
use crate::clipboard;
use crate::local_path::complete_local_path;

/// Keys while a text prompt is open.
pub fn handle_prompt_key<B: Backend + Write>(app: &mut App<B>, key: KeyEvent) -> KeyFlow {
    let AppMode::Prompt(prompt) = &mut app.mode else {
        return KeyFlow::Continue;
    };

    match key.code {
        KeyCode::Esc => app.mode = AppMode::Browse,
        KeyCode::Enter => {
            if let AppMode::Prompt(prompt) = std::mem::replace(&mut app.mode, AppMode::Browse) {
                app.submit_prompt(prompt);
            }
        }
        KeyCode::Tab if prompt.kind.is_local() => {
            if let Some(completed) = complete_local_path(&prompt.value()) {
                prompt.set_value(&completed);
            }
        }
        KeyCode::Char('v') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            match clipboard::read_text() {
                Ok(text) => prompt.insert_text(&text),
                Err(e) => app.set_error(e),
            }
        }
        _ => {
            prompt.input.input(Input::from(key));
        }
    }
    KeyFlow::Continue
}

/// Keys while a delete is waiting for confirmation.
pub fn handle_delete_confirmation_key<B: Backend + Write>(
    app: &mut App<B>,
    key: KeyEvent,
) -> KeyFlow {
    match key.code {
        KeyCode::Char('y') | KeyCode::Char('Y') => {
            if let AppMode::DeleteConfirmation(state) =
                std::mem::replace(&mut app.mode, AppMode::Browse)
            {
                app.start_delete(state.paths());
            }
        }
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => app.mode = AppMode::Browse,
        _ => {}
    }
    KeyFlow::Continue
}
