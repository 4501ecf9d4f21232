pub mod adb;
pub mod config;
mod error;
pub mod explorer;
mod key_event;
pub mod listing;
mod mode_state;
mod ui;

mod app;
mod clipboard;
mod events;
mod local_path;
mod open;
mod utils;

// Re-export commonly used types
pub use app::{App, AppMode, Focus};
pub use error::{AppError, ParseAnomaly, Result};
pub use events::AppEvent;
pub use local_path::expand_tilde;
pub use mode_state::{
    DeleteConfirmationState, DeviceChange, DeviceListState, PromptKind, PromptState,
};
pub use open::{open_local, open_remote_file, pull_to_temp};
pub use utils::{LOG_FILE_NAME, init_panic_hook, init_tracing, restore_tui};
