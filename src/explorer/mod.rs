//! Explorer state machine and the actions it drives.

pub mod batch;
pub mod grouping;
pub mod menu;
pub mod selection;
pub mod sorting;
pub mod state;

pub use batch::{BatchKind, BatchOutcome, delete_each, save_each, upload_each};
pub use menu::{ContextMenu, MenuAction};
pub use selection::Selection;
pub use sorting::{SortDirection, SortKey, SortState};
pub use state::{ExplorerRow, ExplorerState, LoadOutcome, LoadState, LoadTicket};
