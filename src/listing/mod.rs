//! Directory listing model and parsing.

pub mod entry;
pub mod parser;
pub mod path;

pub use entry::{FileEntry, format_size};
pub use parser::{ListingParser, LongFormatParser};
pub use path::{base_name, join_device_path, normalize_device_path, parent_path};
