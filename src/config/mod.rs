pub mod manager;

pub use manager::{Config, ConfigManager};
