//! Device bridge: everything that talks to the adb executable.

pub mod bridge;
pub mod devices;
pub mod locate;
pub mod shell;

use std::future::Future;
use std::path::Path;

use crate::error::Result;

pub use bridge::{AdbBridge, DELETE_BATCH_SIZE};
pub use devices::{DeviceHandle, parse_devices};
pub use locate::{AdbTool, ToolSource};

/// Operations the explorer needs from a device.
///
/// Each call completes once the underlying tool exits; nothing reports
/// partial progress and nothing retries.
pub trait DeviceBridge: Send + Sync {
    fn list_devices(&self) -> impl Future<Output = Result<Vec<DeviceHandle>>> + Send;

    /// Raw long-format listing text for `path`.
    fn list_directory(&self, path: &str) -> impl Future<Output = Result<String>> + Send;

    fn pull(&self, device_path: &str, local_path: &Path)
    -> impl Future<Output = Result<()>> + Send;

    fn push(&self, local_path: &Path, device_path: &str)
    -> impl Future<Output = Result<()>> + Send;

    /// Recursively delete `paths`, one tool call per group of
    /// [`DELETE_BATCH_SIZE`], stopping at the first failing group.
    fn delete_many(&self, paths: &[String]) -> impl Future<Output = Result<()>> + Send;

    fn delete_one(&self, path: &str) -> impl Future<Output = Result<()>> + Send {
        async move {
            let paths = vec![path.to_string()];
            self.delete_many(&paths).await
        }
    }
}
