//! Opening device files with the local default application.
//!
//! The file is pulled into a fresh directory under the system temp dir, keeping
//! its name so the desktop picks the right handler. The directory is left in
//! place because the viewer may still be reading it after we return.

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::adb::DeviceBridge;
use crate::error::{AppError, Result};
use crate::listing::base_name;

const TEMP_PREFIX: &str = "droidex-open-";

/// Pull `device_path` into a new kept temp directory and return the local copy.
pub async fn pull_to_temp<B: DeviceBridge>(bridge: &B, device_path: &str) -> Result<PathBuf> {
    let name = base_name(device_path);
    if name.is_empty() {
        return Err(AppError::ValidationError(format!(
            "Cannot open {device_path}: no file name"
        )));
    }

    let dir = tempfile::Builder::new()
        .prefix(TEMP_PREFIX)
        .tempdir()
        .map_err(|e| AppError::OpenError(format!("Failed to create temp dir: {e}")))?
        .keep();
    let local = dir.join(name);

    debug!("Pulling {} to {}", device_path, local.display());
    bridge.pull(device_path, &local).await?;
    Ok(local)
}

/// Hand a local file to the OS default application.
pub async fn open_local(path: &Path) -> Result<()> {
    let target = path.to_path_buf();
    tokio::task::spawn_blocking(move || ::open::that(&target))
        .await
        .map_err(|e| AppError::OpenError(e.to_string()))?
        .map_err(|e| AppError::OpenError(format!("{}: {e}", path.display())))?;
    info!("Opened {}", path.display());
    Ok(())
}

/// Pull then open; returns the local copy.
pub async fn open_remote_file<B: DeviceBridge>(bridge: &B, device_path: &str) -> Result<PathBuf> {
    let local = pull_to_temp(bridge, device_path).await?;
    open_local(&local).await?;
    Ok(local)
}
