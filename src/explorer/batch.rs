//! Sequential batch actions over a selection.
//!
//! Items run one at a time, each awaited before the next starts. The first
//! failure stops the batch; items already processed stay processed.

use std::path::{Path, PathBuf};

use tracing::{error, info};

use crate::adb::DeviceBridge;
use crate::error::{AppError, Result};
use crate::listing::{base_name, join_device_path};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchKind {
    Delete,
    Save,
    Upload,
}

impl BatchKind {
    pub fn verb(self) -> &'static str {
        match self {
            BatchKind::Delete => "Deleted",
            BatchKind::Save => "Saved",
            BatchKind::Upload => "Uploaded",
        }
    }
}

/// What happened to each item of a batch.
#[derive(Debug)]
pub struct BatchOutcome {
    pub kind: BatchKind,
    pub completed: Vec<String>,
    /// The item that stopped the batch and its error.
    pub failed: Option<(String, AppError)>,
    /// Items never attempted because of the failure.
    pub skipped: Vec<String>,
}

impl BatchOutcome {
    fn new(kind: BatchKind) -> Self {
        Self {
            kind,
            completed: Vec::new(),
            failed: None,
            skipped: Vec::new(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.failed.is_none()
    }

    /// One-line summary for the status popup.
    pub fn summary(&self) -> String {
        let noun = if self.completed.len() == 1 { "item" } else { "items" };
        match &self.failed {
            None => format!("{} {} {}", self.kind.verb(), self.completed.len(), noun),
            Some((item, e)) => format!(
                "{} {} {} before {} failed: {}{}",
                self.kind.verb(),
                self.completed.len(),
                noun,
                item,
                e,
                if self.skipped.is_empty() {
                    String::new()
                } else {
                    format!(" ({} not attempted)", self.skipped.len())
                }
            ),
        }
    }
}

async fn run_each<T, F, Fut>(
    kind: BatchKind,
    items: Vec<T>,
    label: impl Fn(&T) -> String,
    mut step: F,
) -> BatchOutcome
where
    F: FnMut(T) -> Fut,
    Fut: std::future::Future<Output = Result<()>>,
{
    let mut outcome = BatchOutcome::new(kind);
    let mut items = items.into_iter();

    while let Some(item) = items.next() {
        let name = label(&item);
        match step(item).await {
            Ok(()) => outcome.completed.push(name),
            Err(e) => {
                error!("{:?} of {} failed: {}", kind, name, e);
                outcome.failed = Some((name, e));
                outcome.skipped = items.map(|rest| label(&rest)).collect();
                return outcome;
            }
        }
    }

    info!("{:?} batch finished: {} items", kind, outcome.completed.len());
    outcome
}

/// Delete each device path with its own bridge call.
pub async fn delete_each<B: DeviceBridge>(bridge: &B, paths: Vec<String>) -> BatchOutcome {
    run_each(BatchKind::Delete, paths, String::clone, |path| async move {
        bridge.delete_one(&path).await
    })
    .await
}

/// Pull each device path into `local_dir`, keeping its base name.
pub async fn save_each<B: DeviceBridge>(
    bridge: &B,
    paths: Vec<String>,
    local_dir: &Path,
) -> BatchOutcome {
    run_each(BatchKind::Save, paths, String::clone, |path| async move {
        let destination = local_dir.join(base_name(&path));
        bridge.pull(&path, &destination).await
    })
    .await
}

/// Push each local path into the device directory `remote_dir`.
pub async fn upload_each<B: DeviceBridge>(
    bridge: &B,
    local_paths: Vec<PathBuf>,
    remote_dir: &str,
) -> BatchOutcome {
    run_each(
        BatchKind::Upload,
        local_paths,
        |p| p.display().to_string(),
        |local| async move {
            let name = local
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .ok_or_else(|| {
                    AppError::ValidationError(format!("{} has no file name", local.display()))
                })?;
            bridge.push(&local, &join_device_path(remote_dir, &name)).await
        },
    )
    .await
}
