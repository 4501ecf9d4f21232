//! Resolution of the adb executable.
//!
//! Runs once at startup. The result is an [`AdbTool`] value handed to the
//! bridge, so nothing else needs to know where adb lives.

use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

#[cfg(windows)]
const ADB_BINARY: &str = "adb.exe";
#[cfg(not(windows))]
const ADB_BINARY: &str = "adb";

/// Where the resolved executable came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolSource {
    CommandLine,
    SavedConfig,
    SearchPath,
    WellKnown,
    /// Nothing verified; the bare program name is used on a best-effort basis.
    Fallback,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdbTool {
    pub path: PathBuf,
    pub source: ToolSource,
}

impl AdbTool {
    pub fn new(path: impl Into<PathBuf>, source: ToolSource) -> Self {
        Self {
            path: path.into(),
            source,
        }
    }

    pub fn fallback() -> Self {
        Self::new(ADB_BINARY, ToolSource::Fallback)
    }

    /// True when a candidate was actually verified to run.
    pub fn is_resolved(&self) -> bool {
        self.source != ToolSource::Fallback
    }

    /// Try the explicit override, the saved path, the search path and the
    /// well-known install locations, in that order. The first candidate whose
    /// `version` subcommand succeeds wins.
    pub async fn discover(cli_override: Option<&Path>, saved: Option<&Path>) -> Self {
        let home = dirs::home_dir();
        let mut candidates: Vec<(PathBuf, ToolSource)> = Vec::new();

        if let Some(path) = cli_override {
            candidates.push((path.to_path_buf(), ToolSource::CommandLine));
        }
        if let Some(path) = saved {
            candidates.push((path.to_path_buf(), ToolSource::SavedConfig));
        }
        if let Ok(path) = which::which(ADB_BINARY) {
            candidates.push((path, ToolSource::SearchPath));
        }
        for path in well_known_locations(home.as_deref(), |key| std::env::var(key).ok()) {
            candidates.push((path, ToolSource::WellKnown));
        }

        for (path, source) in candidates {
            if source == ToolSource::WellKnown && !path.exists() {
                continue;
            }
            if probe(&path).await {
                info!("Using adb at {} ({:?})", path.display(), source);
                return Self::new(path, source);
            }
            debug!("adb candidate rejected: {}", path.display());
        }

        warn!("No working adb executable found, falling back to '{ADB_BINARY}'");
        Self::fallback()
    }
}

/// Run `<path> version` and report whether it exited successfully.
async fn probe(path: &Path) -> bool {
    match tokio::process::Command::new(path)
        .arg("version")
        .kill_on_drop(true)
        .output()
        .await
    {
        Ok(output) => output.status.success(),
        Err(e) => {
            debug!("Failed to probe {}: {}", path.display(), e);
            false
        }
    }
}

/// Install locations used by the SDK manager, Android Studio and package
/// managers, most specific first.
pub fn well_known_locations(
    home: Option<&Path>,
    env: impl Fn(&str) -> Option<String>,
) -> Vec<PathBuf> {
    let mut locations = Vec::new();

    for key in ["ANDROID_HOME", "ANDROID_SDK_ROOT"] {
        if let Some(sdk) = env(key).filter(|v| !v.trim().is_empty()) {
            locations.push(PathBuf::from(sdk).join("platform-tools").join(ADB_BINARY));
        }
    }

    if let Some(home) = home {
        locations.push(
            home.join("Library/Android/sdk/platform-tools")
                .join(ADB_BINARY),
        );
        locations.push(home.join("Android/Sdk/platform-tools").join(ADB_BINARY));
    }

    if let Some(local_app_data) = env("LOCALAPPDATA") {
        locations.push(
            PathBuf::from(local_app_data)
                .join("Android")
                .join("Sdk")
                .join("platform-tools")
                .join(ADB_BINARY),
        );
    }

    for fixed in ["/opt/homebrew/bin", "/usr/local/bin", "/usr/bin"] {
        locations.push(Path::new(fixed).join(ADB_BINARY));
    }

    locations.dedup();
    locations
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sdk_env_comes_first() {
        let locations = well_known_locations(Some(Path::new("/home/dev")), |key| match key {
            "ANDROID_HOME" => Some("/opt/android-sdk".to_string()),
            _ => None,
        });

        assert_eq!(
            locations[0],
            Path::new("/opt/android-sdk/platform-tools").join(ADB_BINARY)
        );
        assert!(locations.contains(&Path::new("/home/dev/Android/Sdk/platform-tools").join(ADB_BINARY)));
        assert!(locations.contains(
            &Path::new("/home/dev/Library/Android/sdk/platform-tools").join(ADB_BINARY)
        ));
        assert_eq!(
            locations.last().unwrap(),
            &Path::new("/usr/bin").join(ADB_BINARY)
        );
    }

    #[test]
    fn test_blank_env_is_ignored() {
        let locations = well_known_locations(None, |key| match key {
            "ANDROID_SDK_ROOT" => Some("  ".to_string()),
            _ => None,
        });
        assert_eq!(locations.len(), 3);
    }

    #[test]
    fn test_fallback_is_unresolved() {
        let tool = AdbTool::fallback();
        assert!(!tool.is_resolved());
        assert!(AdbTool::new("/usr/bin/adb", ToolSource::SearchPath).is_resolved());
    }

    #[tokio::test]
    async fn test_discover_rejects_missing_override() {
        let tool = AdbTool::discover(
            Some(Path::new("/definitely/not/here/adb")),
            Some(Path::new("/also/missing/adb")),
        )
        .await;
        assert_ne!(tool.path, Path::new("/definitely/not/here/adb"));
        assert_ne!(tool.source, ToolSource::CommandLine);
        assert_ne!(tool.source, ToolSource::SavedConfig);
    }
}
