//! Subprocess-backed [`DeviceBridge`] implementation.

use std::ffi::OsString;
use std::path::Path;
use std::process::Stdio;
use std::sync::Arc;

use tokio::process::Command;
use tracing::{debug, warn};

use super::devices::{DeviceHandle, parse_devices};
use super::locate::AdbTool;
use super::shell::{listing_target, shell_quote};
use super::DeviceBridge;
use crate::error::{AppError, Result};

/// Paths per `rm` invocation, keeping the command line well under the
/// remote shell's length limit.
pub const DELETE_BATCH_SIZE: usize = 50;

/// Handle to the adb executable, optionally bound to one device serial.
///
/// Cloning is cheap; every clone shares the resolved tool.
#[derive(Clone, Debug)]
pub struct AdbBridge {
    tool: Arc<AdbTool>,
    serial: Option<String>,
}

impl AdbBridge {
    pub fn new(tool: AdbTool) -> Self {
        Self {
            tool: Arc::new(tool),
            serial: None,
        }
    }

    /// A bridge whose device-scoped calls target `serial`.
    pub fn for_device(&self, serial: impl Into<String>) -> Self {
        Self {
            tool: Arc::clone(&self.tool),
            serial: Some(serial.into()),
        }
    }

    pub fn serial(&self) -> Option<&str> {
        self.serial.as_deref()
    }

    pub fn tool(&self) -> &AdbTool {
        &self.tool
    }

    fn command(&self, scoped: bool) -> Command {
        let mut command = Command::new(&self.tool.path);
        if scoped && let Some(serial) = &self.serial {
            command.arg("-s").arg(serial);
        }
        command
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        command
    }

    async fn run(&self, label: &str, scoped: bool, args: Vec<OsString>) -> Result<String> {
        debug!(
            "Running adb {} (device: {})",
            label,
            self.serial.as_deref().unwrap_or("-")
        );

        let output = self
            .command(scoped)
            .args(&args)
            .output()
            .await
            .map_err(|e| self.spawn_error(label, e))?;

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

        if !stderr.trim().is_empty() && !is_daemon_notice(&stderr) {
            warn!("adb {} stderr: {}", label, stderr.trim());
        }

        if !output.status.success() {
            let message = if stderr.trim().is_empty() {
                stdout.trim().to_string()
            } else {
                stderr.trim().to_string()
            };
            if mentions_permission_denied(&message) {
                return Err(AppError::PermissionDenied(message));
            }
            return Err(AppError::InvocationError {
                command: label.to_string(),
                status: output.status.to_string(),
                stderr: message,
            });
        }

        debug!("adb {} returned {} bytes", label, stdout.len());
        Ok(stdout)
    }

    fn spawn_error(&self, label: &str, e: std::io::Error) -> AppError {
        if e.kind() == std::io::ErrorKind::NotFound {
            AppError::ToolNotFound(format!("{} ({})", self.tool.path.display(), e))
        } else {
            AppError::InvocationError {
                command: label.to_string(),
                status: "failed to start".to_string(),
                stderr: e.to_string(),
            }
        }
    }
}

/// Remote shell argument lists for deleting `paths`, one per batch.
pub fn delete_commands(paths: &[String]) -> Vec<Vec<String>> {
    paths
        .chunks(DELETE_BATCH_SIZE)
        .map(|chunk| {
            let mut args = vec!["rm".to_string(), "-rf".to_string(), "--".to_string()];
            args.extend(chunk.iter().map(|p| shell_quote(p)));
            args
        })
        .collect()
}

fn is_daemon_notice(stderr: &str) -> bool {
    stderr
        .lines()
        .filter(|l| !l.trim().is_empty())
        .all(|l| l.contains("daemon not running") || l.contains("daemon started"))
}

fn mentions_permission_denied(text: &str) -> bool {
    text.contains("Permission denied") || text.contains("Operation not permitted")
}

fn is_shell_error_line(line: &str, tool: &str) -> bool {
    line.starts_with(&format!("{tool}:")) || line.starts_with("/system/bin/sh:")
}

/// Older adb versions exit zero even when the remote command failed, so the
/// output itself is checked. A listing made only of `ls:` error lines is a
/// failure; a mix of entries and errors is kept.
pub fn check_listing_output(path: &str, text: &str) -> Result<()> {
    let lines: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with("total "))
        .collect();

    if lines.is_empty() || !lines.iter().all(|l| is_shell_error_line(l, "ls")) {
        return Ok(());
    }

    let message = lines.join("\n");
    if mentions_permission_denied(&message) {
        Err(AppError::PermissionDenied(path.to_string()))
    } else {
        Err(AppError::InvocationError {
            command: "shell ls".to_string(),
            status: "exit status: 0".to_string(),
            stderr: message,
        })
    }
}

fn check_delete_output(text: &str) -> Result<()> {
    let errors: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|l| is_shell_error_line(l, "rm"))
        .collect();
    if errors.is_empty() {
        return Ok(());
    }

    let message = errors.join("\n");
    if mentions_permission_denied(&message) {
        Err(AppError::PermissionDenied(message))
    } else {
        Err(AppError::InvocationError {
            command: "shell rm".to_string(),
            status: "exit status: 0".to_string(),
            stderr: message,
        })
    }
}

impl DeviceBridge for AdbBridge {
    async fn list_devices(&self) -> Result<Vec<DeviceHandle>> {
        let output = self
            .run("devices", false, vec!["devices".into(), "-l".into()])
            .await?;
        Ok(parse_devices(&output))
    }

    async fn list_directory(&self, path: &str) -> Result<String> {
        let args = vec![
            "shell".into(),
            "ls".into(),
            "-l".into(),
            shell_quote(&listing_target(path)).into(),
        ];
        let output = self.run("shell ls", true, args).await.map_err(|e| match e {
            AppError::PermissionDenied(_) => AppError::PermissionDenied(path.to_string()),
            other => other,
        })?;
        check_listing_output(path, &output)?;
        Ok(output)
    }

    async fn pull(&self, device_path: &str, local_path: &Path) -> Result<()> {
        let args = vec!["pull".into(), device_path.into(), local_path.as_os_str().to_owned()];
        self.run("pull", true, args).await?;
        Ok(())
    }

    async fn push(&self, local_path: &Path, device_path: &str) -> Result<()> {
        let args = vec!["push".into(), local_path.as_os_str().to_owned(), device_path.into()];
        self.run("push", true, args).await?;
        Ok(())
    }

    async fn delete_many(&self, paths: &[String]) -> Result<()> {
        for shell_args in delete_commands(paths) {
            let mut args: Vec<OsString> = vec!["shell".into()];
            args.extend(shell_args.into_iter().map(OsString::from));
            let output = self.run("shell rm", true, args).await?;
            check_delete_output(&output)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adb::locate::ToolSource;

    #[test]
    fn test_delete_commands_batch_and_quote() {
        let paths: Vec<String> = (0..120).map(|i| format!("/sdcard/f {i}")).collect();
        let commands = delete_commands(&paths);

        assert_eq!(commands.len(), 3);
        assert_eq!(commands[0].len(), 3 + DELETE_BATCH_SIZE);
        assert_eq!(commands[2].len(), 3 + 20);
        assert_eq!(&commands[0][..3], ["rm", "-rf", "--"]);
        assert_eq!(commands[0][3], "'/sdcard/f 0'");
        assert_eq!(commands[2].last().unwrap(), "'/sdcard/f 119'");
    }

    #[test]
    fn test_listing_permission_denied() {
        let result = check_listing_output(
            "/data",
            "ls: /data/: Permission denied\n",
        );
        assert!(matches!(result, Err(AppError::PermissionDenied(p)) if p == "/data"));
    }

    #[test]
    fn test_listing_missing_directory() {
        let result = check_listing_output("/nope", "ls: /nope/: No such file or directory\n");
        assert!(matches!(result, Err(AppError::InvocationError { .. })));
    }

    #[test]
    fn test_listing_partial_errors_are_kept() {
        let text = "total 8\n\
                    ls: /sdcard/private: Permission denied\n\
                    -rw-rw---- 1 root sdcard_rw 10 2023-01-01 12:00 a.txt\n";
        assert!(check_listing_output("/sdcard", text).is_ok());
        assert!(check_listing_output("/sdcard", "total 0\n").is_ok());
        assert!(check_listing_output("/sdcard", "").is_ok());
    }

    #[test]
    fn test_delete_output_errors() {
        assert!(check_delete_output("").is_ok());
        assert!(matches!(
            check_delete_output("rm: /system/app: Read-only file system"),
            Err(AppError::InvocationError { .. })
        ));
        assert!(matches!(
            check_delete_output("rm: /data/x: Permission denied"),
            Err(AppError::PermissionDenied(_))
        ));
    }

    #[test]
    fn test_daemon_notice_filter() {
        assert!(is_daemon_notice(
            "* daemon not running; starting now at tcp:5037\n* daemon started successfully\n"
        ));
        assert!(!is_daemon_notice("error: no devices/emulators found"));
    }

    #[test]
    fn test_for_device_shares_tool() {
        let bridge = AdbBridge::new(AdbTool::new("/usr/bin/adb", ToolSource::SearchPath));
        let scoped = bridge.for_device("emulator-5554");
        assert_eq!(scoped.serial(), Some("emulator-5554"));
        assert_eq!(bridge.serial(), None);
        assert!(Arc::ptr_eq(&bridge.tool, &scoped.tool));
    }

    /// Stand-in adb that echoes its argv one per line and appends it to
    /// `argv.log`, each call terminated by a `====` line.
    #[cfg(unix)]
    fn echo_tool(dir: &Path) -> (AdbTool, std::path::PathBuf) {
        use std::os::unix::fs::PermissionsExt;

        let log = dir.join("argv.log");
        let script = dir.join("adb");
        let body = format!(
            "#!/bin/sh\n\
             for a in \"$@\"; do printf '%s\\n' \"$a\"; printf '%s\\n' \"$a\" >> '{log}'; done\n\
             printf '====\\n' >> '{log}'\n",
            log = log.display()
        );
        std::fs::write(&script, body).unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();
        (AdbTool::new(script, ToolSource::CommandLine), log)
    }

    #[cfg(unix)]
    fn logged_calls(log: &Path) -> Vec<Vec<String>> {
        let text = std::fs::read_to_string(log).unwrap();
        text.split("====\n")
            .filter(|call| !call.is_empty())
            .map(|call| call.lines().map(str::to_string).collect())
            .collect()
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_argv_is_passed_without_local_shell() {
        let dir = tempfile::tempdir().unwrap();
        let (tool, log) = echo_tool(dir.path());
        let bridge = AdbBridge::new(tool).for_device("emulator-5554");

        let listing = bridge.list_directory("/sdcard/a b;$(id)").await.unwrap();
        let argv: Vec<&str> = listing.lines().collect();
        assert_eq!(
            argv,
            ["-s", "emulator-5554", "shell", "ls", "-l", "'/sdcard/a b;$(id)/'"]
        );

        let local = dir.path().join("my photo;rm.jpg");
        bridge.pull("/sdcard/DCIM/it's.jpg", &local).await.unwrap();
        bridge.push(&local, "/sdcard/Up loads/").await.unwrap();
        bridge
            .delete_many(&["/sdcard/a b".to_string(), "/sdcard/$(x)".to_string()])
            .await
            .unwrap();

        let local = local.to_string_lossy().into_owned();
        let calls = logged_calls(&log);
        assert_eq!(calls.len(), 4);
        assert_eq!(
            calls[1],
            ["-s", "emulator-5554", "pull", "/sdcard/DCIM/it's.jpg", local.as_str()]
        );
        assert_eq!(
            calls[2],
            ["-s", "emulator-5554", "push", local.as_str(), "/sdcard/Up loads/"]
        );
        assert_eq!(
            calls[3],
            [
                "-s",
                "emulator-5554",
                "shell",
                "rm",
                "-rf",
                "--",
                "'/sdcard/a b'",
                "'/sdcard/$(x)'"
            ]
        );
    }

    #[tokio::test]
    async fn test_missing_tool_maps_to_tool_not_found() {
        let bridge = AdbBridge::new(AdbTool::new(
            "/definitely/not/here/adb",
            ToolSource::Fallback,
        ));
        let result = bridge.list_devices().await;
        assert!(matches!(result, Err(AppError::ToolNotFound(_))));
    }
}
