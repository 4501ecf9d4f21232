//! System clipboard access.

use arboard::Clipboard;

use crate::error::{AppError, Result};

/// Newline-separated text for a set of device paths.
pub fn paths_text<S: AsRef<str>>(paths: &[S]) -> String {
    paths
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn copy_text(text: &str) -> Result<()> {
    if text.is_empty() {
        return Ok(());
    }
    let mut clipboard = Clipboard::new().map_err(|e| AppError::ClipboardError(e.to_string()))?;
    clipboard
        .set_text(text.trim_end())
        .map_err(|e| AppError::ClipboardError(e.to_string()))
}

/// Read text for pasting into prompts.
pub fn read_text() -> Result<String> {
    Clipboard::new()
        .and_then(|mut clipboard| clipboard.get_text())
        .map_err(|e| AppError::ClipboardError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths_text() {
        assert_eq!(paths_text::<&str>(&[]), "");
        assert_eq!(paths_text(&["/sdcard/a"]), "/sdcard/a");
        assert_eq!(
            paths_text(&["/sdcard/a".to_string(), "/sdcard/b c".to_string()]),
            "/sdcard/a\n/sdcard/b c"
        );
    }
}
