//! Quoting for arguments that end up in the device's remote shell.

/// Wrap `s` in single quotes for the remote `sh`, escaping embedded quotes.
pub fn shell_quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', "'\\''"))
}

/// Listing target for `ls -l`.
///
/// A trailing separator makes `ls` list through symlinked directories such as
/// `/sdcard` instead of describing the link itself.
pub fn listing_target(path: &str) -> String {
    if path.ends_with('/') {
        path.to_string()
    } else {
        format!("{path}/")
    }
}
