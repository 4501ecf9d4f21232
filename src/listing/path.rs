//! POSIX-style device path helpers.

/// Join a directory path and an entry name with a single separator.
pub fn join_device_path(parent: &str, name: &str) -> String {
    if parent.ends_with('/') {
        format!("{parent}{name}")
    } else {
        format!("{parent}/{name}")
    }
}

/// Parent of a device path, clamped at `/`.
pub fn parent_path(path: &str) -> String {
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        return "/".to_string();
    }
    match trimmed.rsplit_once('/') {
        Some(("", _)) | None => "/".to_string(),
        Some((parent, _)) => parent.to_string(),
    }
}

/// Clean up a path typed by the user: absolute, no trailing separator.
pub fn normalize_device_path(input: &str) -> String {
    let trimmed = input.trim();
    let mut path = if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{trimmed}")
    };
    while path.len() > 1 && path.ends_with('/') {
        path.pop();
    }
    path
}

/// Last path component, used as a display and destination name.
pub fn base_name(path: &str) -> &str {
    let trimmed = path.trim_end_matches('/');
    trimmed.rsplit('/').next().unwrap_or(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join() {
        assert_eq!(join_device_path("/sdcard", "My File.txt"), "/sdcard/My File.txt");
        assert_eq!(join_device_path("/", "sdcard"), "/sdcard");
        assert_eq!(join_device_path("/sdcard/", "a"), "/sdcard/a");
    }

    #[test]
    fn test_parent_clamps_at_root() {
        assert_eq!(parent_path("/sdcard/DCIM/Camera"), "/sdcard/DCIM");
        assert_eq!(parent_path("/sdcard"), "/");
        assert_eq!(parent_path("/"), "/");
        assert_eq!(parent_path("/sdcard/DCIM/"), "/sdcard");
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize_device_path(" sdcard/Download/ "), "/sdcard/Download");
        assert_eq!(normalize_device_path("/"), "/");
        assert_eq!(normalize_device_path("///"), "/");
    }

    #[test]
    fn test_base_name() {
        assert_eq!(base_name("/sdcard/DCIM/IMG 1.jpg"), "IMG 1.jpg");
        assert_eq!(base_name("/sdcard/DCIM/"), "DCIM");
    }
}
