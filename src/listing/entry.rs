use chrono::NaiveDateTime;

/// One file or directory surfaced by a device listing.
///
/// Entries are rebuilt on every listing; only `path` identifies an entry across
/// refreshes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    pub name: String,
    /// Full device-side path (parent joined with `name`).
    pub path: String,
    pub is_dir: bool,
    pub is_symlink: bool,
    /// Where a symlink points, as printed after ` -> `.
    pub link_target: Option<String>,
    /// Byte size for files. `None` for directories and unparseable size tokens.
    pub size: Option<u64>,
    /// Timestamp exactly as the tool printed it, e.g. `2023-01-01 12:00`.
    pub modified: String,
    pub permissions: String,
}

const SIZE_UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

impl FileEntry {
    /// Type label used by the Type column and by grouping.
    ///
    /// `Folder` for directories, the upper-cased extension when the name has
    /// one, `File` otherwise.
    pub fn file_type(&self) -> String {
        if self.is_dir {
            return "Folder".to_string();
        }
        match self.name.rsplit_once('.') {
            Some((_, ext)) if !ext.is_empty() => ext.to_uppercase(),
            _ => "File".to_string(),
        }
    }

    /// Human readable size: `--` for directories, binary units otherwise.
    pub fn size_display(&self) -> String {
        if self.is_dir {
            return "--".to_string();
        }
        format_size(self.size.unwrap_or(0))
    }

    /// Size used for ordering; directories and unknown sizes count as zero.
    pub fn size_for_sort(&self) -> u64 {
        if self.is_dir { 0 } else { self.size.unwrap_or(0) }
    }

    /// Parsed modification time, when the tool used a recognizable layout.
    pub fn modified_at(&self) -> Option<NaiveDateTime> {
        let raw = self.modified.trim();
        NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M")
            .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S"))
            .ok()
    }
}

/// Format a byte count with up to two decimals, trailing zeros removed.
pub fn format_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0 B".to_string();
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < SIZE_UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    let formatted = format!("{value:.2}");
    let trimmed = formatted.trim_end_matches('0').trim_end_matches('.');
    format!("{} {}", trimmed, SIZE_UNITS[unit])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(name: &str) -> FileEntry {
        FileEntry {
            name: name.to_string(),
            path: format!("/sdcard/{name}"),
            is_dir: false,
            is_symlink: false,
            link_target: None,
            size: Some(10),
            modified: "2023-01-01 12:00".to_string(),
            permissions: "-rw-rw----".to_string(),
        }
    }

    #[test]
    fn test_file_type_labels() {
        assert_eq!(file("photo.jpg").file_type(), "JPG");
        assert_eq!(file("archive.tar.gz").file_type(), "GZ");
        assert_eq!(file("README").file_type(), "File");
        assert_eq!(file("trailing.").file_type(), "File");

        let mut dir = file("DCIM");
        dir.is_dir = true;
        assert_eq!(dir.file_type(), "Folder");
    }

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(0), "0 B");
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(4096), "4 KB");
        assert_eq!(format_size(1536), "1.5 KB");
        assert_eq!(format_size(5 * 1024 * 1024 + 1024 * 1024 / 4), "5.25 MB");
    }

    #[test]
    fn test_directory_size_display_ignores_size() {
        let mut dir = file("Music");
        dir.is_dir = true;
        dir.size = Some(4096);
        assert_eq!(dir.size_display(), "--");
        assert_eq!(dir.size_for_sort(), 0);
    }

    #[test]
    fn test_modified_at_accepts_seconds() {
        let mut entry = file("a.txt");
        assert!(entry.modified_at().is_some());
        entry.modified = "2023-01-01 12:00:59".to_string();
        assert!(entry.modified_at().is_some());
        entry.modified = "Jan 1 12:00".to_string();
        assert!(entry.modified_at().is_none());
    }
}
