//! Sorting configuration and logic for directory listings.

use std::cmp::Ordering;

use crate::listing::FileEntry;

/// Column to sort entries by.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SortKey {
    #[default]
    Name,
    Type,
    Size,
    Date,
}

impl SortKey {
    pub fn label(self) -> &'static str {
        match self {
            SortKey::Name => "Name",
            SortKey::Type => "Type",
            SortKey::Size => "Size",
            SortKey::Date => "Date",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn toggled(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }

    pub fn arrow(self) -> &'static str {
        match self {
            SortDirection::Ascending => "↑",
            SortDirection::Descending => "↓",
        }
    }
}

/// Active key and direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SortState {
    pub key: SortKey,
    pub direction: SortDirection,
}

impl SortState {
    /// Re-selecting the active key flips the direction; a new key starts
    /// ascending.
    pub fn select(&mut self, key: SortKey) {
        if self.key == key {
            self.direction = self.direction.toggled();
        } else {
            self.key = key;
            self.direction = SortDirection::Ascending;
        }
    }

    /// Indicator for a column header, empty unless `key` is active.
    pub fn indicator(&self, key: SortKey) -> &'static str {
        if self.key == key {
            self.direction.arrow()
        } else {
            ""
        }
    }
}

/// Case-insensitive first; the exact name breaks ties so the order is total.
fn compare_names(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

fn compare_by_key(a: &FileEntry, b: &FileEntry, key: SortKey) -> Ordering {
    match key {
        SortKey::Name => compare_names(&a.name, &b.name),
        SortKey::Type => a.file_type().cmp(&b.file_type()),
        SortKey::Size => a.size_for_sort().cmp(&b.size_for_sort()),
        // Unparseable timestamps order before every parseable one.
        SortKey::Date => a.modified_at().cmp(&b.modified_at()),
    }
}

/// Order two entries: directories before files, then by the active key in
/// the active direction. The directory partition ignores the direction.
pub fn compare_entries(a: &FileEntry, b: &FileEntry, sort: SortState) -> Ordering {
    match (a.is_dir, b.is_dir) {
        (true, false) => return Ordering::Less,
        (false, true) => return Ordering::Greater,
        _ => {}
    }

    let primary = compare_by_key(a, b, sort.key);
    match sort.direction {
        SortDirection::Ascending => primary,
        SortDirection::Descending => primary.reverse(),
    }
}

/// Stable sort, so entries that compare equal keep their listing order.
pub fn sort_entries(entries: &mut [&FileEntry], sort: SortState) {
    entries.sort_by(|a, b| compare_entries(a, b, sort));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str, is_dir: bool, size: u64, modified: &str) -> FileEntry {
        FileEntry {
            name: name.to_string(),
            path: format!("/sdcard/{name}"),
            is_dir,
            is_symlink: false,
            link_target: None,
            size: if is_dir { None } else { Some(size) },
            modified: modified.to_string(),
            permissions: String::new(),
        }
    }

    fn fixture() -> Vec<FileEntry> {
        vec![
            entry("zeta.txt", false, 10, "2023-01-03 10:00"),
            entry("Music", true, 0, "2023-01-01 10:00"),
            entry("alpha.mp3", false, 3000, "2023-01-02 10:00"),
            entry("DCIM", true, 0, "2023-01-05 10:00"),
            entry("beta.jpg", false, 200, "2022-12-31 23:59"),
        ]
    }

    fn names(entries: &[&FileEntry]) -> Vec<String> {
        entries.iter().map(|e| e.name.clone()).collect()
    }

    #[test]
    fn test_select_toggles_and_resets() {
        let mut sort = SortState::default();
        sort.select(SortKey::Name);
        assert_eq!(sort.direction, SortDirection::Descending);
        sort.select(SortKey::Name);
        assert_eq!(sort.direction, SortDirection::Ascending);

        sort.select(SortKey::Name);
        sort.select(SortKey::Size);
        assert_eq!(sort.key, SortKey::Size);
        assert_eq!(sort.direction, SortDirection::Ascending);
    }

    #[test]
    fn test_directories_first_for_every_key_and_direction() {
        let data = fixture();
        for key in [SortKey::Name, SortKey::Type, SortKey::Size, SortKey::Date] {
            for direction in [SortDirection::Ascending, SortDirection::Descending] {
                let mut refs: Vec<&FileEntry> = data.iter().collect();
                sort_entries(&mut refs, SortState { key, direction });
                let first_file = refs.iter().position(|e| !e.is_dir).unwrap();
                assert!(refs[..first_file].iter().all(|e| e.is_dir));
                assert!(refs[first_file..].iter().all(|e| !e.is_dir));
            }
        }
    }

    #[test]
    fn test_sort_by_name_descending() {
        let data = fixture();
        let mut refs: Vec<&FileEntry> = data.iter().collect();
        sort_entries(
            &mut refs,
            SortState {
                key: SortKey::Name,
                direction: SortDirection::Descending,
            },
        );
        assert_eq!(
            names(&refs),
            vec!["Music", "DCIM", "zeta.txt", "beta.jpg", "alpha.mp3"]
        );
    }

    #[test]
    fn test_sort_by_size_and_date() {
        let data = fixture();
        let mut refs: Vec<&FileEntry> = data.iter().collect();
        sort_entries(
            &mut refs,
            SortState {
                key: SortKey::Size,
                direction: SortDirection::Ascending,
            },
        );
        // Directories tie on size and keep listing order.
        assert_eq!(
            names(&refs),
            vec!["Music", "DCIM", "zeta.txt", "beta.jpg", "alpha.mp3"]
        );

        sort_entries(
            &mut refs,
            SortState {
                key: SortKey::Date,
                direction: SortDirection::Ascending,
            },
        );
        assert_eq!(
            names(&refs),
            vec!["Music", "DCIM", "beta.jpg", "alpha.mp3", "zeta.txt"]
        );
    }

    #[test]
    fn test_name_sort_ignores_case() {
        let data = vec![
            entry("b.txt", false, 1, ""),
            entry("Zoo.txt", false, 1, ""),
            entry("apple.txt", false, 1, ""),
            entry("IMG_1.jpg", false, 1, ""),
            entry("readme", false, 1, ""),
            entry("README", false, 1, ""),
        ];
        let mut refs: Vec<&FileEntry> = data.iter().collect();
        sort_entries(&mut refs, SortState::default());
        assert_eq!(
            names(&refs),
            vec!["apple.txt", "b.txt", "IMG_1.jpg", "README", "readme", "Zoo.txt"]
        );
    }

    #[test]
    fn test_sort_by_type() {
        let data = fixture();
        let mut refs: Vec<&FileEntry> = data.iter().collect();
        sort_entries(
            &mut refs,
            SortState {
                key: SortKey::Type,
                direction: SortDirection::Ascending,
            },
        );
        assert_eq!(&names(&refs)[2..], ["beta.jpg", "alpha.mp3", "zeta.txt"]);
    }
}
