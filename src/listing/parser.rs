//! Long-format (`ls -l`) listing parser.

use tracing::debug;

use super::entry::FileEntry;
use super::path::join_device_path;
use crate::error::ParseAnomaly;

/// Turns the text of a directory listing into entries.
///
/// The explorer only talks to this trait, so a different output format can be
/// plugged in without touching navigation or sorting.
pub trait ListingParser: Send + Sync {
    /// Parse one line. `Ok(None)` means the line carries no entry (blank,
    /// `total`, `.` and `..`); `Err` means it did not have the expected shape.
    fn parse_line(
        &self,
        parent: &str,
        line: &str,
    ) -> std::result::Result<Option<FileEntry>, ParseAnomaly>;

    /// Parse a whole listing, dropping malformed lines.
    fn parse(&self, parent: &str, text: &str) -> Vec<FileEntry> {
        text.lines()
            .filter_map(|line| match self.parse_line(parent, line) {
                Ok(entry) => entry,
                Err(anomaly) => {
                    debug!("Dropping listing line: {}", anomaly);
                    None
                }
            })
            .collect()
    }
}

/// Fixed-column parser for `permissions links owner group size date time name`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LongFormatParser;

impl LongFormatParser {
    pub const MIN_TOKENS: usize = 8;
    const SIZE_TOKEN: usize = 4;
    const DATE_TOKEN: usize = 5;
    const TIME_TOKEN: usize = 6;
    const NAME_TOKEN: usize = 7;
}

/// Byte ranges of whitespace-separated tokens.
fn token_spans(line: &str) -> Vec<(usize, usize)> {
    let mut spans = Vec::new();
    let mut start = None;
    for (idx, ch) in line.char_indices() {
        match (ch.is_whitespace(), start) {
            (true, Some(s)) => {
                spans.push((s, idx));
                start = None;
            }
            (false, None) => start = Some(idx),
            _ => {}
        }
    }
    if let Some(s) = start {
        spans.push((s, line.len()));
    }
    spans
}

impl ListingParser for LongFormatParser {
    fn parse_line(
        &self,
        parent: &str,
        line: &str,
    ) -> std::result::Result<Option<FileEntry>, ParseAnomaly> {
        let line = line.trim();
        if line.is_empty() || line.starts_with("total ") {
            return Ok(None);
        }

        let spans = token_spans(line);
        if spans.len() < Self::MIN_TOKENS {
            return Err(ParseAnomaly {
                line: line.to_string(),
                tokens: spans.len(),
            });
        }
        let token = |idx: usize| &line[spans[idx].0..spans[idx].1];

        // The format has no quoting, so the name is everything after the time
        // token, embedded whitespace included. Symlinks append ` -> target`.
        let name = &line[spans[Self::NAME_TOKEN].0..];
        if name == "." || name == ".." {
            return Ok(None);
        }

        let permissions = token(0);
        let is_dir = permissions.starts_with('d');
        let is_symlink = permissions.starts_with('l');
        let (name, link_target) = match name.split_once(" -> ") {
            Some((link, target)) if is_symlink => (link, Some(target.to_string())),
            _ => (name, None),
        };
        let size = if is_dir {
            None
        } else {
            token(Self::SIZE_TOKEN).parse::<u64>().ok()
        };

        Ok(Some(FileEntry {
            name: name.to_string(),
            path: join_device_path(parent, name),
            is_dir,
            is_symlink,
            link_target,
            size,
            modified: format!("{} {}", token(Self::DATE_TOKEN), token(Self::TIME_TOKEN)),
            permissions: permissions.to_string(),
        }))
    }
}
