//! Local filesystem path helpers for the save/upload prompts and for paths
//! pasted into the explorer.

use std::fs;
use std::path::PathBuf;

use crate::error::{AppError, Result};

/// Expand a leading `~` to the home directory.
pub fn expand_tilde(input: &str) -> PathBuf {
    if input == "~"
        && let Some(home) = dirs::home_dir()
    {
        return home;
    }
    if let Some(rest) = input.strip_prefix("~/")
        && let Some(home) = dirs::home_dir()
    {
        return home.join(rest);
    }
    PathBuf::from(input)
}

/// Tab completion for a local path prompt.
///
/// Completes the last component to the longest prefix shared by all matching
/// entries; a unique directory match gets a trailing `/`. Returns `None` when
/// nothing matches or the input cannot be extended.
pub fn complete_local_path(input: &str) -> Option<String> {
    if input.is_empty() {
        return Some("./".to_string());
    }

    let expanded = expand_tilde(input);
    if expanded.is_dir() && !input.ends_with('/') {
        return Some(format!("{input}/"));
    }

    let (dir, prefix, head) = match input.rfind('/') {
        Some(idx) => (
            expand_tilde(&input[..=idx]),
            &input[idx + 1..],
            &input[..=idx],
        ),
        None => (PathBuf::from("."), input, ""),
    };

    let mut matches: Vec<String> = fs::read_dir(&dir)
        .ok()?
        .flatten()
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .filter(|name| name.starts_with(prefix))
        .filter(|name| !name.starts_with('.') || prefix.starts_with('.'))
        .collect();
    matches.sort();

    let completed = match matches.as_slice() {
        [] => return None,
        [only] => {
            let mut single = format!("{head}{only}");
            if dir.join(only).is_dir() {
                single.push('/');
            }
            single
        }
        many => format!("{head}{}", common_prefix(many)),
    };

    (completed != input).then_some(completed)
}

fn common_prefix(names: &[String]) -> &str {
    let first = &names[0];
    let mut end = first.len();
    for name in &names[1..] {
        end = first
            .char_indices()
            .zip(name.chars())
            .take_while(|((_, a), b)| a == b)
            .map(|((i, a), _)| i + a.len_utf8())
            .last()
            .unwrap_or(0)
            .min(end);
    }
    &first[..end]
}

/// Split pasted text into local paths.
///
/// Terminals insert dropped files either one per line or space separated with
/// quoting or backslash escapes, sometimes as `file://` URLs. Only paths that
/// exist locally are returned.
pub fn parse_dropped_paths(text: &str) -> Vec<PathBuf> {
    split_shell_words(text)
        .iter()
        .map(|word| word_to_path(word))
        .filter(|path| path.exists())
        .collect()
}

/// Local files named in the upload prompt.
///
/// The whole input is tried as one path first, so an unquoted name with
/// spaces still works. Otherwise it is split like pasted text and every path
/// must exist.
pub fn upload_sources(input: &str) -> Result<Vec<PathBuf>> {
    let input = input.trim();
    let whole = word_to_path(input);
    if !input.is_empty() && whole.exists() {
        return Ok(vec![whole]);
    }

    let mut sources = Vec::new();
    for word in split_shell_words(input) {
        let path = word_to_path(&word);
        if !path.exists() {
            return Err(AppError::ValidationError(format!(
                "{} does not exist",
                path.display()
            )));
        }
        sources.push(path);
    }
    if sources.is_empty() {
        return Err(AppError::ValidationError("No local file given".to_string()));
    }
    Ok(sources)
}

fn word_to_path(word: &str) -> PathBuf {
    expand_tilde(word.strip_prefix("file://").unwrap_or(word))
}

fn split_shell_words(text: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut in_word = false;
    let mut quote: Option<char> = None;
    let mut chars = text.chars();

    while let Some(c) = chars.next() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some('"'), '\\') => {
                if let Some(next) = chars.next() {
                    current.push(next);
                }
            }
            (Some(_), c) => current.push(c),
            (None, '\'' | '"') => {
                quote = Some(c);
                in_word = true;
            }
            (None, '\\') => {
                if let Some(next) = chars.next() {
                    current.push(next);
                    in_word = true;
                }
            }
            (None, c) if c.is_whitespace() => {
                if in_word {
                    words.push(std::mem::take(&mut current));
                    in_word = false;
                }
            }
            (None, c) => {
                current.push(c);
                in_word = true;
            }
        }
    }
    if in_word {
        words.push(current);
    }
    words
}
