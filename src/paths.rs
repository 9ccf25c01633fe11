//! Vault path helpers.
//!
//! Vault paths are relative to the vault root and always `/`-separated,
//! independent of the host platform.

use once_cell::sync::OnceCell;

use crate::error::{RedirectorError, Result};

/// Collapses runs of `/` and `\` into a single `/`, trims separators at both
/// ends and replaces non-breaking spaces. The empty path normalizes to `/`.
pub fn normalize_path(path: &str) -> String {
    let mut normalized = String::with_capacity(path.len());
    let mut in_separator = false;

    for c in path.chars() {
        match c {
            '/' | '\\' => {
                if !in_separator {
                    normalized.push('/');
                }
                in_separator = true;
            }
            '\u{00A0}' | '\u{202F}' => {
                normalized.push(' ');
                in_separator = false;
            }
            c => {
                normalized.push(c);
                in_separator = false;
            }
        }
    }

    let trimmed = normalized.trim_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else {
        trimmed.to_string()
    }
}

/// The separator the normalizer produces, computed once.
pub fn path_separator() -> Result<&'static str> {
    static SEPARATOR: OnceCell<String> = OnceCell::new();

    SEPARATOR
        .get_or_try_init(|| detect_separator(&normalize_path("/")))
        .map(String::as_str)
}

fn detect_separator(normalized_root: &str) -> Result<String> {
    let sep = match normalized_root {
        "" => "/",
        other => other,
    };

    match sep {
        "/" | "\\" => Ok(sep.to_string()),
        strange => Err(RedirectorError::UnexpectedPathSeparator(strange.to_string())),
    }
}

/// Joins a folder path and a file name into a normalized vault path.
/// The vault root may be given as `""` or as the separator itself.
pub fn concat_dir_and_file_name(dir_path: &str, file_name: &str) -> Result<String> {
    let sep = path_separator()?;
    let mut prefix = normalize_path(dir_path);

    if prefix.is_empty() || prefix == sep {
        prefix.clear();
    } else if !prefix.ends_with(sep) {
        prefix.push_str(sep);
    }

    Ok(normalize_path(&format!("{prefix}{file_name}")))
}

/// Folder part of a vault path, `""` for files at the vault root.
pub fn parent_of(path: &str) -> &str {
    path.rsplit_once('/').map_or("", |(parent, _)| parent)
}

/// Last segment of a vault path.
pub fn file_name_of(path: &str) -> &str {
    path.rsplit_once('/').map_or(path, |(_, name)| name)
}
