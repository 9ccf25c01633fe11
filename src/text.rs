//! Splitting file content into lines and joining it back.
//!
//! The separator set is controlled here rather than taken from the platform, so
//! a file mixing `\r\n` and `\n` splits uniformly. Joining always uses one
//! canonical separator; rewritten files come out with normalized line endings.

use std::collections::HashMap;
use std::ops::{Deref, DerefMut};

use crate::config::Settings;

/// Lines produced by [`LineSplitter::split_lines`].
///
/// Remembers whether the separators were kept, so joining can restore the
/// original text exactly in that case.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Lines {
    lines: Vec<String>,
    kept_separators: bool,
}

impl Deref for Lines {
    type Target = Vec<String>;
    fn deref(&self) -> &Self::Target {
        &self.lines
    }
}

impl DerefMut for Lines {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.lines
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineSplitter {
    /// Candidates ordered longest first.
    separators: Vec<String>,
    standard_separator: String,
}

impl Default for LineSplitter {
    fn default() -> Self {
        LineSplitter::new(["\r\n", "\n"], "\n")
    }
}

impl LineSplitter {
    pub fn new<I, S>(separators: I, standard_separator: &str) -> LineSplitter
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut separators: Vec<String> = separators
            .into_iter()
            .map(Into::into)
            .filter(|sep| !sep.is_empty())
            .collect();
        separators.sort_by(|a, b| b.len().cmp(&a.len()));

        LineSplitter {
            separators,
            standard_separator: standard_separator.to_string(),
        }
    }

    pub fn from_settings(settings: &Settings) -> LineSplitter {
        LineSplitter::new(
            settings.line_separators.iter().map(String::as_str),
            &settings.standard_separator,
        )
    }

    /// Scans `text` once, left to right. At each position the candidates are
    /// tried longest first; the first match ends the current line.
    pub fn split_lines(&self, text: &str, keep_separators: bool) -> Lines {
        let mut lines = Vec::new();
        let mut line_start = 0;
        let mut cursor = 0;

        while cursor < text.len() {
            let rest = &text[cursor..];
            match self.separators.iter().find(|sep| rest.starts_with(sep.as_str())) {
                Some(sep) => {
                    let line_end = if keep_separators {
                        cursor + sep.len()
                    } else {
                        cursor
                    };
                    lines.push(text[line_start..line_end].to_string());
                    cursor += sep.len();
                    line_start = cursor;
                }
                None => {
                    cursor += rest.chars().next().map_or(1, char::len_utf8);
                }
            }
        }
        lines.push(text[line_start..].to_string());

        Lines {
            lines,
            kept_separators: keep_separators,
        }
    }

    /// Joins lines with the standard separator. Lines that still carry their
    /// own separators are concatenated as they are.
    pub fn join_lines(&self, lines: &Lines) -> String {
        if lines.kept_separators {
            lines.concat()
        } else {
            lines.join(self.standard_separator.as_str())
        }
    }
}

/// Memoized line splits, keyed by the raw text.
///
/// Lives for one command invocation. Callers that mutate a file should
/// [`invalidate`](SplitCache::invalidate) its old content.
#[derive(Debug, Default)]
pub struct SplitCache {
    splitter: LineSplitter,
    map: HashMap<String, Lines>,
}

impl SplitCache {
    pub fn new(splitter: LineSplitter) -> SplitCache {
        SplitCache::with_map(splitter, HashMap::new())
    }

    pub fn with_map(splitter: LineSplitter, map: HashMap<String, Lines>) -> SplitCache {
        SplitCache { splitter, map }
    }

    pub fn splitter(&self) -> &LineSplitter {
        &self.splitter
    }

    /// Separator-free lines of `text`, computed once per distinct text.
    pub fn lines(&mut self, text: &str) -> &Lines {
        if !self.map.contains_key(text) {
            let lines = self.splitter.split_lines(text, false);
            self.map.insert(text.to_string(), lines);
        }
        &self.map[text]
    }

    pub fn invalidate(&mut self, text: &str) {
        self.map.remove(text);
    }

    pub fn clear(&mut self) {
        self.map.clear();
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}
