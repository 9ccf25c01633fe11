//! Core types for vault data structures.
//!
//! - `Position` / `TextRange`: line and character positions inside a file
//! - `VaultFile`: identity of a markdown file inside the vault
//! - `Link` / `MDTag`: parsed link and tag metadata

use std::cmp::Ordering;
use std::ops::Range;

use ropey::Rope;
use serde::{Deserialize, Serialize};

use crate::paths::{file_name_of, parent_of};

/// A zero-based line and character column. Columns count Unicode scalar
/// values from the start of the line.
#[derive(Debug, Default, PartialEq, Eq, Clone, Copy, Hash, Serialize, Deserialize)]
pub struct Position {
    pub line: usize,
    pub character: usize,
}

impl PartialOrd for Position {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Position {
    fn cmp(&self, other: &Self) -> Ordering {
        self.line
            .cmp(&other.line)
            .then(self.character.cmp(&other.character))
    }
}

/// Start and end of a span. The end is exclusive.
#[derive(Debug, Default, PartialEq, Eq, Clone, Copy, Hash, Serialize, Deserialize)]
pub struct TextRange {
    pub start: Position,
    pub end: Position,
}

impl TextRange {
    /// Creates a `TextRange` from a byte offset range using rope for position calculation.
    ///
    /// The rope must be built with LF-only line breaks, so that a `\r` before
    /// `\n` stays part of its line, the same way the line splitter sees it.
    pub fn from_range(rope: &Rope, range: Range<usize>) -> TextRange {
        // convert from byte offset to char offset
        let char_start = rope.byte_to_char(range.start);
        let char_end = rope.byte_to_char(range.end);

        let start_line = rope.char_to_line(char_start);
        let start_offset = char_start - rope.line_to_char(start_line);

        let end_line = rope.char_to_line(char_end);
        let end_offset = char_end - rope.line_to_char(end_line);

        TextRange {
            start: Position {
                line: start_line,
                character: start_offset,
            },
            end: Position {
                line: end_line,
                character: end_offset,
            },
        }
    }

    pub fn is_single_line(&self) -> bool {
        self.start.line == self.end.line
    }

    /// `true` when `self` ends at or before the start of `other`.
    pub fn precedes(&self, other: &TextRange) -> bool {
        self.end <= other.start
    }

    pub fn overlaps(&self, other: &TextRange) -> bool {
        !self.precedes(other) && !other.precedes(self)
    }
}

/// A markdown file in the vault.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VaultFile {
    /// Vault-relative, `/`-separated path; unique within the vault
    pub path: String,
    /// File name including the extension
    pub name: String,
    /// File name without the extension
    pub basename: String,
    pub extension: String,
}

impl VaultFile {
    pub fn new(path: &str) -> VaultFile {
        let name = file_name_of(path);
        let (basename, extension) = match name.rsplit_once('.') {
            Some((base, ext)) if !base.is_empty() => (base, ext),
            _ => (name, ""),
        };

        VaultFile {
            path: path.to_string(),
            name: name.to_string(),
            basename: basename.to_string(),
            extension: extension.to_string(),
        }
    }

    /// Folder containing this file, `""` for the vault root.
    pub fn parent(&self) -> &str {
        parent_of(&self.path)
    }
}

/// An outbound link of a markdown file.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Link {
    /// Link target as written, including any `#subpath`, without the alias
    pub raw_target: String,
    /// The exact source text of the link, brackets and alias included
    pub original: String,
    /// Display alias, if the link has one
    pub display: Option<String>,
    /// The alias separator was written `\|`, as inside a table cell
    pub escaped_alias: bool,
    pub range: TextRange,
}

impl Link {
    /// The `#subpath` part of the target, `#` included.
    pub fn subpath(&self) -> Option<&str> {
        split_subpath(&self.raw_target).1
    }
}

pub(crate) fn split_subpath(target: &str) -> (&str, Option<&str>) {
    match target.find('#') {
        Some(idx) => (&target[..idx], Some(&target[idx..])),
        None => (target, None),
    }
}

/// A tag reference in Markdown (e.g., `#topic`).
#[derive(Debug, PartialEq, Eq, Clone, Hash)]
pub struct MDTag {
    /// Tag text without the leading `#`
    pub tag_ref: String,
    pub range: TextRange,
}

impl MDTag {
    /// The tag as written, with its leading `#`.
    pub fn tag(&self) -> String {
        format!("#{}", self.tag_ref)
    }
}
