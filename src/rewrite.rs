//! Rewriting links that point at redirect files.
//!
//! Edits for one file are applied from the tail of the file to its head, so
//! positions recorded before the first edit stay valid for every later one.

use std::cmp::Ordering;

use itertools::Itertools;

use crate::backlinks::LinkFinder;
use crate::error::Result;
use crate::host::{FileStore, Host, LinkGenerator};
use crate::redirect::{resolve_redirect_target, RedirectSet};
use crate::text::SplitCache;
use crate::vault::{Link, VaultFile};

/// A link in `current_file` whose destination is a redirect file, paired
/// with the file that redirect points to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MisleadingLinkAndRealTarget {
    pub current_file: VaultFile,
    pub misleading_link: Link,
    pub real_target: VaultFile,
    real_markdown_link: String,
}

impl MisleadingLinkAndRealTarget {
    /// The replacement text keeps the subpath and alias of the misleading
    /// link.
    pub fn new<G: LinkGenerator + ?Sized>(
        generator: &G,
        current_file: VaultFile,
        misleading_link: Link,
        real_target: VaultFile,
    ) -> MisleadingLinkAndRealTarget {
        let alias = misleading_link
            .display
            .as_deref()
            .filter(|alias| !alias.is_empty());
        let generated = generator.generate_markdown_link(
            &real_target,
            &current_file.path,
            misleading_link.subpath(),
            alias,
        );
        let real_markdown_link = match misleading_link.escaped_alias && alias.is_some() {
            true => escape_alias_separator(generated),
            false => generated,
        };

        MisleadingLinkAndRealTarget {
            current_file,
            misleading_link,
            real_target,
            real_markdown_link,
        }
    }

    pub fn real_markdown_link(&self) -> &str {
        &self.real_markdown_link
    }

    pub fn needs_update(&self) -> bool {
        self.real_markdown_link != self.misleading_link.original
    }
}

/// Writes the alias separator of a wiki link as `\|`.
fn escape_alias_separator(link: String) -> String {
    match link.strip_prefix("[[").and_then(|rest| rest.split_once('|')) {
        Some((target, alias)) => format!("[[{target}\\|{alias}"),
        None => link,
    }
}

/// Orders pairs by descending start position. Overlapping ranges cannot be
/// ordered safely; they are reported and left in their relative order.
pub fn sort_links_from_tail_to_head(
    mut pairs: Vec<MisleadingLinkAndRealTarget>,
) -> Vec<MisleadingLinkAndRealTarget> {
    pairs.sort_by(|a, b| b.misleading_link.range.start.cmp(&a.misleading_link.range.start));

    for (later, earlier) in pairs.iter().tuple_windows() {
        let (later, earlier) = (&later.misleading_link, &earlier.misleading_link);
        if later.range.overlaps(&earlier.range) {
            tracing::warn!(
                "fail to sort links: {} at {:?} overlaps {} at {:?}",
                earlier.original,
                earlier.range,
                later.original,
                later.range
            );
        }
    }

    pairs
}

/// Applies the pairs of one file to its current content and writes it back
/// when at least one link was replaced. Returns the number of replaced
/// links.
pub fn rewrite_links<S: FileStore>(
    store: &mut S,
    cache: &mut SplitCache,
    file: &VaultFile,
    pairs: Vec<MisleadingLinkAndRealTarget>,
) -> Result<usize> {
    let pairs = sort_links_from_tail_to_head(pairs);
    let mut changes: Vec<(String, String)> = Vec::new();

    store.process(&file.path, |content| {
        let mut lines = cache.lines(content).clone();

        for pair in &pairs {
            if !pair.needs_update() {
                continue;
            }

            let link = &pair.misleading_link;
            let (start, end) = (link.range.start, link.range.end);
            if !link.range.is_single_line() {
                tracing::warn!(
                    "link spans several lines, skipped\nfile {}\nfilepath {}\nlink {}",
                    file.name,
                    file.path,
                    link.original
                );
                continue;
            }
            let Some(line) = lines.get_mut(start.line) else {
                tracing::warn!(
                    "can NOT locate link in file, line {} is missing\nfile {}\nfilepath {}\nexpect {}",
                    start.line,
                    file.name,
                    file.path,
                    link.original
                );
                continue;
            };

            let (byte_start, byte_end) = char_span(line, start.character, end.character);
            let found = &line[byte_start..byte_end];
            if found != link.original {
                tracing::warn!(
                    "can NOT locate link in file\nfile {}\nfilepath {}\nexpect {}\nfound {}",
                    file.name,
                    file.path,
                    link.original,
                    found
                );
                continue;
            }

            line.replace_range(byte_start..byte_end, pair.real_markdown_link());
            changes.push((link.original.clone(), pair.real_markdown_link().to_string()));
        }

        if changes.is_empty() {
            return None;
        }

        let new_content = cache.splitter().join_lines(&lines);
        cache.invalidate(content);
        Some(new_content)
    })?;

    if !changes.is_empty() {
        let detail = changes
            .iter()
            .map(|(old, new)| format!("- oldLink: {old}\n  - newLink: {new}"))
            .join("\n");
        tracing::info!(
            "file changed\nfilename: {}\nfilepath: {}\ncountLinksChanged = {}\n{}",
            file.name,
            file.path,
            changes.len(),
            detail
        );
    }

    Ok(changes.len())
}

/// Points every link to a redirect file at the redirect's target, file by
/// file. All pairs are computed before the first write. Returns the number
/// of files that changed.
pub fn replace_links_to_redirect_files<H: Host>(
    host: &mut H,
    finder: &dyn LinkFinder<H>,
    cache: &mut SplitCache,
    redirects: &RedirectSet,
    excluded_path: &str,
) -> Result<usize> {
    let per_file = finder
        .links_into(host, redirects.files())
        .into_iter()
        .filter(|hit| hit.source.path != excluded_path)
        .filter_map(|hit| {
            let real_target = resolve_redirect_target(&*host, &hit.target)?;
            if real_target.path == hit.target.path {
                tracing::debug!("{} redirects to itself, skipped", hit.target.path);
                return None;
            }
            Some(MisleadingLinkAndRealTarget::new(
                &*host,
                hit.source,
                hit.link,
                real_target,
            ))
        })
        .into_group_map_by(|pair| pair.current_file.clone());

    let mut files_changed = 0;
    for (file, pairs) in per_file.into_iter().sorted_by(|a, b| a.0.path.cmp(&b.0.path)) {
        if rewrite_links(host, cache, &file, pairs)? > 0 {
            files_changed += 1;
        }
    }

    Ok(files_changed)
}

/// Byte offsets of the character columns `start..end` in `line`, clamped to
/// the line.
fn char_span(line: &str, start: usize, end: usize) -> (usize, usize) {
    let byte_at = |column: usize| {
        line.char_indices()
            .nth(column)
            .map_or(line.len(), |(idx, _)| idx)
    };
    let (byte_start, byte_end) = (byte_at(start), byte_at(end));
    match byte_start.cmp(&byte_end) {
        Ordering::Greater => (byte_end, byte_end),
        _ => (byte_start, byte_end),
    }
}
