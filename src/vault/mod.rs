mod graph;
mod helpers;
mod metadata;
mod parsing;
mod types;

pub use graph::LinkGraph;
pub use helpers::{get_vault_path, join_relative, relative_vault_path};
pub use metadata::MDMetadata;
pub use types::{Link, MDTag, Position, TextRange, VaultFile};

use std::{
    collections::BTreeMap,
    ops::Range,
    path::{Path, PathBuf},
};

use itertools::Itertools;
use once_cell::sync::Lazy;
use rayon::prelude::*;
use regex::{Captures, Regex};
use ropey::Rope;
use walkdir::WalkDir;

use crate::config::{LinkStyle, NewLinkFormat, Settings};
use crate::error::{RedirectorError, Result};
use crate::host::{FileStore, LinkGenerator, MetadataIndex};
use crate::paths::{file_name_of, normalize_path, parent_of};

use self::parsing::MDCodeBlock;
use self::types::split_subpath;

/// The in memory index of a markdown vault on disk, together with the file
/// operations that keep it current.
///
/// Selection methods do not interpret the data; classification and link
/// analysis happen in the modules consuming the host traits.
#[derive(Debug, Clone)]
pub struct Vault {
    md_files: BTreeMap<String, MDFile>,
    root_dir: PathBuf,
    settings: Settings,
}

impl Vault {
    pub fn construct_vault(settings: &Settings, root_dir: &Path) -> Result<Vault> {
        let md_file_paths = WalkDir::new(root_dir)
            .into_iter()
            .filter_entry(|e| {
                e.depth() == 0
                    || !e
                        .file_name()
                        .to_str()
                        .map(|s| s.starts_with('.'))
                        .unwrap_or(false)
            })
            .flatten()
            .filter(|f| f.file_type().is_file())
            .filter(|f| f.path().extension().and_then(|e| e.to_str()) == Some("md"))
            .collect_vec();

        let md_files: BTreeMap<String, MDFile> = md_file_paths
            .par_iter()
            .flat_map(|p| {
                let vault_path = get_vault_path(root_dir, p.path())?;
                let text = std::fs::read_to_string(p.path()).ok()?;
                let md_file = MDFile::new(settings, &text, VaultFile::new(&vault_path));

                Some((vault_path, md_file))
            })
            .collect();

        tracing::debug!(
            "Indexed {} markdown files under {:?}",
            md_files.len(),
            root_dir
        );

        Ok(Vault {
            md_files,
            root_dir: root_dir.into(),
            settings: settings.clone(),
        })
    }

    pub fn root_dir(&self) -> &PathBuf {
        &self.root_dir
    }

    pub fn document_count(&self) -> usize {
        self.md_files.len()
    }

    fn absolute_path(&self, path: &str) -> PathBuf {
        path.split('/')
            .fold(self.root_dir.clone(), |acc, segment| acc.join(segment))
    }

    /// Re-reads one file and replaces its index entry.
    fn reindex(&mut self, path: &str) -> Result<VaultFile> {
        let text = self.read(path)?;
        let file = VaultFile::new(path);
        if file.extension == "md" {
            let md_file = MDFile::new(&self.settings, &text, file.clone());
            self.md_files.insert(path.to_string(), md_file);
        }
        Ok(file)
    }

    fn exact_file(&self, path: &str) -> Option<VaultFile> {
        self.md_files
            .get(path)
            .or_else(|| self.md_files.get(&format!("{path}.md")))
            .map(|md| md.file.clone())
    }

    fn is_unique_name(&self, file: &VaultFile) -> bool {
        let name = file.name.to_lowercase();
        self.md_files
            .values()
            .filter(|md| md.file.name.to_lowercase() == name)
            .count()
            <= 1
    }
}

impl FileStore for Vault {
    fn markdown_files(&self) -> Vec<VaultFile> {
        self.md_files.values().map(|md| md.file.clone()).collect()
    }

    fn file(&self, path: &str) -> Option<VaultFile> {
        self.md_files.get(path).map(|md| md.file.clone())
    }

    fn read(&self, path: &str) -> Result<String> {
        let absolute = self.absolute_path(path);
        std::fs::read_to_string(&absolute).map_err(|err| RedirectorError::io(absolute, err))
    }

    fn create(&mut self, path: &str, text: &str) -> Result<VaultFile> {
        let path = normalize_path(path);
        let absolute = self.absolute_path(&path);
        if absolute.exists() {
            return Err(RedirectorError::FileExists(path));
        }
        if let Some(parent) = absolute.parent() {
            std::fs::create_dir_all(parent).map_err(|err| RedirectorError::io(parent, err))?;
        }
        std::fs::write(&absolute, text).map_err(|err| RedirectorError::io(&absolute, err))?;

        self.reindex(&path)
    }

    fn modify(&mut self, path: &str, text: &str) -> Result<()> {
        let absolute = self.absolute_path(path);
        if !absolute.is_file() {
            return Err(RedirectorError::FileNotFound(path.to_string()));
        }
        std::fs::write(&absolute, text).map_err(|err| RedirectorError::io(&absolute, err))?;

        self.reindex(path).map(|_| ())
    }

    fn delete(&mut self, path: &str) -> Result<()> {
        let absolute = self.absolute_path(path);
        std::fs::remove_file(&absolute).map_err(|err| match err.kind() {
            std::io::ErrorKind::NotFound => RedirectorError::FileNotFound(path.to_string()),
            _ => RedirectorError::io(&absolute, err),
        })?;
        self.md_files.remove(path);

        Ok(())
    }

    fn rename(&mut self, path: &str, new_path: &str) -> Result<VaultFile> {
        let new_path = normalize_path(new_path);
        let from = self.absolute_path(path);
        let to = self.absolute_path(&new_path);
        if to.exists() {
            return Err(RedirectorError::FileExists(new_path));
        }
        if let Some(parent) = to.parent() {
            std::fs::create_dir_all(parent).map_err(|err| RedirectorError::io(parent, err))?;
        }
        std::fs::rename(&from, &to).map_err(|err| match err.kind() {
            std::io::ErrorKind::NotFound => RedirectorError::FileNotFound(path.to_string()),
            _ => RedirectorError::io(&from, err),
        })?;
        self.md_files.remove(path);

        self.reindex(&new_path)
    }
}

impl MetadataIndex for Vault {
    fn file_metadata(&self, path: &str) -> Option<&MDFile> {
        self.md_files.get(path)
    }

    /// Obsidian-style resolution: relative paths, then exact vault paths,
    /// then file names. Among several name matches, one in the source's
    /// folder wins, then the shortest path.
    fn resolve_link(&self, raw_target: &str, source_path: &str) -> Option<VaultFile> {
        let linkpath = split_subpath(raw_target).0.trim();
        if linkpath.is_empty() {
            return self.file(source_path);
        }

        let source_dir = parent_of(source_path);
        if linkpath.starts_with("./") || linkpath.starts_with("../") {
            let joined = join_relative(source_dir, linkpath)?;
            return self.exact_file(&joined);
        }

        let normalized = normalize_path(linkpath);
        if let Some(file) = self.exact_file(&normalized) {
            return Some(file);
        }

        let wanted = normalized.to_lowercase();
        let wanted_md = match wanted.ends_with(".md") {
            true => wanted.clone(),
            false => format!("{wanted}.md"),
        };
        let wanted_name = file_name_of(&wanted_md);
        let suffix = format!("/{wanted_md}");

        self.md_files
            .values()
            .map(|md| &md.file)
            .filter(|file| file.name.to_lowercase() == wanted_name)
            .filter(|file| !wanted.contains('/') || file.path.to_lowercase().ends_with(&suffix))
            .min_by_key(|file| (file.parent() != source_dir, file.path.len(), file.path.clone()))
            .cloned()
    }
}

impl LinkGenerator for Vault {
    fn generate_markdown_link(
        &self,
        target: &VaultFile,
        source_path: &str,
        subpath: Option<&str>,
        alias: Option<&str>,
    ) -> String {
        let link_path = match self.settings.new_link_format {
            NewLinkFormat::Shortest if self.is_unique_name(target) => target.name.clone(),
            NewLinkFormat::Shortest | NewLinkFormat::Absolute => target.path.clone(),
            NewLinkFormat::Relative => {
                match relative_vault_path(parent_of(source_path), &target.path) {
                    Some(relative) if relative.starts_with("../") => relative,
                    Some(relative) => format!("./{relative}"),
                    None => target.path.clone(),
                }
            }
        };
        let subpath = subpath.unwrap_or_default();

        match self.settings.link_style {
            LinkStyle::Wikilink => {
                let link_path = match target.extension.as_str() {
                    "md" => link_path.strip_suffix(".md").unwrap_or(&link_path),
                    _ => &link_path,
                };
                match alias {
                    Some(alias) => format!("[[{link_path}{subpath}|{alias}]]"),
                    None => format!("[[{link_path}{subpath}]]"),
                }
            }
            LinkStyle::Markdown => {
                let encoded = link_path
                    .split('/')
                    .map(|segment| match segment {
                        "." | ".." => segment.to_string(),
                        segment => urlencoding::encode(segment).into_owned(),
                    })
                    .join("/");
                let encoded_subpath = match subpath.strip_prefix('#') {
                    Some(fragment) => format!("#{}", urlencoding::encode(fragment)),
                    None => String::new(),
                };
                let display = alias.unwrap_or(target.basename.as_str());
                format!("[{display}]({encoded}{encoded_subpath})")
            }
        }
    }
}

/// Parsed metadata of one markdown file.
#[derive(Debug, PartialEq, Clone)]
pub struct MDFile {
    pub file: VaultFile,
    /// Outbound links in document order
    pub links: Vec<Link>,
    pub tags: Vec<MDTag>,
    pub metadata: Option<MDMetadata>,
}

impl MDFile {
    pub fn new(context: &Settings, text: &str, file: VaultFile) -> MDFile {
        let rope = Rope::from_str(text);
        let metadata = MDMetadata::new(text);
        let frontmatter = metadata.as_ref().map(MDMetadata::span);
        let code_blocks = MDCodeBlock::new(text)
            .chain(MDCodeBlock::inline(text))
            .collect_vec();

        let outside_frontmatter =
            |range: &Range<usize>| !frontmatter.as_ref().is_some_and(|fm| range.start < fm.end);
        let outside_code = |range: &Range<usize>| !code_blocks.iter().any(|c| c.includes(range));

        let links = Link::parse(text, &rope)
            .filter(|(range, _)| outside_frontmatter(range))
            .filter(|(range, _)| context.references_in_codeblocks || outside_code(range))
            .map(|(_, link)| link)
            .collect_vec();

        let tags = MDTag::parse(text, &rope)
            .filter(|(range, _)| outside_frontmatter(range))
            .filter(|(range, _)| context.tags_in_codeblocks || outside_code(range))
            .map(|(_, tag)| tag)
            .collect_vec();

        MDFile {
            file,
            links,
            tags,
            metadata,
        }
    }
}

impl Link {
    /// Wiki links and markdown links of `text`, in document order, paired
    /// with their byte spans. Embeds and external URLs are not links.
    pub fn parse<'a>(
        text: &'a str,
        rope: &'a Rope,
    ) -> impl Iterator<Item = (Range<usize>, Link)> + 'a {
        static WIKI_LINK_RE: Lazy<Regex> = Lazy::new(|| {
            Regex::new(r"(?<embed>!?)\[\[(?<target>[^\[\]\|\n]+)(\|(?<display>[^\[\]\n]*))?\]\]")
                .unwrap()
        }); // A [[link]] that does not have any [ or ] in it

        static MD_LINK_RE: Lazy<Regex> = Lazy::new(|| {
            Regex::new(r"(?<embed>!?)\[(?<display>[^\[\]\n]*)\]\((<(?<angled>[^<>\n]+)>|(?<target>[^()\s<>]+))\)")
                .expect("MD Link Not Constructing")
        }); // [display](relativePath)

        let wiki_links = WIKI_LINK_RE.captures_iter(text).flat_map(move |captures| {
            let display = captures.name("display").map(|d| d.as_str().to_string());
            let target = captures.name("target")?.as_str();
            // `[[note\|alias]]` escapes the separator inside table cells
            let (target, escaped_alias) = match target.strip_suffix('\\') {
                Some(unescaped) if display.is_some() => (unescaped, true),
                _ => (target, false),
            };
            let target = target.trim();
            if target.is_empty() {
                return None;
            }
            link_from_captures(rope, &captures, target.to_string(), display)
                .map(|(range, link)| (range, Link { escaped_alias, ..link }))
        });

        let md_links = MD_LINK_RE.captures_iter(text).flat_map(move |captures| {
            let target = captures
                .name("angled")
                .or_else(|| captures.name("target"))?
                .as_str();
            if is_external(target) {
                return None;
            }
            let decoded = urlencoding::decode(target)
                .map_or_else(|_| target.to_string(), |d| d.to_string());
            let display = captures.name("display").map(|d| d.as_str().to_string());
            link_from_captures(rope, &captures, decoded, display)
        });

        wiki_links
            .chain(md_links)
            .sorted_by_key(|(range, _)| range.start)
    }
}

fn link_from_captures(
    rope: &Rope,
    captures: &Captures,
    raw_target: String,
    display: Option<String>,
) -> Option<(Range<usize>, Link)> {
    let full = captures.get(0)?;
    if captures.name("embed").is_some_and(|embed| !embed.as_str().is_empty()) {
        return None;
    }

    Some((
        full.range(),
        Link {
            raw_target,
            original: full.as_str().to_string(),
            display,
            escaped_alias: false,
            range: TextRange::from_range(rope, full.range()),
        },
    ))
}

fn is_external(target: &str) -> bool {
    target.contains("://") || target.starts_with("mailto:") || target.starts_with("data:")
}

impl MDTag {
    fn parse<'a>(
        text: &'a str,
        rope: &'a Rope,
    ) -> impl Iterator<Item = (Range<usize>, MDTag)> + 'a {
        static TAG_RE: Lazy<Regex> = Lazy::new(|| {
            Regex::new(r#"(?x)
                # The tag must be preceded by the start of the string, a newline, or whitespace.
                (?: \A | \n | \s )
                (?<full>
                    \#
                    (?<tag>
                        # First character cannot be a digit.
                        [\p{L}_/'"‘’“”-]
                        [\p{L}0-9_/'"‘’“”-]*
                    )
                )
    "#).unwrap()
        });

        TAG_RE
            .captures_iter(text)
            .flat_map(|c| match (c.name("full"), c.name("tag")) {
                (Some(full), Some(index)) => Some((full, index)),
                _ => None,
            })
            .filter(|(_, index)| index.as_str().chars().any(|c| c.is_alphabetic()))
            .map(move |(full, index)| {
                (
                    full.range(),
                    MDTag {
                        tag_ref: index.as_str().into(),
                        range: TextRange::from_range(rope, full.range()),
                    },
                )
            })
    }
}

#[cfg(test)]
mod tests;
