//! Redirect classification and single-hop target resolution.

use std::collections::BTreeSet;

use serde_yaml::Value;

use crate::host::{FileStore, MetadataIndex};
use crate::vault::{MDFile, VaultFile};

const REDIRECT_TAG: &str = "#redirect";

/// A file is a redirect when it carries a `#redirect` tag (any case, exact
/// match) or its front matter has `redirect: true` as a boolean.
pub fn is_redirect_file(metadata: Option<&MDFile>) -> bool {
    let Some(metadata) = metadata else {
        return false;
    };

    let tagged = metadata
        .tags
        .iter()
        .any(|tag| tag.tag().to_lowercase() == REDIRECT_TAG);

    let flagged = metadata
        .metadata
        .as_ref()
        .and_then(|fm| fm.redirect())
        .is_some_and(|value| *value == Value::Bool(true));

    tagged || flagged
}

/// The redirect files of one command invocation, in vault order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RedirectSet {
    files: Vec<VaultFile>,
    paths: BTreeSet<String>,
}

impl RedirectSet {
    pub fn contains(&self, path: &str) -> bool {
        self.paths.contains(path)
    }

    pub fn files(&self) -> &[VaultFile] {
        &self.files
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl FromIterator<VaultFile> for RedirectSet {
    fn from_iter<T: IntoIterator<Item = VaultFile>>(iter: T) -> Self {
        let files: Vec<VaultFile> = iter.into_iter().collect();
        let paths = files.iter().map(|file| file.path.clone()).collect();
        RedirectSet { files, paths }
    }
}

pub fn get_redirect_files<H: FileStore + MetadataIndex>(host: &H) -> RedirectSet {
    host.markdown_files()
        .into_iter()
        .filter(|file| is_redirect_file(host.file_metadata(&file.path)))
        .inspect(|file| tracing::debug!("{} is a redirect-file", file.path))
        .collect()
}

/// Resolves the first link of `file`. Chained redirects are not followed.
pub fn resolve_redirect_target<M: MetadataIndex>(host: &M, file: &VaultFile) -> Option<VaultFile> {
    let link = host.file_metadata(&file.path)?.links.first()?;
    host.resolve_link(&link.raw_target, &file.path)
}

/// Resolves the link of a file that has exactly one. Files with no links or
/// several are ambiguous and give `None`.
pub fn single_link_target<M: MetadataIndex>(host: &M, file: &VaultFile) -> Option<VaultFile> {
    match host.file_metadata(&file.path)?.links.as_slice() {
        [link] => host.resolve_link(&link.raw_target, &file.path),
        _ => None,
    }
}
