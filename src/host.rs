//! Collaborators the redirect commands work through.
//!
//! The commands never touch the filesystem or the terminal directly. A host
//! supplies file operations, the parsed metadata of each file, link
//! resolution and link text generation; a UI supplies notifications and a way
//! to show a file to the operator. [`Vault`](crate::vault::Vault) is the
//! filesystem-backed host.

use crate::error::Result;
use crate::vault::{MDFile, VaultFile};

pub trait FileStore {
    /// Every markdown file of the vault, ordered by path.
    fn markdown_files(&self) -> Vec<VaultFile>;

    fn file(&self, path: &str) -> Option<VaultFile>;

    fn read(&self, path: &str) -> Result<String>;

    /// Creates a new file; fails when the path is occupied.
    fn create(&mut self, path: &str, text: &str) -> Result<VaultFile>;

    fn modify(&mut self, path: &str, text: &str) -> Result<()>;

    /// Read-modify-write. The file is written only when `f` returns new
    /// content; the return value tells whether it was.
    fn process<F>(&mut self, path: &str, f: F) -> Result<bool>
    where
        F: FnOnce(&str) -> Option<String>,
    {
        let content = self.read(path)?;
        match f(&content) {
            Some(new_content) => {
                self.modify(path, &new_content)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn delete(&mut self, path: &str) -> Result<()>;

    /// Moves a file; fails when `new_path` is occupied.
    fn rename(&mut self, path: &str, new_path: &str) -> Result<VaultFile>;
}

pub trait MetadataIndex {
    /// Parsed tags, front matter and links of a file.
    fn file_metadata(&self, path: &str) -> Option<&MDFile>;

    /// The file a link target points at, seen from `source_path`.
    fn resolve_link(&self, raw_target: &str, source_path: &str) -> Option<VaultFile>;
}

pub trait LinkGenerator {
    /// Link text pointing at `target`, to be embedded in the file at `source_path`.
    fn generate_markdown_link(
        &self,
        target: &VaultFile,
        source_path: &str,
        subpath: Option<&str>,
        alias: Option<&str>,
    ) -> String;
}

pub trait Workspace {
    /// Shows a file to the operator in an editable view.
    fn open_file(&self, file: &VaultFile) -> Result<()>;
}

pub trait Notifier {
    /// A transient, user-visible message.
    fn notify(&self, message: &str);
}

/// Everything the commands need from the vault side.
pub trait Host: FileStore + MetadataIndex + LinkGenerator {}

impl<T: FileStore + MetadataIndex + LinkGenerator> Host for T {}

/// Everything the commands need from the operator side.
pub trait Ui: Workspace + Notifier {}

impl<T: Workspace + Notifier> Ui for T {}
