//! Shared test utilities for the redirector.
//!
//! Only compiled when running tests.

use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::config::Settings;
use crate::error::Result;
use crate::host::{Notifier, Workspace};
use crate::vault::{Vault, VaultFile};

/// Creates a temporary vault directory for testing.
///
/// Returns the temp directory handle (keep it alive for the duration of the
/// test) and the path of a non-hidden `vault` subdirectory. Vault
/// construction skips dot entries, and temp directories may live under
/// hidden paths such as `/tmp/.tmpXXXXX`.
pub fn create_test_vault_dir() -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let vault_dir = temp_dir.path().join("vault");
    fs::create_dir(&vault_dir).expect("Failed to create vault subdirectory");
    (temp_dir, vault_dir)
}

/// Writes `files` (vault path, content) into a fresh vault directory and
/// indexes it with `settings`.
pub fn create_test_vault_with(
    settings: &Settings,
    files: &[(&str, &str)],
) -> (TempDir, PathBuf, Vault) {
    let (temp_dir, vault_dir) = create_test_vault_dir();
    for (path, content) in files {
        write_vault_file(&vault_dir, path, content);
    }
    let vault =
        Vault::construct_vault(settings, &vault_dir).expect("Failed to construct test vault");
    (temp_dir, vault_dir, vault)
}

/// [`create_test_vault_with`] using default settings.
pub fn create_test_vault(files: &[(&str, &str)]) -> (TempDir, PathBuf, Vault) {
    create_test_vault_with(&Settings::default(), files)
}

pub fn write_vault_file(vault_dir: &Path, path: &str, content: &str) {
    let absolute = path.split('/').fold(vault_dir.to_path_buf(), |acc, s| acc.join(s));
    if let Some(parent) = absolute.parent() {
        fs::create_dir_all(parent).expect("Failed to create parent folder");
    }
    fs::write(absolute, content).expect("Failed to write vault file");
}

/// A UI that records what the commands show instead of showing it.
#[derive(Debug, Default)]
pub struct RecordingUi {
    pub notices: RefCell<Vec<String>>,
    pub opened: RefCell<Vec<String>>,
}

impl Notifier for RecordingUi {
    fn notify(&self, message: &str) {
        self.notices.borrow_mut().push(message.to_string());
    }
}

impl Workspace for RecordingUi {
    fn open_file(&self, file: &VaultFile) -> Result<()> {
        self.opened.borrow_mut().push(file.path.clone());
        Ok(())
    }
}
