//! redirector: maintenance for redirect notes in a markdown vault
//!
//! A redirect note is a markdown file tagged `#redirect` (or with
//! `redirect: true` in its front matter) whose single link points at the
//! note that holds the real content. Links to redirect notes work, but they
//! are indirections; this crate finds and removes them.
//!
//! # Overview
//!
//! - **Report**: list files linking to redirect notes, and redirect notes
//!   that live in another folder than their target
//! - **Replace**: rewrite links to redirect notes so they point at the target
//! - **Move**: put each redirect note into its target's folder
//!
//! # Architecture
//!
//! The commands only see the vault through the traits in [`host`]:
//!
//! - [`vault`]: the filesystem-backed host (index, link resolution, file operations)
//! - [`redirect`], [`backlinks`]: classification and link lookup
//! - [`report`], [`rewrite`], [`mover`]: the work behind each command
//! - [`commands`]: the operator-facing entry points
//! - [`config`]: settings, loaded with the `config` crate
//!
//! # Usage
//!
//! ```ignore
//! use redirector::commands::{run, Command};
//! use redirector::config::Settings;
//! use redirector::vault::Vault;
//!
//! let settings = Settings::new(&vault_path)?;
//! let mut vault = Vault::construct_vault(&settings, &vault_path)?;
//! run(Command::ReplaceLinksToRedirectFiles, &mut vault, &ui, &settings)?;
//! ```

// Host side: the vault and the traits the commands use
pub mod host;
pub mod vault;

// Redirect handling
pub mod backlinks;
pub mod commands;
pub mod mover;
pub mod redirect;
pub mod report;
pub mod rewrite;

// Configuration, errors and utilities
pub mod cli;
pub mod config;
pub mod error;
pub mod paths;
pub mod text;

// Test utilities (only available in test builds)
#[cfg(test)]
pub mod test_utils;
