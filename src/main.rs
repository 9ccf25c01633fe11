use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use redirector::cli::Args;
use redirector::commands::{self, list_redirect_files};
use redirector::config::Settings;
use redirector::error::{RedirectorError, Result};
use redirector::host::{Notifier, Workspace};
use redirector::vault::{Vault, VaultFile};

/// Notifications on stdout; logs stay on stderr.
struct TerminalUi {
    root_dir: PathBuf,
    open_in_editor: bool,
}

impl Notifier for TerminalUi {
    fn notify(&self, message: &str) {
        println!("{message}");
    }
}

impl Workspace for TerminalUi {
    fn open_file(&self, file: &VaultFile) -> Result<()> {
        let path = file
            .path
            .split('/')
            .fold(self.root_dir.clone(), |acc, segment| acc.join(segment));
        println!("{}", path.display());

        if !self.open_in_editor {
            return Ok(());
        }
        let Ok(editor) = std::env::var("EDITOR") else {
            return Ok(());
        };

        let status = std::process::Command::new(&editor)
            .arg(&path)
            .status()
            .map_err(|source| RedirectorError::Io {
                path: path.clone(),
                source,
            })?;
        if !status.success() {
            tracing::warn!("{editor} exited with {status}");
        }
        Ok(())
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| args.log_level_filter().into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let root_dir = vault_root(&args.vault)?;
    let settings = Settings::new(&root_dir).context("loading settings")?;
    let mut vault = Vault::construct_vault(&settings, &root_dir)
        .with_context(|| format!("indexing vault {}", root_dir.display()))?;
    tracing::info!("indexed {} markdown files", vault.document_count());

    let Some(command) = args.action.command() else {
        for (file, target) in list_redirect_files(&vault) {
            match target {
                Some(target) => println!("{} -> {}", file.path, target.path),
                None => println!("{} -> (unresolved)", file.path),
            }
        }
        return Ok(());
    };

    let ui = TerminalUi {
        root_dir: vault.root_dir().clone(),
        open_in_editor: settings.open_report,
    };
    commands::run(command, &mut vault, &ui, &settings)
        .with_context(|| format!("running {}", command.name()))?;

    Ok(())
}

fn vault_root(path: &Path) -> anyhow::Result<PathBuf> {
    let root = path
        .canonicalize()
        .with_context(|| format!("vault folder {} is not accessible", path.display()))?;
    anyhow::ensure!(root.is_dir(), "{} is not a folder", root.display());
    Ok(root)
}
