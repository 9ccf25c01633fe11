//! Operator commands.
//!
//! Each command scans the vault afresh, does its work and ends with exactly
//! one notification.

use crate::backlinks::finder_for;
use crate::config::Settings;
use crate::error::{RedirectorError, Result};
use crate::host::{FileStore, Host, MetadataIndex, Notifier, Ui};
use crate::mover::Mover;
use crate::redirect::{get_redirect_files, resolve_redirect_target};
use crate::report::{create_report, report_path, ReportOutcome};
use crate::rewrite::replace_links_to_redirect_files;
use crate::text::{LineSplitter, SplitCache};
use crate::vault::VaultFile;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    ReportRedirectFiles,
    MoveRedirectFilesBesidesTarget,
    ReplaceLinksToRedirectFiles,
}

impl Command {
    pub const ALL: [Command; 3] = [
        Command::ReportRedirectFiles,
        Command::MoveRedirectFilesBesidesTarget,
        Command::ReplaceLinksToRedirectFiles,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            Command::ReportRedirectFiles => "redirector-report-redirect-files",
            Command::MoveRedirectFilesBesidesTarget => {
                "redirector-move-redirect-file-besides-its-target"
            }
            Command::ReplaceLinksToRedirectFiles => {
                "redirector-replace-links-to-redirect-file-with-links-to-its-target"
            }
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Command::ReportRedirectFiles => "Report redirect-files",
            Command::MoveRedirectFilesBesidesTarget => "Move redirect-file besides its target",
            Command::ReplaceLinksToRedirectFiles => {
                "Replace links to redirect-file with links to its target"
            }
        }
    }

    pub fn from_id(id: &str) -> Option<Command> {
        Command::ALL.into_iter().find(|command| command.id() == id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutcome {
    NoRedirectFiles,
    Report(ReportOutcome),
    Moved(usize),
    Replaced(usize),
}

pub fn run<H: Host, U: Ui>(
    command: Command,
    host: &mut H,
    ui: &U,
    settings: &Settings,
) -> Result<CommandOutcome> {
    tracing::debug!("running {}", command.id());

    match command {
        Command::ReportRedirectFiles => report_redirect_files(host, ui, settings),
        Command::MoveRedirectFilesBesidesTarget => {
            move_redirect_files_besides_target(host, ui, settings)
        }
        Command::ReplaceLinksToRedirectFiles => {
            replace_links_to_redirect_files_with_target(host, ui, settings)
        }
    }
}

pub fn report_redirect_files<H: Host, U: Ui>(
    host: &mut H,
    ui: &U,
    settings: &Settings,
) -> Result<CommandOutcome> {
    let redirects = get_redirect_files(&*host);
    if redirects.is_empty() {
        ui.notify("report finished, NO redirect-file is found");
        return Ok(CommandOutcome::NoRedirectFiles);
    }

    let path = report_path(settings)?;
    let finder = finder_for::<H>(settings.backlink_strategy);
    let outcome = create_report(host, ui, finder.as_ref(), &redirects, &path)?;

    Ok(CommandOutcome::Report(outcome))
}

pub fn move_redirect_files_besides_target<H: Host, U: Ui>(
    host: &mut H,
    ui: &U,
    settings: &Settings,
) -> Result<CommandOutcome> {
    let redirects = get_redirect_files(&*host);
    if redirects.is_empty() {
        ui.notify("move finished, NO redirect-file is found");
        return Ok(CommandOutcome::NoRedirectFiles);
    }

    let finder = finder_for::<H>(settings.backlink_strategy);
    let mut mover = Mover::new(settings, finder.as_ref())?;
    let count = mover.move_redirect_files(host, &redirects)?;

    ui.notify(&format!("move finished, {count} redirect-files are moved"));
    Ok(CommandOutcome::Moved(count))
}

pub fn replace_links_to_redirect_files_with_target<H: Host, U: Ui>(
    host: &mut H,
    ui: &U,
    settings: &Settings,
) -> Result<CommandOutcome> {
    let redirects = get_redirect_files(&*host);
    if redirects.is_empty() {
        ui.notify("replace finished, NO redirect-file is found");
        return Ok(CommandOutcome::NoRedirectFiles);
    }

    let path = report_path(settings)?;
    let finder = finder_for::<H>(settings.backlink_strategy);
    let mut cache = SplitCache::new(LineSplitter::from_settings(settings));
    let count =
        replace_links_to_redirect_files(host, finder.as_ref(), &mut cache, &redirects, &path)?;

    ui.notify(&format!("replace finished, {count} files are replaced"));
    Ok(CommandOutcome::Replaced(count))
}

/// Deletes a file the caller knows exists. A missing file is reported to
/// the operator and returned as an error.
pub fn delete_file<S: FileStore, N: Notifier>(
    store: &mut S,
    notifier: &N,
    path: &str,
) -> Result<()> {
    if store.file(path).is_none() {
        let err = RedirectorError::FileNotFound(path.to_string());
        tracing::error!("{err}");
        notifier.notify(&err.to_string());
        return Err(err);
    }

    store.delete(path)
}

/// Every redirect file with the target its first link resolves to.
pub fn list_redirect_files<H: FileStore + MetadataIndex>(
    host: &H,
) -> Vec<(VaultFile, Option<VaultFile>)> {
    get_redirect_files(host)
        .files()
        .iter()
        .map(|file| (file.clone(), resolve_redirect_target(host, file)))
        .collect()
}
