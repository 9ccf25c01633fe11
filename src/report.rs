//! The redirect-files report.
//!
//! Two sections, each present only when it has findings:
//!
//! - files linking to a redirect file instead of its target
//! - redirect files that do not sit in their target's folder
//!
//! All links in the report are generated as seen from the report file.

use itertools::Itertools;

use crate::backlinks::{LinkFinder, LinkHit};
use crate::config::Settings;
use crate::error::{RedirectorError, Result};
use crate::host::{FileStore, Host, LinkGenerator, MetadataIndex, Ui};
use crate::paths::concat_dir_and_file_name;
use crate::redirect::{single_link_target, RedirectSet};

const BAD_LINKS_HEADING: &str = "# should NOT link to Redirect-File\n";
const MISPLACED_HEADING: &str =
    "# Redirect-Files are placed at incorrect directory\nshould put each besides its Target-File\n\n";

/// What writing the report ended in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportOutcome {
    /// Nothing was found, no file was written.
    Empty,
    Written(String),
}

pub fn report_path(settings: &Settings) -> Result<String> {
    concat_dir_and_file_name(&settings.report_folder, &settings.report_name)
}

/// Files with links to redirect files, numbered in vault order. The report
/// file itself is never a bad file.
pub fn links_to_redirect_files_text<H>(
    host: &H,
    finder: &dyn LinkFinder<H>,
    redirects: &RedirectSet,
    report_path: &str,
) -> String
where
    H: FileStore + MetadataIndex + LinkGenerator,
{
    let hits = finder
        .links_into(host, redirects.files())
        .into_iter()
        .filter(|hit| hit.source.path != report_path)
        .collect_vec();

    let entries = hits
        .iter()
        .chunk_by(|hit| hit.source.path.as_str())
        .into_iter()
        .enumerate()
        .map(|(idx, (_, group))| {
            let group: Vec<&LinkHit> = group.collect();
            bad_file_entry(host, idx + 1, &group, report_path)
        })
        .collect::<String>();

    match entries.is_empty() {
        true => entries,
        false => format!("{BAD_LINKS_HEADING}{entries}"),
    }
}

fn bad_file_entry<G: LinkGenerator>(
    generator: &G,
    number: usize,
    hits: &[&LinkHit],
    report_path: &str,
) -> String {
    let Some(first) = hits.first() else {
        return String::new();
    };

    let mut entry = format!(
        "## {number}\n### bad-file\n{}\n\n### link to redirect-files\n",
        generator.generate_markdown_link(&first.source, report_path, None, None)
    );
    for hit in hits {
        entry.push_str(&generator.generate_markdown_link(&hit.target, report_path, None, None));
        entry.push_str("\n\n");
    }

    entry
}

/// Redirect files with exactly one resolvable link whose target lives in
/// another folder.
pub fn misplaced_redirect_files_text<H>(
    host: &H,
    redirects: &RedirectSet,
    report_path: &str,
) -> String
where
    H: MetadataIndex + LinkGenerator,
{
    let entries = redirects
        .files()
        .iter()
        .filter(|file| {
            single_link_target(host, file).is_some_and(|target| target.parent() != file.parent())
        })
        .map(|file| {
            format!(
                "{}\n\n",
                host.generate_markdown_link(file, report_path, None, None)
            )
        })
        .collect::<String>();

    match entries.is_empty() {
        true => entries,
        false => format!("{MISPLACED_HEADING}{entries}"),
    }
}

pub fn compose_report<H: Host>(
    host: &H,
    finder: &dyn LinkFinder<H>,
    redirects: &RedirectSet,
    report_path: &str,
) -> String {
    let mut text = links_to_redirect_files_text(host, finder, redirects, report_path);
    text.push_str(&misplaced_redirect_files_text(host, redirects, report_path));
    text
}

/// Deletes `path` when it exists. Returns whether a file was deleted.
pub fn delete_file_if_exist<S: FileStore>(store: &mut S, path: &str) -> Result<bool> {
    match store.delete(path) {
        Ok(()) => Ok(true),
        Err(RedirectorError::FileNotFound(_)) => Ok(false),
        Err(err) => Err(err),
    }
}

/// Replaces the report: the old file goes first, then the new text is
/// written and shown, unless there is nothing to report.
pub fn create_report<H: Host, U: Ui>(
    host: &mut H,
    ui: &U,
    finder: &dyn LinkFinder<H>,
    redirects: &RedirectSet,
    report_path: &str,
) -> Result<ReportOutcome> {
    if delete_file_if_exist(host, report_path)? {
        tracing::debug!("removed previous report {report_path}");
    }

    let text = compose_report(&*host, finder, redirects, report_path);
    if text.is_empty() {
        ui.notify("report finished, nothing to report");
        return Ok(ReportOutcome::Empty);
    }

    let report = host.create(report_path, &text)?;
    ui.open_file(&report)?;
    ui.notify("report finished, see report-file");

    Ok(ReportOutcome::Written(report.path))
}
