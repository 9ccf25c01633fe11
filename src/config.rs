use std::path::Path;

use config::{Config, File};
use serde::Deserialize;

use crate::error::{RedirectorError, Result};

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// File name of the generated report
    pub report_name: String,
    /// Folder the report is written to; empty means the vault root
    pub report_folder: String,
    /// Open the report for the operator once it is written
    pub open_report: bool,
    pub backlink_strategy: BacklinkStrategy,
    pub link_style: LinkStyle,
    pub new_link_format: NewLinkFormat,
    /// Line separators recognized when splitting file content
    pub line_separators: Vec<String>,
    /// Separator used when lines are joined back together
    pub standard_separator: String,
    pub update_links_on_move: bool,
    pub tags_in_codeblocks: bool,
    pub references_in_codeblocks: bool,
}

/// How links into a set of files are collected.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq)]
pub enum BacklinkStrategy {
    /// Walk every markdown file and resolve each of its links.
    ForwardScan,
    /// Build a reverse link graph once and query incoming edges.
    ReverseIndex,
}

#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq)]
pub enum LinkStyle {
    Wikilink,
    Markdown,
}

#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq)]
pub enum NewLinkFormat {
    Shortest,
    Relative,
    Absolute,
}

impl Settings {
    pub fn new(root_dir: &Path) -> Result<Settings> {
        let expanded = shellexpand::tilde("~/.config/redirector/settings");
        let root = root_dir
            .to_str()
            .ok_or_else(|| RedirectorError::NonUtf8Path(root_dir.to_path_buf()))?;

        let settings = Config::builder()
            .add_source(File::with_name(&expanded).required(false))
            .add_source(File::with_name(&format!("{root}/.redirector")).required(false))
            .set_default("report_name", "korc redirect-files report.md")?
            .set_default("report_folder", "")?
            .set_default("open_report", true)?
            .set_default("backlink_strategy", "ForwardScan")?
            .set_default("link_style", "Wikilink")?
            .set_default("new_link_format", "Shortest")?
            .set_default("line_separators", vec!["\r\n", "\n"])?
            .set_default("standard_separator", "\n")?
            .set_default("update_links_on_move", true)?
            .set_default("tags_in_codeblocks", false)?
            .set_default("references_in_codeblocks", false)?
            .build()?;

        let settings = settings.try_deserialize::<Settings>()?;

        Ok(settings)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            report_name: "korc redirect-files report.md".to_string(),
            report_folder: "".to_string(),
            open_report: true,
            backlink_strategy: BacklinkStrategy::ForwardScan,
            link_style: LinkStyle::Wikilink,
            new_link_format: NewLinkFormat::Shortest,
            line_separators: vec!["\r\n".to_string(), "\n".to_string()],
            standard_separator: "\n".to_string(),
            update_links_on_move: true,
            tags_in_codeblocks: false,
            references_in_codeblocks: false,
        }
    }
}
