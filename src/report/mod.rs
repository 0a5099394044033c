//! Report aggregation
//!
//! A [`Report`] collects the output of every check into named sections of
//! lists and tables, keeps a deduplicated pool of [`CodeSnippet`]s that the
//! entries link to, and renders everything as a set of HTML pages.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Local};

use crate::config::TidyConfig;
use crate::utils::{mkdirs_if_not_exists, remove_if_empty, remove_if_exists};

pub mod elements;
pub mod error;
mod html;
pub mod snippet;

pub use elements::{Element, ListEntry, ReportList, ReportTable, Summary};
pub use error::ReportError;
pub use snippet::{CodeSnippet, Color, SnippetKey};

/// Filesystem locations and layout settings a report needs
#[derive(Debug, Clone)]
pub struct ReportSettings {
    /// Main report document
    pub report_html: PathBuf,
    /// Directory holding the snippet pages
    pub files_dir: PathBuf,
    /// Directory holding intermediate tool output
    pub tmp_dir: PathBuf,
    /// Context lines shown around highlighted code
    pub line_range: usize,
}

impl ReportSettings {
    pub fn from_config(config: &TidyConfig) -> Self {
        Self {
            report_html: config.paths.report_html(),
            files_dir: config.paths.report_files_dir(),
            tmp_dir: config.paths.tmp_dir(),
            line_range: config.report.line_range,
        }
    }

    fn report_dir(&self) -> &Path {
        self.report_html.parent().unwrap_or_else(|| Path::new("."))
    }
}

pub struct Report {
    settings: ReportSettings,
    app_name: String,
    version: String,
    timestamp: DateTime<Local>,
    sections: Vec<(String, Vec<Element>)>,
    snippets: Vec<CodeSnippet>,
    snippet_index: HashMap<SnippetKey, usize>,
}

impl Report {
    pub fn new(settings: ReportSettings, app_name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            settings,
            app_name: app_name.into(),
            version: version.into(),
            timestamp: Local::now(),
            sections: Vec::new(),
            snippets: Vec::new(),
            snippet_index: HashMap::new(),
        }
    }

    pub fn settings(&self) -> &ReportSettings {
        &self.settings
    }

    pub fn app_name(&self) -> &str {
        &self.app_name
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// Append a list or table to a section, creating the section on first use
    pub fn add(&mut self, section: &str, element: impl Into<Element>) {
        let element = element.into();
        match self.sections.iter_mut().find(|(name, _)| name == section) {
            Some((_, elements)) => elements.push(element),
            None => self.sections.push((section.to_string(), vec![element])),
        }
    }

    /// Place a snippet into the pool and return the page it renders to.
    ///
    /// A snippet equal to one already pooled is dropped and resolves to the
    /// existing page.
    pub fn add_snippet(&mut self, mut snippet: CodeSnippet) -> PathBuf {
        let key = snippet.key();
        if let Some(&index) = self.snippet_index.get(&key) {
            tracing::trace!("Snippet for {} already pooled", snippet.filepath().display());
            return self.snippets[index]
                .output_path()
                .map(Path::to_path_buf)
                .unwrap_or_default();
        }

        let index = self.snippets.len();
        let path = self.files_rel_dir().join(format!("{index}.html"));
        snippet.set_output_path(path.clone());
        self.snippet_index.insert(key, index);
        self.snippets.push(snippet);
        path
    }

    /// Show `line_range` lines of context around the 1-based span `first..=last`
    pub fn focus(&self, snippet: &mut CodeSnippet, first: usize, last: usize) {
        let k = self.settings.line_range as i64;
        snippet.set_range(first as i64 - k, last as i64 + k);
    }

    pub fn snippets(&self) -> &[CodeSnippet] {
        &self.snippets
    }

    pub fn section_names(&self) -> impl Iterator<Item = &str> {
        self.sections.iter().map(|(name, _)| name.as_str())
    }

    pub fn section(&self, name: &str) -> Option<&[Element]> {
        self.sections
            .iter()
            .find(|(section, _)| section == name)
            .map(|(_, elements)| elements.as_slice())
    }

    /// Summary metric of a section.
    ///
    /// A section made of a single element that declares a summary reports
    /// that summary; any other section reports its total entry count as
    /// `Issues`.
    pub fn summary(&self, section: &str) -> Result<Summary, ReportError> {
        let elements = self
            .section(section)
            .ok_or_else(|| ReportError::UnknownSection(section.to_string()))?;

        if let [single] = elements {
            if let Some(summary) = single.summary() {
                return Ok(summary.clone());
            }
        }

        let count: usize = elements.iter().map(Element::count).sum();
        Ok(Summary::new("Issues", count as u64, ""))
    }

    /// Value of the summary metric of a section
    pub fn total(&self, section: &str) -> Result<u64, ReportError> {
        self.summary(section).map(|summary| summary.value)
    }

    /// Write the main page and one page per pooled snippet, then delete
    /// snippet pages left over from earlier runs.
    pub fn render(&self) -> Result<()> {
        let report_dir = self.settings.report_dir().to_path_buf();
        mkdirs_if_not_exists(&report_dir)?;
        mkdirs_if_not_exists(&self.settings.files_dir)?;

        let timestamp = self.timestamp.format("%Y-%m-%d %H:%M:%S %Z").to_string();

        let mut summaries = Vec::with_capacity(self.sections.len());
        for (name, _) in &self.sections {
            summaries.push(self.summary(name)?);
        }

        let page = html::MainPage {
            app_name: &self.app_name,
            version: &self.version,
            timestamp: &timestamp,
            sections: &self.sections,
            summaries: &summaries,
        };
        fs::write(&self.settings.report_html, page.render()).with_context(|| {
            format!("Failed to write report: {}", self.settings.report_html.display())
        })?;
        tracing::info!("Wrote {}", self.settings.report_html.display());

        let mut written: HashSet<PathBuf> = HashSet::new();
        for snippet in &self.snippets {
            let Some(name) = snippet.output_path().and_then(|rel| rel.file_name()) else {
                continue;
            };
            let target = self.settings.files_dir.join(name);
            let main_link = pathdiff::diff_paths(&self.settings.report_html, self.settings.files_dir.as_path())
                .unwrap_or_else(|| PathBuf::from("../report.html"));
            let page = html::SnippetPage {
                app_name: &self.app_name,
                version: &self.version,
                timestamp: &timestamp,
                snippet,
                main_link: &main_link,
            };
            fs::write(&target, page.render())
                .with_context(|| format!("Failed to write snippet page: {}", target.display()))?;
            tracing::debug!("Wrote {}", target.display());
            written.insert(target);
        }

        self.remove_stale_pages(&written)
    }

    /// Delete every report artifact
    pub fn remove(&self) -> Result<()> {
        self.clean()?;
        remove_if_exists(&self.settings.report_html)?;
        remove_if_exists(&self.settings.files_dir)?;
        remove_if_empty(self.settings.report_dir())
    }

    /// Delete intermediate tool output
    pub fn clean(&self) -> Result<()> {
        remove_if_exists(&self.settings.tmp_dir)
    }

    fn files_rel_dir(&self) -> PathBuf {
        pathdiff::diff_paths(&self.settings.files_dir, self.settings.report_dir())
            .unwrap_or_else(|| PathBuf::from("files"))
    }

    // Only numbered pages not in `written` go; the directory and other files stay.
    fn remove_stale_pages(&self, written: &HashSet<PathBuf>) -> Result<()> {
        let entries = fs::read_dir(&self.settings.files_dir).with_context(|| {
            format!("Failed to list {}", self.settings.files_dir.display())
        })?;

        for entry in entries.flatten() {
            let path = entry.path();
            let is_html = path.extension().is_some_and(|ext| ext == "html");
            if is_html && !written.contains(&path) {
                tracing::debug!("Removing stale page {}", path.display());
                remove_if_exists(&path)?;
            }
        }
        Ok(())
    }
}
