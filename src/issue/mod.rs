//! Normalized findings
//!
//! Every analysis tool reports problems in its own schema. [`IssueFormat`]
//! turns each schema into [`Issue`] values, and [`Issue::report`] projects
//! them into a report section: one list per file, one highlighted snippet
//! per finding.

use anyhow::Result;
use std::collections::HashMap;
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};

use crate::report::{CodeSnippet, Color, Report, ReportList};
use crate::utils::{absolute, display_path, html_escape};

mod sources;

pub use sources::IssueFormat;

/// One finding of an analysis tool
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Issue {
    /// Absolute path of the affected file
    pub filename: Option<PathBuf>,
    /// Contiguous 1-based line span
    pub lines: Option<RangeInclusive<usize>>,
    pub message: String,
    pub description: Option<String>,
    pub url: Option<String>,
    pub code: Option<String>,
    pub confidence: Option<String>,
    pub severity: Option<String>,
    /// Tool specific category, e.g. `Error` or `Note`
    pub category: Option<String>,
    pub column: Option<usize>,
}

impl Issue {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Self::default()
        }
    }

    /// Attach the affected file, stored as an absolute path
    pub fn in_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.filename = Some(absolute(path));
        self
    }

    /// Attach the affected lines, widened to the span from the lowest to the highest
    pub fn at_lines<I: IntoIterator<Item = usize>>(mut self, lines: I) -> Self {
        self.lines = span(lines);
        self
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = non_empty(code.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = non_empty(description.into());
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = non_empty(url.into());
        self
    }

    pub fn with_confidence(mut self, confidence: impl Into<String>) -> Self {
        self.confidence = non_empty(confidence.into());
        self
    }

    pub fn with_severity(mut self, severity: impl Into<String>) -> Self {
        self.severity = non_empty(severity.into());
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = non_empty(category.into());
        self
    }

    pub fn with_column(mut self, column: usize) -> Self {
        self.column = Some(column);
        self
    }

    /// Add the issues to `section`, one list per affected file.
    ///
    /// Files keep their first-seen order, issues their order within a file.
    /// Issues without a file are listed under an empty heading. Without any
    /// issues the section still receives one empty list.
    pub fn report(issues: &[Issue], section: &str, report: &mut Report) -> Result<()> {
        if issues.is_empty() {
            report.add(section, ReportList::default());
            return Ok(());
        }

        let mut groups: Vec<(Option<&Path>, Vec<&Issue>)> = Vec::new();
        for issue in issues {
            let file = issue.filename.as_deref();
            match groups.iter_mut().find(|(existing, _)| *existing == file) {
                Some((_, members)) => members.push(issue),
                None => groups.push((file, vec![issue])),
            }
        }

        for (file, members) in groups {
            let heading = file.map(display_path).unwrap_or_default();
            let list = Self::to_list(members, heading, report)?;
            report.add(section, list);
        }
        Ok(())
    }

    /// Build one list holding every issue, pooling a snippet per issue
    pub fn to_list<'a, I>(issues: I, heading: impl Into<String>, report: &mut Report) -> Result<ReportList>
    where
        I: IntoIterator<Item = &'a Issue>,
    {
        let mut list = ReportList::new(heading);
        let mut sources: HashMap<PathBuf, Option<CodeSnippet>> = HashMap::new();

        for issue in issues {
            let link = match &issue.filename {
                Some(file) => {
                    let base = sources
                        .entry(file.clone())
                        .or_insert_with(|| match CodeSnippet::from_file(file) {
                            Ok(snippet) => Some(snippet),
                            Err(e) => {
                                tracing::warn!("No snippet for {}: {e:#}", file.display());
                                None
                            }
                        });
                    match base {
                        Some(base) => Some(issue.snippet(base.clone(), report)?),
                        None => None,
                    }
                }
                None => None,
            };
            list.add(html_escape(&issue.message), issue.detail(link.as_deref()));
        }
        Ok(list)
    }

    fn snippet(&self, mut snippet: CodeSnippet, report: &mut Report) -> Result<PathBuf> {
        if let Some(lines) = &self.lines {
            snippet.mark(lines.clone(), Color::Bad)?;
            snippet.set_mark_name(Color::Bad, "Finding");
            report.focus(&mut snippet, *lines.start(), *lines.end());
        }
        Ok(report.add_snippet(snippet))
    }

    /// HTML detail fragment listing the fields that are present
    pub fn detail(&self, link: Option<&Path>) -> String {
        let mut parts = Vec::new();

        if let Some(code) = &self.code {
            parts.push(format!("<b>Code</b>: {}", html_escape(code)));
        }
        if let Some(category) = &self.category {
            parts.push(format!("<b>Type</b>: {}", html_escape(category)));
        }
        if let Some(severity) = &self.severity {
            parts.push(format!("<b>Severity</b>: {}", html_escape(severity)));
        }
        if let Some(confidence) = &self.confidence {
            parts.push(format!("<b>Confidence</b>: {}", html_escape(confidence)));
        }
        if let Some(lines) = &self.lines {
            if lines.start() == lines.end() {
                parts.push(format!("<b>Line</b>: {}", lines.start()));
            } else {
                parts.push(format!("<b>Lines</b>: {} - {}", lines.start(), lines.end()));
            }
        }
        if let Some(column) = self.column {
            parts.push(format!("<b>Column</b>: {column}"));
        }
        if let Some(file) = &self.filename {
            let name = html_escape(&display_path(file));
            match link {
                Some(link) => {
                    let anchor = self.lines.as_ref().map(|l| format!("#{}", l.start())).unwrap_or_default();
                    let href = link.to_string_lossy().replace('\\', "/");
                    parts.push(format!(
                        "<b>File</b>: <a href=\"{}{anchor}\">{name}</a>",
                        html_escape(&href)
                    ));
                }
                None => parts.push(format!("<b>File</b>: {name}")),
            }
        }
        if let Some(url) = &self.url {
            let url = html_escape(url);
            parts.push(format!("<b>More Information</b>: <a href=\"{url}\">{url}</a>"));
        }
        if let Some(description) = &self.description {
            parts.push(html_escape(description));
        }

        parts.join("<br />")
    }
}

fn span<I: IntoIterator<Item = usize>>(lines: I) -> Option<RangeInclusive<usize>> {
    let mut iter = lines.into_iter();
    let first = iter.next()?;
    let (lo, hi) = iter.fold((first, first), |(lo, hi), line| (lo.min(line), hi.max(line)));
    Some(lo..=hi)
}

fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() || trimmed == "None" {
        None
    } else {
        Some(value)
    }
}

#[cfg(test)]
mod tests;
