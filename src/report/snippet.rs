//! Code snippets shown as linked pages of the report
//!
//! A snippet is one source file whose lines carry a highlight category.
//! Adapters mark the lines a finding refers to, pick a display window and
//! hand the snippet to the [`Report`](super::Report), which deduplicates
//! snippets by their [`SnippetKey`].

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;

use super::error::ReportError;

/// Highlight category of a single source line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    Good,
    Bad,
    Neutral,
    None,
}

impl Color {
    /// CSS class used by the rendered snippet page
    pub fn css_class(&self) -> &'static str {
        match self {
            Color::Good => "good",
            Color::Bad => "bad",
            Color::Neutral => "neutral",
            Color::None => "none",
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.css_class())
    }
}

/// One physical source line and its highlight
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnippetLine {
    pub content: String,
    pub color: Color,
}

/// Identity of a snippet for deduplication.
///
/// Two snippets with equal keys render to the same page.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SnippetKey {
    path: PathBuf,
    range: (usize, usize),
    colors: Vec<Color>,
}

#[derive(Debug, Clone)]
pub struct CodeSnippet {
    filepath: PathBuf,
    lines: Vec<SnippetLine>,
    range: (usize, usize),
    labels: BTreeMap<Color, String>,
    output_path: Option<PathBuf>,
}

impl CodeSnippet {
    /// Read a source file into a snippet with no highlighting
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read source file: {}", path.display()))?;
        Ok(Self::from_source(path, &content))
    }

    /// Build a snippet from already loaded file content
    pub fn from_source<P: AsRef<Path>>(path: P, content: &str) -> Self {
        let path = path.as_ref();
        let mut lines: Vec<SnippetLine> = content
            .lines()
            .map(|line| SnippetLine {
                content: line.to_string(),
                color: Color::None,
            })
            .collect();

        if lines.is_empty() {
            lines.push(SnippetLine {
                content: String::new(),
                color: Color::None,
            });
        }

        let range = (0, lines.len());
        Self {
            filepath: std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf()),
            lines,
            range,
            labels: BTreeMap::new(),
            output_path: None,
        }
    }

    pub fn filepath(&self) -> &Path {
        &self.filepath
    }

    pub fn lines(&self) -> &[SnippetLine] {
        &self.lines
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Display window as `[start, end)` of 0-based line indices
    pub fn range(&self) -> (usize, usize) {
        self.range
    }

    /// Set the display window, clamped to the file
    pub fn set_range(&mut self, lo: i64, hi: i64) {
        let count = self.lines.len() as i64;
        self.range = (lo.max(0) as usize, hi.min(count).max(0) as usize);
    }

    pub fn labels(&self) -> &BTreeMap<Color, String> {
        &self.labels
    }

    /// Assign the legend label shown for a highlight category
    pub fn set_mark_name(&mut self, color: Color, label: impl Into<String>) {
        self.labels.insert(color, label.into());
    }

    /// Highlight the given 1-based lines. A later mark overwrites an earlier one.
    pub fn mark<I>(&mut self, lines: I, color: Color) -> Result<(), ReportError>
    where
        I: IntoIterator<Item = usize>,
    {
        for line in lines {
            if line == 0 || line > self.lines.len() {
                return Err(ReportError::LineOutOfRange {
                    path: self.filepath.clone(),
                    line,
                    count: self.lines.len(),
                });
            }
            self.lines[line - 1].color = color;
        }
        Ok(())
    }

    /// Page this snippet renders to, relative to the report directory
    pub fn output_path(&self) -> Option<&Path> {
        self.output_path.as_deref()
    }

    pub(crate) fn set_output_path(&mut self, path: PathBuf) {
        self.output_path = Some(path);
    }

    pub fn key(&self) -> SnippetKey {
        SnippetKey {
            path: self.filepath.clone(),
            range: self.range,
            colors: self.lines.iter().map(|line| line.color).collect(),
        }
    }

    /// Heading shown on the snippet page: the path relative to the working directory
    pub fn heading(&self) -> String {
        crate::utils::display_path(&self.filepath)
    }
}
