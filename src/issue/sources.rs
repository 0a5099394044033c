use anyhow::{Context, Result, bail};
use lazy_static::lazy_static;
use regex::Regex;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use super::Issue;
use crate::docinspect::CoverageData;
use crate::utils::capitalize;

/// Native result schemas understood by [`IssueFormat::parse`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssueFormat {
    /// flake8 `--format=json`
    Flake8,
    /// bandit `-f json`
    Bandit,
    /// mypy `--junit-xml`
    Mypy,
    /// documentation coverage written by the doc inspector
    DocCoverage,
}

impl IssueFormat {
    /// Read the tool output at `path`.
    ///
    /// A missing file means the tool did not run and yields no issues. A file
    /// that cannot be decoded is an error.
    pub fn parse<P: AsRef<Path>>(&self, path: P) -> Result<Vec<Issue>> {
        let path = path.as_ref();
        if !path.is_file() {
            tracing::debug!("{} not found, assuming {self:?} did not run", path.display());
            return Ok(Vec::new());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        self.parse_str(&content)
            .with_context(|| format!("Could not decode {self:?} output {}", path.display()))
    }

    pub fn parse_str(&self, content: &str) -> Result<Vec<Issue>> {
        match self {
            IssueFormat::Flake8 => parse_flake8(content),
            IssueFormat::Bandit => parse_bandit(content),
            IssueFormat::Mypy => parse_mypy(content),
            IssueFormat::DocCoverage => parse_doc_coverage(content),
        }
    }
}

#[derive(Deserialize)]
struct Flake8Entry {
    code: String,
    line_number: usize,
    #[serde(default)]
    column_number: Option<usize>,
    text: String,
}

fn parse_flake8(content: &str) -> Result<Vec<Issue>> {
    if content.trim().is_empty() {
        return Ok(Vec::new());
    }

    let files: BTreeMap<String, Vec<Flake8Entry>> = serde_json::from_str(content)?;
    let mut issues = Vec::new();
    for (file, entries) in files {
        for entry in entries {
            let mut issue = Issue::new(entry.text)
                .in_file(&file)
                .at_lines([entry.line_number])
                .with_code(entry.code);
            if let Some(column) = entry.column_number {
                issue = issue.with_column(column);
            }
            issues.push(issue);
        }
    }
    Ok(issues)
}

#[derive(Deserialize)]
struct BanditOutput {
    #[serde(default)]
    results: Vec<BanditResult>,
}

#[derive(Deserialize)]
struct BanditResult {
    filename: String,
    line_range: Vec<usize>,
    test_name: String,
    test_id: String,
    issue_text: String,
    #[serde(default)]
    issue_severity: String,
    #[serde(default)]
    issue_confidence: String,
    #[serde(default)]
    more_info: String,
}

fn parse_bandit(content: &str) -> Result<Vec<Issue>> {
    let output: BanditOutput = serde_json::from_str(content)?;
    Ok(output
        .results
        .into_iter()
        .map(|r| {
            Issue::new(format!("{}: {}", r.test_name, r.issue_text))
                .in_file(&r.filename)
                .at_lines(r.line_range)
                .with_code(r.test_id)
                .with_severity(r.issue_severity)
                .with_confidence(r.issue_confidence)
                .with_url(r.more_info)
        })
        .collect())
}

lazy_static! {
    static ref JUNIT_FAILURE: Regex = Regex::new(r"(?s)<failure[^>]*>(.*?)</failure>").unwrap();
    static ref MYPY_MESSAGE: Regex = Regex::new(
        r"(?m)^[ \t]*([^:\n]+?)[ ]*:[ ]*(\d+)[ ]*:[ ]*([^:\n]+?)[ ]*:[ ]*(.+?)[ ]*\[([^\]\n]+)\][ \t]*\r?$"
    )
    .unwrap();
}

fn parse_mypy(content: &str) -> Result<Vec<Issue>> {
    if !content.contains("<testsuite") {
        bail!("not a JUnit XML report");
    }

    let Some(failure) = JUNIT_FAILURE.captures(content) else {
        return Ok(Vec::new());
    };
    let messages = unescape_xml(&failure[1]);

    let mut issues = Vec::new();
    for caps in MYPY_MESSAGE.captures_iter(&messages) {
        let line: usize = caps[2].parse()?;
        issues.push(
            Issue::new(caps[4].trim())
                .in_file(caps[1].trim())
                .at_lines([line])
                .with_code(caps[5].trim())
                .with_category(capitalize(caps[3].trim())),
        );
    }
    Ok(issues)
}

fn unescape_xml(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&#39;", "'")
        .replace("&#10;", "\n")
        .replace("&amp;", "&")
}

fn parse_doc_coverage(content: &str) -> Result<Vec<Issue>> {
    let data: CoverageData = serde_json::from_str(content)?;
    Ok(data.undocumented_elements.iter().map(|finding| finding.to_issue()).collect())
}
