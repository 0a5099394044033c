//! Documentation coverage
//!
//! The documentation build dumps every element it documents as a
//! [`DocObject`]: its kind, name, signature parameters, the docstring as
//! rendered by the generator and its source. [`DocInspector`] compares each
//! docstring against the definition and accumulates the findings into
//! [`CoverageData`], from which the coverage percentage is computed.

use anyhow::{Context, Result};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::issue::Issue;
use crate::report::{Report, ReportList, Summary};
use crate::utils::{capitalize, file_has_content, mkdirs_if_not_exists};

lazy_static! {
    static ref PARAMETER: Regex = Regex::new(r":param[ ]*([^:]+):").unwrap();
    static ref FIELD: Regex = Regex::new(r"^:[^:]+:").unwrap();
    static ref STRINGS_AND_COMMENTS: Regex =
        Regex::new(r#"(?s)("""(.*?)"""|#[^\n]*|"(.*?)"|'(.*?)')"#).unwrap();
    static ref RETURN_NONE: Regex = Regex::new(r"return([ ]*None|[ ]*[$\n])").unwrap();
    static ref RETURN_VALUE: Regex = Regex::new(r"return[ ]+(\w|\d|[\[{\(])").unwrap();
    static ref DOC_RETURN: Regex = Regex::new(r":return(s)?:[ ]*(\w|\d)+").unwrap();
}

pub const UNDOCUMENTED_PARAMETER: &str = "undocumented parameter";
pub const UNDOCUMENTED_RETURN: &str = "undocumented return value";
pub const MISSING_DESCRIPTION: &str = "missing description";
pub const UNUSED_PARAMETER: &str = "documented but unused parameter";

/// One documented element as dumped by the documentation build
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocObject {
    /// Element kind as named by the generator: `module`, `class`,
    /// `exception`, `function`, `method`, ...
    pub what: String,
    /// Fully qualified name
    pub name: String,
    /// Source file, absent for elements without one
    #[serde(default)]
    pub file: Option<PathBuf>,
    /// Signature parameter names, absent for non-callables
    #[serde(default)]
    pub params: Option<Vec<String>>,
    /// Docstring lines after processing by the generator
    #[serde(default)]
    pub lines: Vec<String>,
    /// Source code of the element
    #[serde(default)]
    pub source: String,
    /// First and last source line; modules start at line 1
    #[serde(default)]
    pub line_range: Option<(usize, usize)>,
}

impl DocObject {
    /// Docstring lines, trimmed, without blank lines
    fn clean_doc(&self) -> Vec<&str> {
        self.lines
            .iter()
            .map(|line| line.trim())
            .filter(|line| !line.is_empty())
            .collect()
    }

    /// The brief, i.e. the first docstring line unless it is a `:field:`
    pub fn description(&self) -> Option<&str> {
        let doc = self.clean_doc();
        let first = *doc.first()?;
        if FIELD.is_match(first) { None } else { Some(first) }
    }

    fn signature(&self) -> Option<Vec<&str>> {
        if matches!(self.what.as_str(), "class" | "exception") {
            return None;
        }
        let params = self.params.as_ref()?;
        let mut signature: Vec<&str> = params.iter().map(String::as_str).collect();
        if self.what == "method" && signature.first().is_some_and(|p| p.eq_ignore_ascii_case("self")) {
            signature.remove(0);
        }
        Some(signature)
    }

    fn documented_params(&self) -> Vec<&str> {
        self.clean_doc()
            .into_iter()
            .flat_map(|line| PARAMETER.captures_iter(line).filter_map(|c| c.get(1)))
            .map(|m| m.as_str())
            .collect()
    }

    /// Signature parameters without documentation
    pub fn undocumented_params(&self) -> Vec<&str> {
        let Some(signature) = self.signature() else {
            return Vec::new();
        };
        let documented = self.documented_params();
        signature.into_iter().filter(|p| !documented.contains(p)).collect()
    }

    /// Signature parameters with documentation
    pub fn documented_signature_params(&self) -> Vec<&str> {
        let Some(signature) = self.signature() else {
            return Vec::new();
        };
        let documented = self.documented_params();
        signature.into_iter().filter(|p| documented.contains(p)).collect()
    }

    /// Documented parameters the signature does not have
    pub fn unused_params(&self) -> Vec<&str> {
        let Some(signature) = self.signature() else {
            return Vec::new();
        };
        self.documented_params()
            .into_iter()
            .filter(|p| !signature.contains(p))
            .collect()
    }

    /// A function or method returning a value without a `:return:` field.
    ///
    /// Bare returns and `return None` need no documentation.
    pub fn missing_return(&self) -> bool {
        if !matches!(self.what.as_str(), "function" | "method") {
            return false;
        }

        let source = STRINGS_AND_COMMENTS.replace_all(self.source.trim(), "");
        let source = RETURN_NONE.replace_all(&source, "");
        let source = strip_nested(&source);

        RETURN_VALUE.is_match(&source) && !DOC_RETURN.is_match(&self.lines.join("\n"))
    }

    fn span(&self) -> (usize, usize) {
        match (self.what.as_str(), self.line_range) {
            ("module", _) | (_, None) => (1, 1),
            (_, Some((start, end))) => (start.max(1), end.max(start.max(1))),
        }
    }
}

/// Drop indented `def` and `class` blocks, keeping the outermost definition
fn strip_nested(source: &str) -> String {
    let mut kept = Vec::new();
    let mut nested_at: Option<usize> = None;

    for line in source.lines() {
        let body = line.trim_start();
        let indent = line.len() - body.len();

        if let Some(level) = nested_at {
            if body.is_empty() || indent > level {
                continue;
            }
            nested_at = None;
        }

        let is_definition = ["def ", "async def ", "class "].iter().any(|kw| body.starts_with(kw));
        if indent > 0 && is_definition {
            nested_at = Some(indent);
            continue;
        }
        kept.push(line);
    }
    kept.join("\n")
}

/// One documentation gap
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocFinding {
    pub issue: String,
    pub what: String,
    /// Element or parameter the finding refers to
    pub object_name: String,
    pub file: PathBuf,
    pub line_range: (usize, usize),
    pub text: String,
}

impl DocFinding {
    pub fn to_issue(&self) -> Issue {
        Issue::new(format!("{}: {}", capitalize(&self.issue), self.object_name))
            .in_file(&self.file)
            .at_lines([self.line_range.0, self.line_range.1])
            .with_category(capitalize(&self.what))
            .with_description(self.text.clone())
    }
}

/// Accumulated documentation coverage, persisted as JSON between the
/// documentation build and the report
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoverageData {
    /// Number of documented elements per file
    pub documented_elements: BTreeMap<String, u64>,
    pub undocumented_elements: Vec<DocFinding>,
}

impl CoverageData {
    /// Coverage in percent, floored. Nothing documentable counts as fully covered.
    pub fn coverage(&self) -> u64 {
        let documented: u64 = self.documented_elements.values().sum();
        self.ratio(documented, self.undocumented_elements.len() as u64)
    }

    /// Coverage of a single file
    pub fn file_coverage<P: AsRef<Path>>(&self, file: P) -> u64 {
        let file = file.as_ref();
        let key = file.to_string_lossy();
        let documented = self.documented_elements.get(key.as_ref()).copied().unwrap_or(0);
        let undocumented = self
            .undocumented_elements
            .iter()
            .filter(|finding| finding.file == file)
            .count() as u64;
        self.ratio(documented, undocumented)
    }

    fn ratio(&self, documented: u64, undocumented: u64) -> u64 {
        let total = documented + undocumented;
        if total == 0 {
            100
        } else {
            documented * 100 / total
        }
    }
}

#[derive(Debug, Default)]
pub struct DocInspector {
    data: CoverageData,
}

impl DocInspector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn data(&self) -> &CoverageData {
        &self.data
    }

    /// Compare one element's docstring against its definition
    pub fn process(&mut self, object: &DocObject) {
        let Some(file) = object.file.as_deref() else {
            tracing::trace!("Skipping {} without source file", object.name);
            return;
        };
        let content = match fs::read_to_string(file) {
            Ok(content) => content,
            Err(e) => {
                tracing::debug!("Skipping {}: {e}", object.name);
                return;
            }
        };
        let what = &object.what;
        let name = &object.name;

        // An empty file needs no description
        if !content.trim().is_empty() && object.description().is_none() {
            self.add_finding(object, file, name, MISSING_DESCRIPTION, format!("The {what} {name} has no description."));
        } else {
            self.add_documented(file, 1);
        }

        if object.missing_return() {
            self.add_finding(
                object,
                file,
                name,
                UNDOCUMENTED_RETURN,
                format!(
                    "The return value of {what} {name} is not documented. Note that this message \
                     may also have been caused by incorrect indentation."
                ),
            );
        } else {
            self.add_documented(file, 1);
        }

        for param in object.undocumented_params() {
            self.add_finding(
                object,
                file,
                param,
                UNDOCUMENTED_PARAMETER,
                format!("Parameter {param} of {what} {name} is not documented."),
            );
        }

        for param in object.unused_params() {
            self.add_finding(
                object,
                file,
                param,
                UNUSED_PARAMETER,
                format!(
                    "Parameter {param} of {what} {name} has been documented although it is not part \
                     of the {what}'s signature. Note that this may also be a false positive caused by \
                     incorrect indentation. This means parameter documentation exceeding a single \
                     line needs to be indented by a single tab."
                ),
            );
        }

        let documented = object.documented_signature_params().len() as u64;
        self.add_documented(file, documented);
    }

    fn add_finding(&mut self, object: &DocObject, file: &Path, name: &str, issue: &str, text: String) {
        self.data.undocumented_elements.push(DocFinding {
            issue: issue.to_string(),
            what: object.what.clone(),
            object_name: name.to_string(),
            file: file.to_path_buf(),
            line_range: object.span(),
            text,
        });
    }

    fn add_documented(&mut self, file: &Path, count: u64) {
        *self
            .data
            .documented_elements
            .entry(file.to_string_lossy().into_owned())
            .or_insert(0) += count;
    }

    /// Process every element of a doc-object dump (a JSON array)
    pub fn process_dump<P: AsRef<Path>>(&mut self, path: P) -> Result<usize> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read doc objects: {}", path.display()))?;
        let objects: Vec<DocObject> = serde_json::from_str(&content)
            .with_context(|| format!("Invalid doc objects in {}", path.display()))?;
        for object in &objects {
            self.process(object);
        }
        tracing::debug!("Inspected {} documented elements", objects.len());
        Ok(objects.len())
    }

    /// Write the coverage data, replacing an existing file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            mkdirs_if_not_exists(parent)?;
        }
        let json = serde_json::to_string_pretty(&self.data)?;
        fs::write(path, json)
            .with_context(|| format!("Failed to write documentation coverage: {}", path.display()))
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Documentation coverage file {} does not exist", path.display()))?;
        let data = serde_json::from_str(&content)
            .with_context(|| format!("Invalid documentation coverage file {}", path.display()))?;
        Ok(Self { data })
    }

    pub fn coverage(&self) -> u64 {
        self.data.coverage()
    }

    /// Add one list of findings with the coverage as its summary
    pub fn report(&self, section: &str, report: &mut Report) -> Result<()> {
        let issues: Vec<Issue> = self.data.undocumented_elements.iter().map(DocFinding::to_issue).collect();
        let mut list = Issue::to_list(&issues, "", report)?;
        list.summary = Some(Summary::new("Coverage", self.coverage(), "%"));
        report.add(section, list);
        Ok(())
    }

    /// Report the coverage file at `path`, or a failure notice when it is missing or broken
    pub fn report_file<P: AsRef<Path>>(path: P, section: &str, report: &mut Report) -> Result<()> {
        let path = path.as_ref();
        if !file_has_content(path) {
            tracing::warn!("No documentation coverage at {}", path.display());
            return Ok(Self::report_failure(section, report));
        }
        match Self::load(path) {
            Ok(inspector) => inspector.report(section, report),
            Err(e) => {
                tracing::warn!("{e:#}");
                Ok(Self::report_failure(section, report))
            }
        }
    }

    fn report_failure(section: &str, report: &mut Report) {
        let mut list = ReportList::placeholder("Documentation coverage analysis failed.");
        list.summary = Some(Summary::new("Coverage", 0, "%"));
        report.add(section, list);
    }
}
