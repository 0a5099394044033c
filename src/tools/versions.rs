//! Tests against other interpreter and dependency versions (nox by default)

use anyhow::Result;
use lazy_static::lazy_static;
use regex::Regex;
use serde::Deserialize;
use std::collections::BTreeSet;
use std::fs;
use std::path::PathBuf;

use super::{Check, Runner, announce_skip, base_vars, skipped_list};
use crate::config::{PathsConfig, TidyConfig, VersionsToolConfig};
use crate::report::{Report, ReportList, Summary};
use crate::utils::{capitalize, file_has_content, html_escape, remove_if_empty, remove_if_exists};

lazy_static! {
    static ref SIGNATURE: Regex = Regex::new(r"^[ ]*([^\(]+)(\(([^\)]+)\))?").unwrap();
    static ref DEPENDENCY: Regex = Regex::new(r"[ ,]*([^=]+?)[ ]*=[ ]*[^\d]*([\d\.]+)[^\d\.,]*").unwrap();
}

#[derive(Debug, Default, Deserialize)]
struct SessionReport {
    #[serde(default)]
    sessions: Vec<Session>,
}

#[derive(Debug, Default, Deserialize)]
struct Session {
    #[serde(default)]
    signatures: Vec<String>,
    result: Option<String>,
}

/// Interpreter and packages a session signature names.
///
/// `python-3.9(python-dateutil='2.8')` yields `Python 3.9` and
/// `Python-dateutil 2.8`.
pub fn packages(signature: &str) -> Vec<String> {
    let Some(parts) = SIGNATURE.captures(signature) else {
        return Vec::new();
    };
    let mut packages = vec![capitalize(&parts[1].replace('-', " "))];

    if let Some(dependencies) = parts.get(3) {
        for dep in DEPENDENCY.captures_iter(dependencies.as_str()) {
            packages.push(format!("{} {}", capitalize(&dep[1]), &dep[2]));
        }
    }
    packages
}

/// Sorted, deduplicated packages of all signatures of a session
fn session_packages(signatures: &[String]) -> Vec<String> {
    let unique: BTreeSet<String> = signatures.iter().flat_map(|s| packages(s)).collect();
    unique.into_iter().collect()
}

/// Human readable outcome of a session
pub fn describe(name: &str, result: &str) -> String {
    match result {
        "Success" => format!("All tests passed with {name}."),
        "Failed" => format!("One or more tests failed with {name}."),
        "Skipped" => "Nox skipped the test session. See command line output for details.".to_string(),
        "" => "The nox report does not contain any result.".to_string(),
        other => format!("Nox reports: {other}. See command line output for details."),
    }
}

pub struct SupportedVersions {
    settings: VersionsToolConfig,
    paths: PathsConfig,
    section: String,
    result_file: PathBuf,
    env_dir: PathBuf,
    passed: bool,
}

impl SupportedVersions {
    pub fn new(config: &TidyConfig) -> Self {
        Self {
            settings: config.tools.versions.clone(),
            paths: config.paths.clone(),
            section: config.report.sections.versions.clone(),
            result_file: config.paths.tmp_file(&config.tools.versions.output),
            env_dir: config.paths.resolve(&config.tools.versions.env_dir),
            passed: false,
        }
    }

    pub fn result_file(&self) -> &PathBuf {
        &self.result_file
    }

    fn sessions_list(data: &SessionReport) -> ReportList {
        let mut list = ReportList::default();
        for session in &data.sessions {
            let name = session_packages(&session.signatures).join(", ");
            let result = capitalize(session.result.as_deref().unwrap_or("Unknown"));
            list.add(
                html_escape(&format!("{name}: {result}")),
                html_escape(&describe(&name, &result)),
            );
        }
        list.summary = Some(Summary::new("Tested Dependency Combinations", list.count() as u64, ""));
        list
    }
}

impl Check for SupportedVersions {
    fn name(&self) -> &'static str {
        "Versions"
    }

    async fn run(&mut self, runner: &Runner<'_>) -> Result<bool> {
        self.clean()?;
        if !self.settings.enabled {
            announce_skip(runner, self.name());
            self.passed = true;
            return Ok(true);
        }

        crate::utils::mkdirs_if_not_exists(self.paths.tmp_dir())?;
        let vars = base_vars(&self.paths).with_path("output", &self.result_file);
        self.passed = runner.succeeds("Supported versions", &self.settings.command, &vars).await?;
        Ok(self.passed)
    }

    fn report(&self, report: &mut Report) -> Result<()> {
        if !self.settings.enabled {
            report.add(&self.section, skipped_list());
            return Ok(());
        }

        let failed = || ReportList::placeholder("Failed to test other dependency versions.");
        if !file_has_content(&self.result_file) {
            report.add(&self.section, failed());
            return Ok(());
        }

        let content = fs::read_to_string(&self.result_file)?;
        match serde_json::from_str::<SessionReport>(&content) {
            Ok(data) => report.add(&self.section, Self::sessions_list(&data)),
            Err(e) => {
                tracing::warn!("Could not decode {}: {e}", self.result_file.display());
                report.add(&self.section, failed());
            }
        }
        Ok(())
    }

    fn clean(&self) -> Result<()> {
        remove_if_exists(&self.result_file)?;
        remove_if_exists(&self.env_dir)?;
        remove_if_empty(self.paths.tmp_dir())
    }

    fn is_passed(&self) -> bool {
        self.passed
    }
}
