//! Security analysis
//!
//! Two kinds of checks: static analysis of the package sources (bandit) and
//! an audit of the dependencies (safety) for the active environment, the
//! project config file and every matching requirements file.

use anyhow::{Context, Result};
use globset::Glob;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use super::{Check, Runner, announce_skip, base_vars, skipped_list};
use crate::config::{PathsConfig, SecurityToolConfig, TidyConfig};
use crate::issue::{Issue, IssueFormat};
use crate::report::{Report, ReportList};
use crate::utils::{html_escape, mkdirs_if_not_exists, remove_if_empty, remove_if_exists};

pub const ACTIVE_ENVIRONMENT: &str = "Active Environment";

/// What a dependency audit covers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuditTarget {
    Environment,
    ProjectConfig(PathBuf),
    Requirements(PathBuf),
}

/// One dependency audit and the file its result is written to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Audit {
    /// Heading of the result list
    pub name: String,
    pub target: AuditTarget,
    pub result_file: PathBuf,
}

#[derive(Debug, Default, Deserialize)]
struct SafetyReport {
    #[serde(default)]
    vulnerabilities: Vec<Vulnerability>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Vulnerability {
    vulnerability_id: String,
    package_name: String,
    vulnerable_spec: String,
    analyzed_version: String,
    advisory: String,
}

pub struct SecurityCheck {
    settings: SecurityToolConfig,
    paths: PathsConfig,
    section: String,
    dependencies_section: String,
    bandit_file: PathBuf,
    passed: bool,
}

impl SecurityCheck {
    pub fn new(config: &TidyConfig) -> Self {
        Self {
            settings: config.tools.security.clone(),
            paths: config.paths.clone(),
            section: config.report.sections.security.clone(),
            dependencies_section: config.report.sections.dependencies.clone(),
            bandit_file: config.paths.tmp_file(&config.tools.security.bandit_output),
            passed: false,
        }
    }

    pub fn bandit_file(&self) -> &PathBuf {
        &self.bandit_file
    }

    /// Audits in report order: environment, project config, requirements files
    pub fn audits(&self) -> Result<Vec<Audit>> {
        let config_file = self.paths.project_config_file();
        let config_name = file_name(&config_file);

        let mut audits = vec![
            Audit {
                name: ACTIVE_ENVIRONMENT.to_string(),
                target: AuditTarget::Environment,
                result_file: self.paths.tmp_file("safety-environment.json"),
            },
            Audit {
                result_file: self.paths.tmp_file(&format!("{config_name}.json")),
                name: config_name,
                target: AuditTarget::ProjectConfig(config_file),
            },
        ];

        for requirements in self.requirements_files()? {
            let name = file_name(&requirements);
            audits.push(Audit {
                result_file: self.paths.tmp_file(&format!("{name}.json")),
                name,
                target: AuditTarget::Requirements(requirements),
            });
        }
        Ok(audits)
    }

    /// Files below the repository root matching the requirements glob, sorted
    fn requirements_files(&self) -> Result<Vec<PathBuf>> {
        let pattern = &self.settings.requirements_glob;
        let matcher = Glob::new(pattern)
            .with_context(|| format!("Invalid requirements glob: {pattern}"))?
            .compile_matcher();
        let root = self.paths.resolve("");
        let depth = pattern.split('/').count();

        let mut files: Vec<PathBuf> = WalkDir::new(&root)
            .min_depth(1)
            .max_depth(depth)
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_file())
            .filter(|entry| {
                entry
                    .path()
                    .strip_prefix(&root)
                    .is_ok_and(|relative| matcher.is_match(relative))
            })
            .map(|entry| entry.into_path())
            .collect();
        files.sort();
        Ok(files)
    }

    async fn bandit(&self, runner: &Runner<'_>) -> Result<bool> {
        let vars = base_vars(&self.paths).with_path("output", &self.bandit_file);
        runner.succeeds("Security analysis", &self.settings.bandit, &vars).await
    }

    async fn safety(&self, runner: &Runner<'_>) -> Result<bool> {
        let mut passed = true;
        for audit in self.audits()? {
            let vars = base_vars(&self.paths).with_path("output", &audit.result_file);
            let (template, vars) = match &audit.target {
                AuditTarget::Environment => (&self.settings.safety_environment, vars),
                AuditTarget::ProjectConfig(file) => {
                    (&self.settings.safety_config, vars.with_path("config", file))
                }
                AuditTarget::Requirements(file) => {
                    (&self.settings.safety_requirements, vars.with_path("requirements", file))
                }
            };
            let label = format!("Dependency audit ({})", audit.name);
            passed &= runner.succeeds(&label, template, &vars).await?;
        }
        Ok(passed)
    }

    fn report_audit(&self, audit: &Audit) -> ReportList {
        let mut list = ReportList::new(&audit.name);
        let parsed = fs::read_to_string(&audit.result_file)
            .map_err(anyhow::Error::from)
            .and_then(|content| Ok(serde_json::from_str::<SafetyReport>(&content)?));

        match parsed {
            Ok(result) => {
                for v in result.vulnerabilities {
                    list.add(
                        format!("<b>{}</b> {}", html_escape(&v.package_name), html_escape(&v.vulnerable_spec)),
                        format!(
                            "<b>ID</b>: {}<br /><b>Installed</b>: {}<br />{}",
                            html_escape(&v.vulnerability_id),
                            html_escape(&v.analyzed_version),
                            html_escape(&v.advisory)
                        ),
                    );
                }
            }
            Err(e) => {
                tracing::warn!("No dependency audit for {}: {e:#}", audit.name);
                list.add("Analysis failed.", "");
            }
        }
        list
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

impl Check for SecurityCheck {
    fn name(&self) -> &'static str {
        "Security"
    }

    async fn run(&mut self, runner: &Runner<'_>) -> Result<bool> {
        self.clean()?;
        if !self.settings.enabled {
            announce_skip(runner, self.name());
            self.passed = true;
            return Ok(true);
        }

        mkdirs_if_not_exists(self.paths.tmp_dir())?;
        let bandit = self.bandit(runner).await?;
        let safety = self.safety(runner).await?;
        self.passed = bandit && safety;
        Ok(self.passed)
    }

    fn report(&self, report: &mut Report) -> Result<()> {
        if !self.settings.enabled {
            report.add(&self.dependencies_section, skipped_list());
            report.add(&self.section, skipped_list());
            return Ok(());
        }

        for audit in self.audits()? {
            report.add(&self.dependencies_section, self.report_audit(&audit));
        }

        if !self.bandit_file.is_file() {
            report.add(&self.section, ReportList::placeholder("Analysis failed."));
            return Ok(());
        }
        match IssueFormat::Bandit.parse(&self.bandit_file) {
            Ok(issues) => Issue::report(&issues, &self.section, report),
            Err(e) => {
                tracing::warn!("{e:#}");
                report.add(&self.section, ReportList::placeholder("Analysis failed."));
                Ok(())
            }
        }
    }

    fn clean(&self) -> Result<()> {
        for audit in self.audits()? {
            remove_if_exists(&audit.result_file)?;
        }
        remove_if_exists(&self.bandit_file)?;
        remove_if_empty(self.paths.tmp_dir())
    }

    fn is_passed(&self) -> bool {
        self.passed
    }
}
