//! Formatting and style checks (black, isort and flake8 by default)

use anyhow::Result;
use std::path::PathBuf;

use super::{Check, Runner, announce_skip, base_vars, skipped_list};
use crate::config::{PathsConfig, StyleToolConfig, TidyConfig};
use crate::issue::{Issue, IssueFormat};
use crate::report::{Report, ReportList};
use crate::utils::{file_has_content, mkdirs_if_not_exists, remove_if_empty, remove_if_exists};

pub struct StyleCheck {
    settings: StyleToolConfig,
    paths: PathsConfig,
    section: String,
    result_file: PathBuf,
    passed: bool,
}

impl StyleCheck {
    pub fn new(config: &TidyConfig) -> Self {
        Self {
            settings: config.tools.style.clone(),
            paths: config.paths.clone(),
            section: config.report.sections.style.clone(),
            result_file: config.paths.tmp_file(&config.tools.style.output),
            passed: false,
        }
    }

    pub fn result_file(&self) -> &PathBuf {
        &self.result_file
    }
}

impl Check for StyleCheck {
    fn name(&self) -> &'static str {
        "Style"
    }

    async fn run(&mut self, runner: &Runner<'_>) -> Result<bool> {
        self.clean()?;
        if !self.settings.enabled {
            announce_skip(runner, self.name());
            self.passed = true;
            return Ok(true);
        }

        mkdirs_if_not_exists(self.paths.tmp_dir())?;
        let vars = base_vars(&self.paths).with_path("output", &self.result_file);

        // Formatter failures show up in the check below
        for command in &self.settings.format {
            runner.run("Formatting", command, &vars).await?;
        }

        self.passed = runner.succeeds("Style check", &self.settings.check, &vars).await?;
        Ok(self.passed)
    }

    fn report(&self, report: &mut Report) -> Result<()> {
        if !self.settings.enabled {
            report.add(&self.section, skipped_list());
            return Ok(());
        }
        if !file_has_content(&self.result_file) {
            return Issue::report(&[], &self.section, report);
        }

        match IssueFormat::Flake8.parse(&self.result_file) {
            Ok(issues) => Issue::report(&issues, &self.section, report),
            Err(e) => {
                tracing::warn!("{e:#}");
                report.add(&self.section, ReportList::placeholder("Analysis failed."));
                Ok(())
            }
        }
    }

    fn clean(&self) -> Result<()> {
        remove_if_exists(&self.result_file)?;
        remove_if_empty(self.paths.tmp_dir())
    }

    fn is_passed(&self) -> bool {
        self.passed
    }
}
