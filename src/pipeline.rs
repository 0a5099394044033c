//! Command pipelines
//!
//! The [`Manager`] drives the tool adapters, the report and the badges for the
//! `report`, `build`, `doc` and `remove` commands.

use anyhow::{Result, bail};

use crate::badge::{BadgeWriter, Readme};
use crate::cli::Output;
use crate::config::TidyConfig;
use crate::project::{CalVersion, Meta};
use crate::report::{Report, ReportSettings};
use crate::tools::{Build, Check, Checks, Runner};
use crate::utils::display_path;

pub struct Manager<'a> {
    config: TidyConfig,
    output: &'a Output,
    keep: bool,
    checks: Checks,
    build: Build,
}

impl<'a> Manager<'a> {
    /// `keep` leaves intermediate files in place after a command
    pub fn new(config: TidyConfig, output: &'a Output, keep: bool) -> Self {
        let checks = Checks::new(&config);
        let build = Build::new(&config);
        Self {
            config,
            output,
            keep,
            checks,
            build,
        }
    }

    fn runner(&self) -> Runner<'a> {
        Runner::new(self.output, &self.config.paths.base, self.config.tools.timeout_secs)
    }

    /// Package name and version for the report header
    fn package_meta(&self) -> (String, String) {
        let meta = Meta::load(self.config.paths.project_config_file());
        let get = |key: &str| match &meta {
            Ok(meta) => meta.get_string(key).unwrap_or_else(|e| {
                tracing::warn!("{e:#}");
                "unknown".to_string()
            }),
            Err(_) => "unknown".to_string(),
        };
        (get("name"), get("version"))
    }

    fn new_report(&self) -> Report {
        let (name, version) = self.package_meta();
        Report::new(ReportSettings::from_config(&self.config), name, version)
    }

    /// Run every check and render the report.
    ///
    /// Returns whether all checks passed.
    pub async fn report(&mut self) -> Result<bool> {
        let (_, passed) = self.run_report().await?;
        Ok(passed)
    }

    async fn run_report(&mut self) -> Result<(Report, bool)> {
        let runner = self.runner();
        let mut report = self.new_report();
        let checks = &mut self.checks;

        self.output.step("Checking dependencies...");
        let security = checks.security.run(&runner).await?;
        self.output.step("Styling code...");
        let style = checks.style.run(&runner).await?;
        self.output.step("Checking types...");
        let types = checks.types.run(&runner).await?;
        self.output.step("Running tests...");
        let test = checks.test.run(&runner).await?;
        self.output.step("Running tests with other python and dependency versions...");
        let versions = checks.versions.run(&runner).await?;
        self.output.step("Generating documentation...");
        let docs = checks.docs.run(&runner).await?;

        checks.versions.report(&mut report)?;
        checks.test.report(&mut report)?;
        checks.docs.report(&mut report)?;
        checks.security.report(&mut report)?;
        checks.style.report(&mut report)?;
        checks.types.report(&mut report)?;

        report.render()?;
        self.output.success(&format!(
            "Report written to {}",
            display_path(self.config.paths.report_html())
        ));

        if !self.keep {
            checks.test.clean()?;
            checks.security.clean()?;
            checks.style.clean()?;
            checks.docs.clean()?;
            report.clean()?;
            checks.types.clean()?;
        }

        let passed = security && style && types && test && versions && docs;
        Ok((report, passed))
    }

    /// Bump the version, analyze, update the badges and build the distributions.
    ///
    /// Returns whether all checks and the build passed.
    pub async fn build(&mut self) -> Result<bool> {
        self.bump_version()?;
        self.remove_artifacts()?;
        let (report, passed) = self.run_report().await?;

        let paths = &self.config.paths;
        let sections = &self.config.report.sections;
        let thresholds = &self.config.badges;

        let readme = match Readme::load(paths.readme_file()) {
            Ok(readme) => Some(readme),
            Err(e) => {
                tracing::warn!("README badges are not updated: {e:#}");
                None
            }
        };
        let mut badges = BadgeWriter::new(paths.badge_dir(), readme);

        badges.coverage_badge("test coverage", report.total(&sections.test)? as f64, &thresholds.test_coverage)?;
        badges.coverage_badge(
            "doc coverage",
            report.total(&sections.documentation)? as f64,
            &thresholds.doc_coverage,
        )?;
        let vulnerabilities = report.total(&sections.security)? + report.total(&sections.dependencies)?;
        badges.issue_badge("vulnerabilities", Some(vulnerabilities), &thresholds.security_issues)?;
        badges.pass_fail_badge("test", self.checks.test.is_passed())?;
        // The packaged README always shows a passing build
        badges.pass_fail_badge("build", true)?;
        badges.write_absolute_readme()?;

        let runner = self.runner();
        self.output.step("Building wheels...");
        let built = self.build.run(&runner).await?;
        badges.pass_fail_badge("build", built)?;
        badges.write_relative_readme()?;

        // Regenerated to pick up the new badges
        self.output.step("Updating documentation...");
        self.checks.docs.run(&runner).await?;

        self.clean()?;
        Ok(passed && built)
    }

    fn bump_version(&self) -> Result<()> {
        let config_file = self.config.paths.project_config_file();
        if !config_file.is_file() {
            tracing::warn!("No project config at {}, version unchanged", config_file.display());
            return Ok(());
        }

        let old = Meta::load(&config_file)?.get_string("version").unwrap_or_default();
        let version = CalVersion::next(&old);
        self.output.info(&format!("Setting version to {version}."));
        version.bump(&config_file, &self.config.tools.build.version_regex)
    }

    /// Generate the documentation
    pub async fn doc(&mut self) -> Result<bool> {
        let runner = self.runner();
        self.output.step("Generating documentation...");
        let passed = self.checks.docs.run(&runner).await?;

        if !self.keep {
            self.checks.docs.clean()?;
        }
        Ok(passed)
    }

    /// Delete everything the other commands generate
    pub fn remove(&self) -> Result<()> {
        if self.keep {
            bail!("Keep option does not make sense when executing remove command");
        }
        self.remove_artifacts()
    }

    fn remove_artifacts(&self) -> Result<()> {
        self.output.step("Removing build artifacts...");
        self.build.remove()?;
        self.output.step("Removing reports...");
        self.new_report().remove()?;

        self.output.step("Removing temporary files...");
        self.checks.style.remove()?;
        self.checks.test.remove()?;
        self.checks.docs.remove()?;
        self.checks.security.remove()?;
        self.checks.types.remove()?;
        self.checks.versions.remove()?;
        self.clean()
    }

    /// Delete intermediate files of every tool, unless they are kept
    pub fn clean(&self) -> Result<()> {
        if self.keep {
            return Ok(());
        }

        self.new_report().clean()?;
        self.build.clean()?;
        self.checks.style.clean()?;
        self.checks.test.clean()?;
        self.checks.docs.clean()?;
        self.checks.security.clean()?;
        self.checks.types.clean()?;
        self.checks.versions.clean()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn disabled_config(temp: &TempDir) -> TidyConfig {
        let mut config = TidyConfig::defaults().unwrap();
        config.paths.base = temp.path().to_path_buf();
        let tools = &mut config.tools;
        tools.style.enabled = false;
        tools.types.enabled = false;
        tools.security.enabled = false;
        tools.test.enabled = false;
        tools.versions.enabled = false;
        tools.docs.enabled = false;
        tools.build.enabled = false;
        config
    }

    #[tokio::test]
    async fn test_report_with_disabled_tools() {
        let temp = TempDir::new().unwrap();
        let config = disabled_config(&temp);
        let output = Output::silent();
        fs::write(temp.path().join("setup.cfg"), "[metadata]\nname = demo\nversion = 23.1.0\n").unwrap();

        let mut manager = Manager::new(config.clone(), &output, false);
        assert!(manager.report().await.unwrap());

        let html = fs::read_to_string(config.paths.report_html()).unwrap();
        assert!(html.contains("Skipped."));
        assert!(html.contains("demo"));
        assert!(!config.paths.tmp_dir().exists());
    }

    #[tokio::test]
    async fn test_build_bumps_version_and_writes_badges() {
        let temp = TempDir::new().unwrap();
        let config = disabled_config(&temp);
        let output = Output::silent();
        fs::write(temp.path().join("setup.cfg"), "[metadata]\nname = demo\nversion = 0.0.1\n").unwrap();
        fs::write(temp.path().join("README.md"), "# Demo\n").unwrap();

        let mut manager = Manager::new(config.clone(), &output, false);
        assert!(manager.build().await.unwrap());

        let expected = CalVersion::next("0.0.1");
        let setup = fs::read_to_string(temp.path().join("setup.cfg")).unwrap();
        assert!(setup.contains(&format!("version = {expected}")));

        let badges = config.paths.badge_dir();
        for badge in ["test_coverage", "doc_coverage", "vulnerabilities", "test", "build"] {
            assert!(badges.join(format!("{badge}.svg")).is_file(), "missing badge {badge}");
        }
        assert!(config.paths.report_html().is_file());
    }

    #[tokio::test]
    async fn test_remove_rejects_keep() {
        let temp = TempDir::new().unwrap();
        let config = disabled_config(&temp);
        let output = Output::silent();

        let manager = Manager::new(config, &output, true);
        let err = manager.remove().unwrap_err();
        assert!(err.to_string().contains("Keep option does not make sense"));
    }

    #[tokio::test]
    async fn test_remove_deletes_report() {
        let temp = TempDir::new().unwrap();
        let config = disabled_config(&temp);
        let output = Output::silent();

        let mut manager = Manager::new(config.clone(), &output, false);
        manager.report().await.unwrap();
        assert!(config.paths.report_html().is_file());

        manager.remove().unwrap();
        assert!(!config.paths.report_dir().exists());
    }

    #[tokio::test]
    async fn test_keep_leaves_tmp_files() {
        let temp = TempDir::new().unwrap();
        let mut config = disabled_config(&temp);
        config.tools.docs.enabled = true;
        config.tools.docs.commands = vec![];
        let output = Output::silent();

        let mut manager = Manager::new(config.clone(), &output, true);
        assert!(manager.doc().await.unwrap());
        assert!(config.paths.tmp_dir().is_dir());
    }
}
