//! Static type analysis (mypy by default)

use anyhow::Result;
use std::path::PathBuf;

use super::{Check, Runner, announce_skip, base_vars, skipped_list};
use crate::config::{PathsConfig, TidyConfig, TypesToolConfig};
use crate::issue::{Issue, IssueFormat};
use crate::report::{Report, ReportList};
use crate::utils::{file_has_content, mkdirs_if_not_exists, remove_if_empty, remove_if_exists};

pub struct TypeCheck {
    settings: TypesToolConfig,
    paths: PathsConfig,
    section: String,
    result_file: PathBuf,
    cache_dir: PathBuf,
    passed: bool,
}

impl TypeCheck {
    pub fn new(config: &TidyConfig) -> Self {
        Self {
            settings: config.tools.types.clone(),
            paths: config.paths.clone(),
            section: config.report.sections.types.clone(),
            result_file: config.paths.tmp_file(&config.tools.types.output),
            cache_dir: config.paths.resolve(&config.tools.types.cache),
            passed: false,
        }
    }

    pub fn result_file(&self) -> &PathBuf {
        &self.result_file
    }
}

impl Check for TypeCheck {
    fn name(&self) -> &'static str {
        "Types"
    }

    async fn run(&mut self, runner: &Runner<'_>) -> Result<bool> {
        self.clean()?;
        if !self.settings.enabled {
            announce_skip(runner, self.name());
            self.passed = true;
            return Ok(true);
        }

        mkdirs_if_not_exists(self.paths.tmp_dir())?;
        let vars = base_vars(&self.paths)
            .with_path("output", &self.result_file)
            .with_path("cache", &self.cache_dir);

        self.passed = runner.succeeds("Type check", &self.settings.command, &vars).await?;
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

        match IssueFormat::Mypy.parse(&self.result_file) {
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
        remove_if_exists(&self.cache_dir)?;
        remove_if_empty(self.paths.tmp_dir())
    }

    fn is_passed(&self) -> bool {
        self.passed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::ReportSettings;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_report_and_clean() {
        let temp = TempDir::new().unwrap();
        let mut config = TidyConfig::defaults().unwrap();
        config.paths.base = temp.path().to_path_buf();
        let mut report = Report::new(ReportSettings::from_config(&config), "demo", "1.0");

        let source = temp.path().join("src/b.py");
        fs::create_dir_all(source.parent().unwrap()).unwrap();
        fs::write(&source, "print(x)\n").unwrap();

        let check = TypeCheck::new(&config);
        fs::create_dir_all(check.result_file().parent().unwrap()).unwrap();
        fs::create_dir_all(temp.path().join(".mypy_cache/3.11")).unwrap();
        let xml = format!(
            "<testsuite failures=\"1\" name=\"mypy\"><testcase name=\"mypy\"><failure message=\"x\">{}:1: error: Name &quot;x&quot; is not defined  [name-defined]</failure></testcase></testsuite>",
            source.display()
        );
        fs::write(check.result_file(), xml).unwrap();

        check.report(&mut report).unwrap();
        assert_eq!(report.total("Types").unwrap(), 1);

        check.clean().unwrap();
        assert!(!check.result_file().exists());
        assert!(!temp.path().join(".mypy_cache").exists());
        assert!(!temp.path().join("tmp").exists());
    }
}
