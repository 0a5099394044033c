//! Documentation build and documentation coverage (sphinx by default)
//!
//! The configured commands build the HTML documentation. One of them is
//! expected to dump the documented elements to the `objects` file; those are
//! inspected for missing descriptions, parameters and return values.

use anyhow::Result;
use std::path::PathBuf;

use super::{Check, Runner, announce_skip, base_vars, skipped_list};
use crate::config::{DocsToolConfig, PathsConfig, TidyConfig};
use crate::docinspect::DocInspector;
use crate::report::Report;
use crate::utils::{mkdirs_if_not_exists, remove_if_empty, remove_if_exists};

pub struct Documentation {
    settings: DocsToolConfig,
    paths: PathsConfig,
    section: String,
    objects_file: PathBuf,
    coverage_file: PathBuf,
    passed: bool,
}

impl Documentation {
    pub fn new(config: &TidyConfig) -> Self {
        Self {
            settings: config.tools.docs.clone(),
            paths: config.paths.clone(),
            section: config.report.sections.documentation.clone(),
            objects_file: config.paths.tmp_file(&config.tools.docs.objects),
            coverage_file: config.paths.tmp_file(&config.tools.docs.coverage_output),
            passed: false,
        }
    }

    pub fn objects_file(&self) -> &PathBuf {
        &self.objects_file
    }

    pub fn coverage_file(&self) -> &PathBuf {
        &self.coverage_file
    }

    fn inspect(&self) -> Result<()> {
        if !self.objects_file.is_file() {
            tracing::warn!(
                "No documented elements at {}, documentation coverage is not available",
                self.objects_file.display()
            );
            return Ok(());
        }

        let mut inspector = DocInspector::new();
        match inspector.process_dump(&self.objects_file) {
            Ok(_) => inspector.save(&self.coverage_file),
            Err(e) => {
                tracing::warn!("{e:#}");
                Ok(())
            }
        }
    }
}

impl Check for Documentation {
    fn name(&self) -> &'static str {
        "Documentation"
    }

    async fn run(&mut self, runner: &Runner<'_>) -> Result<bool> {
        self.remove()?;
        if !self.settings.enabled {
            announce_skip(runner, self.name());
            self.passed = true;
            return Ok(true);
        }

        mkdirs_if_not_exists(self.paths.tmp_dir())?;
        let vars = base_vars(&self.paths).with_path("objects", &self.objects_file);

        let mut passed = true;
        for command in &self.settings.commands {
            passed &= runner.succeeds("Documentation", command, &vars).await?;
        }
        self.inspect()?;

        self.passed = passed;
        Ok(self.passed)
    }

    fn report(&self, report: &mut Report) -> Result<()> {
        if !self.settings.enabled {
            report.add(&self.section, skipped_list());
            return Ok(());
        }
        DocInspector::report_file(&self.coverage_file, &self.section, report)
    }

    fn clean(&self) -> Result<()> {
        remove_if_exists(self.paths.resolve(&self.settings.source_dir))?;
        remove_if_exists(&self.coverage_file)?;
        remove_if_exists(&self.objects_file)?;

        let docs = self.paths.docs_dir();
        for exclude in &self.settings.exclude {
            remove_if_exists(docs.join(exclude))?;
        }
        remove_if_empty(self.paths.tmp_dir())
    }

    /// Also deletes the built HTML documentation
    fn remove(&self) -> Result<()> {
        self.clean()?;
        remove_if_exists(self.paths.docs_html_dir())
    }

    fn is_passed(&self) -> bool {
        self.passed
    }
}
