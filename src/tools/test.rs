//! Unit tests under coverage measurement (coverage.py by default)

use anyhow::Result;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use super::{Check, Runner, announce_skip, base_vars, skipped_list};
use crate::config::{PathsConfig, TestToolConfig, TidyConfig};
use crate::report::{CodeSnippet, Color, Report, ReportList, ReportTable, Summary};
use crate::utils::{file_has_content, html_escape, mkdirs_if_not_exists, remove_if_empty, remove_if_exists};

pub const COLUMNS: [&str; 5] = ["Module", "Statements", "Missing", "Excluded", "Coverage"];

#[derive(Debug, Deserialize)]
struct CoverageReport {
    files: BTreeMap<String, FileCoverage>,
    totals: Totals,
}

#[derive(Debug, Deserialize)]
struct FileCoverage {
    #[serde(default)]
    executed_lines: Vec<usize>,
    #[serde(default)]
    missing_lines: Vec<usize>,
    #[serde(default)]
    excluded_lines: Vec<usize>,
    summary: FileSummary,
}

#[derive(Debug, Deserialize)]
struct FileSummary {
    num_statements: u64,
    missing_lines: u64,
    excluded_lines: u64,
    percent_covered: f64,
}

#[derive(Debug, Deserialize)]
struct Totals {
    percent_covered: f64,
}

/// Percentage with up to two decimals and a narrow no-break space before the sign
fn format_percent(value: f64) -> String {
    let rounded = (value * 100.0).round() / 100.0;
    format!("{rounded:?}\u{202F}%")
}

pub struct TestCheck {
    settings: TestToolConfig,
    paths: PathsConfig,
    section: String,
    result_file: PathBuf,
    data_file: PathBuf,
    passed: bool,
}

impl TestCheck {
    pub fn new(config: &TidyConfig) -> Self {
        Self {
            settings: config.tools.test.clone(),
            paths: config.paths.clone(),
            section: config.report.sections.test.clone(),
            result_file: config.paths.tmp_file(&config.tools.test.output),
            data_file: config.paths.resolve(&config.tools.test.data_file),
            passed: false,
        }
    }

    pub fn result_file(&self) -> &PathBuf {
        &self.result_file
    }

    fn table(&self, data: &CoverageReport, report: &mut Report) -> Result<ReportTable> {
        let mut table = ReportTable::new("", COLUMNS);

        for (filename, file) in &data.files {
            let module = match CodeSnippet::from_file(self.paths.resolve(filename)) {
                Ok(mut snippet) => {
                    snippet.mark(file.executed_lines.iter().copied(), Color::Good)?;
                    snippet.mark(file.missing_lines.iter().copied(), Color::Bad)?;
                    snippet.mark(file.excluded_lines.iter().copied(), Color::Neutral)?;
                    snippet.set_mark_name(Color::Good, "Run");
                    snippet.set_mark_name(Color::Bad, "Missing");
                    snippet.set_mark_name(Color::Neutral, "Excluded");
                    let page = report.add_snippet(snippet);
                    format!(
                        "<a href=\"{}\">{}</a>",
                        html_escape(&page.to_string_lossy().replace('\\', "/")),
                        html_escape(filename)
                    )
                }
                Err(e) => {
                    tracing::warn!("{e:#}");
                    html_escape(filename)
                }
            };

            table.add([
                module,
                file.summary.num_statements.to_string(),
                file.summary.missing_lines.to_string(),
                file.summary.excluded_lines.to_string(),
                format_percent(file.summary.percent_covered),
            ])?;
        }

        table.summary = Some(Summary::new("Coverage", data.totals.percent_covered.floor() as u64, "%"));
        Ok(table)
    }
}

impl Check for TestCheck {
    fn name(&self) -> &'static str {
        "Test"
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

        self.passed = runner.succeeds("Unit tests", &self.settings.command, &vars).await?;
        // Coverage is exported for failing runs too
        runner.run("Coverage export", &self.settings.export, &vars).await?;
        Ok(self.passed)
    }

    fn report(&self, report: &mut Report) -> Result<()> {
        if !self.settings.enabled {
            report.add(&self.section, skipped_list());
            return Ok(());
        }

        let failed = || ReportList::placeholder("Coverage analysis failed");
        if !file_has_content(&self.result_file) {
            tracing::warn!("{} has no content", self.result_file.display());
            report.add(&self.section, failed());
            return Ok(());
        }

        let content = fs::read_to_string(&self.result_file)?;
        match serde_json::from_str::<CoverageReport>(&content) {
            Ok(data) => {
                let table = self.table(&data, report)?;
                report.add(&self.section, table);
            }
            Err(e) => {
                tracing::warn!("Could not decode {}: {e}", self.result_file.display());
                report.add(&self.section, failed());
            }
        }
        Ok(())
    }

    fn clean(&self) -> Result<()> {
        remove_if_exists(&self.data_file)?;
        remove_if_exists(&self.result_file)?;
        remove_if_empty(self.paths.tmp_dir())
    }

    fn is_passed(&self) -> bool {
        self.passed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::{Element, ReportSettings};
    use tempfile::TempDir;

    fn setup(temp: &TempDir) -> (TestCheck, Report) {
        let mut config = TidyConfig::defaults().unwrap();
        config.paths.base = temp.path().to_path_buf();
        let report = Report::new(ReportSettings::from_config(&config), "demo", "1.0");
        fs::create_dir_all(config.paths.tmp_dir()).unwrap();
        (TestCheck::new(&config), report)
    }

    #[test]
    fn test_format_percent() {
        assert_eq!(format_percent(93.33333), "93.33\u{202F}%");
        assert_eq!(format_percent(100.0), "100.0\u{202F}%");
        assert_eq!(format_percent(66.666), "66.67\u{202F}%");
    }

    #[test]
    fn test_coverage_table() {
        let temp = TempDir::new().unwrap();
        let (check, mut report) = setup(&temp);
        fs::create_dir_all(temp.path().join("src")).unwrap();
        fs::write(temp.path().join("src/calc.py"), "import os\n\ndef f():\n    return 1\n").unwrap();

        fs::write(
            check.result_file(),
            r#"{
                "meta": {"version": "7.2.7"},
                "files": {
                    "src/calc.py": {
                        "executed_lines": [1, 3],
                        "missing_lines": [4],
                        "excluded_lines": [],
                        "summary": {"covered_lines": 2, "num_statements": 3, "percent_covered": 66.66666666666667,
                                    "missing_lines": 1, "excluded_lines": 0}
                    }
                },
                "totals": {"covered_lines": 2, "num_statements": 3, "percent_covered": 66.66666666666667,
                           "missing_lines": 1, "excluded_lines": 0}
            }"#,
        )
        .unwrap();

        check.report(&mut report).unwrap();

        let Element::Table(table) = &report.section("Test").unwrap()[0] else {
            panic!("expected a table");
        };
        assert_eq!(table.columns(), COLUMNS);
        assert_eq!(table.cell(0, "Module"), Some("<a href=\"files/0.html\">src/calc.py</a>"));
        assert_eq!(table.cell(0, "Statements"), Some("3"));
        assert_eq!(table.cell(0, "Coverage"), Some("66.67\u{202F}%"));
        assert_eq!(report.summary("Test").unwrap(), Summary::new("Coverage", 66, "%"));

        let snippet = &report.snippets()[0];
        assert_eq!(snippet.lines()[0].color, Color::Good);
        assert_eq!(snippet.lines()[1].color, Color::None);
        assert_eq!(snippet.lines()[3].color, Color::Bad);
        assert_eq!(snippet.labels().get(&Color::Good).map(String::as_str), Some("Run"));
    }

    #[test]
    fn test_missing_or_broken_result() {
        let temp = TempDir::new().unwrap();
        let (check, mut report) = setup(&temp);

        check.report(&mut report).unwrap();
        fs::write(check.result_file(), "{\"files\": 3}").unwrap();
        check.report(&mut report).unwrap();

        let elements = report.section("Test").unwrap();
        assert_eq!(elements.len(), 2);
        for element in elements {
            let Element::List(list) = element else {
                panic!("expected a list");
            };
            assert_eq!(list.entries()[0].summary, "Coverage analysis failed");
        }
    }
}
