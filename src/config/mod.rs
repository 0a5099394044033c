//! Configuration management for tidypkg
//!
//! The effective configuration is the embedded defaults merged with user and
//! repository config files and `TIDYPKG_` environment variables (see
//! [`TidyConfig::load`]). Every component receives the resolved value
//! explicitly.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::badge::Thresholds;

mod core;
mod formats;

pub use formats::ConfigFormat;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TidyConfig {
    pub paths: PathsConfig,
    pub report: ReportConfig,
    pub badges: BadgesConfig,
    pub tools: ToolsConfig,
}

/// Project layout. Relative paths are resolved against `base`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Repository root
    pub base: PathBuf,
    /// Package source directory
    pub src: PathBuf,
    /// Directory of the main report document
    pub report_dir: PathBuf,
    /// Directory of the per-snippet report pages
    pub report_files_dir: PathBuf,
    /// Scratch directory for tool output
    pub tmp: PathBuf,
    /// Directory for SVG badges
    pub badges: PathBuf,
    /// Documentation root
    pub docs: PathBuf,
    /// Generated HTML documentation
    pub docs_html: PathBuf,
    /// Distributable artifacts
    pub dist: PathBuf,
    /// Intermediate build directory
    pub build: PathBuf,
    /// Package metadata file, e.g. `setup.cfg`
    pub project_config: PathBuf,
    pub readme: PathBuf,
}

impl PathsConfig {
    /// Resolve a configured path against the repository root
    pub fn resolve<P: AsRef<Path>>(&self, path: P) -> PathBuf {
        crate::utils::absolute(self.base.join(path))
    }

    pub fn src_dir(&self) -> PathBuf {
        self.resolve(&self.src)
    }

    pub fn report_dir(&self) -> PathBuf {
        self.resolve(&self.report_dir)
    }

    pub fn report_html(&self) -> PathBuf {
        self.report_dir().join("report.html")
    }

    pub fn report_files_dir(&self) -> PathBuf {
        self.resolve(&self.report_files_dir)
    }

    pub fn tmp_dir(&self) -> PathBuf {
        self.resolve(&self.tmp)
    }

    /// A file inside the scratch directory
    pub fn tmp_file(&self, name: &str) -> PathBuf {
        self.tmp_dir().join(name)
    }

    pub fn badge_dir(&self) -> PathBuf {
        self.resolve(&self.badges)
    }

    pub fn docs_dir(&self) -> PathBuf {
        self.resolve(&self.docs)
    }

    pub fn docs_html_dir(&self) -> PathBuf {
        self.resolve(&self.docs_html)
    }

    pub fn dist_dir(&self) -> PathBuf {
        self.resolve(&self.dist)
    }

    pub fn build_dir(&self) -> PathBuf {
        self.resolve(&self.build)
    }

    pub fn project_config_file(&self) -> PathBuf {
        self.resolve(&self.project_config)
    }

    pub fn readme_file(&self) -> PathBuf {
        self.resolve(&self.readme)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Lines of context shown before and after highlighted code
    pub line_range: usize,
    pub sections: SectionNames,
}

/// Headings of the report sections
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectionNames {
    pub style: String,
    pub types: String,
    pub test: String,
    pub versions: String,
    pub dependencies: String,
    pub security: String,
    pub documentation: String,
}

impl SectionNames {
    fn all(&self) -> [&str; 7] {
        [
            self.style.as_str(),
            self.types.as_str(),
            self.test.as_str(),
            self.versions.as_str(),
            self.dependencies.as_str(),
            self.security.as_str(),
            self.documentation.as_str(),
        ]
    }
}

/// Badge color thresholds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BadgesConfig {
    /// Higher is better, keyed by minimum coverage
    pub test_coverage: Thresholds,
    /// Higher is better, keyed by minimum coverage
    pub doc_coverage: Thresholds,
    /// Lower is better, keyed by maximum issue count
    pub security_issues: Thresholds,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolsConfig {
    /// Per-command timeout in seconds, 0 disables it
    #[serde(default)]
    pub timeout_secs: u64,
    pub style: StyleToolConfig,
    pub types: TypesToolConfig,
    pub security: SecurityToolConfig,
    pub test: TestToolConfig,
    pub versions: VersionsToolConfig,
    pub docs: DocsToolConfig,
    pub build: BuildToolConfig,
}

fn default_enabled() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StyleToolConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Formatters run before the check, their status is ignored
    #[serde(default)]
    pub format: Vec<String>,
    /// Linter writing flake8-style JSON to `{output}`
    pub check: String,
    pub output: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypesToolConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Type checker writing a JUnit XML report to `{output}`
    pub command: String,
    pub output: String,
    /// Checker cache, removed on clean
    pub cache: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityToolConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Static analyzer writing bandit-style JSON to `{output}`
    pub bandit: String,
    pub bandit_output: String,
    /// Dependency audit of the active environment
    pub safety_environment: String,
    /// Dependency audit of the project config file
    pub safety_config: String,
    /// Dependency audit of one requirements file, `{requirements}`
    pub safety_requirements: String,
    /// Requirements files to audit, relative to the repository root
    pub requirements_glob: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestToolConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Test runner under coverage measurement
    pub command: String,
    /// Export of the coverage data as JSON to `{output}`
    pub export: String,
    pub output: String,
    /// Raw coverage database, removed on clean
    pub data_file: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionsToolConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Session runner writing a nox-style report to `{output}`
    pub command: String,
    pub output: String,
    /// Session environments, removed on clean
    pub env_dir: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocsToolConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Generator commands, run in order
    pub commands: Vec<String>,
    /// Doc-object dump written during generation, inspected afterwards
    pub objects: String,
    /// Documentation coverage result
    pub coverage_output: String,
    /// Generated sources, removed on clean
    pub source_dir: PathBuf,
    /// Generator leftovers removed on clean, relative to the docs root
    #[serde(default)]
    pub exclude: Vec<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildToolConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    pub command: String,
    /// Pattern locating the version line in the project config file.
    /// The first capture group is kept and followed by the new version.
    pub version_regex: String,
}

impl TidyConfig {
    /// Reject configurations the pipeline cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.report.line_range == 0 {
            anyhow::bail!("report.line_range must be at least 1");
        }

        let mut seen = HashSet::new();
        for name in self.report.sections.all() {
            if name.trim().is_empty() {
                anyhow::bail!("Report section names cannot be empty");
            }
            if !seen.insert(name) {
                anyhow::bail!("Duplicate report section name: {name}");
            }
        }

        for (name, table) in [
            ("test_coverage", &self.badges.test_coverage),
            ("doc_coverage", &self.badges.doc_coverage),
            ("security_issues", &self.badges.security_issues),
        ] {
            if table.is_empty() {
                anyhow::bail!("Badge thresholds '{name}' must define at least one color");
            }
        }

        regex::Regex::new(&self.tools.build.version_regex)
            .map_err(|e| anyhow::anyhow!("Invalid tools.build.version_regex: {e}"))?;
        globset::Glob::new(&self.tools.security.requirements_glob)
            .map_err(|e| anyhow::anyhow!("Invalid tools.security.requirements_glob: {e}"))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests;
