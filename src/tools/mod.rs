//! Analysis tool adapters
//!
//! Each adapter wraps one external tool: it runs the configured command,
//! turns the tool's result file into report elements and removes what the
//! tool left behind. Adapters share the [`Check`] interface so the pipeline
//! can drive them uniformly.

use anyhow::Result;

use crate::config::{PathsConfig, TidyConfig};
use crate::report::{Report, ReportList, Summary};

pub mod build;
pub mod docs;
pub mod runner;
pub mod security;
pub mod style;
pub mod test;
pub mod types;
pub mod versions;

pub use build::Build;
pub use docs::Documentation;
pub use runner::{RunStatus, Runner, Vars};
pub use security::SecurityCheck;
pub use style::StyleCheck;
pub use test::TestCheck;
pub use types::TypeCheck;
pub use versions::SupportedVersions;

/// Common lifecycle of a tool adapter
#[allow(async_fn_in_trait)]
pub trait Check {
    /// Name shown in progress output
    fn name(&self) -> &'static str;

    /// Run the tool. `Ok(false)` means the tool failed or found problems.
    async fn run(&mut self, runner: &Runner<'_>) -> Result<bool>;

    /// Add the results of the last run to the report
    fn report(&self, report: &mut Report) -> Result<()>;

    /// Delete intermediate files
    fn clean(&self) -> Result<()>;

    /// Delete everything the tool produced
    fn remove(&self) -> Result<()> {
        self.clean()
    }

    /// Result of the last run
    fn is_passed(&self) -> bool;
}

/// Placeholders every command template can use
pub fn base_vars(paths: &PathsConfig) -> Vars {
    Vars::new()
        .with_path("src", paths.src_dir())
        .with_path("tmp", paths.tmp_dir())
        .with_path("docs", paths.docs_dir())
        .with_path("dist", paths.dist_dir())
        .with_path("config", paths.project_config_file())
}

/// Headless list marking a disabled tool. It counts as zero issues.
pub fn skipped_list() -> ReportList {
    let mut list = ReportList::placeholder("Skipped.");
    list.summary = Some(Summary::new("Skipped", 0, ""));
    list
}

pub(crate) fn announce_skip(runner: &Runner<'_>, name: &str) {
    tracing::warn!("{name} is disabled, skipping");
    runner.output().action_result(name, "skipped", true);
}

/// All adapters that contribute to the report, in run order
pub struct Checks {
    pub security: SecurityCheck,
    pub style: StyleCheck,
    pub types: TypeCheck,
    pub test: TestCheck,
    pub versions: SupportedVersions,
    pub docs: Documentation,
}

impl Checks {
    pub fn new(config: &TidyConfig) -> Self {
        Self {
            security: SecurityCheck::new(config),
            style: StyleCheck::new(config),
            types: TypeCheck::new(config),
            test: TestCheck::new(config),
            versions: SupportedVersions::new(config),
            docs: Documentation::new(config),
        }
    }
}

#[cfg(test)]
mod tests;
