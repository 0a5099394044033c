//! Source and wheel distributions (python -m build by default)

use anyhow::Result;
use std::fs;
use std::path::PathBuf;

use super::{Check, Runner, announce_skip, base_vars};
use crate::config::{BuildToolConfig, PathsConfig, TidyConfig};
use crate::project::Meta;
use crate::report::Report;
use crate::utils::{remove_if_empty, remove_if_exists};

pub struct Build {
    settings: BuildToolConfig,
    paths: PathsConfig,
    package: String,
    passed: bool,
}

impl Build {
    pub fn new(config: &TidyConfig) -> Self {
        let package = Meta::load(config.paths.project_config_file())
            .and_then(|meta| meta.get_string("name"))
            .unwrap_or_else(|e| {
                tracing::warn!("Package name unknown: {e:#}");
                "unknown".to_string()
            });

        Self {
            settings: config.tools.build.clone(),
            paths: config.paths.clone(),
            package,
            passed: false,
        }
    }

    pub fn package(&self) -> &str {
        &self.package
    }

    /// Distribution files of this package in the dist directory
    pub fn distributions(&self) -> Result<Vec<PathBuf>> {
        let dist = self.paths.dist_dir();
        if !dist.is_dir() {
            return Ok(Vec::new());
        }

        let underscored = self.package.replace('-', "_");
        let mut files = Vec::new();
        for entry in fs::read_dir(&dist)? {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().into_owned();
            if name.starts_with(&self.package) || name.starts_with(&underscored) {
                files.push(entry.path());
            }
        }
        files.sort();
        Ok(files)
    }

    /// `*.egg-info` folders below the source directory
    fn egg_info_dirs(&self) -> Result<Vec<PathBuf>> {
        let src = self.paths.src_dir();
        if !src.is_dir() {
            return Ok(Vec::new());
        }

        let mut dirs = Vec::new();
        for entry in fs::read_dir(&src)? {
            let path = entry?.path();
            if path.extension().is_some_and(|ext| ext == "egg-info") {
                dirs.push(path);
            }
        }
        Ok(dirs)
    }
}

impl Check for Build {
    fn name(&self) -> &'static str {
        "Build"
    }

    async fn run(&mut self, runner: &Runner<'_>) -> Result<bool> {
        self.remove()?;
        if !self.settings.enabled {
            announce_skip(runner, self.name());
            self.passed = true;
            return Ok(true);
        }

        let vars = base_vars(&self.paths);
        self.passed = runner.succeeds("Build", &self.settings.command, &vars).await?;
        Ok(self.passed)
    }

    /// Distributions are not part of the report
    fn report(&self, _report: &mut Report) -> Result<()> {
        Ok(())
    }

    fn clean(&self) -> Result<()> {
        for dir in self.egg_info_dirs()? {
            remove_if_exists(dir)?;
        }
        remove_if_exists(self.paths.build_dir())
    }

    fn remove(&self) -> Result<()> {
        self.clean()?;
        for file in self.distributions()? {
            remove_if_exists(file)?;
        }
        remove_if_empty(self.paths.dist_dir())
    }

    fn is_passed(&self) -> bool {
        self.passed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn config_in(temp: &TempDir) -> TidyConfig {
        let mut config = TidyConfig::defaults().unwrap();
        config.paths.base = temp.path().to_path_buf();
        config
    }

    #[test]
    fn test_package_name_from_project_config() {
        let temp = TempDir::new().unwrap();
        let config = config_in(&temp);
        assert_eq!(Build::new(&config).package(), "unknown");

        fs::write(temp.path().join("setup.cfg"), "[metadata]\nname = demo-package\n").unwrap();
        assert_eq!(Build::new(&config).package(), "demo-package");
    }

    #[test]
    fn test_remove_keeps_foreign_distributions() {
        let temp = TempDir::new().unwrap();
        let config = config_in(&temp);
        fs::write(temp.path().join("setup.cfg"), "[metadata]\nname = demo-package\n").unwrap();

        let dist = temp.path().join("dist");
        fs::create_dir_all(&dist).unwrap();
        fs::write(dist.join("demo-package-23.4.1.tar.gz"), "").unwrap();
        fs::write(dist.join("demo_package-23.4.1-py3-none-any.whl"), "").unwrap();
        fs::write(dist.join("other-1.0.tar.gz"), "").unwrap();
        fs::create_dir_all(temp.path().join("src/demo_package.egg-info")).unwrap();
        fs::create_dir_all(temp.path().join("build/lib")).unwrap();

        let build = Build::new(&config);
        assert_eq!(build.distributions().unwrap().len(), 2);

        build.remove().unwrap();
        assert!(!temp.path().join("src/demo_package.egg-info").exists());
        assert!(!temp.path().join("build").exists());
        assert!(temp.path().join("src").exists());
        assert_eq!(fs::read_dir(&dist).unwrap().count(), 1);

        fs::remove_file(dist.join("other-1.0.tar.gz")).unwrap();
        build.remove().unwrap();
        assert!(!dist.exists());
    }
}
