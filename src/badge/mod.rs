//! Status badges
//!
//! A badge is a title, a message and a color. Metrics are colored through a
//! [`Thresholds`] table; the resulting SVG files are written to the badge
//! directory and can be mirrored into a README as hosted links.

use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};

use crate::utils::mkdirs_if_not_exists;

mod readme;
mod svg;
mod thresholds;

pub use readme::Readme;
pub use thresholds::{ALERT_COLOR, Thresholds};

/// Text and color of one badge
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BadgeData {
    pub title: String,
    pub text: String,
    pub color: String,
}

impl BadgeData {
    /// Coverage in percent, floored, higher is better
    pub fn coverage(title: &str, value: f64, thresholds: &Thresholds) -> Self {
        let coverage = value.floor();
        Self {
            title: title.to_string(),
            text: format!("{coverage}%"),
            color: thresholds.color_gte(coverage).to_string(),
        }
    }

    /// Number of issues, lower is better. An unknown count is shown as such in the alert color.
    pub fn issues(title: &str, value: Option<u64>, thresholds: &Thresholds) -> Self {
        let (text, color) = match value {
            Some(count) => (count.to_string(), thresholds.color_lte(count as f64).to_string()),
            None => ("Unknown".to_string(), ALERT_COLOR.to_string()),
        };
        Self {
            title: title.to_string(),
            text,
            color,
        }
    }

    pub fn pass_fail(title: &str, passing: bool) -> Self {
        let (text, color) = if passing {
            ("passing", "brightgreen")
        } else {
            ("failing", ALERT_COLOR)
        };
        Self {
            title: title.to_string(),
            text: text.to_string(),
            color: color.to_string(),
        }
    }

    pub fn svg(&self) -> String {
        svg::render(&self.title, &self.text, &self.color)
    }
}

/// Writes badge files and keeps an optional README in sync with them
pub struct BadgeWriter {
    dir: PathBuf,
    readme: Option<Readme>,
}

impl BadgeWriter {
    pub fn new<P: AsRef<Path>>(dir: P, readme: Option<Readme>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
            readme,
        }
    }

    /// `<badge dir>/<title with spaces replaced by underscores>.svg`
    pub fn badge_file(&self, title: &str) -> PathBuf {
        self.dir.join(format!("{}.svg", title.replace(' ', "_")))
    }

    pub fn write(&mut self, badge: &BadgeData) -> Result<PathBuf> {
        mkdirs_if_not_exists(&self.dir)?;
        let file = self.badge_file(&badge.title);
        fs::write(&file, badge.svg())?;
        tracing::info!("Badge {} -> {} ({})", badge.title, badge.text, badge.color);

        if let Some(readme) = self.readme.as_mut() {
            let base = readme.path().parent().unwrap_or_else(|| Path::new("."));
            let reference = pathdiff::diff_paths(&file, base).unwrap_or_else(|| file.clone());
            readme.replace_badge(
                &reference.to_string_lossy(),
                &badge.title,
                &badge.text,
                &badge.color,
            );
        }
        Ok(file)
    }

    pub fn coverage_badge(&mut self, title: &str, value: f64, thresholds: &Thresholds) -> Result<PathBuf> {
        self.write(&BadgeData::coverage(title, value, thresholds))
    }

    pub fn issue_badge(&mut self, title: &str, value: Option<u64>, thresholds: &Thresholds) -> Result<PathBuf> {
        self.write(&BadgeData::issues(title, value, thresholds))
    }

    pub fn pass_fail_badge(&mut self, title: &str, passing: bool) -> Result<PathBuf> {
        self.write(&BadgeData::pass_fail(title, passing))
    }

    /// Write the README with hosted badge links, if one is tracked
    pub fn write_absolute_readme(&self) -> Result<()> {
        match &self.readme {
            Some(readme) => readme.write_absolute(),
            None => Ok(()),
        }
    }

    /// Write the README with local badge references, if one is tracked
    pub fn write_relative_readme(&mut self) -> Result<()> {
        match self.readme.as_mut() {
            Some(readme) => readme.write_relative(),
            None => Ok(()),
        }
    }
}
