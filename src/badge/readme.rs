//! README badge links
//!
//! Package indexes do not render relative image paths, so a release build
//! swaps local badge files for hosted shields.io links and restores the
//! local references afterwards.

use anyhow::{Context, Result};
use regex::{NoExpand, Regex};
use std::fs;
use std::path::{Path, PathBuf};

const SHIELDS_URL: &str = "https://img.shields.io/static/v1";

pub struct Readme {
    path: PathBuf,
    content: String,
    /// Local badge reference and the pattern matching its hosted link
    hosted: Vec<(String, Regex)>,
}

impl Readme {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read README: {}", path.display()))?;
        Ok(Self::from_content(path, content))
    }

    pub fn from_content<P: AsRef<Path>>(path: P, content: impl Into<String>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            content: content.into(),
            hosted: Vec::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    /// Point the badge referenced as `badge_ref` at its hosted equivalent.
    ///
    /// Both slash directions of the local reference are recognised. A badge
    /// that already links to shields.io has its link updated in place.
    pub fn replace_badge(&mut self, badge_ref: &str, title: &str, text: &str, color: &str) {
        let stem = format!("{SHIELDS_URL}?label={}&message=", urlencoding::encode(title));
        let link = format!(
            "{stem}{}&color={}",
            urlencoding::encode(text),
            urlencoding::encode(color)
        );
        let pattern = format!(r"\([ ]*{}[^\)]*?[ ]*\)", regex::escape(&stem));
        let link_regex = match Regex::new(&pattern) {
            Ok(regex) => regex,
            Err(e) => {
                tracing::warn!("Cannot match hosted link for badge {title}: {e}");
                return;
            }
        };

        let backslashed = badge_ref.replace('/', "\\");
        let forward = badge_ref.replace('\\', "/");

        if self.content.contains(&forward) || self.content.contains(&backslashed) {
            self.content = self.content.replace(&backslashed, &link).replace(&forward, &link);
        } else {
            self.content = link_regex
                .replace_all(&self.content, NoExpand(&format!("({link})")))
                .into_owned();
        }

        self.hosted.retain(|(existing, _)| existing != &forward);
        self.hosted.push((forward, link_regex));
    }

    /// Write the README with hosted badge links
    pub fn write_absolute(&self) -> Result<()> {
        self.write()
    }

    /// Restore the local badge references and write the README
    pub fn write_relative(&mut self) -> Result<()> {
        for (badge_ref, link_regex) in &self.hosted {
            self.content = link_regex
                .replace_all(&self.content, NoExpand(&format!("({badge_ref})")))
                .into_owned();
        }
        self.write()
    }

    fn write(&self) -> Result<()> {
        fs::write(&self.path, &self.content)
            .with_context(|| format!("Failed to write README: {}", self.path.display()))?;
        tracing::info!("Updated {}", self.path.display());
        Ok(())
    }
}
