use anyhow::{Context, Result, anyhow};
use regex::Regex;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// Value of a metadata key. Indented continuation lines make it a list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetaValue {
    Single(String),
    List(Vec<String>),
}

impl MetaValue {
    /// The value as one string, list items joined by newlines
    pub fn as_string(&self) -> String {
        match self {
            MetaValue::Single(value) => value.clone(),
            MetaValue::List(values) => values.join("\n"),
        }
    }
}

impl fmt::Display for MetaValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_string())
    }
}

/// Package metadata from an INI-style project config file such as `setup.cfg`
#[derive(Debug, Clone)]
pub struct Meta {
    path: PathBuf,
    content: String,
}

impl Meta {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read project config: {}", path.display()))?;
        Ok(Self::from_content(path, content))
    }

    pub fn from_content<P: AsRef<Path>>(path: P, content: impl Into<String>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            content: content.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Value stored under `key`, e.g. `version = 23.4.1`
    pub fn get(&self, key: &str) -> Result<MetaValue> {
        let pattern = format!(
            r"(?m)^[ \t]*{}[ ]*=[ ]*([^\n]+)?((\n[ \t]+([^\n]+))*)",
            regex::escape(key)
        );
        let regex = Regex::new(&pattern)?;
        let caps = regex
            .captures(&self.content)
            .ok_or_else(|| anyhow!("Could not determine \"{key}\" from {}", self.path.display()))?;

        let raw = format!(
            "{}{}",
            caps.get(1).map_or("", |m| m.as_str()),
            caps.get(2).map_or("", |m| m.as_str())
        );
        let mut values: Vec<String> = raw
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(String::from)
            .collect();

        match values.len() {
            0 => Err(anyhow!("Key \"{key}\" in {} has no value", self.path.display())),
            1 => Ok(MetaValue::Single(values.remove(0))),
            _ => Ok(MetaValue::List(values)),
        }
    }

    pub fn get_string(&self, key: &str) -> Result<String> {
        self.get(key).map(|value| value.as_string())
    }

    /// Copyright line for generated documentation, `<year>, <author>`
    pub fn copyright(&self, year: i32) -> Result<String> {
        Ok(format!("{year}, {}", self.get_string("author")?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SETUP_CFG: &str = "[metadata]
name = demo-package
version = 23.4.1
author = Jane Doe
description =
license=MIT

[options]
install_requires =
    requests>=2.0
    python-dateutil

python_requires = >=3.8
";

    fn meta() -> Meta {
        Meta::from_content("setup.cfg", SETUP_CFG)
    }

    #[test]
    fn test_single_values() {
        let meta = meta();
        assert_eq!(meta.get("name").unwrap(), MetaValue::Single("demo-package".into()));
        assert_eq!(meta.get_string("version").unwrap(), "23.4.1");
        assert_eq!(meta.get_string("license").unwrap(), "MIT");
    }

    #[test]
    fn test_continuation_lines_form_a_list() {
        assert_eq!(
            meta().get("install_requires").unwrap(),
            MetaValue::List(vec!["requests>=2.0".into(), "python-dateutil".into()])
        );
    }

    #[test]
    fn test_key_must_start_a_line() {
        assert_eq!(meta().get_string("python_requires").unwrap(), ">=3.8");
        assert!(meta().get("requires").is_err());
    }

    #[test]
    fn test_missing_and_empty_keys() {
        assert!(meta().get("url").is_err());
        assert!(meta().get("description").is_err());
    }

    #[test]
    fn test_copyright() {
        assert_eq!(meta().copyright(2024).unwrap(), "2024, Jane Doe");
    }
}
