use anyhow::{Context, Result};
use chrono::{Datelike, NaiveDate, Utc};
use regex::Regex;
use std::fmt;
use std::fs;
use std::path::Path;

/// Calendar version `YY.MM.PATCH`, see <https://calver.org/>.
///
/// The patch number counts the builds within one month.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalVersion {
    year: u32,
    month: u32,
    patch: u32,
}

impl CalVersion {
    /// Successor of `old` for a build today (UTC)
    pub fn next(old: &str) -> Self {
        Self::next_on(old, Utc::now().date_naive())
    }

    /// Successor of `old` for a build on `date`.
    ///
    /// A version that does not follow the scheme starts over at patch 0.
    pub fn next_on(old: &str, date: NaiveDate) -> Self {
        let year = date.year().rem_euclid(100) as u32;
        let month = date.month();

        let patch = match Self::parse(old) {
            Some(previous) if previous.year == year && previous.month == month => {
                previous.patch.checked_add(1).unwrap_or(0)
            }
            Some(_) => 0,
            None => {
                tracing::debug!("Version {old:?} is not a calendar version, starting over");
                0
            }
        };
        Self { year, month, patch }
    }

    fn parse(version: &str) -> Option<Self> {
        let parts: Vec<&str> = version.trim().split('.').collect();
        if parts.len() != 3 || !parts.iter().all(|p| !p.is_empty() && p.bytes().all(|b| b.is_ascii_digit())) {
            return None;
        }
        let year: u32 = parts[0].parse().ok()?;
        let month: u32 = parts[1].parse().ok()?;
        let patch: u32 = parts[2].parse().ok()?;
        if year > 99 || month > 12 {
            return None;
        }
        Some(Self { year, month, patch })
    }

    /// Write this version into `file`.
    ///
    /// Every match of `pattern` is replaced by its first capture group, a
    /// space and the version.
    pub fn bump<P: AsRef<Path>>(&self, file: P, pattern: &str) -> Result<()> {
        let file = file.as_ref();
        let regex = Regex::new(pattern).with_context(|| format!("Invalid version pattern: {pattern}"))?;
        let content = fs::read_to_string(file)
            .with_context(|| format!("Failed to read {}", file.display()))?;
        let updated = regex.replace_all(&content, format!("${{1}} {self}").as_str());
        fs::write(file, updated.as_bytes())
            .with_context(|| format!("Failed to write {}", file.display()))?;
        tracing::info!("Version set to {self} in {}", file.display());
        Ok(())
    }
}

impl fmt::Display for CalVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}.{}.{}", self.year, self.month, self.patch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn day(year: i32, month: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, 15).unwrap()
    }

    #[test]
    fn test_same_month_bumps_patch() {
        assert_eq!(CalVersion::next_on("23.4.1", day(2023, 4)).to_string(), "23.4.2");
    }

    #[test]
    fn test_new_month_resets_patch() {
        assert_eq!(CalVersion::next_on("23.4.7", day(2023, 5)).to_string(), "23.5.0");
        assert_eq!(CalVersion::next_on("23.4.7", day(2024, 4)).to_string(), "24.4.0");
    }

    #[test]
    fn test_non_conforming_versions_start_over() {
        for old in ["1.2.3.4", "1.2", "1.2.x", "23.13.1", "123.1.1", "", "v23.4.1"] {
            assert_eq!(CalVersion::next_on(old, day(2023, 4)).to_string(), "23.4.0", "{old}");
        }
    }

    #[test]
    fn test_patch_overflow_starts_over() {
        let old = format!("23.4.{}", u32::MAX);
        assert_eq!(CalVersion::next_on(&old, day(2023, 4)).to_string(), "23.4.0");
    }

    #[test]
    fn test_two_digit_year() {
        assert_eq!(CalVersion::next_on("", day(2005, 11)).to_string(), "05.11.0");
    }

    #[test]
    fn test_bump_rewrites_version_line() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("setup.cfg");
        fs::write(&file, "[metadata]\nname = demo\nversion = 23.4.1\n").unwrap();

        let version = CalVersion::next_on("23.4.1", day(2023, 4));
        version.bump(&file, r"(version[ ]*=)[ ]*[^\n]*").unwrap();

        assert_eq!(
            fs::read_to_string(&file).unwrap(),
            "[metadata]\nname = demo\nversion = 23.4.2\n"
        );
    }

    #[test]
    fn test_bump_rejects_invalid_pattern() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("setup.cfg");
        fs::write(&file, "version = 1").unwrap();
        assert!(CalVersion::next_on("1", day(2023, 4)).bump(&file, "(version").is_err());
    }
}
