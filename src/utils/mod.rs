//! Filesystem and formatting helpers shared by the report and the tool adapters

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Delete a file or a directory tree, if it exists
pub fn remove_if_exists<P: AsRef<Path>>(path: P) -> Result<()> {
    let path = path.as_ref();
    if path.is_dir() {
        fs::remove_dir_all(path)
            .with_context(|| format!("Error while trying to delete folder \"{}\"", path.display()))?;
    } else if path.exists() {
        fs::remove_file(path)
            .with_context(|| format!("Error while trying to delete file \"{}\"", path.display()))?;
    }
    Ok(())
}

/// Delete a directory, if it exists and has no entries
pub fn remove_if_empty<P: AsRef<Path>>(path: P) -> Result<()> {
    let path = path.as_ref();
    if !path.is_dir() {
        return Ok(());
    }

    let mut entries =
        fs::read_dir(path).with_context(|| format!("Failed to list {}", path.display()))?;
    if entries.next().is_none() {
        fs::remove_dir(path)
            .with_context(|| format!("Failed to remove empty folder {}", path.display()))?;
    }
    Ok(())
}

/// Whether `path` is a regular file with at least one byte
pub fn file_has_content<P: AsRef<Path>>(path: P) -> bool {
    fs::metadata(path)
        .map(|meta| meta.is_file() && meta.len() > 0)
        .unwrap_or(false)
}

/// Create a directory and its parents, if missing
pub fn mkdirs_if_not_exists<P: AsRef<Path>>(path: P) -> Result<()> {
    let path = path.as_ref();
    if !path.is_dir() {
        fs::create_dir_all(path)
            .with_context(|| format!("Failed to create directory {}", path.display()))?;
    }
    Ok(())
}

/// Absolute form of `path`, resolved against the working directory
pub fn absolute<P: AsRef<Path>>(path: P) -> PathBuf {
    let path = path.as_ref();
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}

/// Path relative to the working directory, as shown to the user.
///
/// Paths outside the working directory are shown as given.
pub fn display_path<P: AsRef<Path>>(path: P) -> String {
    let path = absolute(path);
    std::env::current_dir()
        .ok()
        .and_then(|cwd| pathdiff::diff_paths(&path, cwd))
        .filter(|rel| !rel.starts_with(".."))
        .unwrap_or(path)
        .display()
        .to_string()
}

/// Escape text for use inside HTML element content and attribute values
pub fn html_escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Capitalize the first character and lowercase the rest
pub fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}
