//! Contract violations raised by the report core
//!
//! These signal that an adapter is misusing the report API. They are never
//! recovered from; commands propagate them and abort.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReportError {
    /// A line number passed to `mark` lies outside the snippet's file
    #[error("invalid line number for {}: {line}. Line number must be within 1 to {count}", path.display())]
    LineOutOfRange {
        path: PathBuf,
        line: usize,
        count: usize,
    },

    /// A table row does not supply one value per declared column
    #[error("given number of columns ({given}) does not match table ({expected})")]
    ColumnCount { given: usize, expected: usize },

    /// A summary was requested for a section that was never added
    #[error("report has no section named '{0}'")]
    UnknownSection(String),
}
