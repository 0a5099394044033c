//! # tidypkg - one report for all your package checks
//!
//! tidypkg runs the usual quality tools of a Python package (formatters,
//! linters, type checkers, security scanners, test runners and documentation
//! builders), normalizes their findings into a common issue model and
//! compiles them into a single HTML report with linked, highlighted source
//! snippets and a set of status badges.
//!
//! ## Quick Start
//!
//! ```bash
//! # Analyze the package in the current directory
//! tidypkg report
//!
//! # Bump the version, update badges and build the distributions
//! tidypkg build
//!
//! # Delete everything tidypkg generated
//! tidypkg remove
//! ```

pub mod badge;
pub mod cli;
pub mod config;
pub mod docinspect;
pub mod issue;
pub mod pipeline;
pub mod project;
pub mod report;
pub mod tools;
pub mod utils;

pub use cli::{Cli, Output};
pub use config::TidyConfig;

/// Result type alias for tidypkg operations
pub type Result<T> = anyhow::Result<T>;

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const PKG_NAME: &str = env!("CARGO_PKG_NAME");
pub const PKG_DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");
