//! Command-line interface for tidypkg

pub mod commands;
mod output;

pub use commands::Cli;
pub use output::Output;
