use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};

use crate::cli::Output;
use crate::config::TidyConfig;

pub mod build;
pub mod config;
pub mod doc;
pub mod remove;
pub mod report;
pub mod version;

#[derive(Parser)]
#[command(
    name = "tidypkg",
    version = env!("CARGO_PKG_VERSION"),
    about = "Runs code-quality tools on a Python package and compiles one HTML report with badges",
    long_about = "tidypkg wraps formatters, linters, type checkers, security scanners, test \
                  runners and documentation builders behind a few commands. The results are \
                  compiled into a single report and a set of status badges."
)]
pub struct Cli {
    /// Run as if started in <DIR> instead of current working directory
    #[arg(short = 'C', long = "directory", global = true)]
    pub directory: Option<String>,

    /// Increase verbosity (can be repeated)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Do not remove temporary files
    #[arg(short, long, global = true)]
    pub keep: bool,

    /// Use custom configuration file
    #[arg(long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Analyze the package from all angles and write the report
    Report,
    /// Bump the version, analyze, update badges and build the distributions
    Build,
    /// Generate the documentation
    Doc,
    /// Remove everything that can be generated
    Remove,
    /// Configuration management
    Config(config::ConfigArgs),
    /// Show version information
    Version(version::VersionArgs),
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        if let Some(dir) = &self.directory {
            std::env::set_current_dir(dir)?;
        }

        setup_logging(self.verbose, self.quiet);
        let output = Output::new(self.verbose > 0, self.quiet);
        let custom_config = self.config.as_deref();

        match self.command {
            Some(Commands::Report) => report::execute(&output, custom_config, self.keep).await,
            Some(Commands::Build) => build::execute(&output, custom_config, self.keep).await,
            Some(Commands::Doc) => doc::execute(&output, custom_config, self.keep).await,
            Some(Commands::Remove) => remove::execute(&output, custom_config, self.keep).await,
            Some(Commands::Config(args)) => config::execute(args, &output, custom_config).await,
            Some(Commands::Version(args)) => version::execute(args).await,
            None => {
                Cli::command().print_help()?;
                Ok(())
            }
        }
    }
}

/// Effective configuration, validated
pub(crate) fn load_config(custom_config: Option<&str>) -> Result<TidyConfig> {
    let config = TidyConfig::load_with_custom_config(custom_config)?;
    config.validate()?;
    Ok(config)
}

fn setup_logging(verbose: u8, quiet: bool) {
    if quiet {
        return;
    }

    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| match verbose {
        0 => tracing_subscriber::EnvFilter::new("warn"),
        1 => tracing_subscriber::EnvFilter::new("info,globset=warn"),
        2 => tracing_subscriber::EnvFilter::new("debug,globset=warn"),
        _ => tracing_subscriber::EnvFilter::new("trace"),
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
