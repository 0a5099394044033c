use anyhow::Result;
use clap::{Args, Subcommand};

use crate::cli::Output;
use crate::config::{ConfigFormat, TidyConfig};

#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Display current merged configuration
    Show {
        /// Output format: json, toml, yaml
        #[arg(short, long, default_value = "toml")]
        format: String,
    },
    /// Validate configuration
    Validate,
}

pub async fn execute(args: ConfigArgs, output: &Output, custom_config: Option<&str>) -> Result<()> {
    match args.command {
        ConfigCommand::Show { format } => {
            let format: ConfigFormat = format.parse()?;
            let config = TidyConfig::load_with_custom_config(custom_config)?;
            println!("{}", config.export_config_highlighted(format)?);
        }
        ConfigCommand::Validate => {
            let config = TidyConfig::load_with_custom_config(custom_config)?;
            config.validate()?;
            output.success("Configuration is valid!");
        }
    }
    Ok(())
}
