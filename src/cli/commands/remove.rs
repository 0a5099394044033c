use anyhow::Result;

use super::load_config;
use crate::cli::Output;
use crate::pipeline::Manager;

pub async fn execute(output: &Output, custom_config: Option<&str>, keep: bool) -> Result<()> {
    let config = load_config(custom_config)?;
    Manager::new(config, output, keep).remove()?;
    output.success("Removed all generated files");
    Ok(())
}
