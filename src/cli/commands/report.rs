use anyhow::Result;

use super::load_config;
use crate::cli::Output;
use crate::pipeline::Manager;

pub async fn execute(output: &Output, custom_config: Option<&str>, keep: bool) -> Result<()> {
    let config = load_config(custom_config)?;
    output.header("Package report");

    let passed = Manager::new(config, output, keep).report().await?;
    if !passed {
        output.error("One or more checks failed. See the report for details.");
        std::process::exit(1);
    }

    output.success("All checks passed");
    Ok(())
}
