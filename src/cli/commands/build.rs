use anyhow::Result;

use super::load_config;
use crate::cli::Output;
use crate::pipeline::Manager;

pub async fn execute(output: &Output, custom_config: Option<&str>, keep: bool) -> Result<()> {
    let config = load_config(custom_config)?;
    let dist = config.paths.dist_dir();
    output.header("Package build");

    let passed = Manager::new(config, output, keep).build().await?;
    if !passed {
        output.error("Build finished with failing checks");
        std::process::exit(1);
    }

    output.success(&format!(
        "Distributions written to {}",
        crate::utils::display_path(dist)
    ));
    Ok(())
}
