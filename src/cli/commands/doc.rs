use anyhow::Result;

use super::load_config;
use crate::cli::Output;
use crate::pipeline::Manager;

pub async fn execute(output: &Output, custom_config: Option<&str>, keep: bool) -> Result<()> {
    let config = load_config(custom_config)?;
    let html = config.paths.docs_html_dir();

    if Manager::new(config, output, keep).doc().await? {
        output.success(&format!(
            "Documentation written to {}",
            crate::utils::display_path(html)
        ));
    } else {
        output.warning("Documentation build reported errors");
    }
    Ok(())
}
