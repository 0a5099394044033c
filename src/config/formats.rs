use anyhow::{Result, bail};
use std::str::FromStr;

use super::TidyConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Json,
    Toml,
    Yaml,
}

impl FromStr for ConfigFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "json" => Ok(ConfigFormat::Json),
            "yaml" | "yml" => Ok(ConfigFormat::Yaml),
            "toml" => Ok(ConfigFormat::Toml),
            _ => bail!("Unsupported format: {s}. Use json, toml, or yaml"),
        }
    }
}

impl ConfigFormat {
    fn extension(&self) -> &'static str {
        match self {
            ConfigFormat::Json => "json",
            ConfigFormat::Toml => "toml",
            ConfigFormat::Yaml => "yaml",
        }
    }
}

impl TidyConfig {
    /// Serialize the configuration in the given format
    pub fn export_config(&self, format: ConfigFormat) -> Result<String> {
        let output = match format {
            ConfigFormat::Json => serde_json::to_string_pretty(self)?,
            ConfigFormat::Toml => toml::to_string_pretty(self)?,
            ConfigFormat::Yaml => serde_yml::to_string(self)?,
        };
        Ok(output)
    }

    /// Serialize the configuration, highlighted when stdout is a terminal
    pub fn export_config_highlighted(&self, format: ConfigFormat) -> Result<String> {
        use syntect::easy::HighlightLines;
        use syntect::highlighting::Style;
        use syntect::util::{LinesWithEndings, as_24_bit_terminal_escaped};
        use two_face::theme::EmbeddedThemeName;
        use two_face::{syntax, theme};

        let output = self.export_config(format)?;

        if !atty::is(atty::Stream::Stdout) {
            return Ok(output);
        }

        let ps = syntax::extra_newlines();
        let ts = theme::extra();
        let syntax = ps
            .find_syntax_by_extension(format.extension())
            .unwrap_or_else(|| ps.find_syntax_plain_text());
        let theme = ts.get(EmbeddedThemeName::Base16OceanDark);

        let mut h = HighlightLines::new(syntax, theme);
        let mut highlighted = String::new();
        for line in LinesWithEndings::from(&output) {
            let ranges: Vec<(Style, &str)> = h.highlight_line(line, &ps)?;
            highlighted.push_str(&as_24_bit_terminal_escaped(&ranges[..], false));
        }
        highlighted.push_str("\x1b[0m");

        Ok(highlighted)
    }
}
