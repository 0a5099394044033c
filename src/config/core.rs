use anyhow::{Context, Result};
use figment::{
    Figment,
    providers::{Env, Format, Json, Toml, Yaml},
};

use super::TidyConfig;

// Embed the default config at compile time
const DEFAULT_CONFIG: &str = include_str!("../../default-config.toml");

impl TidyConfig {
    /// Load the configuration without a custom config file
    pub fn load() -> Result<Self> {
        Self::load_with_custom_config(None)
    }

    /// Merge defaults, config files and environment variables.
    ///
    /// A custom config file replaces the user and repository config files.
    pub fn load_with_custom_config(custom_config: Option<&str>) -> Result<Self> {
        let figment = Self::figment(custom_config);
        let config: TidyConfig = figment
            .extract()
            .context("Failed to load configuration")?;
        tracing::trace!("Loaded configuration: {config:?}");
        Ok(config)
    }

    /// The embedded default configuration only
    pub fn defaults() -> Result<Self> {
        Figment::new()
            .merge(Toml::string(DEFAULT_CONFIG))
            .extract()
            .context("Embedded default configuration is invalid")
    }

    fn figment(custom_config: Option<&str>) -> Figment {
        let mut figment = Figment::new().merge(Toml::string(DEFAULT_CONFIG));

        if let Some(custom_path) = custom_config {
            if !std::path::Path::new(custom_path).is_file() {
                tracing::warn!("Config file {custom_path} not found, using defaults");
            }
            figment = match custom_path.rsplit('.').next() {
                Some("json") => figment.merge(Json::file(custom_path)),
                Some("yaml") | Some("yml") => figment.merge(Yaml::file(custom_path)),
                _ => figment.merge(Toml::file(custom_path)),
            };
        } else {
            let user = Self::user_config_stem();
            figment = figment
                // User config, any format
                .merge(Toml::file(format!("{user}.toml")))
                .merge(Json::file(format!("{user}.json")))
                .merge(Yaml::file(format!("{user}.yaml")))
                .merge(Yaml::file(format!("{user}.yml")))
                // Repository config, any format
                .merge(Toml::file("tidypkg.toml"))
                .merge(Json::file("tidypkg.json"))
                .merge(Yaml::file("tidypkg.yaml"))
                .merge(Yaml::file("tidypkg.yml"));
        }

        // Environment variables always win, `__` separates nested keys
        figment.merge(Env::prefixed("TIDYPKG_").split("__"))
    }

    fn user_config_stem() -> String {
        match std::env::var("HOME") {
            Ok(home) => format!("{home}/.config/tidypkg/config"),
            Err(_) => "~/.config/tidypkg/config".to_string(),
        }
    }
}
