use anyhow::{ensure, Context, Result};
use config::builder::DefaultState;
use config::{ConfigBuilder, Environment, File};
use serde::Deserialize;

use crate::mapping::ColumnLayout;
use crate::monday::{BoardSelector, DEFAULT_API_ENDPOINT};

/// Optional settings file (`scheduler.toml`, `.yaml`, `.json`, ...) in the
/// working directory.
const CONFIG_FILE: &str = "scheduler";

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_port")]
    pub port: u16,
    pub monday_access_token: String,
    #[serde(default)]
    pub monday_board_id: Option<String>,
    #[serde(default = "default_api_url")]
    pub monday_api_url: String,
    #[serde(default = "default_timeout_secs")]
    pub monday_timeout_secs: u64,
    #[serde(default = "default_page_size")]
    pub monday_page_size: u32,
    #[serde(default = "default_public_dir")]
    pub public_dir: String,
    #[serde(default)]
    pub cors_allowed_origins: Option<String>,
    #[serde(default)]
    pub column_layout: ColumnLayout,
}

fn default_port() -> u16 {
    1338
}

fn default_api_url() -> String {
    DEFAULT_API_ENDPOINT.to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_page_size() -> u32 {
    100
}

fn default_public_dir() -> String {
    "public".to_string()
}

impl AppConfig {
    /// Reads the optional settings file, then environment variables
    /// (`PORT`, `MONDAY_ACCESS_TOKEN`, `MONDAY_BOARD_ID`, ...), later sources
    /// winning.
    pub fn load() -> Result<Self> {
        let builder = config::Config::builder()
            .add_source(File::with_name(CONFIG_FILE).required(false))
            .add_source(Environment::default());

        Self::from_builder(builder)
    }

    fn from_builder(builder: ConfigBuilder<DefaultState>) -> Result<Self> {
        let config: Self = builder
            .build()
            .context("Failed to read configuration")?
            .try_deserialize()
            .context("Invalid configuration (MONDAY_ACCESS_TOKEN must be set)")?;

        ensure!(
            !config.monday_access_token.trim().is_empty(),
            "MONDAY_ACCESS_TOKEN must not be empty"
        );
        ensure!(
            (1..=500).contains(&config.monday_page_size),
            "MONDAY_PAGE_SIZE must be between 1 and 500"
        );

        Ok(config)
    }

    pub fn board(&self) -> BoardSelector {
        BoardSelector::from_config(self.monday_board_id.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use config::FileFormat;

    use super::*;

    fn from_toml(toml: &str) -> Result<AppConfig> {
        AppConfig::from_builder(
            config::Config::builder().add_source(File::from_str(toml, FileFormat::Toml)),
        )
    }

    #[test]
    fn test_defaults_apply() {
        let config = from_toml(r#"monday_access_token = "secret""#).unwrap();

        assert_eq!(config.port, 1338);
        assert_eq!(config.monday_api_url, DEFAULT_API_ENDPOINT);
        assert_eq!(config.monday_timeout_secs, 30);
        assert_eq!(config.public_dir, "public");
        assert_eq!(config.board(), BoardSelector::Positional);
        assert_eq!(config.column_layout, ColumnLayout::default());
    }

    #[test]
    fn test_missing_token_is_rejected() {
        let err = from_toml("port = 8080").unwrap_err();
        assert!(format!("{err:#}").contains("MONDAY_ACCESS_TOKEN"));
    }

    #[test]
    fn test_blank_token_is_rejected() {
        assert!(from_toml(r#"monday_access_token = "  ""#).is_err());
    }

    #[test]
    fn test_board_id_and_layout_override() {
        let config = from_toml(
            r#"
            monday_access_token = "secret"
            monday_board_id = "1234567"
            port = 9000

            [column_layout.price]
            title = "Nightly rate"
            id = "numbers7"
            "#,
        )
        .unwrap();

        assert_eq!(config.port, 9000);
        assert_eq!(config.board(), BoardSelector::Id("1234567".to_string()));
        assert_eq!(config.column_layout.price.title, "Nightly rate");
        assert_eq!(config.column_layout.price.id, "numbers7");
        assert_eq!(
            config.column_layout.dates,
            ColumnLayout::default().dates,
            "untouched columns keep their defaults"
        );
    }
}
