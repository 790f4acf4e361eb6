use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;

use crate::config::AppConfig;
use crate::mapping::ColumnLayout;
use crate::monday::{BoardSelector, MondayClient};

/// Shared, read-only handler state.
#[derive(Debug, Clone)]
pub struct AppState {
    pub monday: MondayClient,
    pub board: BoardSelector,
    pub layout: Arc<ColumnLayout>,
    pub page_size: u32,
}

impl AppState {
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let monday = MondayClient::new(
            &config.monday_api_url,
            &config.monday_access_token,
            Duration::from_secs(config.monday_timeout_secs),
        )?;

        Ok(Self {
            monday,
            board: config.board(),
            layout: Arc::new(config.column_layout.clone()),
            page_size: config.monday_page_size,
        })
    }
}
