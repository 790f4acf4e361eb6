//! monday.com GraphQL API access.

mod client;
pub mod types;

pub use client::MondayClient;

use thiserror::Error;

pub const DEFAULT_API_ENDPOINT: &str = "https://api.monday.com/v2";

/// Which board the scheduler is backed by.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoardSelector {
    /// An explicitly configured board id.
    Id(String),
    /// No board configured: take the second of the first two boards the
    /// token can see, or the only one if there is just one.
    Positional,
}

impl BoardSelector {
    pub fn from_config(board_id: Option<&str>) -> Self {
        match board_id.map(str::trim) {
            Some(id) if !id.is_empty() => Self::Id(id.to_string()),
            _ => Self::Positional,
        }
    }
}

#[derive(Debug, Error)]
pub enum MondayError {
    #[error("request to monday.com failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("monday.com returned HTTP {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("monday.com API error: {0}")]
    GraphQl(String),

    #[error("unexpected monday.com response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("monday.com response contained no data")]
    MissingData,

    #[error("board {0} not found")]
    BoardNotFound(String),

    #[error("no boards are visible to this access token")]
    NoBoards,
}
