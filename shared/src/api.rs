use serde::{Deserialize, Serialize};

use crate::models::{Assignment, ColumnValues, EventRecord, ResourceRecord, StatusOption};

/// Prefix the scheduler widget gives records that do not exist on the board
/// yet.
pub const PHANTOM_ID_PREFIX: &str = "_generated";

pub fn is_phantom_id(id: &str) -> bool {
    id.starts_with(PHANTOM_ID_PREFIX)
}

// ============================================================================
// Load
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rows<T> {
    pub rows: Vec<T>,
}

impl<T> From<Vec<T>> for Rows<T> {
    fn from(rows: Vec<T>) -> Self {
        Self { rows }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadResponse {
    pub success: bool,
    pub status_values: Vec<StatusOption>,
    pub resources: Rows<ResourceRecord>,
    pub events: Rows<EventRecord>,
    pub assignments: Rows<Assignment>,
}

// ============================================================================
// Create / Update
// ============================================================================

/// Body of `POST /api/create` and `PATCH /api/update/:id`.
///
/// The bundled client prepares monday.com column values itself; other callers
/// may send a flat event record and let the server do the mapping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SaveItemRequest {
    Prepared(PreparedItem),
    Event(EventRecord),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreparedItem {
    pub item_name: String,
    pub column_values: ColumnValues,
    #[serde(
        default,
        rename = "phantomId",
        alias = "$PhantomId",
        skip_serializing_if = "Option::is_none"
    )]
    pub phantom_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateResponse {
    pub success: bool,
    pub id: String,
    /// Client placeholder id this item replaces.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phantom_id: Option<String>,
}

impl CreateResponse {
    pub fn new(id: impl Into<String>, phantom_id: Option<String>) -> Self {
        Self {
            success: true,
            id: id.into(),
            phantom_id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AckResponse {
    pub success: bool,
}

impl AckResponse {
    pub fn ok() -> Self {
        Self { success: true }
    }
}

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}
