//! Type definitions for monday.com GraphQL responses.

use serde::Deserialize;

/// Envelope of every GraphQL response.
///
/// monday.com reports failures either as standard GraphQL `errors` or with
/// its own top-level `error_message` / `error_code` pair, sometimes alongside
/// an HTTP 200.
#[derive(Debug, Deserialize)]
pub struct GraphQlResponse<T> {
    pub data: Option<T>,
    #[serde(default)]
    pub errors: Vec<GraphQlError>,
    #[serde(default)]
    pub error_message: Option<String>,
    #[serde(default)]
    pub error_code: Option<String>,
}

impl<T> GraphQlResponse<T> {
    /// Collects every reported error into one message, or `None` when the
    /// response is clean.
    pub fn error_summary(&self) -> Option<String> {
        let mut messages: Vec<String> = self.errors.iter().map(|e| e.message.clone()).collect();
        if let Some(message) = &self.error_message {
            match &self.error_code {
                Some(code) => messages.push(format!("{message} ({code})")),
                None => messages.push(message.clone()),
            }
        } else if let Some(code) = &self.error_code {
            messages.push(code.clone());
        }

        if messages.is_empty() {
            None
        } else {
            Some(messages.join("; "))
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct GraphQlError {
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct BoardsData {
    pub boards: Vec<Board>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Board {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub items_page: Option<ItemsPage>,
}

#[derive(Debug, Deserialize)]
pub struct NextItemsPageData {
    pub next_items_page: ItemsPage,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ItemsPage {
    #[serde(default)]
    pub cursor: Option<String>,
    #[serde(default)]
    pub items: Vec<Item>,
}

/// A board row.
#[derive(Debug, Clone, Deserialize)]
pub struct Item {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub column_values: Vec<ColumnValue>,
}

/// One cell of a row. `value` is the raw JSON-encoded column value and
/// `text` its rendered form.
#[derive(Debug, Clone, Deserialize)]
pub struct ColumnValue {
    pub id: String,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub column: Option<ColumnMeta>,
}

impl ColumnValue {
    pub fn title(&self) -> Option<&str> {
        self.column.as_ref().map(|c| c.title.as_str())
    }

    pub fn settings(&self) -> Option<&str> {
        self.column.as_ref().and_then(|c| c.settings_str.as_deref())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ColumnMeta {
    pub title: String,
    #[serde(default)]
    pub settings_str: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateItemData {
    pub create_item: ItemRef,
}

#[derive(Debug, Deserialize)]
pub struct ChangeColumnValuesData {
    pub change_multiple_column_values: ItemRef,
}

#[derive(Debug, Deserialize)]
pub struct DeleteItemData {
    pub delete_item: Option<ItemRef>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ItemRef {
    pub id: String,
}
