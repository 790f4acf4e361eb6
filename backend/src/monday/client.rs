use std::time::Duration;

use anyhow::Context;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use shared::models::ColumnValues;

use super::types::{
    Board, BoardsData, ChangeColumnValuesData, CreateItemData, DeleteItemData, GraphQlResponse,
    Item, NextItemsPageData,
};
use super::{BoardSelector, MondayError};

/// API version pinned for `items_page` / `next_items_page` support.
const API_VERSION: &str = "2024-10";

/// Upper bound on `next_items_page` round trips for a single load.
const MAX_ITEM_PAGES: usize = 50;

const ITEM_FIELDS: &str = "id name column_values { id text value column { title settings_str } }";

/// Thin GraphQL client over `reqwest`.
///
/// Cloning is cheap: the underlying connection pool is shared.
#[derive(Clone)]
pub struct MondayClient {
    http: reqwest::Client,
    endpoint: String,
}

impl std::fmt::Debug for MondayClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MondayClient")
            .field("endpoint", &self.endpoint)
            .finish_non_exhaustive()
    }
}

impl MondayClient {
    pub fn new(endpoint: &str, access_token: &str, timeout: Duration) -> anyhow::Result<Self> {
        let mut token = HeaderValue::from_str(access_token.trim())
            .context("MONDAY_ACCESS_TOKEN contains characters not allowed in a header")?;
        token.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, token);
        headers.insert(
            HeaderName::from_static("api-version"),
            HeaderValue::from_static(API_VERSION),
        );

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .context("Failed to build monday.com HTTP client")?;

        Ok(Self {
            http,
            endpoint: endpoint.trim().trim_end_matches('/').to_string(),
        })
    }

    /// Executes a GraphQL document and returns its `data`.
    ///
    /// Errors reported inside the response body are returned as
    /// [`MondayError::GraphQl`] even when the HTTP status is 200.
    pub async fn execute<T: DeserializeOwned>(
        &self,
        query: &str,
        variables: Value,
    ) -> Result<T, MondayError> {
        let response = self
            .http
            .post(&self.endpoint)
            .json(&json!({ "query": query, "variables": variables }))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        match serde_json::from_str::<GraphQlResponse<T>>(&body) {
            Ok(envelope) => {
                if let Some(message) = envelope.error_summary() {
                    return Err(MondayError::GraphQl(message));
                }
                if !status.is_success() {
                    return Err(MondayError::Status { status, body });
                }
                envelope.data.ok_or(MondayError::MissingData)
            }
            Err(_) if !status.is_success() => Err(MondayError::Status { status, body }),
            Err(e) => Err(MondayError::Decode(e)),
        }
    }

    /// Fetches every item of the selected board, following pagination
    /// cursors.
    pub async fn fetch_board_items(
        &self,
        board: &BoardSelector,
        page_size: u32,
    ) -> Result<Vec<Item>, MondayError> {
        let (board_ids, limit) = match board {
            BoardSelector::Id(id) => (json!([id]), 1),
            BoardSelector::Positional => (Value::Null, 2),
        };

        let query = format!(
            "query ($boardIds: [ID!], $limit: Int!, $pageSize: Int!) {{ boards(ids: $boardIds, limit: $limit) {{ id name items_page(limit: $pageSize) {{ cursor items {{ {ITEM_FIELDS} }} }} }} }}"
        );
        let data: BoardsData = self
            .execute(
                &query,
                json!({ "boardIds": board_ids, "limit": limit, "pageSize": page_size }),
            )
            .await?;

        let board = select_board(data.boards, board)?;
        tracing::debug!(board_id = %board.id, board_name = %board.name, "Reading board items");

        let mut page = board.items_page.unwrap_or_default();
        let mut items = std::mem::take(&mut page.items);
        let mut cursor = page.cursor;
        let mut pages = 1;

        let next_query = format!(
            "query ($cursor: String!, $pageSize: Int!) {{ next_items_page(cursor: $cursor, limit: $pageSize) {{ cursor items {{ {ITEM_FIELDS} }} }} }}"
        );
        while let Some(next) = cursor.take() {
            if pages >= MAX_ITEM_PAGES {
                tracing::warn!(
                    pages,
                    items = items.len(),
                    "Stopping board pagination at page limit"
                );
                break;
            }

            let data: NextItemsPageData = self
                .execute(&next_query, json!({ "cursor": next, "pageSize": page_size }))
                .await?;
            items.extend(data.next_items_page.items);
            cursor = data.next_items_page.cursor;
            pages += 1;
        }

        Ok(items)
    }

    /// Returns the id of the selected board, looking it up when no id is
    /// configured.
    pub async fn resolve_board_id(&self, board: &BoardSelector) -> Result<String, MondayError> {
        match board {
            BoardSelector::Id(id) => Ok(id.clone()),
            BoardSelector::Positional => {
                let data: BoardsData = self
                    .execute("query { boards(limit: 2) { id name } }", json!({}))
                    .await?;
                select_board(data.boards, board).map(|b| b.id)
            }
        }
    }

    /// Creates an item and returns its monday.com id.
    pub async fn create_item(
        &self,
        board_id: &str,
        item_name: &str,
        column_values: &ColumnValues,
    ) -> Result<String, MondayError> {
        let query = "mutation ($boardId: ID!, $itemName: String!, $columnValues: JSON) { create_item(board_id: $boardId, item_name: $itemName, column_values: $columnValues) { id } }";
        let data: CreateItemData = self
            .execute(
                query,
                json!({
                    "boardId": board_id,
                    "itemName": item_name,
                    "columnValues": serde_json::to_string(column_values)?,
                }),
            )
            .await?;

        Ok(data.create_item.id)
    }

    pub async fn change_column_values(
        &self,
        board_id: &str,
        item_id: &str,
        column_values: &ColumnValues,
    ) -> Result<(), MondayError> {
        let query = "mutation ($boardId: ID!, $itemId: ID!, $columnValues: JSON!) { change_multiple_column_values(board_id: $boardId, item_id: $itemId, column_values: $columnValues) { id } }";
        let data: ChangeColumnValuesData = self
            .execute(
                query,
                json!({
                    "boardId": board_id,
                    "itemId": item_id,
                    "columnValues": serde_json::to_string(column_values)?,
                }),
            )
            .await?;

        tracing::debug!(item_id = %data.change_multiple_column_values.id, "Column values changed");
        Ok(())
    }

    pub async fn delete_item(&self, item_id: &str) -> Result<(), MondayError> {
        let query = "mutation ($itemId: ID!) { delete_item(item_id: $itemId) { id } }";
        let data: DeleteItemData = self.execute(query, json!({ "itemId": item_id })).await?;

        if data.delete_item.is_none() {
            tracing::warn!(item_id, "delete_item returned no item");
        }
        Ok(())
    }
}

fn select_board(mut boards: Vec<Board>, selector: &BoardSelector) -> Result<Board, MondayError> {
    match selector {
        BoardSelector::Id(id) => boards
            .into_iter()
            .find(|b| &b.id == id)
            .ok_or_else(|| MondayError::BoardNotFound(id.clone())),
        BoardSelector::Positional if boards.len() > 1 => Ok(boards.swap_remove(1)),
        BoardSelector::Positional => boards.pop().ok_or(MondayError::NoBoards),
    }
}

#[cfg(test)]
mod tests {
    use wiremock::{
        matchers::{body_string_contains, header, method, path},
        Mock, MockServer, ResponseTemplate,
    };

    use super::*;

    fn test_client(server: &MockServer) -> MondayClient {
        MondayClient::new(&server.uri(), "test-token", Duration::from_secs(5)).unwrap()
    }

    fn board(id: &str) -> Board {
        Board {
            id: id.to_string(),
            name: format!("Board {id}"),
            items_page: None,
        }
    }

    #[test]
    fn test_select_board_positional_prefers_second() {
        let selected = select_board(vec![board("1"), board("2")], &BoardSelector::Positional);
        assert_eq!(selected.unwrap().id, "2");

        let selected = select_board(vec![board("1")], &BoardSelector::Positional);
        assert_eq!(selected.unwrap().id, "1");

        let selected = select_board(vec![], &BoardSelector::Positional);
        assert!(matches!(selected, Err(MondayError::NoBoards)));
    }

    #[test]
    fn test_select_board_by_id() {
        let selector = BoardSelector::Id("2".to_string());
        assert_eq!(
            select_board(vec![board("1"), board("2")], &selector)
                .unwrap()
                .id,
            "2"
        );
        assert!(matches!(
            select_board(vec![board("1")], &selector),
            Err(MondayError::BoardNotFound(id)) if id == "2"
        ));
    }

    #[tokio::test]
    async fn test_create_item_sends_token_and_returns_id() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/"))
            .and(header("authorization", "test-token"))
            .and(body_string_contains("create_item"))
            .and(body_string_contains("Jane Doe"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "data": { "create_item": { "id": "987" } } })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let mut values = ColumnValues::new();
        values.insert("numbers__1", json!(120));

        let id = test_client(&server)
            .create_item("123", "Jane Doe", &values)
            .await
            .unwrap();
        assert_eq!(id, "987");
    }

    #[tokio::test]
    async fn test_graphql_errors_in_ok_response_are_errors() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": null,
                "errors": [{ "message": "Item not found", "locations": [] }]
            })))
            .mount(&server)
            .await;

        let result = test_client(&server).delete_item("42").await;
        match result {
            Err(MondayError::GraphQl(message)) => assert_eq!(message, "Item not found"),
            other => panic!("expected GraphQL error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_monday_error_message_style_is_detected() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "error_message": "Not Authenticated",
                "error_code": "Unauthorized"
            })))
            .mount(&server)
            .await;

        let result = test_client(&server).resolve_board_id(&BoardSelector::Positional).await;
        assert!(
            matches!(result, Err(MondayError::GraphQl(ref m)) if m.contains("Not Authenticated"))
        );
    }

    #[tokio::test]
    async fn test_non_json_failure_keeps_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503).set_body_string("upstream unavailable"))
            .mount(&server)
            .await;

        let result = test_client(&server).delete_item("42").await;
        match result {
            Err(MondayError::Status { status, body }) => {
                assert_eq!(status.as_u16(), 503);
                assert_eq!(body, "upstream unavailable");
            }
            other => panic!("expected status error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_fetch_board_items_follows_cursor() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_string_contains("boards(ids: $boardIds"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": { "boards": [{
                    "id": "123",
                    "name": "Bookings",
                    "items_page": {
                        "cursor": "page-2",
                        "items": [{ "id": "1", "name": "First", "column_values": [] }]
                    }
                }]}
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(body_string_contains("next_items_page"))
            .and(body_string_contains("page-2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": { "next_items_page": {
                    "cursor": null,
                    "items": [{ "id": "2", "name": "Second", "column_values": [] }]
                }}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let items = test_client(&server)
            .fetch_board_items(&BoardSelector::Id("123".to_string()), 1)
            .await
            .unwrap();

        let ids: Vec<_> = items.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2"]);
    }

    #[tokio::test]
    async fn test_fetch_board_items_stops_at_page_limit() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_string_contains("boards(ids: $boardIds"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": { "boards": [{
                    "id": "123",
                    "name": "Bookings",
                    "items_page": {
                        "cursor": "more",
                        "items": [{ "id": "1", "name": "First", "column_values": [] }]
                    }
                }]}
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(body_string_contains("next_items_page"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": { "next_items_page": {
                    "cursor": "more",
                    "items": [{ "id": "2", "name": "Again", "column_values": [] }]
                }}
            })))
            .expect((MAX_ITEM_PAGES - 1) as u64)
            .mount(&server)
            .await;

        let items = test_client(&server)
            .fetch_board_items(&BoardSelector::Id("123".to_string()), 1)
            .await
            .unwrap();

        assert_eq!(items.len(), MAX_ITEM_PAGES);
        assert_eq!(items[0].id, "1");
    }

    #[tokio::test]
    async fn test_fetch_board_items_unknown_board() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "data": { "boards": [] } })),
            )
            .mount(&server)
            .await;

        let result = test_client(&server)
            .fetch_board_items(&BoardSelector::Id("123".to_string()), 100)
            .await;
        assert!(matches!(result, Err(MondayError::BoardNotFound(_))));
    }
}
