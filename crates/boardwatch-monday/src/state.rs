//! Last-notified marker stored in a text column of the board.

use async_trait::async_trait;
use boardwatch_core::error::{BoardWatchError, Result};
use boardwatch_core::traits::StateStore;
use serde::Deserialize;
use std::sync::Arc;

use crate::client::MondayClient;

const READ_QUERY: &str = r#"
query ReadLastNotified($itemId: [ID!], $columnId: [String!]) {
  items(ids: $itemId) {
    id
    column_values(ids: $columnId) { id text }
  }
}
"#;

const WRITE_MUTATION: &str = r#"
mutation SetLastNotified($boardId: ID!, $itemId: ID!, $columnId: String!, $value: String!) {
  change_simple_column_value(board_id: $boardId, item_id: $itemId, column_id: $columnId, value: $value) {
    id
  }
}
"#;

#[derive(Deserialize)]
struct ReadData {
    items: Vec<ReadItem>,
}

#[derive(Deserialize)]
struct ReadItem {
    #[serde(default)]
    column_values: Vec<ReadValue>,
}

#[derive(Deserialize)]
struct ReadValue {
    text: Option<String>,
}

/// `StateStore` over the configured last-notified column. No caching of
/// values; only the column id is resolved through the client's column cache.
pub struct MondayStateStore {
    client: Arc<MondayClient>,
}

impl MondayStateStore {
    pub fn new(client: Arc<MondayClient>) -> Self {
        Self { client }
    }

    async fn column_id(&self) -> Result<String> {
        self.client.column_id(self.client.last_notified_title()).await
    }
}

#[async_trait]
impl StateStore for MondayStateStore {
    fn name(&self) -> &str { "monday" }

    async fn read(&self, item_id: &str) -> Result<Option<String>> {
        let column_id = self.column_id().await?;
        let data: ReadData = self
            .client
            .graphql(
                READ_QUERY,
                serde_json::json!({ "itemId": [item_id], "columnId": [column_id] }),
            )
            .await?;

        let item = data
            .items
            .into_iter()
            .next()
            .ok_or_else(|| BoardWatchError::GraphQl(format!("item {item_id} not found")))?;

        Ok(item
            .column_values
            .into_iter()
            .next()
            .and_then(|v| v.text)
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty()))
    }

    async fn write(&self, item_id: &str, value: &str) -> Result<()> {
        let column_id = self
            .column_id()
            .await
            .map_err(|e| BoardWatchError::write_failed(item_id, e))?;

        let _: serde_json::Value = self
            .client
            .graphql(
                WRITE_MUTATION,
                serde_json::json!({
                    "boardId": self.client.board_id_var(),
                    "itemId": item_id,
                    "columnId": column_id,
                    "value": value,
                }),
            )
            .await
            .map_err(|e| BoardWatchError::write_failed(item_id, e))?;

        tracing::debug!("item {item_id}: last-notified set to {value:?}");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::tests::{columns_body, test_config};
    use mockito::Matcher;

    async fn server_with_columns() -> mockito::ServerGuard {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/")
            .match_body(Matcher::Regex("query BoardColumns".into()))
            .with_status(200)
            .with_body(columns_body())
            .create_async()
            .await;
        server
    }

    #[tokio::test]
    async fn test_write_sends_mutation() {
        let mut server = server_with_columns().await;
        let mutation = server
            .mock("POST", "/")
            .match_body(Matcher::AllOf(vec![
                Matcher::Regex("mutation SetLastNotified".into()),
                Matcher::PartialJson(serde_json::json!({
                    "variables": {
                        "boardId": "123",
                        "itemId": "42",
                        "columnId": "text_last",
                        "value": "2024-01-02T00:00:00Z"
                    }
                })),
            ]))
            .with_status(200)
            .with_body(r#"{"data":{"change_simple_column_value":{"id":"42"}}}"#)
            .expect(1)
            .create_async()
            .await;

        let store = MondayStateStore::new(Arc::new(MondayClient::new(&test_config(&server.url())).unwrap()));
        store.write("42", "2024-01-02T00:00:00Z").await.unwrap();
        mutation.assert_async().await;
    }

    #[tokio::test]
    async fn test_clear_writes_empty_value() {
        let mut server = server_with_columns().await;
        let mutation = server
            .mock("POST", "/")
            .match_body(Matcher::PartialJson(serde_json::json!({
                "variables": { "itemId": "42", "value": "" }
            })))
            .with_status(200)
            .with_body(r#"{"data":{"change_simple_column_value":{"id":"42"}}}"#)
            .expect(1)
            .create_async()
            .await;

        let store = MondayStateStore::new(Arc::new(MondayClient::new(&test_config(&server.url())).unwrap()));
        store.clear("42").await.unwrap();
        mutation.assert_async().await;
    }

    #[tokio::test]
    async fn test_write_failure_is_item_scoped() {
        let mut server = server_with_columns().await;
        server
            .mock("POST", "/")
            .match_body(Matcher::Regex("mutation SetLastNotified".into()))
            .with_status(200)
            .with_body(r#"{"errors":[{"message":"Item not found"}]}"#)
            .create_async()
            .await;

        let store = MondayStateStore::new(Arc::new(MondayClient::new(&test_config(&server.url())).unwrap()));
        let err = store.write("42", "x").await.unwrap_err();
        assert!(matches!(err, BoardWatchError::ItemWriteFailed { ref item_id, .. } if item_id == "42"));
    }

    #[tokio::test]
    async fn test_read() {
        let mut server = server_with_columns().await;
        server
            .mock("POST", "/")
            .match_body(Matcher::AllOf(vec![
                Matcher::Regex("query ReadLastNotified".into()),
                Matcher::PartialJson(serde_json::json!({
                    "variables": { "itemId": ["7"], "columnId": ["text_last"] }
                })),
            ]))
            .with_status(200)
            .with_body(r#"{"data":{"items":[{"id":"7","column_values":[{"id":"text_last","text":" 1704067200 "}]}]}}"#)
            .create_async()
            .await;
        server
            .mock("POST", "/")
            .match_body(Matcher::AllOf(vec![
                Matcher::Regex("query ReadLastNotified".into()),
                Matcher::PartialJson(serde_json::json!({ "variables": { "itemId": ["8"] } })),
            ]))
            .with_status(200)
            .with_body(r#"{"data":{"items":[{"id":"8","column_values":[{"id":"text_last","text":""}]}]}}"#)
            .create_async()
            .await;

        let store = MondayStateStore::new(Arc::new(MondayClient::new(&test_config(&server.url())).unwrap()));
        assert_eq!(store.read("7").await.unwrap().as_deref(), Some("1704067200"));
        assert_eq!(store.read("8").await.unwrap(), None);
    }
}
