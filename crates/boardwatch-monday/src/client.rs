//! monday.com GraphQL transport with a title → column-id cache.

use boardwatch_core::config::MondayConfig;
use boardwatch_core::error::{BoardWatchError, Result};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const COLUMN_CACHE_TTL: Duration = Duration::from_secs(10 * 60);
const API_VERSION: &str = "2024-01";

const COLUMNS_QUERY: &str = r#"
query BoardColumns($boardId: [ID!]) {
  boards(ids: $boardId) {
    columns { id title }
  }
}
"#;

/// Column ids of the three columns the engine uses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardColumns {
    pub status: String,
    pub tag: String,
    pub last_notified: String,
}

impl BoardColumns {
    pub fn ids(&self) -> [&str; 3] {
        [self.status.as_str(), self.tag.as_str(), self.last_notified.as_str()]
    }
}

#[derive(Default)]
struct ColumnCache {
    fetched_at: Option<Instant>,
    by_title: HashMap<String, String>,
}

#[derive(Deserialize)]
struct ColumnsData {
    boards: Vec<ColumnsBoard>,
}

#[derive(Deserialize)]
struct ColumnsBoard {
    columns: Vec<ColumnNode>,
}

#[derive(Deserialize)]
struct ColumnNode {
    id: String,
    title: Option<String>,
}

/// Shared client for one board. Used by both the data source and the state store.
pub struct MondayClient {
    http: reqwest::Client,
    api_url: String,
    api_key: String,
    board_id: u64,
    titles: [String; 3],
    column_ttl: Duration,
    columns: Mutex<ColumnCache>,
}

impl MondayClient {
    pub fn new(config: &MondayConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("BoardWatch/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| BoardWatchError::Http(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            api_url: config.api_url.clone(),
            api_key: config.api_key.clone(),
            board_id: config.board_id,
            titles: [
                config.status_column.clone(),
                config.tag_column.clone(),
                config.last_notified_column.clone(),
            ],
            column_ttl: COLUMN_CACHE_TTL,
            columns: Mutex::new(ColumnCache::default()),
        })
    }

    /// Override how long the column map is trusted.
    pub fn with_column_ttl(mut self, ttl: Duration) -> Self {
        self.column_ttl = ttl;
        self
    }

    pub fn board_id(&self) -> u64 {
        self.board_id
    }

    pub fn board_id_var(&self) -> String {
        self.board_id.to_string()
    }

    /// Run a GraphQL operation and decode its `data` member.
    pub async fn graphql<T: DeserializeOwned>(
        &self,
        query: &str,
        variables: serde_json::Value,
    ) -> Result<T> {
        tracing::debug!("monday request: {}", first_line(query));

        let response = self
            .http
            .post(&self.api_url)
            .header("Authorization", &self.api_key)
            .header("API-Version", API_VERSION)
            .json(&serde_json::json!({ "query": query, "variables": variables }))
            .send()
            .await
            .map_err(|e| BoardWatchError::source_unavailable(format!("monday request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(BoardWatchError::source_unavailable(format!("monday HTTP {status}: {text}")));
        }

        let mut body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| BoardWatchError::source_unavailable(format!("invalid monday response: {e}")))?;

        if let Some(errors) = body.get("errors").filter(|e| !e.is_null()) {
            return Err(BoardWatchError::GraphQl(errors.to_string()));
        }

        let data = body
            .get_mut("data")
            .map(serde_json::Value::take)
            .filter(|d| !d.is_null())
            .ok_or_else(|| BoardWatchError::GraphQl("response has no data".into()))?;

        serde_json::from_value(data)
            .map_err(|e| BoardWatchError::GraphQl(format!("unexpected response shape: {e}")))
    }

    /// Title (lowercased, trimmed) → column id. Served from cache within the TTL
    /// unless `force_refresh`.
    pub async fn column_map(&self, force_refresh: bool) -> Result<HashMap<String, String>> {
        let mut cache = self.columns.lock().await;
        let fresh = cache
            .fetched_at
            .is_some_and(|at| at.elapsed() < self.column_ttl);
        if fresh && !force_refresh && !cache.by_title.is_empty() {
            return Ok(cache.by_title.clone());
        }

        let data: ColumnsData = self
            .graphql(COLUMNS_QUERY, serde_json::json!({ "boardId": [self.board_id_var()] }))
            .await?;
        let board = data.boards.into_iter().next().ok_or_else(|| {
            BoardWatchError::source_unavailable(format!("board {} not found or not accessible", self.board_id))
        })?;

        cache.by_title = board
            .columns
            .into_iter()
            .map(|c| (normalize_title(c.title.as_deref().unwrap_or_default()), c.id))
            .collect();
        cache.fetched_at = Some(Instant::now());
        tracing::debug!("monday column map refreshed ({} columns)", cache.by_title.len());
        Ok(cache.by_title.clone())
    }

    /// Resolve one column title, refreshing the cache once on a miss.
    pub async fn column_id(&self, title: &str) -> Result<String> {
        let key = normalize_title(title);
        if let Some(id) = self.column_map(false).await?.get(&key) {
            return Ok(id.clone());
        }
        self.column_map(true)
            .await?
            .get(&key)
            .cloned()
            .ok_or_else(|| BoardWatchError::ColumnNotFound(title.to_string()))
    }

    /// Resolve the configured status, tag and last-notified columns.
    pub async fn board_columns(&self) -> Result<BoardColumns> {
        let [status, tag, last_notified] = &self.titles;
        Ok(BoardColumns {
            status: self.column_id(status).await?,
            tag: self.column_id(tag).await?,
            last_notified: self.column_id(last_notified).await?,
        })
    }

    pub fn last_notified_title(&self) -> &str {
        &self.titles[2]
    }
}

pub(crate) fn normalize_title(title: &str) -> String {
    title.trim().to_lowercase()
}

fn first_line(query: &str) -> &str {
    query.trim().lines().next().unwrap_or_default()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use mockito::Matcher;

    pub(crate) fn test_config(url: &str) -> MondayConfig {
        MondayConfig {
            api_url: url.to_string(),
            api_key: "test-key".into(),
            board_id: 123,
            ..MondayConfig::default()
        }
    }

    pub(crate) fn columns_body() -> String {
        serde_json::json!({
            "data": {
                "boards": [{
                    "columns": [
                        { "id": "name", "title": "Name" },
                        { "id": "status", "title": "Status" },
                        { "id": "text_tag", "title": "UCR / DL" },
                        { "id": "text_last", "title": " last notified " }
                    ]
                }]
            }
        })
        .to_string()
    }

    #[tokio::test]
    async fn test_column_map_is_cached() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/")
            .match_header("authorization", "test-key")
            .match_body(Matcher::Regex("query BoardColumns".into()))
            .with_status(200)
            .with_body(columns_body())
            .expect(1)
            .create_async()
            .await;

        let client = MondayClient::new(&test_config(&server.url())).unwrap();
        let columns = client.board_columns().await.unwrap();
        assert_eq!(
            columns,
            BoardColumns {
                status: "status".into(),
                tag: "text_tag".into(),
                last_notified: "text_last".into(),
            }
        );
        // Second lookup is served from cache.
        assert_eq!(client.column_id("STATUS").await.unwrap(), "status");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_expired_column_map_is_refetched() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/")
            .match_body(Matcher::Regex("query BoardColumns".into()))
            .with_status(200)
            .with_body(columns_body())
            .expect(2)
            .create_async()
            .await;

        let client = MondayClient::new(&test_config(&server.url()))
            .unwrap()
            .with_column_ttl(Duration::ZERO);
        client.column_id("Status").await.unwrap();
        client.column_id("Status").await.unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_missing_column_refreshes_once() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/")
            .match_body(Matcher::Regex("query BoardColumns".into()))
            .with_status(200)
            .with_body(columns_body())
            .expect(2)
            .create_async()
            .await;

        let client = MondayClient::new(&test_config(&server.url())).unwrap();
        let err = client.column_id("Owner").await.unwrap_err();
        assert!(matches!(err, BoardWatchError::ColumnNotFound(ref t) if t == "Owner"));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_graphql_errors_surface() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/")
            .with_status(200)
            .with_body(r#"{"errors":[{"message":"Not Authenticated"}]}"#)
            .create_async()
            .await;

        let client = MondayClient::new(&test_config(&server.url())).unwrap();
        let err = client.column_map(false).await.unwrap_err();
        assert!(matches!(err, BoardWatchError::GraphQl(ref m) if m.contains("Not Authenticated")));
    }

    #[tokio::test]
    async fn test_http_error_is_source_unavailable() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/")
            .with_status(503)
            .with_body("maintenance")
            .create_async()
            .await;

        let client = MondayClient::new(&test_config(&server.url())).unwrap();
        let err = client.column_map(false).await.unwrap_err();
        assert!(matches!(err, BoardWatchError::SourceUnavailable(ref m) if m.contains("503")));
    }

    #[tokio::test]
    async fn test_unknown_board() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/")
            .with_status(200)
            .with_body(r#"{"data":{"boards":[]}}"#)
            .create_async()
            .await;

        let client = MondayClient::new(&test_config(&server.url())).unwrap();
        let err = client.column_map(false).await.unwrap_err();
        assert!(matches!(err, BoardWatchError::SourceUnavailable(ref m) if m.contains("123")));
    }
}
