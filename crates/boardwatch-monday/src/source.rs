//! Board snapshot via cursor-paginated `items_page`.

use async_trait::async_trait;
use boardwatch_core::error::{BoardWatchError, Result};
use boardwatch_core::traits::DataSource;
use boardwatch_core::types::Item;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;

use crate::client::{BoardColumns, MondayClient};

const PAGE_SIZE: u32 = 500;
/// Upper bound on pages per snapshot (100k items).
const MAX_PAGES: usize = 200;

const FIRST_PAGE_QUERY: &str = r#"
query ItemsPage($boardId: [ID!], $limit: Int!, $columnIds: [String!]) {
  boards(ids: $boardId) {
    items_page(limit: $limit) {
      cursor
      items {
        id
        name
        column_values(ids: $columnIds) { id text }
      }
    }
  }
}
"#;

const NEXT_PAGE_QUERY: &str = r#"
query NextItemsPage($cursor: String!, $limit: Int!, $columnIds: [String!]) {
  next_items_page(cursor: $cursor, limit: $limit) {
    cursor
    items {
      id
      name
      column_values(ids: $columnIds) { id text }
    }
  }
}
"#;

#[derive(Deserialize)]
struct FirstPageData {
    boards: Vec<PageBoard>,
}

#[derive(Deserialize)]
struct PageBoard {
    items_page: ItemsPage,
}

#[derive(Deserialize)]
struct NextPageData {
    next_items_page: ItemsPage,
}

#[derive(Deserialize)]
struct ItemsPage {
    cursor: Option<String>,
    items: Vec<ItemNode>,
}

#[derive(Deserialize)]
struct ItemNode {
    id: String,
    name: String,
    #[serde(default)]
    column_values: Vec<ColumnValueNode>,
}

#[derive(Deserialize)]
struct ColumnValueNode {
    id: String,
    text: Option<String>,
}

impl ItemNode {
    fn into_item(self, columns: &BoardColumns) -> Item {
        let texts: HashMap<String, String> = self
            .column_values
            .into_iter()
            .map(|cv| (cv.id, cv.text.unwrap_or_default()))
            .collect();
        let text = |id: &str| texts.get(id).cloned().unwrap_or_default();

        Item::from_columns(
            self.id,
            self.name,
            &text(&columns.status),
            &text(&columns.tag),
            &text(&columns.last_notified),
        )
    }
}

/// `DataSource` backed by one monday.com board.
pub struct MondaySource {
    client: Arc<MondayClient>,
}

impl MondaySource {
    pub fn new(client: Arc<MondayClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl DataSource for MondaySource {
    fn name(&self) -> &str { "monday" }

    async fn fetch_items(&self) -> Result<Vec<Item>> {
        let columns = self.client.board_columns().await?;
        let column_ids = columns.ids();

        let first: FirstPageData = self
            .client
            .graphql(
                FIRST_PAGE_QUERY,
                serde_json::json!({
                    "boardId": [self.client.board_id_var()],
                    "limit": PAGE_SIZE,
                    "columnIds": column_ids,
                }),
            )
            .await?;
        let mut page = first
            .boards
            .into_iter()
            .next()
            .map(|b| b.items_page)
            .ok_or_else(|| {
                BoardWatchError::source_unavailable(format!(
                    "board {} not found or not accessible",
                    self.client.board_id()
                ))
            })?;

        let mut items = Vec::new();
        let mut pages = 1;
        loop {
            let cursor = page.cursor.take();
            items.extend(page.items.drain(..).map(|node| node.into_item(&columns)));

            let Some(cursor) = cursor else { break };
            if pages >= MAX_PAGES {
                tracing::warn!("monday board {} exceeds {MAX_PAGES} pages; snapshot truncated", self.client.board_id());
                break;
            }

            let next: NextPageData = self
                .client
                .graphql(
                    NEXT_PAGE_QUERY,
                    serde_json::json!({
                        "cursor": cursor,
                        "limit": PAGE_SIZE,
                        "columnIds": column_ids,
                    }),
                )
                .await?;
            page = next.next_items_page;
            pages += 1;
        }

        tracing::debug!("monday board {}: {} items in {pages} page(s)", self.client.board_id(), items.len());
        Ok(items)
    }
}
