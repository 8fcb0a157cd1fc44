// src/api/blocks.rs
use super::{collect_all, with_query, Block, List, PageQuery, RichText};
use crate::error::Result;
use crate::executor::RequestExecutor;
use crate::types::{BlockId, ValidationError};
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// A block to create, in the JSON shape the API accepts.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct BlockRequest(Value);

impl BlockRequest {
    fn text_block(kind: &str, text: &str, extra: Value) -> Self {
        let mut payload = json!({ "rich_text": [RichText::plain(text)] });
        if let (Some(payload), Value::Object(extra)) = (payload.as_object_mut(), extra) {
            payload.extend(extra);
        }
        Self(json!({ "object": "block", "type": kind, kind: payload }))
    }

    pub fn paragraph(text: &str) -> Self {
        Self::text_block("paragraph", text, Value::Null)
    }

    /// `level` must be 1, 2 or 3.
    pub fn heading(level: u8, text: &str) -> Result<Self, ValidationError> {
        if !(1..=3).contains(&level) {
            return Err(ValidationError::OutOfBounds {
                value: u32::from(level),
                min: 1,
                max: 3,
            });
        }
        Ok(Self::text_block(
            &format!("heading_{}", level),
            text,
            Value::Null,
        ))
    }

    pub fn to_do(text: &str, checked: bool) -> Self {
        Self::text_block("to_do", text, json!({ "checked": checked }))
    }

    pub fn code(text: &str, language: &str) -> Self {
        Self::text_block("code", text, json!({ "language": language }))
    }

    pub fn callout(text: &str, emoji: &str) -> Self {
        Self::text_block(
            "callout",
            text,
            json!({ "icon": { "type": "emoji", "emoji": emoji } }),
        )
    }

    pub fn bulleted_list_item(text: &str) -> Self {
        Self::text_block("bulleted_list_item", text, Value::Null)
    }

    pub fn divider() -> Self {
        Self(json!({ "object": "block", "type": "divider", "divider": {} }))
    }

    /// Nests `children` under this block.
    pub fn with_children(mut self, children: Vec<BlockRequest>) -> Self {
        let kind = self.0["type"].as_str().unwrap_or_default().to_string();
        if let Some(payload) = self.0.get_mut(&kind).and_then(Value::as_object_mut) {
            payload.insert("children".to_string(), json!(children));
        }
        self
    }

    pub fn as_json(&self) -> &Value {
        &self.0
    }
}

#[derive(Serialize)]
struct AppendChildren<'a> {
    children: &'a [BlockRequest],
}

#[derive(Debug, Clone)]
pub struct BlocksApi {
    executor: Arc<RequestExecutor>,
}

impl BlocksApi {
    pub fn new(executor: Arc<RequestExecutor>) -> Self {
        Self { executor }
    }

    pub async fn retrieve(&self, block_id: &BlockId, cancel: &CancellationToken) -> Result<Block> {
        let path = format!("/blocks/{}", block_id);
        self.executor.get(&path, cancel).await?.json()
    }

    /// Sends `update` as is, e.g. `{"paragraph": {"rich_text": [...]}}`.
    pub async fn update(
        &self,
        block_id: &BlockId,
        update: &Value,
        cancel: &CancellationToken,
    ) -> Result<Block> {
        let path = format!("/blocks/{}", block_id);
        self.executor.patch(&path, update, cancel).await?.json()
    }

    /// Archives the block and returns it.
    pub async fn delete(&self, block_id: &BlockId, cancel: &CancellationToken) -> Result<Block> {
        let path = format!("/blocks/{}", block_id);
        self.executor.delete(&path, cancel).await?.json()
    }

    pub async fn children(
        &self,
        block_id: &BlockId,
        query: &PageQuery,
        cancel: &CancellationToken,
    ) -> Result<List<Block>> {
        let path = with_query(&format!("/blocks/{}/children", block_id), query.params());
        self.executor.get(&path, cancel).await?.json()
    }

    /// Every direct child, following cursors.
    pub async fn children_all(
        &self,
        block_id: &BlockId,
        cancel: &CancellationToken,
    ) -> Result<Vec<Block>> {
        collect_all(
            move |page_size, cursor| {
                let query = PageQuery {
                    start_cursor: cursor,
                    page_size: Some(page_size),
                };
                async move { self.children(block_id, &query, cancel).await }
            },
            None,
        )
        .await
    }

    pub async fn append_children(
        &self,
        block_id: &BlockId,
        children: &[BlockRequest],
        cancel: &CancellationToken,
    ) -> Result<List<Block>> {
        let path = format!("/blocks/{}/children", block_id);
        self.executor
            .patch(&path, &AppendChildren { children }, cancel)
            .await?
            .json()
    }
}
