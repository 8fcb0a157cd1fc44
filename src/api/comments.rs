// src/api/comments.rs
use super::{with_query, Comment, List, PageQuery, Parent, RichText};
use crate::error::Result;
use crate::executor::RequestExecutor;
use crate::types::{BlockId, PageId};
use serde::Serialize;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Body of `POST /comments`: either a new discussion on a page or a reply.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreateComment {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<Parent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discussion_id: Option<String>,
    pub rich_text: Vec<RichText>,
}

impl CreateComment {
    pub fn on_page(page_id: PageId, text: &str) -> Self {
        Self {
            parent: Some(Parent::page(page_id)),
            discussion_id: None,
            rich_text: vec![RichText::plain(text)],
        }
    }

    pub fn reply(discussion_id: impl Into<String>, text: &str) -> Self {
        Self {
            parent: None,
            discussion_id: Some(discussion_id.into()),
            rich_text: vec![RichText::plain(text)],
        }
    }
}

#[derive(Debug, Clone)]
pub struct CommentsApi {
    executor: Arc<RequestExecutor>,
}

impl CommentsApi {
    pub fn new(executor: Arc<RequestExecutor>) -> Self {
        Self { executor }
    }

    /// Unresolved comments on a page or block.
    pub async fn list(
        &self,
        block_id: &BlockId,
        query: &PageQuery,
        cancel: &CancellationToken,
    ) -> Result<List<Comment>> {
        let mut params = vec![("block_id", block_id.to_string())];
        params.extend(query.params());
        let path = with_query("/comments", params);
        self.executor.get(&path, cancel).await?.json()
    }

    pub async fn create(
        &self,
        comment: &CreateComment,
        cancel: &CancellationToken,
    ) -> Result<Comment> {
        self.executor.post("/comments", comment, cancel).await?.json()
    }
}
