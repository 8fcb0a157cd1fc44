// src/api/search.rs
use super::{Database, List, Page};
use crate::constants::NOTION_API_PAGE_SIZE;
use crate::error::Result;
use crate::executor::RequestExecutor;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectKind {
    Page,
    Database,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    Ascending,
    Descending,
}

/// Restricts results to one object kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchFilter {
    pub value: ObjectKind,
    pub property: &'static str,
}

/// Search results can only be sorted by last edit time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchSort {
    pub direction: SortDirection,
    pub timestamp: &'static str,
}

/// Body of `POST /search`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SearchRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<SearchFilter>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<SearchSort>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_cursor: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,
}

/// Fluent construction of a [`SearchRequest`].
#[derive(Debug, Clone, Default)]
pub struct SearchBuilder {
    request: SearchRequest,
}

impl SearchBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn query(mut self, query: impl Into<String>) -> Self {
        self.request.query = Some(query.into());
        self
    }

    pub fn filter_object(mut self, kind: ObjectKind) -> Self {
        self.request.filter = Some(SearchFilter {
            value: kind,
            property: "object",
        });
        self
    }

    pub fn sort(mut self, direction: SortDirection) -> Self {
        self.request.sort = Some(SearchSort {
            direction,
            timestamp: "last_edited_time",
        });
        self
    }

    pub fn start_cursor(mut self, cursor: impl Into<String>) -> Self {
        self.request.start_cursor = Some(cursor.into());
        self
    }

    /// Capped at the API maximum of 100.
    pub fn page_size(mut self, size: u32) -> Self {
        self.request.page_size = Some(size.min(NOTION_API_PAGE_SIZE));
        self
    }

    pub fn build(self) -> SearchRequest {
        self.request
    }
}

/// A page or database hit.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "object", rename_all = "snake_case")]
pub enum SearchResult {
    Page(Page),
    Database(Database),
}

#[derive(Debug, Clone)]
pub struct SearchApi {
    executor: Arc<RequestExecutor>,
}

impl SearchApi {
    pub fn new(executor: Arc<RequestExecutor>) -> Self {
        Self { executor }
    }

    pub async fn search(
        &self,
        request: &SearchRequest,
        cancel: &CancellationToken,
    ) -> Result<List<SearchResult>> {
        self.executor.post("/search", request, cancel).await?.json()
    }
}
