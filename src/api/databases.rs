// src/api/databases.rs
use super::{collect_all, Database, List, Page, Parent, RichText};
use crate::constants::NOTION_API_PAGE_SIZE;
use crate::error::Result;
use crate::executor::RequestExecutor;
use crate::types::DatabaseId;
use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Body of `POST /databases`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreateDatabase {
    pub parent: Parent,
    pub title: Vec<RichText>,
    /// Property schema, keyed by property name
    pub properties: IndexMap<String, Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_inline: Option<bool>,
}

/// Body of `PATCH /databases/{id}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UpdateDatabase {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<Vec<RichText>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<Vec<RichText>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<IndexMap<String, Value>>,
}

/// Body of `POST /databases/{id}/query`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DatabaseQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<Value>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub sorts: Vec<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_cursor: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,
}

impl DatabaseQuery {
    pub fn filter(mut self, filter: Value) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn sort(mut self, sort: Value) -> Self {
        self.sorts.push(sort);
        self
    }

    /// Capped at the API maximum of 100.
    pub fn page_size(mut self, size: u32) -> Self {
        self.page_size = Some(size.min(NOTION_API_PAGE_SIZE));
        self
    }
}

#[derive(Debug, Clone)]
pub struct DatabasesApi {
    executor: Arc<RequestExecutor>,
}

impl DatabasesApi {
    pub fn new(executor: Arc<RequestExecutor>) -> Self {
        Self { executor }
    }

    pub async fn retrieve(
        &self,
        database_id: &DatabaseId,
        cancel: &CancellationToken,
    ) -> Result<Database> {
        let path = format!("/databases/{}", database_id);
        self.executor.get(&path, cancel).await?.json()
    }

    pub async fn create(
        &self,
        database: &CreateDatabase,
        cancel: &CancellationToken,
    ) -> Result<Database> {
        self.executor.post("/databases", database, cancel).await?.json()
    }

    pub async fn update(
        &self,
        database_id: &DatabaseId,
        update: &UpdateDatabase,
        cancel: &CancellationToken,
    ) -> Result<Database> {
        let path = format!("/databases/{}", database_id);
        self.executor.patch(&path, update, cancel).await?.json()
    }

    /// One page of rows matching `query`.
    pub async fn query(
        &self,
        database_id: &DatabaseId,
        query: &DatabaseQuery,
        cancel: &CancellationToken,
    ) -> Result<List<Page>> {
        let path = format!("/databases/{}/query", database_id);
        self.executor.post(&path, query, cancel).await?.json()
    }

    /// Every row matching `query`, following cursors. Its cursor and page size are ignored.
    pub async fn query_all(
        &self,
        database_id: &DatabaseId,
        query: &DatabaseQuery,
        cancel: &CancellationToken,
    ) -> Result<Vec<Page>> {
        collect_all(
            move |page_size, cursor| {
                let page = DatabaseQuery {
                    start_cursor: cursor,
                    page_size: Some(page_size),
                    ..query.clone()
                };
                async move { self.query(database_id, &page, cancel).await }
            },
            None,
        )
        .await
    }
}
