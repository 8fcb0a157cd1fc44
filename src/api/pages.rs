// src/api/pages.rs
use super::{with_query, BlockRequest, Page, PageQuery, Parent, PropertyItem};
use crate::error::Result;
use crate::executor::RequestExecutor;
use crate::types::PageId;
use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Body of `POST /pages`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreatePage {
    pub parent: Parent,
    pub properties: IndexMap<String, Value>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<BlockRequest>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover: Option<Value>,
}

impl CreatePage {
    /// A page under `parent` whose title property `title_property` holds `title`.
    ///
    /// Pages under another page always use the property name `title`.
    pub fn titled(parent: Parent, title_property: &str, title: &str) -> Self {
        let mut properties = IndexMap::new();
        properties.insert(
            title_property.to_string(),
            serde_json::json!({ "title": [super::RichText::plain(title)] }),
        );
        Self {
            parent,
            properties,
            children: Vec::new(),
            icon: None,
            cover: None,
        }
    }

    pub fn with_children(mut self, children: Vec<BlockRequest>) -> Self {
        self.children = children;
        self
    }
}

/// Body of `PATCH /pages/{id}`. Unset fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UpdatePage {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<IndexMap<String, Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub archived: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover: Option<Value>,
}

#[derive(Debug, Clone)]
pub struct PagesApi {
    executor: Arc<RequestExecutor>,
}

impl PagesApi {
    pub fn new(executor: Arc<RequestExecutor>) -> Self {
        Self { executor }
    }

    pub async fn retrieve(&self, page_id: &PageId, cancel: &CancellationToken) -> Result<Page> {
        let path = format!("/pages/{}", page_id);
        self.executor.get(&path, cancel).await?.json()
    }

    pub async fn create(&self, page: &CreatePage, cancel: &CancellationToken) -> Result<Page> {
        self.executor.post("/pages", page, cancel).await?.json()
    }

    pub async fn update(
        &self,
        page_id: &PageId,
        update: &UpdatePage,
        cancel: &CancellationToken,
    ) -> Result<Page> {
        let path = format!("/pages/{}", page_id);
        self.executor.patch(&path, update, cancel).await?.json()
    }

    /// Moves the page to the trash.
    pub async fn archive(&self, page_id: &PageId, cancel: &CancellationToken) -> Result<Page> {
        let update = UpdatePage {
            archived: Some(true),
            ..UpdatePage::default()
        };
        self.update(page_id, &update, cancel).await
    }

    /// Retrieves one property value. `property_id` is the ID as the API
    /// returns it, which is already safe to use in a path.
    pub async fn retrieve_property(
        &self,
        page_id: &PageId,
        property_id: &str,
        query: &PageQuery,
        cancel: &CancellationToken,
    ) -> Result<PropertyItem> {
        let path = with_query(
            &format!("/pages/{}/properties/{}", page_id, property_id),
            query.params(),
        );
        self.executor.get(&path, cancel).await?.json()
    }
}
