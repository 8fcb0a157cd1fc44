// src/api/objects.rs
//! Object shapes returned by the Notion API.
//!
//! Header fields are typed; type-specific content (property values, block
//! payloads) stays as `serde_json::Value` so new API additions pass through.

use crate::types::{BlockId, CommentId, DatabaseId, PageId, UserId};
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One page of a paginated endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct List<T> {
    #[serde(default = "list_object")]
    pub object: String,
    pub results: Vec<T>,
    #[serde(default)]
    pub next_cursor: Option<String>,
    #[serde(default)]
    pub has_more: bool,
}

fn list_object() -> String {
    "list".to_string()
}

/// Parent reference with typed IDs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Parent {
    #[serde(rename = "page_id")]
    Page { page_id: PageId },
    #[serde(rename = "database_id")]
    Database { database_id: DatabaseId },
    #[serde(rename = "block_id")]
    Block { block_id: BlockId },
    #[serde(rename = "workspace")]
    Workspace {
        #[serde(default = "always_true")]
        workspace: bool,
    },
}

fn always_true() -> bool {
    true
}

impl Parent {
    pub fn page(page_id: PageId) -> Self {
        Self::Page { page_id }
    }

    pub fn database(database_id: DatabaseId) -> Self {
        Self::Database { database_id }
    }

    pub fn workspace() -> Self {
        Self::Workspace { workspace: true }
    }
}

/// Text styling
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Annotations {
    pub bold: bool,
    pub italic: bool,
    pub strikethrough: bool,
    pub underline: bool,
    pub code: bool,
    pub color: String,
}

impl Default for Annotations {
    fn default() -> Self {
        Self {
            bold: false,
            italic: false,
            strikethrough: false,
            underline: false,
            code: false,
            color: "default".to_string(),
        }
    }
}

impl Annotations {
    fn is_default(&self) -> bool {
        *self == Self::default()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextContent {
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<Value>,
}

/// A rich text span. Mentions and equations keep their payload in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RichText {
    #[serde(rename = "type", default = "text_kind")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<TextContent>,
    #[serde(default, skip_serializing_if = "Annotations::is_default")]
    pub annotations: Annotations,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub plain_text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn text_kind() -> String {
    "text".to_string()
}

impl RichText {
    /// An unstyled text span, the shape request bodies usually need.
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            kind: text_kind(),
            text: Some(TextContent {
                content: text.into(),
                link: None,
            }),
            annotations: Annotations::default(),
            plain_text: String::new(),
            href: None,
            extra: Map::new(),
        }
    }

    /// The readable text, whether the span came from the API or was built locally.
    pub fn as_plain_text(&self) -> &str {
        if !self.plain_text.is_empty() {
            return &self.plain_text;
        }
        self.text.as_ref().map_or("", |t| t.content.as_str())
    }
}

pub(crate) fn join_plain_text(spans: &[RichText]) -> String {
    spans.iter().map(RichText::as_plain_text).collect()
}

/// A person or bot. Partial user objects only carry `id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub person: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bot: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    pub id: PageId,
    pub created_time: DateTime<Utc>,
    pub last_edited_time: DateTime<Utc>,
    #[serde(default)]
    pub created_by: Option<User>,
    #[serde(default)]
    pub last_edited_by: Option<User>,
    pub parent: Parent,
    #[serde(default)]
    pub archived: bool,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub icon: Option<Value>,
    #[serde(default)]
    pub cover: Option<Value>,
    #[serde(default)]
    pub properties: IndexMap<String, Value>,
}

impl Page {
    /// Plain text of the page's title property, empty if it has none.
    pub fn title(&self) -> String {
        self.properties
            .values()
            .find(|value| value.get("type").and_then(Value::as_str) == Some("title"))
            .and_then(|value| value.get("title"))
            .and_then(|spans| serde_json::from_value::<Vec<RichText>>(spans.clone()).ok())
            .map(|spans| join_plain_text(&spans))
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Database {
    pub id: DatabaseId,
    pub created_time: DateTime<Utc>,
    pub last_edited_time: DateTime<Utc>,
    #[serde(default)]
    pub title: Vec<RichText>,
    #[serde(default)]
    pub description: Vec<RichText>,
    pub parent: Parent,
    #[serde(default)]
    pub archived: bool,
    #[serde(default)]
    pub is_inline: bool,
    #[serde(default)]
    pub url: Option<String>,
    /// Property schema, keyed by property name
    #[serde(default)]
    pub properties: IndexMap<String, Value>,
}

impl Database {
    pub fn title_text(&self) -> String {
        join_plain_text(&self.title)
    }
}

/// A block. The payload under the key named by `kind` is kept in `content`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub id: BlockId,
    #[serde(default)]
    pub parent: Option<Parent>,
    pub created_time: DateTime<Utc>,
    pub last_edited_time: DateTime<Utc>,
    #[serde(default)]
    pub has_children: bool,
    #[serde(default)]
    pub archived: bool,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(flatten)]
    pub content: Map<String, Value>,
}

impl Block {
    /// The type-specific payload, e.g. the `paragraph` object of a paragraph block.
    pub fn payload(&self) -> Option<&Value> {
        self.content.get(&self.kind)
    }

    /// Plain text of the payload's `rich_text`, if the block type has one.
    pub fn plain_text(&self) -> Option<String> {
        let spans = self.payload()?.get("rich_text")?.clone();
        serde_json::from_value::<Vec<RichText>>(spans)
            .ok()
            .map(|spans| join_plain_text(&spans))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: CommentId,
    pub parent: Parent,
    pub discussion_id: String,
    pub created_time: DateTime<Utc>,
    pub last_edited_time: DateTime<Utc>,
    pub created_by: User,
    #[serde(default)]
    pub rich_text: Vec<RichText>,
}

/// Result of retrieving a page property: a single item or, for list-valued
/// properties (title, rich_text, relation, people, rollup), a paginated list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyItem {
    List(List<Value>),
    Item(Value),
}
