// src/api/mod.rs
//! Resource services over the request executor.
//!
//! Each service is a small handle around a shared `Arc<RequestExecutor>`.
//! A method builds a path and an optional body, runs exactly one logical
//! call (one per page for the `*_all` helpers) and decodes the result.

mod blocks;
mod comments;
mod databases;
mod objects;
mod pages;
mod pagination;
mod search;
mod users;

pub use blocks::{BlockRequest, BlocksApi};
pub use comments::{CommentsApi, CreateComment};
pub use databases::{CreateDatabase, DatabaseQuery, DatabasesApi, UpdateDatabase};
pub use objects::{
    Annotations, Block, Comment, Database, List, Page, Parent, PropertyItem, RichText,
    TextContent, User,
};
pub use pages::{CreatePage, PagesApi, UpdatePage};
pub use pagination::{collect_all, PageQuery};
pub use search::{
    ObjectKind, SearchApi, SearchBuilder, SearchFilter, SearchRequest, SearchResult, SearchSort,
    SortDirection,
};
pub use users::UsersApi;

use url::form_urlencoded;

/// Appends URL-encoded query parameters to a REST path.
pub(crate) fn with_query<'a>(
    path: &str,
    params: impl IntoIterator<Item = (&'a str, String)>,
) -> String {
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    let mut any = false;
    for (key, value) in params {
        serializer.append_pair(key, &value);
        any = true;
    }
    if any {
        format!("{}?{}", path, serializer.finish())
    } else {
        path.to_string()
    }
}
