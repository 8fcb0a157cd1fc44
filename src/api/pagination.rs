// src/api/pagination.rs
//! Cursor pagination helpers.

use super::List;
use crate::constants::NOTION_API_PAGE_SIZE;
use crate::error::Result;
use std::future::Future;

/// Cursor and page size for GET endpoints that paginate.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageQuery {
    pub start_cursor: Option<String>,
    pub page_size: Option<u32>,
}

impl PageQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start_cursor(mut self, cursor: impl Into<String>) -> Self {
        self.start_cursor = Some(cursor.into());
        self
    }

    /// Capped at the API maximum of 100.
    pub fn page_size(mut self, size: u32) -> Self {
        self.page_size = Some(size.min(NOTION_API_PAGE_SIZE));
        self
    }

    pub(crate) fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if let Some(cursor) = &self.start_cursor {
            params.push(("start_cursor", cursor.clone()));
        }
        if let Some(size) = self.page_size {
            params.push(("page_size", size.min(NOTION_API_PAGE_SIZE).to_string()));
        }
        params
    }
}

/// Fetches pages until the server reports no more, concatenating results.
///
/// `fetch_page` receives the page size and the cursor to continue from.
/// Stops early after `max_pages` pages when given.
pub async fn collect_all<T, F, Fut>(mut fetch_page: F, max_pages: Option<u32>) -> Result<Vec<T>>
where
    F: FnMut(u32, Option<String>) -> Fut,
    Fut: Future<Output = Result<List<T>>>,
{
    let mut items = Vec::new();
    let mut cursor = None;
    let mut pages_fetched = 0u32;

    loop {
        if let Some(max) = max_pages {
            if pages_fetched >= max {
                log::debug!("Reached maximum page limit: {}", max);
                break;
            }
        }

        let page = fetch_page(NOTION_API_PAGE_SIZE, cursor).await?;
        pages_fetched += 1;

        let has_more = page.has_more;
        cursor = page.next_cursor;
        items.extend(page.results);

        if !has_more || cursor.is_none() {
            break;
        }
    }

    log::debug!("Collected {} items over {} page(s)", items.len(), pages_fetched);
    Ok(items)
}
