// src/api/users.rs
use super::{with_query, List, PageQuery, User};
use crate::error::Result;
use crate::executor::RequestExecutor;
use crate::types::UserId;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone)]
pub struct UsersApi {
    executor: Arc<RequestExecutor>,
}

impl UsersApi {
    pub fn new(executor: Arc<RequestExecutor>) -> Self {
        Self { executor }
    }

    pub async fn retrieve(&self, user_id: &UserId, cancel: &CancellationToken) -> Result<User> {
        let path = format!("/users/{}", user_id);
        self.executor.get(&path, cancel).await?.json()
    }

    pub async fn list(&self, query: &PageQuery, cancel: &CancellationToken) -> Result<List<User>> {
        let path = with_query("/users", query.params());
        self.executor.get(&path, cancel).await?.json()
    }

    /// The bot user behind the integration token.
    pub async fn me(&self, cancel: &CancellationToken) -> Result<User> {
        self.executor.get("/users/me", cancel).await?.json()
    }
}
