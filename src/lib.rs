// src/lib.rs
//! notion-sdk library: a resilient client for the Notion API.
//!
//! # Public API
//!
//! The library exposes types organized by concern:
//! - **Executor**: `RequestExecutor`, `ApiResponse`. One logical call with
//!   retries, rate-limit-aware backoff, decompression and cancellation
//! - **Policy**: `BackoffPolicy`, `RateLimit`
//! - **Transport**: `HttpTransport` (injectable), `ReqwestTransport`
//! - **Error handling**: `ClientError`, `ErrorKind`, `Disposition`, `NotionErrorCode`, `AppError`
//! - **Configuration**: `ClientConfig`, `ConfigFile`
//! - **Resource services**: `PagesApi`, `DatabasesApi`, `BlocksApi`, `SearchApi`, `UsersApi`, `CommentsApi`
//! - **Domain types**: `ApiKey`, `PageId`, `BlockId`, `DatabaseId`, `UserId`, etc.

pub mod api;
pub mod config;
pub mod constants;
pub mod error;
pub mod executor;
pub mod policy;
pub mod pool;
pub mod transport;
pub mod types;

// --- Error Handling ---
pub use crate::error::{
    AppError, ClientError, Disposition, ErrorKind, NotionErrorCode, TransportError,
};
pub use crate::types::ValidationError;

// --- Configuration ---
pub use crate::config::{ClientConfig, ConfigFile};

// --- Core ---
pub use crate::executor::{ApiResponse, RequestExecutor};
pub use crate::policy::{BackoffPolicy, RateLimit};
pub use crate::transport::{HttpRequest, HttpResponse, HttpTransport, ReqwestTransport};

// --- Domain Types ---
pub use crate::types::{
    ApiKey, BaseUrl, BlockId, CommentId, DatabaseId, Id, PageId, UserId,
};

// --- Resource Services ---
pub use crate::api::{
    BlocksApi, CommentsApi, DatabasesApi, PagesApi, SearchApi, SearchBuilder, UsersApi,
};

pub use tokio_util::sync::CancellationToken;
