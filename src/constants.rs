// src/constants.rs
//! Operational boundaries of the client.
//!
//! Each constant names the limit it imposes. Reading them in order tells you
//! where requests go, how often they are retried, how long the client waits
//! between attempts and how large a payload it is willing to send.

use std::time::Duration;

// ---------------------------------------------------------------------------
// Notion API endpoint
// ---------------------------------------------------------------------------

/// Root of every REST path the client talks to.
pub const API_BASE_URL: &str = "https://api.notion.com/v1";

/// Value of the `Notion-Version` header sent with every request.
pub const NOTION_VERSION: &str = "2022-06-28";

/// Largest `page_size` the Notion API accepts on paginated endpoints.
pub const NOTION_API_PAGE_SIZE: u32 = 100;

// ---------------------------------------------------------------------------
// Retry and backoff
// ---------------------------------------------------------------------------

/// Physical sends allowed for one logical call, first attempt included.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Wait before the first retry; doubles with every further attempt.
pub const DEFAULT_RETRY_WAIT_MIN: Duration = Duration::from_secs(1);

/// Ceiling for exponential backoff.
pub const DEFAULT_RETRY_WAIT_MAX: Duration = Duration::from_secs(30);

// ---------------------------------------------------------------------------
// Payload guard
// ---------------------------------------------------------------------------

/// Largest serialized request body accepted when input validation is on.
///
/// Notion rejects payloads above 500KB; refusing them locally saves a round trip.
pub const DEFAULT_MAX_PAYLOAD_SIZE: usize = 512 * 1024;

// ---------------------------------------------------------------------------
// Transport
// ---------------------------------------------------------------------------

/// Upper bound for a single physical attempt, including reading the body.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Idle connections kept per host by the shared pool.
pub const DEFAULT_POOL_MAX_IDLE_PER_HOST: usize = 100;

/// How long an idle pooled connection survives.
pub const DEFAULT_POOL_IDLE_TIMEOUT: Duration = Duration::from_secs(90);

pub const DEFAULT_TCP_KEEPALIVE: Duration = Duration::from_secs(30);

/// Distinct transport settings that get a shared, registered client.
pub const MAX_SHARED_CLIENTS: usize = 16;

// ---------------------------------------------------------------------------
// Buffer reuse
// ---------------------------------------------------------------------------

/// Initial capacity of a pooled serialization buffer.
pub const BUFFER_INITIAL_CAPACITY: usize = 1024;

/// Buffers larger than this are dropped instead of returned to the pool.
pub const BUFFER_MAX_RETAINED_CAPACITY: usize = 64 * 1024;

/// Number of idle buffers the pool keeps around.
pub const BUFFER_POOL_MAX_IDLE: usize = 32;

// ---------------------------------------------------------------------------
// Error display
// ---------------------------------------------------------------------------

/// Maximum characters shown when previewing undecodable response bodies.
pub const ERROR_BODY_PREVIEW_LENGTH: usize = 200;
