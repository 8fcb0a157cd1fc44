// src/error.rs
//! Error vocabulary of the client.
//!
//! `ClientError` is what every call through the executor resolves to on
//! failure. Its variants are the failure categories a caller can act on;
//! `disposition()` collapses them further into "retry later", "fix your
//! input" and "fatal".

use reqwest::StatusCode;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Notion API error codes as a typed vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NotionErrorCode {
    /// Request parameters failed Notion's validation
    ValidationFailed,
    /// Request body could not be decoded as JSON
    InvalidJson,
    InvalidRequest,
    InvalidRequestUrl,
    /// The `Notion-Version` header is missing
    MissingVersion,
    /// API key is invalid or expired
    Unauthorized,
    /// API key lacks permission for this resource
    RestrictedResource,
    /// The requested object does not exist or is not shared with the integration
    ObjectNotFound,
    /// Conflict with the current state of the resource
    Conflict,
    /// API rate limit exceeded
    RateLimited,
    InternalError,
    ServiceUnavailable,
    DatabaseConnectionUnavailable,
    GatewayTimeout,
    /// The error payload carried no code; only the HTTP status is known
    HttpStatus(u16),
    /// An error code this client doesn't recognize yet
    Unknown(String),
}

impl NotionErrorCode {
    /// Parse a Notion API error code string into the typed vocabulary.
    pub fn from_api_response(code: &str) -> Self {
        match code {
            "validation_error" => Self::ValidationFailed,
            "invalid_json" => Self::InvalidJson,
            "invalid_request" => Self::InvalidRequest,
            "invalid_request_url" => Self::InvalidRequestUrl,
            "missing_version" => Self::MissingVersion,
            "unauthorized" => Self::Unauthorized,
            "restricted_resource" => Self::RestrictedResource,
            "object_not_found" => Self::ObjectNotFound,
            "conflict_error" => Self::Conflict,
            "rate_limited" => Self::RateLimited,
            "internal_server_error" => Self::InternalError,
            "service_unavailable" => Self::ServiceUnavailable,
            "database_connection_unavailable" => Self::DatabaseConnectionUnavailable,
            "gateway_timeout" => Self::GatewayTimeout,
            other => Self::Unknown(other.to_string()),
        }
    }

    /// Create from an HTTP status code when the error body names no code.
    pub fn from_http_status(status: StatusCode) -> Self {
        Self::HttpStatus(status.as_u16())
    }

    /// Whether this code describes a transient server-side condition.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::RateLimited
                | Self::InternalError
                | Self::ServiceUnavailable
                | Self::DatabaseConnectionUnavailable
                | Self::GatewayTimeout
        )
    }
}

impl fmt::Display for NotionErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ValidationFailed => write!(f, "validation_error"),
            Self::InvalidJson => write!(f, "invalid_json"),
            Self::InvalidRequest => write!(f, "invalid_request"),
            Self::InvalidRequestUrl => write!(f, "invalid_request_url"),
            Self::MissingVersion => write!(f, "missing_version"),
            Self::Unauthorized => write!(f, "unauthorized"),
            Self::RestrictedResource => write!(f, "restricted_resource"),
            Self::ObjectNotFound => write!(f, "object_not_found"),
            Self::Conflict => write!(f, "conflict_error"),
            Self::RateLimited => write!(f, "rate_limited"),
            Self::InternalError => write!(f, "internal_server_error"),
            Self::ServiceUnavailable => write!(f, "service_unavailable"),
            Self::DatabaseConnectionUnavailable => write!(f, "database_connection_unavailable"),
            Self::GatewayTimeout => write!(f, "gateway_timeout"),
            Self::HttpStatus(code) => write!(f, "http_{}", code),
            Self::Unknown(code) => write!(f, "{}", code),
        }
    }
}

/// Failure of a single physical attempt below the HTTP layer.
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("attempt timed out after {0:?}")]
    Timeout(Duration),

    #[error("connection failed: {message}")]
    Connect { message: String },

    #[error("HTTP transport error: {0}")]
    Http(#[from] reqwest::Error),
}

impl TransportError {
    pub fn is_timeout(&self) -> bool {
        match self {
            Self::Timeout(_) => true,
            Self::Http(e) => e.is_timeout(),
            Self::Connect { .. } => false,
        }
    }
}

/// The classified outcome of a failed logical call.
#[derive(Error, Debug)]
pub enum ClientError {
    /// A request body could not be encoded, or a response body could not be decoded.
    #[error("Serialization failure: {message}")]
    Serialization {
        message: String,
        /// Status of the response whose body failed to decode, if any.
        status: Option<StatusCode>,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Request body of {size} bytes exceeds the maximum of {limit} bytes")]
    SizeLimitExceeded { size: usize, limit: usize },

    #[error("Transport failure after {attempts} attempt(s): {source}")]
    Transport {
        attempts: u32,
        #[source]
        source: TransportError,
    },

    #[error("Request canceled after {attempts} attempt(s)")]
    Canceled { attempts: u32 },

    #[error("Notion API returned an error ({status}, {code}): {message}")]
    Api {
        code: NotionErrorCode,
        message: String,
        status: StatusCode,
        request_id: Option<String>,
        /// Server-advertised wait before retrying, for rate-limited calls.
        retry_after: Option<Duration>,
    },
}

/// Discriminant of [`ClientError`] for callers that only need the category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Serialization,
    SizeLimitExceeded,
    Transport,
    Canceled,
    Api,
}

/// What a caller can reasonably do about a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Disposition {
    /// The condition is transient; the same call may succeed later.
    RetryLater,
    /// The request itself is wrong and must be changed.
    FixInput,
    /// Neither waiting nor changing the request will help.
    Fatal,
}

impl ClientError {
    pub(crate) fn serialization(
        message: impl Into<String>,
        status: Option<StatusCode>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Serialization {
            message: message.into(),
            status,
            source: Some(Box::new(source)),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Serialization { .. } => ErrorKind::Serialization,
            Self::SizeLimitExceeded { .. } => ErrorKind::SizeLimitExceeded,
            Self::Transport { .. } => ErrorKind::Transport,
            Self::Canceled { .. } => ErrorKind::Canceled,
            Self::Api { .. } => ErrorKind::Api,
        }
    }

    pub fn disposition(&self) -> Disposition {
        match self {
            Self::Transport { .. } => Disposition::RetryLater,
            Self::SizeLimitExceeded { .. } => Disposition::FixInput,
            Self::Serialization { status: None, .. } => Disposition::FixInput,
            Self::Serialization { .. } | Self::Canceled { .. } => Disposition::Fatal,
            Self::Api { status, code, .. } => {
                if *status == StatusCode::TOO_MANY_REQUESTS
                    || status.is_server_error()
                    || code.is_transient()
                {
                    Disposition::RetryLater
                } else if matches!(
                    code,
                    NotionErrorCode::Unauthorized | NotionErrorCode::RestrictedResource
                ) {
                    Disposition::Fatal
                } else {
                    Disposition::FixInput
                }
            }
        }
    }

    /// The HTTP status the remote service answered with, when there was one.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::Serialization { status, .. } => *status,
            _ => None,
        }
    }

    /// A status suitable for reporting every failure in HTTP terms.
    pub fn http_equivalent_status(&self) -> StatusCode {
        match self {
            Self::Api { status, .. } => *status,
            Self::Serialization {
                status: Some(status),
                ..
            } => *status,
            Self::Serialization { status: None, .. } | Self::SizeLimitExceeded { .. } => {
                StatusCode::BAD_REQUEST
            }
            Self::Transport { .. } => StatusCode::GATEWAY_TIMEOUT,
            // 499: client closed request
            Self::Canceled { .. } => {
                StatusCode::from_u16(499).unwrap_or(StatusCode::REQUEST_TIMEOUT)
            }
        }
    }

    /// Physical sends performed before the call gave up, when known.
    pub fn attempts(&self) -> Option<u32> {
        match self {
            Self::Transport { attempts, .. } | Self::Canceled { attempts } => Some(*attempts),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        match self {
            Self::Api { status, code, .. } => {
                *status == StatusCode::NOT_FOUND || *code == NotionErrorCode::ObjectNotFound
            }
            _ => false,
        }
    }

    pub fn is_rate_limited(&self) -> bool {
        match self {
            Self::Api { status, code, .. } => {
                *status == StatusCode::TOO_MANY_REQUESTS || *code == NotionErrorCode::RateLimited
            }
            _ => false,
        }
    }

    pub fn is_validation_error(&self) -> bool {
        matches!(
            self,
            Self::Api {
                code: NotionErrorCode::ValidationFailed,
                ..
            }
        )
    }

    pub fn is_size_limit_exceeded(&self) -> bool {
        matches!(self, Self::SizeLimitExceeded { .. })
    }

    pub fn is_canceled(&self) -> bool {
        matches!(self, Self::Canceled { .. })
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Transport { source, .. } if source.is_timeout())
    }
}

/// Errors surfaced by configuration loading and the command-line front end.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Missing configuration: {0}")]
    MissingConfiguration(String),

    #[error(transparent)]
    Validation(#[from] crate::types::ValidationError),

    #[error(transparent)]
    Client(#[from] ClientError),

    #[error("Failed to build HTTP transport: {0}")]
    TransportSetup(#[from] reqwest::Error),

    #[error("Filesystem IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error for {path}: {source}")]
    JsonParseError {
        path: std::path::PathBuf,
        source: serde_json::Error,
    },
}

/// Result type alias for calls through the client
pub type Result<T, E = ClientError> = std::result::Result<T, E>;
