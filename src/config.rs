// src/config.rs
//! Construction-time configuration of a client.
//!
//! Everything here is fixed once a `RequestExecutor` is built from it.
//! Values come from, in increasing priority: defaults, a JSON config file,
//! the environment, and explicit `with_*` calls.

use crate::constants::{DEFAULT_MAX_PAYLOAD_SIZE, DEFAULT_REQUEST_TIMEOUT, NOTION_VERSION};
use crate::error::AppError;
use crate::policy::BackoffPolicy;
use crate::transport::TransportSettings;
use crate::types::{ApiKey, BaseUrl, ValidationError};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

pub const ENV_API_KEY: &str = "NOTION_API_KEY";
pub const ENV_BASE_URL: &str = "NOTION_BASE_URL";
pub const ENV_API_VERSION: &str = "NOTION_API_VERSION";

/// Resolved client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub api_key: ApiKey,
    pub base_url: BaseUrl,
    pub api_version: String,
    pub backoff: BackoffPolicy,
    /// Reject oversized bodies before sending them
    pub validate_input: bool,
    pub max_payload_size: usize,
    /// Bound on each physical attempt
    pub request_timeout: Duration,
    /// Advertise and decode gzip/deflate responses
    pub accept_compressed: bool,
    pub transport: TransportSettings,
}

impl ClientConfig {
    /// Defaults for everything but the credential.
    pub fn new(api_key: ApiKey) -> Self {
        Self {
            api_key,
            base_url: BaseUrl::default(),
            api_version: NOTION_VERSION.to_string(),
            backoff: BackoffPolicy::default(),
            validate_input: true,
            max_payload_size: DEFAULT_MAX_PAYLOAD_SIZE,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            accept_compressed: true,
            transport: TransportSettings::default(),
        }
    }

    /// Reads `NOTION_API_KEY` (required), `NOTION_BASE_URL` and `NOTION_API_VERSION`.
    pub fn from_env() -> Result<Self, AppError> {
        Self::resolve_with(None, |name| std::env::var(name).ok())
    }

    /// Layers the environment over an optional config file.
    ///
    /// The environment's API key wins over the file's.
    pub fn resolve_with(
        file: Option<&ConfigFile>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, AppError> {
        let raw_key = env(ENV_API_KEY)
            .filter(|k| !k.trim().is_empty())
            .or_else(|| file.and_then(|f| f.api_key.clone()))
            .ok_or_else(|| {
                AppError::MissingConfiguration(format!(
                    "{} environment variable not set and no api_key in config file",
                    ENV_API_KEY
                ))
            })?;

        let mut config = Self::new(ApiKey::new(raw_key)?);
        if let Some(file) = file {
            config = file.apply(config)?;
        }
        if let Some(base_url) = env(ENV_BASE_URL) {
            config = config.with_base_url(&base_url)?;
        }
        if let Some(version) = env(ENV_API_VERSION) {
            config = config.with_api_version(version);
        }
        Ok(config)
    }

    pub fn with_base_url(mut self, base_url: &str) -> Result<Self, ValidationError> {
        self.base_url = BaseUrl::parse(base_url)?;
        Ok(self)
    }

    pub fn with_api_version(mut self, version: impl Into<String>) -> Self {
        self.api_version = version.into();
        self
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.backoff = self.backoff.with_max_attempts(max_attempts);
        self
    }

    pub fn with_retry_wait(mut self, min: Duration, max: Duration) -> Result<Self, ValidationError> {
        self.backoff = BackoffPolicy::new(self.backoff.max_attempts(), min, max)?;
        Ok(self)
    }

    pub fn with_input_validation(mut self, validate: bool) -> Self {
        self.validate_input = validate;
        self
    }

    pub fn with_max_payload_size(mut self, bytes: usize) -> Self {
        self.max_payload_size = bytes;
        self
    }

    /// Sets the per-attempt bound for both the executor and the transport.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self.transport.request_timeout = timeout;
        self
    }

    pub fn with_accept_compressed(mut self, accept: bool) -> Self {
        self.accept_compressed = accept;
        self
    }

    pub fn with_transport(mut self, transport: TransportSettings) -> Self {
        self.transport = transport;
        self
    }
}

/// On-disk JSON configuration. Durations are in milliseconds.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigFile {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub api_version: Option<String>,
    pub max_attempts: Option<u32>,
    pub retry_wait_min_ms: Option<u64>,
    pub retry_wait_max_ms: Option<u64>,
    pub validate_input: Option<bool>,
    pub max_payload_size: Option<usize>,
    pub request_timeout_ms: Option<u64>,
    pub accept_compressed: Option<bool>,
    /// Default page for commands that take one
    pub page_id: Option<String>,
    /// Default database for commands that take one
    pub database_id: Option<String>,
}

impl ConfigFile {
    pub fn load(path: &Path) -> Result<Self, AppError> {
        let text = std::fs::read_to_string(path)?;
        serde_json::from_str(&text).map_err(|source| AppError::JsonParseError {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Applies every setting present in the file on top of `config`.
    pub fn apply(&self, mut config: ClientConfig) -> Result<ClientConfig, ValidationError> {
        if let Some(base_url) = &self.base_url {
            config = config.with_base_url(base_url)?;
        }
        if let Some(version) = &self.api_version {
            config = config.with_api_version(version.clone());
        }
        if let Some(attempts) = self.max_attempts {
            config = config.with_max_attempts(attempts);
        }
        if self.retry_wait_min_ms.is_some() || self.retry_wait_max_ms.is_some() {
            let min = self
                .retry_wait_min_ms
                .map_or(config.backoff.wait_min(), Duration::from_millis);
            let max = self
                .retry_wait_max_ms
                .map_or(config.backoff.wait_max(), Duration::from_millis);
            config = config.with_retry_wait(min, max)?;
        }
        if let Some(validate) = self.validate_input {
            config = config.with_input_validation(validate);
        }
        if let Some(size) = self.max_payload_size {
            config = config.with_max_payload_size(size);
        }
        if let Some(ms) = self.request_timeout_ms {
            config = config.with_request_timeout(Duration::from_millis(ms));
        }
        if let Some(accept) = self.accept_compressed {
            config = config.with_accept_compressed(accept);
        }
        Ok(config)
    }
}
