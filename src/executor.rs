// src/executor.rs
//! The resilient request executor.
//!
//! One call to [`RequestExecutor::send`] is one logical operation: the body
//! is encoded once, then physical attempts run strictly one after another
//! until the call succeeds, fails definitively, runs out of attempts or is
//! canceled. Transient failures (transport errors, 429, 5xx) never reach the
//! caller individually; only the final outcome does.

use crate::config::ClientConfig;
use crate::constants::ERROR_BODY_PREVIEW_LENGTH;
use crate::error::{AppError, ClientError, NotionErrorCode, Result, TransportError};
use crate::policy::{BackoffPolicy, RateLimit};
use crate::pool;
use crate::transport::{decode_content, HttpRequest, HttpResponse, HttpTransport, ReqwestTransport};
use reqwest::header::{
    HeaderMap, HeaderName, HeaderValue, ACCEPT, ACCEPT_ENCODING, AUTHORIZATION, CONTENT_LENGTH,
    CONTENT_TYPE, USER_AGENT,
};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, SystemTime};
use tokio_util::sync::CancellationToken;

const NOTION_VERSION_HEADER: &str = "notion-version";

/// A successful response: the decoded body plus informational metadata.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    /// Body bytes after content decoding. May be empty.
    pub data: Vec<u8>,
    pub status: StatusCode,
    /// Rate-limit headers of the final response, if it had any
    pub rate_limit: Option<RateLimit>,
    /// Physical sends the call took
    pub attempts: u32,
}

impl ApiResponse {
    /// Decodes the body as JSON into `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_slice(&self.data).map_err(|e| {
            ClientError::serialization(
                format!(
                    "failed to decode response as {}",
                    std::any::type_name::<T>()
                ),
                Some(self.status),
                e,
            )
        })
    }
}

/// Error body returned by the Notion API.
#[derive(Debug, Deserialize)]
struct ErrorPayload {
    #[serde(default)]
    code: Option<String>,
    message: String,
    #[serde(default)]
    request_id: Option<String>,
}

/// Executes logical calls against the API with retries, backoff and cancellation.
///
/// Holds no per-call state, so one executor can serve any number of
/// concurrent calls. Share it through an `Arc`.
pub struct RequestExecutor {
    transport: Arc<dyn HttpTransport>,
    config: ClientConfig,
    default_headers: HeaderMap,
}

impl std::fmt::Debug for RequestExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestExecutor")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl RequestExecutor {
    /// Builds an executor over the shared reqwest transport for `config.transport`.
    pub fn new(config: ClientConfig) -> Result<Self, AppError> {
        let transport = ReqwestTransport::shared(&config.transport)?;
        Self::with_transport(config, Arc::new(transport))
    }

    /// Builds an executor over any transport.
    pub fn with_transport(
        config: ClientConfig,
        transport: Arc<dyn HttpTransport>,
    ) -> Result<Self, AppError> {
        let default_headers = Self::create_headers(&config)?;
        Ok(Self {
            transport,
            config,
            default_headers,
        })
    }

    fn create_headers(config: &ClientConfig) -> Result<HeaderMap, AppError> {
        let mut headers = HeaderMap::new();

        let auth_header = format!("Bearer {}", config.api_key.as_str());
        let mut auth_value = HeaderValue::from_str(&auth_header).map_err(|e| {
            AppError::MissingConfiguration(format!("Invalid API token format: {}", e))
        })?;
        auth_value.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth_value);

        headers.insert(
            HeaderName::from_static(NOTION_VERSION_HEADER),
            HeaderValue::from_str(&config.api_version).map_err(|e| {
                AppError::MissingConfiguration(format!("Invalid API version: {}", e))
            })?,
        );

        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        if config.accept_compressed {
            headers.insert(ACCEPT_ENCODING, HeaderValue::from_static("gzip, deflate"));
        }

        if let Ok(agent) = HeaderValue::from_str(&config.transport.user_agent) {
            headers.insert(USER_AGENT, agent);
        }

        Ok(headers)
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub async fn get(&self, path: &str, cancel: &CancellationToken) -> Result<ApiResponse> {
        self.send::<()>(Method::GET, path, None, cancel).await
    }

    pub async fn post<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
        cancel: &CancellationToken,
    ) -> Result<ApiResponse> {
        self.send(Method::POST, path, Some(body), cancel).await
    }

    pub async fn patch<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
        cancel: &CancellationToken,
    ) -> Result<ApiResponse> {
        self.send(Method::PATCH, path, Some(body), cancel).await
    }

    pub async fn delete(&self, path: &str, cancel: &CancellationToken) -> Result<ApiResponse> {
        self.send::<()>(Method::DELETE, path, None, cancel).await
    }

    /// Runs one logical call to completion.
    ///
    /// Encoding failures and oversized bodies are reported before anything
    /// is sent. Once `cancel` fires, the call resolves to
    /// [`ClientError::Canceled`] whatever state it was in.
    pub async fn send<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        cancel: &CancellationToken,
    ) -> Result<ApiResponse> {
        let body = body.map(|body| self.encode(body)).transpose()?;
        let request = self.build_request(method, path, body);

        let outcome = self.execute(&request, cancel).await;

        if let Some(buffer) = request.body {
            pool::shared().release(buffer);
        }
        outcome
    }

    fn encode<B: Serialize + ?Sized>(&self, body: &B) -> Result<Vec<u8>> {
        let mut buffer = pool::shared().acquire();

        if let Err(e) = serde_json::to_writer(&mut buffer, body) {
            pool::shared().release(buffer);
            return Err(ClientError::serialization(
                "failed to encode request body",
                None,
                e,
            ));
        }

        if self.config.validate_input && buffer.len() > self.config.max_payload_size {
            let size = buffer.len();
            pool::shared().release(buffer);
            return Err(ClientError::SizeLimitExceeded {
                size,
                limit: self.config.max_payload_size,
            });
        }

        Ok(buffer)
    }

    fn build_request(&self, method: Method, path: &str, body: Option<Vec<u8>>) -> HttpRequest {
        let mut headers = self.default_headers.clone();
        if let Some(body) = &body {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
            headers.insert(CONTENT_LENGTH, HeaderValue::from(body.len()));
        }

        HttpRequest {
            method,
            url: self.config.base_url.join(path),
            headers,
            body,
        }
    }

    async fn execute(&self, request: &HttpRequest, cancel: &CancellationToken) -> Result<ApiResponse> {
        let policy: &BackoffPolicy = &self.config.backoff;
        let timeout = self.config.request_timeout;
        let mut attempts = 0u32;

        loop {
            if cancel.is_cancelled() {
                return Err(ClientError::Canceled { attempts });
            }
            attempts += 1;
            log::debug!(
                "{} {} (attempt {}/{})",
                request.method,
                request.url,
                attempts,
                policy.max_attempts()
            );

            let outcome = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(ClientError::Canceled { attempts }),
                outcome = tokio::time::timeout(timeout, self.transport.send(request)) => outcome,
            };

            let response = match outcome.unwrap_or(Err(TransportError::Timeout(timeout))) {
                Ok(response) => response,
                Err(source) => {
                    if !policy.has_attempts_remaining(attempts) {
                        return Err(ClientError::Transport { attempts, source });
                    }
                    let wait = policy.wait_time(attempts - 1, None, SystemTime::now());
                    log::warn!(
                        "{} {} failed on attempt {}: {}; retrying in {:?}",
                        request.method,
                        request.url,
                        attempts,
                        source,
                        wait
                    );
                    pause(wait, cancel, attempts).await?;
                    continue;
                }
            };

            let now = SystemTime::now();
            let status = response.status;
            let rate_limit = RateLimit::from_headers(&response.headers, now);

            if is_success(status) {
                let data = decode_content(&response.headers, response.body).map_err(|e| {
                    ClientError::serialization("failed to decode response body", Some(status), e)
                })?;
                if let Some(limit) = &rate_limit {
                    log::debug!(
                        "{} {} -> {} (rate limit remaining: {:?})",
                        request.method,
                        request.url,
                        status,
                        limit.remaining
                    );
                }
                return Ok(ApiResponse {
                    data,
                    status,
                    rate_limit,
                    attempts,
                });
            }

            if is_retryable(status) && policy.has_attempts_remaining(attempts) {
                // Only a 429 is governed by the advertised reset time.
                let limit = if status == StatusCode::TOO_MANY_REQUESTS {
                    rate_limit.as_ref()
                } else {
                    None
                };
                let wait = policy.wait_time(attempts - 1, limit, now);
                log::warn!(
                    "{} {} returned {} on attempt {}; retrying in {:?}",
                    request.method,
                    request.url,
                    status,
                    attempts,
                    wait
                );
                pause(wait, cancel, attempts).await?;
                continue;
            }

            return Err(classify_failure(response, rate_limit.as_ref(), now));
        }
    }
}

/// Sleeps for `wait` unless `cancel` fires first.
async fn pause(wait: Duration, cancel: &CancellationToken, attempts: u32) -> Result<()> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(ClientError::Canceled { attempts }),
        _ = tokio::time::sleep(wait) => Ok(()),
    }
}

fn is_success(status: StatusCode) -> bool {
    (200..400).contains(&status.as_u16())
}

fn is_retryable(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

/// Turns a definitive non-success response into an `Api` error.
fn classify_failure(
    response: HttpResponse,
    rate_limit: Option<&RateLimit>,
    now: SystemTime,
) -> ClientError {
    let status = response.status;
    let body = match decode_content(&response.headers, response.body) {
        Ok(body) => body,
        Err(e) => {
            return ClientError::serialization(
                "failed to decode error response body",
                Some(status),
                e,
            )
        }
    };

    match serde_json::from_slice::<ErrorPayload>(&body) {
        Ok(payload) => {
            let code = payload.code.as_deref().map_or_else(
                || NotionErrorCode::from_http_status(status),
                NotionErrorCode::from_api_response,
            );
            let retry_after = if status == StatusCode::TOO_MANY_REQUESTS {
                rate_limit.and_then(|limit| limit.until_reset(now))
            } else {
                None
            };
            ClientError::Api {
                code,
                message: payload.message,
                status,
                request_id: payload.request_id,
                retry_after,
            }
        }
        Err(e) => ClientError::serialization(
            format!("failed to decode error response: {}", preview(&body)),
            Some(status),
            e,
        ),
    }
}

fn preview(body: &[u8]) -> String {
    let text = String::from_utf8_lossy(body);
    let mut preview: String = text.chars().take(ERROR_BODY_PREVIEW_LENGTH).collect();
    if text.chars().count() > ERROR_BODY_PREVIEW_LENGTH {
        preview.push_str("...");
    }
    preview
}
