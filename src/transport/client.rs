// src/transport/client.rs
//! reqwest-backed transport sharing process-wide connection pools.

use super::{HttpRequest, HttpResponse, HttpTransport};
use crate::constants::{
    DEFAULT_CONNECT_TIMEOUT, DEFAULT_POOL_IDLE_TIMEOUT, DEFAULT_POOL_MAX_IDLE_PER_HOST,
    DEFAULT_REQUEST_TIMEOUT, DEFAULT_TCP_KEEPALIVE, MAX_SHARED_CLIENTS,
};
use crate::error::TransportError;
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use reqwest::{Client, ClientBuilder};
use std::collections::HashMap;
use std::time::Duration;

type Registry = RwLock<HashMap<TransportSettings, Client>>;

/// Clients built so far, one per distinct settings value, at most
/// [`MAX_SHARED_CLIENTS`] of them.
static CLIENTS: Lazy<Registry> = Lazy::new(|| RwLock::new(HashMap::new()));

/// Connection-level knobs handed to reqwest.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TransportSettings {
    /// Maximum idle connections per host
    pub max_idle_per_host: usize,
    pub pool_idle_timeout: Duration,
    pub connect_timeout: Duration,
    /// Hard ceiling applied by reqwest itself, in addition to the executor's per-attempt bound
    pub request_timeout: Duration,
    pub tcp_keepalive: Option<Duration>,
    pub user_agent: String,
}

impl Default for TransportSettings {
    fn default() -> Self {
        Self {
            max_idle_per_host: DEFAULT_POOL_MAX_IDLE_PER_HOST,
            pool_idle_timeout: DEFAULT_POOL_IDLE_TIMEOUT,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            tcp_keepalive: Some(DEFAULT_TCP_KEEPALIVE),
            user_agent: concat!("notion-sdk-rust/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Production [`HttpTransport`].
///
/// Transports created with equal settings share one reqwest `Client`, and
/// with it one connection pool.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Returns a transport over the shared client for `settings`, building it on first use.
    ///
    /// Once [`MAX_SHARED_CLIENTS`] distinct settings are registered, further
    /// ones get a private client that is dropped with the transport.
    pub fn shared(settings: &TransportSettings) -> Result<Self, reqwest::Error> {
        Self::shared_in(&CLIENTS, settings, MAX_SHARED_CLIENTS)
    }

    fn shared_in(
        registry: &Registry,
        settings: &TransportSettings,
        capacity: usize,
    ) -> Result<Self, reqwest::Error> {
        if let Some(client) = registry.read().get(settings) {
            return Ok(Self {
                client: client.clone(),
            });
        }

        let mut clients = registry.write();
        let client = match clients.get(settings) {
            Some(client) => client.clone(),
            None => {
                log::info!(
                    "Building HTTP client (idle per host: {}, idle timeout: {:?}, connect timeout: {:?})",
                    settings.max_idle_per_host,
                    settings.pool_idle_timeout,
                    settings.connect_timeout
                );
                let client = Self::build_client(settings)?;
                if clients.len() < capacity {
                    clients.insert(settings.clone(), client.clone());
                } else {
                    log::debug!(
                        "Shared client registry is full ({}); this client gets its own pool",
                        capacity
                    );
                }
                client
            }
        };
        Ok(Self { client })
    }

    /// Wraps an existing reqwest client, for callers that configure their own.
    pub fn from_client(client: Client) -> Self {
        Self { client }
    }

    fn build_client(settings: &TransportSettings) -> Result<Client, reqwest::Error> {
        let mut builder = ClientBuilder::new()
            .pool_max_idle_per_host(settings.max_idle_per_host)
            .pool_idle_timeout(settings.pool_idle_timeout)
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .user_agent(settings.user_agent.clone());

        if let Some(keepalive) = settings.tcp_keepalive {
            builder = builder.tcp_keepalive(keepalive);
        }

        builder.build()
    }
}

#[async_trait::async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        let mut builder = self
            .client
            .request(request.method.clone(), &request.url)
            .headers(request.headers.clone());

        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        let response = builder.send().await.map_err(classify)?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await.map_err(classify)?.to_vec();

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

fn classify(err: reqwest::Error) -> TransportError {
    if err.is_connect() {
        TransportError::Connect {
            message: err.to_string(),
        }
    } else {
        TransportError::Http(err)
    }
}
