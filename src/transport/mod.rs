// src/transport/mod.rs
//! The physical send primitive and the wire-level shapes it exchanges.
//!
//! The executor only ever talks to an [`HttpTransport`]; the production
//! implementation is [`ReqwestTransport`], tests inject their own.

mod client;

pub use client::{ReqwestTransport, TransportSettings};

use crate::error::TransportError;
use flate2::read::{DeflateDecoder, GzDecoder, ZlibDecoder};
use reqwest::header::{HeaderMap, CONTENT_ENCODING};
use reqwest::{Method, StatusCode};
use std::io::{self, Read};

/// One fully built physical request. Immutable while attempts are running.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub headers: HeaderMap,
    pub body: Option<Vec<u8>>,
}

/// What the transport hands back: status, headers and the body as received.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn new(status: StatusCode, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: body.into(),
        }
    }
}

/// Sends one request and waits for the complete response.
///
/// Implementations must be cancel-safe: the executor drops the future when
/// the caller cancels or the attempt times out.
#[async_trait::async_trait]
pub trait HttpTransport: Send + Sync {
    async fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError>;
}

/// Undoes the `Content-Encoding` of a response body.
///
/// Encodings are removed in reverse order of application. An empty body is
/// returned untouched whatever the header says.
pub fn decode_content(headers: &HeaderMap, body: Vec<u8>) -> io::Result<Vec<u8>> {
    let Some(value) = headers.get(CONTENT_ENCODING) else {
        return Ok(body);
    };
    if body.is_empty() {
        return Ok(body);
    }

    let value = value
        .to_str()
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

    let mut decoded = body;
    for encoding in value.rsplit(',').map(str::trim).filter(|e| !e.is_empty()) {
        decoded = match encoding.to_ascii_lowercase().as_str() {
            "identity" => decoded,
            "gzip" | "x-gzip" => inflate(GzDecoder::new(decoded.as_slice()))?,
            "deflate" => inflate(ZlibDecoder::new(decoded.as_slice()))
                .or_else(|_| inflate(DeflateDecoder::new(decoded.as_slice())))?,
            other => {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!("unsupported content encoding '{}'", other),
                ))
            }
        };
    }
    Ok(decoded)
}

fn inflate(mut reader: impl Read) -> io::Result<Vec<u8>> {
    let mut out = Vec::new();
    reader.read_to_end(&mut out)?;
    Ok(out)
}
