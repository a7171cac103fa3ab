//! HTTP transport
//!
//! [`HttpTransport`] executes one fully resolved request and hands back the
//! status, the cookies the server set, and the raw body. Host selection,
//! cookie bookkeeping and envelope decoding live in the session; keeping the
//! transport this thin lets tests swap in
//! [`MockTransport`](crate::MockTransport).

use crate::config::{Timeouts, TlsPolicy};
use crate::error::NxError;
use reqwest::header::{CONTENT_TYPE, COOKIE};
use reqwest::Client;
use tracing::debug;

pub use reqwest::{Method, Url};

/// NX-API ignores Content-Type, but it is set correctly anyway
pub const CONTENT_TYPE_JSON: &str = "application/json";

/// A request ready to go on the wire
#[derive(Debug, Clone)]
pub struct ApiRequest {
    /// HTTP verb
    pub method: Method,
    /// Fully resolved `https://<host><path>` URL
    pub url: Url,
    /// JSON body, sent with `Content-Type: application/json`
    pub body: Option<String>,
    /// Value of the `Cookie` header, if the session holds any cookie for this host
    pub cookie: Option<String>,
}

/// What came back from the switch
#[derive(Debug, Clone, Default)]
pub struct ApiResponse {
    /// HTTP status code
    pub status: u16,
    /// `(name, value)` of every `Set-Cookie` header
    pub cookies: Vec<(String, String)>,
    /// Raw response body
    pub body: Vec<u8>,
}

/// Trait for executing NX-API requests
///
/// All async methods must be `Send` to work with Tokio's work-stealing runtime.
#[async_trait::async_trait]
pub trait HttpTransport: Send + Sync {
    /// Send the request and read the full response body
    async fn execute(&self, request: ApiRequest) -> Result<ApiResponse, NxError>;
}

/// reqwest-backed transport used against real switches
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Build a transport with the given TLS policy and timeouts.
    ///
    /// Keep-alive is disabled (no idle connections are pooled) and no
    /// response compression is negotiated.
    pub fn new(tls: &TlsPolicy, timeouts: &Timeouts) -> Result<Self, NxError> {
        let mut builder = Client::builder()
            .use_native_tls()
            .connect_timeout(timeouts.connect + timeouts.tls_handshake)
            .read_timeout(timeouts.response_header)
            .timeout(timeouts.request)
            .pool_max_idle_per_host(0)
            .no_proxy();

        if tls.accept_invalid_certs {
            builder = builder
                .danger_accept_invalid_certs(true)
                .danger_accept_invalid_hostnames(true);
        }
        if let Some(min) = tls.min_version {
            builder = builder.min_tls_version(min.to_reqwest());
        }
        if let Some(max) = tls.max_version {
            builder = builder.max_tls_version(max.to_reqwest());
        }

        let client = builder
            .build()
            .map_err(|e| NxError::InvalidConfig(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client })
    }
}

#[async_trait::async_trait]
impl HttpTransport for ReqwestTransport {
    async fn execute(&self, request: ApiRequest) -> Result<ApiResponse, NxError> {
        let url = request.url.to_string();
        let mut builder = self.client.request(request.method.clone(), request.url);

        if let Some(cookie) = request.cookie {
            builder = builder.header(COOKIE, cookie);
        }
        if let Some(body) = request.body {
            builder = builder.header(CONTENT_TYPE, CONTENT_TYPE_JSON).body(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| NxError::transport(url.as_str(), e))?;

        let status = response.status().as_u16();
        let cookies = response
            .cookies()
            .map(|c| (c.name().to_string(), c.value().to_string()))
            .collect();
        debug!("{} {} -> {}", request.method, url, status);

        let body = response
            .bytes()
            .await
            .map_err(|e| NxError::transport(url.as_str(), e))?;

        Ok(ApiResponse {
            status,
            cookies,
            body: body.to_vec(),
        })
    }
}
