use async_trait::async_trait;
use reqwest::Client as ReqwestClient;
use reqwest::Method;
use reqwest::header::HeaderMap;
use url::Url;

use crate::Result;

/// A fully prepared HTTP request.
#[derive(Clone, Debug)]
pub struct TransportRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: String,
}

/// Status and raw body of an HTTP exchange that reached the server.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

impl TransportResponse {
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// HTTP capability used by [`CrptClient`](crate::CrptClient).
///
/// Implementations must be safe for concurrent use. Any response that was
/// received, whatever its status, is `Ok`; connection and I/O failures are
/// errors of kind [`Transport`](crate::error::Kind::Transport).
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: TransportRequest) -> Result<TransportResponse>;
}

/// [`Transport`] backed by a pooled `reqwest` client.
#[derive(Clone, Debug, Default)]
pub struct ReqwestTransport {
    client: ReqwestClient,
}

impl ReqwestTransport {
    #[must_use]
    pub fn new(client: ReqwestClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn execute(&self, request: TransportRequest) -> Result<TransportResponse> {
        let response = self
            .client
            .request(request.method, request.url)
            .headers(request.headers)
            .body(request.body)
            .send()
            .await?;

        let status = response.status().as_u16();
        let body = response.text().await?;

        Ok(TransportResponse { status, body })
    }
}
