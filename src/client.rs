use std::sync::Arc;
use std::time::Duration;

use reqwest::Client as ReqwestClient;
use reqwest::Method;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use secrecy::ExposeSecret as _;
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::Result;
use crate::config::ClientConfig;
use crate::envelope::build_envelope;
use crate::error::{Cancelled, Error, Kind};
use crate::limiter::RateLimiter;
use crate::refill::RefillTask;
use crate::transport::{ReqwestTransport, Transport, TransportRequest};
use crate::types::{ApiReply, Document};

/// Rate-limited client for the document creation endpoint.
///
/// Share one instance between concurrent callers (e.g. behind an [`Arc`]):
/// the rate limit is scoped to the instance.
#[derive(Debug)]
pub struct CrptClient<T = ReqwestTransport> {
    endpoint: Url,
    authorization: HeaderValue,
    limiter: Arc<RateLimiter>,
    refill: RefillTask,
    transport: T,
}

impl CrptClient<ReqwestTransport> {
    /// Creates a client with a default `reqwest` transport and starts the
    /// refill task. Must be called from within a Tokio runtime.
    pub fn new(config: ClientConfig) -> Result<Self> {
        Self::with_transport(config, ReqwestTransport::default())
    }

    /// Creates a client on top of a custom `reqwest` client.
    pub fn with_http_client(config: ClientConfig, client: ReqwestClient) -> Result<Self> {
        Self::with_transport(config, ReqwestTransport::new(client))
    }
}

impl<T: Transport> CrptClient<T> {
    /// Creates a client with a custom transport and starts the refill task.
    ///
    /// Nothing is spawned unless the configuration is valid.
    pub fn with_transport(config: ClientConfig, transport: T) -> Result<Self> {
        config.validate()?;

        let endpoint = config.endpoint()?;
        let mut authorization =
            HeaderValue::from_str(&format!("Bearer {}", config.token.expose_secret()))?;
        authorization.set_sensitive(true);

        let limiter = Arc::new(RateLimiter::new(config.capacity, config.period)?);
        let refill = RefillTask::spawn(Arc::clone(&limiter))?;

        Ok(Self {
            endpoint,
            authorization,
            limiter,
            refill,
            transport,
        })
    }

    /// Submits a goods introduction document.
    ///
    /// Waits for a rate limit permit first. A non-2xx status is returned as
    /// an [`ApiReply`] carrying the status in `code`, not as an error.
    ///
    /// The permit is spent once granted, whatever happens to the request.
    /// Dropping the returned future while it waits for a permit spends
    /// nothing.
    pub async fn submit(
        &self,
        document: &Document,
        signature: &str,
        product_group: &str,
    ) -> Result<ApiReply> {
        let body = Self::request_body(document, signature, product_group)?;

        self.limiter.acquire().await?;
        self.send(body).await
    }

    /// Like [`submit`](Self::submit), but observes `cancel`.
    ///
    /// Cancellation while waiting for a permit yields [`Kind::Cancelled`] and
    /// spends nothing. Cancellation once the request is in flight yields
    /// [`Kind::Transport`]; the permit stays spent.
    pub async fn submit_with_cancellation(
        &self,
        document: &Document,
        signature: &str,
        product_group: &str,
        cancel: &CancellationToken,
    ) -> Result<ApiReply> {
        let body = Self::request_body(document, signature, product_group)?;

        self.limiter.acquire_with_cancellation(cancel).await?;

        tokio::select! {
            biased;
            () = cancel.cancelled() => Err(Error::with_source(Kind::Transport, Cancelled)),
            reply = self.send(body) => reply,
        }
    }

    /// Stops the refill task.
    ///
    /// Callers already waiting for a permit are not released and, unless
    /// permits remain, will wait forever. Submissions keep working until the
    /// remaining budget is spent.
    pub fn shutdown(&self) {
        self.refill.stop();

        #[cfg(feature = "tracing")]
        tracing::debug!(
            available = self.limiter.available_permits(),
            "client shut down, rate limit refills stopped"
        );
    }

    #[must_use]
    pub fn is_shut_down(&self) -> bool {
        self.refill.is_stopped()
    }

    /// Permits left in the current window.
    #[must_use]
    pub fn available_permits(&self) -> usize {
        self.limiter.available_permits()
    }

    #[must_use]
    pub fn capacity(&self) -> u32 {
        self.limiter.capacity()
    }

    #[must_use]
    pub fn period(&self) -> Duration {
        self.limiter.period()
    }

    #[must_use]
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    fn request_body(document: &Document, signature: &str, product_group: &str) -> Result<String> {
        let envelope = build_envelope(document, signature, product_group)?;
        Ok(serde_json::to_string(&envelope)?)
    }

    async fn send(&self, body: String) -> Result<ApiReply> {
        let mut headers = HeaderMap::with_capacity(2);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(AUTHORIZATION, self.authorization.clone());

        let request = TransportRequest {
            method: Method::POST,
            url: self.endpoint.clone(),
            headers,
            body,
        };
        let response = self.transport.execute(request).await?;

        if response.is_success() {
            return crate::decode::<ApiReply>(&response.body);
        }

        #[cfg(feature = "tracing")]
        tracing::warn!(
            status = response.status,
            path = self.endpoint.path(),
            message = %response.body,
            "document submission rejected"
        );

        Ok(ApiReply::from_status(response.status, response.body))
    }
}
