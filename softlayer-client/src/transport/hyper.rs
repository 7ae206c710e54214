//! Pooled HTTP client under [`XmlRpcTransport`](super::XmlRpcTransport).
//!
//! Idle connections are kept per scheme, host and port, so consecutive calls
//! to the same endpoint reuse one TLS session.

use std::fmt;
use std::time::Duration;

use bytes::Bytes;
use http::{Request, Response};
use http_body_util::BodyExt;
use hyper_rustls::HttpsConnector;
use hyper_util::client::legacy::Client;
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::rt::{TokioExecutor, TokioTimer};

use super::body::XmlBody;
use super::connector::build_https_connector;
use crate::ClientError;

const DEFAULT_POOL_IDLE_TIMEOUT: Duration = Duration::from_secs(90);
const DEFAULT_POOL_MAX_IDLE_PER_HOST: usize = 32;

/// HTTP client shared by every call of a [`Client`](crate::Client).
///
/// Cloning is cheap; clones share one connection pool.
#[derive(Clone)]
pub struct HyperTransport {
    client: Client<HttpsConnector<HttpConnector>, XmlBody>,
}

impl fmt::Debug for HyperTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HyperTransport").finish_non_exhaustive()
    }
}

impl HyperTransport {
    pub fn builder() -> HyperTransportBuilder {
        HyperTransportBuilder::new()
    }

    /// A transport with default pool settings and TLS from enabled features.
    pub fn new() -> Result<Self, ClientError> {
        Self::builder().build()
    }

    /// Send `request` and read the whole response body.
    ///
    /// Connection and protocol failures map to [`ClientError::Transport`];
    /// HTTP error statuses are returned as responses.
    pub async fn round_trip(&self, request: Request<XmlBody>) -> Result<Response<Bytes>, ClientError> {
        let response = self
            .client
            .request(request)
            .await
            .map_err(|e| ClientError::Transport(format!("request failed: {}", e)))?;

        let (parts, body) = response.into_parts();
        let body = body
            .collect()
            .await
            .map_err(|e| ClientError::Transport(format!("failed to read response body: {}", e)))?
            .to_bytes();

        Ok(Response::from_parts(parts, body))
    }
}

/// Builder for [`HyperTransport`].
///
/// # Example
///
/// ```ignore
/// use softlayer_client::transport::HyperTransport;
/// use std::time::Duration;
///
/// let http = HyperTransport::builder()
///     .connect_timeout(Duration::from_secs(5))
///     .pool_max_idle_per_host(4)
///     .build()?;
/// ```
pub struct HyperTransportBuilder {
    tls_config: Option<rustls::ClientConfig>,
    pool_idle_timeout: Option<Duration>,
    pool_max_idle_per_host: usize,
    connect_timeout: Option<Duration>,
}

impl Default for HyperTransportBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl HyperTransportBuilder {
    pub fn new() -> Self {
        Self {
            tls_config: None,
            pool_idle_timeout: Some(DEFAULT_POOL_IDLE_TIMEOUT),
            pool_max_idle_per_host: DEFAULT_POOL_MAX_IDLE_PER_HOST,
            connect_timeout: None,
        }
    }

    /// Use `config` instead of the configuration built from TLS features,
    /// e.g. to trust a private root certificate.
    pub fn tls_config(mut self, config: rustls::ClientConfig) -> Self {
        self.tls_config = Some(config);
        self
    }

    /// Close pooled connections idle for longer than `timeout`. Default: 90s.
    pub fn pool_idle_timeout(mut self, timeout: Duration) -> Self {
        self.pool_idle_timeout = Some(timeout);
        self
    }

    /// Keep idle connections until the server closes them.
    pub fn pool_idle_timeout_none(mut self) -> Self {
        self.pool_idle_timeout = None;
        self
    }

    /// Idle connections kept per host. Zero disables reuse. Default: 32.
    pub fn pool_max_idle_per_host(mut self, max: usize) -> Self {
        self.pool_max_idle_per_host = max;
        self
    }

    /// Bound TCP connection setup. Unbounded by default; the call timeout
    /// still applies.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    pub fn build(self) -> Result<HyperTransport, ClientError> {
        let mut http = HttpConnector::new();
        http.enforce_http(false);
        http.set_connect_timeout(self.connect_timeout);

        let connector = build_https_connector(http, self.tls_config)?;

        let mut builder = Client::builder(TokioExecutor::new());
        // pool_idle_timeout needs a timer
        builder
            .pool_timer(TokioTimer::new())
            .pool_idle_timeout(self.pool_idle_timeout)
            .pool_max_idle_per_host(self.pool_max_idle_per_host);

        Ok(HyperTransport {
            client: builder.build(connector),
        })
    }
}

impl fmt::Debug for HyperTransportBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HyperTransportBuilder")
            .field("tls_config", &self.tls_config.is_some())
            .field("pool_idle_timeout", &self.pool_idle_timeout)
            .field("pool_max_idle_per_host", &self.pool_max_idle_per_host)
            .field("connect_timeout", &self.connect_timeout)
            .finish()
    }
}
