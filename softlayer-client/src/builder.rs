//! Client builder.
//!
//! Provides a fluent API for configuring and building a [`Client`].

use std::time::Duration;

use softlayer_core::Value;

use crate::auth::Auth;
use crate::client::Client;
use crate::config::HeaderSet;
use crate::transport::{HyperTransport, Transport, XmlRpcTransport};
use crate::ClientError;

/// Public API endpoint.
pub const API_PUBLIC_ENDPOINT: &str = "https://api.softlayer.com/xmlrpc/v3/";

/// API endpoint on the SoftLayer private network.
pub const API_PRIVATE_ENDPOINT: &str = "https://api.service.softlayer.com/xmlrpc/v3/";

/// Builder for creating a [`Client`].
///
/// # Example
///
/// ```ignore
/// use softlayer_client::{ClientBuilder, API_PRIVATE_ENDPOINT};
/// use std::time::Duration;
///
/// let client = ClientBuilder::new()
///     .endpoint_url(API_PRIVATE_ENDPOINT)
///     .credentials("SLUSER", "0123456789abcdef")
///     .timeout(Duration::from_secs(30))
///     .build()?;
/// ```
pub struct ClientBuilder {
    endpoint_url: String,
    auth: Option<Auth>,
    /// Allow building without credentials.
    anonymous: bool,
    headers: HeaderSet,
    raw_headers: Vec<(String, String)>,
    /// Default timeout for calls.
    timeout: Option<Duration>,
    user_agent: Option<String>,
    http: Option<HyperTransport>,
    /// First invalid argument passed to a setter, reported by `build`.
    error: Option<ClientError>,
}

impl std::fmt::Debug for ClientBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientBuilder")
            .field("endpoint_url", &self.endpoint_url)
            .field("auth", &self.auth)
            .field("anonymous", &self.anonymous)
            .field("headers", &self.headers.names().collect::<Vec<_>>())
            .field("raw_headers", &self.raw_headers.len())
            .field("timeout", &self.timeout)
            .field("user_agent", &self.user_agent)
            .field("http", &self.http.is_some())
            .finish()
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ClientBuilder {
    /// Create a builder targeting [`API_PUBLIC_ENDPOINT`].
    pub fn new() -> Self {
        Self {
            endpoint_url: API_PUBLIC_ENDPOINT.to_owned(),
            auth: None,
            anonymous: false,
            headers: HeaderSet::new(),
            raw_headers: Vec::new(),
            timeout: None,
            user_agent: None,
            http: None,
            error: None,
        }
    }

    /// Set the base endpoint URL. A trailing slash is ignored.
    pub fn endpoint_url<S: Into<String>>(mut self, url: S) -> Self {
        self.endpoint_url = url.into();
        self
    }

    /// Authenticate with a username and API key.
    pub fn credentials<U: Into<String>, K: Into<String>>(mut self, username: U, api_key: K) -> Self {
        self.auth = Some(Auth::api_key(username, api_key));
        self
    }

    /// Authenticate with a session token.
    pub fn token<S: Into<String>>(mut self, user_id: i64, auth_token: S) -> Self {
        self.auth = Some(Auth::token(user_id, auth_token));
        self
    }

    pub fn auth(mut self, auth: Auth) -> Self {
        self.auth = Some(auth);
        self
    }

    /// Build without credentials.
    ///
    /// Only methods that need no authentication, such as
    /// [`Client::authenticate_with_password`], will succeed.
    pub fn anonymous(mut self) -> Self {
        self.anonymous = true;
        self
    }

    /// Add a protocol header sent with every call.
    ///
    /// The name is trimmed; an empty name makes [`build`](Self::build) fail
    /// with [`ClientError::InvalidArgument`].
    pub fn header<K: AsRef<str>, V: Into<Value>>(mut self, name: K, body: V) -> Self {
        let name = name.as_ref().trim();
        if name.is_empty() {
            self.error
                .get_or_insert_with(|| ClientError::invalid_argument("header name must not be empty"));
        } else {
            self.headers.insert(name, body);
        }
        self
    }

    /// Add an HTTP header sent with every call.
    pub fn raw_header<K: Into<String>, V: Into<String>>(mut self, name: K, value: V) -> Self {
        self.raw_headers.push((name.into(), value.into()));
        self
    }

    /// Set the default timeout for calls.
    ///
    /// The timeout covers connecting, sending and reading the response.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Replace the default `User-Agent`.
    pub fn user_agent<S: Into<String>>(mut self, user_agent: S) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Use a preconfigured HTTP transport.
    pub fn http_transport(mut self, http: HyperTransport) -> Self {
        self.http = Some(http);
        self
    }

    /// Build the client over the XML-RPC transport.
    pub fn build(mut self) -> Result<Client<XmlRpcTransport>, ClientError> {
        let http = match self.http.take() {
            Some(http) => http,
            None => HyperTransport::new()?,
        };
        let mut transport = XmlRpcTransport::new(http);
        if let Some(user_agent) = self.user_agent.take() {
            transport = transport.with_user_agent(user_agent);
        }
        self.build_with_transport(transport)
    }

    /// Build the client over a custom [`Transport`].
    ///
    /// `user_agent` and `http_transport` settings are ignored.
    pub fn build_with_transport<T: Transport>(self, transport: T) -> Result<Client<T>, ClientError> {
        if let Some(err) = self.error {
            return Err(err);
        }

        let endpoint_url = normalize_endpoint(&self.endpoint_url)?;

        match &self.auth {
            Some(auth) if !auth.is_complete() => {
                return Err(ClientError::configuration("credentials must not be empty"));
            }
            None if !self.anonymous => {
                return Err(ClientError::configuration(
                    "no credentials: set a username and API key or a token, or build anonymously",
                ));
            }
            _ => {}
        }

        Ok(Client::from_parts(
            transport,
            endpoint_url,
            self.auth,
            self.headers,
            self.raw_headers,
            self.timeout,
        ))
    }
}

/// Check that `url` is an absolute http(s) URL and strip trailing slashes.
fn normalize_endpoint(url: &str) -> Result<String, ClientError> {
    let url = url.trim().trim_end_matches('/');

    let uri: http::Uri = url
        .parse()
        .map_err(|e| ClientError::configuration(format!("invalid endpoint URL {url:?}: {e}")))?;

    match uri.scheme_str() {
        Some("http") | Some("https") => {}
        _ => {
            return Err(ClientError::configuration(format!(
                "endpoint URL must use http or https: {url:?}"
            )));
        }
    }
    if uri.host().is_none_or(str::is_empty) {
        return Err(ClientError::configuration(format!(
            "endpoint URL has no host: {url:?}"
        )));
    }

    Ok(url.to_owned())
}
