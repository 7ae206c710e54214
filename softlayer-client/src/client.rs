//! The SoftLayer API client.
//!
//! [`Client`] owns the endpoint, credentials, default headers and the
//! transport. Every call builds its protocol headers from the client
//! defaults and the call's [`CallOptions`], then hands an [`RpcRequest`] to
//! the transport.

use std::fmt;
use std::time::Duration;

use futures::Stream;
use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use softlayer_core::Value;

use crate::auth::Auth;
use crate::builder::ClientBuilder;
use crate::config::{AUTHENTICATE, CallOptions, HeaderSet, RESULT_LIMIT, build_headers, result_limit};
use crate::pagination::{DEFAULT_CHUNK, Pager, paginate};
use crate::service::Service;
use crate::transport::{RpcRequest, Transport, XmlRpcTransport};
use crate::ClientError;

/// Prefix shared by every SoftLayer service name.
pub const SERVICE_PREFIX: &str = "SoftLayer_";

/// Service and method used by [`Client::authenticate_with_password`].
const LOGIN_SERVICE: &str = "SoftLayer_User_Customer";
const LOGIN_METHOD: &str = "getPortalLoginToken";

/// Qualify a service name with [`SERVICE_PREFIX`] unless it already has it.
pub fn service_name(name: &str) -> String {
    if name.starts_with(SERVICE_PREFIX) {
        name.to_owned()
    } else {
        format!("{SERVICE_PREFIX}{name}")
    }
}

/// Client for the SoftLayer API.
///
/// # Example
///
/// ```ignore
/// use softlayer_client::{CallOptions, Client};
///
/// let client = Client::builder()
///     .credentials("SLUSER", "0123456789abcdef")
///     .build()?;
///
/// let account = client
///     .call("Account", "getObject", &[], CallOptions::new().mask("id,companyName"))
///     .await?;
/// ```
pub struct Client<T = XmlRpcTransport> {
    transport: T,
    /// Without trailing slash.
    endpoint_url: String,
    auth: RwLock<Option<Auth>>,
    /// Defaults other than `authenticate`.
    headers: HeaderSet,
    raw_headers: Vec<(String, String)>,
    timeout: Option<Duration>,
}

impl Client<XmlRpcTransport> {
    /// Create a new client builder.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }
}

impl<T: Transport> Client<T> {
    pub(crate) fn from_parts(
        transport: T,
        endpoint_url: String,
        auth: Option<Auth>,
        headers: HeaderSet,
        raw_headers: Vec<(String, String)>,
        timeout: Option<Duration>,
    ) -> Self {
        Self {
            transport,
            endpoint_url,
            auth: RwLock::new(auth),
            headers,
            raw_headers,
            timeout,
        }
    }

    /// A handle for calling methods of `name`.
    ///
    /// `"Account"` and `"SoftLayer_Account"` name the same service.
    pub fn service(&self, name: &str) -> Service<'_, T> {
        Service::new(self, service_name(name))
    }

    /// Call `method` on `service`.
    ///
    /// # Errors
    ///
    /// Fails before any request is sent if the mask is malformed. Otherwise
    /// fails with the transport's error: [`ClientError::Fault`] for faults,
    /// [`ClientError::Timeout`] or [`ClientError::Transport`] for network
    /// failures.
    pub async fn call(
        &self,
        service: &str,
        method: &str,
        args: &[Value],
        options: CallOptions,
    ) -> Result<Value, ClientError> {
        let service = service_name(service);

        #[cfg(feature = "tracing")]
        {
            use tracing::Instrument;

            let span = tracing::info_span!(
                "rpc.call",
                rpc.service = %service,
                rpc.method = %method,
                otel.kind = "client",
            );
            return self
                .call_service(&service, method, args, options)
                .instrument(span)
                .await;
        }

        #[cfg(not(feature = "tracing"))]
        self.call_service(&service, method, args, options).await
    }

    /// Call `method` on `service` with default options.
    pub async fn invoke(
        &self,
        service: &str,
        method: &str,
        args: &[Value],
    ) -> Result<Value, ClientError> {
        self.call(service, method, args, CallOptions::new()).await
    }

    /// Call `method` and deserialize the result into `R`.
    pub async fn call_as<R: DeserializeOwned>(
        &self,
        service: &str,
        method: &str,
        args: &[Value],
        options: CallOptions,
    ) -> Result<R, ClientError> {
        let value = self.call(service, method, args, options).await?;
        value
            .deserialize_into()
            .map_err(|e| ClientError::Decode(format!("unexpected result shape: {}", e)))
    }

    /// Stream every item of a list method, 100 per request.
    ///
    /// See [`iter_call_chunked`](Self::iter_call_chunked).
    pub fn iter_call<'a>(
        &'a self,
        service: &str,
        method: &str,
        args: &[Value],
        options: CallOptions,
    ) -> Result<impl Stream<Item = Result<Value, ClientError>> + Send + use<'a, T>, ClientError> {
        self.iter_call_chunked(service, method, args, DEFAULT_CHUNK, options)
    }

    /// Stream every item of a list method, `chunk` per request.
    ///
    /// `options.limit` caps the total number of items and `options.offset`
    /// sets the first one. Pages are requested lazily, one at a time.
    ///
    /// # Errors
    ///
    /// Fails immediately with [`ClientError::InvalidArgument`] if `chunk` is
    /// zero, or [`ClientError::MalformedMask`] if the mask is malformed.
    /// Request failures are yielded by the stream and end it.
    ///
    /// # Example
    ///
    /// ```ignore
    /// use futures::TryStreamExt;
    ///
    /// let guests: Vec<_> = client
    ///     .iter_call("Account", "getVirtualGuests", &[], CallOptions::new().mask("id,hostname"))?
    ///     .try_collect()
    ///     .await?;
    /// ```
    pub fn iter_call_chunked<'a>(
        &'a self,
        service: &str,
        method: &str,
        args: &[Value],
        chunk: u32,
        options: CallOptions,
    ) -> Result<impl Stream<Item = Result<Value, ClientError>> + Send + use<'a, T>, ClientError> {
        let pager = Pager::new(chunk, options.limit, options.offset)?;

        let service = service_name(service);
        build_headers(&service, &self.default_headers(), &options)?;

        let method = method.to_owned();
        let args = args.to_vec();
        let fetch = move |limit: u32, offset: u32| {
            let mut options = options.clone().limit(limit).offset(offset);
            // A full header override is sent verbatim, so it carries the window itself.
            if let Some(headers) = options.headers.as_mut() {
                headers.insert(RESULT_LIMIT, result_limit(limit, offset));
            }
            let service = service.clone();
            let method = method.clone();
            let args = args.clone();
            async move { self.call(&service, &method, &args, options).await }
        };

        Ok(paginate(pager, fetch))
    }

    /// Log in with a username and password and switch this client to the
    /// returned session token.
    ///
    /// Calls `SoftLayer_User_Customer::getPortalLoginToken`. A rejected
    /// password surfaces as [`ClientError::Fault`] and leaves the current
    /// credentials in place.
    pub async fn authenticate_with_password(
        &self,
        username: &str,
        password: &str,
        security_question_id: Option<i64>,
        security_answer: Option<&str>,
    ) -> Result<(), ClientError> {
        let args = [
            Value::from(username),
            Value::from(password),
            Value::from(security_question_id),
            Value::from(security_answer),
        ];
        let result = self
            .call(LOGIN_SERVICE, LOGIN_METHOD, &args, CallOptions::new())
            .await?;

        let user_id = result.get("userId").and_then(Value::as_i64);
        let hash = result.get("hash").and_then(Value::as_str);
        let (Some(user_id), Some(hash)) = (user_id, hash) else {
            return Err(ClientError::Protocol(format!(
                "{LOGIN_METHOD} returned {} without userId and hash",
                result.type_name()
            )));
        };

        #[cfg(feature = "tracing")]
        tracing::info!(user_id, "switched to token authentication");

        self.set_auth(Some(Auth::token(user_id, hash)));
        Ok(())
    }

    async fn call_service(
        &self,
        service: &str,
        method: &str,
        args: &[Value],
        options: CallOptions,
    ) -> Result<Value, ClientError> {
        let headers = build_headers(service, &self.default_headers(), &options)?;

        let mut raw_headers = self.raw_headers.clone();
        raw_headers.extend(options.raw_headers);

        let request = RpcRequest {
            endpoint_url: self.endpoint_url.clone(),
            service: service.to_owned(),
            method: method.to_owned(),
            args: args.to_vec(),
            headers,
            raw_headers,
            timeout: options.timeout.or(self.timeout),
        };

        self.transport.send(request).await
    }
}

impl<T> Client<T> {
    /// Client-wide headers, including `authenticate` when credentials are
    /// set.
    pub fn default_headers(&self) -> HeaderSet {
        let mut headers = self.headers.clone();
        if let Some(auth) = self.auth.read().as_ref() {
            headers.insert(AUTHENTICATE, auth.render());
        }
        headers
    }

    /// The current credentials.
    pub fn auth(&self) -> Option<Auth> {
        self.auth.read().clone()
    }

    /// Replace the credentials used by subsequent calls.
    pub fn set_auth(&self, auth: Option<Auth>) {
        *self.auth.write() = auth;
    }

    pub fn endpoint_url(&self) -> &str {
        &self.endpoint_url
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }
}

impl<T> fmt::Debug for Client<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("endpoint_url", &self.endpoint_url)
            .field("auth", &*self.auth.read())
            .field("headers", &self.headers.names().collect::<Vec<_>>())
            .field("raw_headers", &self.raw_headers.len())
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}
