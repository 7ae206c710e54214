//! Transport layer for the SoftLayer client.
//!
//! [`Transport`] is the seam between the [`Client`](crate::Client) and the
//! network. The default implementation, [`XmlRpcTransport`], encodes each
//! [`RpcRequest`] as an XML-RPC call and posts it with [`HyperTransport`],
//! which handles HTTP communication using hyper_util's pooled client:
//!
//! - HTTP/1.1 and HTTP/2 with automatic protocol negotiation
//! - TLS with rustls for `https` endpoints, plain TCP otherwise
//! - Idle connections pooled per scheme, host and port, so TLS sessions are
//!   reused across calls
//!
//! # Feature Flags
//!
//! TLS support requires enabling the appropriate features:
//!
//! - `tls` (default) - Enables `tls-ring` + `tls-native-roots` for convenience
//! - `tls-ring` / `tls-aws-lc` - Crypto providers
//! - `tls-native-roots` / `tls-webpki-roots` - Root certificates
//!
//! # Example
//!
//! ```ignore
//! use softlayer_client::transport::{HyperTransport, XmlRpcTransport};
//! use std::time::Duration;
//!
//! let http = HyperTransport::builder()
//!     .pool_idle_timeout(Duration::from_secs(60))
//!     .build()?;
//!
//! let client = Client::builder()
//!     .credentials("user", "key")
//!     .build_with_transport(XmlRpcTransport::new(http).with_user_agent("inventory/1.0"))?;
//! ```

mod body;
mod connector;
mod hyper;
mod xmlrpc;

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use softlayer_core::Value;

use crate::ClientError;
use crate::config::HeaderSet;

pub use body::XmlBody;
pub use connector::{build_https_connector, has_tls_support};

#[cfg(any(feature = "tls-native-roots", feature = "tls-webpki-roots"))]
pub use connector::default_tls_config;

pub use hyper::{HyperTransport, HyperTransportBuilder};
pub use xmlrpc::{DEFAULT_USER_AGENT, XmlRpcTransport};

/// A single remote call, fully resolved.
#[derive(Clone, Debug, PartialEq)]
pub struct RpcRequest {
    /// Base endpoint without a trailing slash.
    pub endpoint_url: String,
    /// Full service name, e.g. `SoftLayer_Account`.
    pub service: String,
    pub method: String,
    /// Positional arguments, without the leading headers parameter.
    pub args: Vec<Value>,
    pub headers: HeaderSet,
    /// Extra HTTP headers.
    pub raw_headers: Vec<(String, String)>,
    pub timeout: Option<Duration>,
}

impl RpcRequest {
    /// `<endpoint>/<service>`.
    pub fn url(&self) -> String {
        format!("{}/{}", self.endpoint_url, self.service)
    }

    /// The XML-RPC parameters: the headers struct followed by the arguments.
    pub fn params(&self) -> Vec<Value> {
        let mut params = Vec::with_capacity(self.args.len() + 1);
        params.push(self.headers.to_param());
        params.extend(self.args.iter().cloned());
        params
    }
}

/// Sends calls and returns their decoded results.
///
/// Implementations fail with [`ClientError::Fault`] when the server reports
/// a fault, [`ClientError::Timeout`] when `request.timeout` elapses and
/// [`ClientError::Transport`] for connection failures.
pub trait Transport: Send + Sync {
    fn send(&self, request: RpcRequest) -> impl Future<Output = Result<Value, ClientError>> + Send;
}

impl<T: Transport> Transport for Arc<T> {
    fn send(&self, request: RpcRequest) -> impl Future<Output = Result<Value, ClientError>> + Send {
        (**self).send(request)
    }
}
