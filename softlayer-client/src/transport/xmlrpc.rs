//! XML-RPC over HTTP.

use std::time::Duration;

use bytes::Bytes;
use http::{HeaderValue, Method, Request, StatusCode, header};
use softlayer_core::{MethodResponse, Value, decode_response, encode_call};

use super::body::XmlBody;
use super::hyper::HyperTransport;
use super::{RpcRequest, Transport};
use crate::ClientError;

/// User agent sent with every request unless overridden.
pub const DEFAULT_USER_AGENT: &str = concat!("softlayer-client-rs/", env!("CARGO_PKG_VERSION"));

const DEFAULT_CONTENT_TYPE: &str = "text/xml";

/// The default [`Transport`]: posts XML-RPC calls to `<endpoint>/<service>`.
#[derive(Clone, Debug)]
pub struct XmlRpcTransport {
    http: HyperTransport,
    user_agent: String,
}

impl XmlRpcTransport {
    pub fn new(http: HyperTransport) -> Self {
        Self {
            http,
            user_agent: DEFAULT_USER_AGENT.to_owned(),
        }
    }

    /// Replace the `User-Agent` header value.
    pub fn with_user_agent<S: Into<String>>(mut self, user_agent: S) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    fn build_request(&self, request: &RpcRequest, body: Bytes) -> Result<Request<XmlBody>, ClientError> {
        let mut builder = Request::builder().method(Method::POST).uri(request.url());

        // Raw headers replace the default User-Agent and Content-Type;
        // Content-Length always follows the body.
        let mut user_agent_set = false;
        let mut content_type_set = false;
        for (name, value) in &request.raw_headers {
            if name.eq_ignore_ascii_case(header::CONTENT_LENGTH.as_str()) {
                continue;
            }
            user_agent_set |= name.eq_ignore_ascii_case(header::USER_AGENT.as_str());
            content_type_set |= name.eq_ignore_ascii_case(header::CONTENT_TYPE.as_str());
            builder = builder.header(name.as_str(), value.as_str());
        }
        if !user_agent_set {
            builder = builder.header(header::USER_AGENT, &self.user_agent);
        }
        if !content_type_set {
            builder = builder.header(header::CONTENT_TYPE, DEFAULT_CONTENT_TYPE);
        }

        builder
            .header(header::CONTENT_LENGTH, HeaderValue::from(body.len()))
            .body(XmlBody::new(body))
            .map_err(|e| ClientError::invalid_argument(format!("failed to build request: {}", e)))
    }

    async fn send_request(&self, request: RpcRequest) -> Result<Value, ClientError> {
        let body = encode_call(&request.method, &request.params())
            .map_err(|e| ClientError::Encode(e.to_string()))?;
        let http_request = self.build_request(&request, body)?;

        let response = match request.timeout {
            Some(t) => tokio::time::timeout(t, self.http.round_trip(http_request))
                .await
                .map_err(|_| ClientError::Timeout(format!("no response within {}", format_duration(t))))??,
            None => self.http.round_trip(http_request).await?,
        };
        let status = response.status();
        let body = response.into_body();

        #[cfg(feature = "tracing")]
        tracing::debug!(status = status.as_u16(), bytes = body.len(), "received response");

        interpret_response(status, &body)
    }
}

impl Transport for XmlRpcTransport {
    fn send(&self, request: RpcRequest) -> impl Future<Output = Result<Value, ClientError>> + Send {
        self.send_request(request)
    }
}

/// Map an HTTP response to a call result.
///
/// Faults are honored whatever the status; other bodies of failed responses
/// are ignored.
fn interpret_response(status: StatusCode, body: &[u8]) -> Result<Value, ClientError> {
    if !status.is_success() {
        return match decode_response(body) {
            Ok(MethodResponse::Fault(fault)) => Err(fault.into()),
            _ => Err(ClientError::Transport(format!("HTTP {}", status))),
        };
    }

    match decode_response(body)? {
        MethodResponse::Success(value) => Ok(value),
        MethodResponse::Fault(fault) => Err(fault.into()),
    }
}

fn format_duration(d: Duration) -> String {
    format!("{:?}", d)
}
