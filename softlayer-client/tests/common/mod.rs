//! In-process XML-RPC server for integration tests.
#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use parking_lot::Mutex;
use softlayer_client::{Client, XmlRpcTransport};
use softlayer_core::{Fault, Value, decode_call, encode_fault, encode_response};

/// A call as the server saw it.
#[derive(Clone, Debug)]
pub struct Recorded {
    pub service: String,
    pub method: String,
    /// Members of the `headers` struct of the first parameter.
    pub headers: Value,
    pub args: Vec<Value>,
    pub http_headers: HeaderMap,
}

impl Recorded {
    /// `(limit, offset)` of the `resultLimit` header.
    pub fn window(&self) -> Option<(usize, usize)> {
        let limit = self.headers.get("resultLimit")?;
        Some((
            limit.get("limit")?.as_i64()? as usize,
            limit.get("offset")?.as_i64()? as usize,
        ))
    }
}

pub enum Reply {
    Value(Value),
    Fault(Fault),
    /// A fault document with a non-2xx status.
    FaultWithStatus(StatusCode, Fault),
    /// A non-XML body.
    Status(StatusCode, &'static str),
    Delayed(Duration, Value),
}

type Responder = Box<dyn Fn(&Recorded) -> Reply + Send + Sync>;

struct Shared {
    requests: Mutex<Vec<Recorded>>,
    responder: Responder,
}

pub struct TestServer {
    addr: SocketAddr,
    shared: Arc<Shared>,
}

impl TestServer {
    pub async fn spawn<F>(responder: F) -> Self
    where
        F: Fn(&Recorded) -> Reply + Send + Sync + 'static,
    {
        let shared = Arc::new(Shared {
            requests: Mutex::new(Vec::new()),
            responder: Box::new(responder),
        });

        let app = Router::new()
            .route("/xmlrpc/v3/{service}", post(handle))
            .with_state(shared.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { addr, shared }
    }

    /// A server that answers every call with `value`.
    pub async fn returning(value: Value) -> Self {
        Self::spawn(move |_| Reply::Value(value.clone())).await
    }

    /// A server that pages through `0..total`, honoring `resultLimit`.
    pub async fn paging(total: usize) -> Self {
        Self::spawn(move |call| {
            let (limit, offset) = call.window().unwrap_or((usize::MAX, 0));
            let start = offset.min(total);
            let end = start.saturating_add(limit).min(total);
            Reply::Value(Value::Array((start..end).map(|i| Value::from(i as i64)).collect()))
        })
        .await
    }

    pub fn endpoint(&self) -> String {
        format!("http://{}/xmlrpc/v3/", self.addr)
    }

    /// A client for this server authenticated as `SLUSER`.
    pub fn client(&self) -> Client<XmlRpcTransport> {
        Client::builder()
            .endpoint_url(self.endpoint())
            .credentials("SLUSER", "0123456789abcdef")
            .build()
            .unwrap()
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.shared.requests.lock().clone()
    }

    pub fn single(&self) -> Recorded {
        let requests = self.requests();
        assert_eq!(requests.len(), 1, "expected exactly one request");
        requests.into_iter().next().unwrap()
    }
}

async fn handle(
    State(shared): State<Arc<Shared>>,
    Path(service): Path<String>,
    http_headers: HeaderMap,
    body: Bytes,
) -> Response {
    let call = match decode_call(&body) {
        Ok(call) => call,
        Err(err) => return (StatusCode::BAD_REQUEST, err.to_string()).into_response(),
    };

    let mut params = call.params.into_iter();
    let headers = params
        .next()
        .and_then(|first| first.get("headers").cloned())
        .unwrap_or(Value::Nil);

    let recorded = Recorded {
        service,
        method: call.method,
        headers,
        args: params.collect(),
        http_headers,
    };
    let reply = (shared.responder)(&recorded);
    shared.requests.lock().push(recorded);

    match reply {
        Reply::Value(value) => xml(StatusCode::OK, encode_response(&value).unwrap()),
        Reply::Fault(fault) => xml(StatusCode::OK, encode_fault(&fault).unwrap()),
        Reply::FaultWithStatus(status, fault) => xml(status, encode_fault(&fault).unwrap()),
        Reply::Status(status, body) => (status, body).into_response(),
        Reply::Delayed(delay, value) => {
            tokio::time::sleep(delay).await;
            xml(StatusCode::OK, encode_response(&value).unwrap())
        }
    }
}

fn xml(status: StatusCode, body: Bytes) -> Response {
    (status, [(header::CONTENT_TYPE, "text/xml")], body).into_response()
}
