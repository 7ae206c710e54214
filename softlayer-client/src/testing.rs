//! Transport double for unit tests.

use std::future::Future;

use parking_lot::Mutex;
use softlayer_core::Value;

use crate::config::RESULT_LIMIT;
use crate::transport::{RpcRequest, Transport};
use crate::ClientError;

enum Reply {
    Value(Value),
    /// Serve `0..total` as integers, honoring `resultLimit`.
    Paging(usize),
    Error(ClientError),
}

/// Records every request and answers from a script.
pub(crate) struct RecordingTransport {
    requests: Mutex<Vec<RpcRequest>>,
    reply: Reply,
}

impl RecordingTransport {
    pub(crate) fn returning(value: Value) -> Self {
        Self::with(Reply::Value(value))
    }

    pub(crate) fn paging(total: usize) -> Self {
        Self::with(Reply::Paging(total))
    }

    pub(crate) fn failing(err: ClientError) -> Self {
        Self::with(Reply::Error(err))
    }

    fn with(reply: Reply) -> Self {
        Self {
            requests: Mutex::new(Vec::new()),
            reply,
        }
    }

    pub(crate) fn requests(&self) -> Vec<RpcRequest> {
        self.requests.lock().clone()
    }

    pub(crate) fn single(&self) -> RpcRequest {
        let requests = self.requests();
        assert_eq!(requests.len(), 1, "expected exactly one request");
        requests.into_iter().next().unwrap()
    }

    /// `(limit, offset)` of each request's `resultLimit` header.
    pub(crate) fn windows(&self) -> Vec<(u32, u32)> {
        self.requests()
            .iter()
            .map(|r| window(r).expect("request without resultLimit"))
            .collect()
    }

    fn answer(&self, request: &RpcRequest) -> Result<Value, ClientError> {
        match &self.reply {
            Reply::Value(value) => Ok(value.clone()),
            Reply::Error(err) => Err(err.clone()),
            Reply::Paging(total) => {
                let (limit, offset) = window(request).unwrap_or((u32::MAX, 0));
                let start = (offset as usize).min(*total);
                let end = start.saturating_add(limit as usize).min(*total);
                Ok(Value::Array((start..end).map(|i| Value::from(i as i64)).collect()))
            }
        }
    }
}

fn window(request: &RpcRequest) -> Option<(u32, u32)> {
    let header = request.headers.get(RESULT_LIMIT)?;
    let limit = header.get("limit")?.as_i64()?;
    let offset = header.get("offset")?.as_i64()?;
    Some((limit as u32, offset as u32))
}

impl Transport for RecordingTransport {
    fn send(&self, request: RpcRequest) -> impl Future<Output = Result<Value, ClientError>> + Send {
        let result = self.answer(&request);
        self.requests.lock().push(request);
        async move { result }
    }
}
