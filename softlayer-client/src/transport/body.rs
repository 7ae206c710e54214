//! Request body for encoded XML-RPC documents.

use std::convert::Infallible;
use std::fmt;
use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::Bytes;
use http_body::{Body, Frame, SizeHint};

/// A `<methodCall>` document, sent as a single data frame.
#[derive(Clone, Default)]
pub struct XmlBody {
    document: Option<Bytes>,
}

impl XmlBody {
    pub fn new(document: Bytes) -> Self {
        Self {
            document: Some(document).filter(|d| !d.is_empty()),
        }
    }

    /// Bytes not yet handed to the connection.
    pub fn len(&self) -> usize {
        self.document.as_ref().map_or(0, Bytes::len)
    }

    pub fn is_empty(&self) -> bool {
        self.document.is_none()
    }
}

impl From<Bytes> for XmlBody {
    fn from(document: Bytes) -> Self {
        Self::new(document)
    }
}

impl Body for XmlBody {
    type Data = Bytes;
    type Error = Infallible;

    fn poll_frame(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Frame<Bytes>, Infallible>>> {
        Poll::Ready(self.get_mut().document.take().map(|d| Ok(Frame::data(d))))
    }

    fn is_end_stream(&self) -> bool {
        self.document.is_none()
    }

    fn size_hint(&self) -> SizeHint {
        SizeHint::with_exact(self.len() as u64)
    }
}

impl fmt::Debug for XmlBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("XmlBody").field("len", &self.len()).finish()
    }
}
