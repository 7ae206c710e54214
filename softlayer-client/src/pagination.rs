//! Paged iteration over list results.
//!
//! [`Pager`] decides which `(limit, offset)` window to request next;
//! [`paginate`] drives it with a fetch function and flattens the pages into
//! a stream. Pages are fetched one at a time and only when the previous
//! page has been consumed.
//!
//! Iteration ends when:
//! - the caller's limit has been reached,
//! - a page holds fewer or more items than requested, or
//! - the result is not an array, in which case it is yielded once.
//!
//! A page that exactly fills the window is followed by one more request, so
//! 200 items in pages of 100 take three calls. A page larger than the window
//! means the server ignored `resultLimit`; it is taken as the whole result
//! and yielded up to the caller's limit.

use std::collections::VecDeque;
use std::future::Future;

use futures::Stream;
use softlayer_core::Value;

use crate::ClientError;

/// Page size used by [`Client::iter_call`](crate::Client::iter_call).
pub const DEFAULT_CHUNK: u32 = 100;

/// Window arithmetic for one paged iteration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Pager {
    chunk: u32,
    /// Items still wanted, or `None` for everything.
    remaining: Option<u32>,
    offset: u32,
    done: bool,
}

impl Pager {
    /// Fails with [`ClientError::InvalidArgument`] if `chunk` is zero.
    ///
    /// A `limit` of zero means no limit.
    pub fn new(chunk: u32, limit: Option<u32>, offset: u32) -> Result<Self, ClientError> {
        if chunk == 0 {
            return Err(ClientError::invalid_argument("chunk size must be greater than zero"));
        }
        Ok(Self {
            chunk,
            remaining: limit.filter(|l| *l > 0),
            offset,
            done: false,
        })
    }

    /// The `(limit, offset)` of the next page, or `None` when finished.
    pub fn next_window(&self) -> Option<(u32, u32)> {
        if self.done {
            return None;
        }
        let size = match self.remaining {
            Some(remaining) => self.chunk.min(remaining),
            None => self.chunk,
        };
        (size > 0).then_some((size, self.offset))
    }

    /// Account for a page of `received` items fetched with window size
    /// `requested`. Returns how many of them to yield.
    pub fn record(&mut self, requested: u32, received: usize) -> usize {
        let mut kept = received;
        self.offset = self.offset.saturating_add(requested);

        if received != requested as usize {
            self.done = true;
        }
        if let Some(remaining) = self.remaining.as_mut() {
            kept = kept.min(*remaining as usize);
            *remaining -= kept as u32;
            if *remaining == 0 {
                self.done = true;
            }
        }
        kept
    }

    pub fn finish(&mut self) {
        self.done = true;
    }

    pub fn is_done(&self) -> bool {
        self.done
    }
}

struct State<F> {
    pager: Pager,
    fetch: F,
    buffer: VecDeque<Value>,
}

/// Stream the items of every page fetched through `fetch(limit, offset)`.
///
/// The first error ends the stream.
pub fn paginate<'a, F, Fut>(
    pager: Pager,
    fetch: F,
) -> impl Stream<Item = Result<Value, ClientError>> + Send + 'a
where
    F: FnMut(u32, u32) -> Fut + Send + 'a,
    Fut: Future<Output = Result<Value, ClientError>> + Send + 'a,
{
    let state = State {
        pager,
        fetch,
        buffer: VecDeque::new(),
    };

    futures::stream::try_unfold(state, next_item)
}

async fn next_item<F, Fut>(mut state: State<F>) -> Result<Option<(Value, State<F>)>, ClientError>
where
    F: FnMut(u32, u32) -> Fut,
    Fut: Future<Output = Result<Value, ClientError>>,
{
    loop {
        if let Some(item) = state.buffer.pop_front() {
            return Ok(Some((item, state)));
        }

        let Some((limit, offset)) = state.pager.next_window() else {
            return Ok(None);
        };

        #[cfg(feature = "tracing")]
        tracing::debug!(limit, offset, "fetching page");

        match (state.fetch)(limit, offset).await? {
            Value::Array(items) => {
                let kept = state.pager.record(limit, items.len());
                state.buffer.extend(items.into_iter().take(kept));
            }
            other => {
                state.pager.finish();
                return Ok(Some((other, state)));
            }
        }
    }
}
