//! Response body wrapper that starts a flush once the body is gone.
//!
//! The server drops a response body after its last byte has been written,
//! so dropping is the earliest point at which the response is known to be out.

use std::pin::Pin;
use std::task::{Context, Poll};

use futures_util::Stream;

use crate::logs::flusher::PendingFlush;

/// Passes `inner` through unchanged and spawns `pending` on drop.
pub struct FlushOnDrop<S> {
    inner: S,
    pending: Option<PendingFlush>,
}

impl<S> FlushOnDrop<S> {
    pub fn new(inner: S, pending: PendingFlush) -> Self {
        Self {
            inner,
            pending: Some(pending),
        }
    }
}

impl<S: Stream + Unpin> Stream for FlushOnDrop<S> {
    type Item = S::Item;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.inner).poll_next(cx)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<S> Drop for FlushOnDrop<S> {
    fn drop(&mut self) {
        if let Some(pending) = self.pending.take() {
            pending.spawn();
        }
    }
}
