// ── Change subscriptions ──
//
// Payload-free listeners: a wakeup means "a cycle completed, read the
// snapshot again". Missed wakeups coalesce.

use std::pin::Pin;
use std::task::{Context, Poll};

use futures_core::Stream;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;

/// A subscription to the controller's change signal.
#[derive(Debug)]
pub struct UpdateListener {
    receiver: watch::Receiver<u64>,
}

impl UpdateListener {
    pub(crate) fn new(mut receiver: watch::Receiver<u64>) -> Self {
        receiver.mark_unchanged();
        Self { receiver }
    }

    /// Wait for the next notification. Returns `false` once the listener
    /// has been detached by a reset or the controller is gone.
    pub async fn changed(&mut self) -> bool {
        self.receiver.changed().await.is_ok()
    }

    /// Whether a notification arrived since the last `changed()`.
    pub fn has_changed(&self) -> bool {
        self.receiver.has_changed().unwrap_or(false)
    }

    /// Convert into a `Stream` of notification counters.
    pub fn into_stream(self) -> UpdateStream {
        UpdateStream {
            inner: WatchStream::from_changes(self.receiver),
        }
    }
}

/// `Stream` adapter backed by a `watch::Receiver`. Ends on reset.
pub struct UpdateStream {
    inner: WatchStream<u64>,
}

impl Stream for UpdateStream {
    type Item = u64;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.inner).poll_next(cx)
    }
}
