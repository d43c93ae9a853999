/* src/watch/stream.rs */

use std::pin::Pin;
use std::task::{Context, Poll};

use futures_util::Stream;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tokio_util::sync::{CancellationToken, DropGuard};

use super::{CancelHandle, ChangeEvent, WatchError};

type Item = Result<ChangeEvent, WatchError>;

/// A [`WatchSession`](super::WatchSession) as a stream of change events.
pub struct EventStream {
	inner: ReceiverStream<Item>,
	cancel: CancellationToken,
	_guard: DropGuard,
}

impl EventStream {
	pub(crate) fn new(rx: mpsc::Receiver<Item>, cancel: CancellationToken, guard: DropGuard) -> Self {
		Self {
			inner: ReceiverStream::new(rx),
			cancel,
			_guard: guard,
		}
	}

	pub fn cancel_handle(&self) -> CancelHandle {
		CancelHandle(self.cancel.clone())
	}
}

impl Stream for EventStream {
	type Item = Result<ChangeEvent, WatchError>;

	fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
		if self.cancel.is_cancelled() {
			return Poll::Ready(None);
		}
		Pin::new(&mut self.inner).poll_next(cx)
	}
}
