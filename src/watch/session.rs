/* src/watch/session.rs */

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_util::sync::{CancellationToken, DropGuard};

use super::worker::Worker;
use super::{ChangeEvent, Config, Result, WatchError};
use crate::accessor::Accessor;
use crate::objects::ResourceKind;

#[cfg(feature = "stream")]
use super::EventStream;

/// A running watch on one resource.
///
/// Events are pulled with [`next`](Self::next). The session ends with
/// `None` after cancellation, or after a single terminal error. Dropping
/// the session cancels it.
pub struct WatchSession {
	kind: ResourceKind,
	rx: mpsc::Receiver<std::result::Result<ChangeEvent, WatchError>>,
	cancel: CancellationToken,
	_guard: DropGuard,
}

/// Stops a session from anywhere, including other tasks.
#[derive(Debug, Clone)]
pub struct CancelHandle(pub(crate) CancellationToken);

impl CancelHandle {
	pub fn cancel(&self) {
		self.0.cancel();
	}

	pub fn is_cancelled(&self) -> bool {
		self.0.is_cancelled()
	}
}

impl WatchSession {
	/// Spawns the poll loop. Must be called within a tokio runtime.
	pub(crate) fn start(accessor: Arc<dyn Accessor>, kind: ResourceKind, config: Config) -> Result<Self> {
		config.validate()?;

		let (tx, rx) = mpsc::channel(config.capacity);
		let cancel = CancellationToken::new();

		let worker = Worker {
			accessor,
			kind,
			config,
			cancel: cancel.clone(),
			tx,
		};
		tokio::spawn(worker.run());

		Ok(Self {
			kind,
			rx,
			_guard: cancel.clone().drop_guard(),
			cancel,
		})
	}

	/// Waits for the next change.
	///
	/// Returns `None` once the session is cancelled or has reported its
	/// terminal error.
	pub async fn next(&mut self) -> Option<std::result::Result<ChangeEvent, WatchError>> {
		tokio::select! {
			biased;
			_ = self.cancel.cancelled() => None,
			item = self.rx.recv() => item,
		}
	}

	/// Stops the session. No fetch starts after this returns.
	pub fn cancel(&self) {
		self.cancel.cancel();
	}

	pub fn cancel_handle(&self) -> CancelHandle {
		CancelHandle(self.cancel.clone())
	}

	pub fn is_cancelled(&self) -> bool {
		self.cancel.is_cancelled()
	}

	/// The watched resource.
	pub fn kind(&self) -> ResourceKind {
		self.kind
	}

	/// Converts the session into a [`futures_util::Stream`].
	#[cfg(feature = "stream")]
	pub fn into_stream(self) -> EventStream {
		EventStream::new(self.rx, self.cancel, self._guard)
	}
}

impl std::fmt::Debug for WatchSession {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("WatchSession")
			.field("kind", &self.kind)
			.field("cancelled", &self.cancel.is_cancelled())
			.finish_non_exhaustive()
	}
}
