/* src/watch/worker.rs */

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use super::{ChangeEvent, Config, Snapshot, WatchError};
use crate::accessor::{Accessor, FetchError};
use crate::diff::Diff;
use crate::objects::{Resource, ResourceKind};

pub(crate) type Item = Result<ChangeEvent, WatchError>;

enum Fetched {
	Value(Resource),
	Skipped,
	Fatal(FetchError),
	Cancelled,
}

/// The poll loop of one session. Fetch, compare and sleep never overlap.
pub(crate) struct Worker {
	pub(crate) accessor: Arc<dyn Accessor>,
	pub(crate) kind: ResourceKind,
	pub(crate) config: Config,
	pub(crate) cancel: CancellationToken,
	pub(crate) tx: mpsc::Sender<Item>,
}

impl Worker {
	pub(crate) async fn run(self) {
		tracing::debug!(kind = %self.kind, interval = ?self.config.interval, "watch started");

		if let Some(baseline) = self.establish_baseline().await {
			self.poll(baseline).await;
		}

		tracing::debug!(kind = %self.kind, "watch stopped");
	}

	/// Seeds the snapshot. Nothing is emitted for the baseline itself.
	async fn establish_baseline(&self) -> Option<Snapshot> {
		if !self.config.initial_delay.is_zero() && !self.pause(self.config.initial_delay).await {
			return None;
		}

		loop {
			match self.fetch().await {
				Fetched::Value(value) => return Some(Snapshot::baseline(value)),
				Fetched::Skipped => {}
				Fetched::Fatal(e) => {
					self.fail(e).await;
					return None;
				}
				Fetched::Cancelled => return None,
			}

			if !self.pause(self.config.interval).await {
				return None;
			}
		}
	}

	async fn poll(&self, mut snapshot: Snapshot) {
		loop {
			if !self.pause(self.config.interval).await {
				return;
			}

			let value = match self.fetch().await {
				Fetched::Value(value) => value,
				Fetched::Skipped => continue,
				Fetched::Fatal(e) => {
					self.fail(e).await;
					return;
				}
				Fetched::Cancelled => return,
			};

			if *snapshot.value == value {
				tracing::trace!(kind = %self.kind, revision = snapshot.revision, "unchanged");
				continue;
			}

			let delta = snapshot.value.diff(&value);
			let current = snapshot.succeed(value);
			let previous = std::mem::replace(&mut snapshot, current.clone());

			tracing::debug!(kind = %self.kind, revision = current.revision, "change detected");

			let event = ChangeEvent {
				kind: self.kind,
				previous,
				current,
				delta,
			};
			if !self.emit(Ok(event)).await {
				return;
			}
		}
	}

	/// Waits `duration` unless cancelled or abandoned first.
	/// Returns false when the loop must stop.
	async fn pause(&self, duration: Duration) -> bool {
		if self.cancel.is_cancelled() {
			return false;
		}

		tokio::select! {
			biased;
			_ = self.cancel.cancelled() => false,
			_ = self.tx.closed() => false,
			_ = tokio::time::sleep(duration) => !self.cancel.is_cancelled(),
		}
	}

	async fn fetch(&self) -> Fetched {
		let result = tokio::select! {
			biased;
			_ = self.cancel.cancelled() => return Fetched::Cancelled,
			result = self.accessor.fetch(self.kind) => result,
		};

		match result {
			Ok(value) if value.kind() == self.kind => Fetched::Value(value),
			Ok(value) => {
				tracing::warn!(
					kind = %self.kind,
					got = %value.kind(),
					"accessor returned a different resource kind, skipping"
				);
				Fetched::Skipped
			}
			Err(e) if e.is_transient() => {
				tracing::warn!(kind = %self.kind, error = %e, "transient fetch failure");
				Fetched::Skipped
			}
			Err(e) => Fetched::Fatal(e),
		}
	}

	async fn fail(&self, source: FetchError) {
		tracing::error!(kind = %self.kind, error = %source, "fatal fetch failure, ending watch");
		let _ = self
			.emit(Err(WatchError::Fatal {
				kind: self.kind,
				source,
			}))
			.await;
	}

	async fn emit(&self, item: Item) -> bool {
		tokio::select! {
			biased;
			_ = self.cancel.cancelled() => false,
			sent = self.tx.send(item) => sent.is_ok(),
		}
	}
}
