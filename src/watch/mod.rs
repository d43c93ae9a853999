/* src/watch/mod.rs */

//!
//! Polling watcher that reports semantic changes to a metadata resource.
//!
//! A [`WatchSession`] fetches its resource once to seed a baseline, then
//! polls on a fixed interval and yields a [`ChangeEvent`] whenever a fetch
//! decodes to a value that differs from the last one seen. Transient fetch
//! failures are skipped; a fatal one ends the session with a
//! [`WatchError::Fatal`].

use std::sync::Arc;
use std::time::{Duration, SystemTime};

use serde::{Deserialize, Serialize};

use crate::accessor::FetchError;
use crate::diff::Delta;
use crate::objects::{Resource, ResourceKind};

mod session;
#[cfg(feature = "stream")]
mod stream;
mod watcher;
mod worker;

pub use session::{CancelHandle, WatchSession};
#[cfg(feature = "stream")]
pub use stream::EventStream;
pub use watcher::Watcher;

/// Default time between two polls of the same resource.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(60);

/// Default number of undelivered events a session buffers.
pub const DEFAULT_EVENT_CAPACITY: usize = 16;

/// Errors that end a watch session.
#[derive(Debug, thiserror::Error)]
pub enum WatchError {
	/// A fetch failed in a way that retrying cannot fix.
	#[error("watch on {kind} aborted: {source}")]
	Fatal {
		kind: ResourceKind,
		#[source]
		source: FetchError,
	},

	#[error("invalid watch configuration: {0}")]
	Config(String),
}

/// Result type alias.
pub type Result<T> = std::result::Result<T, WatchError>;

/// Pacing for one watch session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
	/// Time between two polls. Must be positive.
	pub interval: Duration,

	/// Extra delay before the baseline fetch.
	pub initial_delay: Duration,

	/// Events buffered before the poll loop waits for the consumer.
	pub capacity: usize,
}

impl Default for Config {
	fn default() -> Self {
		Self {
			interval: DEFAULT_POLL_INTERVAL,
			initial_delay: Duration::ZERO,
			capacity: DEFAULT_EVENT_CAPACITY,
		}
	}
}

impl Config {
	/// Creates a config polling every `interval`.
	pub fn every(interval: Duration) -> Self {
		Self {
			interval,
			..Self::default()
		}
	}

	pub fn with_initial_delay(mut self, delay: Duration) -> Self {
		self.initial_delay = delay;
		self
	}

	pub fn validate(&self) -> Result<()> {
		if self.interval.is_zero() {
			return Err(WatchError::Config("interval must be positive".to_string()));
		}
		if self.capacity == 0 {
			return Err(WatchError::Config("capacity must be at least 1".to_string()));
		}
		Ok(())
	}
}

/// The last value successfully observed for a watched resource.
#[derive(Debug, Clone)]
pub struct Snapshot {
	pub value: Arc<Resource>,
	/// Wall-clock time the fetch completed.
	pub fetched_at: SystemTime,
	/// 0 for the baseline, incremented on each applied change.
	pub revision: u64,
}

impl Snapshot {
	pub(crate) fn baseline(value: Resource) -> Self {
		Self {
			value: Arc::new(value),
			fetched_at: SystemTime::now(),
			revision: 0,
		}
	}

	pub(crate) fn succeed(&self, value: Resource) -> Self {
		Self {
			value: Arc::new(value),
			fetched_at: SystemTime::now(),
			revision: self.revision + 1,
		}
	}
}

/// A detected difference from the previous snapshot.
#[derive(Debug, Clone)]
pub struct ChangeEvent {
	pub kind: ResourceKind,
	pub previous: Snapshot,
	pub current: Snapshot,
	pub delta: Delta,
}

impl ChangeEvent {
	/// The newly observed value.
	pub fn value(&self) -> &Resource {
		&self.current.value
	}
}
