/* src/accessor/memory.rs */

use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use super::{Accessor, FetchError};
use crate::objects::{Resource, ResourceKind};

#[derive(Default)]
struct Slot {
	script: VecDeque<Result<Resource, FetchError>>,
	current: Option<Resource>,
	fetches: usize,
}

/// An in-memory accessor useful for testing and embedded environments.
///
/// Each kind has a queue of scripted results that fetches consume in order.
/// Once the queue is empty, fetches return the last value that was set or
/// successfully scripted. Kinds with neither fail with
/// [`FetchError::Unsupported`].
#[derive(Default)]
pub struct MemoryAccessor {
	slots: Mutex<HashMap<ResourceKind, Slot>>,
}

impl MemoryAccessor {
	/// Creates a new empty MemoryAccessor.
	pub fn new() -> Self {
		Self::default()
	}

	/// Sets the value returned once the script for its kind is exhausted.
	pub fn set(&self, value: impl Into<Resource>) {
		let value = value.into();
		let kind = value.kind();
		self.lock().entry(kind).or_default().current = Some(value);
	}

	/// Queues a successful fetch result.
	pub fn push_ok(&self, value: impl Into<Resource>) {
		let value = value.into();
		self.lock()
			.entry(value.kind())
			.or_default()
			.script
			.push_back(Ok(value));
	}

	/// Queues a failed fetch result for `kind`.
	pub fn push_err(&self, kind: ResourceKind, error: FetchError) {
		self.lock().entry(kind).or_default().script.push_back(Err(error));
	}

	/// Number of fetches performed for `kind` so far.
	pub fn fetch_count(&self, kind: ResourceKind) -> usize {
		self.lock().get(&kind).map_or(0, |slot| slot.fetches)
	}

	fn lock(&self) -> MutexGuard<'_, HashMap<ResourceKind, Slot>> {
		self.slots.lock().unwrap_or_else(PoisonError::into_inner)
	}
}

#[async_trait]
impl Accessor for MemoryAccessor {
	async fn fetch(&self, kind: ResourceKind) -> Result<Resource, FetchError> {
		let mut slots = self.lock();
		let slot = slots.entry(kind).or_default();
		slot.fetches += 1;

		match slot.script.pop_front() {
			Some(Ok(value)) => {
				slot.current = Some(value.clone());
				Ok(value)
			}
			Some(Err(e)) => Err(e),
			None => slot.current.clone().ok_or(FetchError::Unsupported(kind)),
		}
	}
}
