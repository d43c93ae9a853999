/* src/accessor/mod.rs */

//!
//! The seam between the watcher and whatever talks to the metadata service.
//!
//! - [`Accessor`] - One-shot fetch of a decoded resource
//! - [`FetchError`] - Failures, classified by [`Severity`]
//! - [`MemoryAccessor`] - Scripted in-memory accessor

use std::sync::Arc;

use async_trait::async_trait;

use crate::objects::{Resource, ResourceKind};

mod error;
mod memory;

pub use error::{FetchError, Severity};
pub use memory::MemoryAccessor;

/// Performs one fetch of a metadata resource and decodes it.
///
/// Implementations must be safe to call concurrently if they are shared
/// between several watch sessions.
#[async_trait]
pub trait Accessor: Send + Sync {
	async fn fetch(&self, kind: ResourceKind) -> Result<Resource, FetchError>;
}

#[async_trait]
impl<A> Accessor for Arc<A>
where
	A: Accessor + ?Sized,
{
	async fn fetch(&self, kind: ResourceKind) -> Result<Resource, FetchError> {
		(**self).fetch(kind).await
	}
}
