/* src/lib.rs */

//!
//! Client for the Linode Metadata Service, reachable from inside an instance
//! at `http://169.254.169.254/v1`.
//!
//! This crate integrates four components:
//!
//! - **objects**: Decoded instance, network, SSH key, user data and tag records.
//! - **accessor**: The one-shot fetch interface and its error classification.
//! - **client**: The HTTP accessor with token management (`http` feature).
//! - **watch**: Polling sessions that yield only semantic changes.
//!
//! ## Feature Flags
//!
//! - `full`: Enables all features.
//! - `http` (default): Enables [`client::MetadataClient`].
//! - `stream`: Enables [`watch::EventStream`], a `futures` stream adapter.
//! - `logging`: Logs HTTP requests and responses through `log`.
//!
//! ## Basic Usage
//!
//! ```no_run
//! # #[cfg(feature = "http")]
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! use linode_metadata::client::{ClientConfig, MetadataClient};
//! use linode_metadata::objects::ResourceKind;
//!
//! let client = Arc::new(MetadataClient::new(ClientConfig::default())?);
//! let mut session = client
//! 	.watcher()
//! 	.watch(ResourceKind::Network, Duration::from_secs(30))?;
//!
//! while let Some(event) = session.next().await {
//! 	let event = event?;
//! 	for change in event.delta.fields() {
//! 		println!("{change}");
//! 	}
//! }
//! # Ok(())
//! # }
//! ```

pub mod accessor;
pub mod diff;
pub mod objects;
pub mod watch;

#[cfg(feature = "http")]
pub mod client;

pub use accessor::{Accessor, FetchError, MemoryAccessor, Severity};
pub use diff::{Change, Delta, Diff, FieldChange};
pub use objects::{Resource, ResourceKind};
pub use watch::{CancelHandle, ChangeEvent, Snapshot, WatchError, WatchSession, Watcher};

#[cfg(feature = "http")]
pub use client::{ClientConfig, MetadataClient};
