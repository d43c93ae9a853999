/* src/watch/watcher.rs */

use std::sync::Arc;
use std::time::Duration;

use super::{Config, Result, WatchSession};
use crate::accessor::Accessor;
use crate::objects::ResourceKind;

/// Starts watch sessions against a shared accessor.
///
/// Every call to [`watch`](Self::watch) creates an independent session with
/// its own baseline; sessions share nothing but the accessor.
#[derive(Clone)]
pub struct Watcher {
	accessor: Arc<dyn Accessor>,
	config: Config,
}

impl Watcher {
	/// Creates a watcher with the default poll interval.
	pub fn new(accessor: impl Accessor + 'static) -> Self {
		Self::with_config(accessor, Config::default())
	}

	/// Creates a watcher whose shorthand methods use `config`.
	pub fn with_config(accessor: impl Accessor + 'static, config: Config) -> Self {
		Self {
			accessor: Arc::new(accessor),
			config,
		}
	}

	/// The config used by the `watch_*` shorthands.
	pub fn config(&self) -> &Config {
		&self.config
	}

	pub fn set_default_interval(&mut self, interval: Duration) {
		self.config.interval = interval;
	}

	/// Starts watching `kind`, polling every `interval`.
	#[must_use = "the session stops when dropped"]
	pub fn watch(&self, kind: ResourceKind, interval: Duration) -> Result<WatchSession> {
		let config = Config {
			interval,
			..self.config.clone()
		};
		self.watch_with(kind, config)
	}

	/// Starts watching `kind` with an explicit config.
	#[must_use = "the session stops when dropped"]
	pub fn watch_with(&self, kind: ResourceKind, config: Config) -> Result<WatchSession> {
		WatchSession::start(Arc::clone(&self.accessor), kind, config)
	}

	#[must_use = "the session stops when dropped"]
	pub fn watch_instance(&self) -> Result<WatchSession> {
		self.watch_with(ResourceKind::Instance, self.config.clone())
	}

	#[must_use = "the session stops when dropped"]
	pub fn watch_network(&self) -> Result<WatchSession> {
		self.watch_with(ResourceKind::Network, self.config.clone())
	}

	#[must_use = "the session stops when dropped"]
	pub fn watch_ssh_keys(&self) -> Result<WatchSession> {
		self.watch_with(ResourceKind::SshKeys, self.config.clone())
	}

	#[must_use = "the session stops when dropped"]
	pub fn watch_user_data(&self) -> Result<WatchSession> {
		self.watch_with(ResourceKind::UserData, self.config.clone())
	}

	#[must_use = "the session stops when dropped"]
	pub fn watch_tags(&self) -> Result<WatchSession> {
		self.watch_with(ResourceKind::Tags, self.config.clone())
	}
}

impl std::fmt::Debug for Watcher {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Watcher")
			.field("config", &self.config)
			.finish_non_exhaustive()
	}
}
