/* src/objects/token.rs */

use std::time::{Duration, SystemTime};

/// A token used to authenticate against the metadata service.
#[derive(Clone, PartialEq, Eq)]
pub struct MetadataToken {
	pub token: String,
	pub expiry_seconds: u64,
	/// When the token was requested.
	pub created: SystemTime,
}

impl MetadataToken {
	pub fn new(token: impl Into<String>, expiry_seconds: u64) -> Self {
		Self {
			token: token.into(),
			expiry_seconds,
			created: SystemTime::now(),
		}
	}

	/// `None` when the expiry lies beyond what `SystemTime` can represent.
	pub fn expires_at(&self) -> Option<SystemTime> {
		self.created.checked_add(Duration::from_secs(self.expiry_seconds))
	}

	pub fn is_expired(&self) -> bool {
		self.is_expired_at(SystemTime::now())
	}

	pub fn is_expired_at(&self, now: SystemTime) -> bool {
		self.expires_at().is_some_and(|at| now >= at)
	}
}

impl std::fmt::Debug for MetadataToken {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("MetadataToken")
			.field("token", &"<redacted>")
			.field("expiry_seconds", &self.expiry_seconds)
			.field("created", &self.created)
			.finish()
	}
}
