/* src/client/token.rs */

use std::sync::Arc;

use arc_swap::ArcSwapOption;
use tokio::sync::{Mutex, MutexGuard};

use crate::objects::MetadataToken;

/// Holds the token currently in use.
///
/// Reads are wait-free; regeneration is serialised through `refresh` so
/// concurrent requests that find the token expired trigger one PUT.
#[derive(Default)]
pub(crate) struct TokenCache {
	current: ArcSwapOption<MetadataToken>,
	refresh: Mutex<()>,
}

impl TokenCache {
	/// The cached token if it has not expired.
	pub(crate) fn fresh(&self) -> Option<Arc<MetadataToken>> {
		self.current.load_full().filter(|t| !t.is_expired())
	}

	pub(crate) fn peek(&self) -> Option<Arc<MetadataToken>> {
		self.current.load_full()
	}

	pub(crate) fn store(&self, token: MetadataToken) {
		self.current.store(Some(Arc::new(token)));
	}

	pub(crate) async fn lock_refresh(&self) -> MutexGuard<'_, ()> {
		self.refresh.lock().await
	}
}

#[cfg(test)]
mod tests {
	use std::time::{Duration, SystemTime};

	use super::*;

	#[test]
	fn test_expired_token_is_not_fresh() {
		let cache = TokenCache::default();
		assert!(cache.fresh().is_none());

		cache.store(MetadataToken {
			token: "old".into(),
			expiry_seconds: 60,
			created: SystemTime::now() - Duration::from_secs(120),
		});
		assert!(cache.fresh().is_none());
		assert!(cache.peek().is_some());

		cache.store(MetadataToken::new("new", 60));
		assert_eq!(cache.fresh().unwrap().token, "new");
	}
}
