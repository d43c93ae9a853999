/* src/objects/ssh_keys.rs */

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::de::null_lists_as_empty;

/// Public SSH keys configured for the instance, keyed by user name.
///
/// Each user's keys keep the order the service reports them in, and that
/// order is significant when comparing two fetches.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SshKeys {
	#[serde(default, deserialize_with = "null_lists_as_empty")]
	pub users: BTreeMap<String, Vec<String>>,
}

impl SshKeys {
	/// Returns the keys configured for `user`.
	pub fn keys_for(&self, user: &str) -> &[String] {
		self.users.get(user).map(Vec::as_slice).unwrap_or_default()
	}
}
