/* src/objects/instance.rs */

use std::collections::BTreeSet;
use std::ops::Deref;

use serde::{Deserialize, Serialize};

use super::de::{null_as_default, one_or_many};

/// Identity and specifications of the running instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceInfo {
	pub id: u64,
	pub host_uuid: String,
	pub label: String,
	pub region: String,
	/// Tags compare as a set.
	#[serde(default, deserialize_with = "null_as_default")]
	pub tags: BTreeSet<String>,
	#[serde(rename = "type")]
	pub instance_type: String,
	pub specs: InstanceSpecs,
	pub backups: InstanceBackups,
}

/// The technical specifications of an instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceSpecs {
	pub vcpus: u32,
	/// Disk size in MB.
	pub disk: u64,
	/// Memory in MB.
	pub memory: u64,
	/// Monthly transfer quota in GB.
	pub transfer: u64,
	#[serde(default, deserialize_with = "null_as_default")]
	pub gpus: u32,
}

/// Backup enrollment of an instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceBackups {
	pub enabled: bool,
	/// The service reports either a single status or a list of them.
	#[serde(default, deserialize_with = "one_or_many")]
	pub status: Vec<String>,
}

/// The set of tags applied to the instance.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Tags(pub BTreeSet<String>);

impl From<InstanceInfo> for Tags {
	fn from(instance: InstanceInfo) -> Self {
		Tags(instance.tags)
	}
}

impl<S: Into<String>> FromIterator<S> for Tags {
	fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
		Tags(iter.into_iter().map(Into::into).collect())
	}
}

impl Deref for Tags {
	type Target = BTreeSet<String>;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
