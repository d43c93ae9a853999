/* src/objects/network.rs */

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::de::null_as_default;

/// Networking configuration of the running instance.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NetworkInfo {
	/// Attached interfaces, in slot order.
	#[serde(default, deserialize_with = "null_as_default")]
	pub interfaces: Vec<Interface>,
	#[serde(default, deserialize_with = "null_as_default")]
	pub ipv4: Ipv4Networking,
	#[serde(default, deserialize_with = "null_as_default")]
	pub ipv6: Ipv6Networking,
}

/// A network interface attached to the instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interface {
	#[serde(default)]
	pub label: Option<String>,
	pub purpose: String,
	#[serde(default)]
	pub ipam_address: Option<String>,
}

/// IPv4 addresses, grouped by visibility.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Ipv4Networking {
	#[serde(deserialize_with = "null_as_default")]
	pub public: BTreeSet<String>,
	#[serde(deserialize_with = "null_as_default")]
	pub private: BTreeSet<String>,
	#[serde(deserialize_with = "null_as_default")]
	pub shared: BTreeSet<String>,
}

/// IPv6 addresses and ranges.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Ipv6Networking {
	#[serde(deserialize_with = "null_as_default")]
	pub slaac: String,
	#[serde(deserialize_with = "null_as_default")]
	pub link_local: String,
	#[serde(deserialize_with = "null_as_default")]
	pub ranges: BTreeSet<String>,
	#[serde(deserialize_with = "null_as_default")]
	pub shared_ranges: BTreeSet<String>,
}
