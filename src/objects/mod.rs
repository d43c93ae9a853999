/* src/objects/mod.rs */

//!
//! Decoded records returned by the metadata service.
//!
//! Collections whose order carries no meaning (address lists, tags) are
//! decoded into ordered sets, so two fetches that differ only in wire order
//! compare equal. Collections where position matters (interfaces, SSH keys)
//! stay as plain vectors and compare positionally.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::accessor::FetchError;

mod de;
mod instance;
mod network;
mod ssh_keys;
mod token;
mod user_data;

pub use instance::{InstanceBackups, InstanceInfo, InstanceSpecs, Tags};
pub use network::{Interface, Ipv4Networking, Ipv6Networking, NetworkInfo};
pub use ssh_keys::SshKeys;
pub use token::MetadataToken;
pub use user_data::UserData;

/// The metadata resources that can be fetched and watched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResourceKind {
	/// Instance identity and specifications.
	Instance,
	/// Interfaces and IPv4/IPv6 addresses.
	Network,
	/// Public SSH keys per user.
	SshKeys,
	/// Free-form user data supplied at deploy time.
	UserData,
	/// The instance's tags, projected from the instance record.
	Tags,
}

impl ResourceKind {
	/// Every kind, in declaration order.
	pub const ALL: [ResourceKind; 5] = [
		ResourceKind::Instance,
		ResourceKind::Network,
		ResourceKind::SshKeys,
		ResourceKind::UserData,
		ResourceKind::Tags,
	];

	/// Endpoint path relative to the service base URL.
	pub fn path(self) -> &'static str {
		match self {
			ResourceKind::Instance | ResourceKind::Tags => "/instance",
			ResourceKind::Network => "/network",
			ResourceKind::SshKeys => "/ssh-keys",
			ResourceKind::UserData => "/user-data",
		}
	}

	/// Content type the endpoint answers with.
	pub fn content_type(self) -> &'static str {
		match self {
			ResourceKind::UserData => "text/plain",
			_ => "application/json",
		}
	}

	pub fn as_str(self) -> &'static str {
		match self {
			ResourceKind::Instance => "instance",
			ResourceKind::Network => "network",
			ResourceKind::SshKeys => "ssh-keys",
			ResourceKind::UserData => "user-data",
			ResourceKind::Tags => "tags",
		}
	}
}

impl fmt::Display for ResourceKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// A decoded value of one resource kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "kebab-case")]
pub enum Resource {
	Instance(InstanceInfo),
	Network(NetworkInfo),
	SshKeys(SshKeys),
	UserData(UserData),
	Tags(Tags),
}

impl Resource {
	/// Decodes a raw response body into the record for `kind`.
	pub fn decode(kind: ResourceKind, body: &[u8]) -> Result<Self, FetchError> {
		let decoded = match kind {
			ResourceKind::Instance => Resource::Instance(from_json(kind, body)?),
			ResourceKind::Network => Resource::Network(from_json(kind, body)?),
			ResourceKind::SshKeys => Resource::SshKeys(from_json(kind, body)?),
			ResourceKind::UserData => Resource::UserData(UserData::from_base64(body)?),
			ResourceKind::Tags => {
				let instance: InstanceInfo = from_json(kind, body)?;
				Resource::Tags(Tags::from(instance))
			}
		};
		Ok(decoded)
	}

	pub fn kind(&self) -> ResourceKind {
		match self {
			Resource::Instance(_) => ResourceKind::Instance,
			Resource::Network(_) => ResourceKind::Network,
			Resource::SshKeys(_) => ResourceKind::SshKeys,
			Resource::UserData(_) => ResourceKind::UserData,
			Resource::Tags(_) => ResourceKind::Tags,
		}
	}

	pub fn as_instance(&self) -> Option<&InstanceInfo> {
		match self {
			Resource::Instance(v) => Some(v),
			_ => None,
		}
	}

	pub fn as_network(&self) -> Option<&NetworkInfo> {
		match self {
			Resource::Network(v) => Some(v),
			_ => None,
		}
	}

	pub fn as_ssh_keys(&self) -> Option<&SshKeys> {
		match self {
			Resource::SshKeys(v) => Some(v),
			_ => None,
		}
	}

	pub fn as_user_data(&self) -> Option<&UserData> {
		match self {
			Resource::UserData(v) => Some(v),
			_ => None,
		}
	}

	pub fn as_tags(&self) -> Option<&Tags> {
		match self {
			Resource::Tags(v) => Some(v),
			_ => None,
		}
	}
}

macro_rules! impl_from_record {
	($($variant:ident($ty:ty)),* $(,)?) => {
		$(
			impl From<$ty> for Resource {
				fn from(value: $ty) -> Self {
					Resource::$variant(value)
				}
			}
		)*
	};
}

impl_from_record!(
	Instance(InstanceInfo),
	Network(NetworkInfo),
	SshKeys(SshKeys),
	UserData(UserData),
	Tags(Tags),
);

fn from_json<T: serde::de::DeserializeOwned>(kind: ResourceKind, body: &[u8]) -> Result<T, FetchError> {
	serde_json::from_slice(body).map_err(|e| FetchError::Decode {
		kind,
		message: e.to_string(),
	})
}
