/* src/diff.rs */

//!
//! Descriptions of what changed between two fetches of the same resource.
//!
//! Only fields with a clear set or sequence meaning get a granular diff.
//! Everything else is reported as a whole-value replacement.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::objects::{NetworkInfo, Resource, SshKeys, Tags};

/// What happened to one field.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Change {
	/// An entry was added to a set-like field.
	Added(String),
	/// An entry was removed from a set-like field.
	Removed(String),
	/// A scalar or ordered field holds a different value.
	Modified,
}

/// A change to one named field, e.g. `ipv4.public`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldChange {
	pub field: String,
	pub change: Change,
}

impl FieldChange {
	pub fn new(field: impl Into<String>, change: Change) -> Self {
		Self {
			field: field.into(),
			change,
		}
	}
}

impl fmt::Display for FieldChange {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match &self.change {
			Change::Added(v) => write!(f, "{}: added {}", self.field, v),
			Change::Removed(v) => write!(f, "{}: removed {}", self.field, v),
			Change::Modified => write!(f, "{}: modified", self.field),
		}
	}
}

/// The difference between two values of a resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delta {
	/// The value changed as a whole; no finer description is available.
	Replaced,
	/// The listed fields changed.
	Fields(Vec<FieldChange>),
}

impl Delta {
	pub fn fields(&self) -> &[FieldChange] {
		match self {
			Delta::Replaced => &[],
			Delta::Fields(changes) => changes,
		}
	}

	/// Entries added to `field`.
	pub fn added<'a>(&'a self, field: &'a str) -> impl Iterator<Item = &'a str> + 'a {
		self.fields().iter().filter_map(move |c| match &c.change {
			Change::Added(v) if c.field == field => Some(v.as_str()),
			_ => None,
		})
	}

	/// Entries removed from `field`.
	pub fn removed<'a>(&'a self, field: &'a str) -> impl Iterator<Item = &'a str> + 'a {
		self.fields().iter().filter_map(move |c| match &c.change {
			Change::Removed(v) if c.field == field => Some(v.as_str()),
			_ => None,
		})
	}

	fn from_changes(changes: Vec<FieldChange>) -> Self {
		if changes.is_empty() {
			Delta::Replaced
		} else {
			Delta::Fields(changes)
		}
	}
}

/// Describes how a newer value differs from `self`.
///
/// Callers only ask for a diff once the two values are known to differ.
pub trait Diff {
	fn diff(&self, newer: &Self) -> Delta;
}

impl Diff for Resource {
	fn diff(&self, newer: &Self) -> Delta {
		match (self, newer) {
			(Resource::Network(old), Resource::Network(new)) => old.diff(new),
			(Resource::Tags(old), Resource::Tags(new)) => old.diff(new),
			(Resource::SshKeys(old), Resource::SshKeys(new)) => old.diff(new),
			_ => Delta::Replaced,
		}
	}
}

impl Diff for NetworkInfo {
	fn diff(&self, newer: &Self) -> Delta {
		let mut changes = Vec::new();

		diff_set(&mut changes, "ipv4.public", &self.ipv4.public, &newer.ipv4.public);
		diff_set(&mut changes, "ipv4.private", &self.ipv4.private, &newer.ipv4.private);
		diff_set(&mut changes, "ipv4.shared", &self.ipv4.shared, &newer.ipv4.shared);
		diff_set(&mut changes, "ipv6.ranges", &self.ipv6.ranges, &newer.ipv6.ranges);
		diff_set(
			&mut changes,
			"ipv6.shared_ranges",
			&self.ipv6.shared_ranges,
			&newer.ipv6.shared_ranges,
		);

		if self.ipv6.slaac != newer.ipv6.slaac {
			changes.push(FieldChange::new("ipv6.slaac", Change::Modified));
		}
		if self.ipv6.link_local != newer.ipv6.link_local {
			changes.push(FieldChange::new("ipv6.link_local", Change::Modified));
		}
		if self.interfaces != newer.interfaces {
			changes.push(FieldChange::new("interfaces", Change::Modified));
		}

		Delta::from_changes(changes)
	}
}

impl Diff for Tags {
	fn diff(&self, newer: &Self) -> Delta {
		let mut changes = Vec::new();
		diff_set(&mut changes, "tags", &self.0, &newer.0);
		Delta::from_changes(changes)
	}
}

impl Diff for SshKeys {
	fn diff(&self, newer: &Self) -> Delta {
		Delta::from_changes(diff_users(&self.users, &newer.users))
	}
}

fn diff_set(changes: &mut Vec<FieldChange>, field: &str, old: &BTreeSet<String>, new: &BTreeSet<String>) {
	changes.extend(
		new.difference(old)
			.map(|v| FieldChange::new(field, Change::Added(v.clone()))),
	);
	changes.extend(
		old.difference(new)
			.map(|v| FieldChange::new(field, Change::Removed(v.clone()))),
	);
}

fn diff_users(old: &BTreeMap<String, Vec<String>>, new: &BTreeMap<String, Vec<String>>) -> Vec<FieldChange> {
	let mut changes = Vec::new();

	for (user, keys) in new {
		match old.get(user) {
			None => changes.push(FieldChange::new("users", Change::Added(user.clone()))),
			Some(prev) if prev != keys => {
				changes.push(FieldChange::new(format!("users.{user}"), Change::Modified));
			}
			Some(_) => {}
		}
	}
	for user in old.keys().filter(|u| !new.contains_key(*u)) {
		changes.push(FieldChange::new("users", Change::Removed(user.clone())));
	}

	changes
}
