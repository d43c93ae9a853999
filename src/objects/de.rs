/* src/objects/de.rs */

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer};

/// Reads `null` as the type's default.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
	D: Deserializer<'de>,
	T: Default + Deserialize<'de>,
{
	Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Reads a map of lists where the map or any list may be `null`.
pub(crate) fn null_lists_as_empty<'de, D>(deserializer: D) -> Result<BTreeMap<String, Vec<String>>, D::Error>
where
	D: Deserializer<'de>,
{
	let raw = Option::<BTreeMap<String, Option<Vec<String>>>>::deserialize(deserializer)?;
	Ok(raw
		.unwrap_or_default()
		.into_iter()
		.map(|(key, list)| (key, list.unwrap_or_default()))
		.collect())
}

/// Reads either a single string or a list of strings.
pub(crate) fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
	D: Deserializer<'de>,
{
	#[derive(Deserialize)]
	#[serde(untagged)]
	enum OneOrMany {
		One(String),
		Many(Vec<String>),
	}

	Ok(match Option::<OneOrMany>::deserialize(deserializer)? {
		None => Vec::new(),
		Some(OneOrMany::One(s)) => vec![s],
		Some(OneOrMany::Many(v)) => v,
	})
}
