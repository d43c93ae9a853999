/* src/objects/user_data.rs */

use std::ops::Deref;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};

use super::ResourceKind;
use crate::accessor::FetchError;

/// Free-form user data, decoded from the service's base64 payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserData(pub String);

impl UserData {
	/// Decodes a base64 body into UTF-8 text.
	pub fn from_base64(body: &[u8]) -> Result<Self, FetchError> {
		let decode_err = |message: String| FetchError::Decode {
			kind: ResourceKind::UserData,
			message,
		};

		let trimmed = body.trim_ascii();
		let raw = STANDARD.decode(trimmed).map_err(|e| decode_err(e.to_string()))?;
		let text = String::from_utf8(raw).map_err(|e| decode_err(e.to_string()))?;
		Ok(UserData(text))
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl Deref for UserData {
	type Target = str;

	fn deref(&self) -> &str {
		&self.0
	}
}
