/* src/client/config.rs */

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

/// Base URL of the metadata service as seen from inside an instance.
pub const BASE_URL: &str = "http://169.254.169.254/v1";

/// Default timeout of one API call.
pub const DEFAULT_API_TIMEOUT: Duration = Duration::from_secs(10);

/// Default lifetime requested for managed tokens.
pub const DEFAULT_TOKEN_EXPIRY_SECONDS: u64 = 3600;

/// Longest token lifetime the service issues.
pub const MAX_TOKEN_EXPIRY_SECONDS: u64 = 86400;

/// How the client obtains the `Metadata-Token` it sends.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenMode {
	/// Generate tokens on demand and regenerate them once expired.
	Managed { expiry_seconds: u64 },
	/// Use a caller-supplied token as is.
	Static(String),
}

impl Default for TokenMode {
	fn default() -> Self {
		TokenMode::Managed {
			expiry_seconds: DEFAULT_TOKEN_EXPIRY_SECONDS,
		}
	}
}

impl fmt::Debug for TokenMode {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			TokenMode::Managed { expiry_seconds } => f
				.debug_struct("Managed")
				.field("expiry_seconds", expiry_seconds)
				.finish(),
			TokenMode::Static(_) => f.debug_tuple("Static").field(&"<redacted>").finish(),
		}
	}
}

fn validate_token_mode(mode: &TokenMode) -> Result<(), ValidationError> {
	match mode {
		TokenMode::Managed { expiry_seconds } if !(1..=MAX_TOKEN_EXPIRY_SECONDS).contains(expiry_seconds) => {
			Err(ValidationError::new("token_expiry")
				.with_message("managed token expiry must be between 1 and 86400 seconds".into()))
		}
		TokenMode::Static(token) if token.is_empty() => {
			Err(ValidationError::new("token_empty").with_message("static token must not be empty".into()))
		}
		_ => Ok(()),
	}
}

/// Settings of a [`MetadataClient`](super::MetadataClient).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct ClientConfig {
	/// Base URL for API requests. Generally left at [`BASE_URL`].
	#[validate(url)]
	pub base_url: String,

	/// Prepended to the client's own User-Agent.
	pub user_agent: Option<String>,

	/// Timeout of one API call.
	pub timeout: Duration,

	#[validate(custom(function = "validate_token_mode"))]
	pub token: TokenMode,
}

impl Default for ClientConfig {
	fn default() -> Self {
		Self {
			base_url: BASE_URL.to_string(),
			user_agent: None,
			timeout: DEFAULT_API_TIMEOUT,
			token: TokenMode::default(),
		}
	}
}

impl ClientConfig {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
		self.base_url = url.into();
		self
	}

	pub fn with_user_agent(mut self, agent: impl Into<String>) -> Self {
		self.user_agent = Some(agent.into());
		self
	}

	pub fn with_timeout(mut self, timeout: Duration) -> Self {
		self.timeout = timeout;
		self
	}

	/// Uses `token` for every request instead of managing tokens.
	pub fn with_static_token(mut self, token: impl Into<String>) -> Self {
		self.token = TokenMode::Static(token.into());
		self
	}

	pub fn with_managed_token(mut self, expiry_seconds: u64) -> Self {
		self.token = TokenMode::Managed { expiry_seconds };
		self
	}

	/// The full User-Agent header value.
	pub(crate) fn user_agent_header(&self) -> String {
		let own = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));
		match self.user_agent.as_deref().map(str::trim) {
			Some(prefix) if !prefix.is_empty() => format!("{prefix} {own}"),
			_ => own.to_string(),
		}
	}

	pub(crate) fn url(&self, path: &str) -> String {
		format!("{}{}", self.base_url.trim_end_matches('/'), path)
	}
}
