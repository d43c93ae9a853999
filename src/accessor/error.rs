/* src/accessor/error.rs */

use crate::objects::ResourceKind;

/// How a failed fetch affects a running watch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
	/// Retryable; the watcher skips the tick and keeps polling.
	Transient,
	/// Terminates the watch and is surfaced to the caller.
	Fatal,
}

/// Errors returned by a metadata accessor.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
	/// The request did not complete in time.
	#[error("request timed out")]
	Timeout,

	/// Connection or protocol failure below the HTTP status layer.
	#[error("transport error: {0}")]
	Transport(String),

	/// The response body could not be decoded into the expected record.
	#[error("failed to decode {kind} response: {message}")]
	Decode { kind: ResourceKind, message: String },

	/// The service answered with an error status.
	#[error("API error {status}: {}", reasons.join("; "))]
	Api { status: u16, reasons: Vec<String> },

	/// The token was rejected or could not be obtained.
	#[error("unauthorized ({status}): {}", reasons.join("; "))]
	Unauthorized { status: u16, reasons: Vec<String> },

	/// The service does not provide this resource.
	#[error("resource not supported by the metadata service: {0}")]
	Unsupported(ResourceKind),

	/// The client is misconfigured.
	#[error("invalid configuration: {0}")]
	Config(String),
}

impl FetchError {
	/// Builds the error for an HTTP error status, classifying auth failures.
	pub fn from_status(status: u16, reasons: Vec<String>) -> Self {
		match status {
			401 | 403 => FetchError::Unauthorized { status, reasons },
			_ => FetchError::Api { status, reasons },
		}
	}

	pub fn severity(&self) -> Severity {
		match self {
			FetchError::Timeout | FetchError::Transport(_) | FetchError::Decode { .. } => {
				Severity::Transient
			}
			FetchError::Api { status, .. } => match status {
				408 | 429 | 500..=599 => Severity::Transient,
				_ => Severity::Fatal,
			},
			FetchError::Unauthorized { .. } | FetchError::Unsupported(_) | FetchError::Config(_) => {
				Severity::Fatal
			}
		}
	}

	pub fn is_transient(&self) -> bool {
		self.severity() == Severity::Transient
	}
}
