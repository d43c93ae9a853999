/* src/client/response.rs */

use serde::Deserialize;

use crate::accessor::FetchError;

#[derive(Deserialize)]
struct ErrorBody {
	#[serde(default)]
	errors: Vec<ErrorEntry>,
}

#[derive(Deserialize)]
struct ErrorEntry {
	reason: Option<String>,
}

/// Extracts `errors[].reason` from an error response, if it is JSON at all.
pub(crate) fn error_reasons(body: &[u8]) -> Vec<String> {
	serde_json::from_slice::<ErrorBody>(body)
		.map(|b| b.errors.into_iter().filter_map(|e| e.reason).collect())
		.unwrap_or_default()
}

/// Maps a transport-level reqwest failure.
pub(crate) fn classify(err: reqwest::Error) -> FetchError {
	if err.is_timeout() {
		FetchError::Timeout
	} else if err.is_builder() {
		FetchError::Config(err.to_string())
	} else {
		FetchError::Transport(err.to_string())
	}
}
