/* src/client/mod.rs */

//!
//! HTTP accessor for the metadata service.
//!
//! - [`MetadataClient`] - Authenticated one-shot fetches, token management
//! - [`ClientConfig`] - Endpoint, timeout, User-Agent and token settings

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap, USER_AGENT};
use reqwest::{Method, StatusCode};
use validator::Validate;

use crate::accessor::{Accessor, FetchError};
use crate::objects::{InstanceInfo, MetadataToken, NetworkInfo, Resource, ResourceKind, SshKeys, Tags, UserData};
use crate::watch::{Config as WatchConfig, Watcher};

mod config;
mod response;
mod token;

pub use config::{
	BASE_URL, ClientConfig, DEFAULT_API_TIMEOUT, DEFAULT_TOKEN_EXPIRY_SECONDS, MAX_TOKEN_EXPIRY_SECONDS, TokenMode,
};

use response::{classify, error_reasons};
use token::TokenCache;

const TOKEN_HEADER: &str = "metadata-token";
const TOKEN_EXPIRY_HEADER: &str = "metadata-token-expiry-seconds";

/// Client for the metadata service of the instance it runs on.
pub struct MetadataClient {
	http: reqwest::Client,
	config: ClientConfig,
	tokens: TokenCache,
}

impl MetadataClient {
	/// Creates a client with its own HTTP connection pool.
	pub fn new(config: ClientConfig) -> Result<Self, FetchError> {
		let http = reqwest::Client::builder()
			.timeout(config.timeout)
			.build()
			.map_err(|e| FetchError::Config(e.to_string()))?;
		Self::with_http_client(config, http)
	}

	/// Creates a client on top of an existing reqwest client.
	///
	/// The per-request timeout from `config` still applies.
	pub fn with_http_client(config: ClientConfig, http: reqwest::Client) -> Result<Self, FetchError> {
		config.validate().map_err(|e| FetchError::Config(e.to_string()))?;
		Ok(Self {
			http,
			config,
			tokens: TokenCache::default(),
		})
	}

	pub fn config(&self) -> &ClientConfig {
		&self.config
	}

	/// The token currently cached by this client, if any.
	pub fn token(&self) -> Option<String> {
		self.tokens.peek().map(|t| t.token.clone())
	}

	/// Checks that the service is reachable, i.e. that we run inside an instance.
	pub async fn check_connection(&self) -> Result<(), FetchError> {
		self.http
			.get(&self.config.base_url)
			.timeout(self.config.timeout)
			.send()
			.await
			.map(drop)
			.map_err(classify)
	}

	/// Requests a new token. The token is returned but not applied.
	pub async fn generate_token(&self, expiry_seconds: u64) -> Result<MetadataToken, FetchError> {
		let pending = MetadataToken::new(String::new(), expiry_seconds);
		let mut headers = HeaderMap::new();
		headers.insert(TOKEN_EXPIRY_HEADER, expiry_seconds.into());

		let body = self
			.call(Method::PUT, "/token", "text/plain", headers, None)
			.await?;
		let value = String::from_utf8(body).map_err(|e| FetchError::Transport(format!("token is not UTF-8: {e}")))?;

		Ok(MetadataToken {
			token: value.trim().to_string(),
			..pending
		})
	}

	/// Requests a new token and uses it for subsequent calls.
	pub async fn refresh_token(&self) -> Result<MetadataToken, FetchError> {
		let expiry_seconds = match self.config.token {
			TokenMode::Managed { expiry_seconds } => expiry_seconds,
			TokenMode::Static(_) => DEFAULT_TOKEN_EXPIRY_SECONDS,
		};
		let token = self.generate_token(expiry_seconds).await?;
		self.tokens.store(token.clone());
		Ok(token)
	}

	pub async fn get_instance(&self) -> Result<InstanceInfo, FetchError> {
		match self.fetch(ResourceKind::Instance).await? {
			Resource::Instance(v) => Ok(v),
			other => Err(unexpected(ResourceKind::Instance, &other)),
		}
	}

	pub async fn get_network(&self) -> Result<NetworkInfo, FetchError> {
		match self.fetch(ResourceKind::Network).await? {
			Resource::Network(v) => Ok(v),
			other => Err(unexpected(ResourceKind::Network, &other)),
		}
	}

	pub async fn get_ssh_keys(&self) -> Result<SshKeys, FetchError> {
		match self.fetch(ResourceKind::SshKeys).await? {
			Resource::SshKeys(v) => Ok(v),
			other => Err(unexpected(ResourceKind::SshKeys, &other)),
		}
	}

	pub async fn get_user_data(&self) -> Result<UserData, FetchError> {
		match self.fetch(ResourceKind::UserData).await? {
			Resource::UserData(v) => Ok(v),
			other => Err(unexpected(ResourceKind::UserData, &other)),
		}
	}

	pub async fn get_tags(&self) -> Result<Tags, FetchError> {
		match self.fetch(ResourceKind::Tags).await? {
			Resource::Tags(v) => Ok(v),
			other => Err(unexpected(ResourceKind::Tags, &other)),
		}
	}

	/// A watcher polling through this client with the default interval.
	pub fn watcher(self: &Arc<Self>) -> Watcher {
		Watcher::new(Arc::clone(self))
	}

	/// A watcher polling through this client with `config` as its default.
	pub fn watcher_with(self: &Arc<Self>, config: WatchConfig) -> Watcher {
		Watcher::with_config(Arc::clone(self), config)
	}

	async fn valid_token(&self) -> Result<String, FetchError> {
		if let Some(token) = self.tokens.fresh() {
			return Ok(token.token.clone());
		}

		let expiry_seconds = match &self.config.token {
			TokenMode::Static(token) => return Ok(token.clone()),
			TokenMode::Managed { expiry_seconds } => *expiry_seconds,
		};

		let _guard = self.tokens.lock_refresh().await;
		// Another caller may have refreshed while we waited.
		if let Some(token) = self.tokens.fresh() {
			return Ok(token.token.clone());
		}

		tracing::debug!(expiry_seconds, "generating metadata token");
		let token = self.generate_token(expiry_seconds).await?;
		let value = token.token.clone();
		self.tokens.store(token);
		Ok(value)
	}

	async fn call(
		&self,
		method: Method,
		path: &str,
		content_type: &str,
		mut headers: HeaderMap,
		token: Option<&str>,
	) -> Result<Vec<u8>, FetchError> {
		let url = self.config.url(path);
		let invalid = |e: reqwest::header::InvalidHeaderValue| FetchError::Config(e.to_string());

		headers.insert(ACCEPT, content_type.parse().map_err(invalid)?);
		headers.insert(USER_AGENT, self.config.user_agent_header().parse().map_err(invalid)?);
		if method == Method::PUT || method == Method::POST {
			headers.insert(CONTENT_TYPE, content_type.parse().map_err(invalid)?);
		}
		if let Some(token) = token {
			headers.insert(TOKEN_HEADER, token.parse().map_err(invalid)?);
		}

		#[cfg(feature = "logging")]
		log_request(&method, &url, &headers);

		let response = self
			.http
			.request(method, &url)
			.headers(headers)
			.timeout(self.config.timeout)
			.send()
			.await
			.map_err(classify)?;

		#[cfg(feature = "logging")]
		log_response(&response);

		let status = response.status();
		let body = response.bytes().await.map_err(classify)?;

		if status.is_client_error() || status.is_server_error() {
			return Err(FetchError::from_status(status.as_u16(), error_reasons(&body)));
		}
		if status == StatusCode::NO_CONTENT {
			return Ok(Vec::new());
		}
		Ok(body.to_vec())
	}
}

#[async_trait]
impl Accessor for MetadataClient {
	async fn fetch(&self, kind: ResourceKind) -> Result<Resource, FetchError> {
		let token = self.valid_token().await?;
		let body = self
			.call(Method::GET, kind.path(), kind.content_type(), HeaderMap::new(), Some(&token))
			.await
			.map_err(|e| match e {
				FetchError::Api { status: 404, .. } => FetchError::Unsupported(kind),
				other => other,
			})?;

		Resource::decode(kind, &body)
	}
}

impl std::fmt::Debug for MetadataClient {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("MetadataClient")
			.field("config", &self.config)
			.finish_non_exhaustive()
	}
}

fn unexpected(kind: ResourceKind, got: &Resource) -> FetchError {
	FetchError::Decode {
		kind,
		message: format!("accessor returned {} instead", got.kind()),
	}
}

#[cfg(feature = "logging")]
fn log_request(method: &Method, url: &str, headers: &HeaderMap) {
	log::debug!("> {} {}", method, url);
	for (name, value) in headers {
		if name.as_str() == TOKEN_HEADER {
			log::debug!("> {}: <redacted>", name);
		} else {
			log::debug!("> {}: {:?}", name, value);
		}
	}
	log::debug!("> ");
}

#[cfg(feature = "logging")]
fn log_response(response: &reqwest::Response) {
	log::debug!("< {:?} {}", response.version(), response.status());
	for (name, value) in response.headers() {
		log::debug!("< {}: {:?}", name, value);
	}
	log::debug!("< ");
}
