//! Outbound API consumer.
//!
//! A host implements [`ApiHost`] to describe the remote API and its OAuth credentials, then wraps
//! itself in a [`Consumer`] to issue calls. The consumer fetches a bearer token on the first
//! authenticated call and reuses it for its whole lifetime; there is no expiry check and no
//! refresh. The cache lock is held while a token is being fetched, so callers sharing one
//! consumer wait for that fetch instead of starting their own.

mod host;
mod request;

pub use host::*;
pub use request::*;

// crates.io
use http::{Method, StatusCode};
// self
use crate::{
	_prelude::*,
	error::ConfigError,
	http::{ApiResponse, RequestOptions},
	oauth::AccessToken,
	obs::{self, CallKind, CallOutcome, CallSpan},
};

/// Authenticated API client built around a host's configuration.
pub struct Consumer<H> {
	host: H,
	token: AsyncMutex<Option<AccessToken>>,
}
impl<H> Consumer<H>
where
	H: ApiHost,
{
	/// Wraps `host` with an empty token cache.
	pub fn new(host: H) -> Self {
		Self { host, token: AsyncMutex::new(None) }
	}

	/// Seeds the token cache, skipping the first token fetch.
	pub fn with_token(self, token: AccessToken) -> Self {
		Self { host: self.host, token: AsyncMutex::new(Some(token)) }
	}

	/// Borrows the host.
	pub fn host(&self) -> &H {
		&self.host
	}

	/// Returns the host, dropping the cached token.
	pub fn into_host(self) -> H {
		self.host
	}

	/// Returns the cached token without fetching one.
	///
	/// Yields `None` while a fetch is in flight.
	pub fn cached_token(&self) -> Option<AccessToken> {
		self.token.try_lock().and_then(|cached| cached.clone())
	}

	/// Returns the cached token, fetching it from the OAuth provider on first use.
	pub async fn token(&self) -> Result<AccessToken> {
		let mut cached = self.token.lock().await;

		if let Some(token) = cached.as_ref() {
			return Ok(token.clone());
		}

		let provider = self.host.oauth_provider()?;
		let options = self.host.oauth_options();
		let token = provider.access_token(self.host.grant_type(), &options).await?;

		*cached = Some(token.clone());

		Ok(token)
	}

	/// Issues one request and returns the response when its status is exactly `200 OK`.
	///
	/// Any other status fails with [`Error::ApiConnection`].
	pub async fn call(&self, request: ApiRequest) -> Result<ApiResponse> {
		const KIND: CallKind = CallKind::Api;

		obs::record_call_outcome(KIND, CallOutcome::Attempt);

		let stage = request.method.to_ascii_uppercase();
		let result = CallSpan::new(KIND, &stage).instrument(self.dispatch(request)).await;

		obs::record_call_outcome(KIND, CallOutcome::of(&result));

		result
	}

	async fn dispatch(&self, request: ApiRequest) -> Result<ApiResponse> {
		let ApiRequest { path, method, data, mut options } = request;
		let method = parse_method(&method)?;
		let client = self.host.client()?;

		if self.host.is_token_required() {
			let token = self.token().await?;

			options.merge_recursive(auth_options(&token));
		}

		place_data(&method, data, &mut options);

		let response = client.request(method, &path, &options).await?;

		if response.status() != StatusCode::OK {
			obs::record_unexpected_status(&path, response.status().as_u16());

			return Err(Error::ApiConnection);
		}

		Ok(response)
	}
}
impl<H> Debug for Consumer<H>
where
	H: Debug,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Consumer").field("host", &self.host).finish_non_exhaustive()
	}
}

fn parse_method(raw: &str) -> Result<Method> {
	Method::from_bytes(raw.to_ascii_uppercase().as_bytes())
		.map_err(|_| ConfigError::InvalidMethod { method: raw.to_owned() }.into())
}

fn carries_body(method: &Method) -> bool {
	[Method::PATCH, Method::POST, Method::PUT].contains(method)
}

// Non-empty data replaces any caller `json` or `query` option.
fn place_data(method: &Method, data: JsonMap<String, Value>, options: &mut RequestOptions) {
	if data.is_empty() {
		return;
	}

	let key = if carries_body(method) { RequestOptions::JSON } else { RequestOptions::QUERY };

	options.set(key, Value::Object(data));
}

fn auth_options(token: &AccessToken) -> RequestOptions {
	RequestOptions::new()
		.with_header("Authorization", token.authorization_value())
		.with_header("Content-Type", "application/json")
}
