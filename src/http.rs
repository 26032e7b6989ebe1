//! HTTP plumbing shared by API calls and OAuth token exchanges.
//!
//! [`ApiClient`] is the bare client a host binds to its base URI; it translates
//! [`RequestOptions`] into a reqwest request and hands back the buffered [`ApiResponse`].
//! [`TokenTransport`] adapts reqwest to the `oauth2` crate's [`AsyncHttpClient`] contract and
//! remembers the status of the last token endpoint response so rejected grants can report it.

mod options;

pub use options::*;

// std
use std::time::Duration as StdDuration;
// crates.io
use http::{
	HeaderMap, HeaderName, HeaderValue, Method,
	header::{AUTHORIZATION, CONTENT_TYPE},
};
use oauth2::{AsyncHttpClient, HttpClientError, HttpRequest, HttpResponse};
use serde::de::DeserializeOwned;
// self
use crate::{
	_prelude::*,
	error::{ConfigError, TransportError},
};

/// Buffered response returned by [`ApiClient::request`].
pub type ApiResponse = http::Response<Vec<u8>>;

const APPLICATION_JSON: &str = "application/json";

/// Bare HTTP client bound to a base URI.
///
/// Relative paths resolve against the base URI following RFC 3986, so `/users` replaces the
/// base path while `users` is appended to its last directory.
#[derive(Clone, Debug)]
pub struct ApiClient {
	http: ReqwestClient,
	base_uri: Url,
}
impl ApiClient {
	/// Builds a client with reqwest defaults for the provided base URI.
	pub fn new(base_uri: &str) -> Result<Self> {
		let client = ReqwestClient::builder().build().map_err(ConfigError::http_client_build)?;

		Self::with_client(client, base_uri)
	}

	/// Wraps an existing reqwest client.
	pub fn with_client(client: ReqwestClient, base_uri: &str) -> Result<Self> {
		let base_uri = Url::parse(base_uri)
			.map_err(|source| ConfigError::InvalidBaseUri { uri: base_uri.to_owned(), source })?;

		Ok(Self { http: client, base_uri })
	}

	/// Base URI every request path resolves against.
	pub fn base_uri(&self) -> &Url {
		&self.base_uri
	}

	/// Resolves `path` against the base URI.
	pub fn resolve(&self, path: &str) -> Result<Url> {
		self.base_uri
			.join(path)
			.map_err(|source| ConfigError::InvalidPath { path: path.to_owned(), source }.into())
	}

	/// Sends a single request and buffers the response, whatever its status.
	pub async fn request(
		&self,
		method: Method,
		path: &str,
		options: &RequestOptions,
	) -> Result<ApiResponse> {
		let url = self.resolve(path)?;
		let request = build_request(method, url, options)?;
		let response = self.http.execute(request).await.map_err(TransportError::api)?;

		buffer_response(response).await
	}
}

/// Decodes a JSON response body, reporting the path of the first mismatch.
pub fn decode_json<T>(response: &ApiResponse) -> Result<T>
where
	T: DeserializeOwned,
{
	let mut deserializer = serde_json::Deserializer::from_slice(response.body());

	serde_path_to_error::deserialize(&mut deserializer).map_err(|source| Error::Decode { source })
}

/// Thread-safe slot recording the status of the most recent token endpoint response.
#[derive(Clone, Debug, Default)]
pub(crate) struct StatusSlot(Arc<Mutex<Option<u16>>>);
impl StatusSlot {
	fn store(&self, status: u16) {
		*self.0.lock() = Some(status);
	}

	pub(crate) fn take(&self) -> Option<u16> {
		self.0.lock().take()
	}
}

/// [`AsyncHttpClient`] used for token exchanges.
///
/// Token endpoints answer directly, so redirects are never followed.
#[derive(Clone, Debug)]
pub(crate) struct TokenTransport {
	client: ReqwestClient,
	status: StatusSlot,
}
impl TokenTransport {
	pub(crate) fn new() -> Result<Self> {
		let client = ReqwestClient::builder()
			.redirect(reqwest::redirect::Policy::none())
			.build()
			.map_err(ConfigError::http_client_build)?;

		Ok(Self { client, status: StatusSlot::default() })
	}

	pub(crate) fn status(&self) -> &StatusSlot {
		&self.status
	}

	/// Fetches `url` with the token as bearer credential.
	pub(crate) async fn get_with_bearer(&self, url: Url, bearer: &str) -> Result<ApiResponse> {
		let mut request = reqwest::Request::new(Method::GET, url);
		let value = HeaderValue::from_str(&format!("Bearer {bearer}"))
			.map_err(|_| ConfigError::InvalidHeader { name: AUTHORIZATION.to_string() })?;

		request.headers_mut().insert(AUTHORIZATION, value);

		let response = self.client.execute(request).await.map_err(TransportError::token_endpoint)?;

		buffer_response(response).await
	}
}
impl<'c> AsyncHttpClient<'c> for TokenTransport {
	type Error = HttpClientError<ReqwestError>;
	type Future =
		Pin<Box<dyn Future<Output = Result<HttpResponse, Self::Error>> + 'c + Send + Sync>>;

	fn call(&'c self, request: HttpRequest) -> Self::Future {
		Box::pin(async move {
			self.status.take();

			let response =
				self.client.execute(request.try_into().map_err(Box::new)?).await.map_err(Box::new)?;
			let status = response.status();
			let headers = response.headers().to_owned();

			self.status.store(status.as_u16());

			let body = response.bytes().await.map_err(Box::new)?;
			let mut converted = HttpResponse::new(body.to_vec());

			*converted.status_mut() = status;
			*converted.headers_mut() = headers;

			Ok(converted)
		})
	}
}

fn build_request(
	method: Method,
	mut url: Url,
	options: &RequestOptions,
) -> Result<reqwest::Request> {
	let mut headers = HeaderMap::new();
	let mut json = None;
	let mut body = None;
	let mut timeout = None;

	for (key, value) in options.as_map() {
		match key.as_str() {
			RequestOptions::HEADERS => append_headers(&mut headers, value)?,
			RequestOptions::QUERY => apply_query(&mut url, value),
			RequestOptions::JSON => json = Some(value.to_string().into_bytes()),
			RequestOptions::BODY =>
				body = Some(match value {
					Value::String(text) => text.clone().into_bytes(),
					other => other.to_string().into_bytes(),
				}),
			RequestOptions::TIMEOUT => timeout = Some(parse_timeout(value)?),
			_ => {
				#[cfg(feature = "tracing")]
				tracing::debug!(option = key.as_str(), "ignoring unsupported request option");
			},
		}
	}

	if json.is_some() && !headers.contains_key(CONTENT_TYPE) {
		headers.insert(CONTENT_TYPE, HeaderValue::from_static(APPLICATION_JSON));
	}

	let mut request = reqwest::Request::new(method, url);

	*request.headers_mut() = headers;
	*request.body_mut() = json.or(body).map(Into::into);
	*request.timeout_mut() = timeout;

	Ok(request)
}

fn append_headers(headers: &mut HeaderMap, value: &Value) -> Result<()> {
	let Value::Object(map) = value else {
		return Err(ConfigError::InvalidHeader { name: RequestOptions::HEADERS.into() }.into());
	};

	for (name, raw) in map {
		let header = HeaderName::from_bytes(name.as_bytes())
			.map_err(|_| ConfigError::InvalidHeader { name: name.clone() })?;
		let values = match raw {
			Value::Array(items) => items.iter().collect::<Vec<_>>(),
			other => vec![other],
		};

		for item in values {
			let text = match item {
				Value::String(text) => text.clone(),
				Value::Null => continue,
				other => other.to_string(),
			};
			let value = HeaderValue::from_str(&text)
				.map_err(|_| ConfigError::InvalidHeader { name: name.clone() })?;

			headers.append(header.clone(), value);
		}
	}

	Ok(())
}

fn parse_timeout(value: &Value) -> Result<StdDuration> {
	value
		.as_f64()
		.and_then(|seconds| StdDuration::try_from_secs_f64(seconds).ok())
		.ok_or_else(|| ConfigError::InvalidTimeout { value: value.to_string() }.into())
}

// Replaces any query already present on the resolved URL. Spaces encode as `%20`.
fn apply_query(url: &mut Url, value: &Value) {
	match value {
		Value::Object(map) => {
			let pairs = options::query_pairs(map);

			if pairs.is_empty() {
				url.set_query(None);

				return;
			}

			let encoded = url::form_urlencoded::Serializer::new(String::new())
				.extend_pairs(pairs)
				.finish()
				.replace('+', "%20");

			url.set_query(Some(&encoded));
		},
		Value::String(raw) => url.set_query(Some(raw.as_str())),
		_ => {},
	}
}

async fn buffer_response(response: reqwest::Response) -> Result<ApiResponse> {
	let status = response.status();
	let version = response.version();
	let headers = response.headers().to_owned();
	let body = response.bytes().await.map_err(TransportError::api)?.to_vec();
	let mut buffered = ApiResponse::new(body);

	*buffered.status_mut() = status;
	*buffered.version_mut() = version;
	*buffered.headers_mut() = headers;

	Ok(buffered)
}
