// self
use crate::{_prelude::*, http::RequestOptions};

/// A single call against the remote API.
///
/// Defaults to a `GET` without data or extra options.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApiRequest {
	/// Path relative to the host's base URI.
	pub path: String,
	/// HTTP method, matched case-insensitively.
	pub method: String,
	/// Data sent as a JSON body (PATCH/POST/PUT) or as query parameters (anything else).
	pub data: JsonMap<String, Value>,
	/// Extra transport options, merged with the injected auth headers.
	pub options: RequestOptions,
}
impl ApiRequest {
	/// Creates a `GET` request for `path`.
	pub fn new(path: impl Into<String>) -> Self {
		Self {
			path: path.into(),
			method: "GET".into(),
			data: JsonMap::new(),
			options: RequestOptions::default(),
		}
	}

	/// Overrides the HTTP method.
	pub fn with_method(mut self, method: impl Into<String>) -> Self {
		self.method = method.into();

		self
	}

	/// Attaches request data.
	pub fn with_data(mut self, data: JsonMap<String, Value>) -> Self {
		self.data = data;

		self
	}

	/// Attaches transport options.
	pub fn with_options(mut self, options: RequestOptions) -> Self {
		self.options = options;

		self
	}
}
