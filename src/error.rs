//! Crate-level error types shared by the consumer, the OAuth provider, and the HTTP layer.

// self
use crate::_prelude::*;

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Token endpoint or resource owner failure.
	#[error(transparent)]
	Token(#[from] TokenError),
	/// Transport failure (DNS, TCP, TLS).
	#[error(transparent)]
	Transport(#[from] TransportError),

	/// The remote API answered with anything other than `200 OK`.
	///
	/// Every non-200 status collapses into this variant; the upstream status is not carried.
	#[error("There was an error connecting to the API")]
	ApiConnection,
	/// A response body could not be decoded into the requested type.
	#[error("Response body is not valid JSON for the requested type.")]
	Decode {
		/// Structured decoding failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
}
impl Error {
	/// Status code reported alongside [`Error::ApiConnection`].
	pub const API_CONNECTION_CODE: u16 = 500;

	/// Returns the error code attached to the failure, if any.
	pub fn code(&self) -> Option<u16> {
		match self {
			Self::ApiConnection => Some(Self::API_CONNECTION_CODE),
			Self::Token(TokenError::Rejected { status, .. }) => *status,
			_ => None,
		}
	}
}

/// Configuration and validation failures.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// HTTP request construction failed.
	#[error(transparent)]
	HttpRequest(#[from] http::Error),
	/// The host supplied a base URI that cannot be parsed.
	#[error("Base URI `{uri}` is invalid.")]
	InvalidBaseUri {
		/// Raw base URI.
		uri: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// A request path cannot be resolved against the base URI.
	#[error("Path `{path}` cannot be resolved against the base URI.")]
	InvalidPath {
		/// Raw request path.
		path: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// An OAuth provider URL cannot be parsed.
	#[error("OAuth provider {endpoint} URL is invalid.")]
	InvalidProviderUrl {
		/// Which provider URL failed validation.
		endpoint: &'static str,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// The HTTP method is not a valid token.
	#[error("HTTP method `{method}` is invalid.")]
	InvalidMethod {
		/// Raw method string.
		method: String,
	},
	/// A header name or value from the request options is invalid.
	#[error("Header `{name}` is invalid.")]
	InvalidHeader {
		/// Header name as supplied.
		name: String,
	},
	/// The `timeout` request option is not a usable number of seconds.
	#[error("Timeout `{value}` is not a valid number of seconds.")]
	InvalidTimeout {
		/// Raw option value.
		value: String,
	},
	/// The grant type string is not recognized.
	#[error("Grant type `{0}` is not supported.")]
	UnsupportedGrant(String),
	/// The grant requires an option the host did not supply.
	#[error("The {grant} grant requires the `{option}` option.")]
	MissingGrantOption {
		/// Grant label.
		grant: &'static str,
		/// Missing option key.
		option: &'static str,
	},
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}

/// Failures reported by the OAuth provider.
#[derive(Debug, ThisError)]
pub enum TokenError {
	/// The token endpoint answered with an OAuth error response.
	#[error("Token endpoint rejected the {grant} grant: {error}.")]
	Rejected {
		/// Grant label.
		grant: &'static str,
		/// OAuth error code (for example `invalid_client`).
		error: String,
		/// Optional human readable description.
		description: Option<String>,
		/// HTTP status code, when available.
		status: Option<u16>,
	},
	/// Token endpoint responded with JSON that does not describe a token.
	#[error("Token endpoint returned malformed JSON.")]
	Parse {
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
		/// HTTP status code, when available.
		status: Option<u16>,
	},
	/// Token endpoint returned something the OAuth client could not classify.
	#[error("Token endpoint returned an unexpected response: {message}.")]
	Unexpected {
		/// Summary of the failure.
		message: String,
		/// HTTP status code, when available.
		status: Option<u16>,
	},
	/// The resource owner endpoint did not answer with a success status.
	#[error("Resource owner endpoint returned HTTP {status}.")]
	ResourceOwner {
		/// HTTP status code returned by the endpoint.
		status: u16,
	},
}

/// Transport-level failures (network, IO).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling {target}.")]
	Network {
		/// Which endpoint was being called.
		target: &'static str,
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred during transport.")]
	Io(#[from] std::io::Error),
}
impl TransportError {
	/// Wraps a network failure raised while calling the remote API.
	pub fn api(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { target: "the API", source: Box::new(src) }
	}

	/// Wraps a network failure raised while calling the token endpoint.
	pub fn token_endpoint(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { target: "the token endpoint", source: Box::new(src) }
	}
}
