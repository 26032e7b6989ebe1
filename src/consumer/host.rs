//! Host-side configuration hooks for the consumer.

// self
use crate::{
	_prelude::*,
	http::ApiClient,
	oauth::{GrantType, OAuthOptions, OAuthProvider, OAuthProviderConfig},
};

/// Configuration a host supplies to talk to a remote API.
///
/// Only the base URI and the client credentials are required; every other hook has a default
/// that can be overridden.
pub trait ApiHost
where
	Self: Send + Sync,
{
	/// Base URI of the remote API, e.g. `https://api.example.com`.
	fn base_uri(&self) -> &str;

	/// OAuth client identifier.
	fn client_id(&self) -> &str;

	/// OAuth client secret.
	fn client_secret(&self) -> &str;

	/// Grant used to obtain the access token.
	fn grant_type(&self) -> GrantType {
		GrantType::ClientCredentials
	}

	/// Options sent with the grant (scope and the like).
	fn oauth_options(&self) -> OAuthOptions {
		OAuthOptions::default()
	}

	/// Whether calls carry a bearer token.
	fn is_token_required(&self) -> bool {
		true
	}

	/// Full URL for `path`, built by plain concatenation with the base URI.
	fn url(&self, path: &str) -> String {
		format!("{}{path}", self.base_uri())
	}

	/// Provider settings derived from the host's credentials.
	///
	/// The authorize and token URLs both point at `/oauth2/authorise`.
	fn oauth_provider_config(&self) -> OAuthProviderConfig {
		OAuthProviderConfig {
			client_id: self.client_id().to_owned(),
			client_secret: self.client_secret().to_owned(),
			url_authorize: self.url("/oauth2/authorise"),
			url_access_token: self.url("/oauth2/authorise"),
			url_resource_owner_details: self.url("/oauth2/resource"),
		}
	}

	/// Provider used for each token fetch.
	fn oauth_provider(&self) -> Result<OAuthProvider> {
		OAuthProvider::new(&self.oauth_provider_config())
	}

	/// Bare HTTP client bound to [`ApiHost::base_uri`].
	fn client(&self) -> Result<ApiClient> {
		ApiClient::new(self.base_uri())
	}
}

/// Host whose settings live in plain data, typically deserialized from a config file.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaticHost {
	/// Base URI of the remote API.
	pub base_uri: String,
	/// OAuth client identifier.
	pub client_id: String,
	/// OAuth client secret.
	pub client_secret: String,
	/// Grant used to obtain the access token.
	#[serde(default)]
	pub grant_type: GrantType,
	/// Options sent with the grant.
	#[serde(default)]
	pub oauth_options: OAuthOptions,
	/// Whether calls carry a bearer token.
	#[serde(default = "token_required_by_default")]
	pub token_required: bool,
}
impl StaticHost {
	/// Creates a host using the client credentials grant.
	pub fn new(
		base_uri: impl Into<String>,
		client_id: impl Into<String>,
		client_secret: impl Into<String>,
	) -> Self {
		Self {
			base_uri: base_uri.into(),
			client_id: client_id.into(),
			client_secret: client_secret.into(),
			grant_type: GrantType::default(),
			oauth_options: OAuthOptions::default(),
			token_required: true,
		}
	}

	/// Overrides the grant type.
	pub fn with_grant_type(mut self, grant_type: GrantType) -> Self {
		self.grant_type = grant_type;

		self
	}

	/// Overrides the grant options.
	pub fn with_oauth_options(mut self, options: OAuthOptions) -> Self {
		self.oauth_options = options;

		self
	}

	/// Sends calls without a bearer token.
	pub fn without_token(mut self) -> Self {
		self.token_required = false;

		self
	}
}
impl ApiHost for StaticHost {
	fn base_uri(&self) -> &str {
		&self.base_uri
	}

	fn client_id(&self) -> &str {
		&self.client_id
	}

	fn client_secret(&self) -> &str {
		&self.client_secret
	}

	fn grant_type(&self) -> GrantType {
		self.grant_type
	}

	fn oauth_options(&self) -> OAuthOptions {
		self.oauth_options.clone()
	}

	fn is_token_required(&self) -> bool {
		self.token_required
	}
}
impl Debug for StaticHost {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("StaticHost")
			.field("base_uri", &self.base_uri)
			.field("client_id", &self.client_id)
			.field("grant_type", &self.grant_type)
			.field("oauth_options", &self.oauth_options)
			.field("token_required", &self.token_required)
			.finish()
	}
}

fn token_required_by_default() -> bool {
	true
}
