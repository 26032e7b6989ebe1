//! Grant types and the options sent with each grant.

// self
use crate::{_prelude::*, error::ConfigError};

/// OAuth 2.0 grant types a provider can exchange for an access token.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrantType {
	/// Client Credentials grant for app-only tokens.
	#[default]
	ClientCredentials,
	/// Authorization Code grant; requires the `code` option.
	AuthorizationCode,
	/// Refresh Token grant; requires the `refresh_token` option.
	RefreshToken,
	/// Resource Owner Password grant; requires the `username` and `password` options.
	Password,
}
impl GrantType {
	/// Returns the RFC 6749 identifier for the grant type.
	pub const fn as_str(self) -> &'static str {
		match self {
			GrantType::ClientCredentials => "client_credentials",
			GrantType::AuthorizationCode => "authorization_code",
			GrantType::RefreshToken => "refresh_token",
			GrantType::Password => "password",
		}
	}

	/// Option keys the grant consumes itself instead of forwarding as extra parameters.
	pub fn consumed_options(self) -> &'static [&'static str] {
		match self {
			GrantType::ClientCredentials => &[OAuthOptions::SCOPE],
			GrantType::AuthorizationCode =>
				&[OAuthOptions::SCOPE, OAuthOptions::CODE, OAuthOptions::REDIRECT_URI],
			GrantType::RefreshToken => &[OAuthOptions::SCOPE, OAuthOptions::REFRESH_TOKEN],
			GrantType::Password =>
				&[OAuthOptions::SCOPE, OAuthOptions::USERNAME, OAuthOptions::PASSWORD],
		}
	}
}
impl Display for GrantType {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
impl FromStr for GrantType {
	type Err = ConfigError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"client_credentials" => Ok(GrantType::ClientCredentials),
			"authorization_code" => Ok(GrantType::AuthorizationCode),
			"refresh_token" => Ok(GrantType::RefreshToken),
			"password" => Ok(GrantType::Password),
			other => Err(ConfigError::UnsupportedGrant(other.to_owned())),
		}
	}
}

/// String options sent along with a grant (scope, authorization code, credentials, ...).
///
/// Keys the grant does not consume are forwarded to the token endpoint as extra form parameters.
/// Values are redacted from the `Debug` output.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OAuthOptions(BTreeMap<String, String>);
impl OAuthOptions {
	/// Space-delimited scope string, sent verbatim.
	pub const SCOPE: &'static str = "scope";
	/// Authorization code for the `authorization_code` grant.
	pub const CODE: &'static str = "code";
	/// Redirect URI echoed back with the `authorization_code` grant.
	pub const REDIRECT_URI: &'static str = "redirect_uri";
	/// Refresh token for the `refresh_token` grant.
	pub const REFRESH_TOKEN: &'static str = "refresh_token";
	/// Resource owner username for the `password` grant.
	pub const USERNAME: &'static str = "username";
	/// Resource owner password for the `password` grant.
	pub const PASSWORD: &'static str = "password";

	/// Creates an empty option set.
	pub fn new() -> Self {
		Self::default()
	}

	/// Sets an option, replacing any previous value.
	pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
		self.0.insert(key.into(), value.into());

		self
	}

	/// Sets the requested scope.
	pub fn with_scope(self, scope: impl Into<String>) -> Self {
		self.with(Self::SCOPE, scope)
	}

	/// Returns the option stored under `key`.
	pub fn get(&self, key: &str) -> Option<&str> {
		self.0.get(key).map(String::as_str)
	}

	/// Returns true when no option is set.
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	pub(crate) fn require(&self, grant: GrantType, option: &'static str) -> Result<&str> {
		self.get(option)
			.ok_or_else(|| ConfigError::MissingGrantOption { grant: grant.as_str(), option }.into())
	}

	pub(crate) fn extra_params(&self, grant: GrantType) -> impl Iterator<Item = (&str, &str)> {
		let consumed = grant.consumed_options();

		self.0
			.iter()
			.filter(move |(key, _)| !consumed.contains(&key.as_str()))
			.map(|(key, value)| (key.as_str(), value.as_str()))
	}
}
impl Debug for OAuthOptions {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_set().entries(self.0.keys()).finish()
	}
}
