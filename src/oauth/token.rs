//! Access token model and the redacted secret wrapper it is built on.

// crates.io
use oauth2::{TokenResponse, basic::BasicTokenResponse};
// self
use crate::_prelude::*;

/// Redacted token secret wrapper keeping sensitive material out of logs.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenSecret(String);
impl TokenSecret {
	/// Wraps a new secret string.
	pub fn new(value: impl Into<String>) -> Self {
		Self(value.into())
	}

	/// Returns the inner token value. Callers must avoid logging this string.
	pub fn expose(&self) -> &str {
		&self.0
	}
}
impl AsRef<str> for TokenSecret {
	fn as_ref(&self) -> &str {
		self.expose()
	}
}
impl Debug for TokenSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("TokenSecret").field(&"<redacted>").finish()
	}
}
impl Display for TokenSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("<redacted>")
	}
}

/// Access token issued by an OAuth provider.
///
/// The expiry is recorded for callers that want to inspect it; nothing in this crate refreshes
/// or discards a token once it has been issued.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessToken {
	/// Bearer credential; callers must avoid logging it.
	pub access_token: TokenSecret,
	/// Token type reported by the provider (usually `bearer`).
	pub token_type: String,
	/// Refresh token, if the provider issued one.
	pub refresh_token: Option<TokenSecret>,
	/// Expiry instant derived from `expires_in`, when the provider sent one.
	pub expires_at: Option<OffsetDateTime>,
	/// Scopes the provider reported as granted.
	pub scopes: Vec<String>,
}
impl AccessToken {
	/// Creates a bearer token without expiry, refresh token, or scopes.
	pub fn new(access_token: impl Into<String>) -> Self {
		Self {
			access_token: TokenSecret::new(access_token),
			token_type: "bearer".into(),
			refresh_token: None,
			expires_at: None,
			scopes: Vec::new(),
		}
	}

	/// Returns the raw credential string.
	pub fn expose(&self) -> &str {
		self.access_token.expose()
	}

	/// Returns the `Authorization` header value for this token.
	pub fn authorization_value(&self) -> String {
		format!("Bearer {}", self.expose())
	}

	/// Returns `true` if the provider-reported lifetime has elapsed at `instant`.
	pub fn is_expired_at(&self, instant: OffsetDateTime) -> bool {
		self.expires_at.is_some_and(|expires_at| instant >= expires_at)
	}

	pub(crate) fn from_response(response: &BasicTokenResponse, issued_at: OffsetDateTime) -> Self {
		let expires_at = response
			.expires_in()
			.and_then(|lifetime| Duration::try_from(lifetime).ok())
			.and_then(|lifetime| issued_at.checked_add(lifetime));
		let scopes = response
			.scopes()
			.map(|scopes| scopes.iter().map(|scope| scope.as_str().to_owned()).collect())
			.unwrap_or_default();

		Self {
			access_token: TokenSecret::new(response.access_token().secret().to_owned()),
			token_type: response.token_type().as_ref().to_owned(),
			refresh_token: response
				.refresh_token()
				.map(|refresh| TokenSecret::new(refresh.secret().to_owned())),
			expires_at,
			scopes,
		}
	}
}
impl Debug for AccessToken {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("AccessToken")
			.field("access_token", &"<redacted>")
			.field("token_type", &self.token_type)
			.field("refresh_token_set", &self.refresh_token.is_some())
			.field("expires_at", &self.expires_at)
			.field("scopes", &self.scopes)
			.finish()
	}
}
