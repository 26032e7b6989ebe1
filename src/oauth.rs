//! OAuth 2.0 provider client used by the consumer to obtain bearer tokens.
//!
//! [`OAuthProvider`] wraps the `oauth2` crate's basic client: it exchanges any supported
//! [`GrantType`] at the configured token URL and can look up the resource owner behind a token.

pub mod grant;
pub mod token;

pub use oauth2;

pub use grant::*;
pub use token::*;

// std
use std::borrow::Cow;
// crates.io
use oauth2::{
	AuthType, AuthUrl, AuthorizationCode, ClientId, ClientSecret, EndpointNotSet, EndpointSet,
	HttpClientError, RedirectUrl, RefreshToken, RequestTokenError, ResourceOwnerPassword,
	ResourceOwnerUsername, Scope, TokenUrl,
	basic::{BasicClient, BasicRequestTokenError},
};
// self
use crate::{
	_prelude::*,
	error::{ConfigError, TokenError, TransportError},
	http::{self, TokenTransport},
	obs::{self, CallKind, CallOutcome, CallSpan},
};

type ConfiguredBasicClient =
	BasicClient<EndpointSet, EndpointNotSet, EndpointNotSet, EndpointNotSet, EndpointSet>;

/// Raw provider settings a host derives from its own configuration.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OAuthProviderConfig {
	/// OAuth client identifier.
	pub client_id: String,
	/// OAuth client secret.
	pub client_secret: String,
	/// Authorization endpoint.
	pub url_authorize: String,
	/// Token endpoint.
	pub url_access_token: String,
	/// Resource owner details endpoint.
	pub url_resource_owner_details: String,
}
impl Debug for OAuthProviderConfig {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("OAuthProviderConfig")
			.field("client_id", &self.client_id)
			.field("client_secret", &"<redacted>")
			.field("url_authorize", &self.url_authorize)
			.field("url_access_token", &self.url_access_token)
			.field("url_resource_owner_details", &self.url_resource_owner_details)
			.finish()
	}
}

/// Validated endpoint set of a provider.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderEndpoints {
	/// Authorization endpoint.
	pub authorize: Url,
	/// Token endpoint used for every grant exchange.
	pub access_token: Url,
	/// Resource owner details endpoint.
	pub resource_owner_details: Url,
}
impl ProviderEndpoints {
	fn parse(config: &OAuthProviderConfig) -> Result<Self> {
		Ok(Self {
			authorize: parse_endpoint("authorize", &config.url_authorize)?,
			access_token: parse_endpoint("access token", &config.url_access_token)?,
			resource_owner_details: parse_endpoint(
				"resource owner details",
				&config.url_resource_owner_details,
			)?,
		})
	}
}

/// Generic OAuth 2.0 provider.
///
/// Client credentials are sent in the token request body. Each provider owns its own transport,
/// so building a provider per token fetch never shares state between fetches.
pub struct OAuthProvider {
	client: ConfiguredBasicClient,
	endpoints: ProviderEndpoints,
	transport: TokenTransport,
}
impl OAuthProvider {
	/// Validates the configuration and builds the provider.
	pub fn new(config: &OAuthProviderConfig) -> Result<Self> {
		let endpoints = ProviderEndpoints::parse(config)?;
		let client = BasicClient::new(ClientId::new(config.client_id.clone()))
			.set_client_secret(ClientSecret::new(config.client_secret.clone()))
			.set_auth_uri(AuthUrl::from_url(endpoints.authorize.clone()))
			.set_token_uri(TokenUrl::from_url(endpoints.access_token.clone()))
			.set_auth_type(AuthType::RequestBody);

		Ok(Self { client, endpoints, transport: TokenTransport::new()? })
	}

	/// Endpoints this provider talks to.
	pub fn endpoints(&self) -> &ProviderEndpoints {
		&self.endpoints
	}

	/// Exchanges `grant` for an access token at the token endpoint.
	pub async fn access_token(
		&self,
		grant: GrantType,
		options: &OAuthOptions,
	) -> Result<AccessToken> {
		const KIND: CallKind = CallKind::Token;

		obs::record_call_outcome(KIND, CallOutcome::Attempt);

		let result =
			CallSpan::new(KIND, grant.as_str()).instrument(self.exchange(grant, options)).await;

		obs::record_call_outcome(KIND, CallOutcome::of(&result));

		result
	}

	/// Fetches the resource owner details for `token` as raw JSON.
	pub async fn resource_owner(&self, token: &AccessToken) -> Result<Value> {
		const KIND: CallKind = CallKind::ResourceOwner;

		obs::record_call_outcome(KIND, CallOutcome::Attempt);

		let result = CallSpan::new(KIND, "resource_owner")
			.instrument(self.fetch_resource_owner(token))
			.await;

		obs::record_call_outcome(KIND, CallOutcome::of(&result));

		result
	}

	async fn fetch_resource_owner(&self, token: &AccessToken) -> Result<Value> {
		let response = self
			.transport
			.get_with_bearer(self.endpoints.resource_owner_details.clone(), token.expose())
			.await?;

		if !response.status().is_success() {
			return Err(TokenError::ResourceOwner { status: response.status().as_u16() }.into());
		}

		http::decode_json(&response)
	}

	async fn exchange(&self, grant: GrantType, options: &OAuthOptions) -> Result<AccessToken> {
		let transport = &self.transport;

		macro_rules! scoped {
			($request:expr) => {{
				let mut request = $request;

				if let Some(scope) = options.get(OAuthOptions::SCOPE) {
					request = request.add_scope(Scope::new(scope.to_owned()));
				}

				request
			}};
		}
		macro_rules! send {
			($request:expr) => {{
				let mut request = $request;

				for (key, value) in options.extra_params(grant) {
					request = request.add_extra_param(key.to_owned(), value.to_owned());
				}

				request.request_async(transport).await
			}};
		}

		let response = match grant {
			GrantType::ClientCredentials =>
				send!(scoped!(self.client.exchange_client_credentials())),
			GrantType::AuthorizationCode => {
				let code = options.require(grant, OAuthOptions::CODE)?;
				let code = AuthorizationCode::new(code.to_owned());
				let mut request = self.client.exchange_code(code);

				// Code exchanges have no scope setter; the scope travels as a plain form field.
				if let Some(scope) = options.get(OAuthOptions::SCOPE) {
					request = request.add_extra_param(OAuthOptions::SCOPE, scope.to_owned());
				}
				if let Some(redirect) = options.get(OAuthOptions::REDIRECT_URI) {
					let redirect = Url::parse(redirect).map_err(|source| {
						ConfigError::InvalidProviderUrl { endpoint: "redirect", source }
					})?;

					request = request.set_redirect_uri(Cow::Owned(RedirectUrl::from_url(redirect)));
				}

				send!(request)
			},
			GrantType::RefreshToken => {
				let refresh = RefreshToken::new(
					options.require(grant, OAuthOptions::REFRESH_TOKEN)?.to_owned(),
				);

				send!(scoped!(self.client.exchange_refresh_token(&refresh)))
			},
			GrantType::Password => {
				let username = ResourceOwnerUsername::new(
					options.require(grant, OAuthOptions::USERNAME)?.to_owned(),
				);
				let password = ResourceOwnerPassword::new(
					options.require(grant, OAuthOptions::PASSWORD)?.to_owned(),
				);

				send!(scoped!(self.client.exchange_password(&username, &password)))
			},
		}
		.map_err(|err| map_request_error(grant, transport.status().take(), err))?;

		Ok(AccessToken::from_response(&response, OffsetDateTime::now_utc()))
	}
}
impl Debug for OAuthProvider {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("OAuthProvider").field("endpoints", &self.endpoints).finish()
	}
}

fn parse_endpoint(endpoint: &'static str, raw: &str) -> Result<Url> {
	Url::parse(raw).map_err(|source| ConfigError::InvalidProviderUrl { endpoint, source }.into())
}

fn map_request_error(
	grant: GrantType,
	status: Option<u16>,
	err: BasicRequestTokenError<HttpClientError<ReqwestError>>,
) -> Error {
	match err {
		RequestTokenError::ServerResponse(response) => TokenError::Rejected {
			grant: grant.as_str(),
			error: response.error().as_ref().to_owned(),
			description: response.error_description().cloned(),
			status,
		}
		.into(),
		RequestTokenError::Request(error) => map_transport_error(status, error),
		RequestTokenError::Parse(source, _body) => TokenError::Parse { source, status }.into(),
		RequestTokenError::Other(message) => TokenError::Unexpected { message, status }.into(),
	}
}

fn map_transport_error(status: Option<u16>, err: HttpClientError<ReqwestError>) -> Error {
	match err {
		HttpClientError::Reqwest(inner) if inner.is_builder() =>
			ConfigError::http_client_build(*inner).into(),
		HttpClientError::Reqwest(inner) => TransportError::token_endpoint(*inner).into(),
		HttpClientError::Http(inner) => ConfigError::from(inner).into(),
		HttpClientError::Io(inner) => TransportError::Io(inner).into(),
		HttpClientError::Other(message) => TokenError::Unexpected { message, status }.into(),
		_ => TokenError::Unexpected { message: "unknown HTTP client failure".into(), status }
			.into(),
	}
}
