//! Access tokens minted by the exchange engine and the token endpoint payload they come from.

// crates.io
use oauth2::http::header::AUTHORIZATION;
// self
use crate::{
	_prelude::*,
	auth::{Credentials, ProviderId, TokenSecret},
	client::Client,
	http::{GatewayHttpClient, TransportErrorMapper},
	identity::RawProfile,
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
	pipeline::{Method, ProviderResponse, RequestOptions},
};

/// Credential material issued by the gateway's token endpoint.
///
/// The set is immutable once built; a refresh yields a new set.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TokenSet {
	/// Bearer token; empty for OAuth 1.0a-only providers.
	#[serde(default)]
	pub token: TokenSecret,
	/// OAuth 1.0a token relayed by the gateway.
	#[serde(default)]
	pub oauth_token: TokenSecret,
	/// OAuth 1.0a token secret relayed by the gateway.
	#[serde(default)]
	pub oauth_token_secret: TokenSecret,
	/// Refresh secret, when issued.
	#[serde(default)]
	pub refresh_token: Option<TokenSecret>,
	/// Absolute expiry instant; `None` for non-expiring tokens.
	#[serde(default, with = "time::serde::timestamp::option")]
	pub expires_at: Option<OffsetDateTime>,
	/// Token response fields the client does not interpret.
	#[serde(default)]
	pub params: BTreeMap<String, Value>,
}
impl TokenSet {
	/// Creates a bearer-only token set.
	pub fn bearer(token: impl Into<TokenSecret>) -> Self {
		Self { token: token.into(), ..Default::default() }
	}

	/// Sets the refresh secret.
	pub fn with_refresh_token(mut self, refresh_token: impl Into<TokenSecret>) -> Self {
		self.refresh_token = Some(refresh_token.into()).filter(|secret| !secret.is_empty());

		self
	}

	/// Sets the absolute expiry instant.
	pub fn with_expires_at(mut self, expires_at: OffsetDateTime) -> Self {
		self.expires_at = Some(expires_at);

		self
	}

	pub(crate) fn from_response(response: TokenEndpointResponse, now: OffsetDateTime) -> Self {
		let TokenEndpointResponse {
			access_token,
			oauth_token,
			oauth_token_secret,
			refresh_token,
			expires_in,
			expires_at,
			state: _,
			extra,
		} = response;
		let expires_at = expires_at
			.as_ref()
			.and_then(Seconds::whole)
			.and_then(|ts| OffsetDateTime::from_unix_timestamp(ts).ok())
			.or_else(|| {
				expires_in
					.as_ref()
					.and_then(Seconds::whole)
					.and_then(|secs| now.checked_add(Duration::seconds(secs)))
			});

		Self {
			token: access_token.unwrap_or_default().into(),
			oauth_token: oauth_token.unwrap_or_default().into(),
			oauth_token_secret: oauth_token_secret.unwrap_or_default().into(),
			refresh_token: refresh_token.filter(|token| !token.is_empty()).map(TokenSecret::from),
			expires_at,
			params: extra,
		}
	}

	/// Returns `true` when the token carries an expiry instant.
	pub fn is_expiring(&self) -> bool {
		self.expires_at.is_some()
	}

	/// Returns `true` when the token has expired at `now`.
	pub fn is_expired_at(&self, now: OffsetDateTime) -> bool {
		self.expires_at.is_some_and(|expires_at| expires_at <= now)
	}
}

/// Raw token endpoint payload.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct TokenEndpointResponse {
	#[serde(default)]
	pub access_token: Option<String>,
	#[serde(default)]
	pub oauth_token: Option<String>,
	#[serde(default)]
	pub oauth_token_secret: Option<String>,
	#[serde(default)]
	pub refresh_token: Option<String>,
	#[serde(default, alias = "expires")]
	pub expires_in: Option<Seconds>,
	#[serde(default)]
	pub expires_at: Option<Seconds>,
	#[serde(default)]
	pub state: Option<String>,
	#[serde(flatten)]
	pub extra: BTreeMap<String, Value>,
}

impl TokenEndpointResponse {
	/// Whether the payload carries a bearer token or a complete OAuth 1 pair.
	pub(crate) fn has_credentials(&self) -> bool {
		let present = |value: &Option<String>| value.as_deref().is_some_and(|v| !v.is_empty());

		present(&self.access_token)
			|| (present(&self.oauth_token) && present(&self.oauth_token_secret))
	}
}

/// Second counts arrive as integers, floats, or numeric strings depending on the provider.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(untagged)]
pub(crate) enum Seconds {
	Int(i64),
	Float(f64),
	Text(String),
}
impl Seconds {
	fn whole(&self) -> Option<i64> {
		match self {
			Self::Int(secs) => Some(*secs),
			Self::Float(secs) => float_whole(*secs),
			Self::Text(secs) => {
				let secs = secs.trim();

				secs.parse::<i64>().ok().or_else(|| secs.parse::<f64>().ok().and_then(float_whole))
			},
		}
	}
}

// Values outside the `i64` range are dropped rather than saturated.
fn float_whole(secs: f64) -> Option<i64> {
	let secs = secs.trunc();

	(secs.is_finite() && secs >= i64::MIN as f64 && secs < i64::MAX as f64).then_some(secs as i64)
}

/// Token bound to the client that minted it.
///
/// Requests made through the token reuse the client's transport and configuration and carry an
/// `Authorization: Bearer` header whenever the bearer token is non-empty.
pub struct AccessToken<C, M>
where
	C: GatewayHttpClient,
	M: TransportErrorMapper<C::TransportError>,
{
	client: Client<C, M>,
	provider: Option<ProviderId>,
	tokens: TokenSet,
}
impl<C, M> AccessToken<C, M>
where
	C: GatewayHttpClient,
	M: TransportErrorMapper<C::TransportError>,
{
	/// Binds a previously issued token set to `client`.
	///
	/// Useful when tokens were persisted between requests and need to be rehydrated.
	pub fn from_tokens(client: Client<C, M>, tokens: TokenSet) -> Self {
		Self { client, provider: None, tokens }
	}

	/// Records the provider the token was issued for.
	///
	/// Refresh requests substitute it into a `:provider` token path.
	pub fn with_provider(mut self, provider: ProviderId) -> Self {
		self.provider = Some(provider);

		self
	}

	/// Client this token is bound to.
	pub fn client(&self) -> &Client<C, M> {
		&self.client
	}

	/// Provider the token was issued for, when known.
	pub fn provider(&self) -> Option<&ProviderId> {
		self.provider.as_ref()
	}

	/// Issued credential material.
	pub fn tokens(&self) -> &TokenSet {
		&self.tokens
	}

	/// Bearer token.
	pub fn token(&self) -> &TokenSecret {
		&self.tokens.token
	}

	/// See [`TokenSet::is_expiring`].
	pub fn is_expiring(&self) -> bool {
		self.tokens.is_expiring()
	}

	/// Credentials block exposed on canonical identities.
	pub fn credentials(&self) -> Credentials {
		Credentials::from(&self.tokens)
	}

	/// Sends an authenticated request through the client's pipeline.
	pub async fn request(
		&self,
		method: Method,
		path: &str,
		options: RequestOptions,
	) -> Result<ProviderResponse> {
		let options = match self.tokens.token.non_empty() {
			Some(token) => options.header(AUTHORIZATION.as_str(), format!("Bearer {token}")),
			None => options,
		};

		self.client.request(method, path, options).await
	}

	/// Fetches the authenticated user's profile from the provider's profile endpoint.
	///
	/// The returned profile keeps any provider error the pipeline embedded when raising is
	/// disabled.
	pub async fn fetch_profile(&self, provider: &ProviderId) -> Result<RawProfile> {
		const KIND: FlowKind = FlowKind::ProfileFetch;

		let span = FlowSpan::new(KIND, "fetch_profile");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span
			.instrument(async {
				let options = RequestOptions::new().provider(provider.clone());
				let response =
					self.request(Method::GET, &self.client.config.profile_path, options).await?;

				Ok(RawProfile::from_response(response))
			})
			.await;

		obs::record_result(KIND, &result);

		result
	}
}
impl<C, M> Clone for AccessToken<C, M>
where
	C: GatewayHttpClient,
	M: TransportErrorMapper<C::TransportError>,
{
	fn clone(&self) -> Self {
		Self {
			client: self.client.clone(),
			provider: self.provider.clone(),
			tokens: self.tokens.clone(),
		}
	}
}
impl<C, M> Debug for AccessToken<C, M>
where
	C: GatewayHttpClient,
	M: TransportErrorMapper<C::TransportError>,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("AccessToken")
			.field("provider", &self.provider)
			.field("token", &self.tokens.token)
			.field("refresh_token_set", &self.tokens.refresh_token.is_some())
			.field("expires_at", &self.tokens.expires_at)
			.finish()
	}
}
