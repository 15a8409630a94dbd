//! Refresh token grant.
//!
//! [`AccessToken::refresh`] posts `grant_type=refresh_token` through the same pipeline as the
//! code exchange and returns a new token bound to the same client. Gateways that do not rotate
//! refresh tokens omit `refresh_token` from the response; the previous secret is carried over.
//! A response without an access token (or OAuth 1 pair) fails instead of yielding an empty token.

// self
use crate::{
	_prelude::*,
	auth::{AccessToken, TokenSet},
	config::PROVIDER_PLACEHOLDER,
	error::ConfigError,
	flows::common,
	http::{GatewayHttpClient, TransportErrorMapper},
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
};

impl<C, M> AccessToken<C, M>
where
	C: GatewayHttpClient,
	M: TransportErrorMapper<C::TransportError>,
{
	/// Exchanges the refresh token for a new access token.
	///
	/// Fails with [`ConfigError::MissingRefreshToken`] before any request when no refresh secret
	/// was issued, and with [`ConfigError::UnboundProvider`] when the token path needs a provider
	/// the token was not bound to.
	pub async fn refresh(&self) -> Result<Self> {
		self.refresh_with(&[]).await
	}

	/// Same as [`refresh`](Self::refresh) with extra token request parameters (`scope`, ...).
	pub async fn refresh_with(&self, extra_params: &[(String, String)]) -> Result<Self> {
		const KIND: FlowKind = FlowKind::Refresh;

		let span = FlowSpan::new(KIND, "refresh");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span
			.instrument(async move {
				let previous = self
					.tokens()
					.refresh_token
					.clone()
					.ok_or(ConfigError::MissingRefreshToken)?;
				let client = self.client();
				let provider = self.provider();

				if provider.is_none() && client.config.token_path.contains(PROVIDER_PLACEHOLDER) {
					return Err(Error::from(ConfigError::UnboundProvider {
						path: client.config.token_path.clone(),
					}));
				}

				let params = common::grant_params(
					&client.config,
					vec![
						("grant_type".into(), "refresh_token".into()),
						("refresh_token".into(), previous.expose().into()),
					],
					extra_params,
				);
				let response = common::request_token(client, provider, &params).await?;
				let payload = common::decode_token_response(&response)?;

				common::require_credentials(&response, &payload)?;

				let mut tokens = TokenSet::from_response(payload, OffsetDateTime::now_utc());

				if tokens.refresh_token.is_none() {
					tokens.refresh_token = Some(previous);
				}

				let refreshed = AccessToken::from_tokens(client.clone(), tokens);

				Ok(match provider {
					Some(provider) => refreshed.with_provider(provider.clone()),
					None => refreshed,
				})
			})
			.await;

		obs::record_result(KIND, &result);

		result
	}
}
