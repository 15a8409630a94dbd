//! Shared helpers for token endpoint calls.

// self
use crate::{
	_prelude::*,
	auth::{ProviderId, token::access::TokenEndpointResponse},
	client::Client,
	config::{ClientConfig, TokenMethod},
	http::{GatewayHttpClient, TransportErrorMapper},
	pipeline::{Method, ProviderResponse, RequestOptions},
};

/// Sends `params` to the token endpoint using the configured token method.
///
/// Token requests always raise provider errors; a failed exchange never yields a token.
pub(crate) async fn request_token<C, M>(
	client: &Client<C, M>,
	provider: Option<&ProviderId>,
	params: &[(String, String)],
) -> Result<ProviderResponse>
where
	C: GatewayHttpClient,
	M: TransportErrorMapper<C::TransportError>,
{
	let mut options = RequestOptions::new().raise_on_error(true);

	if let Some(provider) = provider {
		options = options.provider(provider.clone());
	}

	let (method, options) = match client.config.token_method {
		TokenMethod::Post => (Method::POST, options.form(params)),
		TokenMethod::Get => (Method::GET, options.params(params.iter().cloned())),
	};

	client.request(method, &client.config.token_path, options).await
}

/// Decodes a token endpoint body; an empty body decodes as an empty payload.
pub(crate) fn decode_token_response(response: &ProviderResponse) -> Result<TokenEndpointResponse> {
	if response.body.is_null() {
		return Ok(TokenEndpointResponse::default());
	}

	response.decode()
}

/// Rejects token responses that carry no usable credentials.
///
/// An unresolved redirect (the budget ran out on the token endpoint) never counts as a token.
pub(crate) fn require_credentials(
	response: &ProviderResponse,
	payload: &TokenEndpointResponse,
) -> Result<()> {
	if response.is_redirect() || !payload.has_credentials() {
		return Err(Error::MissingField { field: "access_token".into() });
	}

	Ok(())
}

/// Builds the grant parameters shared by every token request, followed by `extra_params`.
pub(crate) fn grant_params(
	config: &ClientConfig,
	grant: Vec<(String, String)>,
	extra_params: &[(String, String)],
) -> Vec<(String, String)> {
	let mut params = grant;

	params.push(("client_id".into(), config.client_id.as_str().into()));
	params.push(("client_secret".into(), config.client_secret.expose().into()));
	merge_params(&mut params, extra_params);

	params
}

/// Appends `extra` to `params`; a key already present is overwritten in place.
pub(crate) fn merge_params(params: &mut Vec<(String, String)>, extra: &[(String, String)]) {
	for (key, value) in extra {
		match params.iter_mut().find(|(existing, _)| existing == key) {
			Some((_, slot)) => slot.clone_from(value),
			None => params.push((key.clone(), value.clone())),
		}
	}
}
