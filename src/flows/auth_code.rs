//! Authorization Code exchange.
//!
//! [`Client::exchange_authorization_code`] submits the code and client credentials to the token
//! endpoint, checks the returned `state` against the expected CSRF token, and only then builds
//! an [`AccessToken`]. Each exchange walks the [`ExchangeStage`] machine; transitions are traced
//! and counted through [`obs`].

// self
use crate::{
	_prelude::*,
	auth::{AccessToken, AuthorizationSession, ProviderId, TokenSet, state},
	client::Client,
	config::ClientConfig,
	flows::{AuthorizationCallback, common},
	http::{GatewayHttpClient, TransportErrorMapper},
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
};

const KIND: FlowKind = FlowKind::AuthorizationCode;

/// Lifecycle of a single code exchange.
///
/// `Unstarted → ParamsBuilt → RequestSent → Validated → TokenConstructed` is the success path;
/// `ValidationFailed`, `TransportFailed`, and `ProviderErrorReturned` are terminal failures.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ExchangeStage {
	/// Nothing happened yet.
	#[default]
	Unstarted,
	/// Token request parameters are assembled.
	ParamsBuilt,
	/// The token request is in flight.
	RequestSent,
	/// Returned state matched the expected CSRF token.
	Validated,
	/// Access token built.
	TokenConstructed,
	/// State mismatch or an undecodable response.
	ValidationFailed,
	/// The request never produced a response.
	TransportFailed,
	/// The gateway answered with a provider error.
	ProviderErrorReturned,
}
impl ExchangeStage {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Unstarted => "unstarted",
			Self::ParamsBuilt => "params_built",
			Self::RequestSent => "request_sent",
			Self::Validated => "validated",
			Self::TokenConstructed => "token_constructed",
			Self::ValidationFailed => "validation_failed",
			Self::TransportFailed => "transport_failed",
			Self::ProviderErrorReturned => "provider_error_returned",
		}
	}

	/// Returns `true` for stages with no outgoing transition.
	pub const fn is_terminal(self) -> bool {
		matches!(
			self,
			Self::TokenConstructed
				| Self::ValidationFailed
				| Self::TransportFailed
				| Self::ProviderErrorReturned
		)
	}

	/// Returns `true` when `next` is a legal successor.
	pub const fn can_advance_to(self, next: Self) -> bool {
		matches!(
			(self, next),
			(Self::Unstarted, Self::ParamsBuilt | Self::ValidationFailed)
				| (Self::ParamsBuilt, Self::RequestSent)
				| (
					Self::RequestSent,
					Self::Validated
						| Self::ValidationFailed
						| Self::TransportFailed
						| Self::ProviderErrorReturned
				)
				| (Self::Validated, Self::TokenConstructed)
		)
	}

	/// Terminal stage reached when a sent request fails with `error`.
	pub fn for_error(error: &Error) -> Self {
		match error {
			Error::Transport(_) | Error::Config(_) => Self::TransportFailed,
			Error::Provider(_) | Error::UnhandledStatus { .. } => Self::ProviderErrorReturned,
			Error::Decode(_) | Error::CsrfValidation { .. } | Error::MissingField { .. } => {
				Self::ValidationFailed
			},
		}
	}
}
impl Display for ExchangeStage {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

#[derive(Debug, Default)]
struct StageTracker {
	stage: ExchangeStage,
}
impl StageTracker {
	fn advance(&mut self, next: ExchangeStage) {
		debug_assert!(
			self.stage.can_advance_to(next),
			"illegal stage transition {} -> {next}",
			self.stage
		);

		obs::trace_stage(KIND, self.stage.as_str(), next.as_str());
		obs::record_stage_metric(next.as_str());

		self.stage = next;
	}

	fn fail(&mut self, error: Error) -> Error {
		self.advance(ExchangeStage::for_error(&error));

		error
	}
}

impl<C, M> Client<C, M>
where
	C: GatewayHttpClient,
	M: TransportErrorMapper<C::TransportError>,
{
	/// Exchanges an authorization code for an [`AccessToken`].
	///
	/// `csrf_state` is the `state` received on the callback and `expected_state` the value issued
	/// with the authorize URL. Both the callback state and the state echoed by the token endpoint
	/// must equal `expected_state`; otherwise the exchange fails with
	/// [`Error::CsrfValidation`] and no token is built. Provider errors are always raised.
	pub async fn exchange_authorization_code(
		&self,
		provider: &ProviderId,
		code: &str,
		csrf_state: Option<&str>,
		expected_state: &str,
		extra_params: &[(String, String)],
	) -> Result<AccessToken<C, M>> {
		let span = FlowSpan::new(KIND, "exchange_authorization_code");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span
			.instrument(async move {
				let mut stages = StageTracker::default();

				state::validate_state(expected_state, csrf_state).map_err(|e| stages.fail(e))?;

				let params = authorization_code_params(&self.config, code, extra_params);

				stages.advance(ExchangeStage::ParamsBuilt);
				stages.advance(ExchangeStage::RequestSent);

				let response = common::request_token(self, Some(provider), &params)
					.await
					.map_err(|e| stages.fail(e))?;
				let payload = common::decode_token_response(&response).map_err(|e| stages.fail(e))?;

				state::validate_state(expected_state, payload.state.as_deref())
					.map_err(|e| stages.fail(e))?;
				common::require_credentials(&response, &payload).map_err(|e| stages.fail(e))?;
				stages.advance(ExchangeStage::Validated);

				let tokens = TokenSet::from_response(payload, OffsetDateTime::now_utc());

				stages.advance(ExchangeStage::TokenConstructed);

				Ok(AccessToken::from_tokens(self.clone(), tokens).with_provider(provider.clone()))
			})
			.await;

		obs::record_result(KIND, &result);

		result
	}

	/// Exchanges the code carried by `callback`, consuming the pending `session` so its state is
	/// validated exactly once.
	pub async fn exchange_callback(
		&self,
		session: AuthorizationSession,
		callback: &AuthorizationCallback,
		extra_params: &[(String, String)],
	) -> Result<AccessToken<C, M>> {
		self.exchange_authorization_code(
			&session.provider,
			&callback.code,
			callback.state.as_deref(),
			&session.state,
			extra_params,
		)
		.await
	}
}

fn authorization_code_params(
	config: &ClientConfig,
	code: &str,
	extra_params: &[(String, String)],
) -> Vec<(String, String)> {
	let mut grant =
		vec![("grant_type".into(), "authorization_code".into()), ("code".into(), code.into())];

	if let Some(redirect_uri) = &config.redirect_uri {
		grant.push(("redirect_uri".into(), redirect_uri.as_str().into()));
	}

	common::grant_params(config, grant, extra_params)
}
