//! Host-side callback handling.
//!
//! A host drives the gateway in two phases. The request phase redirects the user agent to
//! [`AuthorizationSession::authorize_url`]. The callback phase receives `code` and `state` on the
//! redirect URI and calls [`Client::complete_authorization`], which exchanges the code,
//! fetches the profile once, and returns the [`CanonicalIdentity`].

// self
use crate::{
	_prelude::*,
	auth::{AccessToken, AuthorizationSession, ProviderId},
	client::Client,
	http::{GatewayHttpClient, TransportErrorMapper},
	identity::{CanonicalIdentity, IdentitySession},
};

/// Parameters delivered to the redirect URI.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizationCallback {
	/// Authorization code.
	pub code: String,
	/// Returned CSRF state, when present.
	#[serde(default)]
	pub state: Option<String>,
}
impl AuthorizationCallback {
	/// Creates a callback from already extracted values.
	pub fn new(code: impl Into<String>, state: Option<String>) -> Self {
		Self { code: code.into(), state }
	}

	/// Reads `code` and `state` from the redirect URI's query.
	pub fn from_url(url: &Url) -> Result<Self> {
		let mut code = None;
		let mut state = None;

		for (key, value) in url.query_pairs() {
			match key.as_ref() {
				"code" if code.is_none() => code = Some(value.into_owned()),
				"state" if state.is_none() => state = Some(value.into_owned()),
				_ => {},
			}
		}

		let code = code
			.filter(|code| !code.is_empty())
			.ok_or_else(|| Error::MissingField { field: "code".into() })?;

		Ok(Self { code, state })
	}
}

impl<C, M> Client<C, M>
where
	C: GatewayHttpClient,
	M: TransportErrorMapper<C::TransportError>,
{
	/// Opens an identity session using the normalizer registered for `provider`.
	pub fn identity_session(
		&self,
		provider: ProviderId,
		token: AccessToken<C, M>,
	) -> IdentitySession<C, M> {
		let normalizer = self.normalizers.resolve(&provider);

		IdentitySession::new(provider, token, normalizer)
	}

	/// Runs the callback phase end to end: exchange, profile fetch, normalization.
	pub async fn complete_authorization(
		&self,
		session: AuthorizationSession,
		callback: &AuthorizationCallback,
	) -> Result<CanonicalIdentity> {
		let provider = session.provider.clone();
		let token = self.exchange_callback(session, callback, &[]).await?;

		self.identity_session(provider, token).identity().await
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn callback_reads_code_and_state() {
		let url = Url::parse("https://app.example.com/cb?code=abc&state=xyz&code=ignored")
			.expect("Callback URL fixture should parse.");

		assert_eq!(
			AuthorizationCallback::from_url(&url).expect("Callback should parse."),
			AuthorizationCallback::new("abc", Some("xyz".into()))
		);
	}

	#[test]
	fn callback_without_code_is_rejected() {
		let url = Url::parse("https://app.example.com/cb?state=xyz&code=")
			.expect("Callback URL fixture should parse.");
		let err = AuthorizationCallback::from_url(&url).expect_err("Empty code should fail.");

		assert!(matches!(err, Error::MissingField { ref field } if field == "code"));
	}
}
