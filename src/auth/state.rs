//! Pending authorization state: the CSRF token issued with an authorize URL.

// crates.io
use rand::{Rng, distr::Alphanumeric};
// self
use crate::{_prelude::*, auth::ProviderId};

const STATE_LEN: usize = 32;

/// Authorization attempt created by [`Client::start_authorization`](crate::client::Client::start_authorization).
///
/// The caller keeps the session (typically in its own session store) until the gateway redirects
/// back, then hands it to the exchange, which consumes it so the state is validated exactly once.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizationSession {
	/// Provider the user is being sent to.
	pub provider: ProviderId,
	/// Opaque CSRF state that must round-trip through the gateway.
	pub state: String,
	/// Fully-formed authorize URL to redirect the user agent to.
	pub authorize_url: Url,
}
impl AuthorizationSession {
	/// Wraps an already generated state and authorize URL.
	pub fn new(provider: ProviderId, state: impl Into<String>, authorize_url: Url) -> Self {
		Self { provider, state: state.into(), authorize_url }
	}

	/// Generates a fresh random state value.
	pub fn generate_state() -> String {
		rand::rng().sample_iter(Alphanumeric).take(STATE_LEN).map(char::from).collect()
	}

	/// Validates a `state` value returned by the gateway.
	pub fn validate_state(&self, returned_state: &str) -> Result<()> {
		validate_state(&self.state, Some(returned_state))
	}
}

/// Compares a returned state against the expected one; a missing state never matches.
pub(crate) fn validate_state(expected: &str, returned: Option<&str>) -> Result<()> {
	match returned {
		Some(returned) if !expected.is_empty() && returned == expected => Ok(()),
		_ => Err(Error::CsrfValidation { received: returned.map(str::to_owned) }),
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn session() -> AuthorizationSession {
		AuthorizationSession::new(
			ProviderId::new("github").expect("Provider fixture should be valid."),
			"expected",
			Url::parse("https://gateway.example.com/auth/github?state=expected")
				.expect("Authorize URL fixture should parse."),
		)
	}

	#[test]
	fn state_validation_errors_on_mismatch() {
		let session = session();

		assert!(session.validate_state("expected").is_ok());

		let err = session.validate_state("other").expect_err("State mismatch should fail.");

		assert!(matches!(err, Error::CsrfValidation { received: Some(ref s) } if s == "other"));
	}

	#[test]
	fn missing_or_empty_states_never_match() {
		assert!(validate_state("expected", None).is_err());
		assert!(validate_state("", Some("")).is_err());
	}

	#[test]
	fn generated_states_are_alphanumeric_and_unique() {
		let first = AuthorizationSession::generate_state();
		let second = AuthorizationSession::generate_state();

		assert_eq!(first.len(), STATE_LEN);
		assert!(first.chars().all(|ch| ch.is_ascii_alphanumeric()));
		assert_ne!(first, second);
	}
}
