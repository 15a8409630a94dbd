//! Credentials block attached to canonical identities.

// self
use crate::{
	_prelude::*,
	auth::{TokenSecret, TokenSet},
};

/// Credentials derived solely from an access token.
///
/// Emission rules: the OAuth 1.0a pair is present only when both halves are non-empty;
/// `refresh_token` and `expires_at` are present only when the token is expiring.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Credentials {
	/// Bearer token, when non-empty.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub token: Option<TokenSecret>,
	/// OAuth 1.0a token pair, flattened into the block.
	#[serde(flatten)]
	pub oauth1: Option<OAuth1Credentials>,
	/// Refresh secret of an expiring token.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub refresh_token: Option<TokenSecret>,
	/// Expiry instant (unix seconds) of an expiring token.
	#[serde(skip_serializing_if = "Option::is_none", with = "time::serde::timestamp::option")]
	pub expires_at: Option<OffsetDateTime>,
	/// Whether the token expires.
	pub expires: bool,
}
impl From<&TokenSet> for Credentials {
	fn from(tokens: &TokenSet) -> Self {
		let expires = tokens.is_expiring();
		let oauth1 = match (tokens.oauth_token.non_empty(), tokens.oauth_token_secret.non_empty()) {
			(Some(oauth_token), Some(oauth_token_secret)) => Some(OAuth1Credentials {
				oauth_token: oauth_token.into(),
				oauth_token_secret: oauth_token_secret.into(),
			}),
			_ => None,
		};

		Self {
			token: tokens.token.non_empty().map(TokenSecret::from),
			oauth1,
			refresh_token: tokens.refresh_token.clone().filter(|_| expires),
			expires_at: tokens.expires_at.filter(|_| expires),
			expires,
		}
	}
}

/// OAuth 1.0a token pair; never emitted half-filled.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct OAuth1Credentials {
	/// OAuth 1.0a token.
	pub oauth_token: TokenSecret,
	/// OAuth 1.0a token secret.
	pub oauth_token_secret: TokenSecret,
}
