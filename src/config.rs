//! Client configuration: gateway site, endpoint templates, and pipeline defaults.
//!
//! [`ClientConfig`] is immutable once built and is shared (behind an `Arc`) by every exchange
//! a [`Client`](crate::client::Client) runs, so concurrent logins read it without locking.
//! Deserialization goes through [`ClientConfigBuilder`], which means configuration loaded from
//! files is validated exactly like configuration assembled in code.

/// Builder API for assembling client configuration.
pub mod builder;

pub use builder::*;

// self
use crate::{
	_prelude::*,
	auth::{ClientId, ProviderId, TokenSecret},
};

/// Placeholder substituted with the provider name inside path templates.
pub const PROVIDER_PLACEHOLDER: &str = ":provider";
/// Default authorize path template.
pub const DEFAULT_AUTHORIZE_PATH: &str = "/auth/:provider";
/// Default token endpoint path.
pub const DEFAULT_TOKEN_PATH: &str = "/auth/access_token";
/// Default profile path template.
pub const DEFAULT_PROFILE_PATH: &str = "/auth/:provider/me";
/// Default redirect budget for a single request.
pub const DEFAULT_MAX_REDIRECTS: u32 = 5;

/// HTTP method used to call the token endpoint.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TokenMethod {
	/// Parameters travel as a form-encoded body.
	#[default]
	Post,
	/// Parameters travel as query parameters.
	Get,
}
impl TokenMethod {
	/// Returns the HTTP verb label.
	pub const fn as_str(self) -> &'static str {
		match self {
			TokenMethod::Post => "POST",
			TokenMethod::Get => "GET",
		}
	}
}
impl Display for TokenMethod {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Validated, immutable client configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ClientConfigBuilder")]
pub struct ClientConfig {
	/// OAuth client identifier.
	pub client_id: ClientId,
	/// OAuth client secret; redacted in debug output.
	pub client_secret: TokenSecret,
	/// Absolute base URL of the gateway.
	pub site: Url,
	/// Authorize path template (may contain `:provider`).
	pub authorize_path: String,
	/// Token endpoint path.
	pub token_path: String,
	/// Profile path template (must contain `:provider`).
	pub profile_path: String,
	/// Redirect URI registered for the callback, sent with authorize and token requests.
	pub redirect_uri: Option<Url>,
	/// HTTP method for token requests.
	pub token_method: TokenMethod,
	/// Redirect budget per pipeline request.
	pub max_redirects: u32,
	/// Whether 4xx/5xx responses fail the request unless a request overrides it.
	pub raise_on_error: bool,
}
impl ClientConfig {
	/// Creates a builder seeded with the client credentials and gateway site.
	pub fn builder(
		client_id: impl Into<String>,
		client_secret: impl Into<String>,
		site: Url,
	) -> ClientConfigBuilder {
		ClientConfigBuilder::new(client_id, client_secret, site)
	}

	/// Substitutes `provider` into a path template.
	pub fn expand_path(template: &str, provider: Option<&ProviderId>) -> String {
		match provider {
			Some(provider) => template.replace(PROVIDER_PLACEHOLDER, provider.as_str()),
			None => template.to_owned(),
		}
	}

	/// Resolves a path (or absolute URL) against the configured site.
	pub fn resolve(&self, path: &str) -> Result<Url, url::ParseError> {
		self.site.join(path)
	}
}
