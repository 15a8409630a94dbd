// self
use crate::{
	_prelude::*,
	auth::{ClientId, IdentifierError, TokenSecret},
	config::{
		ClientConfig, DEFAULT_AUTHORIZE_PATH, DEFAULT_MAX_REDIRECTS, DEFAULT_PROFILE_PATH,
		DEFAULT_TOKEN_PATH, PROVIDER_PLACEHOLDER, TokenMethod,
	},
};

/// Errors raised while constructing or validating client configuration.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum ClientConfigError {
	/// Client identifier failed validation.
	#[error("Client identifier is invalid: {0}")]
	InvalidClientId(#[from] IdentifierError),
	/// Required field was not supplied.
	#[error("Missing required `{field}` setting.")]
	Missing {
		/// Name of the missing field.
		field: &'static str,
	},
	/// Site must be an absolute HTTP(S) URL with a host.
	#[error("The site must be an absolute http(s) URL with a host: {url}.")]
	InvalidSite {
		/// Site URL that failed validation.
		url: String,
	},
	/// Paths must be absolute (start with `/`).
	#[error("The {name} path must start with `/`: {path}.")]
	RelativePath {
		/// Which path failed validation.
		name: &'static str,
		/// Offending path.
		path: String,
	},
	/// The profile path cannot address a provider without the placeholder.
	#[error("The profile path must contain `:provider`: {path}.")]
	ProfilePathWithoutPlaceholder {
		/// Offending path.
		path: String,
	},
}

/// Builder for [`ClientConfig`] values.
///
/// Fields left unset fall back to the gateway defaults. The builder is also the
/// deserialization shape of [`ClientConfig`].
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct ClientConfigBuilder {
	/// OAuth client identifier.
	pub client_id: Option<String>,
	/// OAuth client secret.
	pub client_secret: Option<TokenSecret>,
	/// Gateway base URL.
	pub site: Option<Url>,
	/// Authorize path template.
	pub authorize_path: Option<String>,
	/// Token endpoint path.
	pub token_path: Option<String>,
	/// Profile path template.
	pub profile_path: Option<String>,
	/// Callback redirect URI.
	pub redirect_uri: Option<Url>,
	/// Token endpoint HTTP method.
	pub token_method: Option<TokenMethod>,
	/// Redirect budget per request.
	pub max_redirects: Option<u32>,
	/// Default 4xx/5xx handling.
	pub raise_on_error: Option<bool>,
}
impl ClientConfigBuilder {
	/// Creates a builder seeded with the required settings.
	pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>, site: Url) -> Self {
		Self {
			client_id: Some(client_id.into()),
			client_secret: Some(TokenSecret::new(client_secret)),
			site: Some(site),
			..Default::default()
		}
	}

	/// Overrides the authorize path template.
	pub fn authorize_path(mut self, path: impl Into<String>) -> Self {
		self.authorize_path = Some(path.into());

		self
	}

	/// Overrides the token endpoint path.
	pub fn token_path(mut self, path: impl Into<String>) -> Self {
		self.token_path = Some(path.into());

		self
	}

	/// Overrides the profile path template.
	pub fn profile_path(mut self, path: impl Into<String>) -> Self {
		self.profile_path = Some(path.into());

		self
	}

	/// Sets the callback redirect URI.
	pub fn redirect_uri(mut self, url: Url) -> Self {
		self.redirect_uri = Some(url);

		self
	}

	/// Overrides the token endpoint HTTP method.
	pub fn token_method(mut self, method: TokenMethod) -> Self {
		self.token_method = Some(method);

		self
	}

	/// Overrides the per-request redirect budget.
	pub fn max_redirects(mut self, max: u32) -> Self {
		self.max_redirects = Some(max);

		self
	}

	/// Overrides whether 4xx/5xx responses fail by default.
	pub fn raise_on_error(mut self, raise: bool) -> Self {
		self.raise_on_error = Some(raise);

		self
	}

	/// Consumes the builder and validates the resulting configuration.
	pub fn build(self) -> Result<ClientConfig, ClientConfigError> {
		let client_id = self.client_id.ok_or(ClientConfigError::Missing { field: "client_id" })?;
		let site = self.site.ok_or(ClientConfigError::Missing { field: "site" })?;
		let config = ClientConfig {
			client_id: ClientId::new(client_id)?,
			client_secret: self.client_secret.unwrap_or_default(),
			site,
			authorize_path: self.authorize_path.unwrap_or_else(|| DEFAULT_AUTHORIZE_PATH.into()),
			token_path: self.token_path.unwrap_or_else(|| DEFAULT_TOKEN_PATH.into()),
			profile_path: self.profile_path.unwrap_or_else(|| DEFAULT_PROFILE_PATH.into()),
			redirect_uri: self.redirect_uri,
			token_method: self.token_method.unwrap_or_default(),
			max_redirects: self.max_redirects.unwrap_or(DEFAULT_MAX_REDIRECTS),
			raise_on_error: self.raise_on_error.unwrap_or(true),
		};

		config.validate()?;

		Ok(config)
	}
}
impl TryFrom<ClientConfigBuilder> for ClientConfig {
	type Error = ClientConfigError;

	fn try_from(builder: ClientConfigBuilder) -> Result<Self, Self::Error> {
		builder.build()
	}
}

impl ClientConfig {
	fn validate(&self) -> Result<(), ClientConfigError> {
		validate_site(&self.site)?;
		validate_path("authorize", &self.authorize_path)?;
		validate_path("token", &self.token_path)?;
		validate_path("profile", &self.profile_path)?;

		if !self.profile_path.contains(PROVIDER_PLACEHOLDER) {
			return Err(ClientConfigError::ProfilePathWithoutPlaceholder {
				path: self.profile_path.clone(),
			});
		}

		Ok(())
	}
}

fn validate_site(url: &Url) -> Result<(), ClientConfigError> {
	if matches!(url.scheme(), "http" | "https") && url.has_host() && !url.cannot_be_a_base() {
		Ok(())
	} else {
		Err(ClientConfigError::InvalidSite { url: url.to_string() })
	}
}

fn validate_path(name: &'static str, path: &str) -> Result<(), ClientConfigError> {
	if path.starts_with('/') {
		Ok(())
	} else {
		Err(ClientConfigError::RelativePath { name, path: path.to_owned() })
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn site(value: &str) -> Url {
		Url::parse(value).expect("Site fixture should parse.")
	}

	#[test]
	fn builder_applies_overrides() {
		let config = ClientConfig::builder("client", "secret", site("https://oauth.example.com"))
			.authorize_path("/oauth/:provider/authorize")
			.token_method(TokenMethod::Get)
			.max_redirects(1)
			.raise_on_error(false)
			.redirect_uri(site("https://app.example.com/callback"))
			.build()
			.expect("Overridden configuration should validate.");

		assert_eq!(config.authorize_path, "/oauth/:provider/authorize");
		assert_eq!(config.token_method, TokenMethod::Get);
		assert_eq!(config.max_redirects, 1);
		assert!(!config.raise_on_error);
		assert_eq!(config.client_secret.expose(), "secret");
	}

	#[test]
	fn builder_rejects_invalid_settings() {
		let err = ClientConfig::builder("client", "secret", site("ftp://oauth.example.com"))
			.build()
			.expect_err("Non-HTTP sites must be rejected.");

		assert!(matches!(err, ClientConfigError::InvalidSite { .. }));

		let err = ClientConfig::builder("client", "secret", site("https://oauth.example.com"))
			.token_path("auth/access_token")
			.build()
			.expect_err("Relative paths must be rejected.");

		assert!(matches!(err, ClientConfigError::RelativePath { name: "token", .. }));

		let err = ClientConfig::builder("client", "secret", site("https://oauth.example.com"))
			.profile_path("/me")
			.build()
			.expect_err("Profile path without placeholder must be rejected.");

		assert!(matches!(err, ClientConfigError::ProfilePathWithoutPlaceholder { .. }));

		let err = ClientConfig::builder("bad id", "secret", site("https://oauth.example.com"))
			.build()
			.expect_err("Whitespace client ids must be rejected.");

		assert!(matches!(err, ClientConfigError::InvalidClientId(_)));
	}

	#[test]
	fn deserialization_validates_through_builder() {
		let config: ClientConfig = serde_json::from_str(
			r#"{"client_id":"client","client_secret":"secret","site":"https://oauth.example.com","token_method":"GET"}"#,
		)
		.expect("Minimal JSON configuration should load.");

		assert_eq!(config.token_method, TokenMethod::Get);
		assert_eq!(config.max_redirects, 5);

		let err = serde_json::from_str::<ClientConfig>(r#"{"client_secret":"secret"}"#)
			.expect_err("Missing client id must fail.");

		assert!(err.to_string().contains("client_id"));

		let round_trip: ClientConfig = serde_json::from_str(
			&serde_json::to_string(&config).expect("Configuration should serialize."),
		)
		.expect("Serialized configuration should load again.");

		assert_eq!(round_trip, config);
	}
}
