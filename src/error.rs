//! Gateway-level error types shared by the pipeline, flows, and normalizers.

mod provider;

pub use provider::*;

// self
use crate::{_prelude::*, auth::IdentifierError, config::ClientConfigError};

/// Gateway-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical gateway error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration or request-construction problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Transport failure (DNS, TCP, TLS). Never retried by the crate.
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// Response body could not be decoded.
	#[error(transparent)]
	Decode(#[from] DecodeError),
	/// Gateway answered with a 4xx/5xx status.
	#[error(transparent)]
	Provider(#[from] ProviderError),

	/// Gateway answered with a status outside every handled range.
	#[error("Gateway returned an unhandled HTTP status {status}.")]
	UnhandledStatus {
		/// Raw HTTP status code.
		status: u16,
	},
	/// Returned `state` does not match the value issued with the authorize URL.
	#[error("Authorization state does not match the expected CSRF token.")]
	CsrfValidation {
		/// State value observed on the callback or token response, if any.
		received: Option<String>,
	},
	/// Gateway payload (token, profile, or callback) lacks a required field.
	#[error("Gateway payload is missing the `{field}` field.")]
	MissingField {
		/// Dotted path of the missing field.
		field: String,
	},
}
impl Error {
	/// Returns the embedded [`ProviderError`] when the failure came from a 4xx/5xx response.
	pub fn as_provider_error(&self) -> Option<&ProviderError> {
		match self {
			Self::Provider(err) => Some(err),
			_ => None,
		}
	}
}
impl From<IdentifierError> for Error {
	fn from(e: IdentifierError) -> Self {
		ConfigError::from(e).into()
	}
}
impl From<ClientConfigError> for Error {
	fn from(e: ClientConfigError) -> Self {
		ConfigError::from(e).into()
	}
}

/// Configuration and request-construction failures.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// HTTP request construction failed.
	#[error(transparent)]
	HttpRequest(#[from] oauth2::http::Error),
	/// A request path or redirect target does not form a valid URL.
	#[error("Unable to build a URL from `{input}`.")]
	InvalidUrl {
		/// Path or URL that failed to resolve.
		input: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Client configuration failed validation.
	#[error(transparent)]
	InvalidConfig(#[from] ClientConfigError),
	/// Provider or client identifier failed validation.
	#[error(transparent)]
	InvalidIdentifier(#[from] IdentifierError),
	/// Refresh was requested for a token that carries no refresh secret.
	#[error("Access token is missing a refresh token.")]
	MissingRefreshToken,
	/// A `:provider` path was requested without a provider to substitute.
	#[error("Path `{path}` needs a provider, but none is bound.")]
	UnboundProvider {
		/// Path template containing the placeholder.
		path: String,
	},
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Transport-level failures (network, IO).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the gateway.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the gateway.")]
	Io(#[from] std::io::Error),
	/// Transport failed without a structured error.
	#[error("HTTP client error occurred while calling the gateway: {message}.")]
	Other {
		/// Transport-supplied description.
		message: String,
	},
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}

/// Response body did not decode into the expected JSON shape.
#[derive(Debug, ThisError)]
#[error("Gateway returned a body that failed to decode at `{}`.", .source.path())]
pub struct DecodeError {
	/// Structured parsing failure, including the JSON path that failed.
	#[source]
	pub source: serde_path_to_error::Error<serde_json::Error>,
	/// HTTP status of the offending response, when known.
	pub status: Option<u16>,
}
