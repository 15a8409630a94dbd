//! Structured 4xx/5xx failures returned by the gateway.

// self
use crate::_prelude::*;

const BODY_PREVIEW_LIMIT: usize = 256;

/// Coarse classification of a [`ProviderError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProviderErrorKind {
	/// Provider rejected the authorization grant (bad or reused code, stale refresh token).
	InvalidGrant,
	/// Client authentication failed.
	InvalidClient,
	/// Requested scopes exceed what the token covers.
	InsufficientScope,
	/// Failure looks temporary; the caller decides whether to retry.
	Transient,
}

/// Error built from a 4xx/5xx gateway response.
///
/// The decoded body is kept whole so callers that opted out of raising (see
/// [`RequestOptions::raise_on_error`](crate::pipeline::RequestOptions::raise_on_error)) can
/// inspect provider-specific fields.
#[derive(Clone, Debug, ThisError)]
#[error("Gateway returned HTTP {status}: {summary}.")]
pub struct ProviderError {
	/// HTTP status code.
	pub status: u16,
	/// Decoded response body (`Null` when empty).
	pub body: Value,
	/// OAuth `error` code, when the body carried one.
	pub oauth_error: Option<String>,
	/// OAuth `error_description`, when the body carried one.
	pub error_description: Option<String>,
	/// `Retry-After` hint supplied by the gateway.
	pub retry_after: Option<Duration>,
	summary: String,
}
impl ProviderError {
	/// Builds an error from a response status, its decoded body, and an optional retry hint.
	pub fn new(status: u16, body: Value, retry_after: Option<Duration>) -> Self {
		let oauth_error = string_field(&body, "error");
		let error_description = string_field(&body, "error_description");
		let summary = match (&oauth_error, &error_description) {
			(_, Some(description)) => description.clone(),
			(Some(code), None) => code.clone(),
			(None, None) if body.is_null() => "empty body".into(),
			(None, None) => truncate_preview(body.to_string()),
		};

		Self { status, body, oauth_error, error_description, retry_after, summary }
	}

	/// Classifies the failure, preferring OAuth fields, then body hints, then the status code.
	pub fn kind(&self) -> ProviderErrorKind {
		classify_oauth_error(self.oauth_error.as_deref(), self.error_description.as_deref())
			.or_else(|| classify_body(Some(&self.summary)))
			.unwrap_or_else(|| classify_status(self.status))
	}
}

fn string_field(body: &Value, key: &str) -> Option<String> {
	match body.get(key)? {
		Value::String(s) if !s.is_empty() => Some(s.clone()),
		_ => None,
	}
}

fn truncate_preview(body: String) -> String {
	if body.chars().count() <= BODY_PREVIEW_LIMIT {
		return body;
	}

	let mut buf = body.chars().take(BODY_PREVIEW_LIMIT).collect::<String>();

	buf.push('…');

	buf
}

fn classify_oauth_error(
	oauth_error: Option<&str>,
	error_description: Option<&str>,
) -> Option<ProviderErrorKind> {
	oauth_error
		.and_then(match_exact_value)
		.or_else(|| error_description.and_then(match_exact_value))
		.or_else(|| classify_body(error_description))
}

fn match_exact_value(value: &str) -> Option<ProviderErrorKind> {
	if value.eq_ignore_ascii_case("invalid_grant") || value.eq_ignore_ascii_case("access_denied") {
		Some(ProviderErrorKind::InvalidGrant)
	} else if value.eq_ignore_ascii_case("invalid_client")
		|| value.eq_ignore_ascii_case("unauthorized_client")
	{
		Some(ProviderErrorKind::InvalidClient)
	} else if value.eq_ignore_ascii_case("invalid_scope")
		|| value.eq_ignore_ascii_case("insufficient_scope")
	{
		Some(ProviderErrorKind::InsufficientScope)
	} else if value.eq_ignore_ascii_case("temporarily_unavailable")
		|| value.eq_ignore_ascii_case("server_error")
	{
		Some(ProviderErrorKind::Transient)
	} else {
		None
	}
}

fn classify_body(body: Option<&str>) -> Option<ProviderErrorKind> {
	let lowered = body?.to_ascii_lowercase();

	match lowered.as_str() {
		text if text.contains("invalid_grant") => Some(ProviderErrorKind::InvalidGrant),
		text if text.contains("invalid_client") => Some(ProviderErrorKind::InvalidClient),
		text if text.contains("insufficient_scope") || text.contains("invalid_scope") =>
			Some(ProviderErrorKind::InsufficientScope),
		text if text.contains("temporarily_unavailable") => Some(ProviderErrorKind::Transient),
		_ => None,
	}
}

fn classify_status(status: u16) -> ProviderErrorKind {
	match status {
		400 | 404 | 410 => ProviderErrorKind::InvalidGrant,
		401 => ProviderErrorKind::InvalidClient,
		403 => ProviderErrorKind::InsufficientScope,
		_ => ProviderErrorKind::Transient,
	}
}
