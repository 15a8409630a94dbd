//! Redirect-aware request pipeline shared by token, refresh, and profile requests.
//!
//! [`Client::request`] resolves a path against the configured site, dispatches it through the
//! client's transport, decodes the JSON body, and classifies the status:
//!
//! - `301`, `302`, `303`, `307` follow `Location` until the redirect budget
//!   ([`ClientConfig::max_redirects`](crate::config::ClientConfig::max_redirects)) is spent. The
//!   redirect that exceeds the budget is returned as-is, not raised. `303` switches to `GET` and
//!   drops the body; the other redirects replay the original method and body. Credentials
//!   (`Authorization`, `Cookie`, ...) are stripped when a redirect leaves the current origin.
//! - Other `2xx`/`3xx` statuses are successes.
//! - `4xx`/`5xx` (except `499`) build a [`ProviderError`] that is raised or embedded in the
//!   response depending on [`RequestOptions::raise_on_error`].
//! - Everything else, `499` included, fails with [`Error::UnhandledStatus`].
//!
//! The pipeline never retries a failed request.

pub use oauth2::http::Method;

// crates.io
use oauth2::{
	AsyncHttpClient, HttpRequest, HttpResponse,
	http::header::{
		ACCEPT, AUTHORIZATION, CONTENT_LENGTH, CONTENT_TYPE, COOKIE, HeaderMap, HeaderName,
		PROXY_AUTHORIZATION, RETRY_AFTER, WWW_AUTHENTICATE,
	},
};
use serde::de::DeserializeOwned;
use time::format_description::well_known::Rfc2822;
// self
use crate::{
	_prelude::*,
	auth::ProviderId,
	client::Client,
	config::ClientConfig,
	error::{ConfigError, DecodeError, ProviderError},
	http::{GatewayHttpClient, TransportErrorMapper},
	obs,
};

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";
// Never forwarded to another origin.
const SENSITIVE_HEADERS: [HeaderName; 4] =
	[AUTHORIZATION, COOKIE, PROXY_AUTHORIZATION, WWW_AUTHENTICATE];

/// Status classification applied to every pipeline response.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatusClass {
	/// `301`, `302`, `303`, `307`.
	Redirect,
	/// `200..=299` and the non-redirecting `300..=399` statuses.
	Success,
	/// `400..=598` except `499`, and `599`.
	ProviderError,
	/// Anything else (informational codes, `499`, out-of-range values).
	Unhandled,
}
impl StatusClass {
	/// Classifies a raw HTTP status code.
	pub const fn of(status: u16) -> Self {
		match status {
			301 | 302 | 303 | 307 => Self::Redirect,
			200..=399 => Self::Success,
			499 => Self::Unhandled,
			400..=599 => Self::ProviderError,
			_ => Self::Unhandled,
		}
	}
}

/// Per-request options accepted by [`Client::request`].
#[derive(Clone, Debug, Default)]
pub struct RequestOptions {
	/// Provider substituted for `:provider` in the path.
	pub provider: Option<ProviderId>,
	/// Query parameters appended to the resolved URL.
	pub params: Vec<(String, String)>,
	/// Raw request body.
	pub body: Option<Vec<u8>>,
	/// Extra request headers.
	pub headers: Vec<(String, String)>,
	/// Overrides the client-level `raise_on_error` for this request.
	pub raise_on_error: Option<bool>,
}
impl RequestOptions {
	/// Creates empty options.
	pub fn new() -> Self {
		Self::default()
	}

	/// Sets the provider substituted for `:provider`.
	pub fn provider(mut self, provider: ProviderId) -> Self {
		self.provider = Some(provider);

		self
	}

	/// Appends a query parameter.
	pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
		self.params.push((key.into(), value.into()));

		self
	}

	/// Appends several query parameters.
	pub fn params<I, K, V>(mut self, params: I) -> Self
	where
		I: IntoIterator<Item = (K, V)>,
		K: Into<String>,
		V: Into<String>,
	{
		self.params.extend(params.into_iter().map(|(k, v)| (k.into(), v.into())));

		self
	}

	/// Sets a raw body.
	pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
		self.body = Some(body.into());

		self
	}

	/// Sets a form-encoded body and the matching `Content-Type`.
	pub fn form<'a, I>(mut self, pairs: I) -> Self
	where
		I: IntoIterator<Item = &'a (String, String)>,
	{
		let encoded = url::form_urlencoded::Serializer::new(String::new())
			.extend_pairs(pairs.into_iter().map(|(k, v)| (k.as_str(), v.as_str())))
			.finish();

		self.body = Some(encoded.into_bytes());

		self.header(CONTENT_TYPE.as_str(), FORM_CONTENT_TYPE)
	}

	/// Appends a request header.
	pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.headers.push((name.into(), value.into()));

		self
	}

	/// Chooses between raising (`true`) and embedding (`false`) 4xx/5xx errors.
	pub fn raise_on_error(mut self, raise: bool) -> Self {
		self.raise_on_error = Some(raise);

		self
	}
}

/// Normalized pipeline response with uniform access to status, headers, and decoded body.
#[derive(Clone, Debug)]
pub struct ProviderResponse {
	/// HTTP status code.
	pub status: u16,
	/// Response headers keyed by lowercase name; repeated headers are comma-joined.
	pub headers: BTreeMap<String, String>,
	/// Decoded JSON body (`Null` for empty bodies).
	pub body: Value,
	/// URL that produced this response (after any redirects).
	pub url: Url,
	/// Number of redirects followed before this response was produced.
	pub redirects: u32,
	/// Provider error embedded when the request opted out of raising.
	pub error: Option<ProviderError>,
}
impl ProviderResponse {
	/// Returns the status classification.
	pub fn class(&self) -> StatusClass {
		StatusClass::of(self.status)
	}

	/// Returns `true` for an unresolved redirect (the budget ran out).
	pub fn is_redirect(&self) -> bool {
		self.class() == StatusClass::Redirect
	}

	/// Looks up a header by case-insensitive name.
	pub fn header(&self, name: &str) -> Option<&str> {
		self.headers.get(&name.to_ascii_lowercase()).map(String::as_str)
	}

	/// Returns the top-level `data` object, if present.
	pub fn data(&self) -> Option<&Map<String, Value>> {
		self.body.get("data").and_then(Value::as_object)
	}

	/// Decodes the body into a typed value.
	pub fn decode<T>(&self) -> Result<T>
	where
		T: DeserializeOwned,
	{
		serde_path_to_error::deserialize(self.body.clone())
			.map_err(|source| DecodeError { source, status: Some(self.status) }.into())
	}

	/// Turns an embedded provider error back into `Err`.
	pub fn into_result(mut self) -> Result<Self> {
		match self.error.take() {
			Some(err) => Err(err.into()),
			None => Ok(self),
		}
	}
}

impl<C, M> Client<C, M>
where
	C: GatewayHttpClient,
	M: TransportErrorMapper<C::TransportError>,
{
	/// Issues a request through the pipeline.
	///
	/// `path` is resolved against the configured site (absolute URLs are used as-is) after
	/// `:provider` substitution.
	pub async fn request(
		&self,
		method: Method,
		path: &str,
		options: RequestOptions,
	) -> Result<ProviderResponse> {
		let RequestOptions { provider, params, mut body, mut headers, raise_on_error } = options;
		let raise = raise_on_error.unwrap_or(self.config.raise_on_error);
		let max_redirects = self.config.max_redirects;
		let mut url = resolve_url(&self.config, path, provider.as_ref(), &params)?;
		let mut method = method;
		let mut redirects = 0_u32;
		let handle = self.http_client.handle();

		loop {
			let request = build_request(&method, &url, &headers, body.clone())?;
			let response = handle
				.call(request)
				.await
				.map_err(|e| self.transport_mapper.map_transport_error(e))?;
			let status = response.status().as_u16();
			let class = StatusClass::of(status);

			if class == StatusClass::Unhandled {
				return Err(Error::UnhandledStatus { status });
			}

			let response = normalize_response(url.clone(), redirects, response, class)?;

			match class {
				StatusClass::Redirect => {
					let hop = redirects + 1;
					let next = response.header("location").and_then(|location| url.join(location).ok());

					obs::trace_redirect(status, hop, max_redirects, response.header("location"));

					let Some(next) = next.filter(|_| hop <= max_redirects) else {
						return Ok(response);
					};

					if status == 303 {
						method = Method::GET;
						body = None;
						strip_headers(&mut headers, &[CONTENT_TYPE, CONTENT_LENGTH]);
					}

					if next.origin() != url.origin() {
						strip_headers(&mut headers, &SENSITIVE_HEADERS);
					}

					redirects = hop;
					url = next;
				},
				StatusClass::ProviderError => {
					let retry_after = parse_retry_after(&response.headers);
					let err = ProviderError::new(status, response.body.clone(), retry_after);

					if raise {
						return Err(err.into());
					}

					return Ok(ProviderResponse { error: Some(err), ..response });
				},
				_ => return Ok(response),
			}
		}
	}
}

fn strip_headers(headers: &mut Vec<(String, String)>, names: &[HeaderName]) {
	headers.retain(|(name, _)| !names.iter().any(|n| name.eq_ignore_ascii_case(n.as_str())));
}

fn resolve_url(
	config: &ClientConfig,
	path: &str,
	provider: Option<&ProviderId>,
	params: &[(String, String)],
) -> Result<Url> {
	let expanded = ClientConfig::expand_path(path, provider);
	let mut url = config
		.resolve(&expanded)
		.map_err(|source| ConfigError::InvalidUrl { input: expanded.clone(), source })?;

	if !params.is_empty() {
		url.query_pairs_mut().extend_pairs(params.iter());
	}

	Ok(url)
}

fn build_request(
	method: &Method,
	url: &Url,
	headers: &[(String, String)],
	body: Option<Vec<u8>>,
) -> Result<HttpRequest> {
	let mut builder = oauth2::http::Request::builder()
		.method(method.clone())
		.uri(url.as_str())
		.header(ACCEPT, "application/json");

	for (name, value) in headers {
		builder = builder.header(name.as_str(), value.as_str());
	}

	builder.body(body.unwrap_or_default()).map_err(|e| ConfigError::from(e).into())
}

fn normalize_response(
	url: Url,
	redirects: u32,
	response: HttpResponse,
	class: StatusClass,
) -> Result<ProviderResponse> {
	let status = response.status().as_u16();
	let headers = flatten_headers(response.headers());
	let body = decode_body(status, response.body(), class)?;

	Ok(ProviderResponse { status, headers, body, url, redirects, error: None })
}

fn flatten_headers(map: &HeaderMap) -> BTreeMap<String, String> {
	let mut headers = BTreeMap::<String, String>::new();

	for (name, value) in map {
		let Ok(value) = value.to_str() else { continue };

		headers
			.entry(name.as_str().to_owned())
			.and_modify(|existing| {
				existing.push_str(", ");
				existing.push_str(value);
			})
			.or_insert_with(|| value.to_owned());
	}

	headers
}

fn decode_body(status: u16, bytes: &[u8], class: StatusClass) -> Result<Value> {
	if bytes.iter().all(u8::is_ascii_whitespace) {
		return Ok(Value::Null);
	}

	let mut de = serde_json::Deserializer::from_slice(bytes);

	match serde_path_to_error::deserialize(&mut de) {
		Ok(value) => Ok(value),
		// Redirect bodies are never surfaced, so HTML stubs are tolerated.
		Err(_) if class == StatusClass::Redirect => Ok(Value::Null),
		Err(source) => Err(DecodeError { source, status: Some(status) }.into()),
	}
}

fn parse_retry_after(headers: &BTreeMap<String, String>) -> Option<Duration> {
	let raw = headers.get(RETRY_AFTER.as_str())?.trim();

	if let Ok(secs) = raw.parse::<i64>() {
		return Some(Duration::seconds(secs));
	}
	if let Ok(moment) = OffsetDateTime::parse(raw, &Rfc2822) {
		let delta = moment - OffsetDateTime::now_utc();

		if delta.is_positive() {
			return Some(delta);
		}
	}

	None
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn status_classes_cover_every_range() {
		for status in [301, 302, 303, 307] {
			assert_eq!(StatusClass::of(status), StatusClass::Redirect);
		}
		for status in [200, 204, 299, 300, 304, 308, 399] {
			assert_eq!(StatusClass::of(status), StatusClass::Success);
		}
		for status in [400, 404, 498, 500, 599] {
			assert_eq!(StatusClass::of(status), StatusClass::ProviderError);
		}
		for status in [100, 101, 199, 499, 600, 999] {
			assert_eq!(StatusClass::of(status), StatusClass::Unhandled);
		}
	}

	#[test]
	fn form_options_encode_body_and_content_type() {
		let pairs = vec![("code".to_owned(), "a b&c".to_owned()), ("state".into(), "xyz".into())];
		let options = RequestOptions::new().form(&pairs);

		assert_eq!(options.body.as_deref(), Some(b"code=a+b%26c&state=xyz".as_slice()));
		assert_eq!(
			options.headers,
			vec![("content-type".to_owned(), FORM_CONTENT_TYPE.to_owned())]
		);
	}

	#[test]
	fn resolve_url_substitutes_provider_and_appends_params() {
		let config = ClientConfig::builder(
			"client",
			"secret",
			Url::parse("https://gateway.example.com").expect("Site fixture should parse."),
		)
		.build()
		.expect("Configuration fixture should validate.");
		let provider = ProviderId::new("github").expect("Provider fixture should be valid.");
		let url = resolve_url(
			&config,
			"/auth/:provider/me",
			Some(&provider),
			&[("k".into(), "v w".into())],
		)
		.expect("URL should resolve.");

		assert_eq!(url.as_str(), "https://gateway.example.com/auth/github/me?k=v+w");
	}

	#[test]
	fn empty_and_redirect_bodies_decode_leniently() {
		assert_eq!(
			decode_body(200, b"  ", StatusClass::Success).expect("Empty body should decode."),
			Value::Null
		);
		assert_eq!(
			decode_body(302, b"<html>moved</html>", StatusClass::Redirect)
				.expect("Redirect HTML should be tolerated."),
			Value::Null
		);
		assert!(matches!(
			decode_body(200, b"<html>", StatusClass::Success),
			Err(Error::Decode(DecodeError { status: Some(200), .. }))
		));
	}

	#[test]
	fn retry_after_accepts_seconds() {
		let headers = BTreeMap::from([("retry-after".to_owned(), "30".to_owned())]);

		assert_eq!(parse_retry_after(&headers), Some(Duration::seconds(30)));
		assert_eq!(parse_retry_after(&BTreeMap::new()), None);
	}

	#[test]
	fn embedded_errors_convert_back_into_results() {
		let response = ProviderResponse {
			status: 404,
			headers: BTreeMap::new(),
			body: serde_json::json!({ "data": { "raw": {} } }),
			url: Url::parse("https://gateway.example.com/x").expect("URL fixture should parse."),
			redirects: 0,
			error: Some(ProviderError::new(404, Value::Null, None)),
		};

		assert!(response.data().is_some());
		assert!(matches!(response.into_result(), Err(Error::Provider(_))));
	}
}
