//! Helpers shared by the integration tests.

#![allow(dead_code)]

// std
use std::{
	collections::VecDeque,
	fmt::{Display, Formatter, Result as FmtResult},
	future::{self, Future},
	pin::Pin,
	sync::Arc,
};
// crates.io
use parking_lot::Mutex;
// self
use oauth2_gateway::{
	auth::ProviderId,
	client::Client,
	config::{ClientConfig, ClientConfigBuilder},
	http::{DefaultTransportErrorMapper, GatewayHttpClient},
	oauth2::{AsyncHttpClient, HttpClientError, HttpRequest, HttpResponse, http::StatusCode},
	url::Url,
};
#[cfg(feature = "reqwest")]
use oauth2_gateway::{
	client::ReqwestGatewayClient,
	http::{ReqwestHttpClient, ReqwestTransportErrorMapper},
	reqwest,
};

pub const CLIENT_ID: &str = "client-it";
pub const CLIENT_SECRET: &str = "secret-it";
pub const SITE: &str = "https://gateway.example.com";

/// Client driven by [`ScriptedHttpClient`].
pub type ScriptedClient = Client<ScriptedHttpClient, DefaultTransportErrorMapper>;

pub fn provider(id: &str) -> ProviderId {
	ProviderId::new(id).expect("Provider fixture should be valid.")
}

pub fn url(value: &str) -> Url {
	Url::parse(value).expect("URL fixture should parse.")
}

pub fn config(site: &str) -> ClientConfigBuilder {
	ClientConfig::builder(CLIENT_ID, CLIENT_SECRET, url(site))
}

/// Builds a reqwest client that accepts the self-signed certificates produced by `httpmock`
/// and leaves redirects to the pipeline.
#[cfg(feature = "reqwest")]
pub fn test_reqwest_http_client() -> ReqwestHttpClient {
	let client = reqwest::Client::builder()
		.danger_accept_invalid_certs(true)
		.danger_accept_invalid_hostnames(true)
		.redirect(reqwest::redirect::Policy::none())
		.build()
		.expect("Failed to build insecure Reqwest client for tests.");

	ReqwestHttpClient::with_client(client)
}

/// Builds a reqwest-backed client pointed at `base_url` (usually `MockServer::base_url`).
#[cfg(feature = "reqwest")]
pub fn reqwest_client(base_url: &str, builder: ClientConfigBuilder) -> ReqwestGatewayClient {
	let builder = ClientConfigBuilder { site: Some(url(base_url)), ..builder };
	let config = builder.build().expect("Test configuration should validate.");

	Client::with_http_client(
		config,
		test_reqwest_http_client(),
		Arc::new(ReqwestTransportErrorMapper),
	)
}

/// Builds a client that replays scripted responses instead of touching the network.
pub fn scripted_client(builder: ClientConfigBuilder) -> (ScriptedClient, ScriptedHttpClient) {
	let transport = ScriptedHttpClient::default();
	let config = builder.build().expect("Test configuration should validate.");
	let client: ScriptedClient =
		Client::with_http_client(config, transport.clone(), Arc::new(DefaultTransportErrorMapper));

	(client, transport)
}

/// Builds an HTTP response with the given status, headers, and body.
pub fn response(status: u16, headers: &[(&str, &str)], body: &str) -> HttpResponse {
	let mut response = HttpResponse::new(body.as_bytes().to_vec());

	*response.status_mut() = StatusCode::from_u16(status).expect("Status fixture should be valid.");

	for (name, value) in headers {
		response.headers_mut().append(
			oauth2_gateway::oauth2::http::HeaderName::from_bytes(name.as_bytes())
				.expect("Header name fixture should be valid."),
			value.parse().expect("Header value fixture should be valid."),
		);
	}

	response
}

pub fn json(status: u16, body: &str) -> HttpResponse {
	response(status, &[("content-type", "application/json")], body)
}

pub fn redirect(status: u16, location: &str) -> HttpResponse {
	response(status, &[("location", location)], "")
}

/// Transport failure injected by [`ScriptedHttpClient::push_failure`].
#[derive(Debug)]
pub struct ScriptedFailure(pub String);
impl Display for ScriptedFailure {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(&self.0)
	}
}
impl std::error::Error for ScriptedFailure {}

/// Request captured by [`ScriptedHttpClient`].
#[derive(Clone, Debug)]
pub struct RecordedRequest {
	pub method: String,
	pub url: String,
	pub headers: Vec<(String, String)>,
	pub body: Vec<u8>,
}
impl RecordedRequest {
	pub fn header(&self, name: &str) -> Option<&str> {
		self.headers.iter().find(|(k, _)| k.eq_ignore_ascii_case(name)).map(|(_, v)| v.as_str())
	}

	pub fn body_str(&self) -> &str {
		std::str::from_utf8(&self.body).expect("Recorded body should be UTF-8.")
	}
}

#[derive(Default)]
struct Script {
	responses: Mutex<VecDeque<Result<HttpResponse, String>>>,
	requests: Mutex<Vec<RecordedRequest>>,
}

/// Fake transport that answers requests from a FIFO script and records every request.
#[derive(Clone, Default)]
pub struct ScriptedHttpClient(Arc<Script>);
impl ScriptedHttpClient {
	pub fn push(&self, response: HttpResponse) -> &Self {
		self.0.responses.lock().push_back(Ok(response));

		self
	}

	pub fn push_failure(&self, message: &str) -> &Self {
		self.0.responses.lock().push_back(Err(message.to_owned()));

		self
	}

	pub fn requests(&self) -> Vec<RecordedRequest> {
		self.0.requests.lock().clone()
	}
}
impl GatewayHttpClient for ScriptedHttpClient {
	type Handle = ScriptedHttpClient;
	type TransportError = ScriptedFailure;

	fn handle(&self) -> Self::Handle {
		self.clone()
	}
}
impl<'c> AsyncHttpClient<'c> for ScriptedHttpClient {
	type Error = HttpClientError<ScriptedFailure>;
	type Future = Pin<Box<dyn Future<Output = Result<HttpResponse, Self::Error>> + 'c + Send>>;

	fn call(&'c self, request: HttpRequest) -> Self::Future {
		let recorded = RecordedRequest {
			method: request.method().to_string(),
			url: request.uri().to_string(),
			headers: request
				.headers()
				.iter()
				.map(|(k, v)| (k.as_str().to_owned(), v.to_str().unwrap_or_default().to_owned()))
				.collect(),
			body: request.body().clone(),
		};

		self.0.requests.lock().push(recorded);

		let next =
			self.0.responses.lock().pop_front().unwrap_or_else(|| Err("script exhausted".into()));
		let result =
			next.map_err(|message| HttpClientError::Reqwest(Box::new(ScriptedFailure(message))));

		Box::pin(future::ready(result))
	}
}
