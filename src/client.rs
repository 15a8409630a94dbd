//! Gateway client: immutable configuration plus the transport used by every flow.

// self
use crate::{
	_prelude::*,
	auth::{AuthorizationSession, ProviderId},
	config::ClientConfig,
	error::ConfigError,
	http::{GatewayHttpClient, TransportErrorMapper},
	provider::NormalizerRegistry,
};
#[cfg(feature = "reqwest")]
use crate::http::{ReqwestHttpClient, ReqwestTransportErrorMapper};

#[cfg(feature = "reqwest")]
/// Client specialized for the crate's default reqwest transport stack.
pub type ReqwestGatewayClient = Client<ReqwestHttpClient, ReqwestTransportErrorMapper>;

/// OAuth 2.0 client bound to one broker gateway.
///
/// The client owns the HTTP transport, the transport error mapper, the validated
/// [`ClientConfig`], and the registry of provider normalizers. Every field sits behind an `Arc`,
/// so clones are cheap and share the same immutable state; access tokens keep such a clone to
/// reuse the pipeline configuration for later requests.
pub struct Client<C, M>
where
	C: GatewayHttpClient,
	M: TransportErrorMapper<C::TransportError>,
{
	/// HTTP transport used for every outbound gateway request.
	pub http_client: Arc<C>,
	/// Mapper applied to transport-layer errors before surfacing them to callers.
	pub transport_mapper: Arc<M>,
	/// Validated client configuration.
	pub config: Arc<ClientConfig>,
	/// Provider normalizers resolved at identity-building time.
	pub normalizers: Arc<NormalizerRegistry>,
}
impl<C, M> Client<C, M>
where
	C: GatewayHttpClient,
	M: TransportErrorMapper<C::TransportError>,
{
	/// Creates a client that reuses the caller-provided transport + mapper pair.
	pub fn with_http_client(
		config: ClientConfig,
		http_client: impl Into<Arc<C>>,
		mapper: impl Into<Arc<M>>,
	) -> Self {
		Self {
			http_client: http_client.into(),
			transport_mapper: mapper.into(),
			config: Arc::new(config),
			normalizers: Default::default(),
		}
	}

	/// Replaces the normalizer registry.
	pub fn with_normalizers(mut self, registry: impl Into<Arc<NormalizerRegistry>>) -> Self {
		self.normalizers = registry.into();

		self
	}

	/// Builds the authorize URL for `provider`.
	///
	/// The URL carries `response_type=code`, `client_id`, the configured `redirect_uri` (if any),
	/// and then `extra_params` in order.
	pub fn authorize_url(
		&self,
		provider: &ProviderId,
		extra_params: &[(String, String)],
	) -> Result<Url> {
		let path = ClientConfig::expand_path(&self.config.authorize_path, Some(provider));
		let mut url = self
			.config
			.resolve(&path)
			.map_err(|source| ConfigError::InvalidUrl { input: path.clone(), source })?;
		let mut pairs = url.query_pairs_mut();

		pairs.append_pair("response_type", "code");
		pairs.append_pair("client_id", self.config.client_id.as_str());

		if let Some(redirect_uri) = &self.config.redirect_uri {
			pairs.append_pair("redirect_uri", redirect_uri.as_str());
		}

		pairs.extend_pairs(extra_params.iter());

		drop(pairs);

		Ok(url)
	}

	/// Starts an authorization attempt: generates a CSRF state and the matching authorize URL.
	///
	/// The returned [`AuthorizationSession`] belongs in the caller's session store until the
	/// callback arrives.
	pub fn start_authorization(
		&self,
		provider: ProviderId,
		extra_params: &[(String, String)],
	) -> Result<AuthorizationSession> {
		let state = AuthorizationSession::generate_state();
		let mut params = Vec::with_capacity(extra_params.len() + 1);

		params.push(("state".to_owned(), state.clone()));
		params.extend(extra_params.iter().filter(|(key, _)| key != "state").cloned());

		let authorize_url = self.authorize_url(&provider, &params)?;

		Ok(AuthorizationSession::new(provider, state, authorize_url))
	}
}
#[cfg(feature = "reqwest")]
impl Client<ReqwestHttpClient, ReqwestTransportErrorMapper> {
	/// Creates a client backed by the crate's reqwest transport.
	pub fn new(config: ClientConfig) -> Result<Self> {
		Ok(Self::with_http_client(
			config,
			ReqwestHttpClient::new()?,
			Arc::new(ReqwestTransportErrorMapper),
		))
	}
}
impl<C, M> Clone for Client<C, M>
where
	C: GatewayHttpClient,
	M: TransportErrorMapper<C::TransportError>,
{
	fn clone(&self) -> Self {
		Self {
			http_client: self.http_client.clone(),
			transport_mapper: self.transport_mapper.clone(),
			config: self.config.clone(),
			normalizers: self.normalizers.clone(),
		}
	}
}
impl<C, M> Debug for Client<C, M>
where
	C: GatewayHttpClient,
	M: TransportErrorMapper<C::TransportError>,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Client")
			.field("client_id", &self.config.client_id)
			.field("site", &self.config.site.as_str())
			.field("normalizers", &self.normalizers)
			.finish()
	}
}
