//! Transport primitives consumed by the request pipeline.
//!
//! The pipeline only speaks [`oauth2::HttpRequest`] / [`oauth2::HttpResponse`] (the `http`
//! crate types). [`GatewayHttpClient`] hands out [`AsyncHttpClient`] handles over those types and
//! [`TransportErrorMapper`] turns transport failures into gateway [`Error`] values, so any HTTP
//! stack can be plugged in. Implementations must not follow redirects on their own: redirect
//! handling, including the redirect budget, belongs to the pipeline.

// std
#[cfg(feature = "reqwest")] use std::ops::Deref;
// crates.io
use oauth2::{AsyncHttpClient, HttpClientError};
#[cfg(feature = "reqwest")] use oauth2::{HttpRequest, HttpResponse};
#[cfg(feature = "reqwest")] use reqwest::redirect::Policy;
// self
use crate::{
	_prelude::*,
	error::{ConfigError, TransportError},
};

/// Abstraction over HTTP transports able to execute gateway requests.
///
/// The trait is the pipeline's only dependency on an HTTP stack. Implementations must be
/// `Send + Sync + 'static` so a single transport can back every clone of a
/// [`Client`](crate::client::Client), and the futures their handles return must be `Send` so
/// exchanges can hop executors.
pub trait GatewayHttpClient
where
	Self: 'static + Send + Sync,
{
	/// Concrete error emitted by the underlying transport.
	type TransportError: 'static + Send + Sync + StdError;

	/// [`AsyncHttpClient`] handle used for a single pipeline request (including its redirects).
	type Handle: for<'c> AsyncHttpClient<
			'c,
			Error = HttpClientError<Self::TransportError>,
			Future: 'c + Send,
		>
		+ 'static
		+ Send
		+ Sync;

	/// Returns a handle ready to dispatch requests.
	fn handle(&self) -> Self::Handle;
}

/// Maps HTTP transport failures into gateway [`Error`] values.
pub trait TransportErrorMapper<E>
where
	Self: 'static + Send + Sync,
	E: 'static + Send + Sync + StdError,
{
	/// Converts an [`HttpClientError`] emitted by the transport into a gateway error.
	fn map_transport_error(&self, error: HttpClientError<E>) -> Error;
}

/// Mapper that treats every transport-specific failure as a network error.
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultTransportErrorMapper;
impl<E> TransportErrorMapper<E> for DefaultTransportErrorMapper
where
	E: 'static + Send + Sync + StdError,
{
	fn map_transport_error(&self, error: HttpClientError<E>) -> Error {
		match error {
			HttpClientError::Reqwest(inner) => TransportError::network(*inner).into(),
			other => map_common_error(other),
		}
	}
}

/// Mapper for reqwest-backed transports; request-construction failures become
/// [`ConfigError`]s instead of network errors.
#[cfg(feature = "reqwest")]
#[derive(Clone, Copy, Debug, Default)]
pub struct ReqwestTransportErrorMapper;
#[cfg(feature = "reqwest")]
impl TransportErrorMapper<ReqwestError> for ReqwestTransportErrorMapper {
	fn map_transport_error(&self, error: HttpClientError<ReqwestError>) -> Error {
		match error {
			HttpClientError::Reqwest(inner) if inner.is_builder() => ConfigError::from(*inner).into(),
			HttpClientError::Reqwest(inner) => TransportError::from(*inner).into(),
			other => map_common_error(other),
		}
	}
}

fn map_common_error<E>(error: HttpClientError<E>) -> Error
where
	E: 'static + Send + Sync + StdError,
{
	match error {
		HttpClientError::Http(inner) => ConfigError::from(inner).into(),
		HttpClientError::Io(inner) => TransportError::Io(inner).into(),
		HttpClientError::Other(message) => TransportError::Other { message }.into(),
		other => TransportError::Other { message: other.to_string() }.into(),
	}
}

/// Thin wrapper around [`ReqwestClient`] with automatic redirects disabled.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug)]
pub struct ReqwestHttpClient(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestHttpClient {
	/// Builds a rustls-backed client that leaves redirects to the pipeline.
	pub fn new() -> Result<Self> {
		let client = ReqwestClient::builder()
			.redirect(Policy::none())
			.build()
			.map_err(ConfigError::from)?;

		Ok(Self(client))
	}

	/// Wraps an existing reqwest [`ReqwestClient`].
	///
	/// The client should be built with `redirect(Policy::none())`; otherwise reqwest follows
	/// redirects before the pipeline can count them.
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestHttpClient {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl Deref for ReqwestHttpClient {
	type Target = ReqwestClient;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl GatewayHttpClient for ReqwestHttpClient {
	type Handle = ReqwestHandle;
	type TransportError = ReqwestError;

	fn handle(&self) -> Self::Handle {
		ReqwestHandle(self.0.clone())
	}
}

/// [`AsyncHttpClient`] handle returned by [`ReqwestHttpClient`].
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug)]
pub struct ReqwestHandle(ReqwestClient);
#[cfg(feature = "reqwest")]
impl<'c> AsyncHttpClient<'c> for ReqwestHandle {
	type Error = HttpClientError<ReqwestError>;
	type Future =
		Pin<Box<dyn Future<Output = Result<HttpResponse, Self::Error>> + 'c + Send + Sync>>;

	fn call(&'c self, request: HttpRequest) -> Self::Future {
		let client = self.0.clone();

		Box::pin(async move {
			let response =
				client.execute(request.try_into().map_err(Box::new)?).await.map_err(Box::new)?;
			let status = response.status();
			let headers = response.headers().to_owned();
			let mut response_new =
				HttpResponse::new(response.bytes().await.map_err(Box::new)?.to_vec());

			*response_new.status_mut() = status;
			*response_new.headers_mut() = headers;

			Ok(response_new)
		})
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[derive(Debug)]
	struct Refused;
	impl Display for Refused {
		fn fmt(&self, f: &mut Formatter) -> FmtResult {
			f.write_str("connection refused")
		}
	}
	impl StdError for Refused {}

	#[test]
	fn default_mapper_classifies_transport_failures() {
		let mapper = DefaultTransportErrorMapper;
		let err = mapper.map_transport_error(HttpClientError::Reqwest(Box::new(Refused)));

		assert!(matches!(err, Error::Transport(TransportError::Network { .. })));

		let err = <DefaultTransportErrorMapper as TransportErrorMapper<Refused>>::map_transport_error(
			&mapper,
			HttpClientError::Other("socket closed".into()),
		);

		assert!(matches!(err, Error::Transport(TransportError::Other { .. })));

		let err = <DefaultTransportErrorMapper as TransportErrorMapper<Refused>>::map_transport_error(
			&mapper,
			HttpClientError::Io(std::io::Error::other("reset")),
		);

		assert!(matches!(err, Error::Transport(TransportError::Io(_))));
	}

	#[cfg(feature = "reqwest")]
	#[test]
	fn reqwest_client_builds_without_redirect_following() {
		assert!(ReqwestHttpClient::new().is_ok());
	}
}
