// self
use crate::{
	_prelude::*,
	auth::{AccessToken, Credentials, ProviderId},
	http::{GatewayHttpClient, TransportErrorMapper},
	identity::{CanonicalIdentity, Extra, ProfileInfo, RawProfile},
	provider::ProviderNormalizer,
};

/// Exchange-scoped identity builder.
///
/// Pairs an access token with the normalizer resolved for its provider. The raw profile is
/// fetched lazily and at most once per session, so `uid`, `info`, `extra`, and `identity` can be
/// called in any order.
pub struct IdentitySession<C, M>
where
	C: GatewayHttpClient,
	M: TransportErrorMapper<C::TransportError>,
{
	provider: ProviderId,
	token: AccessToken<C, M>,
	normalizer: Arc<dyn ProviderNormalizer>,
	profile: AsyncOnceCell<RawProfile>,
}
impl<C, M> IdentitySession<C, M>
where
	C: GatewayHttpClient,
	M: TransportErrorMapper<C::TransportError>,
{
	/// Creates a session for `provider` using an explicit normalizer.
	pub fn new(
		provider: ProviderId,
		token: AccessToken<C, M>,
		normalizer: Arc<dyn ProviderNormalizer>,
	) -> Self {
		Self { provider, token, normalizer, profile: AsyncOnceCell::new() }
	}

	/// Provider this session normalizes.
	pub fn provider(&self) -> &ProviderId {
		&self.provider
	}

	/// Access token backing the session.
	pub fn token(&self) -> &AccessToken<C, M> {
		&self.token
	}

	/// Normalizer resolved for the provider.
	pub fn normalizer(&self) -> &dyn ProviderNormalizer {
		self.normalizer.as_ref()
	}

	/// Fetches (once) and returns the raw profile.
	///
	/// A provider error embedded in the profile response is surfaced as `Err`, since no identity
	/// can be built from it. Failed fetches are not cached.
	pub async fn raw_profile(&self) -> Result<&RawProfile> {
		self.profile
			.get_or_try_init(|| async {
				let profile = self.token.fetch_profile(&self.provider).await?;

				match &profile.response.error {
					Some(err) => Err(Error::from(err.clone())),
					None => Ok(profile),
				}
			})
			.await
	}

	/// Provider-side user identifier.
	pub async fn uid(&self) -> Result<String> {
		let profile = self.raw_profile().await?;

		self.normalizer.uid(profile)
	}

	/// Pruned profile fields.
	pub async fn info(&self) -> Result<ProfileInfo> {
		let profile = self.raw_profile().await?;

		Ok(self.normalizer.profile_info(profile))
	}

	/// Extra data; skipped without a profile fetch when the normalizer opts out.
	pub async fn extra(&self) -> Result<Extra> {
		if self.normalizer.skip_info() {
			return Ok(Extra::default());
		}

		let profile = self.raw_profile().await?;

		Ok(self.normalizer.extra(profile))
	}

	/// Credentials derived from the token alone.
	pub fn credentials(&self) -> Credentials {
		self.normalizer.credentials(self.token.tokens())
	}

	/// Builds the complete canonical identity.
	pub async fn identity(&self) -> Result<CanonicalIdentity> {
		let uid = self.uid().await?;
		let info = self.info().await?;
		let extra = self.extra().await?;

		Ok(CanonicalIdentity {
			provider: self.provider.clone(),
			uid,
			info,
			credentials: self.credentials(),
			extra,
		})
	}
}
impl<C, M> Debug for IdentitySession<C, M>
where
	C: GatewayHttpClient,
	M: TransportErrorMapper<C::TransportError>,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("IdentitySession")
			.field("provider", &self.provider)
			.field("normalizer", &self.normalizer.name())
			.field("profile_loaded", &self.profile.is_initialized())
			.finish()
	}
}
