//! Normalizer capability set.

// self
use crate::{
	_prelude::*,
	auth::{Credentials, TokenSet},
	identity::{Extra, ProfileInfo, RawProfile},
};

/// Maps a provider's raw profile payload into canonical identity parts.
///
/// Implementors must be `Send + Sync` so one instance can serve concurrent exchanges; per-exchange
/// state (the fetched profile) lives in [`IdentitySession`](crate::identity::IdentitySession), not
/// in the normalizer. Only `uid` and `profile_info` are required. The remaining hooks default to
/// the gateway's generic behavior.
pub trait ProviderNormalizer: Send + Sync {
	/// Stable label used in logs and `Debug` output.
	fn name(&self) -> &str;

	/// Extracts the provider-side user identifier.
	///
	/// Implementations fail with [`Error::MissingField`] instead of inventing a fallback.
	fn uid(&self, profile: &RawProfile) -> Result<String>;

	/// Extracts the human-facing profile fields.
	fn profile_info(&self, profile: &RawProfile) -> ProfileInfo;

	/// Suppresses `extra.raw_info` (and the profile fetch it needs) when `true`.
	fn skip_info(&self) -> bool {
		false
	}

	/// Builds the extra block from the profile `data` payload.
	fn extra(&self, profile: &RawProfile) -> Extra {
		if self.skip_info() {
			return Extra::default();
		}

		Extra::from_data(&profile.data)
	}

	/// Derives the credentials block; depends on the token only.
	fn credentials(&self, tokens: &TokenSet) -> Credentials {
		Credentials::from(tokens)
	}
}

/// Reads a required scalar from the raw payload as a string.
pub(crate) fn required_scalar(profile: &RawProfile, path: &str) -> Result<String> {
	profile
		.raw_field(path)
		.and_then(crate::identity::scalar_to_string)
		.ok_or_else(|| Error::MissingField { field: format!("raw.{path}") })
}
