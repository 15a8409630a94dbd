//! Reference normalizer for gateways that relay the upstream profile untouched.

// self
use crate::{
	_prelude::*,
	identity::{ProfileInfo, RawProfile},
	provider::{ProviderNormalizer, required_scalar},
};

/// Profile fields copied into `info` by [`BrokerPassthrough`].
pub const PASSTHROUGH_INFO_FIELDS: [&str; 4] = ["name", "alias", "bio", "avatar"];

/// Passthrough normalizer: `uid` is `raw.id` and `info` copies the well-known fields.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BrokerPassthrough {
	skip_info: bool,
}
impl BrokerPassthrough {
	/// Creates the default passthrough variant.
	pub const fn new() -> Self {
		Self { skip_info: false }
	}

	/// Toggles `skip_info`.
	pub const fn with_skip_info(mut self, skip_info: bool) -> Self {
		self.skip_info = skip_info;

		self
	}
}
impl ProviderNormalizer for BrokerPassthrough {
	fn name(&self) -> &str {
		"broker_passthrough"
	}

	fn uid(&self, profile: &RawProfile) -> Result<String> {
		required_scalar(profile, "id")
	}

	fn profile_info(&self, profile: &RawProfile) -> ProfileInfo {
		let mut info = ProfileInfo::default();

		for field in PASSTHROUGH_INFO_FIELDS {
			info.insert(field, profile.raw.get(field));
		}

		info
	}

	fn skip_info(&self) -> bool {
		self.skip_info
	}
}
