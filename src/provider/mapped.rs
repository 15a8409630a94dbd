//! Field-mapping normalizer for providers whose payload only needs renaming.

// self
use crate::{
	_prelude::*,
	identity::{ProfileInfo, RawProfile},
	provider::{ProviderNormalizer, required_scalar},
};

/// Normalizer driven by a field map instead of code.
///
/// Paths are dotted and relative to `data.raw`, e.g. `user.login`. The map can be loaded from
/// configuration:
///
/// ```
/// use oauth2_gateway::provider::MappedNormalizer;
///
/// let normalizer: MappedNormalizer = serde_json::from_str(
/// 	r#"{ "name": "twitter", "uid_path": "id_str", "fields": { "alias": "screen_name" } }"#,
/// )
/// .unwrap();
///
/// assert_eq!(normalizer.uid_path, "id_str");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappedNormalizer {
	/// Label reported by [`ProviderNormalizer::name`].
	pub name: String,
	/// Path of the uid inside the raw payload.
	#[serde(default = "default_uid_path")]
	pub uid_path: String,
	/// `info` key to raw path.
	#[serde(default)]
	pub fields: BTreeMap<String, String>,
	/// Suppresses `extra.raw_info`.
	#[serde(default)]
	pub skip_info: bool,
}
impl MappedNormalizer {
	/// Creates a normalizer reading the uid from `id` with no info fields.
	pub fn new(name: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			uid_path: default_uid_path(),
			fields: BTreeMap::new(),
			skip_info: false,
		}
	}

	/// Sets the uid path.
	pub fn with_uid_path(mut self, path: impl Into<String>) -> Self {
		self.uid_path = path.into();

		self
	}

	/// Maps `info[key]` to the raw payload at `path`.
	pub fn with_field(mut self, key: impl Into<String>, path: impl Into<String>) -> Self {
		self.fields.insert(key.into(), path.into());

		self
	}

	/// Toggles `skip_info`.
	pub fn with_skip_info(mut self, skip_info: bool) -> Self {
		self.skip_info = skip_info;

		self
	}
}
impl ProviderNormalizer for MappedNormalizer {
	fn name(&self) -> &str {
		&self.name
	}

	fn uid(&self, profile: &RawProfile) -> Result<String> {
		required_scalar(profile, &self.uid_path)
	}

	fn profile_info(&self, profile: &RawProfile) -> ProfileInfo {
		let mut info = ProfileInfo::default();

		for (key, path) in &self.fields {
			info.insert(key.as_str(), profile.raw_field(path));
		}

		info
	}

	fn skip_info(&self) -> bool {
		self.skip_info
	}
}

fn default_uid_path() -> String {
	"id".into()
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::pipeline::ProviderResponse;

	fn profile(body: Value) -> RawProfile {
		RawProfile::from_response(ProviderResponse {
			status: 200,
			headers: BTreeMap::new(),
			body,
			url: Url::parse("https://gateway.example.com/auth/twitter/me")
				.expect("URL fixture should parse."),
			redirects: 0,
			error: None,
		})
	}

	#[test]
	fn mapped_fields_follow_dotted_paths() {
		let profile = profile(serde_json::json!({
			"data": {
				"raw": {
					"id_str": "1001",
					"screen_name": "ann",
					"profile": { "image": "https://img.example.com/a.png", "bio": "" }
				}
			}
		}));
		let normalizer = MappedNormalizer::new("twitter")
			.with_uid_path("id_str")
			.with_field("alias", "screen_name")
			.with_field("avatar", "profile.image")
			.with_field("bio", "profile.bio");

		assert_eq!(normalizer.uid(&profile).expect("Mapped uid should resolve."), "1001");

		let info = normalizer.profile_info(&profile);

		assert_eq!(info.get("alias"), Some("ann"));
		assert_eq!(info.get("avatar"), Some("https://img.example.com/a.png"));
		assert_eq!(info.get("bio"), None);
	}

	#[test]
	fn missing_uid_path_is_reported() {
		let profile = profile(serde_json::json!({ "data": { "raw": {} } }));
		let err = MappedNormalizer::new("custom")
			.with_uid_path("user.id")
			.uid(&profile)
			.expect_err("Missing uid should fail.");

		assert!(matches!(err, Error::MissingField { ref field } if field == "raw.user.id"));
	}

	#[test]
	fn configuration_defaults_apply() {
		let normalizer: MappedNormalizer = serde_json::from_value(serde_json::json!({ "name": "x" }))
			.expect("Minimal mapping should decode.");

		assert_eq!(normalizer, MappedNormalizer::new("x"));
	}
}
