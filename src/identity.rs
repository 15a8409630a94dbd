//! Canonical identity records and the raw profile payloads they are normalized from.
//!
//! The gateway answers profile requests with `{ "data": { "raw": { .. }, .. } }`. A
//! [`ProviderNormalizer`](crate::provider::ProviderNormalizer) turns that payload into a
//! [`CanonicalIdentity`]; every map it emits is pruned so no null or empty value survives.

mod session;

pub use session::*;

// self
use crate::{
	_prelude::*,
	auth::{Credentials, ProviderId},
	pipeline::ProviderResponse,
};

/// Decoded profile response.
#[derive(Clone, Debug)]
pub struct RawProfile {
	/// Pipeline response the profile was read from.
	pub response: ProviderResponse,
	/// Top-level `data` object (empty when absent).
	pub data: Map<String, Value>,
	/// Provider payload nested under `data.raw` (empty when absent).
	pub raw: Map<String, Value>,
}
impl RawProfile {
	/// Extracts `data` and `data.raw` from a profile response.
	pub fn from_response(response: ProviderResponse) -> Self {
		let data = response.data().cloned().unwrap_or_default();
		let raw = data.get("raw").and_then(Value::as_object).cloned().unwrap_or_default();

		Self { response, data, raw }
	}

	/// Looks up a dotted path (`user.login`) inside the raw payload.
	pub fn raw_field(&self, path: &str) -> Option<&Value> {
		lookup(&self.raw, path)
	}
}

/// Human-facing profile fields (`name`, `alias`, `bio`, `avatar`, ...).
///
/// Blank values are rejected on insert, so the map is always pruned.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProfileInfo(BTreeMap<String, String>);
impl ProfileInfo {
	/// Inserts `value` under `key` when it is a non-empty scalar.
	pub fn insert(&mut self, key: impl Into<String>, value: Option<&Value>) {
		if let Some(value) = value.and_then(scalar_to_string) {
			self.0.insert(key.into(), value);
		}
	}

	/// Returns the value stored under `key`.
	pub fn get(&self, key: &str) -> Option<&str> {
		self.0.get(key).map(String::as_str)
	}

	/// Number of populated fields.
	pub fn len(&self) -> usize {
		self.0.len()
	}

	/// Returns `true` when no field is populated.
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	/// Iterates fields in key order.
	pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
		self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
	}
}

/// Extra identity data.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Extra {
	/// Pruned copy of the profile `data` payload.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub raw_info: Option<Map<String, Value>>,
}
impl Extra {
	/// Builds `raw_info` from a profile `data` payload; a payload that prunes to nothing is
	/// omitted.
	pub fn from_data(data: &Map<String, Value>) -> Self {
		let mut raw_info = data.clone();

		prune(&mut raw_info);

		Self { raw_info: (!raw_info.is_empty()).then_some(raw_info) }
	}

	/// Returns `true` when nothing would be emitted.
	pub fn is_empty(&self) -> bool {
		self.raw_info.is_none()
	}
}

/// Provider-agnostic identity produced by a normalizer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CanonicalIdentity {
	/// Provider the identity was fetched from.
	pub provider: ProviderId,
	/// Stable provider-side user identifier.
	pub uid: String,
	/// Pruned profile fields.
	pub info: ProfileInfo,
	/// Credentials derived from the access token.
	pub credentials: Credentials,
	/// Extra data; omitted when empty.
	#[serde(skip_serializing_if = "Extra::is_empty")]
	pub extra: Extra,
}

/// Recursively removes `null`, empty strings, empty arrays, and empty objects.
///
/// Containers are pruned before they are tested for emptiness, so a second pass is a no-op.
pub fn prune(map: &mut Map<String, Value>) {
	map.retain(|_, value| {
		prune_value(value);

		!is_blank(value)
	});
}

fn prune_value(value: &mut Value) {
	match value {
		Value::Object(map) => prune(map),
		Value::Array(items) => items.retain_mut(|item| {
			prune_value(item);

			!is_blank(item)
		}),
		_ => {},
	}
}

fn is_blank(value: &Value) -> bool {
	match value {
		Value::Null => true,
		Value::String(s) => s.is_empty(),
		Value::Array(items) => items.is_empty(),
		Value::Object(map) => map.is_empty(),
		Value::Bool(_) | Value::Number(_) => false,
	}
}

/// Renders a scalar as a string; containers, `null`, and empty strings yield `None`.
pub fn scalar_to_string(value: &Value) -> Option<String> {
	match value {
		Value::String(s) if !s.is_empty() => Some(s.clone()),
		Value::Number(n) => Some(n.to_string()),
		Value::Bool(b) => Some(b.to_string()),
		_ => None,
	}
}

pub(crate) fn lookup<'a>(map: &'a Map<String, Value>, path: &str) -> Option<&'a Value> {
	let mut segments = path.split('.');
	let mut current = map.get(segments.next()?)?;

	for segment in segments {
		current = current.as_object()?.get(segment)?;
	}

	Some(current)
}
