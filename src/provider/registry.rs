//! Provider-keyed normalizer registry.

// self
use crate::{
	_prelude::*,
	auth::ProviderId,
	provider::{BrokerPassthrough, ProviderNormalizer},
};

/// Resolves the normalizer for a provider, falling back to [`BrokerPassthrough`].
///
/// Registration is allowed after the registry is shared with a client, so normalizers for new
/// providers can be added at runtime.
pub struct NormalizerRegistry {
	normalizers: RwLock<HashMap<ProviderId, Arc<dyn ProviderNormalizer>>>,
	fallback: Arc<dyn ProviderNormalizer>,
}
impl NormalizerRegistry {
	/// Creates an empty registry with the passthrough fallback.
	pub fn new() -> Self {
		Self::with_fallback(Arc::new(BrokerPassthrough::new()))
	}

	/// Creates an empty registry with a custom fallback.
	pub fn with_fallback(fallback: Arc<dyn ProviderNormalizer>) -> Self {
		Self { normalizers: RwLock::new(HashMap::new()), fallback }
	}

	/// Builder-style [`register`](Self::register).
	pub fn with(self, provider: ProviderId, normalizer: impl 'static + ProviderNormalizer) -> Self {
		self.register(provider, Arc::new(normalizer));

		self
	}

	/// Registers (or replaces) the normalizer for `provider`, returning the previous one.
	pub fn register(
		&self,
		provider: ProviderId,
		normalizer: Arc<dyn ProviderNormalizer>,
	) -> Option<Arc<dyn ProviderNormalizer>> {
		self.normalizers.write().insert(provider, normalizer)
	}

	/// Returns the normalizer registered for `provider`, or the fallback.
	pub fn resolve(&self, provider: &ProviderId) -> Arc<dyn ProviderNormalizer> {
		self.normalizers.read().get(provider).cloned().unwrap_or_else(|| self.fallback.clone())
	}

	/// Returns `true` when `provider` has a dedicated normalizer.
	pub fn contains(&self, provider: &ProviderId) -> bool {
		self.normalizers.read().contains_key(provider)
	}
}
impl Default for NormalizerRegistry {
	fn default() -> Self {
		Self::new()
	}
}
impl Debug for NormalizerRegistry {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		let normalizers = self.normalizers.read();
		let mut providers = normalizers
			.iter()
			.map(|(provider, normalizer)| (provider.as_str(), normalizer.name()))
			.collect::<Vec<_>>();

		providers.sort_unstable();

		f.debug_struct("NormalizerRegistry")
			.field("providers", &providers)
			.field("fallback", &self.fallback.name())
			.finish()
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::provider::MappedNormalizer;

	fn provider(id: &str) -> ProviderId {
		ProviderId::new(id).expect("Provider fixture should be valid.")
	}

	#[test]
	fn unknown_providers_fall_back_to_passthrough() {
		let registry = NormalizerRegistry::new()
			.with(provider("twitter"), MappedNormalizer::new("twitter").with_uid_path("id_str"));

		assert_eq!(registry.resolve(&provider("twitter")).name(), "twitter");
		assert_eq!(registry.resolve(&provider("github")).name(), "broker_passthrough");
		assert!(registry.contains(&provider("twitter")));
		assert!(!registry.contains(&provider("github")));
	}

	#[test]
	fn register_replaces_existing_entries() {
		let registry = NormalizerRegistry::default();

		assert!(registry.register(provider("gh"), Arc::new(MappedNormalizer::new("a"))).is_none());

		let previous = registry
			.register(provider("gh"), Arc::new(MappedNormalizer::new("b")))
			.expect("First registration should be returned.");

		assert_eq!(previous.name(), "a");
		assert_eq!(registry.resolve(&provider("gh")).name(), "b");
		assert!(format!("{registry:?}").contains("\"gh\", \"b\""));
	}
}
