//! Single-flight bundle loading.
//!
//! # Mental model
//!
//! * The fast path is a lock-free registry lookup.
//! * On a miss the caller takes the per-key build lock, looks again (another
//!   caller may have finished the build meanwhile), and only then reads the
//!   store. Concurrent callers for one key therefore trigger exactly one
//!   store read and all receive the same bundle.
//! * A build resolves its parent through the same path, so parents are cached
//!   and shared. Parent locales are strictly less specific than their child
//!   (or the default locale, whose own chain never leaves its language), so
//!   build locks are always taken from more to less specific keys and never
//!   deadlock.
//!
//! # Failure modes
//!
//! * Store unavailable: the call fails with
//!   [`BundleError::StoreUnavailable`] and nothing is cached.
//! * Registry closed: the bundle is still built and returned, but not cached.

use std::sync::Arc;

use lingua_locale::Locale;
use parking_lot::RwLock;

use crate::locks::KeyLocks;
use crate::{Bundle, BundleError, BundlePublisher, BundleRegistry, CatalogQuery, CatalogStore, Key, LanguageRoots, LocatorPaths, PathFilter, Result};

/// Builds bundles at most once per key and publishes them to the registry.
pub struct LoadCoordinator {
	default_locale: Locale,
	filter: PathFilter,
	store: Arc<dyn CatalogStore>,
	locators: RwLock<Vec<LocatorPaths>>,
	registry: BundleRegistry,
	roots: LanguageRoots,
	locks: KeyLocks,
}

impl std::fmt::Debug for LoadCoordinator {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("LoadCoordinator")
			.field("default_locale", &self.default_locale)
			.field("filter", &self.filter)
			.field("registry", &self.registry)
			.field("roots", &self.roots)
			.finish_non_exhaustive()
	}
}

impl LoadCoordinator {
	pub fn new(default_locale: Locale, filter: PathFilter, store: Arc<dyn CatalogStore>, publisher: Arc<dyn BundlePublisher>) -> Self {
		Self {
			default_locale,
			filter,
			store,
			locators: RwLock::new(Vec::new()),
			registry: BundleRegistry::new(publisher),
			roots: LanguageRoots::default(),
			locks: KeyLocks::default(),
		}
	}

	pub fn default_locale(&self) -> &Locale {
		&self.default_locale
	}

	pub fn filter(&self) -> &PathFilter {
		&self.filter
	}

	pub fn store(&self) -> &dyn CatalogStore {
		self.store.as_ref()
	}

	pub fn registry(&self) -> &BundleRegistry {
		&self.registry
	}

	pub fn roots(&self) -> &LanguageRoots {
		&self.roots
	}

	/// Cache key of a request; an absent locale means the default locale.
	pub fn key_for(&self, name: Option<&str>, locale: Option<&Locale>) -> Key {
		Key::new(name, locale.unwrap_or(&self.default_locale).clone())
	}

	/// Returns the bundle for (name, locale), building and caching it on a
	/// miss. With `force_reload` the cache is bypassed for this key (not its
	/// parents) and the rebuilt bundle replaces the cached one.
	pub fn get(&self, name: Option<&str>, locale: Option<&Locale>, force_reload: bool) -> Result<Arc<Bundle>> {
		self.get_key(&self.key_for(name, locale), force_reload)
	}

	pub fn get_key(&self, key: &Key, force_reload: bool) -> Result<Arc<Bundle>> {
		if !force_reload && let Some(bundle) = self.registry.lookup(key) {
			tracing::debug!(%key, "loader.get: cache hit on first look");
			return Ok(bundle);
		}

		let lock = self.locks.lock_for(key);
		let _guard = lock.lock();

		if !force_reload && let Some(bundle) = self.registry.lookup(key) {
			tracing::debug!(%key, "loader.get: cache hit on second look");
			return Ok(bundle);
		}

		tracing::debug!(%key, "loader.get: reading from store");
		let bundle = self.build(key)?;
		if self.registry.publish(key.clone(), Arc::clone(&bundle)) {
			self.roots.extend(bundle.language_roots());
			tracing::debug!(%key, roots = ?bundle.language_roots(), "loader.get: published");
			tracing::info!(roots = ?self.roots.snapshot(), "currently loaded dictionaries across all locales");
		}
		tracing::trace!(%key, entries = bundle.len(), "loader.get: resolved");
		Ok(bundle)
	}

	fn build(&self, key: &Key) -> Result<Arc<Bundle>> {
		let locators = self.locators.read().clone();
		let catalog = self
			.store
			.read_catalog(&CatalogQuery {
				name: key.name(),
				locale: key.locale(),
				filter: &self.filter,
				locators: &locators,
			})
			.map_err(|error| BundleError::from_store(error, key))?;

		let parent = match key.locale().parent(&self.default_locale) {
			Some(parent) => self.get_key(&key.with_locale(parent), false)?,
			None => Arc::clone(Bundle::root()),
		};
		Ok(Arc::new(Bundle::new(key.clone(), catalog, parent)))
	}

	/// Adds locator paths, returning whether the set changed.
	pub fn register_locators(&self, locators: impl IntoIterator<Item = LocatorPaths>) -> bool {
		let mut current = self.locators.write();
		let before = current.len();
		for locator in locators {
			if !current.contains(&locator) {
				current.push(locator);
			}
		}
		current.len() != before
	}

	/// Removes locator paths, returning whether the set changed.
	pub fn unregister_locators(&self, locators: &[LocatorPaths]) -> bool {
		let mut current = self.locators.write();
		let before = current.len();
		current.retain(|locator| !locators.contains(locator));
		current.len() != before
	}

	pub fn locators(&self) -> Vec<LocatorPaths> {
		self.locators.read().clone()
	}

	/// Forgets every language root and drops every cached bundle.
	pub fn clear(&self) {
		self.roots.clear();
		self.registry.clear();
	}
}
