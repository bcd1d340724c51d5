//! The bundle provider context.
//!
//! [`BundleProvider`] owns every piece of shared cache state (registry,
//! language roots, key locks, pending reload jobs) and wires the load
//! coordinator, change processor and reload scheduler together. There are no
//! process-wide globals: two providers never share a cache.

use std::sync::{Arc, Weak};
use std::time::Duration;

use lingua_config::ProviderConfig;
use lingua_locale::Locale;
use lingua_worker::JobScheduler;

use crate::{
	Bundle, BundlePublisher, CatalogStore, ChangeEvent, ChangeProcessor, Invalidation, Key, LoadCoordinator, LocatorPaths, NoopPublisher, PathFilter, ReloadScheduler,
	Result,
};

/// Read access to bundles, as consumed by request-level code.
pub trait BundleSource: Send + Sync {
	fn default_locale(&self) -> Locale;

	/// Bundle for (name, locale); an absent locale means the default locale.
	fn get_named_bundle(&self, name: Option<&str>, locale: Option<&Locale>) -> Result<Arc<Bundle>>;

	/// Bundle of the default catalog.
	fn get_bundle(&self, locale: Option<&Locale>) -> Result<Arc<Bundle>> {
		self.get_named_bundle(None, locale)
	}
}

struct ProviderInner {
	loader: LoadCoordinator,
	reloads: ReloadScheduler,
	preload: bool,
}

/// Cache of translated-message bundles kept coherent with a catalog store.
///
/// Cloning is cheap and yields a handle to the same cache.
#[derive(Clone)]
pub struct BundleProvider {
	inner: Arc<ProviderInner>,
}

impl std::fmt::Debug for BundleProvider {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("BundleProvider")
			.field("loader", &self.inner.loader)
			.field("reloads", &self.inner.reloads)
			.field("preload", &self.inner.preload)
			.finish()
	}
}

impl BundleProvider {
	/// Creates a provider publishing nothing. Call [`Self::start`] to begin the
	/// activation reload.
	pub fn new(config: &ProviderConfig, store: Arc<dyn CatalogStore>, scheduler: Arc<dyn JobScheduler>) -> Self {
		Self::with_publisher(config, store, scheduler, Arc::new(NoopPublisher::default()))
	}

	pub fn with_publisher(config: &ProviderConfig, store: Arc<dyn CatalogStore>, scheduler: Arc<dyn JobScheduler>, publisher: Arc<dyn BundlePublisher>) -> Self {
		let loader = LoadCoordinator::new(config.default_locale(), PathFilter::from_config(config), store, publisher);
		let reloads = ReloadScheduler::new(scheduler, config.invalidation_delay());
		Self {
			inner: Arc::new(ProviderInner {
				loader,
				reloads,
				preload: config.preload_bundles,
			}),
		}
	}

	/// Schedules the activation reload (clear, then preload when enabled)
	/// without delay. An unavailable scheduler is logged: the cache then
	/// works, but without the activation preload.
	pub fn start(&self) {
		tracing::debug!(default_locale = %self.default_locale(), preload = self.inner.preload, "provider.start");
		if let Err(error) = self.inner.reloads.schedule_full(false, self.reload_all_job()) {
			tracing::warn!(%error, "provider.start: scheduler unavailable, skipping activation reload");
		}
	}

	/// Closes the registry, cancels pending reloads and forgets every
	/// language root. Bundles requested afterwards are built but not cached.
	pub fn stop(&self) {
		self.inner.loader.registry().close();
		let cancelled = self.inner.reloads.cancel_all();
		self.inner.loader.clear();
		tracing::debug!(cancelled, "provider.stop");
	}

	pub fn is_stopped(&self) -> bool {
		self.inner.loader.registry().is_closed()
	}

	pub fn default_locale(&self) -> &Locale {
		self.inner.loader.default_locale()
	}

	pub fn path_filter(&self) -> &PathFilter {
		self.inner.loader.filter()
	}

	pub fn invalidation_delay(&self) -> Duration {
		self.inner.reloads.delay()
	}

	pub fn get_bundle(&self, locale: Option<&Locale>) -> Result<Arc<Bundle>> {
		self.get_named_bundle(None, locale)
	}

	pub fn get_named_bundle(&self, name: Option<&str>, locale: Option<&Locale>) -> Result<Arc<Bundle>> {
		self.inner.loader.get(name, locale, false)
	}

	/// Currently cached bundles.
	pub fn cached(&self) -> Vec<Arc<Bundle>> {
		self.inner.loader.registry().all()
	}

	/// Known language roots, sorted.
	pub fn language_roots(&self) -> Vec<String> {
		self.inner.loader.roots().snapshot()
	}

	/// Names of pending single-key reload jobs.
	pub fn pending_reloads(&self) -> Vec<String> {
		self.inner.reloads.pending()
	}

	/// Drops every cached bundle and forgets every language root.
	pub fn clear_cache(&self) {
		self.inner.clear_cache();
	}

	/// Loads every catalog listed by the store, once per key, when preloading
	/// is enabled. Roots rejected by the path filter are skipped.
	pub fn preload_bundles(&self) -> Result<()> {
		self.inner.preload_bundles()
	}

	/// Reloads `key` now and cascades to every cached bundle chained to it.
	pub fn reload_bundle(&self, key: &Key) -> Result<()> {
		self.inner.reload_bundle(key)
	}

	/// Classifies a change batch and schedules the resulting reloads.
	///
	/// Store errors abort the batch and leave the cache untouched. Ignored
	/// once stopped.
	pub fn on_change(&self, batch: &[ChangeEvent]) {
		if self.is_stopped() {
			return;
		}
		match ChangeProcessor::new(&self.inner.loader).classify(batch) {
			Ok(Invalidation::None) => {}
			Ok(Invalidation::Full) => {
				if let Err(error) = self.inner.reloads.schedule_full(true, self.reload_all_job()) {
					tracing::warn!(%error, "provider.on_change: cannot schedule full reload");
				}
			}
			Ok(Invalidation::Bundles(keys)) => {
				for key in keys {
					if let Err(error) = self.schedule_reload(&key) {
						tracing::warn!(%key, %error, "provider.on_change: cannot schedule reload");
					}
				}
			}
			Err(error) => tracing::warn!(%error, events = batch.len(), "provider.on_change: batch aborted"),
		}
	}

	/// Adds locator paths and clears the cache when the set changed.
	pub fn register_locator_paths(&self, locators: impl IntoIterator<Item = LocatorPaths>) {
		if self.inner.loader.register_locators(locators) {
			self.inner.clear_cache();
		}
	}

	/// Removes locator paths and clears the cache when the set changed.
	pub fn unregister_locator_paths(&self, locators: &[LocatorPaths]) {
		if self.inner.loader.unregister_locators(locators) {
			self.inner.clear_cache();
		}
	}

	fn schedule_reload(&self, key: &Key) -> std::result::Result<String, lingua_worker::SchedulerError> {
		let weak = Arc::downgrade(&self.inner);
		let job_key = key.clone();
		let job_name = crate::reload_job_name(key);
		let (name, _) = self.inner.reloads.schedule_single(key, move |id| {
			Box::new(move || {
				let Some(inner) = weak.upgrade() else {
					return;
				};
				inner.reloads.finished(&job_name, id);
				if let Err(error) = inner.reload_bundle(&job_key) {
					tracing::error!(key = %job_key, %error, "provider: reload failed");
				}
			})
		})?;
		Ok(name)
	}

	fn reload_all_job(&self) -> lingua_worker::Job {
		let weak: Weak<ProviderInner> = Arc::downgrade(&self.inner);
		Box::new(move || {
			let Some(inner) = weak.upgrade() else {
				return;
			};
			tracing::info!("reloading all bundles");
			inner.clear_cache();
			if let Err(error) = inner.preload_bundles() {
				tracing::error!(%error, "provider: preload failed");
			}
		})
	}
}

impl ProviderInner {
	fn clear_cache(&self) {
		self.loader.clear();
	}

	fn preload_bundles(&self) -> Result<()> {
		if !self.preload || self.loader.registry().is_closed() {
			return Ok(());
		}
		let records = self.loader.store().query_all_language_roots().map_err(crate::BundleError::Store)?;
		let mut seen = rustc_hash::FxHashSet::default();
		for record in records {
			if !self.loader.filter().includes(&record.path) {
				tracing::warn!(
					language = %record.language,
					path = %record.path,
					"ignoring bundle because it is not included by the path filter"
				);
				continue;
			}
			let key = Key::new(record.name.as_deref(), Locale::parse(&record.language));
			if seen.insert(key.clone()) {
				self.loader.get_key(&key, false)?;
			}
		}
		Ok(())
	}

	/// Reloads `key`, then every cached bundle whose parent is `key`,
	/// recursively.
	///
	/// With preloading the key is rebuilt before its dependents, so rebuilt
	/// dependents chain to the fresh parent and lookups keep returning the
	/// previous bundles until the replacements publish. Without preloading
	/// the keys are evicted and rebuilt by the next lookup.
	fn reload_bundle(&self, key: &Key) -> Result<()> {
		tracing::info!(%key, "reloading bundle");
		let dependents: Vec<Key> = self
			.loader
			.registry()
			.all()
			.into_iter()
			.filter(|bundle| bundle.parent_key() == Some(key))
			.map(|bundle| bundle.key().clone())
			.collect();

		if !self.preload {
			self.loader.registry().evict(key);
		} else if !self.loader.registry().is_closed() {
			self.loader.get_key(key, true)?;
		}

		for dependent in dependents {
			tracing::debug!(%dependent, parent = %key, "also reloading dependent bundle");
			self.reload_bundle(&dependent)?;
		}
		Ok(())
	}
}

impl BundleSource for BundleProvider {
	fn default_locale(&self) -> Locale {
		BundleProvider::default_locale(self).clone()
	}

	fn get_named_bundle(&self, name: Option<&str>, locale: Option<&Locale>) -> Result<Arc<Bundle>> {
		BundleProvider::get_named_bundle(self, name, locale)
	}
}
