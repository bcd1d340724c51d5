#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use lingua_bundles::{BundleProvider, BundlePublisher, Catalog, CatalogQuery, CatalogStore, LanguageRootRecord, MemoryStore, Node, RecordingPublisher, ResourceKind, StoreError};
use lingua_config::ProviderConfig;
use lingua_worker::{JobScheduler, ManualScheduler};
use parking_lot::{Mutex, RwLock, RwLockWriteGuard};
// Dev-dependencies used by only some test targets.
use rstest as _;
use tokio as _;

/// Memory store that counts catalog reads and can hold them back.
#[derive(Default)]
pub struct LatchStore {
	pub inner: MemoryStore,
	reads: AtomicUsize,
	read_locales: Mutex<Vec<String>>,
	gate: RwLock<()>,
}

impl LatchStore {
	pub fn reads(&self) -> usize {
		self.reads.load(Ordering::SeqCst)
	}

	/// Locales read so far, in read order.
	pub fn read_locales(&self) -> Vec<String> {
		self.read_locales.lock().clone()
	}

	/// Blocks every catalog read until the guard drops.
	pub fn hold_reads(&self) -> RwLockWriteGuard<'_, ()> {
		self.gate.write()
	}
}

impl CatalogStore for LatchStore {
	fn read_catalog(&self, query: &CatalogQuery<'_>) -> Result<Catalog, StoreError> {
		let _open = self.gate.read();
		self.reads.fetch_add(1, Ordering::SeqCst);
		self.read_locales.lock().push(query.locale.to_string());
		self.inner.read_catalog(query)
	}

	fn classify_resource(&self, path: &str) -> Result<ResourceKind, StoreError> {
		self.inner.classify_resource(path)
	}

	fn query_all_language_roots(&self) -> Result<Vec<LanguageRootRecord>, StoreError> {
		self.inner.query_all_language_roots()
	}
}

/// Store with `en`, `de` and `de_CH` roots below `/libs/i18n`.
pub fn kitchen_store() -> Arc<LatchStore> {
	let store = Arc::new(LatchStore::default());
	store.inner.insert("/libs/i18n/en", Node::language_root("en"));
	store.inner.insert("/libs/i18n/en/kitchen", Node::message_entry("Kitchen"));
	store.inner.insert("/libs/i18n/en/door", Node::message_entry("Door"));
	store.inner.insert("/libs/i18n/de", Node::language_root("de"));
	store.inner.insert("/libs/i18n/de/kitchen", Node::message_entry("Küche"));
	store.inner.insert("/libs/i18n/de_CH", Node::language_root("de_CH"));
	store.inner.insert("/libs/i18n/de_CH/kitchen", Node::message_entry("Chuchi"));
	store
}

pub fn config(preload: bool) -> ProviderConfig {
	ProviderConfig {
		preload_bundles: preload,
		..ProviderConfig::default()
	}
}

pub struct Harness {
	pub store: Arc<LatchStore>,
	pub scheduler: Arc<ManualScheduler>,
	pub publisher: Arc<RecordingPublisher>,
	pub provider: BundleProvider,
}

pub fn harness(preload: bool) -> Harness {
	let store = kitchen_store();
	let scheduler = Arc::new(ManualScheduler::new());
	let publisher = Arc::new(RecordingPublisher::default());
	let provider = BundleProvider::with_publisher(
		&config(preload),
		Arc::clone(&store) as Arc<dyn CatalogStore>,
		Arc::clone(&scheduler) as Arc<dyn JobScheduler>,
		Arc::clone(&publisher) as Arc<dyn BundlePublisher>,
	);
	Harness {
		store,
		scheduler,
		publisher,
		provider,
	}
}
