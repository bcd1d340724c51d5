//! Authoritative bundle cache with atomic publication.
//!
//! # Mental model
//!
//! * Readers load the current `Arc<EntryMap>` and look keys up in that
//!   immutable view; they never block.
//! * Writers copy the current map, apply one change and publish the copy with
//!   CAS. A failed CAS means another writer won; the writer retries from the
//!   latest map.
//! * `clear` swaps in an empty map in one step, so a reader sees either the
//!   full old map or the empty one, never a partial state.
//!
//! # Key types
//!
//! | Type | Meaning | Constraints |
//! |---|---|---|
//! | [`BundleRegistry`] | Key to (bundle, registration) cache | Publish via CAS to avoid lost updates |
//! | [`BundlePublisher`] | External publication of cached bundles | Each registration is released exactly once |
//! | [`Registration`] | Handle of one publication | Owned by exactly one registry entry |
//!
//! # Invariants
//!
//! * Every registration handed out is released exactly once: by the writer
//!   that removes its entry from the published map (replace, evict, clear or
//!   close).
//! * Once `publish(k, b)` returns, later lookups of `k` observe `b` or a newer
//!   bundle, until an evict or clear removes it.
//! * After `close`, writes are no-ops and reads keep working against the
//!   (empty) final map.

mod publisher;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use arc_swap::ArcSwap;
pub use publisher::{BundlePublisher, NoopPublisher, PublishEvent, RecordingPublisher, Registration};
use rustc_hash::FxHashMap;

use crate::{Bundle, Key};

#[derive(Debug)]
struct Entry {
	bundle: Arc<Bundle>,
	registration: Registration,
}

type EntryMap = FxHashMap<Key, Arc<Entry>>;

pub struct BundleRegistry {
	map: ArcSwap<EntryMap>,
	closed: AtomicBool,
	publisher: Arc<dyn BundlePublisher>,
}

impl std::fmt::Debug for BundleRegistry {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("BundleRegistry")
			.field("len", &self.len())
			.field("closed", &self.is_closed())
			.finish_non_exhaustive()
	}
}

impl Default for BundleRegistry {
	fn default() -> Self {
		Self::new(Arc::new(NoopPublisher::default()))
	}
}

impl BundleRegistry {
	pub fn new(publisher: Arc<dyn BundlePublisher>) -> Self {
		Self {
			map: ArcSwap::from_pointee(EntryMap::default()),
			closed: AtomicBool::new(false),
			publisher,
		}
	}

	/// Lock-free lookup.
	pub fn lookup(&self, key: &Key) -> Option<Arc<Bundle>> {
		self.map.load().get(key).map(|entry| Arc::clone(&entry.bundle))
	}

	/// Point-in-time snapshot of every cached bundle.
	pub fn all(&self) -> Vec<Arc<Bundle>> {
		self.map.load().values().map(|entry| Arc::clone(&entry.bundle)).collect()
	}

	pub fn keys(&self) -> Vec<Key> {
		let mut keys: Vec<Key> = self.map.load().keys().cloned().collect();
		keys.sort();
		keys
	}

	pub fn len(&self) -> usize {
		self.map.load().len()
	}

	pub fn is_empty(&self) -> bool {
		self.map.load().is_empty()
	}

	pub fn is_closed(&self) -> bool {
		self.closed.load(Ordering::Acquire)
	}

	/// Caches `bundle` under `key`, releasing the registration of any entry it
	/// replaces. Returns `false` without caching once closed.
	pub fn publish(&self, key: Key, bundle: Arc<Bundle>) -> bool {
		if self.is_closed() {
			return false;
		}

		let registration = self.publisher.register(&key, &bundle);
		let entry = Arc::new(Entry { bundle, registration });
		let replaced = self.update(|map| {
			map.insert(key.clone(), Arc::clone(&entry));
		});
		if let Some(old) = replaced.get(&key) {
			self.publisher.unregister(&old.registration);
		}

		// A close racing this publish may have swapped out the map before our
		// insert landed; take the entry back out so nothing outlives the close.
		if self.is_closed() {
			let removed = self.update(|map| {
				if map.get(&key).is_some_and(|current| Arc::ptr_eq(current, &entry)) {
					map.remove(&key);
				}
			});
			if removed.get(&key).is_some_and(|current| Arc::ptr_eq(current, &entry)) {
				self.publisher.unregister(&entry.registration);
			}
			return false;
		}

		tracing::debug!(%key, entries = self.len(), "registry.publish");
		true
	}

	/// Removes and releases the entry for `key`. Returns whether one existed.
	pub fn evict(&self, key: &Key) -> bool {
		if self.is_closed() {
			return false;
		}
		let replaced = self.update(|map| {
			map.remove(key);
		});
		match replaced.get(key) {
			Some(old) => {
				self.publisher.unregister(&old.registration);
				tracing::debug!(%key, entries = self.len(), "registry.evict");
				true
			}
			None => {
				tracing::warn!(%key, "registry.evict: no cached bundle");
				false
			}
		}
	}

	/// Drops every entry in one atomic swap. No-op once closed.
	pub fn clear(&self) {
		if self.is_closed() {
			return;
		}
		self.clear_internal();
	}

	/// Clears and switches to read-only mode. Idempotent.
	pub fn close(&self) {
		if self.closed.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire).is_ok() {
			self.clear_internal();
		}
	}

	fn clear_internal(&self) {
		let old = self.map.swap(Arc::new(EntryMap::default()));
		for entry in old.values() {
			self.publisher.unregister(&entry.registration);
		}
		tracing::debug!(released = old.len(), entries = self.len(), "registry.clear");
	}

	/// Publishes `apply(copy of current map)` with CAS, retrying on conflict.
	/// Returns the map that was replaced.
	fn update(&self, mut apply: impl FnMut(&mut EntryMap)) -> Arc<EntryMap> {
		loop {
			let old = self.map.load_full();
			let mut next = EntryMap::clone(&old);
			apply(&mut next);
			let prev = self.map.compare_and_swap(&old, Arc::new(next));
			if Arc::ptr_eq(&prev, &old) {
				return old;
			}
		}
	}
}
