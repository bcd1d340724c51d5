use std::sync::{Arc, OnceLock};

use indexmap::IndexMap;
use lingua_locale::Locale;
use rustc_hash::FxHashSet;

use crate::{Catalog, Key};

/// Immutable message table for one [`Key`], chained to a parent bundle for
/// keys it does not define.
///
/// Every chain ends at the shared [root bundle](Bundle::root), which has no
/// entries and answers every lookup with the key itself. A reload never
/// mutates a bundle; it publishes a new one under the same key.
///
/// The parent is held as a strong [`Arc`]. Parents never point back at their
/// children, so chains cannot form cycles. A bundle handed out before a
/// reload keeps its old parent alive until the caller drops it, while the
/// registry only ever refers to current bundles: reloading a key also
/// rebuilds or evicts every cached bundle chained to it.
#[derive(Debug)]
pub struct Bundle {
	key: Key,
	entries: IndexMap<String, String>,
	language_roots: Vec<String>,
	parent: Option<Arc<Bundle>>,
}

impl Bundle {
	/// Builds a bundle from catalog content. Later catalog entries override
	/// earlier ones with the same message key.
	pub fn new(key: Key, catalog: Catalog, parent: Arc<Bundle>) -> Self {
		let Catalog { entries, language_roots } = catalog;
		let mut seen = FxHashSet::default();
		let language_roots = language_roots.into_iter().filter(|root| seen.insert(root.clone())).collect();
		Self {
			key,
			entries: entries.into_iter().collect(),
			language_roots,
			parent: Some(parent),
		}
	}

	/// The ultimate parent of every chain: empty locale, no entries.
	pub fn root() -> &'static Arc<Bundle> {
		static ROOT: OnceLock<Arc<Bundle>> = OnceLock::new();
		ROOT.get_or_init(|| {
			Arc::new(Bundle {
				key: Key::new(None, Locale::root().clone()),
				entries: IndexMap::new(),
				language_roots: Vec::new(),
				parent: None,
			})
		})
	}

	pub fn is_root(&self) -> bool {
		std::ptr::eq(self, Arc::as_ptr(Self::root()))
	}

	pub fn key(&self) -> &Key {
		&self.key
	}

	pub fn name(&self) -> Option<&str> {
		self.key.name()
	}

	pub fn locale(&self) -> &Locale {
		self.key.locale()
	}

	/// Repository paths this bundle was built from, in application order.
	pub fn language_roots(&self) -> &[String] {
		&self.language_roots
	}

	/// The fallback bundle, `None` only for the root bundle.
	pub fn parent(&self) -> Option<&Arc<Bundle>> {
		self.parent.as_ref()
	}

	/// Key of the parent when the parent is a cached catalog bundle rather
	/// than the root bundle.
	pub fn parent_key(&self) -> Option<&Key> {
		self.parent.as_ref().filter(|parent| !parent.is_root()).map(|parent| parent.key())
	}

	/// Translation defined by this bundle itself.
	pub fn get_local(&self, key: &str) -> Option<&str> {
		self.entries.get(key).map(String::as_str)
	}

	/// Translation from this bundle or the nearest ancestor defining `key`.
	pub fn message(&self, key: &str) -> Option<&str> {
		let mut current = Some(self);
		while let Some(bundle) = current {
			if let Some(value) = bundle.get_local(key) {
				return Some(value);
			}
			current = bundle.parent.as_deref();
		}
		None
	}

	/// Translation for `key`, or `key` itself when no bundle in the chain
	/// defines it.
	pub fn get<'a>(&'a self, key: &'a str) -> &'a str {
		self.message(key).unwrap_or(key)
	}

	pub fn contains_key(&self, key: &str) -> bool {
		self.message(key).is_some()
	}

	/// Message keys of the whole chain, own keys first, each key once.
	pub fn keys(&self) -> Vec<&str> {
		let mut seen = FxHashSet::default();
		let mut keys = Vec::new();
		let mut current = Some(self);
		while let Some(bundle) = current {
			keys.extend(bundle.entries.keys().map(String::as_str).filter(|key| seen.insert(*key)));
			current = bundle.parent.as_deref();
		}
		keys
	}

	/// Number of entries defined by this bundle itself.
	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}
}
