//! Catalog store boundary.
//!
//! The cache treats the content store as an opaque read source: it asks for
//! the messages of one (name, locale), classifies changed paths, and lists
//! every language root for preloading.

mod memory;

use lingua_locale::Locale;
pub use memory::{MemoryStore, Node};

use crate::{LocatorPaths, PathFilter, StoreError};

/// Node property naming the locale of a language root.
pub const PROP_LANGUAGE: &str = "language";
/// Node property listing the catalog names of a language root.
pub const PROP_BASENAME: &str = "basename";
/// Resource type of a single message entry.
pub const RT_MESSAGE_ENTRY: &str = "message-entry";
/// Mixin marking a message entry.
pub const MIXIN_MESSAGE: &str = "message";
/// Mixin marking a language root, used on JSON dictionaries.
pub const MIXIN_LANGUAGE: &str = "language";

/// What to read for one bundle.
#[derive(Debug, Clone, Copy)]
pub struct CatalogQuery<'a> {
	/// Catalog name; `None` accepts roots of any name.
	pub name: Option<&'a str>,
	pub locale: &'a Locale,
	/// Language roots outside the filter are ignored.
	pub filter: &'a PathFilter,
	/// Extra locations scanned for language roots regardless of the filter.
	pub locators: &'a [LocatorPaths],
}

/// Content of one catalog as read from the store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
	/// Message key and translation pairs in application order; a later pair
	/// overrides an earlier one with the same key.
	pub entries: Vec<(String, String)>,
	/// Language roots the entries were read from.
	pub language_roots: Vec<String>,
}

/// Classification of a changed resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
	/// Not a dictionary artifact, or no such resource.
	None,
	/// A single message entry.
	MessageEntry,
	/// A whole dictionary document carrying the language mixin.
	LanguageRoot,
}

impl ResourceKind {
	pub fn is_dictionary(self) -> bool {
		!matches!(self, Self::None)
	}
}

/// One language root as listed by [`CatalogStore::query_all_language_roots`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageRootRecord {
	pub path: String,
	/// Raw `language` property, parsed leniently by the caller.
	pub language: String,
	pub name: Option<String>,
}

/// Read access to translated-message catalogs.
///
/// Implementations report [`StoreError::Unavailable`] when they cannot reach
/// their backing content; that is never treated as an empty catalog.
pub trait CatalogStore: Send + Sync {
	fn read_catalog(&self, query: &CatalogQuery<'_>) -> Result<Catalog, StoreError>;

	fn classify_resource(&self, path: &str) -> Result<ResourceKind, StoreError>;

	/// Every language root, one record per catalog name it declares.
	fn query_all_language_roots(&self) -> Result<Vec<LanguageRootRecord>, StoreError>;
}
