use std::collections::BTreeMap;
use std::ops::Bound;
use std::sync::atomic::{AtomicBool, Ordering};

use lingua_locale::Locale;
use parking_lot::RwLock;
use serde::{Deserialize, Deserializer};

use super::{Catalog, CatalogQuery, CatalogStore, LanguageRootRecord, MIXIN_LANGUAGE, MIXIN_MESSAGE, RT_MESSAGE_ENTRY, ResourceKind};
use crate::StoreError;

/// Properties of one content node.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct Node {
	/// Marks a language root for this locale string (`de`, `en-US`, `en_gb`).
	pub language: Option<String>,
	/// Catalog names of a language root. A single string is accepted.
	#[serde(deserialize_with = "one_or_many")]
	pub basename: Vec<String>,
	pub resource_type: Option<String>,
	#[serde(deserialize_with = "one_or_many")]
	pub mixins: Vec<String>,
	/// Message key; defaults to the node name.
	pub key: Option<String>,
	pub message: Option<String>,
	/// Messages of a JSON dictionary document, stored on its language root.
	pub dictionary: BTreeMap<String, String>,
}

impl Node {
	/// A language root folder.
	pub fn language_root(language: impl Into<String>) -> Self {
		Self {
			language: Some(language.into()),
			mixins: vec![MIXIN_LANGUAGE.to_owned()],
			..Self::default()
		}
	}

	/// A JSON dictionary document holding `entries`.
	pub fn json_dictionary<K, V>(language: impl Into<String>, entries: impl IntoIterator<Item = (K, V)>) -> Self
	where
		K: Into<String>,
		V: Into<String>,
	{
		Self {
			dictionary: entries.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
			..Self::language_root(language)
		}
	}

	/// A message entry keyed by its node name.
	pub fn message_entry(message: impl Into<String>) -> Self {
		Self {
			resource_type: Some(RT_MESSAGE_ENTRY.to_owned()),
			message: Some(message.into()),
			..Self::default()
		}
	}

	pub fn with_key(mut self, key: impl Into<String>) -> Self {
		self.key = Some(key.into());
		self
	}

	pub fn with_basename(mut self, name: impl Into<String>) -> Self {
		self.basename.push(name.into());
		self
	}

	pub fn with_mixin(mut self, mixin: impl Into<String>) -> Self {
		self.mixins.push(mixin.into());
		self
	}

	fn has_mixin(&self, mixin: &str) -> bool {
		self.mixins.iter().any(|m| m == mixin)
	}
}

fn one_or_many<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
	#[derive(Deserialize)]
	#[serde(untagged)]
	enum OneOrMany {
		One(String),
		Many(Vec<String>),
	}

	Ok(match OneOrMany::deserialize(deserializer)? {
		OneOrMany::One(value) => vec![value],
		OneOrMany::Many(values) => values,
	})
}

/// In-memory hierarchical content store keyed by absolute path.
///
/// Parent nodes need not exist: hierarchy is purely textual, `/a/b` is a
/// child of `/a` whether or not `/a` was inserted.
#[derive(Debug)]
pub struct MemoryStore {
	nodes: RwLock<BTreeMap<String, Node>>,
	available: AtomicBool,
}

impl Default for MemoryStore {
	fn default() -> Self {
		Self {
			nodes: RwLock::new(BTreeMap::new()),
			available: AtomicBool::new(true),
		}
	}
}

impl MemoryStore {
	pub fn new() -> Self {
		Self::default()
	}

	/// Loads a fixture of the form `{ "/libs/i18n/de": { "language": "de" }, ... }`.
	pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
		let nodes: BTreeMap<String, Node> = serde_json::from_str(json)?;
		Ok(Self {
			nodes: RwLock::new(nodes),
			..Self::default()
		})
	}

	pub fn insert(&self, path: impl Into<String>, node: Node) -> Option<Node> {
		self.nodes.write().insert(path.into(), node)
	}

	/// Removes the node at `path` and its descendants, returning how many
	/// nodes were removed.
	pub fn remove(&self, path: &str) -> usize {
		let mut nodes = self.nodes.write();
		let doomed: Vec<String> = std::iter::once(path.to_owned())
			.filter(|path| nodes.contains_key(path))
			.chain(descendants(&nodes, path).map(|(p, _)| p.clone()))
			.collect();
		for path in &doomed {
			nodes.remove(path);
		}
		doomed.len()
	}

	pub fn get(&self, path: &str) -> Option<Node> {
		self.nodes.read().get(path).cloned()
	}

	pub fn len(&self) -> usize {
		self.nodes.read().len()
	}

	pub fn is_empty(&self) -> bool {
		self.nodes.read().is_empty()
	}

	/// Makes every subsequent call fail with [`StoreError::Unavailable`]
	/// until re-enabled.
	pub fn set_available(&self, available: bool) {
		self.available.store(available, Ordering::Release);
	}

	fn ensure_available(&self) -> Result<(), StoreError> {
		if self.available.load(Ordering::Acquire) {
			Ok(())
		} else {
			Err(StoreError::Unavailable("no session for the in-memory store".to_owned()))
		}
	}
}

impl CatalogStore for MemoryStore {
	fn read_catalog(&self, query: &CatalogQuery<'_>) -> Result<Catalog, StoreError> {
		self.ensure_available()?;
		let nodes = self.nodes.read();
		let check = RootCheck::new(query.name, query.locale);

		let mut roots: Vec<&str> = nodes
			.iter()
			.filter(|(path, node)| query.filter.includes(path) && check.matches(node))
			.map(|(path, _)| path.as_str())
			.collect();
		for locator in query.locators {
			let located = nodes
				.get_key_value(locator.path.as_str())
				.into_iter()
				.chain(descendants(&nodes, &locator.path).filter(|(path, _)| relative_depth(&locator.path, path) <= locator.traverse_depth))
				.filter(|(_, node)| check.matches(node));
			for (path, _) in located {
				if !roots.contains(&path.as_str()) {
					roots.push(path);
				}
			}
		}
		roots.sort_by(|a, b| search_tier(a).cmp(&search_tier(b)).then_with(|| a.cmp(b)));

		let mut catalog = Catalog::default();
		for root in roots {
			if let Some(node) = nodes.get(root) {
				catalog.entries.extend(node.dictionary.iter().map(|(k, v)| (k.clone(), v.clone())));
			}
			for (path, node) in descendants(&nodes, root) {
				if let Some(message) = &node.message {
					let key = node.key.clone().unwrap_or_else(|| node_name(path).to_owned());
					catalog.entries.push((key, message.clone()));
				}
			}
			catalog.language_roots.push(root.to_owned());
		}
		tracing::trace!(
			name = query.name.unwrap_or_default(),
			locale = %query.locale,
			roots = ?catalog.language_roots,
			entries = catalog.entries.len(),
			"memory_store.read_catalog"
		);
		Ok(catalog)
	}

	fn classify_resource(&self, path: &str) -> Result<ResourceKind, StoreError> {
		self.ensure_available()?;
		let nodes = self.nodes.read();
		let Some(node) = nodes.get(path) else {
			tracing::trace!(path, "memory_store.classify: no resource");
			return Ok(ResourceKind::None);
		};
		if node.resource_type.as_deref() == Some(RT_MESSAGE_ENTRY) || node.has_mixin(MIXIN_MESSAGE) {
			return Ok(ResourceKind::MessageEntry);
		}
		if path.ends_with(".json") && node.has_mixin(MIXIN_LANGUAGE) {
			return Ok(ResourceKind::LanguageRoot);
		}
		Ok(ResourceKind::None)
	}

	fn query_all_language_roots(&self) -> Result<Vec<LanguageRootRecord>, StoreError> {
		self.ensure_available()?;
		let nodes = self.nodes.read();
		let mut records = Vec::new();
		for (path, node) in nodes.iter() {
			let Some(language) = node.language.as_deref().filter(|language| !language.is_empty()) else {
				continue;
			};
			let record = |name: Option<&String>| LanguageRootRecord {
				path: path.clone(),
				language: language.to_owned(),
				name: name.cloned(),
			};
			if node.basename.is_empty() {
				records.push(record(None));
			} else {
				records.extend(node.basename.iter().map(Some).map(record));
			}
		}
		Ok(records)
	}
}

/// Matches language roots of one (name, locale).
///
/// The `language` property may hold the underscore form, the language tag
/// form, or either in lowercase.
struct RootCheck<'a> {
	name: Option<&'a str>,
	forms: [String; 4],
}

impl<'a> RootCheck<'a> {
	fn new(name: Option<&'a str>, locale: &Locale) -> Self {
		let underscore = locale.to_string();
		let tag = locale.to_language_tag();
		Self {
			name,
			forms: [underscore.to_lowercase(), underscore, tag.to_lowercase(), tag],
		}
	}

	fn matches(&self, node: &Node) -> bool {
		let Some(language) = node.language.as_deref().filter(|language| !language.is_empty()) else {
			return false;
		};
		self.forms.iter().any(|form| form == language) && self.name.is_none_or(|name| node.basename.iter().any(|basename| basename == name))
	}
}

fn descendants<'n>(nodes: &'n BTreeMap<String, Node>, root: &str) -> impl Iterator<Item = (&'n String, &'n Node)> {
	let prefix = if root.ends_with('/') { root.to_owned() } else { format!("{root}/") };
	nodes
		.range::<str, _>((Bound::Included(prefix.as_str()), Bound::Unbounded))
		.take_while(move |(path, _)| path.starts_with(prefix.as_str()))
}

fn relative_depth(root: &str, path: &str) -> usize {
	path[root.len()..].split('/').filter(|segment| !segment.is_empty()).count()
}

fn node_name(path: &str) -> &str {
	path.rsplit('/').next().unwrap_or(path)
}

/// Application order of language roots: later tiers override earlier ones.
fn search_tier(path: &str) -> u8 {
	let under = |prefix: &str| path == prefix || path.strip_prefix(prefix).is_some_and(|rest| rest.starts_with('/'));
	if under("/apps") {
		2
	} else if under("/libs") {
		1
	} else {
		0
	}
}
