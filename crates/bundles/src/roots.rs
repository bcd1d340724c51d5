use std::collections::BTreeSet;

use parking_lot::RwLock;

/// Repository paths known to have contributed to some cached bundle.
///
/// Grows on every load and is emptied on full flush. Change classification
/// uses it to spot paths that certainly affect the cache without inspecting
/// each bundle.
#[derive(Debug, Default)]
pub struct LanguageRoots {
	paths: RwLock<BTreeSet<String>>,
}

impl LanguageRoots {
	pub fn extend<'a>(&self, roots: impl IntoIterator<Item = &'a String>) {
		self.paths.write().extend(roots.into_iter().cloned());
	}

	pub fn contains(&self, path: &str) -> bool {
		self.paths.read().contains(path)
	}

	/// Known roots that are strict ancestors of `path`.
	pub fn ancestors_of(&self, path: &str) -> Vec<String> {
		self.paths.read().iter().filter(|root| is_ancestor(root, path)).cloned().collect()
	}

	pub fn snapshot(&self) -> Vec<String> {
		self.paths.read().iter().cloned().collect()
	}

	pub fn clear(&self) {
		self.paths.write().clear();
	}

	pub fn len(&self) -> usize {
		self.paths.read().len()
	}

	pub fn is_empty(&self) -> bool {
		self.paths.read().is_empty()
	}
}

/// `/libs/i18n/de` is an ancestor of `/libs/i18n/de/x` but not of
/// `/libs/i18n/de_basename`.
fn is_ancestor(root: &str, path: &str) -> bool {
	path.strip_prefix(root).is_some_and(|rest| rest.starts_with('/') || (root.ends_with('/') && !rest.is_empty()))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn tracks_ancestors_by_segment() {
		let roots = LanguageRoots::default();
		roots.extend(&["/libs/i18n/de".to_owned(), "/apps/i18n/de.json".to_owned()]);

		assert!(roots.contains("/libs/i18n/de"));
		assert_eq!(roots.ancestors_of("/libs/i18n/de/kitchen"), ["/libs/i18n/de"]);
		assert_eq!(roots.ancestors_of("/apps/i18n/de.json/content"), ["/apps/i18n/de.json"]);
		assert!(roots.ancestors_of("/libs/i18n/de_basename/kitchen").is_empty());
		assert!(roots.ancestors_of("/libs/i18n/de").is_empty());
	}

	#[test]
	fn extend_deduplicates_and_clear_empties() {
		let roots = LanguageRoots::default();
		let de = "/libs/i18n/de".to_owned();
		roots.extend([&de, &de]);
		assert_eq!(roots.len(), 1);

		roots.clear();
		assert!(roots.is_empty());
		assert!(roots.snapshot().is_empty());
	}

	#[test]
	fn slash_terminated_root_covers_children() {
		assert!(is_ancestor("/", "/libs"));
		assert!(!is_ancestor("/", "/"));
	}
}
