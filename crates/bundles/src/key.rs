use std::fmt;

use lingua_locale::Locale;

/// Cache index of one bundle: catalog name (absent for the default catalog)
/// and locale.
///
/// An empty name is the default catalog, so `Key::new(Some(""), l)` equals
/// `Key::new(None, l)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Key {
	name: Option<String>,
	locale: Locale,
}

impl Key {
	pub fn new(name: Option<&str>, locale: Locale) -> Self {
		Self {
			name: name.filter(|name| !name.is_empty()).map(str::to_owned),
			locale,
		}
	}

	pub fn name(&self) -> Option<&str> {
		self.name.as_deref()
	}

	pub fn locale(&self) -> &Locale {
		&self.locale
	}

	/// Key of the same catalog for `locale`.
	pub fn with_locale(&self, locale: Locale) -> Self {
		Self {
			name: self.name.clone(),
			locale,
		}
	}
}

/// Renders `name:locale`, with an empty name for the default catalog
/// (`:de`, `forms:en_GB`). Locales never contain `:`, so the rendering is
/// unambiguous.
impl fmt::Display for Key {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}:{}", self.name.as_deref().unwrap_or_default(), self.locale)
	}
}
