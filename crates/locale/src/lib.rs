//! Locale identifiers for message catalogs.
//!
//! A [`Locale`] is an ordered specialization tuple of language, script,
//! region and variant. Two locales are equal only when all four components
//! match. This crate provides:
//!
//! - lenient parsing of `en_GB` / `en-GB` style strings ([`Locale::parse`]),
//!   where malformed input degrades to a platform fallback instead of failing;
//! - parent resolution used for catalog fallback ([`Locale::parent`]) and the
//!   [`LocaleChain`] iterator built on top of it.
//!
//! # Parent chain
//!
//! Parents are strictly less specific than their child, so every chain is
//! finite (at most five steps) and cycle free:
//!
//! ```
//! use lingua_locale::Locale;
//!
//! let default = Locale::new("fr");
//! let chain: Vec<String> = Locale::parse("en_GB_variant1").chain(&default).map(|l| l.to_string()).collect();
//! assert_eq!(chain, ["en_GB_variant1", "en_GB", "en", "fr"]);
//! ```

mod iso;
mod parse;

use std::fmt;
use std::sync::OnceLock;

pub use parse::{is_valid_variant, platform_default};

/// Language, optional script, optional region, optional variant.
///
/// Absent components are stored as empty strings. Components are normalized
/// on construction: language lowercase, script title case, region uppercase;
/// the variant keeps its case.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Locale {
	language: String,
	script: String,
	region: String,
	variant: String,
}

impl Locale {
	/// Locale with only a language.
	pub fn new(language: impl AsRef<str>) -> Self {
		Self::from_parts(language, "", "", "")
	}

	/// Locale with language and region.
	pub fn with_region(language: impl AsRef<str>, region: impl AsRef<str>) -> Self {
		Self::from_parts(language, "", region, "")
	}

	/// Locale from all four components, normalizing case.
	pub fn from_parts(language: impl AsRef<str>, script: impl AsRef<str>, region: impl AsRef<str>, variant: impl AsRef<str>) -> Self {
		Self {
			language: language.as_ref().to_ascii_lowercase(),
			script: title_case(script.as_ref()),
			region: region.as_ref().to_ascii_uppercase(),
			variant: variant.as_ref().to_owned(),
		}
	}

	/// The empty locale, carried by the root bundle.
	pub fn root() -> &'static Locale {
		static ROOT: OnceLock<Locale> = OnceLock::new();
		ROOT.get_or_init(Locale::default)
	}

	/// Parses a locale string, falling back to [`platform_default`] for
	/// unknown languages and regions.
	pub fn parse(input: &str) -> Self {
		parse::parse_with_fallback(input, platform_default())
	}

	/// Parses a locale string against an explicit fallback locale.
	///
	/// `-` and `_` are equivalent separators. An unknown language is replaced
	/// by the fallback's language, an unknown region by the fallback's region;
	/// a four-letter alphabetic second segment is a script; anything after the
	/// region is the variant and later segments are ignored. Empty input yields
	/// the fallback itself.
	pub fn parse_with_fallback(input: &str, fallback: &Locale) -> Self {
		parse::parse_with_fallback(input, fallback)
	}

	pub fn language(&self) -> &str {
		&self.language
	}

	pub fn script(&self) -> Option<&str> {
		non_empty(&self.script)
	}

	pub fn region(&self) -> Option<&str> {
		non_empty(&self.region)
	}

	pub fn variant(&self) -> Option<&str> {
		non_empty(&self.variant)
	}

	/// Returns true for the empty root locale.
	pub fn is_root(&self) -> bool {
		self.language.is_empty() && self.script.is_empty() && self.region.is_empty() && self.variant.is_empty()
	}

	/// Returns the fallback parent of this locale, or `None` at the chain terminus.
	///
	/// Checked most-specific first:
	/// 1. script and variant: drop the variant;
	/// 2. script and region: drop the region;
	/// 3. script only: drop the script;
	/// 4. variant: drop the variant;
	/// 5. region: drop the region;
	/// 6. language differs from `default`'s language: `default`;
	/// 7. otherwise no parent.
	///
	/// A locale with script and variant but no region cannot come out of
	/// [`Locale::parse`]; rule 1 applies to it like any other and yields the
	/// language + script locale.
	pub fn parent(&self, default: &Locale) -> Option<Locale> {
		let has_script = !self.script.is_empty();
		let has_region = !self.region.is_empty();
		let has_variant = !self.variant.is_empty();

		if has_script && has_variant {
			Some(self.strip(true, true, false))
		} else if has_script && has_region {
			Some(self.strip(true, false, false))
		} else if has_script {
			Some(self.strip(false, false, false))
		} else if has_variant {
			Some(self.strip(false, true, false))
		} else if has_region {
			Some(self.strip(false, false, false))
		} else if self.language != default.language {
			Some(default.clone())
		} else {
			None
		}
	}

	/// Iterates this locale followed by its parents.
	pub fn chain<'a>(&self, default: &'a Locale) -> LocaleChain<'a> {
		LocaleChain {
			next: Some(self.clone()),
			default,
		}
	}

	/// BCP 47 style rendering (`zh-Hans-CN`).
	pub fn to_language_tag(&self) -> String {
		self.render('-')
	}

	fn strip(&self, keep_script: bool, keep_region: bool, keep_variant: bool) -> Locale {
		Locale {
			language: self.language.clone(),
			script: if keep_script { self.script.clone() } else { String::new() },
			region: if keep_region { self.region.clone() } else { String::new() },
			variant: if keep_variant { self.variant.clone() } else { String::new() },
		}
	}

	fn render(&self, sep: char) -> String {
		let mut out = self.language.clone();
		for part in [&self.script, &self.region] {
			if !part.is_empty() {
				out.push(sep);
				out.push_str(part);
			}
		}
		if !self.variant.is_empty() {
			if self.region.is_empty() && self.script.is_empty() {
				out.push(sep);
			}
			out.push(sep);
			out.push_str(&self.variant);
		}
		out
	}
}

/// Renders underscore separated components (`zh_Hans_CN_variant1`).
impl fmt::Display for Locale {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.render('_'))
	}
}

/// Iterator over a locale and its parents, see [`Locale::chain`].
#[derive(Debug, Clone)]
pub struct LocaleChain<'a> {
	next: Option<Locale>,
	default: &'a Locale,
}

impl Iterator for LocaleChain<'_> {
	type Item = Locale;

	fn next(&mut self) -> Option<Locale> {
		let current = self.next.take()?;
		self.next = current.parent(self.default);
		Some(current)
	}
}

fn non_empty(value: &str) -> Option<&str> {
	(!value.is_empty()).then_some(value)
}

fn title_case(value: &str) -> String {
	let mut chars = value.chars();
	match chars.next() {
		Some(first) => first.to_ascii_uppercase().to_string() + &chars.as_str().to_ascii_lowercase(),
		None => String::new(),
	}
}

#[cfg(test)]
mod tests;
