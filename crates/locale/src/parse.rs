use std::sync::OnceLock;

use crate::{Locale, iso};

/// Environment variables consulted for the platform locale, in priority order.
const LOCALE_ENV: [&str; 3] = ["LC_ALL", "LC_MESSAGES", "LANG"];

/// Returns the process-wide platform locale.
///
/// Derived once from `LC_ALL`, `LC_MESSAGES` or `LANG` (encoding and modifier
/// suffixes stripped). `C`, `POSIX` and unparseable values resolve to `en_US`.
pub fn platform_default() -> &'static Locale {
	static PLATFORM: OnceLock<Locale> = OnceLock::new();
	PLATFORM.get_or_init(|| {
		let baseline = Locale::with_region("en", "US");
		let raw = LOCALE_ENV.iter().find_map(|var| std::env::var(var).ok().filter(|value| !value.is_empty()));
		let Some(raw) = raw else {
			return baseline;
		};
		let tag = raw.split(['.', '@']).next().unwrap_or_default();
		if tag.is_empty() || tag == "C" || tag == "POSIX" {
			return baseline;
		}
		let locale = parse_with_fallback(tag, &baseline);
		tracing::debug!(env = %raw, locale = %locale, "locale.platform_default");
		locale
	})
}

/// Checks a variant the way strict locale builders do: every `_`/`-`
/// separated subtag is 5-8 alphanumerics, or 4 characters starting with a digit.
pub fn is_valid_variant(variant: &str) -> bool {
	!variant.is_empty()
		&& variant.split(['_', '-']).all(|sub| {
			let alnum = sub.chars().all(|c| c.is_ascii_alphanumeric());
			alnum && ((5..=8).contains(&sub.len()) || (sub.len() == 4 && sub.starts_with(|c: char| c.is_ascii_digit())))
		})
}

pub(crate) fn parse_with_fallback(input: &str, fallback: &Locale) -> Locale {
	if input.is_empty() {
		return fallback.clone();
	}

	let normalized = input.replace('-', "_");
	let mut parts: Vec<&str> = normalized.split('_').collect();
	while parts.last().is_some_and(|part| part.is_empty()) {
		parts.pop();
	}
	let Some(&first) = parts.first() else {
		return fallback.clone();
	};

	let language = if iso::is_language(first) {
		first.to_owned()
	} else {
		tracing::debug!(input, language = first, "locale.parse: unknown language, using fallback");
		fallback.language.clone()
	};

	if parts.len() == 1 {
		return Locale::new(language);
	}

	let has_script = parts[1].len() == 4 && parts[1].chars().all(|c| c.is_ascii_alphabetic());
	let (script, mut region, variant) = match (has_script, parts.len()) {
		(true, 2) => (parts[1], "", ""),
		(false, 2) => ("", parts[1], ""),
		(true, 3) => (parts[1], parts[2], ""),
		(false, _) => ("", parts[1], parts[2]),
		(true, _) => (parts[1], parts[2], parts[3]),
	};

	if !region.is_empty() && !iso::is_region(region) {
		tracing::debug!(input, region, "locale.parse: unknown region, using fallback");
		region = fallback.region.as_str();
	}

	if !variant.is_empty() && !is_valid_variant(variant) && !script.is_empty() {
		return Locale::from_parts(language, script, region, "");
	}
	Locale::from_parts(language, script, region, variant)
}
