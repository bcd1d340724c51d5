use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use lingua_bundles::{BundleProvider, CatalogStore, MemoryStore};
use lingua_config::ProviderConfig;
use lingua_locale::Locale;
use lingua_worker::ManualScheduler;

/// Prints `key = translation` for each key, or for every key of the chain
/// when `keys` is empty.
pub fn lookup(out: &mut impl Write, config: Option<&Path>, content: &Path, locale: Option<&str>, name: Option<&str>, keys: &[String]) -> anyhow::Result<()> {
	let config = match config {
		Some(path) => ProviderConfig::load(path)?,
		None => ProviderConfig::default(),
	};
	let json = std::fs::read_to_string(content).with_context(|| format!("reading content fixture {}", content.display()))?;
	let store = MemoryStore::from_json(&json).with_context(|| format!("parsing content fixture {}", content.display()))?;
	tracing::debug!(nodes = store.len(), "lookup: content loaded");

	// Nothing runs in the background for a one-shot lookup.
	let provider = BundleProvider::new(&config, Arc::new(store) as Arc<dyn CatalogStore>, Arc::new(ManualScheduler::new()));
	let locale = locale.map(Locale::parse);
	let bundle = provider.get_named_bundle(name, locale.as_ref())?;
	tracing::debug!(key = %bundle.key(), roots = ?bundle.language_roots(), "lookup: bundle resolved");

	if keys.is_empty() {
		for key in bundle.keys() {
			writeln!(out, "{key} = {}", bundle.get(key))?;
		}
	} else {
		for key in keys {
			writeln!(out, "{key} = {}", bundle.get(key))?;
		}
	}
	Ok(())
}

/// Prints the locale and each fallback parent, one per line, ending with the
/// empty root.
pub fn chain(out: &mut impl Write, default_locale: &str, locale: &str) -> anyhow::Result<()> {
	let default_locale = Locale::parse(default_locale);
	for step in Locale::parse(locale).chain(&default_locale) {
		writeln!(out, "{step}")?;
	}
	writeln!(out, "<root>")?;
	Ok(())
}

pub fn parse(out: &mut impl Write, input: &str) -> anyhow::Result<()> {
	let locale = Locale::parse(input);
	writeln!(out, "language: {}", locale.language())?;
	writeln!(out, "script:   {}", locale.script().unwrap_or("-"))?;
	writeln!(out, "region:   {}", locale.region().unwrap_or("-"))?;
	writeln!(out, "variant:  {}", locale.variant().unwrap_or("-"))?;
	writeln!(out, "locale:   {locale}")?;
	writeln!(out, "tag:      {}", locale.to_language_tag())?;
	Ok(())
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;

	use super::*;

	const FIXTURE: &str = r#"{
		"/libs/i18n/en": { "language": "en" },
		"/libs/i18n/en/kitchen": { "resource-type": "message-entry", "message": "Kitchen" },
		"/libs/i18n/en/door": { "resource-type": "message-entry", "message": "Door" },
		"/libs/i18n/de": { "language": "de" },
		"/libs/i18n/de/kitchen": { "resource-type": "message-entry", "message": "Küche" },
		"/libs/forms/i18n/de": { "language": "de", "basename": "forms" },
		"/libs/forms/i18n/de/submit": { "resource-type": "message-entry", "message": "Absenden" }
	}"#;

	fn output(run: impl FnOnce(&mut Vec<u8>) -> anyhow::Result<()>) -> String {
		let mut out = Vec::new();
		run(&mut out).expect("command");
		String::from_utf8(out).expect("utf8")
	}

	fn fixture() -> tempfile::NamedTempFile {
		let mut file = tempfile::NamedTempFile::new().expect("tempfile");
		file.write_all(FIXTURE.as_bytes()).expect("write fixture");
		file
	}

	#[test]
	fn lookup_translates_requested_keys() {
		let content = fixture();
		let keys = ["kitchen", "door", "missing"].map(String::from);
		let text = output(|out| lookup(out, None, content.path(), Some("de-CH"), None, &keys));
		assert_eq!(text, "kitchen = Küche\ndoor = Door\nmissing = missing\n");
	}

	#[test]
	fn lookup_lists_the_whole_chain_without_keys() {
		let content = fixture();
		let text = output(|out| lookup(out, None, content.path(), Some("de"), Some("forms"), &[]));
		assert_eq!(text, "submit = Absenden\n");
	}

	#[test]
	fn lookup_honours_the_configured_default_locale() {
		let content = fixture();
		let mut config = tempfile::NamedTempFile::new().expect("tempfile");
		config.write_all(b"locale-default = \"de\"\n").expect("write config");
		let keys = ["kitchen".to_owned()];
		let text = output(|out| lookup(out, Some(config.path()), content.path(), None, None, &keys));
		assert_eq!(text, "kitchen = Küche\n");
	}

	#[test]
	fn lookup_reports_unreadable_content() {
		let mut out = Vec::new();
		let err = lookup(&mut out, None, Path::new("/nonexistent/content.json"), None, None, &[]).unwrap_err();
		assert!(err.to_string().contains("reading content fixture"));
	}

	#[test]
	fn chain_ends_at_the_root() {
		let text = output(|out| chain(out, "fr", "zh_Hans_CN_variant1"));
		assert_eq!(text, "zh_Hans_CN_variant1\nzh_Hans_CN\nzh_Hans\nzh\nfr\n<root>\n");
	}

	#[test]
	fn parse_shows_components() {
		let text = output(|out| parse(out, "zh-hans-cn"));
		assert_eq!(
			text,
			"language: zh\nscript:   Hans\nregion:   CN\nvariant:  -\nlocale:   zh_Hans_CN\ntag:      zh-Hans-CN\n"
		);
	}
}
