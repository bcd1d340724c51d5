mod common;

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use lingua_bundles::{BundleError, Key, Node};
use lingua_locale::Locale;
use pretty_assertions::assert_eq;

use common::harness;

fn key(locale: Locale) -> Key {
	Key::new(None, locale)
}

#[test]
fn reloading_a_leaf_leaves_its_parent_alone() {
	let h = harness(true);
	let en = h.provider.get_bundle(Some(&Locale::new("en"))).unwrap();
	let de = h.provider.get_bundle(Some(&Locale::new("de"))).unwrap();

	h.provider.reload_bundle(&key(Locale::new("de"))).unwrap();

	let reloaded = h.provider.get_bundle(Some(&Locale::new("de"))).unwrap();
	assert!(!Arc::ptr_eq(&de, &reloaded));
	assert!(Arc::ptr_eq(&en, &h.provider.get_bundle(Some(&Locale::new("en"))).unwrap()));
	assert!(Arc::ptr_eq(reloaded.parent().unwrap(), &en));
	assert_eq!(h.store.read_locales(), ["en", "de", "de"]);
}

#[test]
fn reloading_a_parent_cascades_down_the_chain() {
	let h = harness(true);
	let old_leaf = h.provider.get_bundle(Some(&Locale::with_region("de", "CH"))).unwrap();
	assert_eq!(old_leaf.get("door"), "Door");

	h.store.inner.insert("/libs/i18n/en/door", Node::message_entry("Front door"));
	h.provider.reload_bundle(&key(Locale::new("en"))).unwrap();

	let leaf = h.provider.get_bundle(Some(&Locale::with_region("de", "CH"))).unwrap();
	let de = h.provider.get_bundle(Some(&Locale::new("de"))).unwrap();
	let en = h.provider.get_bundle(None).unwrap();
	assert_eq!(leaf.get("door"), "Front door");
	assert_eq!(leaf.get("kitchen"), "Chuchi");
	assert!(Arc::ptr_eq(leaf.parent().unwrap(), &de));
	assert!(Arc::ptr_eq(de.parent().unwrap(), &en));
	assert_eq!(h.store.read_locales(), ["de_CH", "de", "en", "en", "de", "de_CH"]);

	assert_eq!(h.publisher.active().len(), 3);
	assert!(h.publisher.release_counts().iter().all(|(_, count)| *count == 1));
}

#[test]
fn without_preload_reload_evicts_the_chain() {
	let h = harness(false);
	h.provider.get_bundle(Some(&Locale::with_region("de", "CH"))).unwrap();
	h.provider.get_bundle(Some(&Locale::new("fr"))).unwrap();
	assert_eq!(h.provider.cached().len(), 4);

	h.provider.reload_bundle(&key(Locale::new("de"))).unwrap();

	let mut left: Vec<String> = h.provider.cached().iter().map(|bundle| bundle.locale().to_string()).collect();
	left.sort();
	assert_eq!(left, ["en", "fr"]);

	h.store.inner.insert("/libs/i18n/de_CH/kitchen", Node::message_entry("Chuchichäschtli"));
	let leaf = h.provider.get_bundle(Some(&Locale::with_region("de", "CH"))).unwrap();
	assert_eq!(leaf.get("kitchen"), "Chuchichäschtli");
}

#[test]
fn preload_reload_keeps_serving_the_previous_bundle() {
	let h = harness(true);
	let de = Locale::new("de");
	let old = h.provider.get_bundle(Some(&de)).unwrap();
	h.store.inner.insert("/libs/i18n/de/kitchen", Node::message_entry("Kochstube"));

	thread::scope(|s| {
		let gate = h.store.hold_reads();
		let reload = s.spawn(|| h.provider.reload_bundle(&key(Locale::new("de"))));
		thread::sleep(Duration::from_millis(20));

		let during = h.provider.get_bundle(Some(&de)).unwrap();
		assert!(Arc::ptr_eq(&old, &during));
		assert_eq!(during.get("kitchen"), "Küche");

		drop(gate);
		reload.join().expect("reload panicked").unwrap();
	});

	let fresh = h.provider.get_bundle(Some(&de)).unwrap();
	assert!(!Arc::ptr_eq(&old, &fresh));
	assert_eq!(fresh.get("kitchen"), "Kochstube");
}

#[test]
fn failed_reload_keeps_the_cached_bundle() {
	let h = harness(true);
	let de = h.provider.get_bundle(Some(&Locale::new("de"))).unwrap();
	h.store.inner.set_available(false);

	let err = h.provider.reload_bundle(&key(Locale::new("de"))).unwrap_err();
	assert!(matches!(err, BundleError::StoreUnavailable { .. }));
	assert!(Arc::ptr_eq(&de, &h.provider.get_bundle(Some(&Locale::new("de"))).unwrap()));
}

#[test]
fn named_catalogs_reload_independently() {
	let h = harness(true);
	h.store.inner.insert("/apps/forms/i18n/de", Node::language_root("de").with_basename("forms"));
	h.store.inner.insert("/apps/forms/i18n/de/submit", Node::message_entry("Absenden"));

	let forms = h.provider.get_named_bundle(Some("forms"), Some(&Locale::new("de"))).unwrap();
	let plain = h.provider.get_bundle(Some(&Locale::new("de"))).unwrap();
	assert_eq!(forms.get("submit"), "Absenden");
	assert_eq!(plain.get("submit"), "Absenden");
	assert_eq!(forms.parent_key(), Some(&Key::new(Some("forms"), Locale::new("en"))));

	h.provider.reload_bundle(&Key::new(Some("forms"), Locale::new("de"))).unwrap();
	assert!(Arc::ptr_eq(&plain, &h.provider.get_bundle(Some(&Locale::new("de"))).unwrap()));
}
