mod common;

use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

use lingua_bundles::{Bundle, BundleProvider, BundlePublisher, CatalogStore, ChangeEvent, Key, NoopPublisher, Node, RELOAD_ALL_JOB, Registration};
use lingua_locale::Locale;
use lingua_worker::{Instant, JobScheduler, TokioScheduler};
use pretty_assertions::assert_eq;
use tokio::sync::mpsc;

use common::harness;

#[test]
fn change_below_a_root_reloads_that_bundle_after_the_delay() {
	let h = harness(false);
	let leaf = h.provider.get_bundle(Some(&Locale::with_region("de", "CH"))).unwrap();
	h.store.inner.insert("/libs/i18n/de/door", Node::message_entry("Tür"));

	h.provider.on_change(&[ChangeEvent::added("/libs/i18n/de/door")]);
	assert_eq!(h.provider.pending_reloads(), ["reload::de"]);
	assert_eq!(h.scheduler.run_due(Instant::now()), 0);

	assert_eq!(h.scheduler.run_due(Instant::now() + Duration::from_secs(6)), 1);
	assert!(h.provider.pending_reloads().is_empty());
	let left: Vec<String> = h.provider.cached().iter().map(|bundle| bundle.key().to_string()).collect();
	assert_eq!(left, [":en"]);

	let rebuilt = h.provider.get_bundle(Some(&Locale::with_region("de", "CH"))).unwrap();
	assert_eq!(leaf.get("door"), "Door");
	assert_eq!(rebuilt.get("door"), "Tür");
}

#[test]
fn bursts_coalesce_into_one_reload_per_key() {
	let h = harness(true);
	h.provider.get_bundle(Some(&Locale::new("de"))).unwrap();
	h.provider.get_bundle(Some(&Locale::new("en"))).unwrap();

	for _ in 0..5 {
		h.provider.on_change(&[ChangeEvent::changed("/libs/i18n/de/kitchen")]);
	}
	h.provider.on_change(&[ChangeEvent::changed("/libs/i18n/en/door"), ChangeEvent::changed("/libs/i18n/de/kitchen")]);
	assert_eq!(h.provider.pending_reloads(), ["reload::de", "reload::en"]);

	let reads = h.store.reads();
	assert_eq!(h.scheduler.run_all(), 2);
	// `en` cascades to `de`, so `de` is rebuilt by both jobs.
	assert_eq!(h.store.reads() - reads, 3);
}

#[test]
fn change_of_a_root_schedules_a_full_reload_superseding_single_ones() {
	let h = harness(true);
	h.provider.get_bundle(Some(&Locale::with_region("de", "CH"))).unwrap();
	h.provider.on_change(&[ChangeEvent::changed("/libs/i18n/de/kitchen")]);
	assert_eq!(h.provider.pending_reloads(), ["reload::de"]);

	h.provider.on_change(&[ChangeEvent::removed("/libs/i18n/de_CH")]);
	assert!(h.provider.pending_reloads().is_empty());
	assert_eq!(h.scheduler.pending_names(), [RELOAD_ALL_JOB]);
	assert_eq!(h.scheduler.run_due(Instant::now()), 0);

	h.store.inner.remove("/libs/i18n/de_CH");
	assert_eq!(h.scheduler.run_all(), 1);
	let mut cached: Vec<String> = h.provider.cached().iter().map(|bundle| bundle.key().to_string()).collect();
	cached.sort();
	assert_eq!(cached, [":de", ":en"]);
}

#[test]
fn new_dictionaries_outside_known_roots_trigger_a_full_reload() {
	let h = harness(false);
	h.provider.get_bundle(Some(&Locale::new("de"))).unwrap();
	h.store.inner.insert("/apps/i18n/it.json", Node::json_dictionary("it", [("kitchen", "Cucina")]));

	h.provider.on_change(&[ChangeEvent::added("/apps/i18n/it.json")]);
	assert_eq!(h.scheduler.pending_names(), [RELOAD_ALL_JOB]);
	h.scheduler.run_all();
	assert!(h.provider.cached().is_empty());
	assert_eq!(h.provider.get_bundle(Some(&Locale::new("it"))).unwrap().get("kitchen"), "Cucina");
}

#[test]
fn store_errors_abort_the_batch() {
	let h = harness(false);
	let de = h.provider.get_bundle(Some(&Locale::new("de"))).unwrap();
	h.store.inner.set_available(false);

	h.provider.on_change(&[ChangeEvent::added("/apps/i18n/new"), ChangeEvent::changed("/libs/i18n/de")]);
	assert!(h.scheduler.pending_names().is_empty());
	assert!(Arc::ptr_eq(&de, &h.provider.get_bundle(Some(&Locale::new("de"))).unwrap()));
}

#[test]
fn irrelevant_changes_schedule_nothing() {
	let h = harness(false);
	h.provider.get_bundle(Some(&Locale::new("de"))).unwrap();
	h.provider.on_change(&[
		ChangeEvent::changed("/var/eventing/jobs/1"),
		ChangeEvent::changed("/etc/passwd"),
		ChangeEvent::added("/content/site/page"),
	]);
	assert!(h.scheduler.pending_names().is_empty());
}

#[test]
fn concurrent_batches_leave_nothing_behind_a_full_reload() {
	const BATCHES: usize = 50;
	let h = harness(true);
	h.provider.get_bundle(Some(&Locale::with_region("de", "CH"))).unwrap();
	let barrier = Barrier::new(5);

	thread::scope(|s| {
		for writer in 0..4 {
			let (h, barrier) = (&h, &barrier);
			s.spawn(move || {
				barrier.wait();
				for batch in 0..BATCHES {
					let path = match (writer + batch) % 3 {
						0 => "/libs/i18n/de/kitchen",
						1 => "/libs/i18n/en/door",
						_ => "/libs/i18n/de_CH/kitchen",
					};
					h.provider.on_change(&[ChangeEvent::changed(path), ChangeEvent::changed("/libs/i18n/de/kitchen")]);
				}
			});
		}
		let (h, barrier) = (&h, &barrier);
		s.spawn(move || {
			barrier.wait();
			for _ in 0..BATCHES {
				h.scheduler.run_all();
				thread::yield_now();
			}
		});
	});

	h.provider.on_change(&[ChangeEvent::changed("/libs/i18n/de")]);
	assert!(h.provider.pending_reloads().is_empty());
	assert_eq!(h.scheduler.pending_names(), [RELOAD_ALL_JOB]);

	assert_eq!(h.scheduler.run_all(), 1);
	assert!(h.scheduler.pending_names().is_empty());
	assert_eq!(h.provider.get_bundle(Some(&Locale::with_region("de", "CH"))).unwrap().get("door"), "Door");
}

/// Publisher reporting each published key on a channel.
struct ChannelPublisher {
	ids: NoopPublisher,
	tx: mpsc::UnboundedSender<Key>,
}

impl BundlePublisher for ChannelPublisher {
	fn register(&self, key: &Key, bundle: &Arc<Bundle>) -> Registration {
		let _ = self.tx.send(key.clone());
		self.ids.register(key, bundle)
	}

	fn unregister(&self, _registration: &Registration) {}
}

#[tokio::test(start_paused = true)]
async fn tokio_scheduler_rebuilds_after_the_invalidation_delay() {
	let store = common::kitchen_store();
	let (tx, mut rx) = mpsc::unbounded_channel();
	let scheduler = Arc::new(TokioScheduler::new().expect("runtime"));
	let provider = BundleProvider::with_publisher(
		&common::config(true),
		Arc::clone(&store) as Arc<dyn CatalogStore>,
		Arc::clone(&scheduler) as Arc<dyn JobScheduler>,
		Arc::new(ChannelPublisher {
			ids: NoopPublisher::default(),
			tx,
		}),
	);

	let old = provider.get_bundle(Some(&Locale::new("de"))).unwrap();
	assert_eq!(rx.try_recv().ok(), Some(Key::new(None, Locale::new("en"))));
	assert_eq!(rx.try_recv().ok(), Some(Key::new(None, Locale::new("de"))));

	let start = Instant::now();
	store.inner.insert("/libs/i18n/de/kitchen", Node::message_entry("Kochnische"));
	provider.on_change(&[ChangeEvent::changed("/libs/i18n/de/kitchen")]);
	assert!(scheduler.is_pending("reload::de"));

	tokio::time::sleep(Duration::from_secs(4)).await;
	assert!(rx.try_recv().is_err());

	assert_eq!(rx.recv().await, Some(Key::new(None, Locale::new("de"))));
	assert!(Instant::now() >= start + provider.invalidation_delay());

	let fresh = provider.get_bundle(Some(&Locale::new("de"))).unwrap();
	assert!(!Arc::ptr_eq(&old, &fresh));
	assert_eq!(fresh.get("kitchen"), "Kochnische");
	provider.stop();
	scheduler.shutdown();
}
