use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;

use crate::{Bundle, Key};

/// Handle for one published bundle, released when the registry entry holding
/// it is replaced, evicted or cleared.
#[derive(Debug, PartialEq, Eq)]
pub struct Registration {
	id: u64,
	key: Key,
}

impl Registration {
	pub fn new(id: u64, key: Key) -> Self {
		Self { id, key }
	}

	pub fn id(&self) -> u64 {
		self.id
	}

	pub fn key(&self) -> &Key {
		&self.key
	}
}

/// Exposes cached bundles to the outside world, e.g. as services looked up by
/// catalog name and locale.
pub trait BundlePublisher: Send + Sync {
	fn register(&self, key: &Key, bundle: &Arc<Bundle>) -> Registration;

	fn unregister(&self, registration: &Registration);
}

/// Publisher that hands out ids and publishes nothing.
#[derive(Debug, Default)]
pub struct NoopPublisher {
	next: AtomicU64,
}

impl BundlePublisher for NoopPublisher {
	fn register(&self, key: &Key, _bundle: &Arc<Bundle>) -> Registration {
		Registration::new(self.next.fetch_add(1, Ordering::Relaxed), key.clone())
	}

	fn unregister(&self, _registration: &Registration) {}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishEvent {
	Registered { id: u64, key: Key },
	Unregistered { id: u64, key: Key },
}

/// Publisher recording every register and unregister call.
#[derive(Debug, Default)]
pub struct RecordingPublisher {
	next: AtomicU64,
	events: Mutex<Vec<PublishEvent>>,
}

impl RecordingPublisher {
	pub fn events(&self) -> Vec<PublishEvent> {
		self.events.lock().clone()
	}

	/// Ids registered and not yet unregistered, ascending.
	pub fn active(&self) -> Vec<u64> {
		let events = self.events.lock();
		let mut active: Vec<u64> = events
			.iter()
			.filter_map(|event| match event {
				PublishEvent::Registered { id, .. } => Some(*id),
				PublishEvent::Unregistered { .. } => None,
			})
			.filter(|id| !events.iter().any(|event| matches!(event, PublishEvent::Unregistered { id: gone, .. } if gone == id)))
			.collect();
		active.sort_unstable();
		active
	}

	/// Number of unregister calls per id; every value should be 1.
	pub fn release_counts(&self) -> Vec<(u64, usize)> {
		let events = self.events.lock();
		let mut counts: Vec<(u64, usize)> = Vec::new();
		for event in events.iter() {
			if let PublishEvent::Unregistered { id, .. } = event {
				match counts.iter_mut().find(|(seen, _)| seen == id) {
					Some((_, count)) => *count += 1,
					None => counts.push((*id, 1)),
				}
			}
		}
		counts
	}
}

impl BundlePublisher for RecordingPublisher {
	fn register(&self, key: &Key, _bundle: &Arc<Bundle>) -> Registration {
		let id = self.next.fetch_add(1, Ordering::Relaxed);
		self.events.lock().push(PublishEvent::Registered { id, key: key.clone() });
		Registration::new(id, key.clone())
	}

	fn unregister(&self, registration: &Registration) {
		self.events.lock().push(PublishEvent::Unregistered {
			id: registration.id(),
			key: registration.key().clone(),
		});
	}
}
