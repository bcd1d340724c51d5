use std::collections::HashMap;
use std::sync::Arc;
use tokio::time::Instant;

use parking_lot::Mutex;

use crate::token::JobToken;

/// Snapshot of one pending job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobRecord {
	pub name: String,
	pub id: u64,
	pub due: Instant,
}

#[derive(Debug)]
struct PendingJob {
	token: JobToken,
	due: Instant,
}

/// Pending jobs by name. At most one job is pending per name.
#[derive(Debug, Default, Clone)]
pub(crate) struct JobRegistry {
	inner: Arc<Mutex<HashMap<String, PendingJob>>>,
}

impl JobRegistry {
	/// Registers `token` under `name`, cancelling and returning the id of any
	/// job it replaces.
	pub fn insert(&self, name: &str, token: JobToken, due: Instant) -> Option<u64> {
		let previous = self.inner.lock().insert(name.to_owned(), PendingJob { token, due });
		previous.map(|job| {
			job.token.cancel();
			job.token.id()
		})
	}

	/// Removes `name` only while it is still held by job `id`.
	pub fn finish(&self, name: &str, id: u64) -> bool {
		let mut guard = self.inner.lock();
		if guard.get(name).is_some_and(|job| job.token.id() == id) {
			guard.remove(name);
			true
		} else {
			false
		}
	}

	/// Cancels and removes the job registered under `name`.
	pub fn cancel(&self, name: &str) -> bool {
		let removed = self.inner.lock().remove(name);
		removed.map(|job| job.token.cancel()).is_some()
	}

	/// Cancels and removes every job, returning how many were pending.
	pub fn cancel_all(&self) -> usize {
		let drained: Vec<_> = self.inner.lock().drain().collect();
		for (_, job) in &drained {
			job.token.cancel();
		}
		drained.len()
	}

	/// Returns snapshots sorted by due time, then name.
	pub fn snapshots(&self) -> Vec<JobRecord> {
		let guard = self.inner.lock();
		let mut records: Vec<_> = guard
			.iter()
			.map(|(name, job)| JobRecord {
				name: name.clone(),
				id: job.token.id(),
				due: job.due,
			})
			.collect();
		records.sort_by(|a, b| a.due.cmp(&b.due).then_with(|| a.name.cmp(&b.name)));
		records
	}
}
