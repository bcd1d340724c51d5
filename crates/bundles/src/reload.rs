use std::sync::Arc;
use std::time::Duration;

use lingua_worker::{Instant, Job, JobScheduler, SchedulerError};
use parking_lot::Mutex;
use rustc_hash::FxHashMap;

use crate::Key;

/// Name of the full reload job.
pub const RELOAD_ALL_JOB: &str = "reload-all";

/// Name of the single-key reload job for `key`.
pub fn reload_job_name(key: &Key) -> String {
	format!("reload:{key}")
}

/// Debounces and coalesces reload work on a [`JobScheduler`].
///
/// Scheduling a job under a name that is still pending replaces it, so a
/// burst of changes within the invalidation delay collapses into one reload
/// per key. Scheduling a full reload cancels every pending single-key job.
///
/// Pending single-key jobs are tracked by name and id. A job that already
/// fired only forgets its own entry, so a reschedule under the same name
/// stays visible to a later full reload.
pub struct ReloadScheduler {
	scheduler: Arc<dyn JobScheduler>,
	delay: Duration,
	pending: Mutex<Pending>,
}

#[derive(Debug, Default)]
struct Pending {
	next_id: u64,
	jobs: FxHashMap<String, u64>,
}

impl std::fmt::Debug for ReloadScheduler {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("ReloadScheduler")
			.field("delay", &self.delay)
			.field("pending", &self.pending())
			.finish_non_exhaustive()
	}
}

impl ReloadScheduler {
	pub fn new(scheduler: Arc<dyn JobScheduler>, delay: Duration) -> Self {
		Self {
			scheduler,
			delay,
			pending: Mutex::new(Pending::default()),
		}
	}

	pub fn delay(&self) -> Duration {
		self.delay
	}

	/// Cancels every pending single-key job, then schedules `job` as the full
	/// reload, after the invalidation delay when `delayed`.
	pub fn schedule_full(&self, delayed: bool, job: Job) -> Result<(), SchedulerError> {
		let mut pending = self.pending.lock();
		for (name, _) in pending.jobs.drain() {
			if self.scheduler.cancel(&name) {
				tracing::debug!(job = %name, "reload: cancelled, superseded by full reload");
			}
		}
		if delayed {
			self.scheduler.schedule_at(Instant::now() + self.delay, RELOAD_ALL_JOB, job)
		} else {
			self.scheduler.schedule_now(RELOAD_ALL_JOB, job)
		}
	}

	/// Schedules the reload of `key` after the invalidation delay.
	///
	/// `job` receives the id the job reports back through [`Self::finished`]
	/// when it starts. Returns the job name and id.
	pub fn schedule_single(&self, key: &Key, job: impl FnOnce(u64) -> Job) -> Result<(String, u64), SchedulerError> {
		let name = reload_job_name(key);
		let mut pending = self.pending.lock();
		pending.next_id += 1;
		let id = pending.next_id;
		self.scheduler.schedule_at(Instant::now() + self.delay, &name, job(id))?;
		pending.jobs.insert(name.clone(), id);
		tracing::debug!(job = %name, id, delay_ms = self.delay.as_millis() as u64, "reload: scheduled");
		Ok((name, id))
	}

	/// Forgets single-key job `id` once it started running. A later job
	/// scheduled under the same name is left pending.
	pub fn finished(&self, name: &str, id: u64) {
		let mut pending = self.pending.lock();
		if pending.jobs.get(name) == Some(&id) {
			pending.jobs.remove(name);
		}
	}

	/// Cancels every pending single-key job and the full reload.
	pub fn cancel_all(&self) -> usize {
		let mut pending = self.pending.lock();
		let mut cancelled = pending.jobs.drain().filter(|(name, _)| self.scheduler.cancel(name)).count();
		if self.scheduler.cancel(RELOAD_ALL_JOB) {
			cancelled += 1;
		}
		cancelled
	}

	/// Pending single-key job names, sorted.
	pub fn pending(&self) -> Vec<String> {
		let mut names: Vec<String> = self.pending.lock().jobs.keys().cloned().collect();
		names.sort();
		names
	}
}
