use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;
use tokio::time::Instant;

use crate::scheduler::{Job, JobScheduler};
use crate::{Result, SchedulerError};

struct QueuedJob {
	name: String,
	due: Instant,
	seq: u64,
	job: Job,
}

#[derive(Default)]
struct Queue {
	jobs: Vec<QueuedJob>,
	seq: u64,
}

/// Deterministic [`JobScheduler`] that only runs jobs when asked to.
///
/// Jobs run on the calling thread in due order (ties in submission order).
/// Useful in tests and in short-lived tools that drain work synchronously.
#[derive(Default)]
pub struct ManualScheduler {
	queue: Mutex<Queue>,
	unavailable: AtomicBool,
}

impl std::fmt::Debug for ManualScheduler {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("ManualScheduler")
			.field("pending", &self.pending_names())
			.field("unavailable", &self.unavailable.load(Ordering::Relaxed))
			.finish()
	}
}

impl ManualScheduler {
	pub fn new() -> Self {
		Self::default()
	}

	/// A scheduler that rejects every job with [`SchedulerError::Unavailable`].
	pub fn unavailable() -> Self {
		let scheduler = Self::default();
		scheduler.unavailable.store(true, Ordering::Release);
		scheduler
	}

	/// Names of pending jobs in the order they would run.
	pub fn pending_names(&self) -> Vec<String> {
		let mut jobs: Vec<_> = self.queue.lock().jobs.iter().map(|job| (job.due, job.seq, job.name.clone())).collect();
		jobs.sort();
		jobs.into_iter().map(|(_, _, name)| name).collect()
	}

	pub fn is_pending(&self, name: &str) -> bool {
		self.queue.lock().jobs.iter().any(|job| job.name == name)
	}

	/// Runs every job due at or before `now`, returning how many ran.
	///
	/// Jobs scheduled by running jobs are picked up in the same call when
	/// they are already due.
	pub fn run_due(&self, now: Instant) -> usize {
		let mut ran = 0;
		while let Some(job) = self.pop_due(Some(now)) {
			tracing::trace!(job = %job.name, "worker.manual.fire");
			(job.job)();
			ran += 1;
		}
		ran
	}

	/// Runs every pending job regardless of its deadline, including jobs
	/// scheduled while draining.
	pub fn run_all(&self) -> usize {
		let mut ran = 0;
		while let Some(job) = self.pop_due(None) {
			tracing::trace!(job = %job.name, "worker.manual.fire");
			(job.job)();
			ran += 1;
		}
		ran
	}

	fn pop_due(&self, now: Option<Instant>) -> Option<QueuedJob> {
		let mut queue = self.queue.lock();
		let index = queue
			.jobs
			.iter()
			.enumerate()
			.filter(|(_, job)| now.is_none_or(|now| job.due <= now))
			.min_by_key(|(_, job)| (job.due, job.seq))
			.map(|(index, _)| index)?;
		Some(queue.jobs.swap_remove(index))
	}

	fn submit(&self, due: Instant, name: &str, job: Job) -> Result<()> {
		if self.unavailable.load(Ordering::Acquire) {
			return Err(SchedulerError::Unavailable);
		}
		let mut queue = self.queue.lock();
		queue.jobs.retain(|queued| queued.name != name);
		queue.seq += 1;
		let seq = queue.seq;
		queue.jobs.push(QueuedJob {
			name: name.to_owned(),
			due,
			seq,
			job,
		});
		Ok(())
	}
}

impl JobScheduler for ManualScheduler {
	fn schedule_now(&self, name: &str, job: Job) -> Result<()> {
		self.submit(Instant::now(), name, job)
	}

	fn schedule_at(&self, at: Instant, name: &str, job: Job) -> Result<()> {
		self.submit(at, name, job)
	}

	fn cancel(&self, name: &str) -> bool {
		let mut queue = self.queue.lock();
		let before = queue.jobs.len();
		queue.jobs.retain(|queued| queued.name != name);
		before != queue.jobs.len()
	}
}
