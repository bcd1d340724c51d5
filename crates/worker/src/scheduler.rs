//! Named, delayed and cancellable jobs on a tokio runtime.

use std::sync::atomic::{AtomicBool, Ordering};

use tokio::runtime::Handle;
use tokio::time::Instant;

use crate::registry::{JobRecord, JobRegistry};
use crate::spawn::{join_error_panic_message, runtime_handle, spawn_blocking_on, spawn_on};
use crate::token::{JobClock, JobToken};
use crate::{Result, SchedulerError, TaskClass};

/// Unit of background work.
pub type Job = Box<dyn FnOnce() + Send + 'static>;

/// Runs named jobs now or at a deadline.
///
/// At most one job is pending per name: scheduling under a name that is
/// still pending replaces (and cancels) the earlier job. Names are owned by
/// the caller so that [`JobScheduler::cancel`] stays deterministic.
pub trait JobScheduler: Send + Sync {
	/// Schedules `job` to run as soon as possible.
	fn schedule_now(&self, name: &str, job: Job) -> Result<()>;

	/// Schedules `job` to run once `at` has passed.
	fn schedule_at(&self, at: Instant, name: &str, job: Job) -> Result<()>;

	/// Cancels the pending job registered under `name`.
	///
	/// Returns `false` when nothing was pending, including when the job has
	/// already started running. Started jobs always run to completion.
	fn cancel(&self, name: &str) -> bool;
}

/// [`JobScheduler`] backed by a tokio runtime.
///
/// Timers and cancellation run as async tasks; job bodies run on the
/// blocking pool since they may wait on locks or read from slow stores.
/// A panicking job is logged and does not affect other jobs.
#[derive(Debug)]
pub struct TokioScheduler {
	handle: Handle,
	clock: JobClock,
	registry: JobRegistry,
	closed: AtomicBool,
}

impl TokioScheduler {
	/// Creates a scheduler on the ambient runtime, or on the shared global
	/// runtime when called outside one.
	pub fn new() -> Result<Self> {
		runtime_handle().map(Self::with_handle)
	}

	/// Creates a scheduler spawning onto `handle`.
	pub fn with_handle(handle: Handle) -> Self {
		Self {
			handle,
			clock: JobClock::default(),
			registry: JobRegistry::default(),
			closed: AtomicBool::new(false),
		}
	}

	/// Returns snapshots of pending jobs, earliest first.
	pub fn pending(&self) -> Vec<JobRecord> {
		self.registry.snapshots()
	}

	/// Returns whether a job is pending under `name`.
	pub fn is_pending(&self, name: &str) -> bool {
		self.registry.snapshots().iter().any(|record| record.name == name)
	}

	/// Cancels every pending job and rejects further scheduling.
	pub fn shutdown(&self) {
		if self.closed.swap(true, Ordering::AcqRel) {
			return;
		}
		let cancelled = self.registry.cancel_all();
		tracing::debug!(cancelled, "worker.scheduler.shutdown");
	}

	/// Returns whether [`Self::shutdown`] was called.
	pub fn is_shut_down(&self) -> bool {
		self.closed.load(Ordering::Acquire)
	}

	fn submit(&self, at: Instant, name: &str, job: Job) -> Result<()> {
		if self.is_shut_down() {
			return Err(SchedulerError::Closed);
		}

		let token = JobToken::new(self.clock.next());
		let id = token.id();
		if let Some(replaced) = self.registry.insert(name, token.clone(), at) {
			tracing::trace!(job = %name, replaced, id, "worker.job.replace");
		}

		let registry = self.registry.clone();
		let handle = self.handle.clone();
		let name = name.to_owned();
		spawn_on(&self.handle, TaskClass::Background, async move {
			tokio::select! {
				biased;
				() = token.cancelled() => {
					tracing::trace!(job = %name, id, "worker.job.cancelled");
				}
				() = tokio::time::sleep_until(at) => {
					// A replacement or cancel that raced the deadline wins.
					if !registry.finish(&name, id) {
						tracing::trace!(job = %name, id, "worker.job.superseded");
						return;
					}
					tracing::trace!(job = %name, id, "worker.job.fire");
					if let Err(error) = spawn_blocking_on(&handle, TaskClass::IoBlocking, job).await {
						match join_error_panic_message(error) {
							Some(message) => tracing::error!(job = %name, id, %message, "worker.job.panicked"),
							None => tracing::debug!(job = %name, id, "worker.job.aborted"),
						}
					}
				}
			}
		});
		Ok(())
	}
}

impl JobScheduler for TokioScheduler {
	fn schedule_now(&self, name: &str, job: Job) -> Result<()> {
		self.submit(Instant::now(), name, job)
	}

	fn schedule_at(&self, at: Instant, name: &str, job: Job) -> Result<()> {
		self.submit(at, name, job)
	}

	fn cancel(&self, name: &str) -> bool {
		let cancelled = self.registry.cancel(name);
		if cancelled {
			tracing::trace!(job = %name, "worker.job.cancel");
		}
		cancelled
	}
}
