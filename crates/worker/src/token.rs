use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio_util::sync::CancellationToken;

/// Monotonic id source for scheduled jobs.
#[derive(Debug, Default, Clone)]
pub(crate) struct JobClock {
	next: Arc<AtomicU64>,
}

impl JobClock {
	/// Returns the next job id, starting at 1.
	pub fn next(&self) -> u64 {
		self.next.fetch_add(1, Ordering::AcqRel).wrapping_add(1)
	}
}

/// Id-scoped cancellation token for one scheduled job.
///
/// The id lets a firing job tell whether it is still the registered holder of
/// its name or was replaced by a later schedule under the same name.
#[derive(Debug, Clone)]
pub(crate) struct JobToken {
	id: u64,
	cancel: CancellationToken,
}

impl JobToken {
	pub fn new(id: u64) -> Self {
		Self {
			id,
			cancel: CancellationToken::new(),
		}
	}

	pub const fn id(&self) -> u64 {
		self.id
	}

	pub fn cancel(&self) {
		self.cancel.cancel();
	}

	/// Future resolving when cancellation is requested.
	pub async fn cancelled(&self) {
		self.cancel.cancelled().await;
	}
}
