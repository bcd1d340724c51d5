//! Error types for job scheduling.

use thiserror::Error;

/// Errors returned when a job cannot be scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SchedulerError {
	/// No tokio runtime is reachable and none could be built.
	#[error("no job runtime available")]
	Unavailable,

	/// The scheduler was shut down.
	#[error("scheduler is shut down")]
	Closed,
}

/// Result type for scheduling operations.
pub type Result<T> = std::result::Result<T, SchedulerError>;
