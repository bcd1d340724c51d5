//! Background job runtime.
//!
//! Jobs are named closures scheduled now or at a deadline through the
//! [`JobScheduler`] trait. [`TokioScheduler`] runs them on a tokio runtime
//! (the ambient one, or a shared global runtime when none is entered);
//! [`ManualScheduler`] queues them until the caller drains the queue.

mod class;
mod error;
mod manual;
mod registry;
mod scheduler;
mod spawn;
mod token;

pub use class::TaskClass;
pub use error::{Result, SchedulerError};
pub use manual::ManualScheduler;
pub use registry::JobRecord;
pub use scheduler::{Job, JobScheduler, TokioScheduler};
pub use spawn::{join_error_panic_message, runtime_handle, spawn_blocking_on, spawn_on};
pub use tokio::time::Instant;
