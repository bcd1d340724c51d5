use std::future::Future;
use std::sync::OnceLock;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;

use crate::{SchedulerError, TaskClass};

/// Returns the ambient tokio runtime, or a lazily built shared one when the
/// caller runs outside any runtime.
pub fn runtime_handle() -> Result<Handle, SchedulerError> {
	if let Ok(handle) = Handle::try_current() {
		return Ok(handle);
	}

	static GLOBAL_RT: OnceLock<Option<tokio::runtime::Runtime>> = OnceLock::new();
	let runtime = GLOBAL_RT.get_or_init(|| {
		tokio::runtime::Builder::new_multi_thread()
			.enable_all()
			.worker_threads(2)
			.thread_name("lingua-worker-global")
			.build()
			.inspect_err(|error| tracing::error!(%error, "worker.runtime: failed to build global runtime"))
			.ok()
	});
	runtime.as_ref().map(|rt| rt.handle().clone()).ok_or(SchedulerError::Unavailable)
}

/// Spawns an async task on `handle` with worker classification metadata.
pub fn spawn_on<F>(handle: &Handle, class: TaskClass, fut: F) -> JoinHandle<F::Output>
where
	F: Future + Send + 'static,
	F::Output: Send + 'static,
{
	tracing::trace!(worker_class = class.as_str(), "worker.spawn");
	handle.spawn(fut)
}

/// Spawns blocking work on `handle` with worker classification metadata.
pub fn spawn_blocking_on<F, R>(handle: &Handle, class: TaskClass, f: F) -> JoinHandle<R>
where
	F: FnOnce() -> R + Send + 'static,
	R: Send + 'static,
{
	tracing::trace!(worker_class = class.as_str(), "worker.spawn_blocking");
	handle.spawn_blocking(f)
}

/// Extracts the panic message from a failed join, `None` for cancellations.
pub fn join_error_panic_message(error: tokio::task::JoinError) -> Option<String> {
	let payload = error.try_into_panic().ok()?;
	if let Some(message) = payload.downcast_ref::<&'static str>() {
		return Some((*message).to_owned());
	}
	if let Some(message) = payload.downcast_ref::<String>() {
		return Some(message.clone());
	}
	Some("non-string panic payload".to_owned())
}
