/// Execution classes used for job scheduling and observability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskClass {
	/// Async bookkeeping: timers, cancellation, registry updates.
	Background,
	/// Job bodies. They read from stores and may block on per-key locks.
	IoBlocking,
}

impl TaskClass {
	pub(crate) const fn as_str(self) -> &'static str {
		match self {
			Self::Background => "background",
			Self::IoBlocking => "io_blocking",
		}
	}
}
