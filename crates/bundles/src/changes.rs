use std::collections::BTreeSet;
use std::fmt;

use crate::{Key, LoadCoordinator, StoreError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeKind {
	Added,
	Removed,
	Changed,
}

impl fmt::Display for ChangeKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(match self {
			Self::Added => "added",
			Self::Removed => "removed",
			Self::Changed => "changed",
		})
	}
}

/// One content change notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
	pub path: String,
	pub kind: ChangeKind,
}

impl ChangeEvent {
	pub fn new(path: impl Into<String>, kind: ChangeKind) -> Self {
		Self { path: path.into(), kind }
	}

	pub fn added(path: impl Into<String>) -> Self {
		Self::new(path, ChangeKind::Added)
	}

	pub fn removed(path: impl Into<String>) -> Self {
		Self::new(path, ChangeKind::Removed)
	}

	pub fn changed(path: impl Into<String>) -> Self {
		Self::new(path, ChangeKind::Changed)
	}
}

/// What a change batch requires of the cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invalidation {
	/// Nothing cached is affected.
	None,
	/// Drop everything and rebuild.
	Full,
	/// Reload these keys (their dependents cascade at reload time).
	Bundles(BTreeSet<Key>),
}

/// Classifies change batches against the current cache state.
///
/// Processing a batch only reads shared state, so batches may be classified
/// concurrently; their results merge in the reload scheduler.
#[derive(Debug, Clone, Copy)]
pub struct ChangeProcessor<'a> {
	loader: &'a LoadCoordinator,
}

impl<'a> ChangeProcessor<'a> {
	pub fn new(loader: &'a LoadCoordinator) -> Self {
		Self { loader }
	}

	/// Classifies `batch`, in order:
	///
	/// 1. paths rejected by the path filter are skipped;
	/// 2. a change of a known language root itself requires a full flush and
	///    ends the batch;
	/// 3. a change below known roots marks every cached bundle built from
	///    those roots;
	/// 4. a change implicating no known root requires a full flush when the
	///    store classifies the resource as a dictionary artifact, since nothing
	///    yet knows its root.
	///
	/// A store error aborts the whole batch.
	pub fn classify(&self, batch: &[ChangeEvent]) -> Result<Invalidation, StoreError> {
		let mut marked = BTreeSet::new();
		for event in batch {
			if !self.loader.filter().includes(&event.path) {
				tracing::trace!(path = %event.path, "changes: excluded by path filter");
				continue;
			}
			tracing::debug!(path = %event.path, kind = %event.kind, "changes: detecting change");

			if self.loader.roots().contains(&event.path) {
				tracing::debug!(path = %event.path, "changes: cached language root changed, reloading all");
				return Ok(Invalidation::Full);
			}

			let ancestors = self.loader.roots().ancestors_of(&event.path);
			if !ancestors.is_empty() {
				let bundles = self.loader.registry().all();
				for root in &ancestors {
					for bundle in bundles.iter().filter(|bundle| bundle.language_roots().contains(root)) {
						tracing::debug!(%root, key = %bundle.key(), "changes: resource below root, marking bundle");
						marked.insert(bundle.key().clone());
					}
				}
				continue;
			}

			let kind = self.loader.store().classify_resource(&event.path)?;
			if kind.is_dictionary() {
				tracing::debug!(path = %event.path, ?kind, "changes: new dictionary resource, reloading all");
				return Ok(Invalidation::Full);
			}
		}

		Ok(if marked.is_empty() { Invalidation::None } else { Invalidation::Bundles(marked) })
	}
}
