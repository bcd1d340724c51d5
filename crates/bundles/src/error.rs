//! Error types for bundle loading.

use lingua_locale::Locale;
use thiserror::Error;

use crate::Key;

/// Failure reported by a [`CatalogStore`](crate::CatalogStore).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
	/// The store cannot be reached (no session, no credentials).
	#[error("catalog store unavailable: {0}")]
	Unavailable(String),

	/// The store was reached but could not answer.
	#[error("catalog query failed: {0}")]
	Query(String),
}

/// Errors surfaced by bundle lookups and reloads.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BundleError {
	/// The catalog store could not be reached while building the bundle.
	/// Nothing was cached for the request.
	#[error("cannot load bundle {} for locale '{locale}': {reason}", name.as_deref().unwrap_or("<default>"))]
	StoreUnavailable {
		/// Requested catalog name.
		name: Option<String>,
		/// Requested locale.
		locale: Locale,
		/// Why the store could not be reached.
		reason: String,
	},

	/// Any other store failure.
	#[error(transparent)]
	Store(StoreError),
}

impl BundleError {
	/// Attaches the requested key to a store failure.
	pub(crate) fn from_store(error: StoreError, key: &Key) -> Self {
		match error {
			StoreError::Unavailable(reason) => Self::StoreUnavailable {
				name: key.name().map(str::to_owned),
				locale: key.locale().clone(),
				reason,
			},
			other => Self::Store(other),
		}
	}
}

/// Result type for bundle operations.
pub type Result<T> = std::result::Result<T, BundleError>;
