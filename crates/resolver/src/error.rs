use lingua_bundles::BundleError;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
	/// No bundle provider is registered.
	#[error("no bundle provider registered")]
	NoProvider,

	/// Every registered provider failed; this is the last failure.
	#[error(transparent)]
	Bundle(#[from] BundleError),
}

pub type Result<T> = std::result::Result<T, ResolveError>;
