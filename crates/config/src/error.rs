//! Error types for configuration loading.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur when loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
	/// Error parsing TOML syntax or an unexpected field type.
	#[error("TOML parse error: {0}")]
	Toml(#[from] toml::de::Error),

	/// Error reading a configuration file.
	#[error("I/O error reading {path}: {error}")]
	Io {
		/// Path to the file that failed to read.
		path: PathBuf,
		/// The underlying I/O error.
		error: std::io::Error,
	},

	/// A path prefix is not absolute.
	#[error("invalid path prefix: {0:?} (expected a path starting with '/')")]
	InvalidPath(String),

	/// The default locale contains characters no locale string can hold.
	#[error("invalid default locale: {0:?}")]
	InvalidLocale(String),
}

/// Result type for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;
