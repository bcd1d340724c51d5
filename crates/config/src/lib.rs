//! Configuration for the bundle provider.
//!
//! Configuration is read from TOML with kebab-case keys. Every key is
//! optional:
//!
//! ```toml
//! locale-default = "en"
//! preload-bundles = false
//! invalidation-delay = 5000
//! included-paths = ["/libs", "/apps", "/content"]
//! excluded-paths = ["/var/eventing"]
//! ```

mod error;

use std::path::Path;
use std::time::Duration;

pub use error::{ConfigError, Result};
use lingua_locale::Locale;
use serde::{Deserialize, Serialize};

/// Default locale string used when none is configured.
pub const DEFAULT_LOCALE: &str = "en";

/// Default delay before change-triggered reloads, in milliseconds.
pub const DEFAULT_INVALIDATION_DELAY_MS: u64 = 5000;

/// Settings for one bundle provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct ProviderConfig {
	/// Locale used when a request names none, and as the last fallback of
	/// every parent chain. An empty string selects the platform default.
	#[serde(default = "default_locale_string")]
	pub locale_default: String,
	/// Eagerly load every known catalog on start and rebuild changed bundles
	/// in the background instead of evicting them.
	#[serde(default)]
	pub preload_bundles: bool,
	/// Milliseconds to wait before acting on content changes, so bursts of
	/// related changes coalesce into one rebuild.
	#[serde(default = "default_invalidation_delay")]
	pub invalidation_delay: u64,
	/// Path prefixes whose changes concern the cache.
	#[serde(default = "default_included_paths")]
	pub included_paths: Vec<String>,
	/// Path prefixes ignored even when included.
	#[serde(default = "default_excluded_paths")]
	pub excluded_paths: Vec<String>,
}

impl Default for ProviderConfig {
	fn default() -> Self {
		Self {
			locale_default: default_locale_string(),
			preload_bundles: false,
			invalidation_delay: default_invalidation_delay(),
			included_paths: default_included_paths(),
			excluded_paths: default_excluded_paths(),
		}
	}
}

fn default_locale_string() -> String {
	DEFAULT_LOCALE.to_owned()
}

fn default_invalidation_delay() -> u64 {
	DEFAULT_INVALIDATION_DELAY_MS
}

fn default_included_paths() -> Vec<String> {
	["/libs", "/apps", "/content"].map(String::from).to_vec()
}

fn default_excluded_paths() -> Vec<String> {
	vec!["/var/eventing".to_owned()]
}

impl ProviderConfig {
	/// Parses and validates a TOML document.
	pub fn from_toml_str(input: &str) -> Result<Self> {
		let config: Self = toml::from_str(input)?;
		config.validate()?;
		Ok(config)
	}

	/// Reads, parses and validates the TOML file at `path`.
	pub fn load(path: impl AsRef<Path>) -> Result<Self> {
		let path = path.as_ref();
		let content = std::fs::read_to_string(path).map_err(|error| ConfigError::Io {
			path: path.to_path_buf(),
			error,
		})?;
		Self::from_toml_str(&content)
	}

	/// Checks that every path prefix is absolute and that the default locale
	/// only holds locale-string characters.
	pub fn validate(&self) -> Result<()> {
		if let Some(path) = self.included_paths.iter().chain(&self.excluded_paths).find(|path| !path.starts_with('/')) {
			return Err(ConfigError::InvalidPath(path.clone()));
		}
		if !self.locale_default.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-') {
			return Err(ConfigError::InvalidLocale(self.locale_default.clone()));
		}
		Ok(())
	}

	/// The configured default locale, parsed leniently.
	pub fn default_locale(&self) -> Locale {
		Locale::parse(&self.locale_default)
	}

	pub fn invalidation_delay(&self) -> Duration {
		Duration::from_millis(self.invalidation_delay)
	}
}
