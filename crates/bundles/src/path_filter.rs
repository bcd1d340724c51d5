/// Include/exclude prefix predicate over repository paths.
///
/// A path is included when it starts with some included prefix and with no
/// excluded prefix. Prefixes match textually: `/libs` includes `/libs2`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathFilter {
	included: Vec<String>,
	excluded: Vec<String>,
}

impl PathFilter {
	pub fn new<I, E>(included: I, excluded: E) -> Self
	where
		I: IntoIterator,
		I::Item: Into<String>,
		E: IntoIterator,
		E::Item: Into<String>,
	{
		Self {
			included: included.into_iter().map(Into::into).collect(),
			excluded: excluded.into_iter().map(Into::into).collect(),
		}
	}

	/// Filter built from the configured prefixes.
	pub fn from_config(config: &lingua_config::ProviderConfig) -> Self {
		Self::new(config.included_paths.iter().cloned(), config.excluded_paths.iter().cloned())
	}

	pub fn includes(&self, path: &str) -> bool {
		self.included.iter().any(|prefix| path.starts_with(prefix.as_str())) && !self.excluded.iter().any(|prefix| path.starts_with(prefix.as_str()))
	}
}

impl Default for PathFilter {
	fn default() -> Self {
		Self::from_config(&lingua_config::ProviderConfig::default())
	}
}
