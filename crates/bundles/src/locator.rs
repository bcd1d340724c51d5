/// A location contributed by another component in which language roots are
/// searched, down to `traverse_depth` levels below `path`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LocatorPaths {
	pub path: String,
	pub traverse_depth: usize,
	/// Identifier of the contributing component.
	pub owner: u64,
}

impl LocatorPaths {
	pub const DEFAULT_DEPTH: usize = 1;

	pub fn new(path: impl Into<String>, traverse_depth: usize, owner: u64) -> Self {
		Self {
			path: path.into(),
			traverse_depth,
			owner,
		}
	}

	/// Parses the `paths` and optional `depth` attributes of a locator
	/// capability.
	///
	/// `paths` is a comma separated list; items are trimmed and empty items
	/// skipped. A missing or unparsable depth becomes [`Self::DEFAULT_DEPTH`].
	pub fn parse_capability(owner: u64, paths: &str, depth: Option<&str>) -> Vec<Self> {
		let traverse_depth = match depth.map(str::trim).filter(|depth| !depth.is_empty()) {
			None => Self::DEFAULT_DEPTH,
			Some(raw) => raw.parse().unwrap_or_else(|_| {
				tracing::warn!(owner, depth = raw, "invalid locator depth, using {}", Self::DEFAULT_DEPTH);
				Self::DEFAULT_DEPTH
			}),
		};
		let mut parsed: Vec<Self> = Vec::new();
		for path in paths.split(',').map(str::trim).filter(|path| !path.is_empty()) {
			let locator = Self::new(path, traverse_depth, owner);
			if !parsed.contains(&locator) {
				parsed.push(locator);
			}
		}
		parsed
	}
}
