use lingua_locale::Locale;

/// What a resolver may look at when choosing locales for a request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestContext {
	/// Raw `Accept-Language` header value.
	pub accept_language: Option<String>,
}

impl RequestContext {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_accept_language(mut self, value: impl Into<String>) -> Self {
		self.accept_language = Some(value.into());
		self
	}

	/// Locales listed in the `Accept-Language` header, most preferred first.
	pub fn preferred_locales(&self) -> Vec<Locale> {
		self.accept_language.as_deref().map(parse_accept_language).unwrap_or_default()
	}
}

/// Parses an `Accept-Language` value into locales ordered by descending
/// quality. Entries of equal quality keep their order; `*`, entries with
/// `q=0` and entries with an unparsable quality are dropped, as are repeats.
pub fn parse_accept_language(value: &str) -> Vec<Locale> {
	let mut weighted: Vec<(f32, Locale)> = Vec::new();
	for item in value.split(',') {
		let mut parts = item.split(';').map(str::trim);
		let tag = parts.next().unwrap_or_default();
		if tag.is_empty() || tag == "*" {
			continue;
		}
		let Some(quality) = quality(parts) else {
			tracing::debug!(item, "accept_language: dropping entry with invalid quality");
			continue;
		};
		if quality <= 0.0 {
			continue;
		}
		let locale = Locale::parse(tag);
		if !weighted.iter().any(|(_, seen)| *seen == locale) {
			weighted.push((quality, locale));
		}
	}
	weighted.sort_by(|a, b| b.0.total_cmp(&a.0));
	weighted.into_iter().map(|(_, locale)| locale).collect()
}

fn quality<'a>(params: impl Iterator<Item = &'a str>) -> Option<f32> {
	let mut quality = 1.0;
	for param in params {
		if let Some(raw) = param.strip_prefix("q=").or_else(|| param.strip_prefix("Q=")) {
			quality = raw.trim().parse::<f32>().ok().filter(|q| (0.0..=1.0).contains(q))?;
		}
	}
	Some(quality)
}
