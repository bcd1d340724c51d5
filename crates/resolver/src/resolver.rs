use lingua_locale::Locale;

use crate::RequestContext;

/// Strategy choosing the locales of a request, most preferred first.
///
/// An empty list means "no preference"; callers then fall back to the
/// provider's default locale.
pub trait LocaleResolver: Send + Sync {
	fn resolve(&self, request: &RequestContext) -> Vec<Locale>;
}

/// Resolver honouring the request's `Accept-Language` preferences.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultLocaleResolver;

impl LocaleResolver for DefaultLocaleResolver {
	fn resolve(&self, request: &RequestContext) -> Vec<Locale> {
		request.preferred_locales()
	}
}

impl<F> LocaleResolver for F
where
	F: Fn(&RequestContext) -> Vec<Locale> + Send + Sync,
{
	fn resolve(&self, request: &RequestContext) -> Vec<Locale> {
		self(request)
	}
}
