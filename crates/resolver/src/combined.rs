use std::sync::Arc;

use arc_swap::ArcSwap;
use lingua_bundles::{Bundle, BundleSource};
use lingua_locale::Locale;
use parking_lot::Mutex;

use crate::{LocaleResolver, RequestContext, ResolveError, Result};

struct Ranked {
	name: String,
	rank: i32,
	seq: u64,
	source: Arc<dyn BundleSource>,
}

#[derive(Default)]
struct Members {
	entries: Vec<Ranked>,
	next_seq: u64,
}

/// Several bundle providers asked in rank order.
///
/// A lookup returns the answer of the highest-ranked provider that can
/// build the bundle; equal ranks keep registration order. The membership
/// snapshot is swapped atomically, so lookups never lock.
pub struct CombinedProvider {
	members: Mutex<Members>,
	sorted: ArcSwap<Vec<Arc<dyn BundleSource>>>,
}

impl std::fmt::Debug for CombinedProvider {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("CombinedProvider").field("names", &self.names()).finish()
	}
}

impl Default for CombinedProvider {
	fn default() -> Self {
		Self {
			members: Mutex::new(Members::default()),
			sorted: ArcSwap::from_pointee(Vec::new()),
		}
	}
}

impl CombinedProvider {
	pub fn new() -> Self {
		Self::default()
	}

	/// Adds `source` under `name`, replacing an earlier one of that name.
	pub fn register(&self, name: impl Into<String>, source: Arc<dyn BundleSource>, rank: i32) {
		let name = name.into();
		let mut members = self.members.lock();
		members.entries.retain(|member| member.name != name);
		let seq = members.next_seq;
		members.next_seq += 1;
		tracing::debug!(%name, rank, "combined.register");
		members.entries.push(Ranked { name, rank, seq, source });
		self.publish(&mut members.entries);
	}

	pub fn unregister(&self, name: &str) -> bool {
		let mut members = self.members.lock();
		let before = members.entries.len();
		members.entries.retain(|member| member.name != name);
		let removed = members.entries.len() != before;
		if removed {
			tracing::debug!(name, "combined.unregister");
			self.publish(&mut members.entries);
		}
		removed
	}

	/// Registered names, highest rank first.
	pub fn names(&self) -> Vec<String> {
		self.members.lock().entries.iter().map(|member| member.name.clone()).collect()
	}

	pub fn is_empty(&self) -> bool {
		self.sorted.load().is_empty()
	}

	/// Default locale of the highest-ranked provider, or the configured
	/// fallback default when none is registered.
	pub fn default_locale(&self) -> Locale {
		match self.sorted.load().first() {
			Some(source) => source.default_locale(),
			None => Locale::parse(lingua_config::DEFAULT_LOCALE),
		}
	}

	pub fn get_bundle(&self, locale: Option<&Locale>) -> Result<Arc<Bundle>> {
		self.get_named_bundle(None, locale)
	}

	/// Asks each provider in rank order; the first bundle wins. When every
	/// provider fails, the last failure is returned.
	pub fn get_named_bundle(&self, name: Option<&str>, locale: Option<&Locale>) -> Result<Arc<Bundle>> {
		let sources = self.sorted.load();
		let mut last = None;
		for source in sources.iter() {
			match source.get_named_bundle(name, locale) {
				Ok(bundle) => return Ok(bundle),
				Err(error) => {
					tracing::debug!(%error, "combined.get: provider failed, trying next");
					last = Some(error);
				}
			}
		}
		Err(last.map_or(ResolveError::NoProvider, ResolveError::Bundle))
	}

	/// Locales of `request` as chosen by `resolver`, or the default locale
	/// when the resolver has no preference.
	pub fn request_locales(&self, resolver: &dyn LocaleResolver, request: &RequestContext) -> Vec<Locale> {
		let locales = resolver.resolve(request);
		if locales.is_empty() { vec![self.default_locale()] } else { locales }
	}

	/// Bundle of the default catalog for the most preferred locale of
	/// `request`.
	pub fn request_bundle(&self, resolver: &dyn LocaleResolver, request: &RequestContext) -> Result<Arc<Bundle>> {
		let locales = self.request_locales(resolver, request);
		self.get_bundle(locales.first())
	}

	fn publish(&self, entries: &mut [Ranked]) {
		entries.sort_by(|a, b| b.rank.cmp(&a.rank).then(a.seq.cmp(&b.seq)));
		self.sorted.store(Arc::new(entries.iter().map(|member| Arc::clone(&member.source)).collect()));
	}
}
