//! Priority-ordered resolver registry.
//!
//! Resolvers come and go at runtime. Every change recomputes the best
//! candidate under the registry mutex and publishes it through an
//! [`ArcSwap`], so request paths read the current choice without locking.

use std::sync::Arc;

use arc_swap::ArcSwap;
use lingua_locale::Locale;
use parking_lot::Mutex;

use crate::{DefaultLocaleResolver, LocaleResolver, RequestContext};

/// The resolver currently in charge, with the name it was registered under
/// (`None` for the fallback).
#[derive(Clone)]
pub struct SelectedResolver {
	name: Option<String>,
	resolver: Arc<dyn LocaleResolver>,
}

impl SelectedResolver {
	pub fn name(&self) -> Option<&str> {
		self.name.as_deref()
	}

	pub fn resolver(&self) -> &Arc<dyn LocaleResolver> {
		&self.resolver
	}
}

impl std::fmt::Debug for SelectedResolver {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("SelectedResolver").field("name", &self.name).finish_non_exhaustive()
	}
}

impl LocaleResolver for SelectedResolver {
	fn resolve(&self, request: &RequestContext) -> Vec<Locale> {
		self.resolver.resolve(request)
	}
}

struct Candidate {
	name: String,
	resolver: Arc<dyn LocaleResolver>,
	priority: i32,
	seq: u64,
}

#[derive(Default)]
struct Candidates {
	entries: Vec<Candidate>,
	next_seq: u64,
}

/// Registered locale resolvers; the highest priority wins, ties go to the
/// latest registration, and the fallback resolver serves when none is
/// registered.
pub struct ResolverRegistry {
	candidates: Mutex<Candidates>,
	best: ArcSwap<SelectedResolver>,
	fallback: Arc<dyn LocaleResolver>,
}

impl std::fmt::Debug for ResolverRegistry {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("ResolverRegistry")
			.field("names", &self.names())
			.field("best", &self.best.load().name)
			.finish()
	}
}

impl Default for ResolverRegistry {
	fn default() -> Self {
		Self::with_fallback(Arc::new(DefaultLocaleResolver))
	}
}

impl ResolverRegistry {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_fallback(fallback: Arc<dyn LocaleResolver>) -> Self {
		Self {
			candidates: Mutex::new(Candidates::default()),
			best: ArcSwap::from_pointee(SelectedResolver {
				name: None,
				resolver: Arc::clone(&fallback),
			}),
			fallback,
		}
	}

	/// Registers `resolver` under `name`, replacing an earlier registration
	/// of the same name.
	pub fn register(&self, name: impl Into<String>, resolver: Arc<dyn LocaleResolver>, priority: i32) {
		let name = name.into();
		let mut candidates = self.candidates.lock();
		candidates.entries.retain(|candidate| candidate.name != name);
		let seq = candidates.next_seq;
		candidates.next_seq += 1;
		tracing::debug!(%name, priority, "resolver.register");
		candidates.entries.push(Candidate { name, resolver, priority, seq });
		self.publish(&candidates.entries);
	}

	/// Removes the resolver registered under `name`, returning whether one
	/// was registered.
	pub fn unregister(&self, name: &str) -> bool {
		let mut candidates = self.candidates.lock();
		let before = candidates.entries.len();
		candidates.entries.retain(|candidate| candidate.name != name);
		let removed = candidates.entries.len() != before;
		if removed {
			tracing::debug!(name, "resolver.unregister");
			self.publish(&candidates.entries);
		}
		removed
	}

	/// The resolver currently in charge.
	pub fn select_best(&self) -> Arc<SelectedResolver> {
		self.best.load_full()
	}

	/// Resolves `request` with the resolver currently in charge.
	pub fn resolve(&self, request: &RequestContext) -> Vec<Locale> {
		self.best.load().resolve(request)
	}

	/// Registered names, best first.
	pub fn names(&self) -> Vec<String> {
		let candidates = self.candidates.lock();
		let mut ranked: Vec<&Candidate> = candidates.entries.iter().collect();
		ranked.sort_by(|a, b| rank(b).cmp(&rank(a)));
		ranked.into_iter().map(|candidate| candidate.name.clone()).collect()
	}

	fn publish(&self, entries: &[Candidate]) {
		let selected = match entries.iter().max_by_key(|candidate| rank(candidate)) {
			Some(best) => SelectedResolver {
				name: Some(best.name.clone()),
				resolver: Arc::clone(&best.resolver),
			},
			None => SelectedResolver {
				name: None,
				resolver: Arc::clone(&self.fallback),
			},
		};
		tracing::debug!(selected = selected.name.as_deref().unwrap_or("<fallback>"), "resolver.select_best");
		self.best.store(Arc::new(selected));
	}
}

fn rank(candidate: &Candidate) -> (i32, u64) {
	(candidate.priority, candidate.seq)
}
