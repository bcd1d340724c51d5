//! Request-level locale selection.
//!
//! A [`LocaleResolver`] turns a [`RequestContext`] into preferred locales;
//! [`ResolverRegistry`] picks the best of several registered resolvers and
//! [`CombinedProvider`] answers bundle lookups from several ranked bundle
//! providers.

mod combined;
mod context;
mod error;
mod registry;
mod resolver;

pub use combined::CombinedProvider;
pub use context::{RequestContext, parse_accept_language};
pub use error::{ResolveError, Result};
pub use registry::{ResolverRegistry, SelectedResolver};
pub use resolver::{DefaultLocaleResolver, LocaleResolver};
