//! Translated-message bundle cache.
//!
//! A [`Bundle`] maps message keys to translated strings for one catalog name
//! and locale, falling back through its parent chain (`de_CH` to `de` to the
//! default locale to the empty root). Bundles are read from a
//! [`CatalogStore`] at most once per key and cached in a lock-free
//! [`BundleRegistry`]; [`BundleProvider`] keeps that cache coherent with
//! store changes by scheduling debounced reloads.
//!
//! # Layers
//!
//! | Module | Role |
//! |---|---|
//! | [`store`] | catalog storage contract, in-memory tree store |
//! | `loader` | single-flight build, parent resolution, root tracking |
//! | `registry` | copy-on-write key to bundle map, publication hooks |
//! | `changes` | change batch classification |
//! | `reload` | named, debounced reload jobs |
//! | `provider` | the context tying the above together |

mod bundle;
mod changes;
mod error;
mod key;
mod loader;
mod locator;
mod locks;
mod path_filter;
mod provider;
mod registry;
mod reload;
mod roots;
pub mod store;

#[cfg(test)]
use tokio as _;

pub use bundle::Bundle;
pub use changes::{ChangeEvent, ChangeKind, ChangeProcessor, Invalidation};
pub use error::{BundleError, Result, StoreError};
pub use key::Key;
pub use loader::LoadCoordinator;
pub use locator::LocatorPaths;
pub use path_filter::PathFilter;
pub use provider::{BundleProvider, BundleSource};
pub use registry::{BundlePublisher, BundleRegistry, NoopPublisher, PublishEvent, RecordingPublisher, Registration};
pub use reload::{RELOAD_ALL_JOB, ReloadScheduler, reload_job_name};
pub use roots::LanguageRoots;
pub use store::{Catalog, CatalogQuery, CatalogStore, LanguageRootRecord, MemoryStore, Node, ResourceKind};
