use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use rustc_hash::FxHashMap;

use crate::Key;

/// Table size below which dead entries are not pruned.
const PRUNE_FLOOR: usize = 64;

/// Per-key build locks.
///
/// The table only holds weak references: a lock lives as long as some caller
/// holds or waits on it, and dead entries are pruned whenever the table
/// doubles, so the table stays bounded by the number of keys being built
/// concurrently rather than every key ever requested. While any caller holds
/// a key's lock, every other caller for that key resolves to the same lock.
#[derive(Debug)]
pub(crate) struct KeyLocks {
	table: Mutex<Table>,
}

#[derive(Debug)]
struct Table {
	locks: FxHashMap<Key, Weak<Mutex<()>>>,
	prune_at: usize,
}

impl Default for KeyLocks {
	fn default() -> Self {
		Self {
			table: Mutex::new(Table {
				locks: FxHashMap::default(),
				prune_at: PRUNE_FLOOR,
			}),
		}
	}
}

impl KeyLocks {
	/// Returns the shared build lock for `key`, creating it when no caller
	/// currently holds one. Callers lock it for the duration of the build;
	/// the guard releases on every exit path, including unwinds.
	pub fn lock_for(&self, key: &Key) -> Arc<Mutex<()>> {
		let mut table = self.table.lock();
		if let Some(lock) = table.locks.get(key).and_then(Weak::upgrade) {
			return lock;
		}

		let lock = Arc::new(Mutex::new(()));
		table.locks.insert(key.clone(), Arc::downgrade(&lock));
		tracing::debug!(%key, "key_locks.create");

		if table.locks.len() > table.prune_at {
			table.locks.retain(|_, lock| lock.strong_count() > 0);
			table.prune_at = (table.locks.len() * 2).max(PRUNE_FLOOR);
		}
		lock
	}

	/// Number of table entries, live or dead.
	#[cfg(test)]
	fn len(&self) -> usize {
		self.table.lock().locks.len()
	}
}

#[cfg(test)]
mod tests {
	use std::sync::atomic::{AtomicUsize, Ordering};
	use std::sync::Barrier;

	use lingua_locale::Locale;

	use super::*;

	fn key(n: usize) -> Key {
		Key::new(Some(&format!("catalog-{n}")), Locale::new("de"))
	}

	#[test]
	fn same_key_shares_one_lock_while_held() {
		let locks = KeyLocks::default();
		let held = locks.lock_for(&key(0));
		assert!(Arc::ptr_eq(&held, &locks.lock_for(&key(0))));
		assert!(!Arc::ptr_eq(&held, &locks.lock_for(&key(1))));
	}

	#[test]
	fn guard_excludes_concurrent_holders() {
		let locks = KeyLocks::default();
		let inside = AtomicUsize::new(0);
		let max_inside = AtomicUsize::new(0);
		let barrier = Barrier::new(8);

		std::thread::scope(|scope| {
			for _ in 0..8 {
				scope.spawn(|| {
					barrier.wait();
					for _ in 0..100 {
						let lock = locks.lock_for(&key(0));
						let _guard = lock.lock();
						let now = inside.fetch_add(1, Ordering::SeqCst) + 1;
						max_inside.fetch_max(now, Ordering::SeqCst);
						std::thread::yield_now();
						inside.fetch_sub(1, Ordering::SeqCst);
					}
				});
			}
		});

		assert_eq!(max_inside.load(Ordering::SeqCst), 1);
	}

	#[test]
	fn dead_entries_are_pruned() {
		let locks = KeyLocks::default();
		for n in 0..1000 {
			let lock = locks.lock_for(&key(n));
			drop(lock.lock());
		}
		assert!(locks.len() <= PRUNE_FLOOR + 1, "table grew to {}", locks.len());
	}

	#[test]
	fn guard_is_released_when_the_holder_panics() {
		let locks = KeyLocks::default();
		let result = std::thread::scope(|scope| {
			scope
				.spawn(|| {
					let lock = locks.lock_for(&key(0));
					let _guard = lock.lock();
					panic!("build failed");
				})
				.join()
		});
		assert!(result.is_err());
		assert!(locks.lock_for(&key(0)).try_lock().is_some());
	}
}
