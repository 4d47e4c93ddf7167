//! Snapshot store for the reference cache.
//!
//! Readers take an `Arc` to the current snapshot and keep using it for as
//! long as they like; a refresh swaps in a new `Arc` and never touches the
//! old value, so no reader can observe a mix of two refreshes.

use std::sync::{Arc, RwLock};

use tracing::debug;

use crate::domain::snapshot::ReferenceSnapshot;

use super::lock::{rw_read, rw_write};

const SOURCE: &str = "cache::store";

pub struct ReferenceStore {
    current: RwLock<Arc<ReferenceSnapshot>>,
}

impl ReferenceStore {
    /// Create a store holding the empty placeholder snapshot.
    pub fn new() -> Self {
        Self::with_snapshot(ReferenceSnapshot::empty())
    }

    /// Create a store already holding `snapshot`.
    pub fn with_snapshot(snapshot: ReferenceSnapshot) -> Self {
        Self {
            current: RwLock::new(Arc::new(snapshot)),
        }
    }

    /// The snapshot current at the time of the call.
    pub fn snapshot(&self) -> Arc<ReferenceSnapshot> {
        Arc::clone(&rw_read(&self.current, SOURCE, "snapshot"))
    }

    /// Install `snapshot` as current and return the one it replaced.
    pub fn replace(&self, snapshot: ReferenceSnapshot) -> Arc<ReferenceSnapshot> {
        let next = Arc::new(snapshot);
        let previous = std::mem::replace(
            &mut *rw_write(&self.current, SOURCE, "replace"),
            Arc::clone(&next),
        );
        debug!(
            users = next.users.len(),
            realms = next.realms.len(),
            recent_tags = next.recent_tags.len(),
            "Reference snapshot replaced"
        );
        previous
    }
}

impl Default for ReferenceStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    fn with_users(users: &[(u64, &str)]) -> ReferenceSnapshot {
        ReferenceSnapshot {
            users: users
                .iter()
                .map(|(id, name)| (*id, (*name).to_string()))
                .collect::<BTreeMap<_, _>>(),
            ..ReferenceSnapshot::empty()
        }
    }

    #[test]
    fn readers_keep_their_snapshot_across_replace() {
        let store = ReferenceStore::with_snapshot(with_users(&[(1, "alice")]));
        let held = store.snapshot();

        let previous = store.replace(with_users(&[(1, "alice"), (2, "bob")]));

        assert!(Arc::ptr_eq(&held, &previous));
        assert_eq!(held.users.len(), 1);
        assert_eq!(store.snapshot().users.len(), 2);
        assert_eq!(store.snapshot().user_name(2), Some("bob"));
    }

    #[test]
    fn new_store_starts_unloaded() {
        let store = ReferenceStore::new();
        assert!(!store.snapshot().is_loaded());
    }
}
