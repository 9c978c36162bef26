//! Pending snapshots awaiting respawn.

use crate::snapshot::InventorySnapshot;
use dashmap::DashMap;
use keepinv_core::PlayerId;

/// At most one pending snapshot per player.
///
/// Each operation is atomic per key: a `take` either sees the whole snapshot
/// from the latest `put` or nothing.
#[derive(Debug, Default)]
pub struct SnapshotStore {
    pending: DashMap<PlayerId, InventorySnapshot>,
}

impl SnapshotStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `snapshot`, returning any stale one it replaced.
    pub fn put(&self, player: PlayerId, snapshot: InventorySnapshot) -> Option<InventorySnapshot> {
        self.pending.insert(player, snapshot)
    }

    /// Remove and return the player's snapshot.
    pub fn take(&self, player: &PlayerId) -> Option<InventorySnapshot> {
        self.pending.remove(player).map(|(_, snapshot)| snapshot)
    }

    /// Whether a snapshot is waiting for this player.
    pub fn contains(&self, player: &PlayerId) -> bool {
        self.pending.contains_key(player)
    }

    /// Discard one player's snapshot.
    pub fn clear(&self, player: &PlayerId) -> bool {
        self.pending.remove(player).is_some()
    }

    /// Discard every snapshot.
    pub fn clear_all(&self) {
        self.pending.clear();
    }

    /// Number of pending snapshots.
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// True if nothing is pending.
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use keepinv_core::ItemStack;
    use std::sync::Arc;
    use std::thread;

    fn snapshot(item: &str) -> InventorySnapshot {
        InventorySnapshot::flat(vec![ItemStack::new(item, 1)])
    }

    #[test]
    fn take_consumes_exactly_once() {
        let store = SnapshotStore::new();
        let player = PlayerId::from_name("alex");
        store.put(player, snapshot("Torch"));

        assert!(store.take(&player).is_some());
        assert!(store.take(&player).is_none());
    }

    #[test]
    fn take_without_snapshot_is_absent() {
        let store = SnapshotStore::new();
        assert!(store.take(&PlayerId::from_name("nobody")).is_none());
    }

    #[test]
    fn put_overwrites_stale_snapshot() {
        let store = SnapshotStore::new();
        let player = PlayerId::from_name("alex");
        assert!(store.put(player, snapshot("Old")).is_none());
        let stale = store.put(player, snapshot("New")).unwrap();

        assert_eq!(stale.items().next().unwrap().item_id, "Old");
        assert_eq!(store.take(&player).unwrap().items().next().unwrap().item_id, "New");
        assert_eq!(store.len(), 0);
    }

    #[test]
    fn clear_and_clear_all() {
        let store = SnapshotStore::new();
        let a = PlayerId::from_name("a");
        let b = PlayerId::from_name("b");
        store.put(a, snapshot("Torch"));
        store.put(b, snapshot("Torch"));

        assert!(store.clear(&a));
        assert!(!store.contains(&a));
        assert!(store.contains(&b));

        store.clear_all();
        assert!(store.is_empty());
    }

    #[test]
    fn concurrent_put_take_across_players() {
        let store = Arc::new(SnapshotStore::new());
        let handles: Vec<_> = (0..8)
            .map(|t| {
                let store = Arc::clone(&store);
                thread::spawn(move || {
                    let mut taken = 0;
                    for i in 0..50 {
                        let player = PlayerId::from_name(&format!("p{t}-{i}"));
                        store.put(player, snapshot("Torch"));
                        if store.take(&player).is_some() {
                            taken += 1;
                        }
                    }
                    taken
                })
            })
            .collect();

        let total: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();
        assert_eq!(total, 400);
        assert!(store.is_empty());
    }
}
