//! Snapshot capture and restore.

use crate::error::{RetentionError, RetentionResult};
use crate::merge::{insert_stack, CombinedSlots};
use crate::snapshot::InventorySnapshot;
use keepinv_core::{ContainerKind, InventoryHandle, ItemStack};
use serde::Serialize;
use tracing::debug;

/// Result of restoring a snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RestoreReport {
    /// Stacks written back (fully or partially).
    pub placed: usize,
    /// Items that no longer fit and were dropped.
    pub overflow: Vec<ItemStack>,
}

impl RestoreReport {
    /// Total quantity dropped.
    pub fn overflow_quantity(&self) -> u64 {
        self.overflow.iter().map(|s| s.quantity as u64).sum()
    }
}

/// Stateless capture/restore engine.
#[derive(Debug, Clone, Copy, Default)]
pub struct SnapshotEngine;

impl SnapshotEngine {
    /// Create an engine.
    pub fn new() -> Self {
        Self
    }

    /// Copy every slot of every container, in capture order.
    pub fn capture<H: InventoryHandle + ?Sized>(
        &self,
        inventory: &H,
    ) -> RetentionResult<InventorySnapshot> {
        let mut failure = None;
        let snapshot = InventorySnapshot::structural(
            |kind| {
                if failure.is_some() {
                    return None;
                }
                let capacity = inventory.capacity(kind)?;
                let mut slots = Vec::with_capacity(capacity);
                for slot in 0..capacity {
                    match inventory.slot(kind, slot) {
                        Ok(stack) => slots.push(stack.filter(|s| !s.is_empty())),
                        Err(source) => {
                            failure = Some(RetentionError::Capture { kind, source });
                            return None;
                        }
                    }
                }
                Some(slots)
            },
            inventory.active_hotbar_slot(),
        );
        match failure {
            Some(err) => Err(err),
            None => Ok(snapshot),
        }
    }

    /// Rebuild a snapshot from the host's list of items lost on death.
    ///
    /// Slot placement is unknown, so items go to storage one per slot in
    /// arrival order.
    pub fn capture_from_flat_list(&self, items: &[ItemStack]) -> InventorySnapshot {
        InventorySnapshot::flat(items.iter().filter(|s| !s.is_empty()).cloned().collect())
    }

    /// Clear `inventory` and write `snapshot` back into it.
    pub fn restore<H: InventoryHandle + ?Sized>(
        &self,
        inventory: &mut H,
        snapshot: &InventorySnapshot,
    ) -> RetentionResult<RestoreReport> {
        inventory.clear_all();
        if snapshot.is_structural() {
            self.restore_structural(inventory, snapshot)
        } else {
            self.restore_merged(inventory, snapshot)
        }
    }

    fn restore_structural<H: InventoryHandle + ?Sized>(
        &self,
        inventory: &mut H,
        snapshot: &InventorySnapshot,
    ) -> RetentionResult<RestoreReport> {
        let mut report = RestoreReport::default();
        for kind in ContainerKind::CAPTURE_ORDER {
            let slots = snapshot.container(kind);
            let capacity = inventory.capacity(kind).unwrap_or(0);
            for (index, stack) in slots.iter().enumerate() {
                let Some(stack) = stack else { continue };
                if index >= capacity {
                    report.overflow.push(stack.clone());
                    continue;
                }
                inventory
                    .set_slot(kind, index, Some(stack.clone()))
                    .map_err(|source| RetentionError::Restore { kind, source })?;
                report.placed += 1;
            }
            if slots.len() != capacity {
                debug!(%kind, captured = slots.len(), capacity, "container capacity changed since capture");
            }
        }
        let active = snapshot.active_hotbar_slot();
        if (active as usize) < inventory.capacity(ContainerKind::Hotbar).unwrap_or(0) {
            inventory
                .set_active_hotbar_slot(active)
                .map_err(|source| RetentionError::Restore {
                    kind: ContainerKind::Hotbar,
                    source,
                })?;
        } else {
            debug!(active, "captured hotbar selection no longer exists");
        }
        Ok(report)
    }

    fn restore_merged<H: InventoryHandle + ?Sized>(
        &self,
        inventory: &mut H,
        snapshot: &InventorySnapshot,
    ) -> RetentionResult<RestoreReport> {
        let mut report = RestoreReport::default();
        let mut pool = CombinedSlots::new(inventory);
        for stack in snapshot.items() {
            match insert_stack(&mut pool, stack.clone())? {
                None => report.placed += 1,
                Some(remainder) => {
                    if remainder.quantity < stack.quantity {
                        report.placed += 1;
                    }
                    report.overflow.push(remainder);
                }
            }
        }
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use keepinv_core::{InventoryError, PlayerInventory};
    use proptest::prelude::*;

    fn stocked_inventory() -> PlayerInventory {
        let mut inv = PlayerInventory::with_capacities(6, 4, 9, 2, Some(3));
        inv.set_slot(ContainerKind::Storage, 0, Some(ItemStack::new("Rock_Stone", 40)))
            .unwrap();
        inv.set_slot(ContainerKind::Storage, 5, Some(ItemStack::new("Plant_Fiber", 3)))
            .unwrap();
        inv.set_slot(
            ContainerKind::Armor,
            1,
            Some(ItemStack::new("Armor_Iron_Chest", 1).with_durability(120, 200)),
        )
        .unwrap();
        inv.set_slot(ContainerKind::Hotbar, 4, Some(ItemStack::new("Torch", 16)))
            .unwrap();
        inv.set_slot(
            ContainerKind::Backpack,
            2,
            Some(ItemStack::new("Rope", 2).with_metadata(vec![1, 2, 3])),
        )
        .unwrap();
        inv.set_active_hotbar_slot(4).unwrap();
        inv
    }

    #[test]
    fn capture_preserves_slot_layout_and_capacity() {
        let inv = stocked_inventory();
        let snapshot = SnapshotEngine::new().capture(&inv).unwrap();

        assert!(snapshot.is_structural());
        assert_eq!(snapshot.active_hotbar_slot(), 4);
        assert_eq!(snapshot.container(ContainerKind::Storage).len(), 6);
        assert_eq!(snapshot.container(ContainerKind::Armor).len(), 4);
        assert_eq!(snapshot.container(ContainerKind::Backpack).len(), 3);
        assert_eq!(snapshot.total_items(), 5);
        assert!(snapshot.container(ContainerKind::Storage)[1].is_none());
    }

    #[test]
    fn capture_without_backpack_records_absence() {
        let inv = PlayerInventory::new();
        let snapshot = SnapshotEngine::new().capture(&inv).unwrap();
        assert!(!snapshot.has_backpack());
    }

    #[test]
    fn structural_round_trip_reproduces_inventory() {
        let original = stocked_inventory();
        let engine = SnapshotEngine::new();
        let snapshot = engine.capture(&original).unwrap();

        let mut respawned = PlayerInventory::with_capacities(6, 4, 9, 2, Some(3));
        let report = engine.restore(&mut respawned, &snapshot).unwrap();

        assert_eq!(report.placed, 5);
        assert!(report.overflow.is_empty());
        assert_eq!(respawned, original);
    }

    #[test]
    fn restore_clears_whatever_the_host_spawned_with() {
        let engine = SnapshotEngine::new();
        let snapshot = engine.capture(&stocked_inventory()).unwrap();

        let mut respawned = PlayerInventory::with_capacities(6, 4, 9, 2, Some(3));
        respawned
            .set_slot(ContainerKind::Storage, 1, Some(ItemStack::new("Starter_Bread", 5)))
            .unwrap();
        engine.restore(&mut respawned, &snapshot).unwrap();

        assert!(respawned.slot(ContainerKind::Storage, 1).unwrap().is_none());
    }

    #[test]
    fn structural_restore_drops_items_past_smaller_capacity() {
        let engine = SnapshotEngine::new();
        let snapshot = engine.capture(&stocked_inventory()).unwrap();

        let mut smaller = PlayerInventory::with_capacities(4, 4, 9, 2, None);
        let report = engine.restore(&mut smaller, &snapshot).unwrap();

        let dropped: Vec<_> = report.overflow.iter().map(|s| s.item_id.as_str()).collect();
        assert_eq!(dropped, ["Plant_Fiber", "Rope"]);
        assert_eq!(report.placed, 3);
        assert_eq!(smaller.total_quantity("Rock_Stone"), 40);
    }

    #[test]
    fn flat_capture_skips_empty_entries() {
        let snapshot = SnapshotEngine::new().capture_from_flat_list(&[
            ItemStack::new("Rock_Stone", 0),
            ItemStack::new("Torch", 2),
        ]);
        assert_eq!(snapshot.total_items(), 1);
        assert!(!snapshot.is_structural());
    }

    #[test]
    fn flat_restore_merges_duplicates_and_keeps_default_hotbar_slot() {
        let engine = SnapshotEngine::new();
        let snapshot = engine.capture_from_flat_list(&[
            ItemStack::new("Rock_Stone", 30),
            ItemStack::new("Rock_Stone", 40),
            ItemStack::new("Torch", 5),
        ]);

        let mut inv = PlayerInventory::new();
        let report = engine.restore(&mut inv, &snapshot).unwrap();

        assert!(report.overflow.is_empty());
        assert_eq!(
            inv.slot(ContainerKind::Storage, 0).unwrap().map(|s| s.quantity),
            Some(64)
        );
        assert_eq!(
            inv.slot(ContainerKind::Storage, 1).unwrap(),
            Some(ItemStack::new("Rock_Stone", 6))
        );
        assert_eq!(
            inv.slot(ContainerKind::Storage, 2).unwrap(),
            Some(ItemStack::new("Torch", 5))
        );
        assert_eq!(inv.active_hotbar_slot(), 0);
    }

    #[test]
    fn flat_restore_reports_overflow_when_pool_is_too_small() {
        let engine = SnapshotEngine::new();
        let snapshot = engine.capture_from_flat_list(&[
            ItemStack::new("Rock_Stone", 10),
            ItemStack::new("Torch", 5),
            ItemStack::new("Rope", 1),
        ]);

        let mut inv = PlayerInventory::with_capacities(1, 0, 1, 0, None);
        let report = engine.restore(&mut inv, &snapshot).unwrap();

        assert_eq!(report.placed, 2);
        assert_eq!(report.overflow, vec![ItemStack::new("Rope", 1)]);
        assert_eq!(report.overflow_quantity(), 1);
    }

    #[test]
    fn capture_failure_names_the_container() {
        struct BrokenArmor(PlayerInventory);

        impl InventoryHandle for BrokenArmor {
            fn capacity(&self, kind: ContainerKind) -> Option<usize> {
                self.0.capacity(kind)
            }
            fn slot(
                &self,
                kind: ContainerKind,
                slot: usize,
            ) -> Result<Option<ItemStack>, InventoryError> {
                if kind == ContainerKind::Armor {
                    return Err(InventoryError::Rejected {
                        kind,
                        slot,
                        reason: "locked".into(),
                    });
                }
                self.0.slot(kind, slot)
            }
            fn set_slot(
                &mut self,
                kind: ContainerKind,
                slot: usize,
                stack: Option<ItemStack>,
            ) -> Result<(), InventoryError> {
                self.0.set_slot(kind, slot, stack)
            }
            fn active_hotbar_slot(&self) -> u8 {
                0
            }
            fn set_active_hotbar_slot(&mut self, _slot: u8) -> Result<(), InventoryError> {
                Ok(())
            }
            fn clear_all(&mut self) {
                self.0.clear_all()
            }
            fn mark_changed(&mut self) {}
            fn send_to_client(&mut self) {}
        }

        let err = SnapshotEngine::new()
            .capture(&BrokenArmor(PlayerInventory::new()))
            .unwrap_err();
        assert!(matches!(
            err,
            RetentionError::Capture {
                kind: ContainerKind::Armor,
                ..
            }
        ));
    }

    proptest! {
        #[test]
        fn round_trip_holds_for_arbitrary_layouts(
            storage in prop::collection::vec(prop::option::of(1u32..=64), 8),
            hotbar in prop::collection::vec(prop::option::of(1u32..=64), 9),
            active in 0u8..9,
        ) {
            let mut inv = PlayerInventory::with_capacities(8, 4, 9, 4, None);
            for (i, qty) in storage.iter().enumerate() {
                inv.set_slot(ContainerKind::Storage, i, qty.map(|q| ItemStack::new("Rock_Stone", q))).unwrap();
            }
            for (i, qty) in hotbar.iter().enumerate() {
                inv.set_slot(ContainerKind::Hotbar, i, qty.map(|q| ItemStack::new(format!("Item_{i}"), q))).unwrap();
            }
            inv.set_active_hotbar_slot(active).unwrap();

            let engine = SnapshotEngine::new();
            let snapshot = engine.capture(&inv).unwrap();
            let mut restored = PlayerInventory::with_capacities(8, 4, 9, 4, None);
            engine.restore(&mut restored, &snapshot).unwrap();

            prop_assert_eq!(restored, inv);
        }
    }
}
