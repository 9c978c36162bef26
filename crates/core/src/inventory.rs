//! Multi-container player inventory.
//!
//! A player inventory is a fixed set of named containers (storage, armor,
//! hotbar, utility and an optional backpack) plus the active hotbar slot.
//! [`InventoryHandle`] is the narrow contract the retention engine needs from
//! a host inventory; [`PlayerInventory`] is the in-memory implementation.

use crate::item::ItemStack;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Number of storage slots in a default player inventory.
pub const DEFAULT_STORAGE_SLOTS: usize = 36;
/// Number of armor slots in a default player inventory.
pub const DEFAULT_ARMOR_SLOTS: usize = 4;
/// Number of hotbar slots in a default player inventory.
pub const DEFAULT_HOTBAR_SLOTS: usize = 9;
/// Number of utility slots in a default player inventory.
pub const DEFAULT_UTILITY_SLOTS: usize = 4;

/// Named containers making up a player inventory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContainerKind {
    /// Main storage grid.
    Storage,
    /// Equipped armor.
    Armor,
    /// Quick-access hotbar.
    Hotbar,
    /// Utility belt.
    Utility,
    /// Optional backpack.
    Backpack,
}

impl ContainerKind {
    /// Fixed order in which containers are captured.
    pub const CAPTURE_ORDER: [ContainerKind; 5] = [
        ContainerKind::Storage,
        ContainerKind::Armor,
        ContainerKind::Hotbar,
        ContainerKind::Utility,
        ContainerKind::Backpack,
    ];

    /// Order in which loose items are absorbed into a live inventory.
    pub const ABSORB_ORDER: [ContainerKind; 5] = [
        ContainerKind::Storage,
        ContainerKind::Hotbar,
        ContainerKind::Utility,
        ContainerKind::Armor,
        ContainerKind::Backpack,
    ];
}

impl fmt::Display for ContainerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ContainerKind::Storage => "storage",
            ContainerKind::Armor => "armor",
            ContainerKind::Hotbar => "hotbar",
            ContainerKind::Utility => "utility",
            ContainerKind::Backpack => "backpack",
        };
        f.write_str(name)
    }
}

/// Errors raised by inventory handles.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InventoryError {
    /// Slot index past the container's capacity.
    #[error("slot {slot} out of range for {kind} (capacity {capacity})")]
    SlotOutOfRange {
        /// Container addressed.
        kind: ContainerKind,
        /// Requested slot.
        slot: usize,
        /// Container capacity.
        capacity: usize,
    },
    /// The inventory has no container of this kind.
    #[error("inventory has no {0} container")]
    MissingContainer(ContainerKind),
    /// The host refused the write.
    #[error("{kind} slot {slot} rejected write: {reason}")]
    Rejected {
        /// Container addressed.
        kind: ContainerKind,
        /// Requested slot.
        slot: usize,
        /// Host-supplied reason.
        reason: String,
    },
}

/// Fixed-capacity ordered sequence of slots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Container {
    slots: Vec<Option<ItemStack>>,
}

impl Container {
    /// Create an empty container with `capacity` slots.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: vec![None; capacity],
        }
    }

    /// Number of slots.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Get an item stack from a slot.
    pub fn get(&self, slot: usize) -> Option<&ItemStack> {
        self.slots.get(slot).and_then(|s| s.as_ref())
    }

    /// Set an item stack in a slot. Zero-quantity stacks are stored as empty.
    pub fn set(&mut self, slot: usize, stack: Option<ItemStack>) -> bool {
        match self.slots.get_mut(slot) {
            Some(target) => {
                *target = stack.filter(|s| !s.is_empty());
                true
            }
            None => false,
        }
    }

    /// Take an item stack from a slot, leaving it empty.
    pub fn take(&mut self, slot: usize) -> Option<ItemStack> {
        self.slots.get_mut(slot).and_then(|s| s.take())
    }

    /// Empty every slot.
    pub fn clear(&mut self) {
        self.slots.iter_mut().for_each(|s| *s = None);
    }

    /// Check if the container is completely empty.
    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(|slot| slot.is_none())
    }

    /// Iterate slots in order.
    pub fn iter(&self) -> impl Iterator<Item = Option<&ItemStack>> {
        self.slots.iter().map(|s| s.as_ref())
    }
}

/// Host inventory contract used by the retention engine.
///
/// Slot reads return copies. Implementations backed by a game host forward
/// these calls to its native inventory object.
pub trait InventoryHandle {
    /// Capacity of a container, or `None` if the inventory has no such container.
    fn capacity(&self, kind: ContainerKind) -> Option<usize>;

    /// Read a slot.
    fn slot(&self, kind: ContainerKind, slot: usize) -> Result<Option<ItemStack>, InventoryError>;

    /// Overwrite a slot.
    fn set_slot(
        &mut self,
        kind: ContainerKind,
        slot: usize,
        stack: Option<ItemStack>,
    ) -> Result<(), InventoryError>;

    /// Empty a slot.
    fn clear_slot(&mut self, kind: ContainerKind, slot: usize) -> Result<(), InventoryError> {
        self.set_slot(kind, slot, None)
    }

    /// Currently selected hotbar slot.
    fn active_hotbar_slot(&self) -> u8;

    /// Select a hotbar slot.
    fn set_active_hotbar_slot(&mut self, slot: u8) -> Result<(), InventoryError>;

    /// Empty every container.
    fn clear_all(&mut self);

    /// Flag the inventory as modified so the host persists it.
    fn mark_changed(&mut self);

    /// Ask the host to re-send inventory state to the client.
    fn send_to_client(&mut self);

    /// True if no container holds a non-empty stack.
    ///
    /// A slot that cannot be read counts as occupied, so a capture still runs
    /// and reports the read error.
    fn is_empty(&self) -> bool {
        ContainerKind::CAPTURE_ORDER.iter().all(|&kind| {
            let capacity = self.capacity(kind).unwrap_or(0);
            (0..capacity).all(|slot| match self.slot(kind, slot) {
                Ok(Some(stack)) => stack.is_empty(),
                Ok(None) => true,
                Err(_) => false,
            })
        })
    }
}

/// In-memory player inventory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerInventory {
    storage: Container,
    armor: Container,
    hotbar: Container,
    utility: Container,
    backpack: Option<Container>,
    active_hotbar_slot: u8,
    changed: bool,
    client_syncs: u32,
}

impl PlayerInventory {
    /// Create an inventory with the default container sizes and no backpack.
    pub fn new() -> Self {
        Self::with_capacities(
            DEFAULT_STORAGE_SLOTS,
            DEFAULT_ARMOR_SLOTS,
            DEFAULT_HOTBAR_SLOTS,
            DEFAULT_UTILITY_SLOTS,
            None,
        )
    }

    /// Create an inventory with explicit container sizes.
    pub fn with_capacities(
        storage: usize,
        armor: usize,
        hotbar: usize,
        utility: usize,
        backpack: Option<usize>,
    ) -> Self {
        Self {
            storage: Container::with_capacity(storage),
            armor: Container::with_capacity(armor),
            hotbar: Container::with_capacity(hotbar),
            utility: Container::with_capacity(utility),
            backpack: backpack.map(Container::with_capacity),
            active_hotbar_slot: 0,
            changed: false,
            client_syncs: 0,
        }
    }

    /// Borrow a container.
    pub fn container(&self, kind: ContainerKind) -> Option<&Container> {
        match kind {
            ContainerKind::Storage => Some(&self.storage),
            ContainerKind::Armor => Some(&self.armor),
            ContainerKind::Hotbar => Some(&self.hotbar),
            ContainerKind::Utility => Some(&self.utility),
            ContainerKind::Backpack => self.backpack.as_ref(),
        }
    }

    fn container_mut(&mut self, kind: ContainerKind) -> Option<&mut Container> {
        match kind {
            ContainerKind::Storage => Some(&mut self.storage),
            ContainerKind::Armor => Some(&mut self.armor),
            ContainerKind::Hotbar => Some(&mut self.hotbar),
            ContainerKind::Utility => Some(&mut self.utility),
            ContainerKind::Backpack => self.backpack.as_mut(),
        }
    }

    /// Whether [`InventoryHandle::mark_changed`] was called.
    pub fn is_changed(&self) -> bool {
        self.changed
    }

    /// Number of client resyncs requested.
    pub fn client_syncs(&self) -> u32 {
        self.client_syncs
    }

    /// Count every item across all containers.
    pub fn total_quantity(&self, item_id: &str) -> u64 {
        ContainerKind::CAPTURE_ORDER
            .iter()
            .filter_map(|&kind| self.container(kind))
            .flat_map(|c| c.iter().flatten())
            .filter(|stack| stack.item_id == item_id)
            .map(|stack| stack.quantity as u64)
            .sum()
    }
}

impl Default for PlayerInventory {
    fn default() -> Self {
        Self::new()
    }
}

impl InventoryHandle for PlayerInventory {
    fn capacity(&self, kind: ContainerKind) -> Option<usize> {
        self.container(kind).map(Container::capacity)
    }

    fn slot(&self, kind: ContainerKind, slot: usize) -> Result<Option<ItemStack>, InventoryError> {
        let container = self
            .container(kind)
            .ok_or(InventoryError::MissingContainer(kind))?;
        if slot >= container.capacity() {
            return Err(InventoryError::SlotOutOfRange {
                kind,
                slot,
                capacity: container.capacity(),
            });
        }
        Ok(container.get(slot).cloned())
    }

    fn set_slot(
        &mut self,
        kind: ContainerKind,
        slot: usize,
        stack: Option<ItemStack>,
    ) -> Result<(), InventoryError> {
        let container = self
            .container_mut(kind)
            .ok_or(InventoryError::MissingContainer(kind))?;
        let capacity = container.capacity();
        if !container.set(slot, stack) {
            return Err(InventoryError::SlotOutOfRange {
                kind,
                slot,
                capacity,
            });
        }
        Ok(())
    }

    fn active_hotbar_slot(&self) -> u8 {
        self.active_hotbar_slot
    }

    fn set_active_hotbar_slot(&mut self, slot: u8) -> Result<(), InventoryError> {
        let capacity = self.hotbar.capacity();
        if slot as usize >= capacity {
            return Err(InventoryError::SlotOutOfRange {
                kind: ContainerKind::Hotbar,
                slot: slot as usize,
                capacity,
            });
        }
        self.active_hotbar_slot = slot;
        Ok(())
    }

    fn clear_all(&mut self) {
        self.storage.clear();
        self.armor.clear();
        self.hotbar.clear();
        self.utility.clear();
        if let Some(backpack) = &mut self.backpack {
            backpack.clear();
        }
    }

    fn mark_changed(&mut self) {
        self.changed = true;
    }

    fn send_to_client(&mut self) {
        self.client_syncs += 1;
    }

    fn is_empty(&self) -> bool {
        ContainerKind::CAPTURE_ORDER
            .iter()
            .filter_map(|&kind| self.container(kind))
            .all(Container::is_empty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_and_get_round_trip() {
        let mut inv = PlayerInventory::new();
        inv.set_slot(ContainerKind::Hotbar, 3, Some(ItemStack::new("Torch", 12)))
            .unwrap();

        let stack = inv.slot(ContainerKind::Hotbar, 3).unwrap().unwrap();
        assert_eq!(stack.quantity, 12);
        assert!(inv.slot(ContainerKind::Hotbar, 2).unwrap().is_none());
    }

    #[test]
    fn out_of_range_slot_is_an_error() {
        let mut inv = PlayerInventory::new();
        let err = inv
            .set_slot(ContainerKind::Armor, 4, Some(ItemStack::new("Helmet", 1)))
            .unwrap_err();
        assert_eq!(
            err,
            InventoryError::SlotOutOfRange {
                kind: ContainerKind::Armor,
                slot: 4,
                capacity: DEFAULT_ARMOR_SLOTS,
            }
        );
    }

    #[test]
    fn missing_backpack_reports_missing_container() {
        let inv = PlayerInventory::new();
        assert_eq!(inv.capacity(ContainerKind::Backpack), None);
        assert_eq!(
            inv.slot(ContainerKind::Backpack, 0).unwrap_err(),
            InventoryError::MissingContainer(ContainerKind::Backpack)
        );
    }

    #[test]
    fn zero_quantity_write_leaves_slot_empty() {
        let mut inv = PlayerInventory::new();
        inv.set_slot(ContainerKind::Storage, 0, Some(ItemStack::new("Rock_Stone", 0)))
            .unwrap();
        assert!(inv.is_empty());
    }

    #[test]
    fn clear_all_empties_every_container() {
        let mut inv = PlayerInventory::with_capacities(4, 1, 2, 1, Some(3));
        inv.set_slot(ContainerKind::Storage, 1, Some(ItemStack::new("Rock_Stone", 5)))
            .unwrap();
        inv.set_slot(ContainerKind::Backpack, 2, Some(ItemStack::new("Rope", 1)))
            .unwrap();
        assert!(!inv.is_empty());

        inv.clear_all();
        assert!(inv.is_empty());
        assert_eq!(inv.capacity(ContainerKind::Backpack), Some(3));
    }

    #[test]
    fn active_hotbar_slot_is_bounded_by_hotbar() {
        let mut inv = PlayerInventory::new();
        inv.set_active_hotbar_slot(8).unwrap();
        assert_eq!(inv.active_hotbar_slot(), 8);
        assert!(inv.set_active_hotbar_slot(9).is_err());
        assert_eq!(inv.active_hotbar_slot(), 8);
    }

    #[test]
    fn default_is_empty_matches_specialised_impl() {
        struct Wrapper(PlayerInventory);

        impl InventoryHandle for Wrapper {
            fn capacity(&self, kind: ContainerKind) -> Option<usize> {
                self.0.capacity(kind)
            }
            fn slot(
                &self,
                kind: ContainerKind,
                slot: usize,
            ) -> Result<Option<ItemStack>, InventoryError> {
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
                self.0.active_hotbar_slot()
            }
            fn set_active_hotbar_slot(&mut self, slot: u8) -> Result<(), InventoryError> {
                self.0.set_active_hotbar_slot(slot)
            }
            fn clear_all(&mut self) {
                self.0.clear_all()
            }
            fn mark_changed(&mut self) {}
            fn send_to_client(&mut self) {}
        }

        let mut wrapped = Wrapper(PlayerInventory::new());
        assert!(wrapped.is_empty());
        wrapped
            .set_slot(ContainerKind::Utility, 3, Some(ItemStack::new("Bandage", 2)))
            .unwrap();
        assert!(!wrapped.is_empty());
    }
}
