//! Captured inventory state.

use keepinv_core::{ContainerKind, ItemStack};
use serde::{Deserialize, Serialize};

/// Immutable copy of one inventory's contents at the moment of death.
///
/// A structural snapshot holds one slot list per container, each exactly as
/// long as the container was. A flat snapshot only knows the multiset of
/// items: they sit in `storage` in arrival order and every other list is empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventorySnapshot {
    storage: Vec<Option<ItemStack>>,
    armor: Vec<Option<ItemStack>>,
    hotbar: Vec<Option<ItemStack>>,
    utility: Vec<Option<ItemStack>>,
    backpack: Option<Vec<Option<ItemStack>>>,
    active_hotbar_slot: u8,
    structural: bool,
}

impl InventorySnapshot {
    pub(crate) fn structural(
        mut containers: impl FnMut(ContainerKind) -> Option<Vec<Option<ItemStack>>>,
        active_hotbar_slot: u8,
    ) -> Self {
        Self {
            storage: containers(ContainerKind::Storage).unwrap_or_default(),
            armor: containers(ContainerKind::Armor).unwrap_or_default(),
            hotbar: containers(ContainerKind::Hotbar).unwrap_or_default(),
            utility: containers(ContainerKind::Utility).unwrap_or_default(),
            backpack: containers(ContainerKind::Backpack),
            active_hotbar_slot,
            structural: true,
        }
    }

    pub(crate) fn flat(items: Vec<ItemStack>) -> Self {
        Self {
            storage: items.into_iter().map(Some).collect(),
            armor: Vec::new(),
            hotbar: Vec::new(),
            utility: Vec::new(),
            backpack: None,
            active_hotbar_slot: 0,
            structural: false,
        }
    }

    /// Slot-accurate capture (as opposed to a reconstructed item list).
    pub fn is_structural(&self) -> bool {
        self.structural
    }

    /// Hotbar selection at capture time. Always 0 for flat snapshots.
    pub fn active_hotbar_slot(&self) -> u8 {
        self.active_hotbar_slot
    }

    /// Slots captured for `kind`; empty if the container was absent.
    pub fn container(&self, kind: ContainerKind) -> &[Option<ItemStack>] {
        match kind {
            ContainerKind::Storage => &self.storage,
            ContainerKind::Armor => &self.armor,
            ContainerKind::Hotbar => &self.hotbar,
            ContainerKind::Utility => &self.utility,
            ContainerKind::Backpack => self.backpack.as_deref().unwrap_or(&[]),
        }
    }

    /// Whether the inventory had a backpack at capture time.
    pub fn has_backpack(&self) -> bool {
        self.backpack.is_some()
    }

    /// Every non-empty stack in capture order.
    pub fn items(&self) -> impl Iterator<Item = &ItemStack> {
        ContainerKind::CAPTURE_ORDER
            .into_iter()
            .flat_map(move |kind| self.container(kind).iter().flatten())
            .filter(|stack| !stack.is_empty())
    }

    /// Number of occupied slots across all containers.
    pub fn total_items(&self) -> usize {
        self.items().count()
    }
}
