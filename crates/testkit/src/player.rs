//! A player driven through death and respawn the way a host would.

use keepinv_core::{ContainerKind, InventoryError, InventoryHandle, ItemStack, PlayerId, PlayerInventory};
use keepinv_retention::{
    insert_stack, CombinedSlots, DeathEvent, DeathOutcome, KeepInventory, LossDescriptor,
    LossMode, RespawnEvent, RespawnOutcome,
};
use tracing::debug;

/// Container sizes a respawned inventory is created with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InventoryLayout {
    /// Storage slots.
    pub storage: usize,
    /// Armor slots.
    pub armor: usize,
    /// Hotbar slots.
    pub hotbar: usize,
    /// Utility slots.
    pub utility: usize,
    /// Backpack slots, if the player carries one.
    pub backpack: Option<usize>,
}

impl Default for InventoryLayout {
    fn default() -> Self {
        Self {
            storage: keepinv_core::DEFAULT_STORAGE_SLOTS,
            armor: keepinv_core::DEFAULT_ARMOR_SLOTS,
            hotbar: keepinv_core::DEFAULT_HOTBAR_SLOTS,
            utility: keepinv_core::DEFAULT_UTILITY_SLOTS,
            backpack: None,
        }
    }
}

impl InventoryLayout {
    /// Empty inventory with this layout.
    pub fn build(&self) -> PlayerInventory {
        PlayerInventory::with_capacities(
            self.storage,
            self.armor,
            self.hotbar,
            self.utility,
            self.backpack,
        )
    }
}

/// Simulated player: inventory, pending host loss and dropped items.
#[derive(Debug, Clone)]
pub struct SimulatedPlayer {
    /// Display name.
    pub name: String,
    /// Stable id derived from the name.
    pub id: PlayerId,
    /// Live inventory.
    pub inventory: PlayerInventory,
    /// Loss the host will apply at the next death.
    pub loss: LossDescriptor,
    /// Layout used at respawn.
    pub layout: InventoryLayout,
    /// Items the host dropped on the ground so far.
    pub dropped: Vec<ItemStack>,
}

impl SimulatedPlayer {
    /// Player with the default layout.
    pub fn new(name: &str) -> Self {
        Self::with_layout(name, InventoryLayout::default())
    }

    /// Player with an explicit layout.
    pub fn with_layout(name: &str, layout: InventoryLayout) -> Self {
        Self {
            name: name.to_string(),
            id: PlayerId::from_name(name),
            inventory: layout.build(),
            loss: LossDescriptor::default(),
            layout,
            dropped: Vec::new(),
        }
    }

    /// Pick up `stack` the way a live inventory would. Returns what did not fit.
    pub fn give(&mut self, stack: ItemStack) -> Result<Option<ItemStack>, InventoryError> {
        let mut pool = CombinedSlots::new(&mut self.inventory);
        insert_stack(&mut pool, stack)
    }

    /// Put `stack` into an exact slot.
    pub fn place(
        &mut self,
        kind: ContainerKind,
        slot: usize,
        stack: ItemStack,
    ) -> Result<(), InventoryError> {
        self.inventory.set_slot(kind, slot, Some(stack))
    }

    /// Die with the host's default "drop everything" loss.
    pub fn die(&mut self, service: &KeepInventory) -> DeathOutcome {
        self.loss = drop_everything(&self.inventory);
        self.run_death(service)
    }

    /// Die after the host already emptied the inventory into its loss list.
    pub fn die_after_host_emptied(&mut self, service: &KeepInventory) -> DeathOutcome {
        self.loss = drop_everything(&self.inventory);
        self.inventory.clear_all();
        self.run_death(service)
    }

    fn run_death(&mut self, service: &KeepInventory) -> DeathOutcome {
        let outcome = service.on_death(DeathEvent {
            player: self.id,
            inventory: &mut self.inventory,
            loss: &mut self.loss,
        });
        self.apply_host_loss();
        outcome
    }

    fn apply_host_loss(&mut self) {
        if self.loss.loss_mode == LossMode::None {
            return;
        }
        self.dropped.append(&mut self.loss.items_lost);
        self.inventory.clear_all();
        debug!(player = %self.name, dropped = self.dropped.len(), "host applied death loss");
    }

    /// Respawn into a fresh inventory.
    pub fn respawn(&mut self, service: &KeepInventory) -> RespawnOutcome {
        self.inventory = self.layout.build();
        service.on_respawn(RespawnEvent {
            player: self.id,
            inventory: &mut self.inventory,
        })
    }

    /// Quantity of `item_id` in the live inventory.
    pub fn holding(&self, item_id: &str) -> u64 {
        self.inventory.total_quantity(item_id)
    }

    /// Quantity of `item_id` the host dropped.
    pub fn dropped_quantity(&self, item_id: &str) -> u64 {
        self.dropped
            .iter()
            .filter(|s| s.item_id == item_id)
            .map(|s| s.quantity as u64)
            .sum()
    }
}

/// The host's default loss: every held item, full drop.
pub fn drop_everything(inventory: &PlayerInventory) -> LossDescriptor {
    let items_lost = ContainerKind::CAPTURE_ORDER
        .iter()
        .filter_map(|&kind| inventory.container(kind))
        .flat_map(|c| c.iter().flatten().cloned())
        .collect();
    LossDescriptor {
        items_lost,
        amount_loss_percentage: 100.0,
        durability_loss_percentage: 0.0,
        loss_mode: LossMode::All,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stack;
    use keepinv_retention::RetentionConfig;

    #[test]
    fn without_retention_host_drops_everything() {
        let service = KeepInventory::with_config(RetentionConfig::default());
        let mut player = SimulatedPlayer::new("alex");
        player.give(stack("Torch", 5)).unwrap();

        assert_eq!(player.die(&service), DeathOutcome::NotRetained);
        assert_eq!(player.dropped_quantity("Torch"), 5);
        assert_eq!(player.respawn(&service), RespawnOutcome::NoSnapshot);
        assert_eq!(player.holding("Torch"), 0);
    }

    #[test]
    fn give_merges_into_existing_stacks() {
        let mut player = SimulatedPlayer::new("alex");
        player.give(stack("Rock_Stone", 60)).unwrap();
        player.give(stack("Rock_Stone", 10)).unwrap();
        assert_eq!(
            player.inventory.slot(ContainerKind::Storage, 0).unwrap(),
            Some(stack("Rock_Stone", 64))
        );
        assert_eq!(player.holding("Rock_Stone"), 70);
    }
}
