//! Death and respawn hooks.
//!
//! The host calls [`KeepInventory::on_death`] while a player's death is being
//! processed and [`KeepInventory::on_respawn`] once the replacement inventory
//! exists. Neither hook returns an error: failures are logged here and the
//! host carries on with its own rules.

use crate::engine::RestoreReport;
use crate::service::KeepInventory;
use crate::snapshot::InventorySnapshot;
use keepinv_core::{InventoryHandle, ItemStack, PlayerId};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

/// How the host applies death loss.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LossMode {
    /// Nothing is lost.
    None,
    /// Everything is dropped.
    #[default]
    All,
    /// Percentages and the explicit item list apply.
    Configured,
}

/// The host's pending death loss, applied after the hook returns.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LossDescriptor {
    /// Items the host is about to drop.
    pub items_lost: Vec<ItemStack>,
    /// Share of each stack's quantity to remove.
    pub amount_loss_percentage: f64,
    /// Share of durability to remove from tools and armor.
    pub durability_loss_percentage: f64,
    /// Loss mode.
    pub loss_mode: LossMode,
}

impl LossDescriptor {
    /// Make the descriptor a no-op.
    pub fn neutralize(&mut self) {
        self.items_lost.clear();
        self.amount_loss_percentage = 0.0;
        self.durability_loss_percentage = 0.0;
        self.loss_mode = LossMode::None;
    }

    /// True if applying the descriptor would change nothing.
    pub fn is_neutral(&self) -> bool {
        self.items_lost.is_empty()
            && self.amount_loss_percentage == 0.0
            && self.durability_loss_percentage == 0.0
            && self.loss_mode == LossMode::None
    }
}

/// A player died.
pub struct DeathEvent<'a> {
    /// Who died.
    pub player: PlayerId,
    /// The inventory they died with.
    pub inventory: &'a mut dyn InventoryHandle,
    /// The host's pending loss for this death.
    pub loss: &'a mut LossDescriptor,
}

/// A player respawned.
pub struct RespawnEvent<'a> {
    /// Who respawned.
    pub player: PlayerId,
    /// The freshly assigned inventory.
    pub inventory: &'a mut dyn InventoryHandle,
}

/// What the death hook did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum DeathOutcome {
    /// Retention did not apply; host loss rules run unmodified.
    NotRetained,
    /// A snapshot is pending for respawn.
    Captured {
        /// Slot-accurate capture rather than the flat fallback.
        structural: bool,
        /// Occupied slots captured.
        items: usize,
    },
    /// Retention applied but there was nothing to keep.
    NothingToCapture,
    /// Capture failed; host loss rules run unmodified.
    CaptureFailed,
}

/// What the respawn hook did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RespawnOutcome {
    /// No snapshot was pending.
    NoSnapshot,
    /// Snapshot written back.
    Restored(RestoreReport),
    /// Restore stopped part way; the snapshot is gone.
    RestoreFailed,
}

macro_rules! trace_step {
    ($debug_mode:expr, $($arg:tt)+) => {
        if $debug_mode {
            info!($($arg)+);
        } else {
            debug!($($arg)+);
        }
    };
}

impl KeepInventory {
    /// Death hook.
    pub fn on_death(&self, event: DeathEvent<'_>) -> DeathOutcome {
        let DeathEvent {
            player,
            inventory,
            loss,
        } = event;
        let debug_mode = self.config().debug_mode;

        if !self.is_effective(&player) {
            trace_step!(debug_mode, player = %player, "keep inventory not effective, host loss applies");
            return DeathOutcome::NotRetained;
        }

        let snapshot = if !inventory.is_empty() {
            match self.engine.capture(&*inventory) {
                Ok(snapshot) => {
                    inventory.clear_all();
                    trace_step!(debug_mode, player = %player, items = snapshot.total_items(), "captured inventory and cleared live containers");
                    Some(snapshot)
                }
                Err(err) => {
                    error!(player = %player, operation = "capture", error = %err, "inventory capture failed");
                    return DeathOutcome::CaptureFailed;
                }
            }
        } else if loss.items_lost.iter().any(|stack| !stack.is_empty()) {
            let snapshot = self.engine.capture_from_flat_list(&loss.items_lost);
            trace_step!(debug_mode, player = %player, items = snapshot.total_items(), "live inventory already empty, captured from loss list");
            Some(snapshot)
        } else {
            trace_step!(debug_mode, player = %player, "nothing to capture");
            None
        };

        let outcome = match snapshot {
            Some(snapshot) => self.store_snapshot(player, snapshot, debug_mode),
            None => DeathOutcome::NothingToCapture,
        };

        loss.neutralize();
        trace_step!(debug_mode, player = %player, "host loss neutralized");
        outcome
    }

    fn store_snapshot(
        &self,
        player: PlayerId,
        snapshot: InventorySnapshot,
        debug_mode: bool,
    ) -> DeathOutcome {
        let outcome = DeathOutcome::Captured {
            structural: snapshot.is_structural(),
            items: snapshot.total_items(),
        };
        if let Some(stale) = self.snapshots.put(player, snapshot) {
            warn!(player = %player, items = stale.total_items(), "replaced stale snapshot that was never restored");
        }
        trace_step!(debug_mode, player = %player, "snapshot stored");
        outcome
    }

    /// Respawn hook.
    pub fn on_respawn(&self, event: RespawnEvent<'_>) -> RespawnOutcome {
        let RespawnEvent { player, inventory } = event;
        let debug_mode = self.config().debug_mode;

        let Some(snapshot) = self.snapshots.take(&player) else {
            trace_step!(debug_mode, player = %player, "no snapshot pending");
            return RespawnOutcome::NoSnapshot;
        };

        let outcome = match self.engine.restore(&mut *inventory, &snapshot) {
            Ok(report) => {
                if !report.overflow.is_empty() {
                    warn!(
                        player = %player,
                        overflow = report.overflow_quantity(),
                        stacks = report.overflow.len(),
                        "restore overflow, items did not fit and were dropped"
                    );
                }
                trace_step!(debug_mode, player = %player, placed = report.placed, "snapshot restored");
                RespawnOutcome::Restored(report)
            }
            Err(err) => {
                error!(player = %player, operation = "restore", error = %err, "inventory restore failed");
                RespawnOutcome::RestoreFailed
            }
        };

        inventory.mark_changed();
        inventory.send_to_client();
        outcome
    }
}
