#![warn(missing_docs)]
//! Core primitives shared across the workspace: player identity, item stacks
//! and the multi-container inventory model.

pub mod inventory;
pub mod item;

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

// Re-export commonly used types
pub use inventory::{
    Container, ContainerKind, InventoryError, InventoryHandle, PlayerInventory,
    DEFAULT_ARMOR_SLOTS, DEFAULT_HOTBAR_SLOTS, DEFAULT_STORAGE_SLOTS, DEFAULT_UTILITY_SLOTS,
};
pub use item::{Durability, ItemStack, DEFAULT_STACK_SIZE};

/// Stable player identifier, valid across death and respawn within a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub Uuid);

impl PlayerId {
    /// Allocate a fresh random identifier.
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Derive a deterministic identifier from a player name.
    ///
    /// Used by headless tooling where players are referred to by name.
    pub fn from_name(name: &str) -> Self {
        Self(Uuid::new_v5(&Uuid::NAMESPACE_OID, name.as_bytes()))
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<Uuid> for PlayerId {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}
