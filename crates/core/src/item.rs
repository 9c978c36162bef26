//! Item stacks as seen by the retention engine.
//!
//! Stacks are plain values: the engine copies them out of a live inventory
//! and writes copies back, it never holds references into host state.

use serde::{Deserialize, Serialize};

/// Maximum stack size for most items.
pub const DEFAULT_STACK_SIZE: u32 = 64;

fn default_max_stack() -> u32 {
    DEFAULT_STACK_SIZE
}

/// Current and maximum durability of a damageable item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Durability {
    /// Remaining durability.
    pub current: u32,
    /// Durability of a fresh item.
    pub max: u32,
}

/// An item stack in an inventory slot.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ItemStack {
    /// Item type identifier, e.g. `"Weapon_Sword_Iron"`.
    pub item_id: String,
    /// Number of items in this stack. Zero means "no item".
    pub quantity: u32,
    /// Durability for damageable items.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub durability: Option<Durability>,
    /// Opaque host metadata (enchantments, custom names, ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Vec<u8>>,
    /// Type-specific maximum quantity per slot.
    #[serde(default = "default_max_stack")]
    pub max_stack: u32,
}

impl ItemStack {
    /// Create a new item stack with the default stack limit.
    pub fn new(item_id: impl Into<String>, quantity: u32) -> Self {
        Self {
            item_id: item_id.into(),
            quantity,
            durability: None,
            metadata: None,
            max_stack: DEFAULT_STACK_SIZE,
        }
    }

    /// Attach durability. Damageable items don't stack.
    pub fn with_durability(mut self, current: u32, max: u32) -> Self {
        self.durability = Some(Durability { current, max });
        self.max_stack = 1;
        self
    }

    /// Attach opaque metadata.
    pub fn with_metadata(mut self, metadata: Vec<u8>) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// Override the stack limit for this item type.
    pub fn with_max_stack(mut self, max_stack: u32) -> Self {
        self.max_stack = max_stack.max(1);
        self
    }

    /// Same item with a different quantity.
    pub fn with_quantity(&self, quantity: u32) -> Self {
        Self {
            quantity,
            ..self.clone()
        }
    }

    /// A zero-quantity stack represents an empty slot.
    pub fn is_empty(&self) -> bool {
        self.quantity == 0
    }

    /// Two stacks may share a slot iff type, durability state and metadata match.
    pub fn can_stack_with(&self, other: &ItemStack) -> bool {
        self.item_id == other.item_id
            && self.durability == other.durability
            && self.metadata == other.metadata
    }

    /// Check if this stack is at max capacity.
    pub fn is_full(&self) -> bool {
        self.quantity >= self.max_stack
    }

    /// Get remaining space in this stack.
    pub fn remaining_space(&self) -> u32 {
        self.max_stack.saturating_sub(self.quantity)
    }

    /// Try to add items to this stack, returning the amount that didn't fit.
    pub fn add(&mut self, amount: u32) -> u32 {
        let added = amount.min(self.remaining_space());
        self.quantity += added;
        amount - added
    }
}
