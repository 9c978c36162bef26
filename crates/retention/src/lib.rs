//! Death-inventory retention: decides whether a player keeps their items,
//! snapshots the inventory at death and writes it back at respawn.

#![warn(missing_docs)]

pub mod config;
pub mod engine;
pub mod error;
pub mod hooks;
pub mod merge;
pub mod policy;
pub mod preferences;
pub mod service;
pub mod snapshot;
pub mod store;

pub use config::{ConfigCell, RetentionConfig, DEFAULT_CONFIG_PATH};
pub use engine::{RestoreReport, SnapshotEngine};
pub use error::{RetentionError, RetentionResult};
pub use hooks::{DeathEvent, DeathOutcome, LossDescriptor, LossMode, RespawnEvent, RespawnOutcome};
pub use merge::{insert_stack, CombinedSlots, SlotContainer};
pub use policy::{check_toggle, is_retention_effective, Preference, ToggleDirection, ToggleRefusal};
pub use preferences::{PreferenceStore, DEFAULT_PREFERENCES_PATH};
pub use service::{KeepInventory, RetentionStatus, ToggleOutcome};
pub use snapshot::InventorySnapshot;
pub use store::SnapshotStore;
