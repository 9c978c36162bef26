//! The keep-inventory service: configuration, preferences and pending
//! snapshots under one owner, plus the command-facing API.

use crate::config::{ConfigCell, RetentionConfig};
use crate::engine::SnapshotEngine;
use crate::policy::{self, Preference, ToggleDirection, ToggleRefusal};
use crate::preferences::PreferenceStore;
use crate::store::SnapshotStore;
use keepinv_core::PlayerId;
use std::sync::Arc;
use tracing::{info, warn};

/// Result of a toggle request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    /// State changed (or already matched).
    Applied,
    /// State left untouched.
    Refused(ToggleRefusal),
}

impl ToggleOutcome {
    /// Whether the toggle took effect.
    pub fn is_applied(self) -> bool {
        matches!(self, ToggleOutcome::Applied)
    }
}

/// Snapshot of one player's retention state for status displays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetentionStatus {
    /// The player's recorded choice.
    pub personal: Preference,
    /// Administrator global override (true while force-enabled).
    pub global_override: bool,
    /// Whether a death right now would keep the inventory.
    pub effective: bool,
    /// Players who explicitly opted in.
    pub opted_in_players: usize,
    /// Force-enabled by configuration.
    pub force_enabled: bool,
}

/// Owns everything the death and respawn hooks need.
///
/// Shared across worker threads behind an `Arc`; every method takes `&self`.
#[derive(Debug, Default)]
pub struct KeepInventory {
    config: ConfigCell,
    pub(crate) preferences: PreferenceStore,
    pub(crate) snapshots: SnapshotStore,
    pub(crate) engine: SnapshotEngine,
}

impl KeepInventory {
    /// Service with no configuration loaded yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Service with `config` installed.
    pub fn with_config(config: RetentionConfig) -> Self {
        let service = Self::new();
        service.install_config(config);
        service
    }

    /// Service adopting previously persisted preferences.
    pub fn with_preferences(preferences: PreferenceStore) -> Self {
        Self {
            preferences,
            ..Self::default()
        }
    }

    /// Replace the configuration. Force-enabled pins [`Self::global_override`]
    /// on for as long as it stays installed; the stored switch is untouched.
    pub fn install_config(&self, config: RetentionConfig) -> Arc<RetentionConfig> {
        let installed = self.config.install(config);
        if installed.force_enabled {
            info!("Force enabled mode activated - all players will keep inventory");
        }
        installed
    }

    /// Currently effective configuration.
    pub fn config(&self) -> Arc<RetentionConfig> {
        self.config.current()
    }

    /// Whether a configuration has been installed.
    pub fn is_config_loaded(&self) -> bool {
        self.config.is_loaded()
    }

    /// Player preferences.
    pub fn preferences(&self) -> &PreferenceStore {
        &self.preferences
    }

    /// Pending snapshots.
    pub fn snapshots(&self) -> &SnapshotStore {
        &self.snapshots
    }

    /// Whether `player` would keep their inventory on death right now.
    pub fn is_effective(&self, player: &PlayerId) -> bool {
        policy::is_retention_effective(
            &self.config(),
            self.global_override(),
            self.preferences.preference(player),
        )
    }

    /// Global override as seen by players; always on while force-enabled.
    pub fn global_override(&self) -> bool {
        self.config().force_enabled || self.preferences.global_override()
    }

    /// Opt a player in, subject to the toggle policy.
    pub fn enable_for_player(&self, player: PlayerId) -> ToggleOutcome {
        self.toggle(player, ToggleDirection::OptIn)
    }

    /// Opt a player out, subject to the toggle policy.
    pub fn disable_for_player(&self, player: PlayerId) -> ToggleOutcome {
        self.toggle(player, ToggleDirection::OptOut)
    }

    fn toggle(&self, player: PlayerId, direction: ToggleDirection) -> ToggleOutcome {
        if let Err(refusal) = policy::check_toggle(&self.config(), direction) {
            warn!(player = %player, ?direction, %refusal, "keep-inventory toggle refused");
            return ToggleOutcome::Refused(refusal);
        }
        match direction {
            ToggleDirection::OptIn => self.preferences.opt_in(player),
            ToggleDirection::OptOut => self.preferences.opt_out(player),
        }
        ToggleOutcome::Applied
    }

    /// Set the global override. Turning it off is refused while force-enabled.
    pub fn set_global(&self, enabled: bool) -> ToggleOutcome {
        if !enabled && self.config().force_enabled {
            warn!("Cannot disable global keep inventory while force enabled");
            return ToggleOutcome::Refused(ToggleRefusal::ForceEnabled);
        }
        self.preferences.set_global_override(enabled);
        ToggleOutcome::Applied
    }

    /// Status of one player.
    pub fn status(&self, player: &PlayerId) -> RetentionStatus {
        let config = self.config();
        RetentionStatus {
            personal: self.preferences.preference(player),
            global_override: self.global_override(),
            effective: self.is_effective(player),
            opted_in_players: self.preferences.count(),
            force_enabled: config.force_enabled,
        }
    }

    /// Erase all preferences and the administrator's global override.
    pub fn reset_preferences(&self) {
        self.preferences.clear();
    }

    /// Drop a player's pending snapshot without restoring it.
    pub fn clear_snapshot(&self, player: &PlayerId) -> bool {
        self.snapshots.clear(player)
    }

    /// Drop every pending snapshot.
    pub fn clear_all_snapshots(&self) {
        self.snapshots.clear_all();
    }
}
