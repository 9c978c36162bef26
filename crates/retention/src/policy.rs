//! Retention policy: who keeps their inventory, and who may change that.
//!
//! Pure functions over the configuration, the global override and a single
//! player's recorded preference.

use crate::config::RetentionConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A player's recorded choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Preference {
    /// The player never toggled retention.
    #[default]
    Unset,
    /// Explicitly turned retention on.
    OptedIn,
    /// Explicitly turned retention off.
    OptedOut,
}

impl Preference {
    /// True only for an explicit opt-in.
    pub fn is_opted_in(self) -> bool {
        matches!(self, Preference::OptedIn)
    }
}

/// Resolve whether a death should keep the player's inventory.
///
/// First match wins: force-enabled, then the global override, then the
/// server default for players without a recorded preference, then the
/// player's own opt-in.
pub fn is_retention_effective(
    config: &RetentionConfig,
    global_override: bool,
    preference: Preference,
) -> bool {
    if config.force_enabled {
        return true;
    }
    if global_override {
        return true;
    }
    if config.enabled_by_default && preference == Preference::Unset {
        return true;
    }
    preference.is_opted_in()
}

/// Which way a player wants to toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToggleDirection {
    /// Turn retention on.
    OptIn,
    /// Turn retention off.
    OptOut,
}

/// Why a toggle was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum ToggleRefusal {
    /// The administrator disabled player toggles.
    #[error("player toggling is disabled on this server")]
    Locked,
    /// Retention is force-enabled; it cannot be turned off.
    #[error("keep-inventory is force-enabled on this server")]
    ForceEnabled,
}

/// Decide whether a toggle may change state under `config`.
pub fn check_toggle(
    config: &RetentionConfig,
    direction: ToggleDirection,
) -> Result<(), ToggleRefusal> {
    if config.force_enabled {
        return match direction {
            ToggleDirection::OptIn => Ok(()),
            ToggleDirection::OptOut => Err(ToggleRefusal::ForceEnabled),
        };
    }
    if !config.allow_player_toggle {
        return Err(ToggleRefusal::Locked);
    }
    Ok(())
}
