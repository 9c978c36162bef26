//! Per-player retention preferences plus the global override.
//!
//! Entries are sharded per player, so concurrent toggles by different players
//! never contend on one lock and updates to the same player are serialized.

use crate::error::RetentionResult;
use crate::policy::Preference;
use dashmap::DashMap;
use keepinv_core::PlayerId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, info};

/// Default location of the persisted preferences.
pub const DEFAULT_PREFERENCES_PATH: &str = "config/keepinventory_players.json";

/// On-disk form of a [`PreferenceStore`].
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct PreferenceFile {
    global_override: bool,
    /// `true` = opted in, `false` = opted out.
    players: BTreeMap<PlayerId, bool>,
}

/// Concurrent store of explicit player choices.
#[derive(Debug, Default)]
pub struct PreferenceStore {
    players: DashMap<PlayerId, Preference>,
    global_override: AtomicBool,
}

impl PreferenceStore {
    /// Create an empty store with the global override off.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an explicit opt-in.
    pub fn opt_in(&self, player: PlayerId) {
        self.players.insert(player, Preference::OptedIn);
        info!(player = %player, "Enabled keep inventory for player");
    }

    /// Record an explicit opt-out.
    pub fn opt_out(&self, player: PlayerId) {
        self.players.insert(player, Preference::OptedOut);
        info!(player = %player, "Disabled keep inventory for player");
    }

    /// Recorded preference, [`Preference::Unset`] if none.
    pub fn preference(&self, player: &PlayerId) -> Preference {
        self.players
            .get(player)
            .map(|entry| *entry.value())
            .unwrap_or_default()
    }

    /// True only if the player explicitly opted in.
    pub fn has_opted_in(&self, player: &PlayerId) -> bool {
        self.preference(player).is_opted_in()
    }

    /// Drop one player's recorded preference.
    pub fn forget(&self, player: &PlayerId) -> bool {
        self.players.remove(player).is_some()
    }

    /// Set the administrator's global override.
    pub fn set_global_override(&self, enabled: bool) {
        self.global_override.store(enabled, Ordering::Release);
        info!(
            "Global keep inventory {}",
            if enabled { "enabled" } else { "disabled" }
        );
    }

    /// Current global override.
    pub fn global_override(&self) -> bool {
        self.global_override.load(Ordering::Acquire)
    }

    /// Number of players who explicitly opted in.
    pub fn count(&self) -> usize {
        self.players
            .iter()
            .filter(|entry| entry.value().is_opted_in())
            .count()
    }

    /// Erase every preference and turn the global override off.
    pub fn clear(&self) {
        self.players.clear();
        self.global_override.store(false, Ordering::Release);
        info!("Keep inventory settings cleared");
    }

    /// Write preferences as JSON.
    pub fn save_to_path(&self, path: &Path) -> RetentionResult<()> {
        let file = PreferenceFile {
            global_override: self.global_override(),
            players: self
                .players
                .iter()
                .filter_map(|entry| match entry.value() {
                    Preference::OptedIn => Some((*entry.key(), true)),
                    Preference::OptedOut => Some((*entry.key(), false)),
                    Preference::Unset => None,
                })
                .collect(),
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(&file)?)?;
        debug!(path = %path.display(), players = file.players.len(), "saved keep-inventory preferences");
        Ok(())
    }

    /// Read preferences written by [`PreferenceStore::save_to_path`].
    ///
    /// A missing file yields an empty store.
    pub fn load_from_path(path: &Path) -> RetentionResult<Self> {
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Self::new()),
            Err(err) => return Err(err.into()),
        };
        let file: PreferenceFile = serde_json::from_str(&contents)?;
        let store = Self::new();
        for (player, opted_in) in file.players {
            let preference = if opted_in {
                Preference::OptedIn
            } else {
                Preference::OptedOut
            };
            store.players.insert(player, preference);
        }
        store
            .global_override
            .store(file.global_override, Ordering::Release);
        debug!(path = %path.display(), players = store.players.len(), "loaded keep-inventory preferences");
        Ok(store)
    }
}
