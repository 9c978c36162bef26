//! Retention configuration and its loader.
//!
//! A configuration value is immutable once built. Reloading installs a new
//! value into a [`ConfigCell`]; readers keep whatever `Arc` they already hold.

use crate::error::{RetentionError, RetentionResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::sync::{Arc, RwLock};
use tracing::{info, warn};

/// Default location of the retention config file.
pub const DEFAULT_CONFIG_PATH: &str = "config/keepinventory.toml";

/// Administrator configuration for death-inventory retention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RetentionConfig {
    /// Retain for players who never set a preference.
    pub enabled_by_default: bool,
    /// Players may opt in or out themselves.
    pub allow_player_toggle: bool,
    /// Save player preferences across restarts.
    pub persist_player_settings: bool,
    /// Retain for everyone; opt-outs are refused.
    pub force_enabled: bool,
    /// Log every hook step at info level.
    pub debug_mode: bool,
}

impl Default for RetentionConfig {
    fn default() -> Self {
        Self {
            enabled_by_default: false,
            allow_player_toggle: true,
            persist_player_settings: true,
            force_enabled: false,
            debug_mode: false,
        }
    }
}

impl RetentionConfig {
    /// Effective configuration before any file has been loaded.
    pub const UNLOADED: RetentionConfig = RetentionConfig {
        enabled_by_default: false,
        allow_player_toggle: true,
        persist_player_settings: false,
        force_enabled: false,
        debug_mode: false,
    };

    /// Parse a TOML document.
    pub fn from_toml_str(contents: &str) -> RetentionResult<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Load configuration from the default path.
    pub fn load() -> Self {
        Self::load_from_path(Path::new(DEFAULT_CONFIG_PATH))
    }

    /// Load configuration from an explicit path, falling back to defaults on errors.
    pub fn load_from_path(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(contents) => Self::from_contents_lenient(path, &contents),
            Err(err) => Self::fallback_after_read_error(path, err),
        }
    }

    /// Asynchronous variant of [`RetentionConfig::load_from_path`].
    pub async fn load_async(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match tokio::fs::read_to_string(path).await {
            Ok(contents) => Self::from_contents_lenient(path, &contents),
            Err(err) => Self::fallback_after_read_error(path, err),
        }
    }

    fn from_contents_lenient(path: &Path, contents: &str) -> Self {
        match Self::from_toml_str(contents) {
            Ok(cfg) => cfg,
            Err(err) => {
                warn!("Failed to parse {}: {err}. Using defaults", path.display());
                RetentionConfig::default()
            }
        }
    }

    fn fallback_after_read_error(path: &Path, err: std::io::Error) -> Self {
        if err.kind() == std::io::ErrorKind::NotFound {
            warn!(
                "Keep-inventory config not found at {}. Using defaults",
                path.display()
            );
        } else {
            warn!("Failed to read {}: {err}. Using defaults", path.display());
        }
        RetentionConfig::default()
    }

    /// Save configuration to an explicit path.
    pub fn save_to_path(&self, path: &Path) -> RetentionResult<()> {
        let toml = toml::to_string_pretty(self).map_err(RetentionError::ConfigEncode)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, toml)?;
        Ok(())
    }
}

/// Shared slot holding the currently installed configuration.
#[derive(Debug, Default)]
pub struct ConfigCell {
    current: RwLock<Option<Arc<RetentionConfig>>>,
}

impl ConfigCell {
    /// Empty cell; reads yield [`RetentionConfig::UNLOADED`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the installed configuration wholesale.
    pub fn install(&self, config: RetentionConfig) -> Arc<RetentionConfig> {
        let config = Arc::new(config);
        // A poisoned lock still holds a complete value; replace it.
        let mut guard = self.current.write().unwrap_or_else(|e| e.into_inner());
        *guard = Some(Arc::clone(&config));
        info!(?config, "keep-inventory config applied");
        config
    }

    /// Currently installed configuration, or the unloaded defaults.
    pub fn current(&self) -> Arc<RetentionConfig> {
        let guard = self.current.read().unwrap_or_else(|e| e.into_inner());
        guard
            .clone()
            .unwrap_or_else(|| Arc::new(RetentionConfig::UNLOADED))
    }

    /// Whether a configuration has been installed.
    pub fn is_loaded(&self) -> bool {
        self.current
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .is_some()
    }
}
