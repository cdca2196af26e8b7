use std::collections::BTreeMap;
use std::path::Path;

use catsync_gate::GateConfig;
use catsync_types::OwnerId;
use serde::{Deserialize, Serialize};

use crate::error::{SyncError, SyncResult};

/// Per-owner synchronization preferences.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OwnerPreferences {
    /// Propagate a catalog entry to sibling partitions whenever it is saved.
    pub propagate_on_save: bool,
}

impl Default for OwnerPreferences {
    fn default() -> Self {
        Self {
            propagate_on_save: true,
        }
    }
}

/// Top-level configuration, usually loaded from `catsync.toml`.
///
/// ```toml
/// default_propagate_on_save = false
///
/// [gate]
/// timeout_secs = 120
///
/// [owners.acme]
/// propagate_on_save = true
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    pub gate: GateConfig,
    /// Used for owners without an explicit entry in `owners`.
    pub default_propagate_on_save: bool,
    pub owners: BTreeMap<OwnerId, OwnerPreferences>,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            gate: GateConfig::default(),
            default_propagate_on_save: true,
            owners: BTreeMap::new(),
        }
    }
}

impl SyncConfig {
    pub fn from_toml_str(s: &str) -> SyncResult<Self> {
        let config: Self = toml::from_str(s).map_err(|e| SyncError::Config(e.to_string()))?;
        config.gate.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> SyncResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| SyncError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&raw)
    }

    /// Preferences for `owner`, falling back to the configured default.
    pub fn preferences(&self, owner: &OwnerId) -> OwnerPreferences {
        self.owners.get(owner).cloned().unwrap_or(OwnerPreferences {
            propagate_on_save: self.default_propagate_on_save,
        })
    }
}
