//! # Sync Configuration
//!
//! Configuration management for the sync engine.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     STOCKPILE_DEBOUNCE_MS=2000                                         │
//! │     STOCKPILE_MERGE_POLICY=union                                       │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/stockpile/sync.toml (Linux)                              │
//! │     ~/Library/Application Support/org.stockpile.stockpile/sync.toml    │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     2 s debounce, 500 rows per batch, 15 s remote timeout              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # sync.toml
//! [sync]
//! debounce_ms = 2000
//! batch_size = 500
//! remote_timeout_secs = 15
//! merge_policy = "replace"   # replace | union
//!
//! [storage]
//! snapshot_key = "stockpile.snapshot"
//! metadata_key = "stockpile.sync_meta"
//! local_db = "/var/lib/stockpile/local.db"
//! remote_db = "/var/lib/stockpile/remote.db"
//!
//! [profile_defaults]
//! climate = "temperate"
//! people = 4
//! prop_address = ""
//! active_property_id = "home"
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info, warn};

use stockpile_core::ProfileDefaults;

use crate::error::{SyncError, SyncResult};

/// Default local storage key for the snapshot blob.
pub const DEFAULT_SNAPSHOT_KEY: &str = "stockpile.snapshot";

/// Default local storage key for the sync metadata blob.
pub const DEFAULT_METADATA_KEY: &str = "stockpile.sync_meta";

// =============================================================================
// Merge Policy
// =============================================================================

/// How pulled remote collections combine with local ones.
///
/// ```text
/// local [A, B*]   remote [B, C]        (* = never pushed, _version 0)
///
/// REPLACE  → [B, C]
/// UNION    → [B, C, B*?]  B* kept only if its id is absent remotely
/// ```
///
/// Under both policies an empty remote collection leaves the local one
/// untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergePolicy {
    /// A non-empty remote collection replaces the local one wholesale.
    #[default]
    Replace,

    /// Remote wins per id; never-pushed local records are kept.
    Union,
}

impl std::fmt::Display for MergePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MergePolicy::Replace => write!(f, "replace"),
            MergePolicy::Union => write!(f, "union"),
        }
    }
}

impl std::str::FromStr for MergePolicy {
    type Err = SyncError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "replace" => Ok(MergePolicy::Replace),
            "union" => Ok(MergePolicy::Union),
            other => Err(SyncError::InvalidConfig(format!(
                "Unknown merge policy: '{}'. Valid options: replace, union",
                other
            ))),
        }
    }
}

// =============================================================================
// Sync Settings
// =============================================================================

/// Sync behavior settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncSettings {
    /// Quiet period after the last local change before a push (ms).
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// Item rows per upsert call.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Upper bound on any single remote call (seconds).
    #[serde(default = "default_remote_timeout")]
    pub remote_timeout_secs: u64,

    #[serde(default)]
    pub merge_policy: MergePolicy,
}

fn default_debounce_ms() -> u64 {
    2000
}
fn default_batch_size() -> usize {
    500
}
fn default_remote_timeout() -> u64 {
    15
}

impl Default for SyncSettings {
    fn default() -> Self {
        SyncSettings {
            debounce_ms: default_debounce_ms(),
            batch_size: default_batch_size(),
            remote_timeout_secs: default_remote_timeout(),
            merge_policy: MergePolicy::default(),
        }
    }
}

// =============================================================================
// Storage Settings
// =============================================================================

/// Where the engine keeps its blobs, and where the CLI finds its databases.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageSettings {
    #[serde(default = "default_snapshot_key")]
    pub snapshot_key: String,

    #[serde(default = "default_metadata_key")]
    pub metadata_key: String,

    /// SQLite file backing the local store.
    #[serde(default)]
    pub local_db: Option<PathBuf>,

    /// SQLite file backing the remote tables on a self-hosted node.
    #[serde(default)]
    pub remote_db: Option<PathBuf>,
}

fn default_snapshot_key() -> String {
    DEFAULT_SNAPSHOT_KEY.to_string()
}

fn default_metadata_key() -> String {
    DEFAULT_METADATA_KEY.to_string()
}

impl Default for StorageSettings {
    fn default() -> Self {
        StorageSettings {
            snapshot_key: default_snapshot_key(),
            metadata_key: default_metadata_key(),
            local_db: None,
            remote_db: None,
        }
    }
}

// =============================================================================
// Main Sync Configuration
// =============================================================================

/// Complete sync configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SyncConfig {
    #[serde(default)]
    pub sync: SyncSettings,

    #[serde(default)]
    pub storage: StorageSettings,

    #[serde(default)]
    pub profile_defaults: ProfileDefaults,
}

impl SyncConfig {
    /// Creates a new config with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (sync.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> SyncResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading sync config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = Self::from_toml(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns default if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load sync config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Parses a TOML document. Missing sections take their defaults.
    pub fn from_toml(contents: &str) -> SyncResult<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Saves configuration to file.
    pub fn save(&self, config_path: Option<PathBuf>) -> SyncResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| SyncError::ConfigSaveFailed("No config path available".into()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents)?;

        info!(?path, "Sync config saved");
        Ok(())
    }

    /// Validates the configuration.
    pub fn validate(&self) -> SyncResult<()> {
        if self.sync.batch_size == 0 {
            return Err(SyncError::InvalidConfig(
                "batch_size must be greater than 0".into(),
            ));
        }

        if self.sync.remote_timeout_secs == 0 {
            return Err(SyncError::InvalidConfig(
                "remote_timeout_secs must be greater than 0".into(),
            ));
        }

        if self.storage.snapshot_key.is_empty() || self.storage.metadata_key.is_empty() {
            return Err(SyncError::InvalidConfig("storage keys must not be empty".into()));
        }

        if self.storage.snapshot_key == self.storage.metadata_key {
            return Err(SyncError::InvalidConfig(
                "snapshot_key and metadata_key must differ".into(),
            ));
        }

        if self.profile_defaults.people == 0 {
            return Err(SyncError::InvalidConfig(
                "profile_defaults.people must be at least 1".into(),
            ));
        }

        Ok(())
    }

    /// Applies `STOCKPILE_*` overrides read through `lookup`.
    ///
    /// Unparseable values are logged and ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("STOCKPILE_DEBOUNCE_MS") {
            match v.parse::<u64>() {
                Ok(ms) => {
                    debug!(debounce_ms = ms, "Overriding debounce from environment");
                    self.sync.debounce_ms = ms;
                }
                Err(_) => warn!(value = %v, "Ignoring invalid STOCKPILE_DEBOUNCE_MS"),
            }
        }

        if let Some(v) = lookup("STOCKPILE_BATCH_SIZE") {
            match v.parse::<usize>() {
                Ok(n) => self.sync.batch_size = n,
                Err(_) => warn!(value = %v, "Ignoring invalid STOCKPILE_BATCH_SIZE"),
            }
        }

        if let Some(v) = lookup("STOCKPILE_REMOTE_TIMEOUT_SECS") {
            match v.parse::<u64>() {
                Ok(secs) => self.sync.remote_timeout_secs = secs,
                Err(_) => warn!(value = %v, "Ignoring invalid STOCKPILE_REMOTE_TIMEOUT_SECS"),
            }
        }

        if let Some(v) = lookup("STOCKPILE_MERGE_POLICY") {
            match v.parse() {
                Ok(policy) => {
                    debug!(policy = %v, "Overriding merge policy from environment");
                    self.sync.merge_policy = policy;
                }
                Err(e) => warn!(error = %e, "Ignoring STOCKPILE_MERGE_POLICY"),
            }
        }

        if let Some(v) = lookup("STOCKPILE_LOCAL_DB") {
            self.storage.local_db = Some(PathBuf::from(v));
        }

        if let Some(v) = lookup("STOCKPILE_REMOTE_DB") {
            self.storage.remote_db = Some(PathBuf::from(v));
        }
    }

    /// Returns the default config file path.
    pub fn default_config_path() -> Option<PathBuf> {
        Self::project_dirs().map(|dirs| dirs.config_dir().join("sync.toml"))
    }

    /// Returns the default directory for the CLI's SQLite files.
    pub fn default_data_dir() -> Option<PathBuf> {
        Self::project_dirs().map(|dirs| dirs.data_dir().to_path_buf())
    }

    fn project_dirs() -> Option<directories::ProjectDirs> {
        directories::ProjectDirs::from("org", "stockpile", "stockpile")
    }

    // =========================================================================
    // Convenience Methods
    // =========================================================================

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.sync.debounce_ms)
    }

    pub fn remote_timeout(&self) -> Duration {
        Duration::from_secs(self.sync.remote_timeout_secs)
    }

    pub fn batch_size(&self) -> usize {
        self.sync.batch_size
    }

    pub fn merge_policy(&self) -> MergePolicy {
        self.sync.merge_policy
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_merge_policy_parsing() {
        assert_eq!("replace".parse::<MergePolicy>().unwrap(), MergePolicy::Replace);
        assert_eq!("UNION".parse::<MergePolicy>().unwrap(), MergePolicy::Union);
        assert!("lww".parse::<MergePolicy>().is_err());
        assert!("remote".parse::<MergePolicy>().is_err());
        assert!("keep_local".parse::<MergePolicy>().is_err());
    }

    #[test]
    fn test_default_config() {
        let config = SyncConfig::default();
        assert_eq!(config.debounce(), Duration::from_secs(2));
        assert_eq!(config.batch_size(), 500);
        assert_eq!(config.remote_timeout(), Duration::from_secs(15));
        assert_eq!(config.merge_policy(), MergePolicy::Replace);
        assert_eq!(config.profile_defaults.climate, "temperate");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = SyncConfig::from_toml(
            r#"
            [sync]
            batch_size = 250
            merge_policy = "union"

            [profile_defaults]
            people = 2
            "#,
        )
        .unwrap();

        assert_eq!(config.sync.batch_size, 250);
        assert_eq!(config.sync.debounce_ms, 2000);
        assert_eq!(config.merge_policy(), MergePolicy::Union);
        assert_eq!(config.profile_defaults.people, 2);
        assert_eq!(config.profile_defaults.active_property_id, "home");
        assert_eq!(config.storage.snapshot_key, DEFAULT_SNAPSHOT_KEY);
    }

    #[test]
    fn test_config_validation() {
        let mut config = SyncConfig::default();

        config.sync.batch_size = 0;
        assert!(config.validate().unwrap_err().is_config_error());

        config.sync.batch_size = 500;
        config.storage.metadata_key = config.storage.snapshot_key.clone();
        assert!(config.validate().is_err());

        config.storage.metadata_key = "meta".into();
        config.sync.remote_timeout_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("STOCKPILE_DEBOUNCE_MS", "500"),
            ("STOCKPILE_BATCH_SIZE", "not-a-number"),
            ("STOCKPILE_MERGE_POLICY", "union"),
            ("STOCKPILE_REMOTE_DB", "/tmp/remote.db"),
        ]
        .into_iter()
        .collect();

        let mut config = SyncConfig::default();
        config.apply_overrides(|k| env.get(k).map(|v| v.to_string()));

        assert_eq!(config.sync.debounce_ms, 500);
        assert_eq!(config.sync.batch_size, 500);
        assert_eq!(config.merge_policy(), MergePolicy::Union);
        assert_eq!(config.storage.remote_db, Some(PathBuf::from("/tmp/remote.db")));
        assert_eq!(config.storage.local_db, None);
    }

    #[test]
    fn test_toml_serialization() {
        let config = SyncConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("[sync]"));
        assert!(toml_str.contains("[profile_defaults]"));

        let back = SyncConfig::from_toml(&toml_str).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn test_save_and_load() {
        let dir = std::env::temp_dir().join(format!("stockpile-cfg-{}", uuid::Uuid::new_v4()));
        let path = dir.join("sync.toml");

        let mut config = SyncConfig::default();
        config.sync.debounce_ms = 750;
        config.save(Some(path.clone())).unwrap();

        let loaded = SyncConfig::from_toml(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(loaded.sync.debounce_ms, 750);

        std::fs::remove_dir_all(dir).unwrap();
    }
}
