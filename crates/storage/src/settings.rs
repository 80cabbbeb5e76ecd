//! Safety settings store
//!
//! Persists the real [`SafetyState`] and [`FeatureLockSet`] per account, and
//! the [`DevOverrideSet`] per device. Overrides live under their own key and
//! are never folded into the safety record.
//!
//! Release builds ignore stored overrides entirely: [`SettingsStore::load_dev_overrides`]
//! always returns the all-defaults set and saving overrides is rejected.
//!
//! Corrupt records fail closed: an unreadable safety record loads as the most
//! restrictive [`SafetyState::default`], unreadable feature locks load as
//! everything locked, and unreadable overrides load as no overrides.

use crate::kv::{AccountStore, DeviceStore, KvError, KvStore};
use safety::{
    Audience, DevOverrideSet, Feature, FeatureLockSet, FilterLevel, SafetySnapshot, SafetyState,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

const SAFETY_KEY: &str = "safety";
const FEATURE_LOCKS_KEY: &str = "feature_locks";
const DEV_OVERRIDES_KEY: &str = "dev_overrides";

/// Errors that can occur in the settings store
#[derive(Debug, Error)]
pub enum SettingsError {
    /// Underlying key-value store error
    #[error("Storage error: {0}")]
    Kv(#[from] KvError),

    /// Dev overrides cannot be changed in release builds
    #[error("Dev overrides are disabled in release builds")]
    OverridesDisabled,
}

/// Result type for settings operations
pub type Result<T> = std::result::Result<T, SettingsError>;

/// Build flavor the store runs under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildMode {
    /// Developer and test builds; dev overrides are honored
    Debug,
    /// Production builds; dev overrides are ignored
    Release,
}

impl Default for BuildMode {
    fn default() -> Self {
        if cfg!(debug_assertions) {
            BuildMode::Debug
        } else {
            BuildMode::Release
        }
    }
}

impl BuildMode {
    /// Whether dev overrides are honored
    pub fn allows_dev_overrides(&self) -> bool {
        matches!(self, BuildMode::Debug)
    }
}

/// Settings store configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsConfig {
    /// Build flavor
    #[serde(default)]
    pub build_mode: BuildMode,
}

impl SettingsConfig {
    /// Create a config for a build mode
    pub fn new(build_mode: BuildMode) -> Self {
        Self { build_mode }
    }
}

/// Read side of the settings store
pub trait SettingsSource {
    /// Load the persisted safety state for an account
    fn load_safety_state(&self, account_id: &str) -> Result<SafetyState>;

    /// Load the dev overrides in effect
    fn load_dev_overrides(&self) -> Result<DevOverrideSet>;

    /// Load the parental feature locks for an account
    fn load_feature_locks(&self, account_id: &str) -> Result<FeatureLockSet>;
}

/// Read every source once into a snapshot
pub fn read_snapshot<S>(source: &S, account_id: &str) -> Result<SafetySnapshot>
where
    S: SettingsSource + ?Sized,
{
    Ok(SafetySnapshot::new(
        source.load_safety_state(account_id)?,
        source.load_dev_overrides()?,
        source.load_feature_locks(account_id)?,
    ))
}

/// Settings store backed by the key-value store
pub struct SettingsStore {
    device: DeviceStore,
    accounts: AccountStore,
    config: SettingsConfig,
}

impl SettingsStore {
    /// Create a settings store
    pub fn new(kv: Arc<KvStore>, config: SettingsConfig) -> Self {
        Self {
            device: DeviceStore::new(kv.clone()),
            accounts: AccountStore::new(kv),
            config,
        }
    }

    /// Build mode in effect
    pub fn build_mode(&self) -> BuildMode {
        self.config.build_mode
    }

    /// Read a consistent snapshot for one decision
    pub fn snapshot(&self, account_id: &str) -> Result<SafetySnapshot> {
        read_snapshot(self, account_id)
    }

    /// Change the audience, returning the updated state
    pub fn set_audience(&self, account_id: &str, audience: Audience) -> Result<SafetyState> {
        self.update_safety_state(account_id, |state| state.set_audience(audience))
    }

    /// Change the kids filter level, returning the updated state
    pub fn set_kids_filter_level(
        &self,
        account_id: &str,
        level: FilterLevel,
    ) -> Result<SafetyState> {
        self.update_safety_state(account_id, |state| state.set_kids_filter_level(level))
    }

    /// Record whether a parental PIN is configured, returning the updated state
    pub fn set_parental_pin_set(&self, account_id: &str, is_set: bool) -> Result<SafetyState> {
        self.update_safety_state(account_id, |state| state.set_parental_pin_set(is_set))
    }

    /// Lock or unlock a feature, returning the updated lock set
    pub fn set_feature_lock(
        &self,
        account_id: &str,
        feature: Feature,
        locked: bool,
    ) -> Result<FeatureLockSet> {
        let mut locks = self.load_feature_locks(account_id)?;
        locks.set_locked(feature, locked);
        self.accounts.set(account_id, FEATURE_LOCKS_KEY, &locks)?;
        Ok(locks)
    }

    /// Store dev overrides; fails in release builds
    pub fn save_dev_overrides(&self, overrides: &DevOverrideSet) -> Result<()> {
        if !self.config.build_mode.allows_dev_overrides() {
            tracing::warn!("Refusing to store dev overrides in a release build");
            return Err(SettingsError::OverridesDisabled);
        }
        self.device.set(DEV_OVERRIDES_KEY, overrides)?;
        Ok(())
    }

    /// Remove stored dev overrides, returning whether any existed
    pub fn clear_dev_overrides(&self) -> Result<bool> {
        Ok(self.device.remove(DEV_OVERRIDES_KEY)?)
    }

    /// Remove every setting stored for an account
    pub fn reset_account(&self, account_id: &str) -> Result<usize> {
        Ok(self.accounts.remove_account(account_id)?)
    }

    fn update_safety_state<F>(&self, account_id: &str, update: F) -> Result<SafetyState>
    where
        F: FnOnce(&mut SafetyState),
    {
        let mut state = self.load_safety_state(account_id)?;
        update(&mut state);
        self.accounts.set(account_id, SAFETY_KEY, &state)?;
        Ok(state)
    }
}

impl SettingsSource for SettingsStore {
    fn load_safety_state(&self, account_id: &str) -> Result<SafetyState> {
        match self.accounts.get::<SafetyState>(account_id, SAFETY_KEY) {
            Ok(state) => Ok(state.unwrap_or_default()),
            Err(KvError::Serialization(e)) => {
                tracing::warn!("Unreadable safety state for {}, using defaults: {}", account_id, e);
                Ok(SafetyState::default())
            }
            Err(e) => Err(e.into()),
        }
    }

    fn load_dev_overrides(&self) -> Result<DevOverrideSet> {
        if !self.config.build_mode.allows_dev_overrides() {
            return Ok(DevOverrideSet::all_defaults());
        }
        match self.device.get::<DevOverrideSet>(DEV_OVERRIDES_KEY) {
            Ok(overrides) => Ok(overrides.unwrap_or_default()),
            Err(KvError::Serialization(e)) => {
                tracing::warn!("Unreadable dev overrides, ignoring them: {}", e);
                Ok(DevOverrideSet::all_defaults())
            }
            Err(e) => Err(e.into()),
        }
    }

    fn load_feature_locks(&self, account_id: &str) -> Result<FeatureLockSet> {
        match self.accounts.get::<FeatureLockSet>(account_id, FEATURE_LOCKS_KEY) {
            Ok(locks) => Ok(locks.unwrap_or_default()),
            Err(KvError::Serialization(e)) => {
                tracing::warn!("Unreadable feature locks for {}, locking all: {}", account_id, e);
                Ok(FeatureLockSet::all_locked())
            }
            Err(e) => Err(e.into()),
        }
    }
}
