//! Parental feature locks
//!
//! A parent can lock app features behind the parental PIN. The gate here only
//! reads the lock set and the resolved PIN state; PIN entry itself belongs to
//! the parental-controls flow, which marks the session verified upstream.

use crate::resolver::EffectiveConfig;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A feature that parental controls can lock
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Feature {
    /// Creating posts
    Posting,
    /// Direct messages
    Messaging,
    /// Replying to posts
    Commenting,
    /// Following accounts
    Following,
    /// Editing the profile
    ProfileEditing,
}

impl Feature {
    /// All lockable features
    pub const ALL: [Feature; 5] = [
        Feature::Posting,
        Feature::Messaging,
        Feature::Commenting,
        Feature::Following,
        Feature::ProfileEditing,
    ];

    /// Human-readable name
    pub fn label(&self) -> &'static str {
        match self {
            Feature::Posting => "Posting",
            Feature::Messaging => "Messaging",
            Feature::Commenting => "Commenting",
            Feature::Following => "Following",
            Feature::ProfileEditing => "Profile editing",
        }
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Features a parent has locked
///
/// Features without an entry are unlocked.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureLockSet {
    locks: BTreeMap<Feature, bool>,
}

impl FeatureLockSet {
    /// Create an empty lock set
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a lock set with every feature locked
    pub fn all_locked() -> Self {
        Self { locks: Feature::ALL.iter().map(|feature| (*feature, true)).collect() }
    }

    /// Lock a feature, builder style
    pub fn with_lock(mut self, feature: Feature) -> Self {
        self.lock(feature);
        self
    }

    /// Lock a feature
    pub fn lock(&mut self, feature: Feature) {
        self.locks.insert(feature, true);
    }

    /// Unlock a feature
    pub fn unlock(&mut self, feature: Feature) {
        self.locks.insert(feature, false);
    }

    /// Set the lock state of a feature
    pub fn set_locked(&mut self, feature: Feature, locked: bool) {
        self.locks.insert(feature, locked);
    }

    /// Check if a feature is locked
    pub fn is_locked(&self, feature: Feature) -> bool {
        self.locks.get(&feature).copied().unwrap_or(false)
    }

    /// Locked features in declaration order
    pub fn locked_features(&self) -> impl Iterator<Item = Feature> + '_ {
        self.locks.iter().filter(|(_, locked)| **locked).map(|(feature, _)| *feature)
    }

    /// Check if no feature is locked
    pub fn is_empty(&self) -> bool {
        self.locked_features().next().is_none()
    }
}

/// Why a feature is blocked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockedReason {
    /// The blocked feature
    pub feature: Feature,
    /// Whether a parental PIN exists to unlock it
    pub pin_set: bool,
}

impl BlockedReason {
    /// Whether the user should be sent to PIN entry rather than PIN setup
    pub fn requires_pin_entry(&self) -> bool {
        self.pin_set
    }

    /// Get a human-readable description
    pub fn description(&self) -> String {
        if self.pin_set {
            format!(
                "{} is locked by parental controls. Enter the parental PIN to continue.",
                self.feature.label()
            )
        } else {
            format!(
                "{} is locked by parental controls. A parent must set up a PIN to unlock it.",
                self.feature.label()
            )
        }
    }
}

impl fmt::Display for BlockedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.description())
    }
}

/// Reason `feature` is blocked, or `None` if it is allowed
///
/// A locked feature is allowed once the PIN is verified, whether by the real
/// parental flow or a dev override.
pub fn blocked_reason(
    config: &EffectiveConfig,
    locks: &FeatureLockSet,
    feature: Feature,
) -> Option<BlockedReason> {
    if !locks.is_locked(feature) || config.pin_verified() {
        return None;
    }

    tracing::debug!("Feature {} blocked by parental lock", feature);
    Some(BlockedReason { feature, pin_set: config.pin_set() })
}

/// Check if `feature` is allowed
pub fn is_allowed(config: &EffectiveConfig, locks: &FeatureLockSet, feature: Feature) -> bool {
    blocked_reason(config, locks, feature).is_none()
}
