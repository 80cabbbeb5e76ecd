//! Per-decision settings snapshots
//!
//! Call sites read the safety state, dev overrides, and feature locks once,
//! then take every decision for that render pass or user action from the same
//! [`SnapshotDecisions`]. Feed, posting, and messaging therefore agree even if
//! the settings store changes in the meantime.

use crate::filtering::{ContentDecision, ContentFilter, ContentItem, FilterOutcome};
use crate::messaging::{DmSendDecision, DmSendGate};
use crate::overrides::DevOverrideSet;
use crate::parental::{blocked_reason, BlockedReason, Feature, FeatureLockSet};
use crate::resolver::{resolve, EffectiveConfig};
use crate::state::SafetyState;
use chrono::{DateTime, Utc};

/// Consistent read of every settings source the engine consults
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SafetySnapshot {
    /// Persisted safety state
    pub safety: SafetyState,
    /// Dev overrides; all defaults in release builds
    pub overrides: DevOverrideSet,
    /// Parental feature locks
    pub locks: FeatureLockSet,
}

impl SafetySnapshot {
    /// Create a snapshot
    pub fn new(safety: SafetyState, overrides: DevOverrideSet, locks: FeatureLockSet) -> Self {
        Self { safety, overrides, locks }
    }

    /// Resolve the effective configuration
    pub fn effective_config(&self) -> EffectiveConfig {
        resolve(&self.safety, &self.overrides)
    }

    /// Resolve once and bind the result to a content filter
    pub fn decisions<'a>(&'a self, filter: &'a ContentFilter) -> SnapshotDecisions<'a> {
        SnapshotDecisions {
            config: self.effective_config(),
            locks: &self.locks,
            filter,
        }
    }
}

/// Decisions taken against one resolved snapshot
#[derive(Debug)]
pub struct SnapshotDecisions<'a> {
    config: EffectiveConfig,
    locks: &'a FeatureLockSet,
    filter: &'a ContentFilter,
}

impl SnapshotDecisions<'_> {
    /// The resolved configuration
    pub fn config(&self) -> &EffectiveConfig {
        &self.config
    }

    /// Decide what to render for a content item
    pub fn decide(&self, item: &ContentItem) -> ContentDecision {
        self.filter.decide(&self.config, item)
    }

    /// Decide what to render for a content item, with the hide reason
    pub fn decide_with_reason(&self, item: &ContentItem) -> FilterOutcome {
        self.filter.decide_with_reason(&self.config, item)
    }

    /// Reason a feature is blocked, or `None` if allowed
    pub fn blocked_reason(&self, feature: Feature) -> Option<BlockedReason> {
        blocked_reason(&self.config, self.locks, feature)
    }

    /// Check if a feature is allowed
    pub fn is_allowed(&self, feature: Feature) -> bool {
        self.blocked_reason(feature).is_none()
    }

    /// Check a direct message send
    pub fn check_dm_send(
        &self,
        gate: &DmSendGate,
        recent_sends: &[DateTime<Utc>],
        now: DateTime<Utc>,
    ) -> DmSendDecision {
        gate.check(&self.config, self.locks, recent_sends, now)
    }
}
