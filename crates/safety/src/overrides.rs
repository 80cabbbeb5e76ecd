//! Developer and test overrides
//!
//! A [`DevOverrideSet`] shadows the persisted safety state for testing. It is
//! never written back as real state, and a set whose fields all sit at their
//! sentinel values (`None`, `false`, [`ModerationOverride::Off`]) has no
//! effect on resolution at all.

use crate::audience::Audience;
use crate::filtering::FilterLevel;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Outcome of moderating a piece of content
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModerationOutcome {
    /// Nothing objectionable found
    Clean,
    /// Shown with a flagged banner
    Flagged,
    /// Removed from view
    Blocked,
}

/// Test switch that forces the outcome of the moderation pipeline
///
/// | Variant   | Hides content | Flagged banner | Defers to pipeline |
/// |-----------|---------------|----------------|--------------------|
/// | `Off`     | no            | no             | yes                |
/// | `Clean`   | no            | no             | no                 |
/// | `Flagged` | no            | yes            | no                 |
/// | `Blocked` | yes           | no             | no                 |
///
/// `Flagged` never hides content: it only exists for the banner renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ModerationOverride {
    /// Use the real moderation pipeline
    #[default]
    Off,
    /// Force every item clean
    Clean,
    /// Force every item flagged
    Flagged,
    /// Force every item blocked
    Blocked,
}

impl ModerationOverride {
    /// Whether the content filter must hide every item
    pub fn hides_content(&self) -> bool {
        matches!(self, ModerationOverride::Blocked)
    }

    /// Whether the flagged banner must be shown
    pub fn shows_flagged_banner(&self) -> bool {
        matches!(self, ModerationOverride::Flagged)
    }

    /// Whether the real moderation pipeline should be consulted
    pub fn defers_to_pipeline(&self) -> bool {
        matches!(self, ModerationOverride::Off)
    }

    /// Outcome forced by this override, if any
    pub fn forced_outcome(&self) -> Option<ModerationOutcome> {
        match self {
            ModerationOverride::Off => None,
            ModerationOverride::Clean => Some(ModerationOutcome::Clean),
            ModerationOverride::Flagged => Some(ModerationOutcome::Flagged),
            ModerationOverride::Blocked => Some(ModerationOutcome::Blocked),
        }
    }

    /// Forced outcome, or the result of `pipeline` when the override is off
    ///
    /// `pipeline` is not called at all while an override is in effect.
    pub fn outcome_or_else<F>(&self, pipeline: F) -> ModerationOutcome
    where
        F: FnOnce() -> ModerationOutcome,
    {
        self.forced_outcome().unwrap_or_else(pipeline)
    }
}

/// Ephemeral overrides for developer and test builds
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DevOverrideSet {
    /// Audience to simulate instead of the persisted one
    pub forced_audience: Option<Audience>,
    /// Kids filter level to simulate instead of the persisted one
    pub forced_kids_filter_level: Option<FilterLevel>,
    /// Simulate a configured parental PIN; cannot remove a real one
    pub force_pin_set: bool,
    /// Simulate a successful PIN verification
    pub force_pin_verify_success: bool,
    /// Forced moderation outcome
    pub moderation_override: ModerationOverride,
    /// Disable direct message rate limiting
    pub dm_disable_rate_limit: bool,
    /// Make every direct message send fail
    pub dm_force_send_failure: bool,
    /// Artificial delay before a direct message is sent
    pub dm_send_delay: Option<Duration>,
}

impl DevOverrideSet {
    /// Create an override set with every field at its sentinel
    pub fn all_defaults() -> Self {
        Self::default()
    }

    /// Whether any field differs from its sentinel
    pub fn is_active(&self) -> bool {
        *self != Self::all_defaults()
    }

    /// Force an audience
    pub fn with_forced_audience(mut self, audience: Audience) -> Self {
        self.forced_audience = Some(audience);
        self
    }

    /// Force a kids filter level
    pub fn with_forced_kids_filter_level(mut self, level: FilterLevel) -> Self {
        self.forced_kids_filter_level = Some(level);
        self
    }

    /// Simulate a configured parental PIN
    pub fn with_pin_set(mut self) -> Self {
        self.force_pin_set = true;
        self
    }

    /// Simulate a verified parental PIN
    pub fn with_pin_verified(mut self) -> Self {
        self.force_pin_verify_success = true;
        self
    }

    /// Force a moderation outcome
    pub fn with_moderation_override(mut self, moderation: ModerationOverride) -> Self {
        self.moderation_override = moderation;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Moderation override tests

    #[test]
    fn test_moderation_override_effect_table() {
        assert!(!ModerationOverride::Off.hides_content());
        assert!(!ModerationOverride::Clean.hides_content());
        assert!(!ModerationOverride::Flagged.hides_content());
        assert!(ModerationOverride::Blocked.hides_content());

        assert!(ModerationOverride::Flagged.shows_flagged_banner());
        assert!(!ModerationOverride::Blocked.shows_flagged_banner());

        assert!(ModerationOverride::Off.defers_to_pipeline());
        assert!(!ModerationOverride::Clean.defers_to_pipeline());
    }

    #[test]
    fn test_forced_outcome() {
        assert_eq!(ModerationOverride::Off.forced_outcome(), None);
        assert_eq!(ModerationOverride::Clean.forced_outcome(), Some(ModerationOutcome::Clean));
        assert_eq!(ModerationOverride::Flagged.forced_outcome(), Some(ModerationOutcome::Flagged));
        assert_eq!(ModerationOverride::Blocked.forced_outcome(), Some(ModerationOutcome::Blocked));
    }

    #[test]
    fn test_outcome_or_else_consults_pipeline_only_when_off() {
        let outcome = ModerationOverride::Off.outcome_or_else(|| ModerationOutcome::Flagged);
        assert_eq!(outcome, ModerationOutcome::Flagged);

        let outcome = ModerationOverride::Clean
            .outcome_or_else(|| panic!("pipeline must not run under an override"));
        assert_eq!(outcome, ModerationOutcome::Clean);
    }

    // Override set tests

    #[test]
    fn test_all_defaults_is_inactive() {
        let overrides = DevOverrideSet::all_defaults();
        assert!(!overrides.is_active());
        assert_eq!(overrides.forced_audience, None);
        assert_eq!(overrides.moderation_override, ModerationOverride::Off);
    }

    #[test]
    fn test_any_field_activates() {
        assert!(DevOverrideSet::default().with_forced_audience(Audience::Teen).is_active());
        assert!(DevOverrideSet::default().with_pin_set().is_active());
        assert!(DevOverrideSet::default()
            .with_moderation_override(ModerationOverride::Flagged)
            .is_active());

        let overrides = DevOverrideSet {
            dm_send_delay: Some(Duration::from_millis(250)),
            ..Default::default()
        };
        assert!(overrides.is_active());
    }

    #[test]
    fn test_override_set_serialization() {
        let overrides = DevOverrideSet::default()
            .with_forced_audience(Audience::Under13)
            .with_moderation_override(ModerationOverride::Blocked);

        let json = serde_json::to_string(&overrides).unwrap();
        assert!(json.contains("\"forcedAudience\":\"UNDER_13\""));
        assert!(json.contains("\"moderationOverride\":\"BLOCKED\""));

        let deserialized: DevOverrideSet = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized, overrides);
    }

    #[test]
    fn test_partial_record_fills_sentinels() {
        let overrides: DevOverrideSet =
            serde_json::from_str(r#"{"forcePinVerifySuccess":true}"#).unwrap();
        assert!(overrides.force_pin_verify_success);
        assert_eq!(overrides.forced_audience, None);
        assert!(!overrides.dm_force_send_failure);
    }
}
