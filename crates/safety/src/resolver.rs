//! Effective configuration
//!
//! [`resolve`] merges a [`DevOverrideSet`] over the persisted [`SafetyState`].
//! Overrides win whenever they are set. Kids mode is recomputed from the
//! resolved audience, and a forced PIN can add a simulated PIN but never hide
//! a real one.

use crate::audience::Audience;
use crate::filtering::FilterLevel;
use crate::messaging::DmBehavior;
use crate::overrides::{DevOverrideSet, ModerationOverride};
use crate::state::SafetyState;
use std::time::Duration;

/// Safety configuration after applying overrides
///
/// Only [`resolve`] and [`resolve_without_overrides`] construct this type, so
/// `is_kids_mode() == (audience() == Audience::Under13)` always holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EffectiveConfig {
    audience: Audience,
    kids_filter_level: FilterLevel,
    is_kids_mode: bool,
    pin_set: bool,
    pin_verified: bool,
    moderation_override: ModerationOverride,
    messaging: DmBehavior,
}

impl EffectiveConfig {
    /// Effective audience
    pub fn audience(&self) -> Audience {
        self.audience
    }

    /// Effective kids filter level
    pub fn kids_filter_level(&self) -> FilterLevel {
        self.kids_filter_level
    }

    /// Whether kids mode applies
    pub fn is_kids_mode(&self) -> bool {
        self.is_kids_mode
    }

    /// Whether a parental PIN is configured, real or simulated
    pub fn pin_set(&self) -> bool {
        self.pin_set
    }

    /// Whether the parental PIN counts as verified
    pub fn pin_verified(&self) -> bool {
        self.pin_verified
    }

    /// Active moderation override
    pub fn moderation_override(&self) -> ModerationOverride {
        self.moderation_override
    }

    /// Direct message behavior
    pub fn messaging(&self) -> &DmBehavior {
        &self.messaging
    }
}

/// Merge overrides over the persisted safety state
pub fn resolve(safety: &SafetyState, overrides: &DevOverrideSet) -> EffectiveConfig {
    if overrides.is_active() {
        tracing::debug!("Resolving safety state with active dev overrides: {:?}", overrides);
    }

    let audience = overrides.forced_audience.unwrap_or(safety.audience());

    EffectiveConfig {
        audience,
        kids_filter_level: overrides
            .forced_kids_filter_level
            .unwrap_or(safety.kids_filter_level()),
        is_kids_mode: audience.is_kids(),
        pin_set: overrides.force_pin_set || safety.is_parental_pin_set(),
        pin_verified: overrides.force_pin_verify_success,
        moderation_override: overrides.moderation_override,
        messaging: DmBehavior {
            rate_limit_enabled: !overrides.dm_disable_rate_limit,
            force_send_failure: overrides.dm_force_send_failure,
            send_delay: overrides.dm_send_delay.unwrap_or(Duration::ZERO),
        },
    }
}

/// Resolve the persisted safety state with no override layer
pub fn resolve_without_overrides(safety: &SafetyState) -> EffectiveConfig {
    EffectiveConfig {
        audience: safety.audience(),
        kids_filter_level: safety.kids_filter_level(),
        is_kids_mode: safety.is_kids_mode(),
        pin_set: safety.is_parental_pin_set(),
        pin_verified: false,
        moderation_override: ModerationOverride::Off,
        messaging: DmBehavior::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn adult() -> SafetyState {
        SafetyState::new(Audience::Adult, FilterLevel::Moderate, false)
    }

    #[test]
    fn test_no_overrides_matches_state() {
        let config = resolve(&adult(), &DevOverrideSet::default());
        assert_eq!(config.audience(), Audience::Adult);
        assert_eq!(config.kids_filter_level(), FilterLevel::Moderate);
        assert!(!config.is_kids_mode());
        assert!(!config.pin_set());
        assert!(!config.pin_verified());
        assert_eq!(config.moderation_override(), ModerationOverride::Off);
        assert_eq!(config.messaging(), &DmBehavior::default());
    }

    #[test]
    fn test_all_defaults_is_transparent() {
        for audience in Audience::ALL {
            for level in FilterLevel::KNOWN {
                for pin in [false, true] {
                    let state = SafetyState::new(audience, level, pin);
                    assert_eq!(
                        resolve(&state, &DevOverrideSet::all_defaults()),
                        resolve_without_overrides(&state)
                    );
                }
            }
        }
    }

    #[test]
    fn test_forced_audience_wins_and_recomputes_kids_mode() {
        let overrides = DevOverrideSet::default().with_forced_audience(Audience::Under13);
        let config = resolve(&adult(), &overrides);
        assert_eq!(config.audience(), Audience::Under13);
        assert!(config.is_kids_mode());

        let kid = SafetyState::for_audience(Audience::Under13);
        let overrides = DevOverrideSet::default().with_forced_audience(Audience::Adult);
        let config = resolve(&kid, &overrides);
        assert_eq!(config.audience(), Audience::Adult);
        assert!(!config.is_kids_mode());
    }

    #[test]
    fn test_forced_filter_level_wins() {
        let overrides =
            DevOverrideSet::default().with_forced_kids_filter_level(FilterLevel::Relaxed);
        let config = resolve(&adult(), &overrides);
        assert_eq!(config.kids_filter_level(), FilterLevel::Relaxed);
    }

    #[test]
    fn test_force_pin_set_only_adds() {
        let with_pin = SafetyState::new(Audience::Teen, FilterLevel::Strict, true);
        let config = resolve(&with_pin, &DevOverrideSet::default());
        assert!(config.pin_set());

        let config = resolve(&adult(), &DevOverrideSet::default().with_pin_set());
        assert!(config.pin_set());
    }

    #[test]
    fn test_pin_verified_comes_from_override() {
        let config = resolve(&adult(), &DevOverrideSet::default().with_pin_verified());
        assert!(config.pin_verified());
    }

    #[test]
    fn test_moderation_override_passes_through() {
        let overrides =
            DevOverrideSet::default().with_moderation_override(ModerationOverride::Flagged);
        let config = resolve(&adult(), &overrides);
        assert_eq!(config.moderation_override(), ModerationOverride::Flagged);
    }

    #[test]
    fn test_dm_overrides_resolve() {
        let overrides = DevOverrideSet {
            dm_disable_rate_limit: true,
            dm_force_send_failure: true,
            dm_send_delay: Some(Duration::from_secs(2)),
            ..Default::default()
        };
        let config = resolve(&adult(), &overrides);
        assert!(!config.messaging().rate_limit_enabled);
        assert!(config.messaging().force_send_failure);
        assert_eq!(config.messaging().send_delay, Duration::from_secs(2));
    }
}
