//! Persisted safety state
//!
//! [`SafetyState`] is the durable source of truth for a user's safety
//! configuration. Kids mode is never stored independently: it always follows
//! the audience, including when a record is loaded from disk.

use crate::audience::Audience;
use crate::filtering::FilterLevel;
use serde::{Deserialize, Serialize};

/// The user's real safety configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "SafetyStateRecord")]
pub struct SafetyState {
    audience: Audience,
    is_kids_mode: bool,
    kids_filter_level: FilterLevel,
    is_parental_pin_set: bool,
}

impl Default for SafetyState {
    /// The most restrictive configuration, used when nothing is persisted
    fn default() -> Self {
        Self::new(Audience::Under13, FilterLevel::Strict, false)
    }
}

impl SafetyState {
    /// Create a safety state; kids mode is derived from `audience`
    pub fn new(
        audience: Audience,
        kids_filter_level: FilterLevel,
        is_parental_pin_set: bool,
    ) -> Self {
        Self {
            audience,
            is_kids_mode: audience.is_kids(),
            kids_filter_level,
            is_parental_pin_set,
        }
    }

    /// Create a safety state for an audience with default filter and no PIN
    pub fn for_audience(audience: Audience) -> Self {
        Self::new(audience, FilterLevel::default(), false)
    }

    /// Persisted audience
    pub fn audience(&self) -> Audience {
        self.audience
    }

    /// Whether kids mode is on; always `audience == Under13`
    pub fn is_kids_mode(&self) -> bool {
        self.is_kids_mode
    }

    /// Persisted kids filter level
    pub fn kids_filter_level(&self) -> FilterLevel {
        self.kids_filter_level
    }

    /// Whether a parental PIN has been configured
    pub fn is_parental_pin_set(&self) -> bool {
        self.is_parental_pin_set
    }

    /// Change the audience, updating kids mode with it
    pub fn set_audience(&mut self, audience: Audience) {
        self.audience = audience;
        self.is_kids_mode = audience.is_kids();
    }

    /// Change the kids filter level
    pub fn set_kids_filter_level(&mut self, level: FilterLevel) {
        self.kids_filter_level = level;
    }

    /// Record whether a parental PIN is configured
    pub fn set_parental_pin_set(&mut self, is_set: bool) {
        self.is_parental_pin_set = is_set;
    }
}

/// On-disk shape of [`SafetyState`]
///
/// Missing fields fall back to the most restrictive values.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SafetyStateRecord {
    #[serde(default = "default_audience")]
    audience: Audience,
    #[serde(default)]
    is_kids_mode: Option<bool>,
    #[serde(default)]
    kids_filter_level: FilterLevel,
    #[serde(default)]
    is_parental_pin_set: bool,
}

fn default_audience() -> Audience {
    Audience::Under13
}

impl From<SafetyStateRecord> for SafetyState {
    fn from(record: SafetyStateRecord) -> Self {
        if let Some(stored) = record.is_kids_mode {
            if stored != record.audience.is_kids() {
                tracing::warn!(
                    "Discarding stored kids mode flag {} inconsistent with audience {}",
                    stored,
                    record.audience
                );
            }
        }
        SafetyState::new(record.audience, record.kids_filter_level, record.is_parental_pin_set)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_most_restrictive() {
        let state = SafetyState::default();
        assert_eq!(state.audience(), Audience::Under13);
        assert!(state.is_kids_mode());
        assert_eq!(state.kids_filter_level(), FilterLevel::Strict);
        assert!(!state.is_parental_pin_set());
    }

    #[test]
    fn test_kids_mode_follows_audience() {
        for audience in Audience::ALL {
            let state = SafetyState::for_audience(audience);
            assert_eq!(state.is_kids_mode(), audience == Audience::Under13);
        }
    }

    #[test]
    fn test_set_audience_updates_kids_mode() {
        let mut state = SafetyState::for_audience(Audience::Adult);
        assert!(!state.is_kids_mode());

        state.set_audience(Audience::Under13);
        assert!(state.is_kids_mode());

        state.set_audience(Audience::Teen);
        assert!(!state.is_kids_mode());
    }

    #[test]
    fn test_setters() {
        let mut state = SafetyState::default();
        state.set_kids_filter_level(FilterLevel::Relaxed);
        state.set_parental_pin_set(true);

        assert_eq!(state.kids_filter_level(), FilterLevel::Relaxed);
        assert!(state.is_parental_pin_set());
    }

    #[test]
    fn test_serialization_roundtrip() {
        let state = SafetyState::new(Audience::Teen, FilterLevel::Moderate, true);
        let json = serde_json::to_string(&state).unwrap();
        assert!(json.contains("\"isKidsMode\":false"));

        let deserialized: SafetyState = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized, state);
    }

    #[test]
    fn test_inconsistent_kids_mode_is_recomputed() {
        let json = r#"{
            "audience": "ADULT",
            "isKidsMode": true,
            "kidsFilterLevel": "RELAXED",
            "isParentalPinSet": false
        }"#;
        let state: SafetyState = serde_json::from_str(json).unwrap();
        assert_eq!(state.audience(), Audience::Adult);
        assert!(!state.is_kids_mode());

        let json = r#"{"audience":"UNDER_13","isKidsMode":false}"#;
        let state: SafetyState = serde_json::from_str(json).unwrap();
        assert!(state.is_kids_mode());
    }

    #[test]
    fn test_missing_fields_fail_closed() {
        let state: SafetyState = serde_json::from_str("{}").unwrap();
        assert_eq!(state, SafetyState::default());
    }

    #[test]
    fn test_unknown_filter_level_is_kept_unrecognized() {
        let json = r#"{"audience":"UNDER_13","kidsFilterLevel":"EXTREME"}"#;
        let state: SafetyState = serde_json::from_str(json).unwrap();
        assert_eq!(state.kids_filter_level(), FilterLevel::Unrecognized);
    }
}
