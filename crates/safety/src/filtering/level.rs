//! Kids filter levels

use serde::{Deserialize, Serialize};
use std::fmt;

/// Severity of the kids text filter
///
/// Levels are ordered by strictness, loosest first. Any value that cannot be
/// recognized when loading settings becomes [`FilterLevel::Unrecognized`],
/// which is stricter than every known level and hides all text.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(from = "String", into = "String")]
pub enum FilterLevel {
    /// Redact strong terms only
    Relaxed,
    /// Redact mild and strong terms, hide on severe ones
    Moderate,
    /// Hide on any listed term
    #[default]
    Strict,
    /// Unknown level; fails closed
    Unrecognized,
}

impl FilterLevel {
    /// Known levels, loosest first
    pub const KNOWN: [FilterLevel; 3] =
        [FilterLevel::Relaxed, FilterLevel::Moderate, FilterLevel::Strict];

    /// Parse a level name; unknown names map to [`FilterLevel::Unrecognized`]
    pub fn parse(name: &str) -> Self {
        match name.trim().to_ascii_uppercase().as_str() {
            "RELAXED" => FilterLevel::Relaxed,
            "MODERATE" => FilterLevel::Moderate,
            "STRICT" => FilterLevel::Strict,
            _ => FilterLevel::Unrecognized,
        }
    }

    /// Stable identifier, matching the serialized form
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterLevel::Relaxed => "RELAXED",
            FilterLevel::Moderate => "MODERATE",
            FilterLevel::Strict => "STRICT",
            FilterLevel::Unrecognized => "UNRECOGNIZED",
        }
    }

    /// Whether this is one of the known levels
    pub fn is_recognized(&self) -> bool {
        !matches!(self, FilterLevel::Unrecognized)
    }
}

impl From<String> for FilterLevel {
    fn from(name: String) -> Self {
        FilterLevel::parse(&name)
    }
}

impl From<FilterLevel> for String {
    fn from(level: FilterLevel) -> Self {
        level.as_str().to_string()
    }
}

impl fmt::Display for FilterLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
