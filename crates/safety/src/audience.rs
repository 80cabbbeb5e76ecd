//! Audience tiers
//!
//! An audience is the content-suitability tier of a user. Tiers form a total
//! order, `Under13 < Teen < Adult`, and every comparison goes through that
//! order rather than through names.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Age below which a user is classified as [`Audience::Under13`]
pub const TEEN_MIN_AGE: u32 = 13;

/// Age from which a user is classified as [`Audience::Adult`]
pub const ADULT_MIN_AGE: u32 = 18;

/// Content-suitability tier of a user
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Audience {
    /// Children under 13; implies kids mode
    #[serde(rename = "UNDER_13")]
    Under13,
    /// Teenagers from 13 to 17
    #[serde(rename = "TEEN")]
    Teen,
    /// Adults
    #[serde(rename = "ADULT")]
    Adult,
}

impl Audience {
    /// All tiers, least to most permissive
    pub const ALL: [Audience; 3] = [Audience::Under13, Audience::Teen, Audience::Adult];

    /// Classify a user by age in years
    pub fn for_age(years: u32) -> Self {
        if years < TEEN_MIN_AGE {
            Audience::Under13
        } else if years < ADULT_MIN_AGE {
            Audience::Teen
        } else {
            Audience::Adult
        }
    }

    /// Whether this tier runs in kids mode
    pub fn is_kids(&self) -> bool {
        matches!(self, Audience::Under13)
    }

    /// Whether content with the given minimum audience is suitable for this tier
    pub fn admits(&self, min_audience: Audience) -> bool {
        min_audience <= *self
    }

    /// Stable identifier, matching the serialized form
    pub fn as_str(&self) -> &'static str {
        match self {
            Audience::Under13 => "UNDER_13",
            Audience::Teen => "TEEN",
            Audience::Adult => "ADULT",
        }
    }
}

impl fmt::Display for Audience {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
