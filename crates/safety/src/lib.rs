//! Audience and parental-control gating
//!
//! This crate decides what content a user may see and which actions they may
//! perform. Every decision is a pure function of a settings snapshot: the
//! persisted [`SafetyState`], an optional [`DevOverrideSet`] used by test
//! builds, and the parental [`FeatureLockSet`].
//!
//! Call sites resolve the snapshot once into an [`EffectiveConfig`] and then ask
//! the content filter or the feature gate for a decision.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod audience;
pub mod filtering;
pub mod messaging;
pub mod overrides;
pub mod parental;
pub mod resolver;
pub mod snapshot;
pub mod state;

pub use audience::Audience;
pub use filtering::{
    ContentDecision, ContentFilter, ContentItem, FilterLevel, HideReason, KidsLexicon, TextVerdict,
};
pub use messaging::{DmBehavior, DmRateLimit, DmSendDecision, DmSendGate};
pub use overrides::{DevOverrideSet, ModerationOutcome, ModerationOverride};
pub use parental::{BlockedReason, Feature, FeatureLockSet};
pub use resolver::{resolve, resolve_without_overrides, EffectiveConfig};
pub use snapshot::{SafetySnapshot, SnapshotDecisions};
pub use state::SafetyState;
