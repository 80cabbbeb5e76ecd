//! Audience Gate
//!
//! Content and action gating driven by a user's audience tier, parental
//! controls, and developer overrides. The engine lives in [`safety`]; the
//! settings store it reads from lives in [`storage`].

#![warn(missing_docs)]
#![warn(clippy::all)]

pub use safety;
pub use storage;
