//! Settings storage for the safety engine
//!
//! This crate provides the sled-backed key-value store and the settings store
//! that persists safety state, feature locks, and dev overrides.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod kv;
pub mod settings;

pub use kv::{AccountStore, DeviceStore, KvConfig, KvError, KvStore};
pub use settings::{
    read_snapshot, BuildMode, SettingsConfig, SettingsError, SettingsSource, SettingsStore,
};
