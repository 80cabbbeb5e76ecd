//! Key-value store for settings
//!
//! Values are stored as JSON in a sled tree. Keys are plain strings, usually
//! built from scopes joined with `:` (for example `account:did%3Aplc%3Ax:safety`
//! or `device:dev_overrides`). Account ids are escaped so they never contain
//! the separator.

use serde::{de::DeserializeOwned, Serialize};
use sled::Db;
use std::sync::Arc;
use thiserror::Error;

/// Key-value store error types
#[derive(Debug, Error)]
pub enum KvError {
    /// Sled database error
    #[error("Database error: {0}")]
    Database(#[from] sled::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for key-value operations
pub type Result<T> = std::result::Result<T, KvError>;

const SEPARATOR: &str = ":";

/// Key-value store configuration
#[derive(Debug, Clone)]
pub struct KvConfig {
    /// Database path
    pub path: String,
    /// Cache capacity in bytes
    pub cache_capacity: u64,
    /// Flush interval in milliseconds (None flushes only on request)
    pub flush_every_ms: Option<u64>,
}

impl Default for KvConfig {
    fn default() -> Self {
        Self {
            path: "settings_kv.db".to_string(),
            cache_capacity: 8 * 1024 * 1024, // 8MB
            flush_every_ms: Some(500),
        }
    }
}

impl KvConfig {
    /// Create a new configuration with a custom path
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into(), ..Default::default() }
    }

    /// Set cache capacity in bytes
    pub fn cache_capacity(mut self, bytes: u64) -> Self {
        self.cache_capacity = bytes;
        self
    }

    /// Set flush interval in milliseconds
    pub fn flush_every_ms(mut self, ms: Option<u64>) -> Self {
        self.flush_every_ms = ms;
        self
    }
}

/// Key-value store backed by sled
pub struct KvStore {
    db: Db,
}

impl KvStore {
    /// Open a store with the given configuration
    pub fn new(config: KvConfig) -> Result<Self> {
        let db = sled::Config::new()
            .path(&config.path)
            .cache_capacity(config.cache_capacity)
            .flush_every_ms(config.flush_every_ms)
            .open()?;

        Ok(Self { db })
    }

    /// Create an in-memory store (for testing)
    pub fn in_memory() -> Result<Self> {
        let db = sled::Config::new().temporary(true).open()?;
        Ok(Self { db })
    }

    /// Get a value by key
    pub fn get<T>(&self, key: &str) -> Result<Option<T>>
    where
        T: DeserializeOwned,
    {
        match self.db.get(key.as_bytes())? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Get a value by scoped key (e.g., ["device", "dev_overrides"])
    pub fn get_scoped<T>(&self, scopes: &[&str]) -> Result<Option<T>>
    where
        T: DeserializeOwned,
    {
        self.get(&scopes.join(SEPARATOR))
    }

    /// Set a value by key
    pub fn set<T>(&self, key: &str, value: &T) -> Result<()>
    where
        T: Serialize + ?Sized,
    {
        let bytes = serde_json::to_vec(value)?;
        self.db.insert(key.as_bytes(), bytes)?;
        Ok(())
    }

    /// Set a value by scoped key
    pub fn set_scoped<T>(&self, scopes: &[&str], value: &T) -> Result<()>
    where
        T: Serialize + ?Sized,
    {
        self.set(&scopes.join(SEPARATOR), value)
    }

    /// Remove a value by key, returning whether it existed
    pub fn remove(&self, key: &str) -> Result<bool> {
        Ok(self.db.remove(key.as_bytes())?.is_some())
    }

    /// Remove a value by scoped key
    pub fn remove_scoped(&self, scopes: &[&str]) -> Result<bool> {
        self.remove(&scopes.join(SEPARATOR))
    }

    /// Check if a key exists
    pub fn contains(&self, key: &str) -> Result<bool> {
        Ok(self.db.contains_key(key.as_bytes())?)
    }

    /// Check if a scoped key exists
    pub fn contains_scoped(&self, scopes: &[&str]) -> Result<bool> {
        self.contains(&scopes.join(SEPARATOR))
    }

    /// Get all keys with a given prefix
    pub fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>> {
        let mut keys = Vec::new();
        for item in self.db.scan_prefix(prefix.as_bytes()) {
            let (key, _) = item?;
            if let Ok(key) = String::from_utf8(key.to_vec()) {
                keys.push(key);
            }
        }
        Ok(keys)
    }

    /// Flush pending writes to disk
    pub fn flush(&self) -> Result<()> {
        self.db.flush()?;
        Ok(())
    }

    /// Get the number of keys in the store
    pub fn len(&self) -> usize {
        self.db.len()
    }

    /// Check if the store is empty
    pub fn is_empty(&self) -> bool {
        self.db.is_empty()
    }
}

/// Device-scoped view of the store, shared by every account on the device
pub struct DeviceStore {
    kv: Arc<KvStore>,
}

impl DeviceStore {
    /// Create a new device store
    pub fn new(kv: Arc<KvStore>) -> Self {
        Self { kv }
    }

    /// Get a device-level value
    pub fn get<T>(&self, key: &str) -> Result<Option<T>>
    where
        T: DeserializeOwned,
    {
        self.kv.get_scoped(&["device", key])
    }

    /// Set a device-level value
    pub fn set<T>(&self, key: &str, value: &T) -> Result<()>
    where
        T: Serialize + ?Sized,
    {
        self.kv.set_scoped(&["device", key], value)
    }

    /// Remove a device-level value
    pub fn remove(&self, key: &str) -> Result<bool> {
        self.kv.remove_scoped(&["device", key])
    }
}

/// Escape an account id so it forms a single key segment
///
/// DIDs contain `:`, so an unescaped `did:web:example.com` would be a key
/// prefix of `did:web:example.com:kids:alice`.
fn escape_segment(segment: &str) -> String {
    let mut escaped = String::with_capacity(segment.len());
    for c in segment.chars() {
        match c {
            '%' => escaped.push_str("%25"),
            ':' => escaped.push_str("%3A"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Account-scoped view of the store
pub struct AccountStore {
    kv: Arc<KvStore>,
}

impl AccountStore {
    /// Create a new account store
    pub fn new(kv: Arc<KvStore>) -> Self {
        Self { kv }
    }

    /// Get an account-level value
    pub fn get<T>(&self, account_id: &str, key: &str) -> Result<Option<T>>
    where
        T: DeserializeOwned,
    {
        self.kv.get_scoped(&["account", &escape_segment(account_id), key])
    }

    /// Set an account-level value
    pub fn set<T>(&self, account_id: &str, key: &str, value: &T) -> Result<()>
    where
        T: Serialize + ?Sized,
    {
        self.kv.set_scoped(&["account", &escape_segment(account_id), key], value)
    }

    /// Check if an account-level key exists
    pub fn contains(&self, account_id: &str, key: &str) -> Result<bool> {
        self.kv.contains_scoped(&["account", &escape_segment(account_id), key])
    }

    /// Remove all data for an account, returning the number of keys removed
    pub fn remove_account(&self, account_id: &str) -> Result<usize> {
        let prefix = format!("account{}{}{}", SEPARATOR, escape_segment(account_id), SEPARATOR);
        let mut count = 0;
        for key in self.kv.keys_with_prefix(&prefix)? {
            if self.kv.remove(&key)? {
                count += 1;
            }
        }
        Ok(count)
    }
}
