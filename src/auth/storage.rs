//! Tab-scoped key/value storage backing the auth session.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

/// Storage keys the session owns.
pub mod keys {
    pub const ACCESS_TOKEN: &str = "access_token";
    pub const REFRESH_TOKEN: &str = "refresh_token";
    pub const USER: &str = "user";

    pub const ALL: [&str; 3] = [ACCESS_TOKEN, REFRESH_TOKEN, USER];
}

/// String key/value store that lives as long as one browser tab.
pub trait SessionStorage: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: String);
    fn remove(&self, key: &str);
}

/// Process-local storage; nothing is written to disk.
#[derive(Debug, Default)]
pub struct MemorySessionStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl MemorySessionStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl SessionStorage for MemorySessionStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn set(&self, key: &str, value: String) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value);
    }

    fn remove(&self, key: &str) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_get_remove() {
        let storage = MemorySessionStorage::new();
        assert!(storage.get(keys::USER).is_none());
        storage.set(keys::USER, "{}".to_string());
        assert_eq!(storage.get(keys::USER).as_deref(), Some("{}"));
        storage.remove(keys::USER);
        assert!(storage.is_empty());
    }
}
