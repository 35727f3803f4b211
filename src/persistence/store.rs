//! Local durable store
//!
//! `KeyValueStore` is the raw string backend (LocalStorage in the browser, a
//! map in tests). `Repository` layers typed keys and JSON values on top and
//! masks backend failures: reads fall back to a default, writes are dropped,
//! both with a warning.

use std::collections::BTreeMap;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::key::StoreKey;
use crate::error::StorageError;

/// Synchronous string key-value backend
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&mut self, key: &str) -> Result<(), StorageError>;
    /// All keys currently held, including ones this application does not own
    fn keys(&self) -> Result<Vec<String>, StorageError>;
    fn clear(&mut self) -> Result<(), StorageError>;
}

/// In-memory backend
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw contents, for inspection
    pub fn entries(&self) -> &BTreeMap<String, String> {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.entries.remove(key);
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>, StorageError> {
        Ok(self.entries.keys().cloned().collect())
    }

    fn clear(&mut self) -> Result<(), StorageError> {
        self.entries.clear();
        Ok(())
    }
}

/// Typed, failure-masking access to a `KeyValueStore`
#[derive(Debug)]
pub struct Repository<S> {
    backend: S,
}

impl<S: KeyValueStore> Repository<S> {
    pub fn new(backend: S) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &S {
        &self.backend
    }

    fn try_get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StorageError> {
        let Some(raw) = self.backend.get(key)? else {
            return Ok(None);
        };
        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|source| StorageError::Decode {
                key: key.to_string(),
                source,
            })
    }

    /// Decode the value under `key`, or `default` when missing or unreadable
    pub fn get<T: DeserializeOwned>(&self, key: &StoreKey, default: T) -> T {
        let name = key.to_string();
        match self.try_get(&name) {
            Ok(Some(value)) => value,
            Ok(None) => default,
            Err(e) => {
                log::warn!("Reading {} from local storage failed: {}", name, e);
                default
            }
        }
    }

    /// Raw JSON under `key`, `Null` when missing or unreadable
    pub fn get_value(&self, key: &StoreKey) -> Value {
        self.get(key, Value::Null)
    }

    pub fn contains(&self, key: &StoreKey) -> bool {
        matches!(self.backend.get(&key.to_string()), Ok(Some(_)))
    }

    pub fn set<T: Serialize + ?Sized>(&mut self, key: &StoreKey, value: &T) {
        self.write_raw(&key.to_string(), value);
    }

    /// Write under an arbitrary key name (import replays document keys verbatim)
    pub fn write_raw<T: Serialize + ?Sized>(&mut self, name: &str, value: &T) {
        let result = serde_json::to_string(value)
            .map_err(|source| StorageError::Encode {
                key: name.to_string(),
                source,
            })
            .and_then(|json| self.backend.set(name, &json));
        match result {
            Ok(()) => log::debug!("Saved {} to local storage", name),
            Err(e) => log::warn!("Saving {} to local storage failed: {}", name, e),
        }
    }

    pub fn delete(&mut self, key: &StoreKey) {
        let name = key.to_string();
        if let Err(e) = self.backend.remove(&name) {
            log::warn!("Removing {} from local storage failed: {}", name, e);
        }
    }

    /// Owned keys matching `predicate`; keys that do not parse are skipped
    pub fn scan(&self, predicate: impl Fn(&StoreKey) -> bool) -> Vec<StoreKey> {
        match self.backend.keys() {
            Ok(keys) => keys
                .iter()
                .filter_map(|raw| StoreKey::parse(raw))
                .filter(|key| predicate(key))
                .collect(),
            Err(e) => {
                log::warn!("Listing local storage keys failed: {}", e);
                Vec::new()
            }
        }
    }

    /// Every namespaced entry with its decoded value
    pub fn namespaced_entries(&self) -> Vec<(StoreKey, Value)> {
        self.scan(StoreKey::is_namespaced)
            .into_iter()
            .map(|key| {
                let value = self.get_value(&key);
                (key, value)
            })
            .collect()
    }

    /// Delete every owned key matching `predicate`, returning how many went
    pub fn delete_where(&mut self, predicate: impl Fn(&StoreKey) -> bool) -> usize {
        let doomed = self.scan(predicate);
        for key in &doomed {
            self.delete(key);
        }
        doomed.len()
    }

    pub fn clear(&mut self) {
        match self.backend.clear() {
            Ok(()) => log::info!("Local storage cleared"),
            Err(e) => log::warn!("Clearing local storage failed: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::KeyKind;
    use serde_json::json;

    /// Backend whose every call fails
    struct BrokenStore;

    impl KeyValueStore for BrokenStore {
        fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
            Err(StorageError::Unavailable)
        }
        fn set(&mut self, _key: &str, _value: &str) -> Result<(), StorageError> {
            Err(StorageError::Unavailable)
        }
        fn remove(&mut self, _key: &str) -> Result<(), StorageError> {
            Err(StorageError::Unavailable)
        }
        fn keys(&self) -> Result<Vec<String>, StorageError> {
            Err(StorageError::Unavailable)
        }
        fn clear(&mut self) -> Result<(), StorageError> {
            Err(StorageError::Unavailable)
        }
    }

    #[test]
    fn test_values_are_json_encoded() {
        let mut repo = Repository::new(MemoryStore::new());
        repo.set(&StoreKey::employees("NICE"), &vec!["ANNA", "BOB"]);
        assert_eq!(
            repo.backend().entries().get("employees_NICE").map(String::as_str),
            Some(r#"["ANNA","BOB"]"#)
        );
        let roster: Vec<String> = repo.get(&StoreKey::employees("NICE"), Vec::new());
        assert_eq!(roster, vec!["ANNA", "BOB"]);
    }

    #[test]
    fn test_corrupt_value_falls_back_to_default() {
        let mut backend = MemoryStore::new();
        backend.set("shops", "not json").unwrap();
        let repo = Repository::new(backend);
        let shops: Vec<String> = repo.get(&StoreKey::shops(), vec!["DEFAULT".into()]);
        assert_eq!(shops, vec!["DEFAULT"]);
        assert_eq!(repo.get_value(&StoreKey::shops()), Value::Null);
    }

    #[test]
    fn test_broken_backend_is_masked() {
        let mut repo = Repository::new(BrokenStore);
        repo.set(&StoreKey::shops(), &json!(["NICE"]));
        repo.delete(&StoreKey::shops());
        repo.clear();
        let shops: Vec<String> = repo.get(&StoreKey::shops(), Vec::new());
        assert!(shops.is_empty());
        assert!(repo.namespaced_entries().is_empty());
    }

    #[test]
    fn test_namespaced_entries_skip_flat_and_foreign_keys() {
        let mut backend = MemoryStore::new();
        backend.set("shops", r#"["NICE"]"#).unwrap();
        backend.set("some_other_app", "1").unwrap();
        backend.set("planning_NICE_2025-07-07", r#"{"ANNA":{}}"#).unwrap();
        let repo = Repository::new(backend);

        let entries = repo.namespaced_entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].0.kind, KeyKind::Planning);
        assert_eq!(entries[0].1, json!({"ANNA": {}}));
    }

    #[test]
    fn test_delete_where_counts_removed_keys() {
        let mut repo = Repository::new(MemoryStore::new());
        repo.set(&StoreKey::planning("NICE", "2025-07-07"), &json!({}));
        repo.set(&StoreKey::planning("NICE", "2025-07-14"), &json!({}));
        repo.set(&StoreKey::planning("CANNES", "2025-07-07"), &json!({}));

        let removed = repo.delete_where(|k| k.kind == KeyKind::Planning && k.belongs_to_shop("NICE"));
        assert_eq!(removed, 2);
        assert_eq!(repo.backend().len(), 1);
    }
}
