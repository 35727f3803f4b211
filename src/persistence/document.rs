//! The merged state document
//!
//! One JSON object shared by the remote mirror, the export file and the import
//! path: `{ shops, selectedShop, selectedWeek, timeSlotConfig, <namespaced keys>... }`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::key::StoreKey;
use crate::consts::{SELECTED_SHOP_KEY, SELECTED_WEEK_KEY, SHOPS_KEY, TIME_SLOT_CONFIG_KEY};
use crate::wizard::AppState;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Document(Map<String, Value>);

impl Document {
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Build the document from the in-memory flat fields and the namespaced
    /// entries currently held by the local store.
    pub fn assemble(state: &AppState, entries: Vec<(StoreKey, Value)>) -> Self {
        let mut doc = Self::new();
        doc.insert(SHOPS_KEY, Value::from(state.shops.clone()));
        doc.insert(SELECTED_SHOP_KEY, Value::from(state.selected_shop.clone()));
        doc.insert(SELECTED_WEEK_KEY, Value::from(state.selected_week.clone()));
        doc.insert(TIME_SLOT_CONFIG_KEY, state.config_value());
        for (key, value) in entries {
            doc.insert(key.to_string(), value);
        }
        doc
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        self.0.insert(key.into(), value);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }

    /// Wrap a parsed JSON value; `None` unless it is an object
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Self(map)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_assemble_merges_flat_fields_and_entries() {
        let state = AppState {
            shops: vec!["NICE".into()],
            selected_shop: "NICE".into(),
            selected_week: "2025-07-07".into(),
            time_slot_config: None,
        };
        let entries = vec![(StoreKey::employees("NICE"), json!(["ANNA"]))];
        let doc = Document::assemble(&state, entries);

        assert_eq!(doc.len(), 5);
        assert_eq!(doc.get("shops"), Some(&json!(["NICE"])));
        assert_eq!(doc.get("timeSlotConfig"), Some(&json!({})));
        assert_eq!(doc.get("employees_NICE"), Some(&json!(["ANNA"])));
    }

    #[test]
    fn test_from_value_requires_object() {
        assert!(Document::from_value(json!([1, 2])).is_none());
        assert!(Document::from_value(json!({"shops": []})).is_some());
    }
}
