//! Wizard model and the planning readiness predicate
//!
//! Only the four flat fields live in memory. Rosters, selections and planning
//! grids stay in the local store, addressed by shop and week.

use chrono::{Duration, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::consts::{
    SELECTED_SHOP_KEY, SELECTED_WEEK_KEY, SHOPS_KEY, TIME_SLOT_CONFIG_KEY, WEEK_FORMAT,
};
use crate::error::ConfigError;
use crate::persistence::Document;

/// Slot grid configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeSlotConfig {
    /// Slot length in minutes
    pub interval: u32,
    /// `HH:MM`
    pub start_time: String,
    /// `HH:MM`
    pub end_time: String,
    #[serde(default)]
    pub time_slots: Vec<String>,
}

impl TimeSlotConfig {
    /// Build a configuration, enumerating slots from `start` (inclusive) to
    /// `end` (exclusive) every `interval` minutes.
    pub fn generate(interval: u32, start: &str, end: &str) -> Result<Self, ConfigError> {
        if interval == 0 {
            return Err(ConfigError::ZeroInterval);
        }
        let parse = |s: &str| {
            NaiveTime::parse_from_str(s, "%H:%M").map_err(|_| ConfigError::BadTime(s.to_string()))
        };
        let (first, last) = (parse(start)?, parse(end)?);
        if last <= first {
            return Err(ConfigError::EmptyRange);
        }

        let step = Duration::minutes(i64::from(interval));
        let mut time_slots = Vec::new();
        let mut slot = first;
        while slot < last {
            time_slots.push(slot.format("%H:%M").to_string());
            let (next, wrapped) = slot.overflowing_add_signed(step);
            if wrapped != 0 {
                break;
            }
            slot = next;
        }

        Ok(Self {
            interval,
            start_time: start.to_string(),
            end_time: end.to_string(),
            time_slots,
        })
    }

    /// A configuration the planning grid can be built from
    pub fn is_valid(&self) -> bool {
        self.interval > 0 && !self.time_slots.is_empty()
    }
}

/// The flat, in-memory part of the wizard state
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppState {
    /// Registered shops, in insertion order
    pub shops: Vec<String>,
    /// Active shop, empty when none
    pub selected_shop: String,
    /// Week being planned (`yyyy-MM-dd`), empty until chosen
    pub selected_week: String,
    pub time_slot_config: Option<TimeSlotConfig>,
}

impl AppState {
    pub fn has_shop(&self, shop: &str) -> bool {
        self.shops.iter().any(|s| s == shop)
    }

    /// Wire form of the configuration; an unset one is `{}`
    pub fn config_value(&self) -> Value {
        match &self.time_slot_config {
            Some(config) => serde_json::to_value(config).unwrap_or_else(|_| Value::Object(Default::default())),
            None => Value::Object(Default::default()),
        }
    }

    /// Lenient decode: `{}`, `null` or anything malformed is "no configuration"
    pub fn config_from_value(value: &Value) -> Option<TimeSlotConfig> {
        match value {
            Value::Null => None,
            Value::Object(map) if map.is_empty() => None,
            other => match TimeSlotConfig::deserialize(other) {
                Ok(config) => Some(config),
                Err(e) => {
                    log::warn!("Ignoring unreadable time slot configuration: {}", e);
                    None
                }
            },
        }
    }

    /// Flat fields of a mirrored or imported document. Missing or malformed
    /// fields keep their defaults.
    pub fn from_document(doc: &Document) -> Self {
        fn field<T: serde::de::DeserializeOwned + Default>(doc: &Document, name: &str) -> T {
            match doc.get(name) {
                None | Some(Value::Null) => T::default(),
                Some(value) => T::deserialize(value).unwrap_or_else(|e| {
                    log::warn!("Ignoring malformed `{}`: {}", name, e);
                    T::default()
                }),
            }
        }

        Self {
            shops: field(doc, SHOPS_KEY),
            selected_shop: field(doc, SELECTED_SHOP_KEY),
            selected_week: field(doc, SELECTED_WEEK_KEY),
            time_slot_config: doc
                .get(TIME_SLOT_CONFIG_KEY)
                .and_then(Self::config_from_value),
        }
    }
}

/// Inputs of the planning gate, gathered from memory and the local store
#[derive(Debug, Clone, Copy)]
pub struct Readiness<'a> {
    pub config: Option<&'a TimeSlotConfig>,
    pub shop: &'a str,
    pub week: &'a str,
    pub selected_employees: &'a [String],
}

impl Readiness<'_> {
    pub fn config_ready(&self) -> bool {
        self.config.is_some_and(TimeSlotConfig::is_valid)
    }
}

/// Whether the planning screen may be shown: valid configuration, a shop, a
/// week and at least one employee selected for that shop and week.
pub fn is_planning_reachable(readiness: &Readiness<'_>) -> bool {
    readiness.config_ready()
        && !readiness.shop.is_empty()
        && !readiness.week.is_empty()
        && !readiness.selected_employees.is_empty()
}

/// Trimmed, uppercased display name; `None` when blank
pub fn normalize_name(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_uppercase())
}

/// Exactly `yyyy-MM-dd` and a real calendar date
pub fn is_week(raw: &str) -> bool {
    raw.len() == 10
        && raw.bytes().enumerate().all(|(i, b)| match i {
            4 | 7 => b == b'-',
            _ => b.is_ascii_digit(),
        })
        && NaiveDate::parse_from_str(raw, WEEK_FORMAT).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn config() -> TimeSlotConfig {
        TimeSlotConfig::generate(30, "09:00", "11:00").unwrap()
    }

    #[test]
    fn test_generate_slots() {
        let config = config();
        assert_eq!(config.time_slots, vec!["09:00", "09:30", "10:00", "10:30"]);
        assert!(config.is_valid());
    }

    #[test]
    fn test_generate_rejects_bad_input() {
        assert_eq!(TimeSlotConfig::generate(0, "09:00", "10:00"), Err(ConfigError::ZeroInterval));
        assert_eq!(
            TimeSlotConfig::generate(15, "9h", "10:00"),
            Err(ConfigError::BadTime("9h".into()))
        );
        assert_eq!(TimeSlotConfig::generate(15, "10:00", "09:00"), Err(ConfigError::EmptyRange));
    }

    #[test]
    fn test_generate_stops_at_midnight() {
        let config = TimeSlotConfig::generate(60, "22:00", "23:59").unwrap();
        assert_eq!(config.time_slots, vec!["22:00", "23:00"]);
    }

    #[test]
    fn test_config_wire_form() {
        let state = AppState::default();
        assert_eq!(state.config_value(), json!({}));
        assert_eq!(AppState::config_from_value(&json!({})), None);
        assert_eq!(AppState::config_from_value(&json!({"interval": "x"})), None);

        let state = AppState {
            time_slot_config: Some(config()),
            ..AppState::default()
        };
        assert_eq!(state.config_value()["startTime"], json!("09:00"));
        assert_eq!(AppState::config_from_value(&state.config_value()), Some(config()));
    }

    #[test]
    fn test_from_document_is_lenient() {
        let mut doc = Document::new();
        doc.insert("shops", json!("not a list"));
        doc.insert("selectedShop", json!("NICE"));
        let state = AppState::from_document(&doc);
        assert!(state.shops.is_empty());
        assert_eq!(state.selected_shop, "NICE");
        assert_eq!(state.selected_week, "");
        assert!(state.time_slot_config.is_none());
    }

    #[test]
    fn test_planning_reachable_needs_every_precondition() {
        let config = config();
        let employees = vec!["ANNA".to_string()];
        let full = Readiness {
            config: Some(&config),
            shop: "NICE",
            week: "2025-07-07",
            selected_employees: &employees,
        };
        assert!(is_planning_reachable(&full));

        let invalid = TimeSlotConfig {
            time_slots: Vec::new(),
            ..config.clone()
        };
        assert!(!is_planning_reachable(&Readiness { config: None, ..full }));
        assert!(!is_planning_reachable(&Readiness { config: Some(&invalid), ..full }));
        assert!(!is_planning_reachable(&Readiness { shop: "", ..full }));
        assert!(!is_planning_reachable(&Readiness { week: "", ..full }));
        assert!(!is_planning_reachable(&Readiness { selected_employees: &[], ..full }));
    }

    #[test]
    fn test_normalize_name() {
        assert_eq!(normalize_name("  port grimaud "), Some("PORT GRIMAUD".into()));
        assert_eq!(normalize_name("   "), None);
    }

    #[test]
    fn test_week_format() {
        assert!(is_week("2025-07-07"));
        assert!(!is_week("07-07-2025"));
        assert!(!is_week("2025-7-7"));
        assert!(!is_week("2025-02-30"));
        assert!(!is_week(""));
    }
}
