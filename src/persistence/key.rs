//! Typed composite keys for the local store
//!
//! The string layout is shared with the remote document and the export file:
//! four flat names plus `<prefix><shop>[_<week>]` for namespaced entries.

use std::fmt;

use crate::consts::{SELECTED_SHOP_KEY, SELECTED_WEEK_KEY, SHOPS_KEY, TIME_SLOT_CONFIG_KEY};

/// What a key stores
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum KeyKind {
    Shops,
    SelectedShop,
    SelectedWeek,
    TimeSlotConfig,
    /// Roster of a shop
    Employees,
    /// Employees working a given week in a shop
    SelectedEmployees,
    /// Assignment grid of a shop and week
    Planning,
    /// Clipboard snapshot of a planning
    Copied,
    /// Last-used week marker of a shop
    LastPlanning,
}

impl KeyKind {
    /// Namespaced kinds, in the order they are matched while parsing
    pub const NAMESPACED: [KeyKind; 5] = [
        KeyKind::SelectedEmployees,
        KeyKind::Employees,
        KeyKind::Planning,
        KeyKind::Copied,
        KeyKind::LastPlanning,
    ];

    pub const FLAT: [KeyKind; 4] = [
        KeyKind::Shops,
        KeyKind::SelectedShop,
        KeyKind::SelectedWeek,
        KeyKind::TimeSlotConfig,
    ];

    /// String prefix of a namespaced kind
    pub fn prefix(&self) -> Option<&'static str> {
        match self {
            KeyKind::Employees => Some("employees_"),
            KeyKind::SelectedEmployees => Some("selected_employees_"),
            KeyKind::Planning => Some("planning_"),
            KeyKind::Copied => Some("copied_"),
            KeyKind::LastPlanning => Some("lastPlanning_"),
            _ => None,
        }
    }

    /// Name of a flat kind
    pub fn flat_name(&self) -> Option<&'static str> {
        match self {
            KeyKind::Shops => Some(SHOPS_KEY),
            KeyKind::SelectedShop => Some(SELECTED_SHOP_KEY),
            KeyKind::SelectedWeek => Some(SELECTED_WEEK_KEY),
            KeyKind::TimeSlotConfig => Some(TIME_SLOT_CONFIG_KEY),
            _ => None,
        }
    }

    pub fn is_namespaced(&self) -> bool {
        self.prefix().is_some()
    }

    /// Whether the remainder after the prefix carries a week suffix
    pub fn is_week_scoped(&self) -> bool {
        matches!(
            self,
            KeyKind::SelectedEmployees | KeyKind::Planning | KeyKind::Copied
        )
    }
}

/// A key of the local store: `{ kind, shop?, week? }`
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StoreKey {
    pub kind: KeyKind,
    pub shop: Option<String>,
    pub week: Option<String>,
}

impl StoreKey {
    fn flat(kind: KeyKind) -> Self {
        Self {
            kind,
            shop: None,
            week: None,
        }
    }

    fn per_shop(kind: KeyKind, shop: &str) -> Self {
        Self {
            kind,
            shop: Some(shop.to_string()),
            week: None,
        }
    }

    fn per_week(kind: KeyKind, shop: &str, week: &str) -> Self {
        Self {
            kind,
            shop: Some(shop.to_string()),
            week: Some(week.to_string()),
        }
    }

    pub fn shops() -> Self {
        Self::flat(KeyKind::Shops)
    }

    pub fn selected_shop() -> Self {
        Self::flat(KeyKind::SelectedShop)
    }

    pub fn selected_week() -> Self {
        Self::flat(KeyKind::SelectedWeek)
    }

    pub fn time_slot_config() -> Self {
        Self::flat(KeyKind::TimeSlotConfig)
    }

    pub fn employees(shop: &str) -> Self {
        Self::per_shop(KeyKind::Employees, shop)
    }

    pub fn selected_employees(shop: &str, week: &str) -> Self {
        Self::per_week(KeyKind::SelectedEmployees, shop, week)
    }

    pub fn planning(shop: &str, week: &str) -> Self {
        Self::per_week(KeyKind::Planning, shop, week)
    }

    pub fn copied(shop: &str, week: &str) -> Self {
        Self::per_week(KeyKind::Copied, shop, week)
    }

    pub fn last_planning(shop: &str) -> Self {
        Self::per_shop(KeyKind::LastPlanning, shop)
    }

    /// Parse a raw store key. Returns `None` for keys this application does not own.
    pub fn parse(raw: &str) -> Option<Self> {
        if let Some(kind) = KeyKind::FLAT.iter().find(|k| k.flat_name() == Some(raw)) {
            return Some(Self::flat(*kind));
        }

        for kind in KeyKind::NAMESPACED {
            let Some(rest) = kind.prefix().and_then(|p| raw.strip_prefix(p)) else {
                continue;
            };
            if kind.is_week_scoped() {
                if let Some((shop, week)) = rest.rsplit_once('_') {
                    return Some(Self::per_week(kind, shop, week));
                }
            }
            return Some(Self::per_shop(kind, rest));
        }

        None
    }

    pub fn is_namespaced(&self) -> bool {
        self.kind.is_namespaced()
    }

    /// Exact shop match; `S` does not own the keys of `S_X`.
    pub fn belongs_to_shop(&self, shop: &str) -> bool {
        self.shop.as_deref() == Some(shop)
    }
}

impl fmt::Display for StoreKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(name) = self.kind.flat_name() {
            return f.write_str(name);
        }
        f.write_str(self.kind.prefix().unwrap_or_default())?;
        if let Some(shop) = &self.shop {
            f.write_str(shop)?;
        }
        if let Some(week) = &self.week {
            write!(f, "_{}", week)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_key_layout() {
        assert_eq!(StoreKey::shops().to_string(), "shops");
        assert_eq!(StoreKey::time_slot_config().to_string(), "timeSlotConfig");
        assert_eq!(StoreKey::employees("PORT GRIMAUD").to_string(), "employees_PORT GRIMAUD");
        assert_eq!(
            StoreKey::selected_employees("PORT GRIMAUD", "2025-07-07").to_string(),
            "selected_employees_PORT GRIMAUD_2025-07-07"
        );
        assert_eq!(
            StoreKey::last_planning("PORT GRIMAUD").to_string(),
            "lastPlanning_PORT GRIMAUD"
        );
    }

    #[test]
    fn test_parse_week_scoped_splits_on_last_underscore() {
        let key = StoreKey::parse("planning_SAINT_TROPEZ_2025-07-14").unwrap();
        assert_eq!(key.kind, KeyKind::Planning);
        assert_eq!(key.shop.as_deref(), Some("SAINT_TROPEZ"));
        assert_eq!(key.week.as_deref(), Some("2025-07-14"));
    }

    #[test]
    fn test_parse_distinguishes_employee_prefixes() {
        let roster = StoreKey::parse("employees_NICE").unwrap();
        assert_eq!(roster.kind, KeyKind::Employees);
        let selected = StoreKey::parse("selected_employees_NICE_2025-07-07").unwrap();
        assert_eq!(selected.kind, KeyKind::SelectedEmployees);
        let last = StoreKey::parse("lastPlanning_NICE").unwrap();
        assert_eq!(last.kind, KeyKind::LastPlanning);
    }

    #[test]
    fn test_parse_unknown_keys() {
        assert!(StoreKey::parse("foo").is_none());
        assert!(StoreKey::parse("Shops").is_none());
        assert!(StoreKey::parse("theme_settings").is_none());
    }

    #[test]
    fn test_shop_ownership_is_exact() {
        let key = StoreKey::parse("planning_S_X_2025-07-07").unwrap();
        assert!(key.belongs_to_shop("S_X"));
        assert!(!key.belongs_to_shop("S"));
    }

    proptest! {
        #[test]
        fn prop_parse_then_format_is_lossless(
            prefix in prop::sample::select(vec![
                "employees_", "selected_employees_", "planning_", "copied_", "lastPlanning_",
            ]),
            rest in "[A-Z _0-9-]{0,24}",
        ) {
            let raw = format!("{}{}", prefix, rest);
            let key = StoreKey::parse(&raw).unwrap();
            prop_assert_eq!(key.to_string(), raw);
        }
    }
}
