//! Import schema checks
//!
//! Every key is checked; all issues are collected so the user sees the whole
//! list at once.

use serde_json::Value;

use crate::consts::SHOPS_KEY;
use crate::error::ValidationIssue;
use crate::persistence::{KeyKind, StoreKey};
use crate::wizard::is_week;

/// Schema issues of a parsed import document, empty when it may be applied
pub fn validate(value: &Value) -> Vec<ValidationIssue> {
    let Value::Object(doc) = value else {
        return vec![ValidationIssue::NotAnObject];
    };

    let mut issues = Vec::new();
    for (name, field) in doc {
        let Some(key) = StoreKey::parse(name) else {
            issues.push(ValidationIssue::UnrecognizedKey(name.clone()));
            continue;
        };

        match key.kind {
            KeyKind::Shops => match text_list(field) {
                None => issues.push(ValidationIssue::ShopsNotSequence),
                Some(false) => issues.push(ValidationIssue::NonTextEntries(name.clone())),
                Some(true) => {}
            },
            KeyKind::SelectedWeek => {
                if let Some(issue) = check_week(field) {
                    issues.push(issue);
                }
            }
            KeyKind::TimeSlotConfig if !config_complete(field) => {
                issues.push(ValidationIssue::IncompleteTimeSlotConfig)
            }
            KeyKind::SelectedShop => match field {
                Value::Null => {}
                Value::String(shop) if shop.is_empty() || shop_listed(doc.get(SHOPS_KEY), shop) => {}
                Value::String(shop) => issues.push(ValidationIssue::UnknownSelectedShop(shop.clone())),
                other => issues.push(ValidationIssue::UnknownSelectedShop(other.to_string())),
            },
            KeyKind::Employees => match text_list(field) {
                None => issues.push(ValidationIssue::EmployeesNotSequence(name.clone())),
                Some(false) => issues.push(ValidationIssue::NonTextEntries(name.clone())),
                Some(true) => {}
            },
            KeyKind::SelectedEmployees => match text_list(field) {
                None => issues.push(ValidationIssue::SelectedEmployeesNotSequence(name.clone())),
                Some(false) => issues.push(ValidationIssue::NonTextEntries(name.clone())),
                Some(true) => {}
            },
            _ => {}
        }
    }
    issues
}

/// An empty or null week is "not chosen yet"
fn check_week(field: &Value) -> Option<ValidationIssue> {
    match field {
        Value::Null => None,
        Value::String(week) if week.is_empty() || is_week(week) => None,
        Value::String(week) => Some(ValidationIssue::SelectedWeekFormat(week.clone())),
        other => Some(ValidationIssue::SelectedWeekFormat(other.to_string())),
    }
}

/// `{}` and `null` mean "not configured"; anything else needs all four fields
fn config_complete(field: &Value) -> bool {
    let config = match field {
        Value::Null => return true,
        Value::Object(map) if map.is_empty() => return true,
        Value::Object(map) => map,
        _ => return false,
    };

    let interval_ok = config
        .get("interval")
        .and_then(Value::as_u64)
        .is_some_and(|minutes| minutes > 0 && minutes <= u64::from(u32::MAX));
    let text_ok = |name: &str| config.get(name).and_then(Value::as_str).is_some_and(|s| !s.is_empty());
    let slots_ok = config.get("timeSlots").and_then(text_list) == Some(true);

    interval_ok && text_ok("startTime") && text_ok("endTime") && slots_ok
}

/// `None` when `field` is not an array, otherwise whether every entry is a string
fn text_list(field: &Value) -> Option<bool> {
    field.as_array().map(|items| items.iter().all(Value::is_string))
}

fn shop_listed(shops: Option<&Value>, shop: &str) -> bool {
    shops
        .and_then(Value::as_array)
        .is_some_and(|shops| shops.iter().any(|s| s.as_str() == Some(shop)))
}
