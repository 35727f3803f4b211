//! Import parsing

use serde_json::Value;

use super::validate::validate;
use crate::error::{ImportError, ValidationIssue};
use crate::persistence::Document;

/// Parse and validate an import file. Nothing is applied here; on `Ok` the
/// document is safe to apply as a whole.
pub fn prepare(text: &str) -> Result<Document, ImportError> {
    let value: Value = serde_json::from_str(text).map_err(ImportError::Parse)?;

    let issues = validate(&value);
    if !issues.is_empty() {
        return Err(ImportError::Rejected(issues));
    }

    Document::from_value(value).ok_or_else(|| ImportError::Rejected(vec![ValidationIssue::NotAnObject]))
}
