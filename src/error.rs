//! Error types
//!
//! Nothing here is fatal. Storage and remote failures are logged and masked at
//! the point of access; only import and wizard input errors reach the caller.

use thiserror::Error;

/// Local key-value store failure.
#[derive(Debug, Error)]
pub enum StorageError {
    /// No storage backend (private browsing, disabled storage).
    #[error("local storage is unavailable")]
    Unavailable,

    /// The backend rejected an operation (quota, security error).
    #[error("failed to {operation} `{key}`: {reason}")]
    Backend {
        operation: &'static str,
        key: String,
        reason: String,
    },

    /// A stored value is not the JSON we expected.
    #[error("value stored under `{key}` could not be decoded")]
    Decode {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("value for `{key}` could not be encoded")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Remote mirror failure.
#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("remote mirror is not configured")]
    Unavailable,

    #[error("remote request failed: {0}")]
    Request(String),

    #[error("remote mirror answered with HTTP {status}")]
    Status { status: u16 },

    #[error("remote document could not be decoded")]
    Decode {
        #[source]
        source: serde_json::Error,
    },

    #[error("document could not be encoded for the remote mirror")]
    Encode {
        #[source]
        source: serde_json::Error,
    },
}

/// A single schema violation found in an imported document.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationIssue {
    #[error("document must be a JSON object")]
    NotAnObject,

    #[error("unrecognized key: {0}")]
    UnrecognizedKey(String),

    #[error("shops must be an array")]
    ShopsNotSequence,

    #[error("selectedWeek must use the yyyy-MM-dd format (got `{0}`)")]
    SelectedWeekFormat(String),

    #[error("timeSlotConfig must contain interval, startTime, endTime and a timeSlots array")]
    IncompleteTimeSlotConfig,

    #[error("selectedShop `{0}` is not one of the shops")]
    UnknownSelectedShop(String),

    #[error("employees ({0}) must be an array")]
    EmployeesNotSequence(String),

    #[error("selected employees ({0}) must be an array")]
    SelectedEmployeesNotSequence(String),

    #[error("{0} must only contain names")]
    NonTextEntries(String),
}

/// Import failure. The import is all-or-nothing: nothing is applied on error.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("the file is not a readable JSON document")]
    Parse(#[source] serde_json::Error),

    #[error("the document failed validation ({} issue(s))", .0.len())]
    Rejected(Vec<ValidationIssue>),
}

impl ImportError {
    /// Message shown to the user, one line per validation issue.
    pub fn user_message(&self) -> String {
        match self {
            Self::Parse(_) => "Unable to read the JSON file.".to_string(),
            Self::Rejected(issues) => {
                let mut message = String::from("The imported data contains errors:");
                for issue in issues {
                    message.push('\n');
                    message.push_str(&issue.to_string());
                }
                message
            }
        }
    }

    /// Validation issues, empty for parse errors.
    pub fn issues(&self) -> &[ValidationIssue] {
        match self {
            Self::Parse(_) => &[],
            Self::Rejected(issues) => issues,
        }
    }
}

/// Time slot configuration could not be built.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("interval must be greater than zero")]
    ZeroInterval,

    #[error("`{0}` is not a valid HH:MM time")]
    BadTime(String),

    #[error("end time must be after start time")]
    EmptyRange,

    #[error("configuration needs an interval and at least one time slot")]
    Incomplete,
}

/// Rejected wizard input. The collaborator screen shows the message; the
/// wizard state is left untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WizardError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("please enter a valid name")]
    EmptyName,

    #[error("shop `{0}` already exists")]
    DuplicateShop(String),

    #[error("shop `{0}` does not exist")]
    UnknownShop(String),

    #[error("employee `{0}` already exists")]
    DuplicateEmployee(String),

    #[error("`{0}` is not a yyyy-MM-dd date")]
    InvalidWeek(String),

    #[error("no shop selected")]
    NoShopSelected,

    #[error("no week selected")]
    NoWeekSelected,

    #[error("please select at least one employee")]
    NoEmployeesSelected,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejected_import_lists_every_issue() {
        let err = ImportError::Rejected(vec![
            ValidationIssue::UnrecognizedKey("foo".into()),
            ValidationIssue::ShopsNotSequence,
        ]);
        let message = err.user_message();
        assert!(message.contains("unrecognized key: foo"));
        assert!(message.contains("shops must be an array"));
        assert_eq!(message.lines().count(), 3);
    }

    #[test]
    fn test_parse_error_has_no_issues() {
        let source = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = ImportError::Parse(source);
        assert!(err.issues().is_empty());
        assert_eq!(err.user_message(), "Unable to read the JSON file.");
    }
}
