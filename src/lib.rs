//! Shift Planner - weekly shift planning wizard for retail shops
//!
//! Core modules:
//! - `wizard`: State model, step state machine and the session driving them
//! - `persistence`: Local store, remote mirror and the bridge between them
//! - `transfer`: JSON export and validated import of the whole state
//! - `platform`: Browser/native platform abstraction
//! - `settings`: Remote mirror and logging configuration

pub mod error;
pub mod persistence;
pub mod platform;
pub mod settings;
pub mod transfer;
pub mod wizard;

#[cfg(target_arch = "wasm32")]
pub mod web;

pub use error::{ConfigError, ImportError, RemoteError, StorageError, ValidationIssue, WizardError};
pub use persistence::{Document, KeyValueStore, MemoryMirror, MemoryStore, RemoteQueue, StoreKey};
pub use settings::{Settings, Verbosity};
pub use wizard::{AppState, Step, TimeSlotConfig, Wizard};

/// Storage layout and file naming constants
pub mod consts {
    /// Key of the single document held by the remote mirror
    pub const REMOTE_DOCUMENT_KEY: &str = "planning-data";

    /// Flat top-level keys
    pub const SHOPS_KEY: &str = "shops";
    pub const SELECTED_SHOP_KEY: &str = "selectedShop";
    pub const SELECTED_WEEK_KEY: &str = "selectedWeek";
    pub const TIME_SLOT_CONFIG_KEY: &str = "timeSlotConfig";

    /// Export file name: `planning_export_<date>.json`
    pub const EXPORT_FILE_PREFIX: &str = "planning_export_";
    pub const EXPORT_FILE_EXTENSION: &str = "json";

    /// Week identifiers and export dates
    pub const WEEK_FORMAT: &str = "%Y-%m-%d";
}
