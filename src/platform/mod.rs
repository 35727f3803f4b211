//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Storage (LocalStorage on web, memory elsewhere)
//! - Remote mirror transport (fetch on web)
//! - Task spawning for fire-and-forget remote writes
//! - Current date, page teardown and file download

#[cfg(target_arch = "wasm32")]
pub mod browser;
#[cfg(not(target_arch = "wasm32"))]
pub mod native;

#[cfg(target_arch = "wasm32")]
pub use browser::{BrowserSpawner, FirebaseMirror, LocalStorageStore, download, init_logging, on_unload, today};
#[cfg(not(target_arch = "wasm32"))]
pub use native::{TaskQueue, init_logging, today};
