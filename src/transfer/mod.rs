//! Import and export of the whole application state
//!
//! Export writes the merged state document as a dated, pretty-printed JSON
//! file. Import parses a file, validates every key and only then hands the
//! document over for an all-or-nothing apply.

pub mod export;
pub mod import;
pub mod validate;

pub use export::{ExportFile, export_document, export_file_name};
pub use import::prepare;
pub use validate::validate;
