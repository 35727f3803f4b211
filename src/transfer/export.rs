//! Export file

use chrono::NaiveDate;

use crate::consts::{EXPORT_FILE_EXTENSION, EXPORT_FILE_PREFIX, WEEK_FORMAT};
use crate::persistence::Document;

/// A file ready to be handed to the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportFile {
    pub file_name: String,
    pub contents: String,
}

/// `planning_export_<yyyy-MM-dd>.json`
pub fn export_file_name(today: NaiveDate) -> String {
    format!(
        "{}{}.{}",
        EXPORT_FILE_PREFIX,
        today.format(WEEK_FORMAT),
        EXPORT_FILE_EXTENSION
    )
}

pub fn export_document(doc: &Document, today: NaiveDate) -> Result<ExportFile, serde_json::Error> {
    let contents = serde_json::to_string_pretty(doc)?;
    log::info!("Exporting {} keys ({} bytes)", doc.len(), contents.len());
    Ok(ExportFile {
        file_name: export_file_name(today),
        contents,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_file_name_carries_the_date() {
        let today = NaiveDate::from_ymd_opt(2025, 7, 3).unwrap();
        assert_eq!(export_file_name(today), "planning_export_2025-07-03.json");
    }

    #[test]
    fn test_contents_are_pretty_printed() {
        let mut doc = Document::new();
        doc.insert("shops", json!(["NICE"]));
        let today = NaiveDate::from_ymd_opt(2025, 7, 3).unwrap();
        let file = export_document(&doc, today).unwrap();
        assert_eq!(file.contents, "{\n  \"shops\": [\n    \"NICE\"\n  ]\n}");
    }
}
