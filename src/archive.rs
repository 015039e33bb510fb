//! JSON export and import of a whole collection.
//!
//! The document layout is `{ "binders": [...], "darkMode": bool, "exportDate": "..." }`
//! with every image embedded as a data URI, so one file carries everything.

use crate::binder::Binder;
use crate::collection::Collection;
use crate::error::BinderError;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ExportDocument<'a> {
    binders: &'a [Binder],
    dark_mode: bool,
    export_date: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ImportDocument {
    #[serde(default)]
    binders: Option<Vec<Binder>>,
    #[serde(default)]
    dark_mode: Option<bool>,
}

/// A successfully parsed import, ready to replace the live collection.
#[derive(Debug)]
pub struct Archive {
    pub collection: Collection,
    pub dark_mode: Option<bool>,
}

/// Default file name offered when exporting on `date`.
pub fn export_file_name(date: DateTime<Utc>) -> String {
    format!("digital_binders_{}.json", date.format("%Y-%m-%d"))
}

pub fn export_to_string(
    collection: &Collection,
    dark_mode: bool,
    exported_at: DateTime<Utc>,
) -> Result<String, BinderError> {
    let document = ExportDocument {
        binders: collection.binders(),
        dark_mode,
        export_date: exported_at.to_rfc3339_opts(SecondsFormat::Millis, true),
    };
    Ok(serde_json::to_string_pretty(&document)?)
}

pub fn export_to_path(
    path: &Path,
    collection: &Collection,
    dark_mode: bool,
) -> Result<(), BinderError> {
    let json = export_to_string(collection, dark_mode, Utc::now())?;
    let mut writer = BufWriter::new(File::create(path)?);
    writer.write_all(json.as_bytes())?;
    writer.flush()?;
    log::info!(
        "Exported {} binders to {}",
        collection.len(),
        path.display()
    );
    Ok(())
}

/// Parses an exported document.
///
/// Returns `Ok(None)` for well-formed JSON without a `binders` field; such files are
/// ignored rather than reported.
pub fn import_from_str(text: &str) -> Result<Option<Archive>, BinderError> {
    let document: ImportDocument = serde_json::from_str(text)?;
    let Some(binders) = document.binders else {
        return Ok(None);
    };
    let collection = Collection::from_binders(binders)?;
    Ok(Some(Archive {
        collection,
        dark_mode: document.dark_mode,
    }))
}

pub fn import_from_path(path: &Path) -> Result<Option<Archive>, BinderError> {
    let text = std::fs::read_to_string(path)?;
    import_from_str(&text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_collection() -> Collection {
        let mut collection = Collection::new();
        collection
            .add_image(0, 0, "data:image/png;base64,AAAA".into())
            .unwrap();
        collection
            .add_image(0, 0, "data:image/png;base64,BBBB".into())
            .unwrap();
        collection.set_active_image(0, 0, 1).unwrap();
        collection.set_caption(0, 0, "First").unwrap();
        collection.create_binder("Second");
        collection
            .add_image(19, 8, "data:image/jpeg;base64,CCCC".into())
            .unwrap();
        collection.set_caption(19, 8, "Last ✓").unwrap();
        collection
    }

    fn fixed_date() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 9, 14, 30, 0).unwrap()
    }

    #[test]
    fn test_export_file_name() {
        assert_eq!(
            export_file_name(fixed_date()),
            "digital_binders_2024-03-09.json"
        );
    }

    #[test]
    fn test_export_document_layout() {
        let json = export_to_string(&Collection::new(), true, fixed_date()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["darkMode"], true);
        assert_eq!(value["exportDate"], "2024-03-09T14:30:00.000Z");
        assert_eq!(value["binders"][0]["name"], "My Collection");
        let slot = &value["binders"][0]["pages"][0][0];
        assert_eq!(slot["images"], serde_json::json!([]));
        assert_eq!(slot["caption"], "");
        assert_eq!(slot["activeImageIndex"], 0);
    }

    #[test]
    fn test_round_trip_restores_everything() {
        let original = sample_collection();
        let json = export_to_string(&original, true, fixed_date()).unwrap();
        let archive = import_from_str(&json).unwrap().unwrap();
        assert_eq!(archive.dark_mode, Some(true));
        assert_eq!(archive.collection.binders(), original.binders());
        assert_eq!(archive.collection.current_binder_index(), 0);
        assert_eq!(archive.collection.current_page(), 0);
    }

    #[test]
    fn test_document_without_binders_is_ignored() {
        assert!(import_from_str(r#"{"darkMode": true}"#).unwrap().is_none());
        assert!(import_from_str(r#"{"binders": null}"#).unwrap().is_none());
    }

    #[test]
    fn test_missing_dark_mode_is_none() {
        let archive = import_from_str(r#"{"binders": [{"name": "Only", "pages": []}]}"#)
            .unwrap()
            .unwrap();
        assert_eq!(archive.dark_mode, None);
        assert_eq!(archive.collection.current_binder().name, "Only");
    }

    #[test]
    fn test_malformed_json_is_an_error() {
        assert!(matches!(
            import_from_str("{ not json"),
            Err(BinderError::Json(_))
        ));
        assert!(import_from_str(r#"{"binders": "nope"}"#).is_err());
    }

    #[test]
    fn test_empty_binder_list_is_rejected() {
        assert!(matches!(
            import_from_str(r#"{"binders": []}"#),
            Err(BinderError::EmptyCollection)
        ));
    }

    #[test]
    fn test_negative_active_index_does_not_fail_import() {
        let json = r#"{"binders": [{"name": "Edited", "pages": [[
            {"images": ["data:image/png;base64,AA=="], "caption": "x", "activeImageIndex": -1}
        ]]}]}"#;
        let archive = import_from_str(json).unwrap().unwrap();
        let slot = archive.collection.slot(0, 0).unwrap();
        assert_eq!(slot.active_image_index, 0);
        assert_eq!(slot.caption, "x");
    }
}
