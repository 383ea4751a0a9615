//! Annotation lists persisted across sessions as a JSON array.
//!
//! Loading is lenient: a malformed entry is skipped, not fatal, so one bad
//! hand edit does not lose the rest of the list.

use std::path::Path;

use lifeindex_core::Annotation;
use serde_json::Value;
use tracing::{info, warn};

use crate::StoreError;

/// Decode annotations from a JSON array, skipping entries without an integer year.
pub fn annotations_from_json(text: &str) -> Result<Vec<Annotation>, StoreError> {
    let items: Vec<Value> = serde_json::from_str(text)?;
    let mut annotations = Vec::with_capacity(items.len());
    for (i, item) in items.into_iter().enumerate() {
        match parse_annotation(&item) {
            Some(ann) => annotations.push(ann),
            None => warn!(index = i, "skipping malformed annotation"),
        }
    }
    Ok(annotations)
}

fn parse_annotation(item: &Value) -> Option<Annotation> {
    let year = match item.get("year")? {
        Value::Number(n) => n.as_i64()?,
        Value::String(s) => s.trim().parse().ok()?,
        _ => return None,
    };
    let text = |key: &str| {
        item.get(key)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    };
    let intensity = match item.get("intensity") {
        None | Some(Value::Null) => 1.0,
        Some(Value::Number(n)) => n.as_f64()?,
        Some(Value::String(s)) => s.trim().parse().ok()?,
        Some(_) => return None,
    };

    Some(Annotation {
        year: i32::try_from(year).ok()?,
        label: text("label"),
        outcome: text("outcome"),
        intensity,
        note: text("note"),
    })
}

/// Load annotations; a missing file is an empty list.
pub fn load_annotations(path: &Path) -> Result<Vec<Annotation>, StoreError> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let annotations = annotations_from_json(&std::fs::read_to_string(path)?)?;
    info!(path = %path.display(), count = annotations.len(), "loaded annotations");
    Ok(annotations)
}

pub fn save_annotations(path: &Path, annotations: &[Annotation]) -> Result<(), StoreError> {
    std::fs::write(path, serde_json::to_string_pretty(annotations)?)?;
    info!(path = %path.display(), count = annotations.len(), "saved annotations");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn lenient_decode_skips_bad_entries() {
        let json = r#"[
            {"year": 2018, "label": "结婚", "outcome": "正向 / 大喜", "intensity": 1.2},
            {"label": "no year"},
            {"year": "2022", "label": "裁员", "outcome": "负向"},
            {"year": 2023, "intensity": "strong"},
            {"year": 2024.5}
        ]"#;
        let anns = annotations_from_json(json).unwrap();
        assert_eq!(anns.len(), 2);
        assert_eq!(anns[0].intensity, 1.2);
        assert_eq!(anns[1].year, 2022);
        assert_eq!(anns[1].intensity, 1.0);
    }

    #[test]
    fn non_array_is_error() {
        assert!(matches!(
            annotations_from_json(r#"{"year": 2020}"#),
            Err(StoreError::Json(_))
        ));
    }

    #[test]
    fn missing_file_is_empty() {
        let anns = load_annotations(Path::new("/nonexistent/annotations.json")).unwrap();
        assert!(anns.is_empty());
    }

    #[test]
    fn save_then_load_keeps_order_and_notes() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("annotations.json");
        let anns = vec![
            Annotation::new(2022, "裁员", "负向 / 大悲", 1.5).with_note("部门整体撤销"),
            Annotation::new(2018, "结婚", "正向 / 大喜", 1.0),
            Annotation::new(2018, "买房", "正向", 0.5),
        ];
        save_annotations(&path, &anns).unwrap();
        assert_eq!(load_annotations(&path).unwrap(), anns);
    }
}
