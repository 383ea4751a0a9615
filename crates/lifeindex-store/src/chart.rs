//! JSON chart files: the year and era rows produced by the upstream parser.

use std::path::Path;

use lifeindex_core::{EraRecord, YearRecord};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::StoreError;

/// Parsed chart rows: `{ "years": [...], "eras": [...] }`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Chart {
    #[serde(default, alias = "liunian")]
    pub years: Vec<YearRecord>,
    #[serde(default, alias = "dayun")]
    pub eras: Vec<EraRecord>,
}

impl Chart {
    pub fn load(path: &Path) -> Result<Self, StoreError> {
        if !path.exists() {
            return Err(StoreError::NotFound(path.to_path_buf()));
        }
        let text = std::fs::read_to_string(path)?;
        let chart: Chart = serde_json::from_str(&text)?;
        info!(
            path = %path.display(),
            years = chart.years.len(),
            eras = chart.eras.len(),
            "loaded chart"
        );
        Ok(chart)
    }

    pub fn save(&self, path: &Path) -> Result<(), StoreError> {
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn load_missing_file_errors() {
        let result = Chart::load(Path::new("/nonexistent/chart.json"));
        assert!(matches!(result, Err(StoreError::NotFound(_))));
    }

    #[test]
    fn accepts_parser_section_names() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("chart.json");
        std::fs::write(
            &path,
            r#"{
                "dayun": [{"start_age": 8, "desc": "乙巳 冲"}],
                "liunian": [{"age": 8, "year": 1998, "desc": "戊寅", "relations": "刑/害"}]
            }"#,
        )
        .unwrap();

        let chart = Chart::load(&path).unwrap();
        assert_eq!(chart.eras.len(), 1);
        assert_eq!(chart.eras[0].description, "乙巳 冲");
        assert_eq!(chart.years[0].relations, vec!["刑", "害"]);
    }

    #[test]
    fn save_then_load() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("chart.json");
        let chart = Chart {
            years: vec![YearRecord::new(20, 2010).with_actor("比")],
            eras: vec![EraRecord::new(18, "丙午")],
        };
        chart.save(&path).unwrap();
        assert_eq!(Chart::load(&path).unwrap(), chart);
    }

    #[test]
    fn malformed_json_is_json_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("chart.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(Chart::load(&path), Err(StoreError::Json(_))));
    }
}
