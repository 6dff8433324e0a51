//! Text records used for bulk ingest (`[{"id", "title", "description", ...}]`).

use crate::error::{Result, StoreError};
use crate::store::Metadata;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextRecord {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Any further fields are carried into metadata untouched.
    #[serde(flatten)]
    pub extra: IndexMap<String, serde_json::Value>,
}

impl TextRecord {
    pub fn new(id: impl Into<String>, title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: description.into(),
            extra: IndexMap::new(),
        }
    }

    /// Text that gets embedded for this record.
    pub fn embedding_text(&self) -> String {
        format!("{}. {}", self.title, self.description)
    }

    /// The whole record as metadata, known fields first.
    pub fn to_metadata(&self) -> Metadata {
        let mut meta = Metadata::with_capacity(3 + self.extra.len());
        meta.insert("id".into(), self.id.clone().into());
        meta.insert("title".into(), self.title.clone().into());
        meta.insert("description".into(), self.description.clone().into());
        for (k, v) in &self.extra {
            meta.insert(k.clone(), v.clone());
        }
        meta
    }
}

/// Read a JSON array of [`TextRecord`]s.
pub fn load_records(path: &Path) -> Result<Vec<TextRecord>> {
    let bytes = std::fs::read(path).map_err(|source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_slice(&bytes).map_err(|err| StoreError::InvalidRecords {
        path: path.to_path_buf(),
        reason: err.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn extra_fields_survive_into_metadata() {
        let rec: TextRecord = serde_json::from_value(json!({
            "id": "ganges",
            "title": "Ganges",
            "description": "A major river",
            "lat": 25.3,
        }))
        .unwrap();
        assert_eq!(rec.embedding_text(), "Ganges. A major river");

        let meta = rec.to_metadata();
        let keys: Vec<_> = meta.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["id", "title", "description", "lat"]);
        assert_eq!(meta["lat"], json!(25.3));
    }

    #[test]
    fn description_is_optional() {
        let rec: TextRecord = serde_json::from_value(json!({"id": "a", "title": "A"})).unwrap();
        assert_eq!(rec.description, "");
        assert_eq!(rec.embedding_text(), "A. ");
    }
}
