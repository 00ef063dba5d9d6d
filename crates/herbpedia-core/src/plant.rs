//! Curated plant metadata keyed by classifier label.
//!
//! The table is loaded once at startup and shared read-only for the lifetime
//! of the process. Updating it requires a restart.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

/// Metadata table shipped with the crate.
const BUILTIN_PLANT_INFO: &str = include_str!("../data/plant_info.json");

#[derive(Debug, Error)]
pub enum MetadataError {
    #[error("failed to read plant metadata {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid plant metadata: {0}")]
    Json(#[from] serde_json::Error),
}

/// Descriptive text attached to a recognised plant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlantInfo {
    pub description: String,
    /// Health benefits, in curated display order.
    pub benefits: Vec<String>,
}

/// Label → [`PlantInfo`] lookup.
///
/// Lookups are exact and case-sensitive: `"Lidah Buaya"` and `"Lidah buaya"`
/// are different keys.
#[derive(Debug, Clone, Default)]
pub struct PlantMetadata {
    plants: HashMap<String, PlantInfo>,
}

impl PlantMetadata {
    /// The table bundled in `data/plant_info.json`.
    pub fn builtin() -> Result<Self, MetadataError> {
        Self::from_json_str(BUILTIN_PLANT_INFO)
    }

    /// Parse a JSON object of the form `{"<label>": {"description": .., "benefits": [..]}}`.
    pub fn from_json_str(json: &str) -> Result<Self, MetadataError> {
        let plants: HashMap<String, PlantInfo> = serde_json::from_str(json)?;
        Ok(Self { plants })
    }

    /// Load a metadata table from a JSON file.
    pub fn load(path: &Path) -> Result<Self, MetadataError> {
        let json = std::fs::read_to_string(path).map_err(|source| MetadataError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let metadata = Self::from_json_str(&json)?;
        info!(plants = metadata.len(), path = %path.display(), "loaded plant metadata");
        Ok(metadata)
    }

    pub fn get(&self, label: &str) -> Option<&PlantInfo> {
        self.plants.get(label)
    }

    pub fn contains(&self, label: &str) -> bool {
        self.plants.contains_key(label)
    }

    pub fn len(&self) -> usize {
        self.plants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plants.is_empty()
    }

    /// Labels present in the table, in no particular order.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.plants.keys().map(|k| k.as_str())
    }
}

impl FromIterator<(String, PlantInfo)> for PlantMetadata {
    fn from_iter<I: IntoIterator<Item = (String, PlantInfo)>>(iter: I) -> Self {
        Self {
            plants: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn builtin_table_parses() {
        let metadata = PlantMetadata::builtin().unwrap();
        assert_eq!(metadata.len(), 9);

        let lime = metadata.get("Jeruk Nipis").unwrap();
        assert!(lime.description.starts_with("Jeruk nipis adalah buah"));
        assert_eq!(
            lime.benefits,
            vec!["Menyediakan vitamin C", "Meningkatkan sistem kekebalan tubuh"]
        );
    }

    #[test]
    fn lookup_is_case_sensitive() {
        let metadata = PlantMetadata::builtin().unwrap();
        assert!(metadata.contains("Lidah buaya"));
        assert!(!metadata.contains("Lidah Buaya"));
    }

    #[test]
    fn from_json_preserves_benefit_order() {
        let json = r#"{
            "Kemangi": {
                "description": "aromatic herb",
                "benefits": ["third", "first", "second"]
            }
        }"#;
        let metadata = PlantMetadata::from_json_str(json).unwrap();
        assert_eq!(
            metadata.get("Kemangi").unwrap().benefits,
            vec!["third", "first", "second"]
        );
    }

    #[test]
    fn missing_field_is_rejected() {
        let json = r#"{"Kemangi": {"description": "no benefits"}}"#;
        let err = PlantMetadata::from_json_str(json).unwrap_err();
        assert!(matches!(err, MetadataError::Json(_)));
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"Pandan": {{"description": "fragrant leaf", "benefits": ["Menyegarkan"]}}}}"#
        )
        .unwrap();

        let metadata = PlantMetadata::load(file.path()).unwrap();
        assert_eq!(metadata.len(), 1);
        assert_eq!(metadata.get("Pandan").unwrap().description, "fragrant leaf");
    }

    #[test]
    fn load_missing_file_reports_path() {
        let err = PlantMetadata::load(Path::new("/nonexistent/plant_info.json")).unwrap_err();
        assert!(matches!(err, MetadataError::Io { .. }));
        assert!(err.to_string().contains("/nonexistent/plant_info.json"));
    }

    #[test]
    fn collect_from_entries() {
        let metadata: PlantMetadata = [(
            "Sirih".to_string(),
            PlantInfo {
                description: "betel".into(),
                benefits: vec![],
            },
        )]
        .into_iter()
        .collect();
        assert!(metadata.contains("Sirih"));
        assert_eq!(metadata.labels().collect::<Vec<_>>(), vec!["Sirih"]);
    }
}
