//! Classification outcome and the JSON bodies returned to clients.

use serde::{Deserialize, Serialize};

use crate::plant::PlantInfo;

/// The winning label of one classification, enriched with its metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub label: String,
    pub description: String,
    pub benefits: Vec<String>,
    /// Raw classifier score for `label`.
    pub probability: f32,
}

impl ClassificationResult {
    pub fn enrich(label: &str, probability: f32, info: &PlantInfo) -> Self {
        Self {
            label: label.to_string(),
            description: info.description.clone(),
            benefits: info.benefits.clone(),
            probability,
        }
    }
}

/// Success body: `{"plantResults": [...]}`.
///
/// Always holds exactly one entry today; the list shape is part of the wire
/// format.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlantResults {
    pub plant_results: Vec<ClassificationResult>,
}

impl From<ClassificationResult> for PlantResults {
    fn from(result: ClassificationResult) -> Self {
        Self {
            plant_results: vec![result],
        }
    }
}

/// Failure body: `{"error": "..."}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}
