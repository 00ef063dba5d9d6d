//! Per-request classification: normalize → predict → select → enrich.

use std::path::Path;
use std::sync::Arc;

use herbpedia_core::{ClassificationResult, PlantMetadata};
use tracing::{debug, info, warn};

use crate::classifier::{Classifier, InputShape};
use crate::error::PipelineError;
use crate::labels::LabelSet;
use crate::normalize::{NormalizedTensor, normalize, normalize_file};
use crate::select::{ranked, select};

/// The loaded model, its labels and the metadata table, bound together.
///
/// Built once at startup and shared read-only. Construction verifies that the
/// classifier declares a usable input shape and one output per label.
pub struct Pipeline {
    classifier: Arc<dyn Classifier>,
    input_shape: InputShape,
    labels: LabelSet,
    metadata: PlantMetadata,
    min_confidence: Option<f32>,
}

impl Pipeline {
    pub fn new(
        classifier: Arc<dyn Classifier>,
        labels: LabelSet,
        metadata: PlantMetadata,
    ) -> Result<Self, PipelineError> {
        let input_shape = classifier.input_shape()?;
        labels.ensure_aligned(classifier.output_width())?;

        let coverage = labels.coverage(&metadata);
        if coverage.known == 0 {
            warn!("no label has a metadata entry; every request will be a no-match");
        }
        for &label in &coverage.missing {
            warn!(label, "label has no metadata entry and can never be reported");
        }

        info!(
            height = input_shape.height,
            width = input_shape.width,
            channels = input_shape.channels,
            labels = labels.len(),
            known = coverage.known,
            "classification pipeline ready"
        );

        Ok(Self {
            classifier,
            input_shape,
            labels,
            metadata,
            min_confidence: None,
        })
    }

    /// Reject winning scores below `floor` with [`PipelineError::LowConfidence`].
    /// `None` accepts any winning score.
    pub fn with_min_confidence(mut self, floor: Option<f32>) -> Self {
        self.min_confidence = floor;
        self
    }

    pub fn input_shape(&self) -> InputShape {
        self.input_shape
    }

    pub fn labels(&self) -> &LabelSet {
        &self.labels
    }

    pub fn metadata(&self) -> &PlantMetadata {
        &self.metadata
    }

    pub fn min_confidence(&self) -> Option<f32> {
        self.min_confidence
    }

    /// Classify in-memory image bytes.
    pub fn classify(&self, bytes: &[u8]) -> Result<ClassificationResult, PipelineError> {
        let tensor = normalize(bytes, self.input_shape)?;
        self.classify_tensor(tensor)
    }

    /// Classify an image stored on disk.
    pub fn classify_file(&self, path: &Path) -> Result<ClassificationResult, PipelineError> {
        let tensor = normalize_file(path, self.input_shape)?;
        self.classify_tensor(tensor)
    }

    /// Raw label-aligned scores for in-memory image bytes.
    pub fn scores(&self, bytes: &[u8]) -> Result<Vec<f32>, PipelineError> {
        let tensor = normalize(bytes, self.input_shape)?;
        self.predict(&tensor)
    }

    fn classify_tensor(
        &self,
        tensor: NormalizedTensor,
    ) -> Result<ClassificationResult, PipelineError> {
        let scores = self.predict(&tensor)?;
        drop(tensor);

        if tracing::enabled!(tracing::Level::DEBUG) {
            for (label, score) in ranked(&scores, &self.labels).into_iter().take(3) {
                debug!(label, score, "candidate");
            }
        }

        let result =
            select(&scores, &self.labels, &self.metadata).ok_or(PipelineError::NoMatch)?;

        if let Some(threshold) = self.min_confidence
            && result.probability < threshold
        {
            return Err(PipelineError::LowConfidence {
                label: result.label,
                probability: result.probability,
                threshold,
            });
        }

        Ok(result)
    }

    fn predict(&self, tensor: &NormalizedTensor) -> Result<Vec<f32>, PipelineError> {
        if tensor.shape() != self.input_shape {
            return Err(PipelineError::Shape(format!(
                "tensor {:?} does not match classifier input {:?}",
                tensor.shape(),
                self.input_shape
            )));
        }

        let scores = self.classifier.predict(tensor)?;
        if scores.len() != self.labels.len() {
            return Err(PipelineError::Inference(format!(
                "classifier returned {} scores for {} labels",
                scores.len(),
                self.labels.len()
            )));
        }
        Ok(scores)
    }
}
