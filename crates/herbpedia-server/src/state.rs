//! Process-wide state: the classification pipeline and request scratch space.
//!
//! Everything here is loaded once in `main` and only read afterwards.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use anyhow::Context;
use herbpedia_ai::{LabelSet, Pipeline};
use tracing::info;

use crate::config::ServerConfig;

/// Where the active label list came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelSource {
    File,
    Model,
    Builtin,
}

impl LabelSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::File => "file",
            Self::Model => "model",
            Self::Builtin => "builtin",
        }
    }
}

/// Shared application state
pub struct AppState {
    pub pipeline: Arc<Pipeline>,
    /// Directory that holds in-flight uploads
    pub scratch_dir: PathBuf,
    pub max_upload_bytes: usize,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(pipeline: Pipeline, scratch_dir: PathBuf, max_upload_bytes: usize) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
            scratch_dir,
            max_upload_bytes,
            started_at: Instant::now(),
        }
    }

    /// Load the model, labels and metadata named by `config`.
    #[cfg(feature = "onnx")]
    pub fn load(config: &ServerConfig) -> anyhow::Result<Self> {
        use herbpedia_ai::OnnxClassifier;
        use herbpedia_core::PlantMetadata;

        let classifier = OnnxClassifier::load(&config.model)
            .with_context(|| format!("loading model {}", config.model.display()))?;

        let (labels, source) =
            resolve_labels(config.labels.as_deref(), classifier.embedded_labels())?;
        info!(count = labels.len(), source = source.as_str(), "using labels");

        let metadata = match &config.metadata {
            Some(path) => PlantMetadata::load(path)?,
            None => PlantMetadata::builtin().context("bundled plant metadata")?,
        };

        let pipeline = Pipeline::new(Arc::new(classifier), labels, metadata)
            .context("binding labels to the classifier")?
            .with_min_confidence(config.min_confidence);

        let scratch_dir = config.scratch_dir();
        std::fs::create_dir_all(&scratch_dir)
            .with_context(|| format!("creating scratch dir {}", scratch_dir.display()))?;
        info!(scratch_dir = %scratch_dir.display(), "upload scratch space ready");

        Ok(Self::new(pipeline, scratch_dir, config.max_upload_bytes))
    }

    #[cfg(not(feature = "onnx"))]
    pub fn load(_config: &ServerConfig) -> anyhow::Result<Self> {
        anyhow::bail!("built without the `onnx` feature; no model runtime is available")
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}

/// Pick the label list: explicit file, then labels embedded in the model,
/// then the bundled list.
pub fn resolve_labels(
    file: Option<&Path>,
    embedded: Option<&str>,
) -> anyhow::Result<(LabelSet, LabelSource)> {
    if let Some(path) = file {
        let labels = LabelSet::load(path)
            .with_context(|| format!("loading labels {}", path.display()))?;
        return Ok((labels, LabelSource::File));
    }
    if let Some(text) = embedded {
        let labels = LabelSet::parse(text).context("parsing labels embedded in the model")?;
        return Ok((labels, LabelSource::Model));
    }
    Ok((LabelSet::builtin()?, LabelSource::Builtin))
}
