//! Ordered class labels for the classifier's output vector.
//!
//! Position `i` in a [`LabelSet`] names output index `i` of the model. The
//! two are maintained separately, so the set is checked against the model's
//! declared output width before any request is served.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use herbpedia_core::PlantMetadata;
use thiserror::Error;

/// Label order the bundled model was trained with.
const BUILTIN_LABELS: &str = include_str!("../data/labels.txt");

#[derive(Debug, Error)]
pub enum LabelError {
    #[error("label set is empty")]
    Empty,

    #[error("duplicate label {0:?}")]
    Duplicate(String),

    #[error("{labels} labels for a classifier with {outputs} outputs")]
    Misaligned { labels: usize, outputs: usize },

    #[error("failed to read labels {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid label list: {0}")]
    Json(#[from] serde_json::Error),
}

/// Ordered, duplicate-free list of class labels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelSet {
    labels: Vec<String>,
}

/// How much of a [`LabelSet`] the metadata table can describe.
pub struct LabelCoverage<'a> {
    pub known: usize,
    /// Labels with no metadata entry, in label order. These can never win.
    pub missing: Vec<&'a str>,
}

impl LabelSet {
    pub fn new(labels: Vec<String>) -> Result<Self, LabelError> {
        if labels.is_empty() {
            return Err(LabelError::Empty);
        }

        let mut seen = HashSet::with_capacity(labels.len());
        for label in &labels {
            if !seen.insert(label.as_str()) {
                return Err(LabelError::Duplicate(label.clone()));
            }
        }

        Ok(Self { labels })
    }

    /// The label list bundled in `data/labels.txt`.
    pub fn builtin() -> Result<Self, LabelError> {
        Self::parse(BUILTIN_LABELS)
    }

    /// Parse either a JSON array of strings or one label per line.
    ///
    /// In the line format, blank lines and lines starting with `#` are skipped
    /// and surrounding whitespace is trimmed.
    pub fn parse(text: &str) -> Result<Self, LabelError> {
        let trimmed = text.trim_start();
        let labels: Vec<String> = if trimmed.starts_with('[') {
            serde_json::from_str(trimmed)?
        } else {
            text.lines()
                .map(str::trim)
                .filter(|line| !line.is_empty() && !line.starts_with('#'))
                .map(String::from)
                .collect()
        };
        Self::new(labels)
    }

    pub fn load(path: &Path) -> Result<Self, LabelError> {
        let text = std::fs::read_to_string(path).map_err(|source| LabelError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text)
    }

    /// Fail unless there is exactly one label per classifier output.
    pub fn ensure_aligned(&self, output_width: usize) -> Result<(), LabelError> {
        if self.labels.len() == output_width {
            Ok(())
        } else {
            Err(LabelError::Misaligned {
                labels: self.labels.len(),
                outputs: output_width,
            })
        }
    }

    pub fn coverage<'a>(&'a self, metadata: &PlantMetadata) -> LabelCoverage<'a> {
        let missing: Vec<&str> = self
            .iter()
            .filter(|label| !metadata.contains(label))
            .collect();
        LabelCoverage {
            known: self.labels.len() - missing.len(),
            missing,
        }
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.labels.get(index).map(|s| s.as_str())
    }

    /// Labels in output-index order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.labels.iter().map(|s| s.as_str())
    }
}
