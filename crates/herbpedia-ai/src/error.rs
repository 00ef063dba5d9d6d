use thiserror::Error;

use crate::labels::LabelError;

/// Every way a classification request can end other than success.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("No image provided")]
    MissingInput,

    #[error("failed to decode image: {0}")]
    Decode(#[from] image::ImageError),

    #[error("classifier input shape unavailable: {0}")]
    Shape(String),

    #[error("inference failed: {0}")]
    Inference(String),

    #[error("No matching plant found")]
    NoMatch,

    #[error("best match {label} scored {probability:.4}, below the {threshold:.4} confidence floor")]
    LowConfidence {
        label: String,
        probability: f32,
        threshold: f32,
    },

    #[error(transparent)]
    Labels(#[from] LabelError),

    #[error("{0}")]
    Internal(String),
}

/// Coarse classification of a [`PipelineError`], used when rendering responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    MissingInput,
    Decode,
    Shape,
    Inference,
    NoMatch,
    LowConfidence,
    Internal,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MissingInput => "missing_input",
            Self::Decode => "decode",
            Self::Shape => "shape",
            Self::Inference => "inference",
            Self::NoMatch => "no_match",
            Self::LowConfidence => "low_confidence",
            Self::Internal => "internal",
        }
    }

    /// Expected outcomes the caller caused or asked about, as opposed to failures.
    pub fn is_user_facing(&self) -> bool {
        matches!(
            self,
            Self::MissingInput | Self::NoMatch | Self::LowConfidence
        )
    }
}

impl PipelineError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingInput => ErrorKind::MissingInput,
            Self::Decode(_) => ErrorKind::Decode,
            Self::Shape(_) => ErrorKind::Shape,
            Self::Inference(_) => ErrorKind::Inference,
            Self::NoMatch => ErrorKind::NoMatch,
            Self::LowConfidence { .. } => ErrorKind::LowConfidence,
            Self::Labels(_) | Self::Internal(_) => ErrorKind::Internal,
        }
    }
}
