//! Inference layer: image normalization, classifier adapters, and label selection.

mod classifier;
mod error;
mod labels;
mod normalize;
mod pipeline;
mod select;

#[cfg(feature = "onnx")]
mod onnx;

pub use classifier::{Classifier, InputShape};
pub use error::{ErrorKind, PipelineError};
pub use labels::{LabelCoverage, LabelError, LabelSet};
pub use normalize::{NormalizedTensor, RESIZE_FILTER, normalize, normalize_file, normalize_image};
pub use pipeline::Pipeline;
pub use select::{ranked, select};

#[cfg(feature = "onnx")]
pub use onnx::OnnxClassifier;
