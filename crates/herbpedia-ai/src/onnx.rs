//! ONNX Runtime adapter for the plant classifier.
//!
//! Expects a single-input, single-output image classifier exported with NHWC
//! layout (`[N, H, W, C]` float input, `[N, classes]` float output), as
//! produced by converting the Keras model with `tf2onnx`.

use std::path::Path;
use std::sync::{Mutex, PoisonError};

use ort::session::Session;
use ort::value::{Tensor, ValueType};
use tracing::info;

use crate::classifier::{Classifier, InputShape};
use crate::error::PipelineError;
use crate::normalize::NormalizedTensor;

/// Custom model-metadata key that may carry the label list.
pub const LABELS_METADATA_KEY: &str = "labels";

/// Image classifier backed by an ONNX Runtime session.
///
/// `Session::run` needs exclusive access, so concurrent callers are
/// serialized on an internal mutex.
pub struct OnnxClassifier {
    session: Mutex<Session>,
    input_name: String,
    input_dims: Vec<i64>,
    output_width: usize,
    embedded_labels: Option<String>,
}

impl OnnxClassifier {
    /// Load a classifier from an `.onnx` file.
    pub fn load(model_path: &Path) -> anyhow::Result<Self> {
        anyhow::ensure!(model_path.exists(), "model not found at {model_path:?}");

        let session = Session::builder()?.commit_from_file(model_path)?;

        let input = session
            .inputs()
            .first()
            .ok_or_else(|| anyhow::anyhow!("model declares no inputs"))?;
        let input_name = input.name().to_string();
        let input_dims = tensor_dims(input.dtype())
            .ok_or_else(|| anyhow::anyhow!("model input {input_name:?} is not a tensor"))?;

        let output_width = session
            .outputs()
            .first()
            .and_then(|output| infer_width(output.dtype()))
            .ok_or_else(|| anyhow::anyhow!("cannot determine the model's output width"))?;

        let embedded_labels = read_embedded_labels(&session);

        info!(
            input = %input_name,
            dims = ?input_dims,
            output_width,
            embedded_labels = embedded_labels.is_some(),
            model = %model_path.display(),
            "loaded classifier model"
        );

        Ok(Self {
            session: Mutex::new(session),
            input_name,
            input_dims,
            output_width,
            embedded_labels,
        })
    }

    /// Label list stored in the model's custom metadata, if any. Parse it with
    /// [`LabelSet::parse`](crate::LabelSet::parse).
    pub fn embedded_labels(&self) -> Option<&str> {
        self.embedded_labels.as_deref()
    }
}

impl Classifier for OnnxClassifier {
    fn input_shape(&self) -> Result<InputShape, PipelineError> {
        InputShape::from_nhwc(&self.input_dims)
    }

    fn output_width(&self) -> usize {
        self.output_width
    }

    fn predict(&self, tensor: &NormalizedTensor) -> Result<Vec<f32>, PipelineError> {
        let shape = tensor.dims().map(|d| d as i64);
        let input = Tensor::from_array((shape, tensor.data().to_vec().into_boxed_slice()))
            .map_err(inference)?;

        // A panic inside a previous run leaves the session itself usable.
        let mut session = self.session.lock().unwrap_or_else(PoisonError::into_inner);
        let outputs = session
            .run(ort::inputs![self.input_name.as_str() => input])
            .map_err(inference)?;

        let (_, scores) = outputs[0].try_extract_tensor::<f32>().map_err(inference)?;
        if scores.len() != self.output_width {
            return Err(PipelineError::Inference(format!(
                "model returned {} scores, declared {}",
                scores.len(),
                self.output_width
            )));
        }
        Ok(scores.to_vec())
    }
}

fn inference(err: ort::Error) -> PipelineError {
    PipelineError::Inference(err.to_string())
}

fn tensor_dims(value_type: &ValueType) -> Option<Vec<i64>> {
    match value_type {
        ValueType::Tensor { shape, .. } => Some(shape.to_vec()),
        _ => None,
    }
}

/// Last output dimension, if the model fixes it.
fn infer_width(output_type: &ValueType) -> Option<usize> {
    tensor_dims(output_type)?
        .last()
        .and_then(|&d| if d > 0 { Some(d as usize) } else { None })
}

fn read_embedded_labels(session: &Session) -> Option<String> {
    let metadata = session.metadata().ok()?;
    metadata.custom(LABELS_METADATA_KEY).ok().flatten()
}
