use crate::error::PipelineError;
use crate::normalize::NormalizedTensor;

/// Spatial input size a classifier was trained on, in NHWC order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputShape {
    pub height: usize,
    pub width: usize,
    pub channels: usize,
}

impl InputShape {
    pub fn new(height: usize, width: usize, channels: usize) -> Self {
        Self {
            height,
            width,
            channels,
        }
    }

    /// Interpret declared model dimensions `[N, H, W, C]`.
    ///
    /// The batch dimension may be dynamic (any non-positive value) or 1;
    /// height, width and channels must be fixed.
    pub fn from_nhwc(dims: &[i64]) -> Result<Self, PipelineError> {
        let [batch, height, width, channels] = dims else {
            return Err(PipelineError::Shape(format!(
                "expected a rank-4 NHWC input, got {dims:?}"
            )));
        };
        if *batch > 1 {
            return Err(PipelineError::Shape(format!(
                "fixed batch size {batch} cannot take a single image"
            )));
        }
        let fixed = |d: i64| (d > 0).then_some(d as usize);
        match (fixed(*height), fixed(*width), fixed(*channels)) {
            (Some(h), Some(w), Some(c)) => Ok(Self::new(h, w, c)),
            _ => Err(PipelineError::Shape(format!(
                "input dimensions {dims:?} are not fully declared"
            ))),
        }
    }

    /// Tensor dimensions including the leading batch of one.
    pub fn dims(&self) -> [usize; 4] {
        [1, self.height, self.width, self.channels]
    }

    /// Number of scalar values in one input tensor.
    pub fn len(&self) -> usize {
        self.height * self.width * self.channels
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// An already-trained image classifier.
///
/// Implementations are shared read-only across concurrent requests. If the
/// underlying runtime needs exclusive access to run, the implementation
/// serializes calls itself.
pub trait Classifier: Send + Sync {
    /// Declared input shape. Fails with [`PipelineError::Shape`] when the model
    /// does not pin one down.
    fn input_shape(&self) -> Result<InputShape, PipelineError>;

    /// Number of per-class scores produced by [`Classifier::predict`].
    fn output_width(&self) -> usize;

    /// Score one normalized image. Scores are index-aligned with the label set
    /// and are not required to sum to 1.
    fn predict(&self, tensor: &NormalizedTensor) -> Result<Vec<f32>, PipelineError>;
}
