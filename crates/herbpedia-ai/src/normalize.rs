//! Image decoding and conversion into the classifier's input tensor.
//!
//! Every image goes through the same steps: decode (format sniffed from the
//! content, never the file name), convert to the classifier's channel count,
//! resize to exactly `W x H` with [`RESIZE_FILTER`], and scale 0..=255 to
//! 0.0..=1.0. The result is laid out NHWC with a batch of one.

use std::path::Path;

use image::imageops::{self, FilterType};
use image::{DynamicImage, ImageReader};

use crate::classifier::InputShape;
use crate::error::PipelineError;

/// Bilinear resampling. Changing this shifts model accuracy, so it is fixed
/// for every deployment.
pub const RESIZE_FILTER: FilterType = FilterType::Triangle;

/// A `[1, H, W, C]` f32 tensor with values in `[0.0, 1.0]`.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedTensor {
    shape: InputShape,
    data: Vec<f32>,
}

impl NormalizedTensor {
    pub fn shape(&self) -> InputShape {
        self.shape
    }

    pub fn dims(&self) -> [usize; 4] {
        self.shape.dims()
    }

    /// Row-major NHWC values.
    pub fn data(&self) -> &[f32] {
        &self.data
    }

    pub fn into_data(self) -> Vec<f32> {
        self.data
    }
}

/// Decode in-memory image bytes and normalize them.
pub fn normalize(bytes: &[u8], shape: InputShape) -> Result<NormalizedTensor, PipelineError> {
    let image = image::load_from_memory(bytes)?;
    normalize_image(&image, shape)
}

/// Decode an image file and normalize it. The extension is ignored.
pub fn normalize_file(path: &Path, shape: InputShape) -> Result<NormalizedTensor, PipelineError> {
    let reader = ImageReader::open(path)
        .and_then(|r| r.with_guessed_format())
        .map_err(|e| PipelineError::Internal(format!("read {}: {e}", path.display())))?;
    let image = reader.decode()?;
    normalize_image(&image, shape)
}

/// Normalize an already-decoded image.
///
/// Channel conversion is deterministic: for 3 channels alpha is dropped and
/// greyscale is replicated, for 1 channel colour is reduced to luma, for 4
/// channels an opaque alpha is added where missing.
pub fn normalize_image(
    image: &DynamicImage,
    shape: InputShape,
) -> Result<NormalizedTensor, PipelineError> {
    if shape.is_empty() {
        return Err(PipelineError::Shape(format!("empty input shape {shape:?}")));
    }
    let width = u32::try_from(shape.width)
        .map_err(|_| PipelineError::Shape(format!("width {} out of range", shape.width)))?;
    let height = u32::try_from(shape.height)
        .map_err(|_| PipelineError::Shape(format!("height {} out of range", shape.height)))?;

    let samples = match shape.channels {
        1 => imageops::resize(&image.to_luma8(), width, height, RESIZE_FILTER).into_raw(),
        3 => imageops::resize(&image.to_rgb8(), width, height, RESIZE_FILTER).into_raw(),
        4 => imageops::resize(&image.to_rgba8(), width, height, RESIZE_FILTER).into_raw(),
        other => {
            return Err(PipelineError::Shape(format!(
                "unsupported channel count {other}"
            )));
        }
    };

    let data: Vec<f32> = samples.into_iter().map(|v| f32::from(v) / 255.0).collect();
    debug_assert_eq!(data.len(), shape.len());

    Ok(NormalizedTensor { shape, data })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, ImageFormat, Luma, Rgb, RgbImage, Rgba, RgbaImage};
    use std::io::{Cursor, Write};

    fn encode(image: DynamicImage, format: ImageFormat) -> Vec<u8> {
        let mut buf = Cursor::new(Vec::new());
        image.write_to(&mut buf, format).unwrap();
        buf.into_inner()
    }

    fn solid_rgb_png(width: u32, height: u32, rgb: [u8; 3]) -> Vec<u8> {
        let image = RgbImage::from_pixel(width, height, Rgb(rgb));
        encode(DynamicImage::ImageRgb8(image), ImageFormat::Png)
    }

    #[test]
    fn resizes_to_declared_shape() {
        let bytes = solid_rgb_png(64, 48, [255, 0, 51]);
        let tensor = normalize(&bytes, InputShape::new(16, 20, 3)).unwrap();

        assert_eq!(tensor.dims(), [1, 16, 20, 3]);
        assert_eq!(tensor.data().len(), 16 * 20 * 3);

        // HWC interleaving: first pixel's R, G, B.
        assert_eq!(tensor.data()[0], 1.0);
        assert_eq!(tensor.data()[1], 0.0);
        assert!((tensor.data()[2] - 0.2).abs() < 1e-6);
    }

    #[test]
    fn values_stay_in_unit_range() {
        let image = RgbImage::from_fn(37, 23, |x, y| {
            Rgb([(x * 7) as u8, (y * 11) as u8, ((x + y) * 5) as u8])
        });
        let bytes = encode(DynamicImage::ImageRgb8(image), ImageFormat::Png);
        let tensor = normalize(&bytes, InputShape::new(50, 50, 3)).unwrap();
        assert!(tensor.data().iter().all(|&v| (0.0..=1.0).contains(&v)));
    }

    #[test]
    fn alpha_is_dropped_for_rgb_models() {
        let image = RgbaImage::from_pixel(8, 8, Rgba([0, 255, 0, 10]));
        let bytes = encode(DynamicImage::ImageRgba8(image), ImageFormat::Png);
        let tensor = normalize(&bytes, InputShape::new(4, 4, 3)).unwrap();

        assert_eq!(tensor.data().len(), 4 * 4 * 3);
        assert_eq!(&tensor.data()[..3], &[0.0, 1.0, 0.0]);
    }

    #[test]
    fn greyscale_is_replicated_for_rgb_models() {
        let image = GrayImage::from_pixel(8, 8, Luma([102]));
        let bytes = encode(DynamicImage::ImageLuma8(image), ImageFormat::Png);
        let tensor = normalize(&bytes, InputShape::new(4, 4, 3)).unwrap();

        let expected = 102.0 / 255.0;
        assert!(tensor.data().iter().all(|&v| (v - expected).abs() < 1e-6));
    }

    #[test]
    fn single_channel_models_get_luma() {
        let bytes = solid_rgb_png(8, 8, [255, 255, 255]);
        let tensor = normalize(&bytes, InputShape::new(2, 2, 1)).unwrap();
        assert_eq!(tensor.data(), &[1.0, 1.0, 1.0, 1.0]);
    }

    #[test]
    fn four_channel_models_get_opaque_alpha() {
        let bytes = solid_rgb_png(8, 8, [0, 0, 0]);
        let tensor = normalize(&bytes, InputShape::new(1, 1, 4)).unwrap();
        assert_eq!(tensor.data(), &[0.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn unsupported_channel_count() {
        let bytes = solid_rgb_png(8, 8, [0, 0, 0]);
        let err = normalize(&bytes, InputShape::new(4, 4, 2)).unwrap_err();
        assert!(matches!(err, PipelineError::Shape(_)));
    }

    #[test]
    fn empty_shape() {
        let bytes = solid_rgb_png(8, 8, [0, 0, 0]);
        let err = normalize(&bytes, InputShape::new(0, 4, 3)).unwrap_err();
        assert!(matches!(err, PipelineError::Shape(_)));
    }

    #[test]
    fn text_is_a_decode_error() {
        let err = normalize(b"this is not an image", InputShape::new(4, 4, 3)).unwrap_err();
        assert!(matches!(err, PipelineError::Decode(_)));
        assert!(err.to_string().starts_with("failed to decode image"));
    }

    #[test]
    fn jpeg_input() {
        let image = RgbImage::from_pixel(32, 32, Rgb([200, 120, 40]));
        let bytes = encode(DynamicImage::ImageRgb8(image), ImageFormat::Jpeg);
        let tensor = normalize(&bytes, InputShape::new(8, 8, 3)).unwrap();
        assert_eq!(tensor.dims(), [1, 8, 8, 3]);
    }

    #[test]
    fn deterministic_for_identical_bytes() {
        let image = RgbImage::from_fn(40, 30, |x, y| Rgb([x as u8, y as u8, (x ^ y) as u8]));
        let bytes = encode(DynamicImage::ImageRgb8(image), ImageFormat::Png);
        let shape = InputShape::new(17, 13, 3);

        let a = normalize(&bytes, shape).unwrap();
        let b = normalize(&bytes, shape).unwrap();
        let bits = |t: &NormalizedTensor| t.data().iter().map(|v| v.to_bits()).collect::<Vec<_>>();
        assert_eq!(bits(&a), bits(&b));
    }

    #[test]
    fn file_format_is_sniffed_not_taken_from_extension() {
        let mut file = tempfile::Builder::new().suffix(".jpg").tempfile().unwrap();
        file.write_all(&solid_rgb_png(8, 8, [10, 20, 30])).unwrap();

        let tensor = normalize_file(file.path(), InputShape::new(2, 2, 3)).unwrap();
        assert_eq!(tensor.dims(), [1, 2, 2, 3]);
    }

    #[test]
    fn text_file_named_jpg_is_a_decode_error() {
        let mut file = tempfile::Builder::new().suffix(".jpg").tempfile().unwrap();
        file.write_all(b"plain text pretending to be a photo").unwrap();

        let err = normalize_file(file.path(), InputShape::new(2, 2, 3)).unwrap_err();
        assert!(matches!(err, PipelineError::Decode(_)));
    }
}
