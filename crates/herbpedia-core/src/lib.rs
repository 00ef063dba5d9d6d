//! Herbpedia core types: the plant metadata table and the JSON response shapes.

pub mod plant;
pub mod result;

pub use plant::{MetadataError, PlantInfo, PlantMetadata};
pub use result::{ClassificationResult, ErrorBody, PlantResults};
