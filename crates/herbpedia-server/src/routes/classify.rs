//! `POST /classify`: one multipart image in, one enriched plant out.

use std::sync::Arc;

use axum::Json;
use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, State};
use herbpedia_ai::PipelineError;
use herbpedia_core::PlantResults;
use tracing::info;

use crate::error::ApiError;
use crate::state::AppState;
use crate::upload::{self, SpooledUpload};

/// Classify the uploaded `image` field.
///
/// A body that is not multipart, or has no `image` file, ends the request as
/// missing input before any decoding happens. Decoding and inference run on
/// the blocking pool; the spooled upload lives only inside that task and is
/// removed on every exit path.
pub async fn classify_image(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<PlantResults>, ApiError> {
    let Ok(multipart) = multipart else {
        return Err(PipelineError::MissingInput.into());
    };
    let image = upload::read_image_field(multipart)
        .await?
        .ok_or(PipelineError::MissingInput)?;

    let pipeline = state.pipeline.clone();
    let scratch_dir = state.scratch_dir.clone();
    let result = tokio::task::spawn_blocking(move || {
        let spooled = SpooledUpload::create(&scratch_dir, &image)
            .map_err(|e| PipelineError::Internal(format!("failed to spool upload: {e}")))?;
        drop(image);
        pipeline.classify_file(spooled.path())
    })
    .await
    .map_err(|e| PipelineError::Internal(format!("classification task failed: {e}")))??;

    info!(
        label = %result.label,
        probability = result.probability,
        "classified upload"
    );
    Ok(Json(result.into()))
}
