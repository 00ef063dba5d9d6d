//! The single place where pipeline outcomes become HTTP responses.

use axum::Json;
use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use herbpedia_ai::{ErrorKind, PipelineError};
use herbpedia_core::ErrorBody;
use thiserror::Error;
use tracing::{info, warn};

const LOW_CONFIDENCE_MESSAGE: &str = "No plant matched with sufficient confidence";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    #[error("failed to read upload: {0}")]
    Upload(#[from] MultipartError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Pipeline(err) => match err.kind() {
                ErrorKind::MissingInput => StatusCode::BAD_REQUEST,
                ErrorKind::NoMatch | ErrorKind::LowConfidence => StatusCode::NOT_FOUND,
                ErrorKind::Decode
                | ErrorKind::Shape
                | ErrorKind::Inference
                | ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Upload(err) => err.status(),
        }
    }

    fn message(&self) -> String {
        match self {
            Self::Pipeline(PipelineError::LowConfidence { .. }) => {
                LOW_CONFIDENCE_MESSAGE.to_string()
            }
            Self::Pipeline(err) => err.to_string(),
            Self::Upload(err) => err.body_text(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            Self::Pipeline(err) if err.kind().is_user_facing() => {
                info!(kind = err.kind().as_str(), detail = %err, "request not classified");
            }
            Self::Pipeline(err) => {
                warn!(kind = err.kind().as_str(), error = %err, "classification failed");
            }
            Self::Upload(err) => {
                warn!(status = status.as_u16(), error = %err, "upload rejected");
            }
        }
        (status, Json(ErrorBody::new(self.message()))).into_response()
    }
}
