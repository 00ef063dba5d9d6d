use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use serde::Serialize;

use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub labels: usize,
    /// `[height, width, channels]`
    pub input_shape: [usize; 3],
    pub uptime_seconds: u64,
}

pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let shape = state.pipeline.input_shape();
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        labels: state.pipeline.labels().len(),
        input_shape: [shape.height, shape.width, shape.channels],
        uptime_seconds: state.uptime_seconds(),
    })
}
