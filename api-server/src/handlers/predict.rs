//! Prediction handler

use axum::{
    extract::{Multipart, State},
    Json,
};

use dermwoe_core::PredictionResult;

use crate::models::PredictUpload;
use crate::{AppError, AppResult, AppState};

/// Predict the lesion class of an uploaded image and explain it
pub async fn predict(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> AppResult<Json<PredictionResult>> {
    let upload = PredictUpload::from_multipart(&mut multipart).await?;
    upload.check_content_type()?;

    tracing::info!(
        "Predicting {} ({} bytes) for a {}x{} container",
        upload.file_name.as_deref().unwrap_or("<unnamed>"),
        upload.image.len(),
        upload.container_width,
        upload.container_height
    );

    // CPU-bound: keep it off the async workers
    let model = state.model.clone();
    let result = tokio::task::spawn_blocking(move || {
        model.predict_bytes(&upload.image, upload.container_width, upload.container_height)
    })
    .await
    .map_err(|e| AppError::InternalError(format!("prediction task failed: {}", e)))??;

    tracing::info!("Recommendation: {}", result.recommendation);
    Ok(Json(result))
}
