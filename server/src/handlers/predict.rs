//! `POST /predict` and `POST /refit`.

use axum::Json;
use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, State};
use credit_inference::{InferenceError, PredictionResponse};
use credit_processing::io::read_csv_bytes;
use serde::Serialize;
use std::sync::Arc;
use tracing::info;

use super::upload::Upload;
use crate::error::ApiError;
use crate::state::AppState;

/// Sample rows of the uploaded CSV and classify them.
pub async fn predict(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<PredictionResponse>, ApiError> {
    let upload = Upload::read(multipart?).await?;
    let sample_count = upload.sample_count()?;
    let csv = upload.csv()?.clone();
    info!(
        "Prediction request: {:?} ({} bytes), {} samples",
        upload.file_name,
        csv.len(),
        sample_count
    );

    let mut rng = state.request_rng();
    let worker = Arc::clone(&state);
    let response = tokio::task::spawn_blocking(move || -> credit_inference::Result<_> {
        let df = read_csv_bytes(&csv)?;
        worker.service.predict(&df, sample_count, &mut rng)
    })
    .await
    .map_err(|e| ApiError::Task(e.to_string()))??;

    Ok(Json(response))
}

#[derive(Debug, Serialize)]
pub struct RefitResponse {
    pub rows: usize,
    pub n_features: usize,
    pub feature_names: Vec<String>,
}

/// Refit the cached pipeline state on an uploaded training CSV.
pub async fn refit(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<RefitResponse>, ApiError> {
    let upload = Upload::read(multipart?).await?;
    let csv = upload.csv().map_err(ApiError::Refit)?.clone();

    let worker = Arc::clone(&state);
    let response = tokio::task::spawn_blocking(move || -> credit_inference::Result<_> {
        let df = read_csv_bytes(&csv)?;
        if df.height() == 0 {
            return Err(InferenceError::EmptyDataset);
        }
        let fitted = worker.service.refit(&df)?;
        Ok(RefitResponse {
            rows: df.height(),
            n_features: fitted.n_features(),
            feature_names: fitted.feature_names().to_vec(),
        })
    })
    .await
    .map_err(|e| ApiError::Task(e.to_string()))?
    .map_err(ApiError::Refit)?;

    info!(
        "Refitted pipeline state: {} features from {} rows",
        response.n_features, response.rows
    );
    Ok(Json(response))
}
