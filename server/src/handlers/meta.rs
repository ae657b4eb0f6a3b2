//! `GET /schema` and `GET /health`.

use axum::Json;
use axum::extract::State;
use credit_processing::ColumnSchema;
use serde::Serialize;
use std::sync::Arc;

use crate::state::AppState;

/// The upload format clients must follow.
#[derive(Debug, Serialize)]
pub struct SchemaResponse {
    pub schema: ColumnSchema,
    pub required_columns: Vec<String>,
    pub classes: Vec<String>,
    /// Feature layout of the cached state; absent when fitting per request.
    pub feature_names: Option<Vec<String>>,
}

pub async fn schema(State(state): State<Arc<AppState>>) -> Json<SchemaResponse> {
    let service = &state.service;
    let schema = service.schema().clone();
    let required_columns = schema
        .required_columns()
        .into_iter()
        .map(str::to_owned)
        .collect();

    Json(SchemaResponse {
        required_columns,
        classes: service.classifier().classes().to_vec(),
        feature_names: service
            .store()
            .current()
            .map(|fitted| fitted.feature_names().to_vec()),
        schema,
    })
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: String,
    pub uptime_seconds: u64,
    pub fitted: bool,
    pub n_features: usize,
}

pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: state.version.clone(),
        uptime_seconds: state.uptime_seconds(),
        fitted: state.service.store().is_fitted(),
        n_features: state.service.classifier().n_features(),
    })
}
