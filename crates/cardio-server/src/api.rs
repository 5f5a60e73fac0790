//! HTTP API.

use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::{FromRequest, Request, State};
use axum::http::header::CONTENT_TYPE;
use axum::routing::{get, post};
use axum::{Form, Json, Router};
use cardio_core::{PredictRequest, PredictResponse};
use serde::Serialize;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::error::ApiError;
use crate::inputs::{self, UserInputs};
use crate::predictor::Predictor;

/// Shared handler state.
pub struct ApiState {
    pub predictor: Predictor,
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uci_features: usize,
    pub fram_features: usize,
}

/// Create the API router
pub fn create_router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/predict", post(predict))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check(State(state): State<Arc<ApiState>>) -> Json<HealthResponse> {
    let classifier = state.predictor.classifier();
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uci_features: classifier.uci.feature_names.len(),
        fram_features: classifier.fram.feature_names.len(),
    })
}

/// Score a JSON live update (`{base_inputs, modified}`) or a form post.
async fn predict(
    State(state): State<Arc<ApiState>>,
    request: Request,
) -> Result<Json<PredictResponse>, ApiError> {
    let content_type = request
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_ascii_lowercase();
    let inputs = if content_type.starts_with("application/json") {
        let Json(body) = Json::<PredictRequest>::from_request(request, &())
            .await
            .map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;
        inputs::merge(&body.base_inputs, &body.modified)
    } else if content_type.starts_with("application/x-www-form-urlencoded") {
        let Form(form) = Form::<HashMap<String, String>>::from_request(request, &())
            .await
            .map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;
        inputs::from_form(&form)
    } else {
        return Err(ApiError::UnsupportedMediaType(content_type));
    };
    Ok(Json(score(&state.predictor, &inputs)))
}

fn score(predictor: &Predictor, inputs: &UserInputs) -> PredictResponse {
    let response = predictor.predict(inputs);
    info!(
        inputs = inputs.len(),
        final_prob = response.final_prob,
        category = response.final_cat.as_deref(),
        "prediction served"
    );
    response
}
