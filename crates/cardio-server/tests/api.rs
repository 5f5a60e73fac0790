//! Router tests against the bundled model artifacts.

use std::path::PathBuf;
use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use cardio_core::{PredictResponse, Tip};
use cardio_server::api::{ApiState, create_router};
use cardio_server::{ModelError, Predictor, ServerConfig};
use http_body_util::BodyExt;
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use tower::ServiceExt;

fn config() -> ServerConfig {
    let model_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("model");
    ServerConfig {
        tips_file: Some(model_dir.join("health_tips.json")),
        model_dir,
        ..ServerConfig::default()
    }
}

fn app() -> Router {
    let predictor = Predictor::load(&config()).unwrap();
    create_router(Arc::new(ApiState { predictor }))
}

async fn send(request: Request<Body>) -> (StatusCode, Value) {
    let response = app().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap())
}

fn post_json(body: Value) -> Request<Body> {
    Request::post("/predict")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn post_form(body: &str) -> Request<Body> {
    Request::post("/predict")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn patient() -> Value {
    json!({
        "age": 54, "sex": 1, "education": 2, "currentSmoker": 1, "cigsPerDay": 10,
        "BPMeds": 0, "prevalentStroke": 0, "prevalentHyp": 1, "diabetes": 0,
        "BMI": 27.5, "heartRate": 72, "sysBP": 140, "diaBP": 90, "restingBpS": 140,
        "maxHeartRate": 150, "chestPainType": 4, "cholesterol": 240, "totChol": 240,
        "fastingBloodSugar": 0, "restingEcg": 0, "exerciseAngina": 0, "oldpeak": 1.5,
        "stSlope": 2
    })
}

#[tokio::test]
async fn health_reports_models() {
    let request = Request::get("/health").body(Body::empty()).unwrap();
    let (status, body) = send(request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["uci_features"], 11);
    assert_eq!(body["fram_features"], 15);
}

#[tokio::test]
async fn json_update_returns_full_response() {
    let (status, body) = send(post_json(json!({"base_inputs": patient(), "modified": {}}))).await;
    assert_eq!(status, StatusCode::OK);
    let resp: PredictResponse = serde_json::from_value(body).unwrap();

    let p = resp.final_prob.unwrap();
    assert!((0.0..=1.0).contains(&p));
    assert_eq!(p, (p * 10_000.0).round() / 10_000.0);
    assert!(resp.uci_prob.is_some() && resp.fram_prob.is_some());
    assert!(resp.final_cat.is_some());

    let top = resp.top_features.unwrap();
    assert_eq!(top.len(), 10);
    // age is weighted by both models.
    assert_eq!(top[0], "age");

    let values = resp.top_features_values.unwrap();
    assert_eq!(values[0].name, "age");
    assert_eq!(values[0].value, json!(54));

    let tips = resp.tips.unwrap();
    assert_eq!(tips.len(), 10);
    assert_eq!(
        tips[0],
        Tip::feature(
            "age",
            "Risk rises with age; keep up regular cardiovascular check-ups."
        )
    );
}

#[tokio::test]
async fn modified_values_change_the_prediction() {
    let (_, low) = send(post_json(json!({"base_inputs": patient(), "modified": {}}))).await;
    let (_, high) = send(post_json(json!({
        "base_inputs": patient(),
        "modified": {"age": 85, "resting bp s": 200, "oldpeak": 6}
    })))
    .await;
    let low = low["final_prob"].as_f64().unwrap();
    let high = high["final_prob"].as_f64().unwrap();
    assert!(high > low, "{high} should exceed {low}");
}

#[tokio::test]
async fn form_post_matches_json_post() {
    let form: String = patient()
        .as_object()
        .unwrap()
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&");
    let (status, from_form) = send(post_form(&form)).await;
    assert_eq!(status, StatusCode::OK);
    let (_, from_json) = send(post_json(json!({"base_inputs": patient()}))).await;
    assert_eq!(from_form["final_prob"], from_json["final_prob"]);
    assert_eq!(from_form["top_features"], from_json["top_features"]);
}

#[tokio::test]
async fn bad_bodies_are_rejected() {
    let (status, body) = send(
        Request::post("/predict")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let (status, body) = send(
        Request::post("/predict")
            .header(header::CONTENT_TYPE, "text/plain")
            .body(Body::from("age=50"))
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
    assert!(body["error"].as_str().unwrap().contains("text/plain"));
}

#[test]
fn missing_artifacts_fail_startup() {
    let config = ServerConfig {
        model_dir: PathBuf::from("/nonexistent/models"),
        ..ServerConfig::default()
    };
    let err = Predictor::load(&config).unwrap_err();
    assert!(matches!(err, ModelError::Missing(_)));
    assert!(err.to_string().contains("model_uci.json"));
}
