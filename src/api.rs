//! HTTP handlers for the prediction service.
//!
//! `GET /` describes the service, `GET /health` reports whether the model and
//! scaler are loaded, and `POST /predict` scores one application record.

use crate::error::PipelineError;
use crate::metrics::PipelineMetrics;
use crate::service::InferenceContext;
use crate::types::{HealthResponse, PredictionResponse, RawApplicationRecord};
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, warn};
use uuid::Uuid;

/// Shared state handed to every handler.
pub struct AppState {
    /// `None` only when artifacts could not be loaded
    pub context: Option<Arc<InferenceContext>>,
    pub model_loaded: bool,
    pub scaler_loaded: bool,
    pub metrics: Arc<PipelineMetrics>,
}

impl AppState {
    /// State for a fully loaded service.
    pub fn new(context: Arc<InferenceContext>, metrics: Arc<PipelineMetrics>) -> Self {
        Self {
            context: Some(context),
            model_loaded: true,
            scaler_loaded: true,
            metrics,
        }
    }

    /// State for a service whose artifacts are not (all) available.
    pub fn unloaded(model_loaded: bool, scaler_loaded: bool) -> Self {
        Self {
            context: None,
            model_loaded,
            scaler_loaded,
            metrics: Arc::new(PipelineMetrics::new()),
        }
    }
}

/// Build the axum [`Router`] with all routes.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
        .route("/predict", post(predict_handler))
        .with_state(state)
}

impl IntoResponse for PipelineError {
    fn into_response(self) -> Response {
        let status = match &self {
            PipelineError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            PipelineError::SchemaIntrospection(_) | PipelineError::Computation(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            PipelineError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        };
        error_response(status, &self.to_string())
    }
}

fn error_response(status: StatusCode, detail: &str) -> Response {
    (status, Json(serde_json::json!({ "detail": detail }))).into_response()
}

/// `GET /`: service description.
pub async fn root_handler() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "message": "Credit Default Prediction API",
        "status": "running",
        "endpoints": {
            "health": "/health",
            "predict": "/predict",
        },
    }))
}

/// `GET /health`: artifact status.
pub async fn health_handler(State(state): State<Arc<AppState>>) -> Response {
    let healthy = state.context.is_some() && state.model_loaded && state.scaler_loaded;
    if healthy {
        let body = HealthResponse {
            status: "healthy".to_string(),
            model_loaded: true,
            scaler_loaded: true,
            detail: None,
        };
        return (StatusCode::OK, Json(body)).into_response();
    }

    warn!(
        model_loaded = state.model_loaded,
        scaler_loaded = state.scaler_loaded,
        "Health check failed"
    );
    let body = HealthResponse {
        status: "unhealthy".to_string(),
        model_loaded: state.model_loaded,
        scaler_loaded: state.scaler_loaded,
        detail: Some("Model or scaler not loaded".to_string()),
    };
    (StatusCode::SERVICE_UNAVAILABLE, Json(body)).into_response()
}

/// `POST /predict`: score one application record.
pub async fn predict_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<RawApplicationRecord>, JsonRejection>,
) -> Response {
    let request_id = Uuid::new_v4();

    let record = match payload {
        Ok(Json(record)) => record,
        Err(rejection) => {
            warn!(%request_id, error = %rejection.body_text(), "Rejected prediction request");
            state.metrics.record_failure("validation");
            return match rejection {
                JsonRejection::JsonDataError(_) => {
                    PipelineError::Validation(rejection.body_text()).into_response()
                }
                other => error_response(other.status(), &other.body_text()),
            };
        }
    };

    let Some(context) = state.context.as_ref() else {
        state.metrics.record_failure("unavailable");
        return PipelineError::Unavailable("Model or scaler not loaded".to_string())
            .into_response();
    };

    let start_time = Instant::now();
    match context.predict(&record) {
        Ok(prediction) => {
            let processing_time = start_time.elapsed();
            state.metrics.record_prediction(
                processing_time,
                prediction.label,
                prediction.probability_default,
            );
            debug!(
                %request_id,
                prediction = prediction.label.as_str(),
                probability_default = prediction.probability_default,
                processing_time_us = processing_time.as_micros() as u64,
                "Prediction served"
            );
            Json(PredictionResponse::from(prediction)).into_response()
        }
        Err(e) => {
            error!(%request_id, kind = e.kind(), error = %e, "Prediction failed");
            state.metrics.record_failure(e.kind());
            e.into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{identity_scaler, sample_forest, sample_record};
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    fn test_state() -> Arc<AppState> {
        let context =
            InferenceContext::new(Box::new(sample_forest()), &identity_scaler()).unwrap();
        Arc::new(AppState::new(
            Arc::new(context),
            Arc::new(PipelineMetrics::new()),
        ))
    }

    /// Helper: parse a JSON response body into a `serde_json::Value`.
    async fn json_body(resp: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(resp.into_body(), 1024 * 1024)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn predict_request(body: &serde_json::Value) -> Request<Body> {
        Request::post("/predict")
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(body).unwrap()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_root_lists_endpoints() {
        let app = router(test_state());
        let req = Request::get("/").body(Body::empty()).unwrap();

        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let json = json_body(resp).await;
        assert_eq!(json["status"], "running");
        assert_eq!(json["endpoints"]["health"], "/health");
        assert_eq!(json["endpoints"]["predict"], "/predict");
    }

    #[tokio::test]
    async fn test_health_loaded() {
        let app = router(test_state());
        let req = Request::get("/health").body(Body::empty()).unwrap();

        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let json = json_body(resp).await;
        assert_eq!(json["status"], "healthy");
        assert_eq!(json["model_loaded"], true);
        assert_eq!(json["scaler_loaded"], true);
    }

    #[tokio::test]
    async fn test_health_unloaded() {
        let app = router(Arc::new(AppState::unloaded(true, false)));
        let req = Request::get("/health").body(Body::empty()).unwrap();

        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);

        let json = json_body(resp).await;
        assert_eq!(json["status"], "unhealthy");
        assert_eq!(json["model_loaded"], true);
        assert_eq!(json["scaler_loaded"], false);
        assert!(json["detail"].is_string());
    }

    #[tokio::test]
    async fn test_predict_success() {
        let app = router(test_state());
        let body = serde_json::to_value(sample_record()).unwrap();

        let resp = app.oneshot(predict_request(&body)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let json = json_body(resp).await;
        assert_eq!(json["status"], "success");
        assert_eq!(json["prediction"], 0);
        let probability = json["probability_default"].as_f64().unwrap();
        assert!((probability - 0.3).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_predict_wrong_type_is_422() {
        let state = test_state();
        let app = router(Arc::clone(&state));
        let mut body = serde_json::to_value(sample_record()).unwrap();
        body["SEX"] = serde_json::json!("female");

        let resp = app.oneshot(predict_request(&body)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let json = json_body(resp).await;
        assert!(json["detail"].as_str().unwrap().contains("SEX"));
        assert_eq!(
            state
                .metrics
                .predictions_served
                .load(std::sync::atomic::Ordering::Relaxed),
            0
        );
    }

    #[tokio::test]
    async fn test_predict_missing_field_is_422() {
        let app = router(test_state());
        let mut body = serde_json::to_value(sample_record()).unwrap();
        body.as_object_mut().unwrap().remove("PAY_AMT6");

        let resp = app.oneshot(predict_request(&body)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_predict_without_artifacts_is_503() {
        let app = router(Arc::new(AppState::unloaded(false, false)));
        let body = serde_json::to_value(sample_record()).unwrap();

        let resp = app.oneshot(predict_request(&body)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn test_pipeline_error_status_codes() {
        let cases = [
            (
                PipelineError::Validation("bad".into()),
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (
                PipelineError::SchemaIntrospection("none".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                PipelineError::Computation("boom".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                PipelineError::Unavailable("down".into()),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(err.into_response().status(), status);
        }
    }
}
