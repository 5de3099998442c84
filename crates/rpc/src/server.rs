use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use axum::body::{Body, Bytes};
use axum::extract::State;
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use metrics::counter;
use metrics_exporter_prometheus::PrometheusHandle;
use rumah_core::Predictor;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{debug, info, warn};

/// Static application-info record exposed on `/metrics`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct AppInfo {
    pub version: String,
    /// Git commit the binary was built from
    pub commit: String,
    /// `loaded` or `trained`
    pub model_source: String,
}

#[derive(Clone)]
pub struct AppState {
    pub predictor: Predictor,
    pub start_time: Instant,
    pub req_count: Arc<AtomicUsize>,
    pub metrics: Option<PrometheusHandle>,
    pub app_info: AppInfo,
}

impl AppState {
    pub fn new(predictor: Predictor, app_info: AppInfo) -> Self {
        Self {
            predictor,
            start_time: Instant::now(),
            req_count: Arc::new(AtomicUsize::new(0)),
            metrics: None,
            app_info,
        }
    }

    pub fn with_metrics(mut self, handle: Option<PrometheusHandle>) -> Self {
        self.metrics = handle;
        self
    }

    fn record_request(&self, endpoint: &'static str) -> u64 {
        counter!("http_requests_total", "endpoint" => endpoint).increment(1);
        self.req_count.fetch_add(1, Ordering::Relaxed) as u64 + 1
    }

    fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}

pub type SharedState = Arc<AppState>;

#[derive(Debug, Serialize, Deserialize)]
pub struct PredictResponse {
    pub predicted_price: u64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

#[derive(Debug)]
struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn new<S: Into<String>>(status: StatusCode, message: S) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    fn bad_request<S: Into<String>>(message: S) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let payload = Json(ErrorResponse {
            error: self.message,
        });
        (self.status, payload).into_response()
    }
}

pub async fn start_server(state: AppState, addr: &str) -> Result<()> {
    let shared = Arc::new(state);
    let app = build_router(shared);
    let listener = bind_listener(addr).await?;
    info!("HTTP API listening on {}", addr);
    axum::serve(listener, app)
        .await
        .context("HTTP server terminated unexpectedly")
}

async fn bind_listener(addr: &str) -> Result<tokio::net::TcpListener> {
    if let Ok(socket_addr) = addr.parse::<SocketAddr>() {
        tokio::net::TcpListener::bind(socket_addr)
            .await
            .with_context(|| format!("failed to bind HTTP listener on {socket_addr}"))
    } else {
        tokio::net::TcpListener::bind(addr)
            .await
            .with_context(|| format!("failed to bind HTTP listener on {addr}"))
    }
}

pub fn build_router(state: SharedState) -> Router {
    Router::new()
        .route("/predict", post(handle_predict))
        .route("/health", get(handle_health))
        .route("/metrics", get(handle_metrics))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn handle_predict(
    State(state): State<SharedState>,
    body: Bytes,
) -> Result<Json<PredictResponse>, ApiError> {
    let req_total = state.record_request("predict");

    let result = serde_json::from_slice::<Value>(&body)
        .map_err(|err| err.to_string())
        .and_then(|value| {
            state
                .predictor
                .predict_json(&value)
                .map_err(|err| err.to_string())
        });

    match result {
        Ok(predicted_price) => {
            counter!("predictions_total", "outcome" => "ok").increment(1);
            debug!(req_total, predicted_price, "prediction served");
            Ok(Json(PredictResponse { predicted_price }))
        }
        Err(message) => {
            counter!("predictions_total", "outcome" => "error").increment(1);
            warn!("/predict rejected request: {}", message);
            Err(ApiError::bad_request(message))
        }
    }
}

async fn handle_health(State(state): State<SharedState>) -> Json<HealthResponse> {
    state.record_request("health");
    Json(HealthResponse {
        status: "healthy".to_string(),
    })
}

async fn handle_metrics(State(state): State<SharedState>) -> Response {
    let req_total = state.record_request("metrics");

    let body = match &state.metrics {
        Some(handle) => handle.render(),
        None => render_fallback_metrics(&state, req_total),
    };

    let mut response = Response::new(Body::from(body));
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/plain; version=0.0.4"),
    );
    response
}

/// Text exposition used when no Prometheus recorder is installed.
fn render_fallback_metrics(state: &AppState, req_total: u64) -> String {
    let uptime = state.uptime_seconds();

    let mut metrics =
        "# HELP http_requests_total Total number of HTTP requests handled\n".to_string();
    metrics.push_str("# TYPE http_requests_total counter\n");
    metrics.push_str(&format!("http_requests_total {req_total}\n"));
    metrics.push_str("# HELP uptime_seconds Uptime of the service in seconds\n");
    metrics.push_str("# TYPE uptime_seconds gauge\n");
    metrics.push_str(&format!("uptime_seconds {uptime}\n"));
    metrics.push_str("# HELP app_info Application information\n");
    metrics.push_str("# TYPE app_info gauge\n");
    metrics.push_str(&format!(
        "app_info{{version=\"{}\",commit=\"{}\",model_source=\"{}\"}} 1\n",
        state.app_info.version, state.app_info.commit, state.app_info.model_source
    ));
    metrics
}
