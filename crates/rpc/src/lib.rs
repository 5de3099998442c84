//! HTTP inference API
//!
//! Serves `POST /predict`, `GET /health` and `GET /metrics` over a shared,
//! read-only [`rumah_core::Predictor`].

pub mod server;

pub use server::{
    build_router, start_server, AppInfo, AppState, HealthResponse, PredictResponse, SharedState,
};
