//! Rumah Core - house-price inference primitives
//!
//! Provides the pieces shared by training and serving:
//!
//! Modules:
//! - `features`: Raw house attributes and the engineered feature vector
//! - `forest`: Random-forest regression model (trees, parameters, inference)
//! - `store`: Model persistence on the local filesystem
//! - `predictor`: Request parsing and log-price inference
//! - `errors`: Error types for the above

pub mod errors;
pub mod features;
pub mod forest;
pub mod predictor;
pub mod store;

pub use errors::{ModelError, PredictionError, StoreError};
pub use features::{build_features, FeatureVector, RawAttributes, FEATURE_COUNT, FEATURE_NAMES};
pub use forest::{ForestParams, MaxFeatures, Node, RandomForest, RegressionTree};
pub use predictor::{PredictRequest, Predictor};
pub use store::ModelStore;

/// Crate version string for application-info reporting
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
