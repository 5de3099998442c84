use thiserror::Error;

/// Errors raised while evaluating a forest.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("expected {expected} features, got {actual}")]
    FeatureCount { expected: usize, actual: usize },

    #[error("model has no trees")]
    EmptyEnsemble,

    #[error("model validation failed: {0}")]
    ValidationFailed(String),
}

/// Errors returned by the model store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("model file not found: {0}")]
    NotFound(String),

    #[error("model file is corrupt: {0}")]
    Corrupt(String),

    #[error("failed to encode model: {0}")]
    Encode(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Request-scoped prediction failures. All of these are client errors.
#[derive(Debug, Error)]
pub enum PredictionError {
    #[error("request body must be a JSON object")]
    NotAnObject,

    #[error("could not convert {field} to float: {value}")]
    InvalidField { field: &'static str, value: String },

    #[error("feature {name} is not a finite number")]
    NonFiniteFeature { name: &'static str },

    #[error("predicted price is out of range: {0}")]
    OutOfRange(f64),

    #[error(transparent)]
    Model(#[from] ModelError),
}
