//! Single-request price inference.
//!
//! Requests carry the five raw attributes under their dataset column names.
//! Absent fields default to 0; present fields must be numbers or numeric
//! strings.

use crate::errors::PredictionError;
use crate::features::{build_features, RawAttributes, FEATURE_NAMES};
use crate::forest::RandomForest;
use serde_json::Value;
use std::sync::Arc;

/// Largest price that converts to `u64` without saturating.
const MAX_PRICE: f64 = 9.007_199_254_740_992e15;

/// Parsed prediction request.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PredictRequest {
    pub attributes: RawAttributes,
}

impl PredictRequest {
    pub fn new(attributes: RawAttributes) -> Self {
        Self { attributes }
    }

    /// Parse a JSON request body.
    pub fn from_json(value: &Value) -> Result<Self, PredictionError> {
        let object = value.as_object().ok_or(PredictionError::NotAnObject)?;

        let field = |name: &'static str| -> Result<f64, PredictionError> {
            match object.get(name) {
                None => Ok(0.0),
                Some(value) => coerce_f64(name, value),
            }
        };

        Ok(Self {
            attributes: RawAttributes {
                floor_area: field("LB")?,
                land_area: field("LT")?,
                bedrooms: field("KT")?,
                bathrooms: field("KM")?,
                garages: field("GRS")?,
            },
        })
    }
}

fn coerce_f64(field: &'static str, value: &Value) -> Result<f64, PredictionError> {
    let parsed = match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok(),
        _ => None,
    };

    parsed.ok_or_else(|| PredictionError::InvalidField {
        field,
        value: value.to_string(),
    })
}

/// Applies the shared model to individual requests.
///
/// Cloning is cheap; clones share the same immutable forest.
#[derive(Debug, Clone)]
pub struct Predictor {
    model: Arc<RandomForest>,
}

impl Predictor {
    pub fn new(model: RandomForest) -> Self {
        Self {
            model: Arc::new(model),
        }
    }

    pub fn from_shared(model: Arc<RandomForest>) -> Self {
        Self { model }
    }

    pub fn model(&self) -> &RandomForest {
        &self.model
    }

    /// Log-scale model output for one request.
    pub fn predict_log_price(&self, request: &PredictRequest) -> Result<f64, PredictionError> {
        let features = build_features(&request.attributes);
        if let Some((&name, _)) = FEATURE_NAMES
            .iter()
            .zip(features.as_slice())
            .find(|(_, value)| !value.is_finite())
        {
            return Err(PredictionError::NonFiniteFeature { name });
        }
        Ok(self.model.predict(features.as_slice())?)
    }

    /// Price estimate rounded half-to-even to a whole unit.
    pub fn predict_price(&self, request: &PredictRequest) -> Result<u64, PredictionError> {
        let price = self.predict_log_price(request)?.exp().round_ties_even();
        if !price.is_finite() || !(0.0..=MAX_PRICE).contains(&price) {
            return Err(PredictionError::OutOfRange(price));
        }
        Ok(price as u64)
    }

    /// Parse a JSON body and predict its price.
    pub fn predict_json(&self, body: &Value) -> Result<u64, PredictionError> {
        let request = PredictRequest::from_json(body)?;
        self.predict_price(&request)
    }
}
