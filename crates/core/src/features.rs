//! House attributes and the engineered feature vector
//!
//! The model consumes a positional vector, so the order of `FEATURE_NAMES`
//! is part of the persisted model contract.

use serde::{Deserialize, Serialize};

/// Number of features in a [`FeatureVector`].
pub const FEATURE_COUNT: usize = 8;

/// Feature names in model input order.
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] =
    ["LB", "LT", "KT", "KM", "GRS", "LB_LT", "TOTAL_KAMAR", "LB_KT"];

/// Raw attributes of one house.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RawAttributes {
    /// Floor area (LB)
    pub floor_area: f64,
    /// Land area (LT)
    pub land_area: f64,
    /// Bedrooms (KT)
    pub bedrooms: f64,
    /// Bathrooms (KM)
    pub bathrooms: f64,
    /// Garages (GRS)
    pub garages: f64,
}

/// Engineered model input.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureVector(pub [f64; FEATURE_COUNT]);

impl FeatureVector {
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn floor_to_land_ratio(&self) -> f64 {
        self.0[5]
    }

    pub fn total_rooms(&self) -> f64 {
        self.0[6]
    }

    pub fn floor_area_times_bedrooms(&self) -> f64 {
        self.0[7]
    }
}

/// Build the feature vector for one house.
///
/// The floor-to-land ratio is 0 when the land area is 0. The same builder runs
/// for training rows and inference requests.
pub fn build_features(raw: &RawAttributes) -> FeatureVector {
    let ratio = if raw.land_area != 0.0 {
        raw.floor_area / raw.land_area
    } else {
        0.0
    };

    FeatureVector([
        raw.floor_area,
        raw.land_area,
        raw.bedrooms,
        raw.bathrooms,
        raw.garages,
        ratio,
        raw.bedrooms + raw.bathrooms,
        raw.floor_area * raw.bedrooms,
    ])
}
