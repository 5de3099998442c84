//! Persistence tests for the model store
//!
//! A model must predict bit-identically after a save/load round trip.

use anyhow::Result;
use rumah_core::{
    build_features, ForestParams, MaxFeatures, ModelStore, Node, Predictor, RandomForest,
    RawAttributes, RegressionTree, FEATURE_COUNT,
};
use tempfile::tempdir;

/// Build a small hand-made forest over the engineered features.
fn handmade_forest() -> RandomForest {
    let mut trees = Vec::new();
    for i in 0..16u32 {
        let feature = i % FEATURE_COUNT as u32;
        trees.push(RegressionTree::new(vec![
            Node::split(feature, 1.0 + f64::from(i) / 7.0, 1, 2),
            Node::leaf(20.0 + f64::from(i) * 0.013),
            Node::split(5, 0.4, 3, 4),
            Node::leaf(21.1 - f64::from(i) / 3.0),
            Node::leaf(22.7 + 1.0 / f64::from(i + 1)),
        ]));
    }

    let params = ForestParams {
        n_estimators: 16,
        max_depth: Some(2),
        max_features: MaxFeatures::Sqrt,
        ..ForestParams::default()
    };
    RandomForest::new(trees, params, FEATURE_COUNT)
}

#[test]
fn test_round_trip_predictions_are_bit_identical() -> Result<()> {
    let dir = tempdir()?;
    let store = ModelStore::new(dir.path().join("model.bin"));
    let model = handmade_forest();

    store.save(&model)?;
    let loaded = store.load()?;
    assert_eq!(loaded, model);

    let samples = [
        RawAttributes {
            floor_area: 100.0,
            land_area: 200.0,
            bedrooms: 3.0,
            bathrooms: 2.0,
            garages: 1.0,
        },
        RawAttributes::default(),
        RawAttributes {
            floor_area: 0.3,
            land_area: 0.7,
            bedrooms: 1.0,
            bathrooms: 0.0,
            garages: 5.0,
        },
    ];

    for raw in samples {
        let features = build_features(&raw);
        let before = model.predict(features.as_slice())?;
        let after = loaded.predict(features.as_slice())?;
        assert_eq!(before.to_bits(), after.to_bits());
    }

    Ok(())
}

#[test]
fn test_loaded_model_serves_predictions() -> Result<()> {
    let dir = tempdir()?;
    let store = ModelStore::new(dir.path().join("model.bin"));
    store.save(&handmade_forest())?;

    let predictor = Predictor::new(store.load()?);
    let body = serde_json::json!({"LB": 100, "LT": 200, "KT": 3, "KM": 2, "GRS": 1});
    let price = predictor.predict_json(&body)?;
    assert!(price > 0);

    Ok(())
}
