//! Integration tests for the trainer and startup bootstrap
//!
//! Ensures identical models are produced across runs and that the bootstrap
//! prefers a stored model but recovers from a missing or corrupt one.

use anyhow::Result;
use rumah_core::{build_features, ModelStore, MaxFeatures, RawAttributes};
use rumah_trainer::{
    load_or_train, train_model_from_path, BootstrapConfig, ModelSource, ParamSpace, SearchConfig,
    TrainerError, TrainingParams,
};
use std::io::Write;
use std::path::Path;
use tempfile::TempDir;

/// Write a synthetic housing dataset as CSV
fn write_synthetic_dataset(path: &Path, rows: usize) -> Result<()> {
    let mut file = std::fs::File::create(path)?;
    writeln!(file, "NO,NAMA RUMAH,HARGA,LB,LT,KT,KM,GRS")?;

    for i in 0..rows {
        let x = i as f64;
        let lb = 45.0 + (x * 23.0) % 300.0;
        let lt = 50.0 + (x * 31.0) % 400.0;
        let kt = 1.0 + (x % 6.0);
        let km = 1.0 + (x % 4.0);
        let grs = x % 3.0;
        let price = 2.5e8 + lb * 1.1e7 + lt * 6.0e6 + grs * 7.5e7;
        writeln!(file, "{},Rumah {},{},{},{},{},{},{}", i + 1, i + 1, price, lb, lt, kt, km, grs)?;
    }

    file.flush()?;
    Ok(())
}

fn quick_params() -> TrainingParams {
    TrainingParams {
        search: SearchConfig {
            n_iter: 4,
            cv: 3,
            seed: 42,
            space: ParamSpace {
                n_estimators: vec![8, 16],
                max_depth: vec![None, Some(8)],
                min_samples_split: vec![2, 5],
                min_samples_leaf: vec![1, 2],
                max_features: vec![MaxFeatures::Sqrt, MaxFeatures::All],
            },
        },
        ..TrainingParams::default()
    }
}

fn config_in(dir: &TempDir) -> BootstrapConfig {
    BootstrapConfig {
        model_path: dir.path().join("models").join("model.bin"),
        dataset_path: dir.path().join("dataset.csv"),
        training: quick_params(),
    }
}

fn reference_features() -> Vec<f64> {
    build_features(&RawAttributes {
        floor_area: 120.0,
        land_area: 150.0,
        bedrooms: 3.0,
        bathrooms: 2.0,
        garages: 1.0,
    })
    .as_slice()
    .to_vec()
}

#[test]
fn test_deterministic_training() -> Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("dataset.csv");
    write_synthetic_dataset(&path, 60)?;

    let first = train_model_from_path(&path, quick_params())?;
    let second = train_model_from_path(&path, quick_params())?;

    assert_eq!(first.best_params, second.best_params);
    assert_eq!(first.cv_score.to_bits(), second.cv_score.to_bits());
    assert_eq!(first.model, second.model);

    let features = reference_features();
    assert_eq!(
        first.model.predict(&features)?.to_bits(),
        second.model.predict(&features)?.to_bits()
    );

    Ok(())
}

#[test]
fn test_bootstrap_trains_and_persists() -> Result<()> {
    let dir = TempDir::new()?;
    let config = config_in(&dir);
    write_synthetic_dataset(&config.dataset_path, 40)?;

    let boot = load_or_train(&config)?;
    assert_eq!(boot.source, ModelSource::Trained);
    assert!(config.model_path.exists());

    let stored = ModelStore::new(&config.model_path).load()?;
    assert_eq!(stored, boot.model);

    Ok(())
}

#[test]
fn test_bootstrap_prefers_existing_model() -> Result<()> {
    let dir = TempDir::new()?;
    let config = config_in(&dir);
    write_synthetic_dataset(&config.dataset_path, 40)?;

    let trained = load_or_train(&config)?;

    // The dataset is no longer needed once a model is stored.
    std::fs::remove_file(&config.dataset_path)?;

    let loaded = load_or_train(&config)?;
    assert_eq!(loaded.source, ModelSource::Loaded);
    assert_eq!(loaded.model, trained.model);

    Ok(())
}

#[test]
fn test_bootstrap_retrains_corrupt_model() -> Result<()> {
    let dir = TempDir::new()?;
    let config = config_in(&dir);
    write_synthetic_dataset(&config.dataset_path, 40)?;

    std::fs::create_dir_all(dir.path().join("models"))?;
    std::fs::write(&config.model_path, b"not a model")?;

    let boot = load_or_train(&config)?;
    assert_eq!(boot.source, ModelSource::Trained);
    assert_eq!(ModelStore::new(&config.model_path).load()?, boot.model);

    Ok(())
}

#[test]
fn test_bootstrap_without_model_or_dataset_fails() -> Result<()> {
    let dir = TempDir::new()?;
    let config = config_in(&dir);

    let err = load_or_train(&config).unwrap_err();
    assert!(matches!(err, TrainerError::Dataset(_)));
    assert!(!config.model_path.exists());

    Ok(())
}

#[test]
fn test_trained_model_tracks_price_trend() -> Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("dataset.csv");
    write_synthetic_dataset(&path, 80)?;

    let report = train_model_from_path(&path, quick_params())?;

    let small = build_features(&RawAttributes {
        floor_area: 50.0,
        land_area: 60.0,
        bedrooms: 1.0,
        bathrooms: 1.0,
        garages: 0.0,
    });
    let large = build_features(&RawAttributes {
        floor_area: 330.0,
        land_area: 440.0,
        bedrooms: 5.0,
        bathrooms: 4.0,
        garages: 2.0,
    });

    let small_price = report.model.predict(small.as_slice())?.exp();
    let large_price = report.model.predict(large.as_slice())?.exp();
    assert!(large_price > small_price);

    let holdout = report.holdout.expect("80 rows leave a holdout partition");
    assert_eq!(holdout.samples, 16);

    Ok(())
}
