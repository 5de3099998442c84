use rumah_core::{ModelError, StoreError};
use thiserror::Error;

/// Errors returned by the trainer.
#[derive(Debug, Error)]
pub enum TrainerError {
    #[error("dataset error: {0}")]
    Dataset(String),

    #[error("dataset has no usable rows after cleaning")]
    EmptyDataset,

    #[error("training error: {0}")]
    Training(String),

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error(transparent)]
    Store(#[from] StoreError),
}
