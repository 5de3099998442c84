//! Model persistence on the local filesystem.
//!
//! The on-disk format is the bincode encoding of [`RandomForest`]. It carries
//! exact `f64` bits, so a saved model predicts identically after loading. The
//! format is not versioned.

use crate::errors::StoreError;
use crate::forest::RandomForest;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Reads and writes a single model file.
#[derive(Debug, Clone)]
pub struct ModelStore {
    path: PathBuf,
}

impl ModelStore {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Serialize `model` to the store path, creating or overwriting the file.
    pub fn save(&self, model: &RandomForest) -> Result<(), StoreError> {
        let bytes = bincode::serialize(model).map_err(|e| StoreError::Encode(e.to_string()))?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        // Write next to the target and rename so readers never see a partial file.
        let tmp_path = self.tmp_path();
        fs::write(&tmp_path, &bytes)?;
        fs::rename(&tmp_path, &self.path)?;

        info!(
            path = %self.path.display(),
            bytes = bytes.len(),
            digest = %digest_hex(&bytes),
            "model saved"
        );
        Ok(())
    }

    /// Deserialize the model at the store path.
    pub fn load(&self) -> Result<RandomForest, StoreError> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                return Err(StoreError::NotFound(self.path.display().to_string()))
            }
            Err(err) => return Err(StoreError::Io(err)),
        };

        let model: RandomForest =
            bincode::deserialize(&bytes).map_err(|e| StoreError::Corrupt(e.to_string()))?;
        model
            .validate()
            .map_err(|e| StoreError::Corrupt(e.to_string()))?;

        debug!(trees = model.trees.len(), nodes = model.node_count(), "model decoded");
        info!(
            path = %self.path.display(),
            bytes = bytes.len(),
            digest = %digest_hex(&bytes),
            "model loaded"
        );
        Ok(model)
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|name| name.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

/// BLAKE3 digest of serialized model bytes, hex encoded.
pub fn digest_hex(bytes: &[u8]) -> String {
    hex::encode(blake3::hash(bytes).as_bytes())
}
