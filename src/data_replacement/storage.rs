//! JSON persistence for model artifacts

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::io;
use std::path::Path;
use tracing::debug;

use super::PredictError;

/// A persisted model component that can check its own consistency.
pub trait Artifact: Serialize + DeserializeOwned {
    /// Reject parameter sets that would index out of bounds or loop.
    fn validate(&self) -> Result<(), String>;
}

/// Save an artifact atomically (write temp file, then rename).
pub fn save_artifact<T: Serialize>(value: &T, path: &Path) -> Result<(), PredictError> {
    let io_err = |source| PredictError::Io {
        path: path.to_path_buf(),
        source,
    };
    let json = serde_json::to_vec_pretty(value)
        .map_err(|e| io_err(io::Error::new(io::ErrorKind::InvalidData, e)))?;

    let tmp_path = path.with_extension("json.tmp");
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(io_err)?;
    }
    std::fs::write(&tmp_path, &json).map_err(io_err)?;
    std::fs::rename(&tmp_path, path).map_err(io_err)?;
    debug!(path = %path.display(), bytes = json.len(), "artifact saved");
    Ok(())
}

/// Load an artifact without validating it.
pub fn load_artifact<T: DeserializeOwned>(path: &Path) -> Result<T, PredictError> {
    let data = std::fs::read(path).map_err(|source| PredictError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_slice(&data).map_err(|source| PredictError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Load an artifact and run its consistency checks.
pub fn load_validated<T: Artifact>(path: &Path) -> Result<T, PredictError> {
    let artifact: T = load_artifact(path)?;
    artifact.validate().map_err(|reason| PredictError::InvalidModel {
        path: path.to_path_buf(),
        reason,
    })?;
    Ok(artifact)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_replacement::LinearModel;

    #[test]
    fn test_disk_persistence() {
        let dir = tempfile::tempdir().expect("tmpdir");
        let path = dir.path().join("nested").join("linear_regression_fit_property.json");
        let model = LinearModel {
            coefficients: vec![0.5, -1.25],
            intercept: 3.0,
        };

        save_artifact(&model, &path).expect("save");
        assert!(!path.with_extension("json.tmp").exists());

        let loaded: LinearModel = load_validated(&path).expect("load");
        assert_eq!(loaded, model);
    }

    #[test]
    fn test_garbage_is_parse_error() {
        let dir = tempfile::tempdir().expect("tmpdir");
        let path = dir.path().join("broken.json");
        std::fs::write(&path, b"{ not json").expect("write");
        let err = load_artifact::<LinearModel>(&path).unwrap_err();
        assert!(matches!(err, PredictError::Parse { .. }));
    }

    #[test]
    fn test_invalid_model_rejected_on_load() {
        let dir = tempfile::tempdir().expect("tmpdir");
        let path = dir.path().join("linear.json");
        std::fs::write(&path, br#"{"coefficients": [], "intercept": 1.0}"#).expect("write");
        let err = load_validated::<LinearModel>(&path).unwrap_err();
        assert!(matches!(err, PredictError::InvalidModel { .. }));
    }
}
