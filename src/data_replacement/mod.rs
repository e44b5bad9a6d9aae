//! Data Replacement Module
//!
//! Predicts a missing log curve from other curves with a previously fitted
//! regression model. Fitting happens elsewhere; this module only loads the
//! fitted parameters from JSON artifacts and evaluates them.
//!
//! ## Artifacts
//!
//! One file per model family in a caller-supplied directory:
//!
//! | Method key                 | File(s)                                                       |
//! |----------------------------|---------------------------------------------------------------|
//! | `linear_regression`        | `linear_regression_fit_property.json`                         |
//! | `polynomial_regression`    | `linear_regression_fit_property.json`, `polynomial_settings.json` |
//! | `support_vector_regression`| `support_vector_fit_property.json`                            |
//! | `decision_tree_regression` | `decision_tree_fit_property.json`                             |
//! | `random_forest_regression` | `random_forest_fit_property.json`                             |
//! | `xgboost_regression`       | `xgboost_fit_property.json`                                   |
//! | `lightgbm_regression`      | `lightgbm_fit_property.json`                                  |
//! | `catboost_regression`      | `catboost_fit_property.json`                                  |

pub mod models;
pub mod polynomial;
pub mod storage;

pub use models::{
    GradientBoostedModel, Kernel, LinearModel, RandomForestModel, RegressionTree,
    SupportVectorModel, TreeNode,
};
pub use polynomial::{PolynomialModel, PolynomialSettings};
pub use storage::{load_artifact, load_validated, save_artifact, Artifact};

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;
use tracing::{debug, info};

use crate::registry::{self, MethodEntry, UnknownMethod};

/// Settings file read next to the linear coefficients by `polynomial_regression`.
pub const POLYNOMIAL_SETTINGS_FILE: &str = "polynomial_settings.json";

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Error)]
pub enum PredictError {
    #[error(transparent)]
    UnknownMethod(#[from] UnknownMethod),

    #[error("shape mismatch: {0}")]
    ShapeMismatch(String),

    #[error("failed to access model artifact {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse model artifact {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid model artifact {path}: {reason}")]
    InvalidModel { path: PathBuf, reason: String },
}

// ============================================================================
// Registry
// ============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelMethod {
    #[default]
    LinearRegression,
    PolynomialRegression,
    SupportVectorRegression,
    DecisionTreeRegression,
    RandomForestRegression,
    XgboostRegression,
    LightgbmRegression,
    CatboostRegression,
}

pub const MODEL_METHODS: &[MethodEntry<ModelMethod>] = &[
    MethodEntry {
        name: "linear_regression",
        aliases: &["linear"],
        method: ModelMethod::LinearRegression,
        parameters: &["features"],
    },
    MethodEntry {
        name: "polynomial_regression",
        aliases: &["polinomial_regression"],
        method: ModelMethod::PolynomialRegression,
        parameters: &["features"],
    },
    MethodEntry {
        name: "support_vector_regression",
        aliases: &["suporte_vector_regression", "svr"],
        method: ModelMethod::SupportVectorRegression,
        parameters: &["features"],
    },
    MethodEntry {
        name: "decision_tree_regression",
        aliases: &[],
        method: ModelMethod::DecisionTreeRegression,
        parameters: &["features"],
    },
    MethodEntry {
        name: "random_forest_regression",
        aliases: &["random_florest_regression"],
        method: ModelMethod::RandomForestRegression,
        parameters: &["features"],
    },
    MethodEntry {
        name: "xgboost_regression",
        aliases: &[],
        method: ModelMethod::XgboostRegression,
        parameters: &["features"],
    },
    MethodEntry {
        name: "lightgbm_regression",
        aliases: &[],
        method: ModelMethod::LightgbmRegression,
        parameters: &["features"],
    },
    MethodEntry {
        name: "catboost_regression",
        aliases: &[],
        method: ModelMethod::CatboostRegression,
        parameters: &["features"],
    },
];

impl ModelMethod {
    pub fn name(self) -> &'static str {
        registry::name_of(MODEL_METHODS, self).unwrap_or("unregistered")
    }

    /// File holding the fitted parameters for this family.
    pub fn artifact_file(self) -> &'static str {
        match self {
            Self::LinearRegression | Self::PolynomialRegression => {
                "linear_regression_fit_property.json"
            }
            Self::SupportVectorRegression => "support_vector_fit_property.json",
            Self::DecisionTreeRegression => "decision_tree_fit_property.json",
            Self::RandomForestRegression => "random_forest_fit_property.json",
            Self::XgboostRegression => "xgboost_fit_property.json",
            Self::LightgbmRegression => "lightgbm_fit_property.json",
            Self::CatboostRegression => "catboost_fit_property.json",
        }
    }
}

impl FromStr for ModelMethod {
    type Err = UnknownMethod;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        registry::lookup("prediction", MODEL_METHODS, s).map(|e| e.method)
    }
}

impl std::fmt::Display for ModelMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

// ============================================================================
// Feature Matrix
// ============================================================================

/// Row-major feature matrix: one row per depth sample, one column per
/// input curve.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(try_from = "Vec<Vec<f64>>")]
pub struct FeatureMatrix {
    data: Vec<f64>,
    n_rows: usize,
    n_cols: usize,
}

impl FeatureMatrix {
    /// Build from rows; every row must have the same, non-zero width.
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self, PredictError> {
        let n_rows = rows.len();
        let n_cols = rows.first().map_or(0, Vec::len);
        if n_rows > 0 && n_cols == 0 {
            return Err(PredictError::ShapeMismatch(format!(
                "{n_rows} rows with no features"
            )));
        }
        let mut data = Vec::with_capacity(n_rows * n_cols);
        for (i, row) in rows.into_iter().enumerate() {
            if row.len() != n_cols {
                return Err(PredictError::ShapeMismatch(format!(
                    "row {i} has {} features, row 0 has {n_cols}",
                    row.len()
                )));
            }
            data.extend(row);
        }
        Ok(Self { data, n_rows, n_cols })
    }

    /// Build from equal-length curves, one per feature.
    pub fn from_columns(columns: &[Vec<f64>]) -> Result<Self, PredictError> {
        let n_cols = columns.len();
        let n_rows = columns.first().map_or(0, Vec::len);
        if let Some((j, c)) = columns.iter().enumerate().find(|(_, c)| c.len() != n_rows) {
            return Err(PredictError::ShapeMismatch(format!(
                "curve {j} has {} samples, curve 0 has {n_rows}",
                c.len()
            )));
        }
        let mut data = Vec::with_capacity(n_rows * n_cols);
        for i in 0..n_rows {
            data.extend(columns.iter().map(|c| c[i]));
        }
        Ok(Self { data, n_rows, n_cols })
    }

    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    pub fn n_cols(&self) -> usize {
        self.n_cols
    }

    pub fn is_empty(&self) -> bool {
        self.n_rows == 0
    }

    pub fn rows(&self) -> impl Iterator<Item = &[f64]> {
        // chunks_exact panics on a zero chunk size
        self.data.chunks_exact(self.n_cols.max(1)).take(self.n_rows)
    }
}

impl TryFrom<Vec<Vec<f64>>> for FeatureMatrix {
    type Error = PredictError;

    fn try_from(rows: Vec<Vec<f64>>) -> Result<Self, Self::Error> {
        Self::from_rows(rows)
    }
}

// ============================================================================
// Trained Model
// ============================================================================

/// A fitted regression model that maps one feature row to one value.
pub trait TrainedModel: std::fmt::Debug + Send + Sync {
    /// Number of input features the model was fitted on.
    fn n_features(&self) -> usize;

    /// Predict a single row. `row.len()` equals [`n_features`](Self::n_features).
    fn predict_row(&self, row: &[f64]) -> f64;

    fn predict(&self, features: &FeatureMatrix) -> Result<Vec<f64>, PredictError> {
        if features.is_empty() {
            return Ok(Vec::new());
        }
        if features.n_cols() != self.n_features() {
            return Err(PredictError::ShapeMismatch(format!(
                "model expects {} features, got {}",
                self.n_features(),
                features.n_cols()
            )));
        }
        Ok(features.rows().map(|row| self.predict_row(row)).collect())
    }
}

// ============================================================================
// Facade
// ============================================================================

/// Model directory from the `[prediction]` config section.
pub fn default_model_dir() -> PathBuf {
    crate::config::get().prediction.model_dir.clone()
}

/// Load and validate the artifacts of `method` from `dir`.
pub fn load_model(method: ModelMethod, dir: &Path) -> Result<Box<dyn TrainedModel>, PredictError> {
    let path = dir.join(method.artifact_file());
    let model: Box<dyn TrainedModel> = match method {
        ModelMethod::LinearRegression => Box::new(storage::load_validated::<LinearModel>(&path)?),
        ModelMethod::PolynomialRegression => {
            let linear = storage::load_validated::<LinearModel>(&path)?;
            let settings_path = dir.join(POLYNOMIAL_SETTINGS_FILE);
            let settings = storage::load_validated::<PolynomialSettings>(&settings_path)?;
            let model = PolynomialModel::new(settings, linear).map_err(|reason| {
                PredictError::InvalidModel {
                    path: path.clone(),
                    reason,
                }
            })?;
            Box::new(model)
        }
        ModelMethod::SupportVectorRegression => {
            Box::new(storage::load_validated::<SupportVectorModel>(&path)?)
        }
        ModelMethod::DecisionTreeRegression => {
            Box::new(storage::load_validated::<RegressionTree>(&path)?)
        }
        ModelMethod::RandomForestRegression => {
            Box::new(storage::load_validated::<RandomForestModel>(&path)?)
        }
        ModelMethod::XgboostRegression
        | ModelMethod::LightgbmRegression
        | ModelMethod::CatboostRegression => {
            Box::new(storage::load_validated::<GradientBoostedModel>(&path)?)
        }
    };
    info!(
        method = method.name(),
        path = %path.display(),
        n_features = model.n_features(),
        "model loaded"
    );
    Ok(model)
}

/// Predict one value per row of `features` with the model registered under
/// `method`, loaded from `dir`.
pub fn predict(
    features: &FeatureMatrix,
    method: &str,
    dir: impl AsRef<Path>,
) -> Result<Vec<f64>, PredictError> {
    predict_with(features, method.parse()?, dir.as_ref())
}

/// Typed twin of [`predict`].
pub fn predict_with(
    features: &FeatureMatrix,
    method: ModelMethod,
    dir: &Path,
) -> Result<Vec<f64>, PredictError> {
    let model = load_model(method, dir)?;
    let values = model.predict(features)?;
    debug!(method = method.name(), rows = values.len(), "predicted");
    Ok(values)
}
