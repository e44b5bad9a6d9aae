//! Fitted regression model families
//!
//! Each type holds exactly the parameters needed at inference time and
//! implements [`TrainedModel`]. Trees are stored as flat node arrays with
//! children always after their parent, which makes traversal loop-free.

use serde::{Deserialize, Serialize};

use super::storage::Artifact;
use super::TrainedModel;

fn check_finite(what: &str, values: &[f64]) -> Result<(), String> {
    match values.iter().position(|v| !v.is_finite()) {
        Some(i) => Err(format!("{what}[{i}] is not finite")),
        None => Ok(()),
    }
}

// ============================================================================
// Linear
// ============================================================================

/// y = intercept + Σ coefficients[j]·x[j]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearModel {
    pub coefficients: Vec<f64>,
    #[serde(default)]
    pub intercept: f64,
}

impl LinearModel {
    pub(crate) fn dot(&self, row: &[f64]) -> f64 {
        self.intercept
            + self
                .coefficients
                .iter()
                .zip(row)
                .map(|(c, x)| c * x)
                .sum::<f64>()
    }
}

impl TrainedModel for LinearModel {
    fn n_features(&self) -> usize {
        self.coefficients.len()
    }

    fn predict_row(&self, row: &[f64]) -> f64 {
        self.dot(row)
    }
}

impl Artifact for LinearModel {
    fn validate(&self) -> Result<(), String> {
        if self.coefficients.is_empty() {
            return Err("linear model has no coefficients".to_string());
        }
        check_finite("coefficients", &self.coefficients)?;
        check_finite("intercept", &[self.intercept])
    }
}

// ============================================================================
// Support Vector
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Kernel {
    Linear,
    Rbf { gamma: f64 },
    Polynomial { degree: u32, gamma: f64, coef0: f64 },
    Sigmoid { gamma: f64, coef0: f64 },
}

impl Kernel {
    pub fn apply(&self, a: &[f64], b: &[f64]) -> f64 {
        let dot = || a.iter().zip(b).map(|(x, y)| x * y).sum::<f64>();
        match *self {
            Self::Linear => dot(),
            Self::Rbf { gamma } => {
                let d2: f64 = a.iter().zip(b).map(|(x, y)| (x - y).powi(2)).sum();
                (-gamma * d2).exp()
            }
            Self::Polynomial { degree, gamma, coef0 } => {
                (gamma * dot() + coef0).powi(i32::try_from(degree).unwrap_or(i32::MAX))
            }
            Self::Sigmoid { gamma, coef0 } => (gamma * dot() + coef0).tanh(),
        }
    }
}

/// ε-SVR decision function: y = intercept + Σ dual_coef[i]·K(sv[i], x)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupportVectorModel {
    pub kernel: Kernel,
    pub support_vectors: Vec<Vec<f64>>,
    pub dual_coef: Vec<f64>,
    #[serde(default)]
    pub intercept: f64,
}

impl TrainedModel for SupportVectorModel {
    fn n_features(&self) -> usize {
        self.support_vectors.first().map_or(0, Vec::len)
    }

    fn predict_row(&self, row: &[f64]) -> f64 {
        self.intercept
            + self
                .support_vectors
                .iter()
                .zip(&self.dual_coef)
                .map(|(sv, c)| c * self.kernel.apply(sv, row))
                .sum::<f64>()
    }
}

impl Artifact for SupportVectorModel {
    fn validate(&self) -> Result<(), String> {
        if self.support_vectors.is_empty() {
            return Err("no support vectors".to_string());
        }
        if self.support_vectors.len() != self.dual_coef.len() {
            return Err(format!(
                "{} support vectors but {} dual coefficients",
                self.support_vectors.len(),
                self.dual_coef.len()
            ));
        }
        let width = self.n_features();
        if width == 0 {
            return Err("support vectors have no features".to_string());
        }
        if let Some(i) = self.support_vectors.iter().position(|sv| sv.len() != width) {
            return Err(format!("support vector {i} does not have {width} features"));
        }
        check_finite("dual_coef", &self.dual_coef)
    }
}

// ============================================================================
// Trees
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TreeNode {
    /// `x[feature] <= threshold` goes left; anything else (NaN included)
    /// goes right.
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf { value: f64 },
}

/// Single regression tree; node 0 is the root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionTree {
    pub n_features: usize,
    pub nodes: Vec<TreeNode>,
}

impl RegressionTree {
    fn leaf_value(&self, row: &[f64]) -> f64 {
        let mut idx = 0;
        loop {
            match self.nodes.get(idx) {
                Some(TreeNode::Leaf { value }) => return *value,
                Some(TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                }) => {
                    idx = if row.get(*feature).is_some_and(|x| x <= threshold) {
                        *left
                    } else {
                        *right
                    };
                }
                // unreachable for a validated tree
                None => return f64::NAN,
            }
        }
    }
}

impl TrainedModel for RegressionTree {
    fn n_features(&self) -> usize {
        self.n_features
    }

    fn predict_row(&self, row: &[f64]) -> f64 {
        self.leaf_value(row)
    }
}

impl Artifact for RegressionTree {
    fn validate(&self) -> Result<(), String> {
        if self.n_features == 0 {
            return Err("tree has no features".to_string());
        }
        if self.nodes.is_empty() {
            return Err("tree has no nodes".to_string());
        }
        for (i, node) in self.nodes.iter().enumerate() {
            match node {
                TreeNode::Leaf { value } => {
                    if !value.is_finite() {
                        return Err(format!("leaf {i} value is not finite"));
                    }
                }
                TreeNode::Split {
                    feature,
                    left,
                    right,
                    ..
                } => {
                    if *feature >= self.n_features {
                        return Err(format!(
                            "node {i} splits on feature {feature} but the tree has {} features",
                            self.n_features
                        ));
                    }
                    for child in [left, right] {
                        if *child <= i || *child >= self.nodes.len() {
                            return Err(format!("node {i} has child index {child} out of order"));
                        }
                    }
                }
            }
        }
        Ok(())
    }
}

fn validate_ensemble(n_features: usize, trees: &[RegressionTree]) -> Result<(), String> {
    if trees.is_empty() {
        return Err("ensemble has no trees".to_string());
    }
    for (t, tree) in trees.iter().enumerate() {
        if tree.n_features != n_features {
            return Err(format!(
                "tree {t} has {} features, ensemble has {n_features}",
                tree.n_features
            ));
        }
        tree.validate().map_err(|e| format!("tree {t}: {e}"))?;
    }
    Ok(())
}

/// Bagged trees; prediction is the mean over trees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForestModel {
    pub n_features: usize,
    pub trees: Vec<RegressionTree>,
}

impl TrainedModel for RandomForestModel {
    fn n_features(&self) -> usize {
        self.n_features
    }

    fn predict_row(&self, row: &[f64]) -> f64 {
        let sum: f64 = self.trees.iter().map(|t| t.leaf_value(row)).sum();
        sum / self.trees.len() as f64
    }
}

impl Artifact for RandomForestModel {
    fn validate(&self) -> Result<(), String> {
        validate_ensemble(self.n_features, &self.trees)
    }
}

/// Additive tree ensemble (XGBoost, LightGBM and CatBoost exports):
/// y = base_score + learning_rate · Σ tree(x)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradientBoostedModel {
    pub n_features: usize,
    #[serde(default)]
    pub base_score: f64,
    #[serde(default = "unit_learning_rate")]
    pub learning_rate: f64,
    pub trees: Vec<RegressionTree>,
}

fn unit_learning_rate() -> f64 {
    1.0
}

impl TrainedModel for GradientBoostedModel {
    fn n_features(&self) -> usize {
        self.n_features
    }

    fn predict_row(&self, row: &[f64]) -> f64 {
        let sum: f64 = self.trees.iter().map(|t| t.leaf_value(row)).sum();
        self.base_score + self.learning_rate * sum
    }
}

impl Artifact for GradientBoostedModel {
    fn validate(&self) -> Result<(), String> {
        check_finite("base_score", &[self.base_score])?;
        check_finite("learning_rate", &[self.learning_rate])?;
        validate_ensemble(self.n_features, &self.trees)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// x0 <= 1.5 -> 10, else (x1 <= 0 -> 20, else 30)
    fn stump() -> RegressionTree {
        RegressionTree {
            n_features: 2,
            nodes: vec![
                TreeNode::Split {
                    feature: 0,
                    threshold: 1.5,
                    left: 1,
                    right: 2,
                },
                TreeNode::Leaf { value: 10.0 },
                TreeNode::Split {
                    feature: 1,
                    threshold: 0.0,
                    left: 3,
                    right: 4,
                },
                TreeNode::Leaf { value: 20.0 },
                TreeNode::Leaf { value: 30.0 },
            ],
        }
    }

    #[test]
    fn test_linear_prediction() {
        let m = LinearModel {
            coefficients: vec![2.0, -1.0],
            intercept: 0.5,
        };
        assert_eq!(m.predict_row(&[3.0, 4.0]), 2.5);
    }

    #[test]
    fn test_tree_routing() {
        let t = stump();
        assert!(t.validate().is_ok());
        assert_eq!(t.predict_row(&[1.5, 9.0]), 10.0);
        assert_eq!(t.predict_row(&[2.0, -1.0]), 20.0);
        assert_eq!(t.predict_row(&[2.0, 1.0]), 30.0);
        assert_eq!(t.predict_row(&[f64::NAN, 1.0]), 30.0);
    }

    #[test]
    fn test_tree_cycle_rejected() {
        let mut t = stump();
        t.nodes[2] = TreeNode::Split {
            feature: 1,
            threshold: 0.0,
            left: 0,
            right: 4,
        };
        assert!(t.validate().unwrap_err().contains("out of order"));
    }

    #[test]
    fn test_tree_feature_out_of_range() {
        let mut t = stump();
        t.n_features = 1;
        assert!(t.validate().is_err());
    }

    #[test]
    fn test_forest_mean_and_boosting_sum() {
        let leaf = |v| RegressionTree {
            n_features: 2,
            nodes: vec![TreeNode::Leaf { value: v }],
        };
        let forest = RandomForestModel {
            n_features: 2,
            trees: vec![stump(), leaf(40.0)],
        };
        assert_eq!(forest.predict_row(&[0.0, 0.0]), 25.0);

        let boosted = GradientBoostedModel {
            n_features: 2,
            base_score: 1.0,
            learning_rate: 0.1,
            trees: vec![stump(), leaf(40.0)],
        };
        assert!((boosted.predict_row(&[0.0, 0.0]) - 6.0).abs() < 1e-12);
    }

    #[test]
    fn test_featureless_models_rejected() {
        let leaf = RegressionTree {
            n_features: 0,
            nodes: vec![TreeNode::Leaf { value: 1.0 }],
        };
        assert!(leaf.validate().unwrap_err().contains("no features"));
        let forest = RandomForestModel {
            n_features: 0,
            trees: vec![leaf],
        };
        assert!(forest.validate().is_err());
        let svr = SupportVectorModel {
            kernel: Kernel::Linear,
            support_vectors: vec![vec![]],
            dual_coef: vec![1.0],
            intercept: 0.0,
        };
        assert!(svr.validate().is_err());
    }

    #[test]
    fn test_ensemble_width_mismatch() {
        let forest = RandomForestModel {
            n_features: 3,
            trees: vec![stump()],
        };
        assert!(forest.validate().is_err());
    }

    #[test]
    fn test_kernels() {
        let a = [1.0, 2.0];
        let b = [3.0, 4.0];
        assert_eq!(Kernel::Linear.apply(&a, &b), 11.0);
        assert!((Kernel::Rbf { gamma: 0.5 }.apply(&a, &b) - (-4.0f64).exp()).abs() < 1e-12);
        let poly = Kernel::Polynomial {
            degree: 2,
            gamma: 1.0,
            coef0: 1.0,
        };
        assert_eq!(poly.apply(&a, &b), 144.0);
    }

    #[test]
    fn test_svr_prediction_and_validation() {
        let svr = SupportVectorModel {
            kernel: Kernel::Linear,
            support_vectors: vec![vec![1.0, 0.0], vec![0.0, 1.0]],
            dual_coef: vec![2.0, -1.0],
            intercept: 0.25,
        };
        assert!(svr.validate().is_ok());
        assert_eq!(svr.predict_row(&[1.0, 1.0]), 1.25);

        let broken = SupportVectorModel {
            dual_coef: vec![1.0],
            ..svr
        };
        assert!(broken.validate().is_err());
    }

    #[test]
    fn test_kernel_json_shape() {
        let k: Kernel = serde_json::from_str(r#"{"type": "rbf", "gamma": 0.1}"#).unwrap();
        assert_eq!(k, Kernel::Rbf { gamma: 0.1 });
    }
}
