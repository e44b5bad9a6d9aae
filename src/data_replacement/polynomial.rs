//! Polynomial feature expansion for polynomial-augmented linear regression
//!
//! Terms are ordered by degree, then lexicographically by feature index
//! (combinations with replacement), e.g. for two features and degree 2:
//! `1, x0, x1, x0², x0·x1, x1²`.

use serde::{Deserialize, Serialize};

use super::models::LinearModel;
use super::storage::Artifact;
use super::TrainedModel;

/// Widest expansion a settings file may ask for.
pub const MAX_EXPANDED_FEATURES: usize = 100_000;

/// Contents of `polynomial_settings.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolynomialSettings {
    /// Width of the raw feature rows
    pub n_features: usize,
    pub degree: u32,
    /// Only products of distinct features (no x0², x1², ...)
    #[serde(default)]
    pub interaction_only: bool,
    #[serde(default = "default_include_bias")]
    pub include_bias: bool,
}

fn default_include_bias() -> bool {
    true
}

impl PolynomialSettings {
    pub fn new(n_features: usize, degree: u32) -> Self {
        Self {
            n_features,
            degree,
            interaction_only: false,
            include_bias: true,
        }
    }

    /// Feature index tuples, one per output column. The empty tuple is the
    /// bias column.
    pub fn terms(&self) -> Vec<Vec<usize>> {
        let mut terms = Vec::new();
        let start = usize::from(!self.include_bias);
        for d in start..=self.degree as usize {
            let mut current = Vec::with_capacity(d);
            push_combinations(self.n_features, d, 0, self.interaction_only, &mut current, &mut terms);
        }
        terms
    }

    /// Width of an expanded row.
    pub fn n_output_features(&self) -> usize {
        self.expanded_width().unwrap_or(usize::MAX)
    }

    /// Width of an expanded row without building the terms, or `None` past
    /// [`MAX_EXPANDED_FEATURES`].
    pub fn expanded_width(&self) -> Option<usize> {
        let mut width = 0usize;
        let start = usize::from(!self.include_bias);
        for d in start..=self.degree as usize {
            let count = if self.interaction_only {
                if d > self.n_features {
                    break;
                }
                binomial(self.n_features, d)?
            } else {
                // multisets of size d drawn from n features
                match (self.n_features + d).checked_sub(1) {
                    Some(pool) => binomial(pool, d)?,
                    None => 1,
                }
            };
            width = width.checked_add(count)?;
            if width > MAX_EXPANDED_FEATURES {
                return None;
            }
        }
        Some(width)
    }

    pub fn expand(&self, row: &[f64]) -> Vec<f64> {
        expand_with(&self.terms(), row)
    }
}

fn push_combinations(
    n: usize,
    remaining: usize,
    from: usize,
    distinct: bool,
    current: &mut Vec<usize>,
    out: &mut Vec<Vec<usize>>,
) {
    if remaining == 0 {
        out.push(current.clone());
        return;
    }
    for j in from..n {
        current.push(j);
        let next = if distinct { j + 1 } else { j };
        push_combinations(n, remaining - 1, next, distinct, current, out);
        current.pop();
    }
}

/// C(n, k), or `None` on overflow.
fn binomial(n: usize, k: usize) -> Option<usize> {
    if k > n {
        return Some(0);
    }
    let k = k.min(n - k);
    let mut acc = 1usize;
    for i in 1..=k {
        acc = acc.checked_mul(n - k + i)? / i;
    }
    Some(acc)
}

fn expand_with(terms: &[Vec<usize>], row: &[f64]) -> Vec<f64> {
    terms
        .iter()
        .map(|t| t.iter().map(|&j| row.get(j).copied().unwrap_or(f64::NAN)).product())
        .collect()
}

impl Artifact for PolynomialSettings {
    fn validate(&self) -> Result<(), String> {
        if self.n_features == 0 {
            return Err("polynomial settings need at least one feature".to_string());
        }
        if self.degree == 0 && !self.include_bias {
            return Err("degree 0 without bias expands to no columns".to_string());
        }
        if self.expanded_width().is_none() {
            return Err(format!(
                "degree {} over {} features expands past {MAX_EXPANDED_FEATURES} columns",
                self.degree, self.n_features
            ));
        }
        Ok(())
    }
}

/// Linear regression over polynomially expanded features.
#[derive(Debug, Clone, PartialEq)]
pub struct PolynomialModel {
    settings: PolynomialSettings,
    terms: Vec<Vec<usize>>,
    linear: LinearModel,
}

impl PolynomialModel {
    /// Pair settings with coefficients fitted on the expanded features.
    pub fn new(settings: PolynomialSettings, linear: LinearModel) -> Result<Self, String> {
        settings.validate()?;
        let width = settings.n_output_features();
        if linear.coefficients.len() != width {
            return Err(format!(
                "{} coefficients for {} expanded features (degree {}, {} inputs)",
                linear.coefficients.len(),
                width,
                settings.degree,
                settings.n_features
            ));
        }
        let terms = settings.terms();
        Ok(Self {
            settings,
            terms,
            linear,
        })
    }

    pub fn settings(&self) -> &PolynomialSettings {
        &self.settings
    }

    pub fn linear(&self) -> &LinearModel {
        &self.linear
    }
}

impl TrainedModel for PolynomialModel {
    fn n_features(&self) -> usize {
        self.settings.n_features
    }

    fn predict_row(&self, row: &[f64]) -> f64 {
        self.linear.dot(&expand_with(&self.terms, row))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_degree_two_order() {
        let s = PolynomialSettings::new(2, 2);
        assert_eq!(
            s.terms(),
            vec![vec![], vec![0], vec![1], vec![0, 0], vec![0, 1], vec![1, 1]]
        );
        assert_eq!(s.expand(&[2.0, 3.0]), vec![1.0, 2.0, 3.0, 4.0, 6.0, 9.0]);
    }

    #[test]
    fn test_interaction_only_without_bias() {
        let s = PolynomialSettings {
            n_features: 3,
            degree: 2,
            interaction_only: true,
            include_bias: false,
        };
        assert_eq!(s.n_output_features(), 6);
        assert_eq!(s.expand(&[1.0, 2.0, 3.0]), vec![1.0, 2.0, 3.0, 2.0, 3.0, 6.0]);
    }

    #[test]
    fn test_output_width_matches_binomial() {
        // C(n + d, d) columns with bias
        assert_eq!(PolynomialSettings::new(3, 3).n_output_features(), 20);
        assert_eq!(PolynomialSettings::new(1, 4).n_output_features(), 5);
    }

    #[test]
    fn test_model_prediction() {
        // y = 1 + x0² on [1, x0, x0²]
        let model = PolynomialModel::new(
            PolynomialSettings::new(1, 2),
            LinearModel {
                coefficients: vec![0.0, 0.0, 1.0],
                intercept: 1.0,
            },
        )
        .unwrap();
        assert_eq!(model.predict_row(&[3.0]), 10.0);
        assert_eq!(model.n_features(), 1);
    }

    #[test]
    fn test_coefficient_count_checked() {
        let err = PolynomialModel::new(
            PolynomialSettings::new(2, 2),
            LinearModel {
                coefficients: vec![1.0, 2.0],
                intercept: 0.0,
            },
        )
        .unwrap_err();
        assert!(err.contains("2 coefficients for 6 expanded features"));
    }

    #[test]
    fn test_width_counted_without_expanding() {
        for s in [
            PolynomialSettings::new(2, 2),
            PolynomialSettings::new(4, 3),
            PolynomialSettings {
                n_features: 4,
                degree: 6,
                interaction_only: true,
                include_bias: false,
            },
        ] {
            assert_eq!(s.expanded_width(), Some(s.terms().len()), "{s:?}");
        }
    }

    #[test]
    fn test_huge_degree_rejected_before_expansion() {
        let s = PolynomialSettings::new(10, 50);
        assert_eq!(s.expanded_width(), None);
        assert!(s.validate().unwrap_err().contains("expands past"));

        let err = PolynomialModel::new(
            s,
            LinearModel {
                coefficients: vec![1.0; 3],
                intercept: 0.0,
            },
        )
        .unwrap_err();
        assert!(err.contains("expands past"));

        assert_eq!(PolynomialSettings::new(1, u32::MAX).expanded_width(), None);
    }
}
