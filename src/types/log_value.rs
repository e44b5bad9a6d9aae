//! Curve-or-scalar inputs for the petrophysics formulas

use serde::{Deserialize, Serialize};

/// A formula input: either one constant for the whole interval or one
/// sample per depth index.
///
/// Serialized untagged, so `2.65` and `[2.31, 2.40]` are both valid JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LogValue {
    Scalar(f64),
    Curve(Vec<f64>),
}

impl LogValue {
    /// Number of samples, or `None` for a scalar (broadcasts to any length).
    pub fn len(&self) -> Option<usize> {
        match self {
            Self::Scalar(_) => None,
            Self::Curve(samples) => Some(samples.len()),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Curve(samples) if samples.is_empty())
    }

    pub fn is_scalar(&self) -> bool {
        matches!(self, Self::Scalar(_))
    }

    /// Sample at depth index `i`. Scalars return their constant for every index.
    ///
    /// Callers resolve the output length first, so `i` is always in bounds
    /// for curves; an out-of-range index reads as NaN rather than panicking.
    pub fn at(&self, i: usize) -> f64 {
        match self {
            Self::Scalar(v) => *v,
            Self::Curve(samples) => samples.get(i).copied().unwrap_or(f64::NAN),
        }
    }
}

impl Default for LogValue {
    fn default() -> Self {
        Self::Curve(Vec::new())
    }
}

impl From<f64> for LogValue {
    fn from(v: f64) -> Self {
        Self::Scalar(v)
    }
}

impl From<Vec<f64>> for LogValue {
    fn from(v: Vec<f64>) -> Self {
        Self::Curve(v)
    }
}

impl From<&[f64]> for LogValue {
    fn from(v: &[f64]) -> Self {
        Self::Curve(v.to_vec())
    }
}

impl<const N: usize> From<[f64; N]> for LogValue {
    fn from(v: [f64; N]) -> Self {
        Self::Curve(v.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_broadcasts_to_every_index() {
        let v = LogValue::from(2.65);
        assert_eq!(v.len(), None);
        assert_eq!(v.at(0), 2.65);
        assert_eq!(v.at(1000), 2.65);
    }

    #[test]
    fn test_curve_indexing() {
        let v = LogValue::from(vec![2.31, 2.40]);
        assert_eq!(v.len(), Some(2));
        assert_eq!(v.at(1), 2.40);
        assert!(v.at(2).is_nan());
    }

    #[test]
    fn test_untagged_json() {
        let s: LogValue = serde_json::from_str("2.5").unwrap();
        assert_eq!(s, LogValue::Scalar(2.5));
        let c: LogValue = serde_json::from_str("[1.0, 2.0]").unwrap();
        assert_eq!(c, LogValue::Curve(vec![1.0, 2.0]));
    }
}
