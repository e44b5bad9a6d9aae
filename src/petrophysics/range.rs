//! Physical-range enforcement shared by every formula

use serde::{Deserialize, Serialize};

use crate::config::defaults;
use crate::types::{Computed, WarningKind};

/// Value substituted by [`RangePolicy::Sentinel`] and by division-by-zero guards.
pub const SENTINEL: f64 = 0.0;

/// Rounding slack: results this close to a bound are snapped silently.
const BOUND_EPSILON: f64 = 1e-12;

/// What to return for a sample whose raw result is physically implausible.
///
/// A warning is recorded under every policy; the policy only decides the value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RangePolicy {
    /// Replace with 0
    Sentinel,
    /// Clip into the bounds
    #[default]
    Clamp,
    /// Keep the raw value
    Propagate,
}

impl RangePolicy {
    pub fn resolve(self, raw: f64, bounds: Bounds) -> f64 {
        match self {
            Self::Sentinel => SENTINEL,
            Self::Clamp => raw.clamp(bounds.min, bounds.max),
            Self::Propagate => raw,
        }
    }
}

impl std::fmt::Display for RangePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sentinel => write!(f, "sentinel"),
            Self::Clamp => write!(f, "clamp"),
            Self::Propagate => write!(f, "propagate"),
        }
    }
}

/// Closed interval a derived quantity must lie in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: f64,
    pub max: f64,
}

impl Bounds {
    /// Porosity, shale volume, water saturation
    pub const FRACTION: Self = Self {
        min: defaults::FRACTION_MIN,
        max: defaults::FRACTION_MAX,
    };

    /// TOC in weight percent
    pub const TOC_PERCENT: Self = Self {
        min: defaults::TOC_MIN_PERCENT,
        max: defaults::TOC_MAX_PERCENT,
    };

    pub fn contains(&self, v: f64) -> bool {
        v >= self.min && v <= self.max
    }
}

/// Bring one raw result into `bounds`, recording a warning when it was not.
///
/// Non-finite results are flagged and returned as NaN regardless of policy.
pub(crate) fn bounded(
    out: &mut Computed,
    sample: usize,
    raw: f64,
    bounds: Bounds,
    policy: RangePolicy,
    quantity: &str,
) -> f64 {
    if !raw.is_finite() {
        out.push_warning(
            sample,
            WarningKind::NonFinite,
            format!("{quantity} is not finite ({raw}); check for missing input samples"),
        );
        return f64::NAN;
    }
    if bounds.contains(raw) {
        return raw;
    }
    if raw >= bounds.min - BOUND_EPSILON && raw <= bounds.max + BOUND_EPSILON {
        return raw.clamp(bounds.min, bounds.max);
    }
    out.push_warning(
        sample,
        WarningKind::OutOfRange,
        format!(
            "{quantity} = {raw:.4} outside [{}, {}] ({policy})",
            bounds.min, bounds.max
        ),
    );
    policy.resolve(raw, bounds)
}
