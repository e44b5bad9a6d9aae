//! Shale volume from the gamma-ray log

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::broadcast::evaluate;
use super::range::{bounded, Bounds, RangePolicy, SENTINEL};
use super::{log_outcome, PetroError};
use crate::config::defaults::{
    LARIONOV_OLD_COEF, LARIONOV_OLD_EXP, LARIONOV_YOUNG_COEF, LARIONOV_YOUNG_EXP,
};
use crate::registry::{self, MethodEntry, UnknownMethod};
use crate::types::{Computed, LogValue, WarningKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ShaleVolumeMethod {
    Linear,
    LarionovYoung,
    LarionovOld,
    Clavier,
    Stieber,
}

pub const SHALE_VOLUME_METHODS: &[MethodEntry<ShaleVolumeMethod>] = &[
    MethodEntry {
        name: "linear",
        aliases: &["igr"],
        method: ShaleVolumeMethod::Linear,
        parameters: &["gr", "grmin", "grmax"],
    },
    MethodEntry {
        name: "larionov-young",
        aliases: &["larionov-tertiary"],
        method: ShaleVolumeMethod::LarionovYoung,
        parameters: &["gr", "grmin", "grmax"],
    },
    MethodEntry {
        name: "larionov-old",
        aliases: &["larionov-older"],
        method: ShaleVolumeMethod::LarionovOld,
        parameters: &["gr", "grmin", "grmax"],
    },
    MethodEntry {
        name: "clavier",
        aliases: &[],
        method: ShaleVolumeMethod::Clavier,
        parameters: &["gr", "grmin", "grmax"],
    },
    MethodEntry {
        name: "stieber",
        aliases: &[],
        method: ShaleVolumeMethod::Stieber,
        parameters: &["gr", "grmin", "grmax"],
    },
];

impl ShaleVolumeMethod {
    pub fn name(self) -> &'static str {
        registry::name_of(SHALE_VOLUME_METHODS, self).unwrap_or("unregistered")
    }

    /// Transform a gamma-ray index into shale volume.
    pub fn transform(self, igr: f64) -> f64 {
        match self {
            Self::Linear => igr,
            Self::LarionovYoung => LARIONOV_YOUNG_COEF * (2f64.powf(LARIONOV_YOUNG_EXP * igr) - 1.0),
            Self::LarionovOld => LARIONOV_OLD_COEF * (2f64.powf(LARIONOV_OLD_EXP * igr) - 1.0),
            Self::Clavier => 1.7 - (3.38 - (igr + 0.7).powi(2)).sqrt(),
            Self::Stieber => igr / (3.0 - 2.0 * igr),
        }
    }
}

impl FromStr for ShaleVolumeMethod {
    type Err = UnknownMethod;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        registry::lookup("shale volume", SHALE_VOLUME_METHODS, s).map(|e| e.method)
    }
}

/// Gamma-ray log and its clean/shale reference readings (API units).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShaleVolumeInputs {
    pub gr: LogValue,
    pub grmin: LogValue,
    pub grmax: LogValue,
}

impl ShaleVolumeInputs {
    pub fn new(gr: impl Into<LogValue>, grmin: impl Into<LogValue>, grmax: impl Into<LogValue>) -> Self {
        Self {
            gr: gr.into(),
            grmin: grmin.into(),
            grmax: grmax.into(),
        }
    }
}

/// Compute shale volume with the method registered under `method`.
pub fn shale_volume(method: &str, inputs: &ShaleVolumeInputs) -> Result<Computed, PetroError> {
    shale_volume_with(method.parse()?, inputs)
}

/// Typed twin of [`shale_volume`].
///
/// The gamma-ray index is brought into [0, 1] with the configured policy
/// before the nonlinear transforms, which are undefined outside it.
pub fn shale_volume_with(
    method: ShaleVolumeMethod,
    inputs: &ShaleVolumeInputs,
) -> Result<Computed, PetroError> {
    let policy = crate::config::get().shale_volume.policy;
    let out = evaluate(
        [("gr", &inputs.gr), ("grmin", &inputs.grmin), ("grmax", &inputs.grmax)],
        |out, i, [gr, grmin, grmax]| {
            let Some(igr) = igr_sample(out, i, gr, grmin, grmax, policy) else {
                return SENTINEL;
            };
            bounded(out, i, method.transform(igr), Bounds::FRACTION, policy, "shale volume")
        },
    )?;
    log_outcome("shale volume", method.name(), &out);
    Ok(out)
}

/// Gamma-ray index curve.
///
/// Formula: IGR = (GR − GRmin) / (GRmax − GRmin)
pub fn gamma_ray_index(
    gr: &LogValue,
    grmin: &LogValue,
    grmax: &LogValue,
    policy: RangePolicy,
) -> Result<Computed, PetroError> {
    evaluate(
        [("gr", gr), ("grmin", grmin), ("grmax", grmax)],
        |out, i, [gr, grmin, grmax]| igr_sample(out, i, gr, grmin, grmax, policy).unwrap_or(SENTINEL),
    )
}

/// `None` when GRmax == GRmin (already flagged).
fn igr_sample(
    out: &mut Computed,
    i: usize,
    gr: f64,
    grmin: f64,
    grmax: f64,
    policy: RangePolicy,
) -> Option<f64> {
    if grmax == grmin {
        out.push_warning(
            i,
            WarningKind::DivisionByZero,
            format!("grmax == grmin ({grmax}) would divide by zero"),
        );
        return None;
    }
    let igr = (gr - grmin) / (grmax - grmin);
    Some(bounded(out, i, igr, Bounds::FRACTION, policy, "gamma-ray index"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transforms_hit_both_ends() {
        for entry in SHALE_VOLUME_METHODS {
            let m = entry.method;
            assert!(m.transform(0.0).abs() < 1e-9, "{} at 0", m.name());
        }
        assert!((ShaleVolumeMethod::Linear.transform(1.0) - 1.0).abs() < 1e-12);
        assert!((ShaleVolumeMethod::Clavier.transform(1.0) - 1.0).abs() < 1e-9);
        assert!((ShaleVolumeMethod::Stieber.transform(1.0) - 1.0).abs() < 1e-12);
        assert!(ShaleVolumeMethod::LarionovYoung.transform(1.0) <= 1.0);
        assert!(ShaleVolumeMethod::LarionovOld.transform(1.0) <= 1.0);
    }

    #[test]
    fn test_nonlinear_below_linear_mid_range() {
        for m in [
            ShaleVolumeMethod::LarionovYoung,
            ShaleVolumeMethod::LarionovOld,
            ShaleVolumeMethod::Clavier,
            ShaleVolumeMethod::Stieber,
        ] {
            assert!(m.transform(0.5) < 0.5, "{} should be below linear", m.name());
        }
    }

    #[test]
    fn test_gamma_ray_index_curve() {
        let out = gamma_ray_index(
            &vec![20.0, 80.0, 140.0, 200.0].into(),
            &20.0.into(),
            &140.0.into(),
            RangePolicy::Clamp,
        )
        .unwrap();
        assert_eq!(out.values, vec![0.0, 0.5, 1.0, 1.0]);
        assert_eq!(out.warnings.len(), 1);
        assert_eq!(out.warnings[0].sample, 3);
    }

    #[test]
    fn test_flat_gamma_ray_reference() {
        let out = shale_volume("linear", &ShaleVolumeInputs::new(vec![50.0], 60.0, 60.0)).unwrap();
        assert_eq!(out.values, vec![0.0]);
        assert!(out.has_warning(WarningKind::DivisionByZero));
    }

    #[test]
    fn test_facade_larionov() {
        let out = shale_volume("larionov_young", &ShaleVolumeInputs::new(vec![80.0], 20.0, 140.0)).unwrap();
        let expected = 0.083 * (2f64.powf(3.7 * 0.5) - 1.0);
        assert!((out.values[0] - expected).abs() < 1e-12);
        assert!(out.is_clean());
    }
}
