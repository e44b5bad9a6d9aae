//! Water saturation from resistivity
//!
//! Archie for clean formations; Simandoux, Indonesia and Fertl add a shale
//! conductivity term and collapse to Archie when Vsh = 0.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::broadcast::evaluate;
use super::range::{bounded, Bounds, RangePolicy};
use super::{log_outcome, require, PetroError};
use crate::config::defaults::WATER_BEARING_SW;
use crate::config::SaturationConfig;
use crate::registry::{self, MethodEntry, UnknownMethod};
use crate::types::{Computed, LogValue, WarningKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SaturationMethod {
    Archie,
    Simandoux,
    Indonesia,
    Fertl,
}

pub const SATURATION_METHODS: &[MethodEntry<SaturationMethod>] = &[
    MethodEntry {
        name: "archie",
        aliases: &[],
        method: SaturationMethod::Archie,
        parameters: &["rt", "rw", "phi", "a", "m", "n"],
    },
    MethodEntry {
        name: "simandoux",
        aliases: &["modified-simandoux"],
        method: SaturationMethod::Simandoux,
        parameters: &["rt", "rw", "phi", "vsh", "rsh", "a", "m", "n"],
    },
    MethodEntry {
        name: "indonesia",
        aliases: &["poupon-leveaux"],
        method: SaturationMethod::Indonesia,
        parameters: &["rt", "rw", "phi", "vsh", "rsh", "a", "m", "n"],
    },
    MethodEntry {
        name: "fertl",
        aliases: &[],
        method: SaturationMethod::Fertl,
        parameters: &["rt", "rw", "phi", "vsh", "a", "m", "n", "alpha"],
    },
];

impl SaturationMethod {
    pub fn name(self) -> &'static str {
        registry::name_of(SATURATION_METHODS, self).unwrap_or("unregistered")
    }
}

impl FromStr for SaturationMethod {
    type Err = UnknownMethod;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        registry::lookup("water saturation", SATURATION_METHODS, s).map(|e| e.method)
    }
}

/// Inputs for the saturation facade.
///
/// Archie constants and the Fertl α fall back to the `[saturation]` config
/// section when left unset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SaturationInputs {
    /// True formation resistivity (ohm·m)
    pub rt: LogValue,
    /// Formation water resistivity (ohm·m)
    pub rw: LogValue,
    /// Effective porosity (v/v)
    pub phi: LogValue,
    #[serde(default)]
    pub vsh: Option<LogValue>,
    /// Shale resistivity (ohm·m)
    #[serde(default)]
    pub rsh: Option<LogValue>,
    /// Tortuosity factor
    #[serde(default)]
    pub a: Option<f64>,
    /// Cementation exponent
    #[serde(default)]
    pub m: Option<f64>,
    /// Saturation exponent
    #[serde(default)]
    pub n: Option<f64>,
    #[serde(default)]
    pub alpha: Option<f64>,
}

impl SaturationInputs {
    pub fn new(rt: impl Into<LogValue>, rw: impl Into<LogValue>, phi: impl Into<LogValue>) -> Self {
        Self {
            rt: rt.into(),
            rw: rw.into(),
            phi: phi.into(),
            ..Self::default()
        }
    }

    pub fn vsh(mut self, v: impl Into<LogValue>) -> Self {
        self.vsh = Some(v.into());
        self
    }

    pub fn rsh(mut self, v: impl Into<LogValue>) -> Self {
        self.rsh = Some(v.into());
        self
    }

    pub fn archie(mut self, a: f64, m: f64, n: f64) -> Self {
        self.a = Some(a);
        self.m = Some(m);
        self.n = Some(n);
        self
    }

    pub fn alpha(mut self, alpha: f64) -> Self {
        self.alpha = Some(alpha);
        self
    }
}

#[derive(Debug, Clone, Copy)]
struct Constants {
    a: f64,
    m: f64,
    n: f64,
    alpha: f64,
}

impl Constants {
    fn resolve(inputs: &SaturationInputs, cfg: &SaturationConfig) -> Self {
        Self {
            a: inputs.a.unwrap_or(cfg.archie_a),
            m: inputs.m.unwrap_or(cfg.archie_m),
            n: inputs.n.unwrap_or(cfg.archie_n),
            alpha: inputs.alpha.unwrap_or(cfg.fertl_alpha),
        }
    }
}

/// Compute water saturation with the method registered under `method`.
pub fn water_saturation(method: &str, inputs: &SaturationInputs) -> Result<Computed, PetroError> {
    water_saturation_with(method.parse()?, inputs)
}

/// Typed twin of [`water_saturation`].
///
/// Samples with a non-positive resistivity or porosity are flagged and
/// reported as fully water-bearing (Sw = 1).
pub fn water_saturation_with(
    method: SaturationMethod,
    inputs: &SaturationInputs,
) -> Result<Computed, PetroError> {
    let cfg = &crate::config::get().saturation;
    let k = Constants::resolve(inputs, cfg);
    let policy = cfg.policy;
    let name = method.name();
    let base = [("rt", &inputs.rt), ("rw", &inputs.rw), ("phi", &inputs.phi)];

    let out = match method {
        SaturationMethod::Archie => evaluate(base, |out, i, [rt, rw, phi]| {
            if !positive(out, i, &[("rt", rt), ("rw", rw), ("phi", phi)]) {
                return WATER_BEARING_SW;
            }
            finish(out, i, archie(rt, rw, phi, k), policy, name)
        })?,
        SaturationMethod::Simandoux | SaturationMethod::Indonesia => {
            let vsh = require(name, "vsh", &inputs.vsh)?;
            let rsh = require(name, "rsh", &inputs.rsh)?;
            evaluate(
                [base[0], base[1], base[2], ("vsh", vsh), ("rsh", rsh)],
                |out, i, [rt, rw, phi, vsh, rsh]| {
                    if !positive(out, i, &[("rt", rt), ("rw", rw), ("phi", phi), ("rsh", rsh)]) {
                        return WATER_BEARING_SW;
                    }
                    let vsh = shale_fraction(out, i, vsh);
                    let sw = if method == SaturationMethod::Simandoux {
                        simandoux(rt, rw, phi, vsh, rsh, k)
                    } else {
                        indonesia(rt, rw, phi, vsh, rsh, k)
                    };
                    finish(out, i, sw, policy, name)
                },
            )?
        }
        SaturationMethod::Fertl => {
            let vsh = require(name, "vsh", &inputs.vsh)?;
            evaluate(
                [base[0], base[1], base[2], ("vsh", vsh)],
                |out, i, [rt, rw, phi, vsh]| {
                    if !positive(out, i, &[("rt", rt), ("rw", rw), ("phi", phi)]) {
                        return WATER_BEARING_SW;
                    }
                    let vsh = shale_fraction(out, i, vsh);
                    finish(out, i, fertl(rt, rw, phi, vsh, k), policy, name)
                },
            )?
        }
    };
    log_outcome("water saturation", name, &out);
    Ok(out)
}

/// Flag every non-positive sample; true when all are usable.
fn positive(out: &mut Computed, i: usize, samples: &[(&str, f64)]) -> bool {
    let mut ok = true;
    for &(name, v) in samples {
        if v <= 0.0 {
            out.push_warning(
                i,
                WarningKind::NonPositiveInput,
                format!("{name} = {v} must be positive; Sw set to {WATER_BEARING_SW}"),
            );
            ok = false;
        }
    }
    ok
}

/// Vsh outside [0, 1] is clipped whatever the output policy.
fn shale_fraction(out: &mut Computed, i: usize, vsh: f64) -> f64 {
    bounded(out, i, vsh, Bounds::FRACTION, RangePolicy::Clamp, "vsh")
}

fn finish(out: &mut Computed, i: usize, sw: f64, policy: RangePolicy, method: &str) -> f64 {
    bounded(out, i, sw, Bounds::FRACTION, policy, &format!("{method} saturation"))
}

/// Sw = (a·Rw / (φ^m·Rt))^(1/n)
fn archie(rt: f64, rw: f64, phi: f64, k: Constants) -> f64 {
    (k.a * rw / (phi.powf(k.m) * rt)).powf(1.0 / k.n)
}

/// Modified Simandoux, solved for n = 2 and raised to 2/n:
///
/// Sw = [a·Rw / (2φ^m)] · [√((Vsh/Rsh)² + 4φ^m / (a·Rw·Rt)) − Vsh/Rsh]
fn simandoux(rt: f64, rw: f64, phi: f64, vsh: f64, rsh: f64, k: Constants) -> f64 {
    let phim = phi.powf(k.m);
    let c = vsh / rsh;
    let sw_n2 = (k.a * rw / (2.0 * phim)) * ((c * c + 4.0 * phim / (k.a * rw * rt)).sqrt() - c);
    sw_n2.powf(2.0 / k.n)
}

/// Poupon-Leveaux (Indonesia equation):
///
/// 1/√Rt = [Vsh^(1 − Vsh/2) / √Rsh + φ^(m/2) / √(a·Rw)] · Sw^(n/2)
fn indonesia(rt: f64, rw: f64, phi: f64, vsh: f64, rsh: f64, k: Constants) -> f64 {
    let shale = vsh.powf(1.0 - vsh / 2.0) / rsh.sqrt();
    let clean = phi.powf(k.m / 2.0) / (k.a * rw).sqrt();
    ((1.0 / rt.sqrt()) / (shale + clean)).powf(2.0 / k.n)
}

/// Sw = φ^(−m/2) · [√(a·Rw/Rt + (α·Vsh/2)²) − α·Vsh/2], raised to 2/n
fn fertl(rt: f64, rw: f64, phi: f64, vsh: f64, k: Constants) -> f64 {
    let half = k.alpha * vsh / 2.0;
    let sw_n2 = phi.powf(-k.m / 2.0) * ((k.a * rw / rt + half * half).sqrt() - half);
    sw_n2.powf(2.0 / k.n)
}

#[cfg(test)]
mod tests {
    use super::*;

    const K: Constants = Constants {
        a: 1.0,
        m: 2.0,
        n: 2.0,
        alpha: 0.3,
    };

    #[test]
    fn test_archie_reference() {
        let out = water_saturation("archie", &SaturationInputs::new(vec![20.0], 0.05, 0.2)).unwrap();
        assert!((out.values[0] - 0.25).abs() < 1e-12);
        assert!(out.is_clean());
    }

    #[test]
    fn test_shaly_models_reduce_to_archie_when_clean() {
        let expected = archie(20.0, 0.05, 0.2, K);
        assert!((simandoux(20.0, 0.05, 0.2, 0.0, 4.0, K) - expected).abs() < 1e-12);
        assert!((indonesia(20.0, 0.05, 0.2, 0.0, 4.0, K) - expected).abs() < 1e-12);
        assert!((fertl(20.0, 0.05, 0.2, 0.0, K) - expected).abs() < 1e-12);
    }

    #[test]
    fn test_shale_lowers_saturation() {
        let clean = archie(20.0, 0.05, 0.2, K);
        assert!(simandoux(20.0, 0.05, 0.2, 0.3, 4.0, K) < clean);
        assert!(indonesia(20.0, 0.05, 0.2, 0.3, 4.0, K) < clean);
        assert!(fertl(20.0, 0.05, 0.2, 0.3, K) < clean);
    }

    #[test]
    fn test_non_positive_inputs_are_water_bearing() {
        let inputs = SaturationInputs::new(vec![20.0, 0.0, 20.0], vec![0.05, 0.05, -1.0], 0.2);
        let out = water_saturation("archie", &inputs).unwrap();
        assert_eq!(out.values[1], 1.0);
        assert_eq!(out.values[2], 1.0);
        assert_eq!(out.warnings_at(1).count(), 1);
        assert!(out.warnings.iter().all(|w| w.kind == WarningKind::NonPositiveInput));
    }

    #[test]
    fn test_low_resistivity_clamped_to_one() {
        let out = water_saturation("archie", &SaturationInputs::new(0.5, 0.05, 0.1)).unwrap();
        assert_eq!(out.values, vec![1.0]);
        assert!(out.has_warning(WarningKind::OutOfRange));
    }

    #[test]
    fn test_shaly_methods_require_shale_inputs() {
        let inputs = SaturationInputs::new(20.0, 0.05, 0.2);
        assert_eq!(
            water_saturation("simandoux", &inputs),
            Err(PetroError::MissingParameter {
                method: "simandoux",
                parameter: "vsh"
            })
        );
        assert!(water_saturation("fertl", &inputs.clone().vsh(0.1)).is_ok());
        assert!(water_saturation("indonesia", &inputs.vsh(0.1)).is_err());
    }

    #[test]
    fn test_missing_required_curve_fails_to_parse() {
        assert!(serde_json::from_str::<SaturationInputs>(r#"{"rw": 0.05, "phi": 0.2}"#).is_err());
        assert!(serde_json::from_str::<SaturationInputs>(r#"{"rt": 20.0, "rw": [0.05, 0.05]}"#).is_err());
        let inputs: SaturationInputs =
            serde_json::from_str(r#"{"rt": 20.0, "rw": 0.05, "phi": 0.2}"#).unwrap();
        assert_eq!(inputs, SaturationInputs::new(20.0, 0.05, 0.2));
    }

    #[test]
    fn test_excess_vsh_clipped_not_discarded() {
        let mut out = Computed::default();
        assert_eq!(shale_fraction(&mut out, 0, 1.2), 1.0);
        assert!(out.has_warning(WarningKind::OutOfRange));

        let full = water_saturation("fertl", &SaturationInputs::new(20.0, 0.05, 0.2).vsh(1.0)).unwrap();
        let excess = water_saturation("fertl", &SaturationInputs::new(20.0, 0.05, 0.2).vsh(1.2)).unwrap();
        assert_eq!(excess.values, full.values);
        assert!(excess.has_warning(WarningKind::OutOfRange));
    }

    #[test]
    fn test_explicit_constants_override_config() {
        let inputs = SaturationInputs::new(20.0, 0.05, 0.2).archie(0.62, 2.15, 2.0);
        let out = water_saturation("archie", &inputs).unwrap();
        let expected = (0.62 * 0.05 / (0.2f64.powf(2.15) * 20.0)).sqrt();
        assert!((out.values[0] - expected).abs() < 1e-12);
    }
}
