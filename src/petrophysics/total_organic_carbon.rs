//! Total organic carbon from sonic and resistivity logs
//!
//! One registered method today (`passey`); the registry keeps the facade
//! signature stable when more are added.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::broadcast::evaluate;
use super::range::{bounded, Bounds, RangePolicy};
use super::{log_outcome, PetroError};
use crate::config::defaults::{PASSEY_A, PASSEY_B, PASSEY_SONIC_SCALE, TOC_MIN_PERCENT};
use crate::registry::{self, MethodEntry, UnknownMethod};
use crate::types::{Computed, LogValue, WarningKind};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TocMethod {
    #[default]
    Passey,
}

pub const TOC_METHODS: &[MethodEntry<TocMethod>] = &[MethodEntry {
    name: "passey",
    aliases: &["delta-log-r", "dlogr"],
    method: TocMethod::Passey,
    parameters: &["dt", "rt", "dtbaseline", "logrtbaseline", "lom"],
}];

impl TocMethod {
    pub fn name(self) -> &'static str {
        registry::name_of(TOC_METHODS, self).unwrap_or("unregistered")
    }
}

impl FromStr for TocMethod {
    type Err = UnknownMethod;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        registry::lookup("toc", TOC_METHODS, s).map(|e| e.method)
    }
}

/// Inputs for the TOC facade.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TocInputs {
    /// Sonic transit time (µs/ft)
    pub dt: LogValue,
    /// Deep resistivity (ohm·m), must be > 0
    pub rt: LogValue,
    /// Sonic baseline in a non-source interval (µs/ft)
    pub dtbaseline: f64,
    /// log10 of the resistivity baseline
    pub logrtbaseline: f64,
    /// Level of organic metamorphism
    #[serde(default = "default_lom")]
    pub lom: f64,
}

fn default_lom() -> f64 {
    crate::config::get().toc.default_lom
}

impl TocInputs {
    /// Inputs with the configured default LOM (10.6 unless overridden).
    pub fn new(
        dt: impl Into<LogValue>,
        rt: impl Into<LogValue>,
        dtbaseline: f64,
        logrtbaseline: f64,
    ) -> Self {
        Self {
            dt: dt.into(),
            rt: rt.into(),
            dtbaseline,
            logrtbaseline,
            lom: default_lom(),
        }
    }

    pub fn with_lom(mut self, lom: f64) -> Self {
        self.lom = lom;
        self
    }
}

/// Compute TOC (weight %) with the method registered under `method`.
pub fn calculate_toc(inputs: &TocInputs, method: &str) -> Result<Computed, PetroError> {
    calculate_toc_with(inputs, method.parse()?)
}

/// Typed twin of [`calculate_toc`].
pub fn calculate_toc_with(inputs: &TocInputs, method: TocMethod) -> Result<Computed, PetroError> {
    let policy = crate::config::get().toc.policy;
    let out = match method {
        TocMethod::Passey => passey(
            &inputs.dt,
            &inputs.rt,
            inputs.dtbaseline,
            inputs.logrtbaseline,
            inputs.lom,
            policy,
        )?,
    };
    log_outcome("toc", method.name(), &out);
    Ok(out)
}

/// Passey ΔlogR total organic carbon.
///
/// Formula:
/// - ΔlogR = log10(Rt) − log10(Rt,baseline) + 0.02 × (Δt − Δt,baseline)
/// - TOC = ΔlogR × 10^(2.297 − 0.1688 × LOM)
///
/// Results are bounded to [0, 100]. Rt <= 0 has no logarithm: the sample is
/// flagged and set to 0.
///
/// Reference: Passey, Q.R., Moretti, F.U., Stroud, J.D. (1990). A practical
/// model for organic richness from porosity and resistivity logs. AAPG
/// Bulletin 74, 1777-1794.
pub fn passey(
    dt: &LogValue,
    rt: &LogValue,
    dtbaseline: f64,
    logrtbaseline: f64,
    lom: f64,
    policy: RangePolicy,
) -> Result<Computed, PetroError> {
    let scale = 10f64.powf(PASSEY_A - PASSEY_B * lom);

    evaluate([("dt", dt), ("rt", rt)], |out, i, [dt, rt]| {
        if rt <= 0.0 {
            out.push_warning(
                i,
                WarningKind::NonPositiveInput,
                format!("rt = {rt} has no logarithm; TOC set to {TOC_MIN_PERCENT}"),
            );
            return TOC_MIN_PERCENT;
        }
        let dlogr = (rt.log10() - logrtbaseline) + PASSEY_SONIC_SCALE * (dt - dtbaseline);
        bounded(out, i, dlogr * scale, Bounds::TOC_PERCENT, policy, "toc")
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_passey_reference_value() {
        let out = passey(&vec![70.0].into(), &vec![10.0].into(), 65.0, 1.0, 10.6, RangePolicy::Clamp).unwrap();
        assert!((out.values[0] - 0.321_899_276).abs() < 1e-6, "got {}", out.values[0]);
        assert!(out.is_clean());
    }

    #[test]
    fn test_passey_negative_clipped_and_flagged() {
        // Resistivity below baseline and fast sonic: ΔlogR < 0
        let out = passey(&60.0.into(), &5.0.into(), 65.0, 1.0, 10.6, RangePolicy::Clamp).unwrap();
        assert_eq!(out.values, vec![0.0]);
        assert!(out.has_warning(WarningKind::OutOfRange));
    }

    #[test]
    fn test_passey_non_positive_resistivity() {
        let out = passey(
            &vec![70.0, 70.0, 70.0].into(),
            &vec![10.0, 0.0, -3.0].into(),
            65.0,
            1.0,
            10.6,
            RangePolicy::Clamp,
        )
        .unwrap();
        assert_eq!(out.values[1], 0.0);
        assert_eq!(out.values[2], 0.0);
        assert!(out.values.iter().all(|v| v.is_finite()));
        let flagged: Vec<usize> = out
            .warnings
            .iter()
            .filter(|w| w.kind == WarningKind::NonPositiveInput)
            .map(|w| w.sample)
            .collect();
        assert_eq!(flagged, vec![1, 2]);
    }

    #[test]
    fn test_passey_upper_clip() {
        let out = passey(&400.0.into(), &1.0e6.into(), 65.0, 0.0, 0.0, RangePolicy::Clamp).unwrap();
        assert_eq!(out.values, vec![100.0]);
    }

    #[test]
    fn test_default_lom() {
        let inputs = TocInputs::new(vec![70.0], vec![10.0], 65.0, 1.0);
        assert_eq!(inputs.lom, 10.6);
        assert_eq!(inputs.clone().with_lom(12.0).lom, 12.0);
    }

    #[test]
    fn test_facade_aliases() {
        let inputs = TocInputs::new(vec![70.0], vec![10.0], 65.0, 1.0);
        let a = calculate_toc(&inputs, "passey").unwrap();
        let b = calculate_toc(&inputs, "dlogr").unwrap();
        assert_eq!(a, b);
        assert!(calculate_toc(&inputs, "schmoker").is_err());
    }

    #[test]
    fn test_inputs_json_lom_default() {
        let inputs: TocInputs =
            serde_json::from_str(r#"{"dt": [70.0], "rt": [10.0], "dtbaseline": 65.0, "logrtbaseline": 1.0}"#).unwrap();
        assert_eq!(inputs.lom, 10.6);
    }
}
