//! Porosity from density, neutron and sonic logs
//!
//! Methods:
//! - `density`: bulk density against matrix and fluid density
//! - `neutron`: shale-corrected neutron porosity
//! - `neutron-density`: arithmetic or root-mean-square mean of φD and φN
//! - `sonic`: Wyllie time-average
//! - `gaymard`: Gaymard-Poupon gas-corrected neutron-density combination

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::broadcast::evaluate;
use super::range::{bounded, Bounds, RangePolicy, SENTINEL};
use super::{log_outcome, require, PetroError};
use crate::registry::{self, MethodEntry, UnknownMethod};
use crate::types::{Computed, LogValue, WarningKind};

// ============================================================================
// Registry
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PorosityMethod {
    Density,
    Neutron,
    NeutronDensity,
    Sonic,
    Gaymard,
}

pub const POROSITY_METHODS: &[MethodEntry<PorosityMethod>] = &[
    MethodEntry {
        name: "density",
        aliases: &[],
        method: PorosityMethod::Density,
        parameters: &["rhob", "rhom", "rhof"],
    },
    MethodEntry {
        name: "neutron",
        aliases: &[],
        method: PorosityMethod::Neutron,
        parameters: &["nphi", "vsh", "nphi_sh"],
    },
    MethodEntry {
        name: "neutron-density",
        aliases: &[],
        method: PorosityMethod::NeutronDensity,
        parameters: &["phid", "phin", "squared"],
    },
    MethodEntry {
        name: "sonic",
        aliases: &["wyllie"],
        method: PorosityMethod::Sonic,
        parameters: &["dt", "dtma", "dtf"],
    },
    MethodEntry {
        name: "gaymard",
        aliases: &[],
        method: PorosityMethod::Gaymard,
        parameters: &["phid", "phin"],
    },
];

impl PorosityMethod {
    pub fn name(self) -> &'static str {
        registry::name_of(POROSITY_METHODS, self).unwrap_or("unregistered")
    }
}

impl FromStr for PorosityMethod {
    type Err = UnknownMethod;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        registry::lookup("porosity", POROSITY_METHODS, s).map(|e| e.method)
    }
}

impl std::fmt::Display for PorosityMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

// ============================================================================
// Inputs
// ============================================================================

/// Named inputs for every porosity method. Each method reads only its own
/// parameters and ignores the rest.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PorosityInputs {
    /// Bulk density (g/cm³)
    pub rhob: Option<LogValue>,
    /// Matrix density (g/cm³)
    pub rhom: Option<LogValue>,
    /// Pore-fluid density (g/cm³), ~1.0 fresh water, ~1.1 salt mud
    pub rhof: Option<LogValue>,
    /// Neutron log reading (fraction)
    pub nphi: Option<LogValue>,
    /// Shale volume (fraction)
    pub vsh: Option<LogValue>,
    /// Neutron reading in a nearby shale (fraction)
    pub nphi_sh: Option<LogValue>,
    /// Density porosity (fraction)
    pub phid: Option<LogValue>,
    /// Neutron porosity (fraction)
    pub phin: Option<LogValue>,
    /// Root-mean-square instead of arithmetic mean for `neutron-density`
    pub squared: bool,
    /// Sonic transit time (µs/ft)
    pub dt: Option<LogValue>,
    /// Matrix transit time (µs/ft)
    pub dtma: Option<LogValue>,
    /// Fluid transit time (µs/ft)
    pub dtf: Option<LogValue>,
}

impl PorosityInputs {
    pub fn rhob(mut self, v: impl Into<LogValue>) -> Self {
        self.rhob = Some(v.into());
        self
    }

    pub fn rhom(mut self, v: impl Into<LogValue>) -> Self {
        self.rhom = Some(v.into());
        self
    }

    pub fn rhof(mut self, v: impl Into<LogValue>) -> Self {
        self.rhof = Some(v.into());
        self
    }

    pub fn nphi(mut self, v: impl Into<LogValue>) -> Self {
        self.nphi = Some(v.into());
        self
    }

    pub fn vsh(mut self, v: impl Into<LogValue>) -> Self {
        self.vsh = Some(v.into());
        self
    }

    pub fn nphi_sh(mut self, v: impl Into<LogValue>) -> Self {
        self.nphi_sh = Some(v.into());
        self
    }

    pub fn phid(mut self, v: impl Into<LogValue>) -> Self {
        self.phid = Some(v.into());
        self
    }

    pub fn phin(mut self, v: impl Into<LogValue>) -> Self {
        self.phin = Some(v.into());
        self
    }

    pub fn squared(mut self, squared: bool) -> Self {
        self.squared = squared;
        self
    }

    pub fn dt(mut self, v: impl Into<LogValue>) -> Self {
        self.dt = Some(v.into());
        self
    }

    pub fn dtma(mut self, v: impl Into<LogValue>) -> Self {
        self.dtma = Some(v.into());
        self
    }

    pub fn dtf(mut self, v: impl Into<LogValue>) -> Self {
        self.dtf = Some(v.into());
        self
    }
}

// ============================================================================
// Facade
// ============================================================================

/// Compute porosity with the method registered under `method`.
///
/// ```
/// use stoneforge::petrophysics::{porosity, PorosityInputs};
///
/// let inputs = PorosityInputs::default().rhob(vec![2.31, 2.45]).rhom(2.65).rhof(1.0);
/// let phi = porosity("density", &inputs).unwrap();
/// assert_eq!(phi.values.len(), 2);
/// assert!(phi.is_clean());
/// ```
pub fn porosity(method: &str, inputs: &PorosityInputs) -> Result<Computed, PetroError> {
    porosity_with(method.parse()?, inputs)
}

/// Typed twin of [`porosity`].
pub fn porosity_with(method: PorosityMethod, inputs: &PorosityInputs) -> Result<Computed, PetroError> {
    let cfg = &crate::config::get().porosity;
    let name = method.name();

    let out = match method {
        PorosityMethod::Density => density_porosity(
            require(name, "rhob", &inputs.rhob)?,
            require(name, "rhom", &inputs.rhom)?,
            require(name, "rhof", &inputs.rhof)?,
            cfg.density_policy,
        )?,
        PorosityMethod::Neutron => neutron_porosity(
            require(name, "nphi", &inputs.nphi)?,
            require(name, "vsh", &inputs.vsh)?,
            require(name, "nphi_sh", &inputs.nphi_sh)?,
            cfg.policy,
        )?,
        PorosityMethod::NeutronDensity => neutron_density_porosity(
            require(name, "phid", &inputs.phid)?,
            require(name, "phin", &inputs.phin)?,
            inputs.squared,
            cfg.policy,
        )?,
        PorosityMethod::Sonic => sonic_porosity(
            require(name, "dt", &inputs.dt)?,
            require(name, "dtma", &inputs.dtma)?,
            require(name, "dtf", &inputs.dtf)?,
            cfg.policy,
        )?,
        PorosityMethod::Gaymard => gaymard_porosity(
            require(name, "phid", &inputs.phid)?,
            require(name, "phin", &inputs.phin)?,
            cfg.policy,
        )?,
    };

    log_outcome("porosity", name, &out);
    Ok(out)
}

// ============================================================================
// Formulas
// ============================================================================

/// Density porosity.
///
/// Formula: φ = (ρma − ρb) / (ρma − ρf)
///
/// Per sample, in priority order:
/// 1. ρma == ρf: division by zero, value 0
/// 2. ρma < ρf or ρma <= ρb: invalid ordering, value resolved by `policy`
/// 3. φ > 1: out of range, value resolved by `policy`
///
/// Reference: Schön, J. H. (2015). Physical properties of rocks. Elsevier.
pub fn density_porosity(
    rhob: &LogValue,
    rhom: &LogValue,
    rhof: &LogValue,
    policy: RangePolicy,
) -> Result<Computed, PetroError> {
    evaluate(
        [("rhob", rhob), ("rhom", rhom), ("rhof", rhof)],
        |out, i, [rhob, rhom, rhof]| {
            if rhom == rhof {
                out.push_warning(
                    i,
                    WarningKind::DivisionByZero,
                    format!("rhom == rhof ({rhom}) would divide by zero"),
                );
                return SENTINEL;
            }

            let phi = (rhom - rhob) / (rhom - rhof);
            if !phi.is_finite() {
                return bounded(out, i, phi, Bounds::FRACTION, policy, "density porosity");
            }

            if rhom < rhof || rhom <= rhob {
                out.push_warning(
                    i,
                    WarningKind::InvalidOrdering,
                    format!(
                        "rhom must be greater than rhof and rhob (rhob={rhob}, rhom={rhom}, rhof={rhof}); computed {phi:.4} ({policy})"
                    ),
                );
                return policy.resolve(phi, Bounds::FRACTION);
            }

            if (rhom - rhob) > (rhom - rhof) {
                out.push_warning(
                    i,
                    WarningKind::OutOfRange,
                    format!("density porosity {phi:.4} exceeds 1 (rhob < rhof) ({policy})"),
                );
                return policy.resolve(phi, Bounds::FRACTION);
            }

            phi
        },
    )
}

/// Shale-corrected neutron porosity.
///
/// Formula: φ = φN − Vsh × φN,sh
pub fn neutron_porosity(
    nphi: &LogValue,
    vsh: &LogValue,
    nphi_sh: &LogValue,
    policy: RangePolicy,
) -> Result<Computed, PetroError> {
    evaluate(
        [("nphi", nphi), ("vsh", vsh), ("nphi_sh", nphi_sh)],
        |out, i, [nphi, vsh, nphi_sh]| {
            let phi = nphi - vsh * nphi_sh;
            bounded(out, i, phi, Bounds::FRACTION, policy, "neutron porosity")
        },
    )
}

/// Combined neutron-density porosity.
///
/// Formula: φ = (φD + φN) / 2, or φ = √((φD² + φN²) / 2) when `squared`
pub fn neutron_density_porosity(
    phid: &LogValue,
    phin: &LogValue,
    squared: bool,
    policy: RangePolicy,
) -> Result<Computed, PetroError> {
    evaluate([("phid", phid), ("phin", phin)], |out, i, [phid, phin]| {
        let phi = if squared {
            root_mean_square(phid, phin)
        } else {
            (phid + phin) / 2.0
        };
        bounded(out, i, phi, Bounds::FRACTION, policy, "neutron-density porosity")
    })
}

/// Wyllie time-average sonic porosity.
///
/// Formula: φ = (Δt − Δtma) / (Δtf − Δtma)
///
/// Δtf == Δtma is a division by zero and yields 0.
pub fn sonic_porosity(
    dt: &LogValue,
    dtma: &LogValue,
    dtf: &LogValue,
    policy: RangePolicy,
) -> Result<Computed, PetroError> {
    evaluate(
        [("dt", dt), ("dtma", dtma), ("dtf", dtf)],
        |out, i, [dt, dtma, dtf]| {
            if dtf == dtma {
                out.push_warning(
                    i,
                    WarningKind::DivisionByZero,
                    format!("dtf == dtma ({dtf}) would divide by zero"),
                );
                return SENTINEL;
            }
            let phi = (dt - dtma) / (dtf - dtma);
            bounded(out, i, phi, Bounds::FRACTION, policy, "sonic porosity")
        },
    )
}

/// Gaymard-Poupon porosity for gas-bearing intervals.
///
/// Formula: φ = √((φD² + φN²) / 2)
pub fn gaymard_porosity(
    phid: &LogValue,
    phin: &LogValue,
    policy: RangePolicy,
) -> Result<Computed, PetroError> {
    evaluate([("phid", phid), ("phin", phin)], |out, i, [phid, phin]| {
        bounded(out, i, root_mean_square(phid, phin), Bounds::FRACTION, policy, "gaymard porosity")
    })
}

fn root_mean_square(a: f64, b: f64) -> f64 {
    (0.5 * (a * a + b * b)).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn density(rhob: f64, rhom: f64, rhof: f64, policy: RangePolicy) -> Computed {
        density_porosity(&rhob.into(), &rhom.into(), &rhof.into(), policy).unwrap()
    }

    #[test]
    fn test_density_nominal() {
        let out = density(2.31, 2.65, 1.0, RangePolicy::Sentinel);
        assert!((out.values[0] - 0.34 / 1.65).abs() < 1e-12);
        assert!(out.is_clean());
    }

    #[test]
    fn test_density_division_by_zero() {
        let out = density(2.60, 1.10, 1.10, RangePolicy::Propagate);
        assert_eq!(out.values, vec![0.0]);
        assert!(out.has_warning(WarningKind::DivisionByZero));
    }

    #[test]
    fn test_density_invalid_ordering_policies() {
        // rhom <= rhob: φ = (2.0 - 2.2) / (2.0 - 1.0) = -0.2
        let s = density(2.2, 2.0, 1.0, RangePolicy::Sentinel);
        assert_eq!(s.values, vec![0.0]);
        assert!(s.has_warning(WarningKind::InvalidOrdering));

        let p = density(2.2, 2.0, 1.0, RangePolicy::Propagate);
        assert!((p.values[0] + 0.2).abs() < 1e-12);
        assert!(p.has_warning(WarningKind::InvalidOrdering));

        let c = density(2.2, 2.0, 1.0, RangePolicy::Clamp);
        assert_eq!(c.values, vec![0.0]);
    }

    #[test]
    fn test_density_above_one() {
        // rhob below fluid density: φ = (2.65 - 0.8) / 1.65 > 1
        let s = density(0.8, 2.65, 1.0, RangePolicy::Sentinel);
        assert_eq!(s.values, vec![0.0]);
        assert!(s.has_warning(WarningKind::OutOfRange));
        assert!(!s.has_warning(WarningKind::InvalidOrdering));

        let c = density(0.8, 2.65, 1.0, RangePolicy::Clamp);
        assert_eq!(c.values, vec![1.0]);
    }

    #[test]
    fn test_density_curve_flags_only_bad_samples() {
        let out = density_porosity(
            &vec![2.31, 2.80, 2.45].into(),
            &2.65.into(),
            &1.0.into(),
            RangePolicy::Sentinel,
        )
        .unwrap();
        assert_eq!(out.values.len(), 3);
        assert_eq!(out.values[1], 0.0);
        assert_eq!(out.warnings.len(), 1);
        assert_eq!(out.warnings[0].sample, 1);
    }

    #[test]
    fn test_density_nan_sample() {
        let out = density(f64::NAN, 2.65, 1.0, RangePolicy::Sentinel);
        assert!(out.values[0].is_nan());
        assert!(out.has_warning(WarningKind::NonFinite));
    }

    #[test]
    fn test_neutron_shale_correction() {
        let out = neutron_porosity(&0.30.into(), &0.2.into(), &0.4.into(), RangePolicy::Clamp).unwrap();
        assert!((out.values[0] - 0.22).abs() < 1e-12);

        let neg = neutron_porosity(&0.05.into(), &0.5.into(), &0.4.into(), RangePolicy::Clamp).unwrap();
        assert_eq!(neg.values, vec![0.0]);
        assert!(neg.has_warning(WarningKind::OutOfRange));
    }

    #[test]
    fn test_neutron_density_variants() {
        let mean = neutron_density_porosity(&0.2.into(), &0.3.into(), false, RangePolicy::Clamp).unwrap();
        assert!((mean.values[0] - 0.25).abs() < 1e-12);

        let rms = neutron_density_porosity(&0.2.into(), &0.3.into(), true, RangePolicy::Clamp).unwrap();
        assert!((rms.values[0] - 0.065_f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_sonic_wyllie() {
        // (75 - 55.5) / (189 - 55.5)
        let out = sonic_porosity(&75.0.into(), &55.5.into(), &189.0.into(), RangePolicy::Clamp).unwrap();
        assert!((out.values[0] - 19.5 / 133.5).abs() < 1e-12);
        assert!(out.is_clean());
    }

    #[test]
    fn test_sonic_division_by_zero() {
        let out = sonic_porosity(&75.0.into(), &100.0.into(), &100.0.into(), RangePolicy::Clamp).unwrap();
        assert_eq!(out.values, vec![0.0]);
        assert!(out.has_warning(WarningKind::DivisionByZero));
    }

    #[test]
    fn test_gaymard_matches_rms() {
        let out = gaymard_porosity(&0.1.into(), &0.3.into(), RangePolicy::Clamp).unwrap();
        assert!((out.values[0] - 0.05_f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_method_names_roundtrip() {
        for entry in POROSITY_METHODS {
            let parsed: PorosityMethod = entry.name.parse().unwrap();
            assert_eq!(parsed, entry.method);
            assert_eq!(parsed.name(), entry.name);
        }
    }

    #[test]
    fn test_facade_missing_parameter() {
        let inputs = PorosityInputs::default().rhob(2.3).rhom(2.65);
        let err = porosity("density", &inputs).unwrap_err();
        assert_eq!(
            err,
            PetroError::MissingParameter {
                method: "density",
                parameter: "rhof"
            }
        );
    }

    #[test]
    fn test_facade_unknown_method() {
        let err = porosity("bogus", &PorosityInputs::default()).unwrap_err();
        assert!(matches!(err, PetroError::UnknownMethod(ref u) if u.name == "bogus"));
    }

    #[test]
    fn test_facade_shape_mismatch() {
        let inputs = PorosityInputs::default()
            .phid(vec![0.1, 0.2, 0.3])
            .phin(vec![0.1, 0.2]);
        let err = porosity("gaymard", &inputs).unwrap_err();
        assert!(matches!(err, PetroError::ShapeMismatch { expected: 3, found: 2, .. }));
    }

    #[test]
    fn test_inputs_from_json() {
        let inputs: PorosityInputs =
            serde_json::from_str(r#"{"phid": [0.1, 0.2], "phin": 0.3, "squared": true}"#).unwrap();
        assert!(inputs.squared);
        assert_eq!(inputs.phin, Some(LogValue::Scalar(0.3)));
        assert!(inputs.rhob.is_none());
    }
}
