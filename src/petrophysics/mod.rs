//! Petrophysics Module
//!
//! Closed-form well-log interpretation formulas behind name-dispatched
//! facades. All math here is deterministic and pure.
//!
//! ## Facades
//! - `porosity()` - density, neutron, neutron-density, sonic, gaymard
//! - `calculate_toc()` - Passey ΔlogR total organic carbon
//! - `shale_volume()` - gamma-ray index and its nonlinear corrections
//! - `water_saturation()` - Archie and shaly-sand models
//!
//! Every facade returns a [`Computed`](crate::types::Computed): the derived
//! curve plus per-sample domain warnings. Structural problems (unknown
//! method, curves of different length, missing parameter) are a
//! [`PetroError`].

pub mod broadcast;
pub mod porosity;
pub mod range;
pub mod shale_volume;
pub mod total_organic_carbon;
pub mod water_saturation;

pub use porosity::{
    density_porosity, gaymard_porosity, neutron_density_porosity, neutron_porosity, porosity,
    porosity_with, sonic_porosity, PorosityInputs, PorosityMethod, POROSITY_METHODS,
};
pub use range::{Bounds, RangePolicy, SENTINEL};
pub use shale_volume::{
    gamma_ray_index, shale_volume, shale_volume_with, ShaleVolumeInputs, ShaleVolumeMethod,
    SHALE_VOLUME_METHODS,
};
pub use total_organic_carbon::{
    calculate_toc, calculate_toc_with, passey, TocInputs, TocMethod, TOC_METHODS,
};
pub use water_saturation::{
    water_saturation, water_saturation_with, SaturationInputs, SaturationMethod,
    SATURATION_METHODS,
};

use thiserror::Error;
use tracing::{debug, warn};

use crate::registry::UnknownMethod;
use crate::types::{Computed, LogValue};

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PetroError {
    #[error(transparent)]
    UnknownMethod(#[from] UnknownMethod),

    #[error("shape mismatch: '{parameter}' has {found} samples but '{reference}' has {expected}")]
    ShapeMismatch {
        parameter: String,
        reference: String,
        expected: usize,
        found: usize,
    },

    #[error("{method} method requires parameter '{parameter}'")]
    MissingParameter {
        method: &'static str,
        parameter: &'static str,
    },
}

/// Unwrap an optional input or report which one the method needed.
pub(crate) fn require<'a>(
    method: &'static str,
    parameter: &'static str,
    value: &'a Option<LogValue>,
) -> Result<&'a LogValue, PetroError> {
    value
        .as_ref()
        .ok_or(PetroError::MissingParameter { method, parameter })
}

/// Mirror a facade result into the tracing stream.
pub(crate) fn log_outcome(quantity: &str, method: &str, out: &Computed) {
    debug!(quantity, method, samples = out.len(), "computed");
    if let Some(first) = out.warnings.first() {
        warn!(
            quantity,
            method,
            flagged = out.warnings.len(),
            samples = out.len(),
            first = %first,
            "domain warnings raised"
        );
    }
}
