//! Stoneforge: Petrophysical Well-Log Interpretation
//!
//! Derives formation properties from well-log curves with closed-form
//! empirical models, selected by name.
//!
//! ## Architecture
//!
//! - **Petrophysics**: porosity, total organic carbon, shale volume and water
//!   saturation facades over method registries
//! - **Data Replacement**: predicts a missing curve with a fitted regression
//!   model loaded from JSON artifacts
//! - **Config**: `stoneforge.toml` defaults and range policies
//!
//! ```
//! use stoneforge::petrophysics::{porosity, PorosityInputs};
//!
//! let inputs = PorosityInputs::default().rhob(vec![2.40, 2.30]).rhom(2.65).rhof(1.0);
//! let phi = porosity("density", &inputs).unwrap();
//! assert_eq!(phi.len(), 2);
//! assert!(phi.is_clean());
//! ```

pub mod config;
pub mod data_replacement;
pub mod petrophysics;
pub mod registry;
pub mod types;

// Re-export configuration
pub use config::PetroConfig;

// Re-export commonly used types
pub use types::{Computed, DomainWarning, LogValue, WarningKind};

// Re-export facades
pub use data_replacement::{predict, FeatureMatrix, ModelMethod, PredictError, TrainedModel};
pub use petrophysics::{
    calculate_toc, porosity, shale_volume, water_saturation, PetroError, RangePolicy,
};
pub use registry::{MethodEntry, UnknownMethod};
