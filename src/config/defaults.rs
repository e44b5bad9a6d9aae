//! System-wide default constants.
//!
//! Centralises the published constants and fallback values used by the
//! formulas and the config loader. Grouped by subsystem for easy discovery.

// ============================================================================
// Config Loading
// ============================================================================

/// Environment variable holding an explicit config file path.
pub const CONFIG_ENV_VAR: &str = "STONEFORGE_CONFIG";

/// Config file looked up in the current working directory.
pub const CONFIG_FILE_NAME: &str = "stoneforge.toml";

// ============================================================================
// Physical Ranges
// ============================================================================

/// Lower/upper bound for fractional quantities (porosity, Vsh, Sw).
pub const FRACTION_MIN: f64 = 0.0;
pub const FRACTION_MAX: f64 = 1.0;

/// Lower/upper bound for TOC (weight percent).
pub const TOC_MIN_PERCENT: f64 = 0.0;
pub const TOC_MAX_PERCENT: f64 = 100.0;

// ============================================================================
// Passey ΔlogR
// ============================================================================

/// Default level of organic metamorphism.
pub const DEFAULT_LOM: f64 = 10.6;

/// Sonic scaling: 50 µs/ft per resistivity decade.
pub const PASSEY_SONIC_SCALE: f64 = 0.02;

/// `TOC = ΔlogR × 10^(PASSEY_A − PASSEY_B × LOM)`
pub const PASSEY_A: f64 = 2.297;
pub const PASSEY_B: f64 = 0.1688;

/// LOM range where the Passey calibration is meaningful.
pub const LOM_TYPICAL_MIN: f64 = 6.0;
pub const LOM_TYPICAL_MAX: f64 = 20.0;

// ============================================================================
// Archie / shaly-sand saturation
// ============================================================================

/// Tortuosity factor
pub const ARCHIE_A: f64 = 1.0;

/// Cementation exponent
pub const ARCHIE_M: f64 = 2.0;

/// Saturation exponent
pub const ARCHIE_N: f64 = 2.0;

/// Fertl shale coefficient, published range 0.25-0.35.
pub const FERTL_ALPHA: f64 = 0.3;
pub const FERTL_ALPHA_MIN: f64 = 0.25;
pub const FERTL_ALPHA_MAX: f64 = 0.35;

/// Saturation assigned when an input makes the formula undefined.
pub const WATER_BEARING_SW: f64 = 1.0;

// ============================================================================
// Shale volume
// ============================================================================

/// Larionov Tertiary: `0.083 × (2^(3.7 × IGR) − 1)`
pub const LARIONOV_YOUNG_COEF: f64 = 0.083;
pub const LARIONOV_YOUNG_EXP: f64 = 3.7;

/// Larionov older rocks: `0.33 × (2^(2 × IGR) − 1)`
pub const LARIONOV_OLD_COEF: f64 = 0.33;
pub const LARIONOV_OLD_EXP: f64 = 2.0;

// ============================================================================
// Data Replacement
// ============================================================================

/// Directory searched for model artifacts when none is given.
pub const DEFAULT_MODEL_DIR: &str = ".";
