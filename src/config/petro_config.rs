//! Petrophysics Configuration - formula defaults and range policies as TOML values
//!
//! Each struct implements `Default` with the published constants, so a
//! missing config file means textbook behavior.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use super::defaults;
use crate::petrophysics::RangePolicy;

// ============================================================================
// Top-Level Config
// ============================================================================

/// Root configuration.
///
/// Load with `PetroConfig::load()` which searches:
/// 1. `$STONEFORGE_CONFIG` env var
/// 2. `./stoneforge.toml`
/// 3. Built-in defaults
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PetroConfig {
    /// Porosity range handling
    #[serde(default)]
    pub porosity: PorosityConfig,

    /// Passey TOC defaults
    #[serde(default)]
    pub toc: TocConfig,

    /// Shale volume range handling
    #[serde(default)]
    pub shale_volume: ShaleVolumeConfig,

    /// Archie and shaly-sand constants
    #[serde(default)]
    pub saturation: SaturationConfig,

    /// Model artifact location for curve replacement
    #[serde(default)]
    pub prediction: PredictionConfig,
}

impl PetroConfig {
    /// Load configuration using the standard search order:
    /// 1. `$STONEFORGE_CONFIG` environment variable
    /// 2. `./stoneforge.toml` in the current working directory
    /// 3. Built-in defaults
    pub fn load() -> Self {
        // 1. Check env var
        if let Ok(path) = std::env::var(defaults::CONFIG_ENV_VAR) {
            let p = PathBuf::from(&path);
            if p.exists() {
                match Self::load_from_file(&p) {
                    Ok(config) => {
                        info!(path = %p.display(), "Loaded config from {}", defaults::CONFIG_ENV_VAR);
                        return config;
                    }
                    Err(e) => {
                        warn!(path = %p.display(), error = %e, "Failed to load config from {}, falling back", defaults::CONFIG_ENV_VAR);
                    }
                }
            } else {
                warn!(path = %path, "{} points to non-existent file, falling back", defaults::CONFIG_ENV_VAR);
            }
        }

        // 2. Check ./stoneforge.toml
        let local = PathBuf::from(defaults::CONFIG_FILE_NAME);
        if local.exists() {
            match Self::load_from_file(&local) {
                Ok(config) => {
                    info!("Loaded config from ./{}", defaults::CONFIG_FILE_NAME);
                    return config;
                }
                Err(e) => {
                    warn!(error = %e, "Failed to load ./{}, using defaults", defaults::CONFIG_FILE_NAME);
                }
            }
        }

        // 3. Defaults
        info!("No {} found, using built-in defaults", defaults::CONFIG_FILE_NAME);
        Self::default()
    }

    /// Load from a specific TOML file path.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        Self::from_toml_str(&contents).map_err(|e| match e {
            ConfigError::Parse(_, inner) => ConfigError::Parse(path.to_path_buf(), inner),
            other => other,
        })
    }

    /// Parse and validate a TOML document.
    ///
    /// Unknown keys are logged as warnings with "did you mean" suggestions
    /// and never fail the parse.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        for w in super::validation::validate_unknown_keys(contents) {
            warn!("{}", w);
        }

        let config: Self = toml::from_str(contents)
            .map_err(|e| ConfigError::Parse(PathBuf::new(), e))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize the current config to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(ConfigError::Serialize)
    }

    /// Validate constants for physical consistency.
    ///
    /// Rules:
    /// - Archie a, m, n must be finite and > 0
    /// - LOM and Fertl alpha must be finite
    /// - Model directory must not be empty
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors: Vec<String> = Vec::new();

        let s = &self.saturation;
        Self::check_positive(s.archie_a, "saturation.archie_a", &mut errors);
        Self::check_positive(s.archie_m, "saturation.archie_m", &mut errors);
        Self::check_positive(s.archie_n, "saturation.archie_n", &mut errors);
        if !s.fertl_alpha.is_finite() || s.fertl_alpha < 0.0 {
            errors.push(format!(
                "saturation.fertl_alpha = {} must be a finite non-negative number",
                s.fertl_alpha
            ));
        }

        if !self.toc.default_lom.is_finite() {
            errors.push(format!(
                "toc.default_lom = {} must be a finite number",
                self.toc.default_lom
            ));
        }

        if self.prediction.model_dir.as_os_str().is_empty() {
            errors.push("prediction.model_dir must not be empty".to_string());
        }

        // Physical range validation
        let (range_errors, range_warnings) = super::validation::validate_physical_ranges(self);
        errors.extend(range_errors);
        for w in &range_warnings {
            warn!("{}", w);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors))
        }
    }

    fn check_positive(value: f64, name: &str, errors: &mut Vec<String>) {
        // NaN comparisons silently pass; catch them explicitly
        if !value.is_finite() || value <= 0.0 {
            errors.push(format!("{name} = {value} must be a finite number > 0"));
        }
    }
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug)]
pub enum ConfigError {
    Io(PathBuf, std::io::Error),
    Parse(PathBuf, toml::de::Error),
    Serialize(toml::ser::Error),
    Validation(Vec<String>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(path, e) => write!(f, "Config I/O error ({}): {}", path.display(), e),
            ConfigError::Parse(path, e) => {
                write!(f, "Config parse error ({}): {}", path.display(), e)
            }
            ConfigError::Serialize(e) => write!(f, "Config serialization error: {}", e),
            ConfigError::Validation(errors) => {
                writeln!(f, "Config validation failed:")?;
                for e in errors {
                    writeln!(f, "  - {}", e)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Porosity
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PorosityConfig {
    /// Resolution of the density method's invalid-ordering and >1 branches
    #[serde(default = "default_density_policy")]
    pub density_policy: RangePolicy,

    /// Resolution of out-of-range samples for every other porosity method
    #[serde(default)]
    pub policy: RangePolicy,
}

fn default_density_policy() -> RangePolicy {
    RangePolicy::Sentinel
}

impl Default for PorosityConfig {
    fn default() -> Self {
        Self {
            density_policy: default_density_policy(),
            policy: RangePolicy::default(),
        }
    }
}

// ============================================================================
// TOC
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TocConfig {
    /// Level of organic metamorphism used when the caller gives none
    #[serde(default = "default_lom")]
    pub default_lom: f64,

    #[serde(default)]
    pub policy: RangePolicy,
}

fn default_lom() -> f64 {
    defaults::DEFAULT_LOM
}

impl Default for TocConfig {
    fn default() -> Self {
        Self {
            default_lom: default_lom(),
            policy: RangePolicy::default(),
        }
    }
}

// ============================================================================
// Shale Volume
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShaleVolumeConfig {
    #[serde(default)]
    pub policy: RangePolicy,
}

// ============================================================================
// Water Saturation
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaturationConfig {
    /// Tortuosity factor
    #[serde(default = "default_archie_a")]
    pub archie_a: f64,

    /// Cementation exponent
    #[serde(default = "default_archie_m")]
    pub archie_m: f64,

    /// Saturation exponent
    #[serde(default = "default_archie_n")]
    pub archie_n: f64,

    /// Fertl shale coefficient
    #[serde(default = "default_fertl_alpha")]
    pub fertl_alpha: f64,

    #[serde(default)]
    pub policy: RangePolicy,
}

fn default_archie_a() -> f64 {
    defaults::ARCHIE_A
}
fn default_archie_m() -> f64 {
    defaults::ARCHIE_M
}
fn default_archie_n() -> f64 {
    defaults::ARCHIE_N
}
fn default_fertl_alpha() -> f64 {
    defaults::FERTL_ALPHA
}

impl Default for SaturationConfig {
    fn default() -> Self {
        Self {
            archie_a: default_archie_a(),
            archie_m: default_archie_m(),
            archie_n: default_archie_n(),
            fertl_alpha: default_fertl_alpha(),
            policy: RangePolicy::default(),
        }
    }
}

// ============================================================================
// Prediction
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionConfig {
    /// Directory holding `*_fit_property.json` artifacts
    #[serde(default = "default_model_dir")]
    pub model_dir: PathBuf,
}

fn default_model_dir() -> PathBuf {
    PathBuf::from(defaults::DEFAULT_MODEL_DIR)
}

impl Default for PredictionConfig {
    fn default() -> Self {
        Self {
            model_dir: default_model_dir(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        assert!(PetroConfig::default().validate().is_ok());
    }

    #[test]
    fn test_default_policies() {
        let c = PetroConfig::default();
        assert_eq!(c.porosity.density_policy, RangePolicy::Sentinel);
        assert_eq!(c.porosity.policy, RangePolicy::Clamp);
        assert_eq!(c.toc.default_lom, 10.6);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let c = PetroConfig::from_toml_str(
            r#"
[saturation]
archie_m = 1.8

[porosity]
density_policy = "propagate"
"#,
        )
        .unwrap();
        assert_eq!(c.saturation.archie_m, 1.8);
        assert_eq!(c.saturation.archie_n, 2.0);
        assert_eq!(c.porosity.density_policy, RangePolicy::Propagate);
        assert_eq!(c.porosity.policy, RangePolicy::Clamp);
    }

    #[test]
    fn test_zero_cementation_rejected() {
        let err = PetroConfig::from_toml_str("[saturation]\narchie_m = 0.0\n").unwrap_err();
        match err {
            ConfigError::Validation(errors) => {
                assert!(errors.iter().any(|e| e.contains("archie_m")));
            }
            other => panic!("expected validation error, got {other}"),
        }
    }

    #[test]
    fn test_bad_policy_is_parse_error() {
        let err = PetroConfig::from_toml_str("[toc]\npolicy = \"ignore\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_, _)));
    }

    #[test]
    fn test_toml_roundtrip() {
        let c = PetroConfig::default();
        let s = c.to_toml().unwrap();
        let back = PetroConfig::from_toml_str(&s).unwrap();
        assert_eq!(c, back);
    }
}
