//! Config validation: unknown-key detection with Levenshtein suggestions
//! and physical range checks.
//!
//! Two-pass parse approach: first deserialize raw TOML into `toml::Value`,
//! walk the key tree, compare against known field names, and emit warnings
//! with "did you mean?" suggestions. Then proceed with normal serde
//! deserialization. Warnings never break existing configs.

use std::collections::HashSet;

use super::defaults;

/// A non-fatal config warning (typo, suspicious value).
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    pub field: String,
    pub message: String,
    pub suggestion: Option<String>,
}

impl std::fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)?;
        if let Some(ref s) = self.suggestion {
            write!(f, " (did you mean '{s}'?)")?;
        }
        Ok(())
    }
}

// ============================================================================
// Known Config Keys
// ============================================================================

/// Returns the complete set of valid dotted key paths for PetroConfig.
///
/// Maintained by hand to match the struct hierarchy in petro_config.rs.
pub fn known_config_keys() -> HashSet<&'static str> {
    let keys: &[&str] = &[
        // [porosity]
        "porosity",
        "porosity.density_policy",
        "porosity.policy",
        // [toc]
        "toc",
        "toc.default_lom",
        "toc.policy",
        // [shale_volume]
        "shale_volume",
        "shale_volume.policy",
        // [saturation]
        "saturation",
        "saturation.archie_a",
        "saturation.archie_m",
        "saturation.archie_n",
        "saturation.fertl_alpha",
        "saturation.policy",
        // [prediction]
        "prediction",
        "prediction.model_dir",
    ];
    keys.iter().copied().collect()
}

// ============================================================================
// TOML Key Walking
// ============================================================================

/// Recursively walks a `toml::Value` tree and collects all dotted key paths.
///
/// For example, a table `{ a = { b = 1, c = 2 } }` yields:
/// `["a", "a.b", "a.c"]`
pub fn walk_toml_keys(value: &toml::Value, prefix: &str) -> Vec<String> {
    let mut keys = Vec::new();
    if let Some(table) = value.as_table() {
        for (k, v) in table {
            let path = if prefix.is_empty() {
                k.clone()
            } else {
                format!("{prefix}.{k}")
            };
            keys.push(path.clone());
            if v.is_table() {
                keys.extend(walk_toml_keys(v, &path));
            }
        }
    }
    keys
}

// ============================================================================
// Levenshtein Distance
// ============================================================================

/// Compute the Levenshtein edit distance between two strings.
pub(crate) fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = usize::from(ca != cb);
            curr[j + 1] = (prev[j + 1] + 1)
                .min(curr[j] + 1)
                .min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

/// Suggest the closest known key for an unknown key, if within edit distance 3.
pub fn suggest_correction(unknown: &str, known: &HashSet<&str>) -> Option<String> {
    let mut best: Option<(&str, usize)> = None;
    for &k in known {
        let dist = levenshtein(unknown, k);
        if dist <= 3 {
            match best {
                // Tie-break on the key itself so the result is stable across HashSet orderings
                Some((b, best_dist)) if dist > best_dist || (dist == best_dist && k >= b) => {}
                _ => best = Some((k, dist)),
            }
        }
    }
    best.map(|(k, _)| k.to_string())
}

// ============================================================================
// Unknown Key Validation (entry point)
// ============================================================================

/// Parse a raw TOML string and return warnings for any unknown config keys.
///
/// This does NOT fail on unknown keys, it only warns. Existing configs
/// always continue to work.
pub fn validate_unknown_keys(raw_toml: &str) -> Vec<ValidationWarning> {
    let value: toml::Value = match raw_toml.parse() {
        Ok(v) => v,
        Err(_) => return Vec::new(), // parse errors are handled by serde later
    };

    let known = known_config_keys();
    let found = walk_toml_keys(&value, "");
    let mut warnings = Vec::new();

    for key in &found {
        if !known.contains(key.as_str()) {
            let suggestion = suggest_correction(key, &known);
            let message = format!("Unknown config key '{key}'");
            warnings.push(ValidationWarning {
                field: key.clone(),
                message,
                suggestion,
            });
        }
    }

    warnings
}

// ============================================================================
// Physical Range Validation
// ============================================================================

/// Validate physical ranges on a parsed PetroConfig.
///
/// Returns (errors, warnings). Errors are impossible values that must
/// prevent startup; warnings are suspicious but not fatal.
pub fn validate_physical_ranges(
    config: &super::PetroConfig,
) -> (Vec<String>, Vec<ValidationWarning>) {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    let s = &config.saturation;

    // Cementation exponent: 1.0 (fractured) to 4.0 (vuggy carbonates) covers real rock
    if s.archie_m.is_finite() && s.archie_m > 0.0 && !(1.0..=4.0).contains(&s.archie_m) {
        warnings.push(ValidationWarning {
            field: "saturation.archie_m".to_string(),
            message: format!(
                "archie_m = {:.2} is outside typical range (1.0-4.0)",
                s.archie_m
            ),
            suggestion: None,
        });
    }

    // Saturation exponent above 6 means the formula is being abused
    if s.archie_n > 6.0 {
        errors.push(format!(
            "saturation.archie_n = {:.2} is outside physical range (0-6)",
            s.archie_n
        ));
    }

    if s.fertl_alpha.is_finite()
        && !(defaults::FERTL_ALPHA_MIN..=defaults::FERTL_ALPHA_MAX).contains(&s.fertl_alpha)
    {
        warnings.push(ValidationWarning {
            field: "saturation.fertl_alpha".to_string(),
            message: format!(
                "fertl_alpha = {:.3} is outside published range ({}-{})",
                s.fertl_alpha,
                defaults::FERTL_ALPHA_MIN,
                defaults::FERTL_ALPHA_MAX
            ),
            suggestion: None,
        });
    }

    // LOM: negative maturity is meaningless
    let lom = config.toc.default_lom;
    if lom < 0.0 {
        errors.push(format!("toc.default_lom = {lom:.2} cannot be negative"));
    } else if lom.is_finite()
        && !(defaults::LOM_TYPICAL_MIN..=defaults::LOM_TYPICAL_MAX).contains(&lom)
    {
        warnings.push(ValidationWarning {
            field: "toc.default_lom".to_string(),
            message: format!(
                "default_lom = {:.2} is outside typical range ({}-{})",
                lom,
                defaults::LOM_TYPICAL_MIN,
                defaults::LOM_TYPICAL_MAX
            ),
            suggestion: None,
        });
    }

    (errors, warnings)
}

// ============================================================================
// Tests
// ============================================================================
