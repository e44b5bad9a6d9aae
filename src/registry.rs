//! Method registries: name -> closed method enum lookup tables
//!
//! Each derived quantity exposes a `const` slice of [`MethodEntry`]. The
//! tables are fixed at compile time, so lookups need no locking and the
//! set of methods can only grow by adding an enum variant, which forces every
//! dispatch `match` to handle it.

use crate::config::validation::levenshtein;

/// One registered calculation method.
#[derive(Debug, Clone, Copy)]
pub struct MethodEntry<M> {
    /// Canonical method key
    pub name: &'static str,
    /// Accepted alternate spellings
    pub aliases: &'static [&'static str],
    pub method: M,
    /// Input names the method reads
    pub parameters: &'static [&'static str],
}

/// Requested method key is not in the registry for that quantity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownMethod {
    pub quantity: &'static str,
    pub name: String,
    pub expected: Vec<&'static str>,
    pub suggestion: Option<&'static str>,
}

impl std::fmt::Display for UnknownMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "unknown {} method '{}' (expected one of: {})",
            self.quantity,
            self.name,
            self.expected.join(", ")
        )?;
        if let Some(s) = self.suggestion {
            write!(f, "; did you mean '{s}'?")?;
        }
        Ok(())
    }
}

impl std::error::Error for UnknownMethod {}

/// Resolve `name` against a registry table.
///
/// Matching ignores ASCII case and treats `_` and `-` as the same character,
/// so `neutron_density` finds `neutron-density`.
pub fn lookup<M: Copy>(
    quantity: &'static str,
    table: &'static [MethodEntry<M>],
    name: &str,
) -> Result<&'static MethodEntry<M>, UnknownMethod> {
    let wanted = normalize(name);
    table
        .iter()
        .find(|e| {
            normalize(e.name) == wanted || e.aliases.iter().any(|a| normalize(a) == wanted)
        })
        .ok_or_else(|| UnknownMethod {
            quantity,
            name: name.to_string(),
            expected: table.iter().map(|e| e.name).collect(),
            suggestion: closest(table, &wanted),
        })
}

/// Canonical key of a method variant, if registered.
pub fn name_of<M: Copy + PartialEq>(table: &'static [MethodEntry<M>], method: M) -> Option<&'static str> {
    table.iter().find(|e| e.method == method).map(|e| e.name)
}

fn normalize(name: &str) -> String {
    name.trim().to_ascii_lowercase().replace('_', "-")
}

fn closest<M>(table: &'static [MethodEntry<M>], wanted: &str) -> Option<&'static str> {
    table
        .iter()
        .map(|e| (e.name, levenshtein(wanted, &normalize(e.name))))
        .filter(|(_, d)| *d <= 3)
        .min_by_key(|(_, d)| *d)
        .map(|(n, _)| n)
}
