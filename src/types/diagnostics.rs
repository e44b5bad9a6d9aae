//! Per-sample domain diagnostics returned alongside computed curves

use serde::{Deserialize, Serialize};

/// Category of a non-fatal domain problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningKind {
    /// Denominator of the formula was exactly zero; sample set to 0.
    DivisionByZero,
    /// Parameters violate a physical ordering (e.g. matrix density below fluid density).
    InvalidOrdering,
    /// Result fell outside the physical range of the quantity.
    OutOfRange,
    /// An input that must be strictly positive (resistivity, porosity) was not.
    NonPositiveInput,
    /// Result is NaN or infinite, usually from a missing input sample.
    NonFinite,
}

impl std::fmt::Display for WarningKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DivisionByZero => write!(f, "DIVISION_BY_ZERO"),
            Self::InvalidOrdering => write!(f, "INVALID_ORDERING"),
            Self::OutOfRange => write!(f, "OUT_OF_RANGE"),
            Self::NonPositiveInput => write!(f, "NON_POSITIVE_INPUT"),
            Self::NonFinite => write!(f, "NON_FINITE"),
        }
    }
}

/// A flagged sample. The call still produced a value for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainWarning {
    /// Depth index of the affected sample
    pub sample: usize,
    pub kind: WarningKind,
    pub message: String,
}

impl std::fmt::Display for DomainWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] sample {}: {}", self.kind, self.sample, self.message)
    }
}

/// Output of every petrophysics facade: the derived curve plus any
/// domain warnings raised while computing it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Computed {
    pub values: Vec<f64>,
    #[serde(default)]
    pub warnings: Vec<DomainWarning>,
}

impl Computed {
    /// True when no sample was flagged.
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Whether any warning of `kind` was raised.
    pub fn has_warning(&self, kind: WarningKind) -> bool {
        self.warnings.iter().any(|w| w.kind == kind)
    }

    /// Warnings raised for one depth index.
    pub fn warnings_at(&self, sample: usize) -> impl Iterator<Item = &DomainWarning> {
        self.warnings.iter().filter(move |w| w.sample == sample)
    }

    pub(crate) fn push_warning(&mut self, sample: usize, kind: WarningKind, message: impl Into<String>) {
        self.warnings.push(DomainWarning {
            sample,
            kind,
            message: message.into(),
        });
    }
}
