//! Shared data structures for the petrophysics facades
//!
//! - `LogValue`: curve-or-scalar formula input
//! - `Computed`: derived curve plus per-sample diagnostics
//! - `DomainWarning` / `WarningKind`: non-fatal domain problems

mod diagnostics;
mod log_value;

pub use diagnostics::{Computed, DomainWarning, WarningKind};
pub use log_value::LogValue;
