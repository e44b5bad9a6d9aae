//! Petrophysics Configuration Module
//!
//! Provides operator-tunable formula defaults and range policies loaded from
//! a TOML file.
//!
//! ## Loading Order
//!
//! 1. `STONEFORGE_CONFIG` environment variable (path to TOML file)
//! 2. `stoneforge.toml` in the current working directory
//! 3. Built-in defaults (published constants)
//!
//! ## Usage
//!
//! Call `config::init()` once at startup, then `config::get()` anywhere:
//!
//! ```ignore
//! // In main():
//! config::init(PetroConfig::load());
//!
//! // Anywhere in the codebase:
//! let lom = config::get().toc.default_lom;
//! ```
//!
//! Library code never requires `init()`: every consumer falls back to
//! `PetroConfig::default()` values while the global is unset.

mod petro_config;
pub mod defaults;
pub mod validation;

pub use petro_config::*;

use std::sync::OnceLock;

/// Global petrophysics configuration, initialized once at startup.
static PETRO_CONFIG: OnceLock<PetroConfig> = OnceLock::new();

/// Initialize the global configuration.
///
/// Only the first call takes effect; later calls are logged and ignored.
pub fn init(config: PetroConfig) {
    if PETRO_CONFIG.set(config).is_err() {
        tracing::warn!("config::init() called more than once, ignoring");
    }
}

/// Get a reference to the global configuration.
///
/// Returns `None` until `init()` has run.
pub fn try_get() -> Option<&'static PetroConfig> {
    PETRO_CONFIG.get()
}

/// Get the global configuration, or the built-in defaults if `init()` has
/// not been called.
pub fn get() -> &'static PetroConfig {
    static FALLBACK: OnceLock<PetroConfig> = OnceLock::new();
    PETRO_CONFIG
        .get()
        .unwrap_or_else(|| FALLBACK.get_or_init(PetroConfig::default))
}

/// Check whether the config has been initialized.
pub fn is_initialized() -> bool {
    PETRO_CONFIG.get().is_some()
}
