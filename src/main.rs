//! Stoneforge - petrophysical well-log interpretation
//!
//! Evaluates the library facades on JSON input files and writes the result
//! as JSON on stdout. Logs go to stderr.
//!
//! # Usage
//!
//! ```bash
//! # Density porosity from a JSON file of curves
//! stoneforge porosity --method density --input logs.json
//!
//! # Passey TOC, inputs on stdin
//! cat toc.json | stoneforge toc
//!
//! # Predict a missing curve with a fitted model
//! stoneforge predict --method random_forest_regression --features rows.json --model-dir ./models
//!
//! # List registered methods
//! stoneforge methods
//! ```
//!
//! # Environment Variables
//!
//! - `STONEFORGE_CONFIG`: Path to a `stoneforge.toml` (default: ./stoneforge.toml)
//! - `STONEFORGE_MODEL_DIR`: Model artifact directory for `predict`
//! - `RUST_LOG`: Logging level (default: info)

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use stoneforge::config::{self, PetroConfig};
use stoneforge::data_replacement::{self, FeatureMatrix, MODEL_METHODS};
use stoneforge::petrophysics::{
    self, PorosityInputs, SaturationInputs, ShaleVolumeInputs, TocInputs, POROSITY_METHODS,
    SATURATION_METHODS, SHALE_VOLUME_METHODS, TOC_METHODS,
};
use stoneforge::registry::MethodEntry;
use stoneforge::Computed;

// ============================================================================
// CLI Arguments
// ============================================================================

#[derive(Parser, Debug)]
#[command(name = "stoneforge")]
#[command(about = "Petrophysical well-log interpretation")]
#[command(version)]
struct CliArgs {
    /// Configuration file (overrides ./stoneforge.toml)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pretty: bool,

    /// Exit with an error when any sample raised a domain warning
    #[arg(long, global = true)]
    deny_warnings: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Porosity from density, neutron or sonic logs
    Porosity {
        #[arg(short, long, default_value = "density")]
        method: String,
        /// JSON inputs (stdin when omitted)
        #[arg(short, long)]
        input: Option<PathBuf>,
    },
    /// Total organic carbon (weight %)
    Toc {
        #[arg(short, long, default_value = "passey")]
        method: String,
        #[arg(short, long)]
        input: Option<PathBuf>,
    },
    /// Shale volume from the gamma-ray log
    ShaleVolume {
        #[arg(short, long, default_value = "linear")]
        method: String,
        #[arg(short, long)]
        input: Option<PathBuf>,
    },
    /// Water saturation from resistivity
    WaterSaturation {
        #[arg(short, long, default_value = "archie")]
        method: String,
        #[arg(short, long)]
        input: Option<PathBuf>,
    },
    /// Predict a missing curve with a fitted regression model
    Predict {
        #[arg(short, long, default_value = "linear_regression")]
        method: String,
        /// JSON array of feature rows (stdin when omitted)
        #[arg(short, long)]
        features: Option<PathBuf>,
        /// Directory holding the model artifacts (default: [prediction] model_dir)
        #[arg(long, env = "STONEFORGE_MODEL_DIR")]
        model_dir: Option<PathBuf>,
    },
    /// List registered methods
    Methods {
        #[arg(value_enum)]
        quantity: Option<Quantity>,
    },
    /// Print the effective configuration as TOML
    Config,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum Quantity {
    Porosity,
    Toc,
    ShaleVolume,
    WaterSaturation,
    Predict,
}

// ============================================================================
// Helpers
// ============================================================================

fn read_json<T: DeserializeOwned>(path: Option<&Path>) -> Result<T> {
    let mut raw = String::new();
    match path {
        Some(p) => {
            raw = std::fs::read_to_string(p)
                .with_context(|| format!("Failed to read {}", p.display()))?;
        }
        None => {
            std::io::stdin()
                .read_to_string(&mut raw)
                .context("Failed to read stdin")?;
        }
    }
    let source = path.map_or_else(|| "stdin".to_string(), |p| p.display().to_string());
    serde_json::from_str(&raw).with_context(|| format!("Invalid JSON inputs in {source}"))
}

fn emit<T: Serialize>(value: &T, pretty: bool) -> Result<()> {
    let json = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    }
    .context("Failed to serialize output")?;
    println!("{json}");
    Ok(())
}

fn emit_computed(out: &Computed, args: &CliArgs) -> Result<()> {
    emit(out, args.pretty)?;
    if args.deny_warnings && !out.is_clean() {
        bail!(
            "{} domain warning(s) raised; first: {}",
            out.warnings.len(),
            out.warnings[0]
        );
    }
    Ok(())
}

fn print_registry<M>(quantity: &str, table: &[MethodEntry<M>]) {
    println!("{quantity}:");
    for entry in table {
        let aliases = if entry.aliases.is_empty() {
            String::new()
        } else {
            format!(" (aliases: {})", entry.aliases.join(", "))
        };
        println!(
            "  {:<28} [{}]{aliases}",
            entry.name,
            entry.parameters.join(", ")
        );
    }
}

fn load_config(path: Option<&Path>) -> Result<PetroConfig> {
    match path {
        Some(p) => {
            let cfg = PetroConfig::load_from_file(p)
                .with_context(|| format!("Failed to load config {}", p.display()))?;
            info!("Loaded configuration from {}", p.display());
            Ok(cfg)
        }
        None => Ok(PetroConfig::load()),
    }
}

// ============================================================================
// Main Entry Point
// ============================================================================

fn main() -> Result<()> {
    let args = CliArgs::parse();

    // Initialize logging (stderr keeps stdout for JSON)
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    if args.log_json {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    config::init(load_config(args.config.as_deref())?);

    match &args.command {
        Command::Porosity { method, input } => {
            let inputs: PorosityInputs = read_json(input.as_deref())?;
            let out = petrophysics::porosity(method, &inputs)?;
            emit_computed(&out, &args)?;
        }
        Command::Toc { method, input } => {
            let inputs: TocInputs = read_json(input.as_deref())?;
            let out = petrophysics::calculate_toc(&inputs, method)?;
            emit_computed(&out, &args)?;
        }
        Command::ShaleVolume { method, input } => {
            let inputs: ShaleVolumeInputs = read_json(input.as_deref())?;
            let out = petrophysics::shale_volume(method, &inputs)?;
            emit_computed(&out, &args)?;
        }
        Command::WaterSaturation { method, input } => {
            let inputs: SaturationInputs = read_json(input.as_deref())?;
            let out = petrophysics::water_saturation(method, &inputs)?;
            emit_computed(&out, &args)?;
        }
        Command::Predict {
            method,
            features,
            model_dir,
        } => {
            let matrix: FeatureMatrix = read_json(features.as_deref())?;
            let dir = model_dir
                .clone()
                .unwrap_or_else(data_replacement::default_model_dir);
            let values = data_replacement::predict(&matrix, method, &dir)
                .with_context(|| format!("Prediction with models from {} failed", dir.display()))?;
            if values.iter().any(|v| !v.is_finite()) {
                warn!("Prediction produced non-finite values (missing feature samples?)");
            }
            emit(&values, args.pretty)?;
        }
        Command::Methods { quantity } => {
            let show = |q: Quantity| quantity.map_or(true, |wanted| wanted == q);
            if show(Quantity::Porosity) {
                print_registry("porosity", POROSITY_METHODS);
            }
            if show(Quantity::Toc) {
                print_registry("toc", TOC_METHODS);
            }
            if show(Quantity::ShaleVolume) {
                print_registry("shale-volume", SHALE_VOLUME_METHODS);
            }
            if show(Quantity::WaterSaturation) {
                print_registry("water-saturation", SATURATION_METHODS);
            }
            if show(Quantity::Predict) {
                print_registry("predict", MODEL_METHODS);
            }
        }
        Command::Config => {
            let toml = config::get()
                .to_toml()
                .context("Failed to render configuration")?;
            print!("{toml}");
        }
    }

    Ok(())
}
