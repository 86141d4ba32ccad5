//! Command-line parsing for the SED-fitting preparation pipeline.
//!
//! The goal of this module is to keep **argument parsing** and **command
//! dispatch** separate from the binning/reformatting code.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::domain::FluxUnit;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "sedp", version, about = "SED fitter preparation (binning + catalog priming)")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Prime a full run: reformat the catalog and bin every spectrum.
    Prime(PrimeArgs),
    /// Bin a single raw spectrum into a .spec file.
    Spec(SpecArgs),
    /// Reformat a survey catalog into a .cat file (photometry only).
    Cat(CatArgs),
    /// Generate deterministic synthetic inputs for trying the pipeline.
    Sample(SampleArgs),
}

/// Bin geometry options shared by `prime` and `spec`.
#[derive(Debug, Parser, Clone)]
pub struct BinArgs {
    /// Elementary wavelength steps aggregated into one reported bin.
    #[arg(long, default_value_t = 10)]
    pub bin_size: usize,

    /// Elementary wavelength-grid spacing (Angstroms).
    #[arg(long, default_value_t = 0.5)]
    pub lambda_step: f64,

    /// Lower wavelength bound (Angstroms).
    #[arg(long, default_value_t = 3800.0)]
    pub lambda_min: f64,

    /// Upper wavelength bound (Angstroms).
    #[arg(long, default_value_t = 9000.0)]
    pub lambda_max: f64,
}

/// Options for a full priming run.
#[derive(Debug, Parser)]
pub struct PrimeArgs {
    /// Run identifier; prefixes every output file name.
    #[arg(short = 'r', long)]
    pub run: String,

    /// Survey catalog CSV.
    #[arg(long)]
    pub catalog: PathBuf,

    /// Raw spectrum tables, one per object (stems must end in the objID).
    #[arg(required = true)]
    pub spectra: Vec<PathBuf>,

    /// Output directory for .spec/.cat/manifest files.
    #[arg(short = 'o', long, default_value = ".")]
    pub out_dir: PathBuf,

    /// Source survey flux unit.
    #[arg(long, value_enum, default_value_t = FluxUnit::Nanomaggy)]
    pub flux_unit: FluxUnit,

    /// Fitter parameter template; when given, a per-object .param with a
    /// rewritten CATALOG entry is emitted.
    #[arg(long)]
    pub param: Option<PathBuf>,

    #[command(flatten)]
    pub bins: BinArgs,
}

/// Options for binning one spectrum.
#[derive(Debug, Parser)]
pub struct SpecArgs {
    /// Raw spectrum table.
    pub spectrum: PathBuf,

    /// Output .spec path (default: `<stem>.spec` next to the input).
    #[arg(short = 'o', long)]
    pub out: Option<PathBuf>,

    /// Object identifier override (default: trailing digits of the stem).
    #[arg(long)]
    pub obj_id: Option<u64>,

    #[command(flatten)]
    pub bins: BinArgs,
}

/// Options for reformatting one catalog.
#[derive(Debug, Parser)]
pub struct CatArgs {
    /// Survey catalog CSV.
    pub catalog: PathBuf,

    /// Output .cat path (default: `<stem>.cat` next to the input).
    #[arg(short = 'o', long)]
    pub out: Option<PathBuf>,

    /// Source survey flux unit.
    #[arg(long, value_enum, default_value_t = FluxUnit::Nanomaggy)]
    pub flux_unit: FluxUnit,
}

/// Options for synthetic input generation.
#[derive(Debug, Parser)]
pub struct SampleArgs {
    /// Output directory for generated files.
    #[arg(short = 'o', long, default_value = ".")]
    pub out_dir: PathBuf,

    /// Number of synthetic objects.
    #[arg(short = 'n', long, default_value_t = 4)]
    pub objects: usize,

    /// Random seed.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,
}
