//! Shared domain types.
//!
//! These types are intentionally kept lightweight so they can be:
//!
//! - used in-memory while priming objects
//! - written out as fitter input files (`.spec` / `.cat`)
//! - carried through the run manifest

use std::path::PathBuf;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Flux-density unit convention of the source survey.
///
/// SDSS-style catalogs store fluxes in nanomaggies; the fitter expects
/// microjanskys. Surveys already publishing microjanskys pass through
/// unscaled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum FluxUnit {
    /// SDSS nanomaggies; converted to microjanskys via `x * 3.631`.
    Nanomaggy,
    /// Already in the fitter's unit; identity conversion.
    Microjansky,
}

impl FluxUnit {
    /// Multiplicative factor converting a source-survey flux into the
    /// fitter's microjansky convention.
    pub fn conversion_factor(self) -> f64 {
        match self {
            FluxUnit::Nanomaggy => 3.631,
            FluxUnit::Microjansky => 1.0,
        }
    }
}

/// One object's raw spectroscopic observation.
///
/// All three arrays have identical length and `wavelengths` is strictly
/// increasing; `Spectrum::new` enforces both so the binner can rely on them.
#[derive(Debug, Clone)]
pub struct Spectrum {
    /// Source file stem (e.g. `spec-1237648720693755918`), used for output
    /// naming and object identification.
    pub source: String,
    /// Wavelengths in Angstroms, strictly increasing.
    pub wavelengths: Vec<f64>,
    /// Flux samples in the survey's native unit.
    pub flux: Vec<f64>,
    /// Per-sample standard errors (NaN where the archive inverse variance
    /// was non-positive).
    pub flux_error: Vec<f64>,
}

impl Spectrum {
    pub fn new(
        source: impl Into<String>,
        wavelengths: Vec<f64>,
        flux: Vec<f64>,
        flux_error: Vec<f64>,
    ) -> Result<Self, AppError> {
        let source = source.into();
        if wavelengths.is_empty() {
            return Err(AppError::new(
                3,
                format!("Spectrum '{source}' has no samples."),
            ));
        }
        if wavelengths.len() != flux.len() || wavelengths.len() != flux_error.len() {
            return Err(AppError::new(
                2,
                format!(
                    "Spectrum '{source}' has mismatched array lengths: {} wavelengths, {} fluxes, {} errors.",
                    wavelengths.len(),
                    flux.len(),
                    flux_error.len()
                ),
            ));
        }
        if wavelengths.windows(2).any(|w| !(w[0] < w[1])) {
            return Err(AppError::new(
                2,
                format!("Spectrum '{source}' wavelengths are not strictly increasing."),
            ));
        }
        Ok(Self {
            source,
            wavelengths,
            flux,
            flux_error,
        })
    }
}

/// Bin geometry for the spectral binner.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BinningConfig {
    /// Number of elementary wavelength steps grouped into one reported bin.
    pub bin_size: usize,
    /// Elementary wavelength-grid spacing in Angstroms.
    pub lambda_step: f64,
    /// Total wavelength span covered, `(low, high)` in Angstroms.
    pub lambda_range: (f64, f64),
}

impl Default for BinningConfig {
    fn default() -> Self {
        Self {
            bin_size: 10,
            lambda_step: 0.5,
            lambda_range: (3800.0, 9000.0),
        }
    }
}

/// One row of the binned spectrum table.
///
/// There is one row per elementary grid cell; all `bin_size` rows of an
/// aggregated bin share the same `mean_flux` / `total_flux_error`.
#[derive(Debug, Clone, Copy)]
pub struct BinnedSpectrumRow {
    /// Elementary-grid row index (0-based).
    pub bin_index: usize,
    /// Lower wavelength bound of this elementary cell.
    pub wl_low: f64,
    /// Upper wavelength bound of this elementary cell.
    pub wl_high: f64,
    /// Mean flux over the aggregated bin's window; NaN for empty bins.
    pub mean_flux: f64,
    /// Quadrature sum of flux errors over the window; NaN for empty bins.
    pub total_flux_error: f64,
}

/// A survey catalog as read from disk: header names plus raw string cells.
///
/// Cells are kept as text until the reformatter decides, per column, how to
/// interpret them. Missing values (empty or literal `null`) are empty
/// strings.
#[derive(Debug, Clone)]
pub struct RawCatalog {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// A catalog converted to the fitter's schema.
///
/// Output column order is `#ID`, the band columns in their original relative
/// order, `z_spec`, `specObjID`.
#[derive(Debug, Clone)]
pub struct FitterCatalog {
    /// `F_*` / `E_*` column names, original relative order preserved.
    pub band_columns: Vec<String>,
    pub rows: Vec<FitterCatalogRow>,
}

/// One reformatted catalog row.
#[derive(Debug, Clone)]
pub struct FitterCatalogRow {
    /// Object identifier (`#ID` column), kept as text since survey IDs
    /// overflow common integer widths in some archives.
    pub id: String,
    /// Band values parallel to `FitterCatalog::band_columns`; NaN for
    /// missing photometry.
    pub bands: Vec<f64>,
    /// Spectroscopic redshift; NaN when the survey row had none.
    pub z_spec: f64,
    /// Spectroscopic identifier; 0 is the "no spectrum" sentinel.
    pub spec_obj_id: i64,
}

/// A full priming run's configuration as understood by the pipeline.
///
/// This is derived from CLI flags (plus defaults).
#[derive(Debug, Clone)]
pub struct PrimeConfig {
    /// Run identifier; prefixes every output file name.
    pub run_name: String,
    /// Survey catalog CSV path.
    pub catalog_path: PathBuf,
    /// Raw spectrum table paths, one per object.
    pub spectra_paths: Vec<PathBuf>,
    /// Directory receiving `.spec` / `.cat` / manifest outputs.
    pub out_dir: PathBuf,
    /// Source survey flux unit.
    pub flux_unit: FluxUnit,
    /// Bin geometry.
    pub binning: BinningConfig,
    /// Optional fitter parameter template; when present, a per-object
    /// `.param` with a rewritten `CATALOG` entry is emitted.
    pub param_template: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spectrum_rejects_mismatched_lengths() {
        let err = Spectrum::new("x", vec![1.0, 2.0], vec![1.0], vec![1.0, 1.0]);
        assert!(err.is_err());
    }

    #[test]
    fn spectrum_rejects_unsorted_wavelengths() {
        let err = Spectrum::new("x", vec![2.0, 1.0], vec![0.0, 0.0], vec![0.0, 0.0]);
        assert!(err.is_err());
    }

    #[test]
    fn nanomaggy_factor_matches_sdss_convention() {
        assert!((FluxUnit::Nanomaggy.conversion_factor() - 3.631).abs() < 1e-12);
        assert!((FluxUnit::Microjansky.conversion_factor() - 1.0).abs() < 1e-12);
    }
}
