//! CSV ingest for raw spectra and survey catalogs.
//!
//! This module turns externally retrieved tables into validated in-memory
//! records:
//!
//! - raw spectrum tables carry `loglam` / `flux` / `ivar` columns (the
//!   archive convention); wavelengths come out in Angstroms via `10^loglam`
//!   and errors via `1/sqrt(ivar)`
//! - survey catalogs are read as raw text cells; interpretation is the
//!   reformatter's job
//!
//! Design goals:
//! - **Strict schema** for required columns (clear errors + exit code 2)
//! - **Deterministic behavior** (no hidden randomness, no cwd dependence)
//! - **Separation of concerns**: no binning or unit logic here beyond the
//!   archive-mandated derivations above

use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

use csv::StringRecord;

use crate::domain::{RawCatalog, Spectrum};
use crate::error::AppError;

/// Read one object's raw spectrum table.
pub fn read_spectrum(path: &Path) -> Result<Spectrum, AppError> {
    let file = File::open(path).map_err(|e| {
        AppError::new(2, format!("Failed to open spectrum '{}': {e}", path.display()))
    })?;

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(file);

    let headers = reader
        .headers()
        .map_err(|e| AppError::new(2, format!("Failed to read spectrum headers: {e}")))?
        .clone();
    let header_map = build_header_map(&headers);

    for name in ["loglam", "flux", "ivar"] {
        if !header_map.contains_key(name) {
            return Err(AppError::new(
                2,
                format!(
                    "Spectrum '{}' is missing required column: `{name}`",
                    path.display()
                ),
            ));
        }
    }

    let mut wavelengths = Vec::new();
    let mut flux = Vec::new();
    let mut flux_error = Vec::new();

    for (idx, result) in reader.records().enumerate() {
        // +2: records() starts after the header and lines are 1-based.
        let line = idx + 2;
        let record = result.map_err(|e| {
            AppError::new(
                2,
                format!("Spectrum '{}' line {line}: CSV parse error: {e}", path.display()),
            )
        })?;

        let loglam = parse_field(&record, &header_map, "loglam", path, line)?;
        let f = parse_field(&record, &header_map, "flux", path, line)?;
        let ivar = parse_field(&record, &header_map, "ivar", path, line)?;

        // Archives store log10 wavelength; convert to Angstroms.
        wavelengths.push(10f64.powf(loglam));
        flux.push(f);
        // Inverse variance must be positive for the error to exist.
        flux_error.push(if ivar > 0.0 { 1.0 / ivar.sqrt() } else { f64::NAN });
    }

    Spectrum::new(source_stem(path), wavelengths, flux, flux_error)
}

/// Read a survey catalog into raw text cells.
///
/// Header names are kept verbatim (the reformatter matches them
/// case-sensitively); the literal `null` used by some query services reads
/// as a missing value.
pub fn read_catalog(path: &Path) -> Result<RawCatalog, AppError> {
    let file = File::open(path).map_err(|e| {
        AppError::new(2, format!("Failed to open catalog '{}': {e}", path.display()))
    })?;

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(file);

    let columns: Vec<String> = reader
        .headers()
        .map_err(|e| AppError::new(2, format!("Failed to read catalog headers: {e}")))?
        .iter()
        .map(clean_header_name)
        .collect();

    let mut rows = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        let line = idx + 2;
        let record = result.map_err(|e| {
            AppError::new(
                2,
                format!("Catalog '{}' line {line}: CSV parse error: {e}", path.display()),
            )
        })?;
        let cells = record
            .iter()
            .map(|s| {
                let s = s.trim();
                if s.eq_ignore_ascii_case("null") {
                    String::new()
                } else {
                    s.to_string()
                }
            })
            .collect();
        rows.push(cells);
    }

    if rows.is_empty() {
        return Err(AppError::new(
            3,
            format!("Catalog '{}' has no data rows.", path.display()),
        ));
    }

    Ok(RawCatalog { columns, rows })
}

/// File stem of a spectrum path, used for output naming.
pub fn source_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}

/// Object identifier encoded in a spectrum file stem.
///
/// Retrieval names spectra after the object they belong to (e.g.
/// `spec-1237648720693755918`); the identifier is the trailing run of
/// digits.
pub fn obj_id_from_stem(stem: &str) -> Option<u64> {
    let digits: String = stem
        .chars()
        .rev()
        .take_while(|c| c.is_ascii_digit())
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();
    if digits.is_empty() {
        return None;
    }
    digits.parse().ok()
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (clean_header_name(name).to_ascii_lowercase(), idx))
        .collect()
}

fn clean_header_name(name: &str) -> String {
    // Excel and other tools sometimes emit UTF-8 CSVs with a BOM prefix on
    // the first header; without stripping it, schema validation incorrectly
    // reports missing columns.
    name.trim().trim_start_matches('\u{feff}').to_string()
}

fn parse_field(
    record: &StringRecord,
    header_map: &HashMap<String, usize>,
    name: &str,
    path: &Path,
    line: usize,
) -> Result<f64, AppError> {
    let idx = header_map[name];
    let raw = record.get(idx).map(str::trim).unwrap_or("");
    raw.parse::<f64>().map_err(|_| {
        AppError::new(
            2,
            format!(
                "Spectrum '{}' line {line}: invalid `{name}` value '{raw}'.",
                path.display()
            ),
        )
    })
}
