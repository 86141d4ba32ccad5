//! Survey catalog -> fitter catalog conversion.
//!
//! This module turns a heterogeneous photometric catalog into the fitter's
//! fixed schema (`#ID`, `F_*`, `E_*`, `z_spec`, `specObjID`):
//!
//! - only recognized columns survive; everything else is dropped
//! - band columns are matched by pattern, not by a fixed band list, because
//!   different surveys expose different band sets
//! - `E_*` values are inverse variances and become standard errors via
//!   `1/sqrt(iv)`; `F_*` values are plain fluxes and only get unit-scaled
//! - both are converted to microjanskys and rounded to 3 decimals
//!
//! Design goals (mirroring the spectrum side):
//! - **Strict schema** for required columns (clear errors + exit code 2)
//! - **Row/cell-level tolerance**: a malformed numeric cell poisons that
//!   cell (NaN) or that row, never the whole table
//! - **No hidden state**: the flux unit is an explicit argument

use crate::domain::{FitterCatalog, FitterCatalogRow, FluxUnit, RawCatalog};
use crate::error::AppError;

/// Whether a band column holds fluxes or inverse variances.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BandKind {
    Flux,
    Error,
}

/// A row-level problem encountered during reformatting.
///
/// These are collected and reported. An unusable identifier skips the whole
/// row; a malformed numeric cell only poisons that cell (NaN in the output)
/// while the rest of the row and table are still converted.
#[derive(Debug, Clone)]
pub struct RowError {
    /// 1-based data row number (header excluded).
    pub row: usize,
    pub id: Option<String>,
    pub message: String,
}

/// Reformat output: converted rows plus per-row problems.
#[derive(Debug, Clone)]
pub struct ReformatOutput {
    pub catalog: FitterCatalog,
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
}

/// Match a `F_<band>` / `E_<band>` column name.
///
/// The band code is one-or-more characters starting with a letter; the rest
/// may be alphanumeric (e.g. `F_u`, `E_w1`, `F_Ks`).
pub fn band_kind(name: &str) -> Option<BandKind> {
    let kind = match name.as_bytes().first()? {
        b'F' => BandKind::Flux,
        b'E' => BandKind::Error,
        _ => return None,
    };
    let rest = name.get(1..)?.strip_prefix('_')?;
    let mut chars = rest.chars();
    let first = chars.next()?;
    if !first.is_ascii_alphabetic() {
        return None;
    }
    if !chars.all(|c| c.is_ascii_alphanumeric()) {
        return None;
    }
    Some(kind)
}

/// Convert a survey catalog to the fitter schema.
///
/// Fails fast (exit code 2) when `objID`, `specObjID`, or `z_spec` is
/// missing, or when no band columns are recognizable; individual bad rows
/// are collected as `RowError`s instead.
pub fn reformat(table: &RawCatalog, flux_unit: FluxUnit) -> Result<ReformatOutput, AppError> {
    let obj_idx = find_column(table, "objID")?;
    let spec_idx = find_column(table, "specObjID")?;
    let z_idx = find_column(table, "z_spec")?;

    // Band columns in original relative order.
    let bands: Vec<(usize, String, BandKind)> = table
        .columns
        .iter()
        .enumerate()
        .filter_map(|(idx, name)| band_kind(name).map(|kind| (idx, name.clone(), kind)))
        .collect();

    if bands.is_empty() {
        return Err(AppError::new(
            2,
            "No recognizable F_*/E_* photometry columns in catalog.",
        ));
    }

    let factor = flux_unit.conversion_factor();
    let mut rows = Vec::with_capacity(table.rows.len());
    let mut row_errors = Vec::new();

    for (i, cells) in table.rows.iter().enumerate() {
        let row_no = i + 1;

        let id = match cells.get(obj_idx).map(String::as_str).filter(|s| !s.is_empty()) {
            Some(s) => s.to_string(),
            None => {
                row_errors.push(RowError {
                    row: row_no,
                    id: None,
                    message: "Missing `objID` value.".to_string(),
                });
                continue;
            }
        };

        let spec_obj_id = match parse_spec_obj_id(cells.get(spec_idx).map(String::as_str)) {
            Ok(v) => v,
            Err(message) => {
                row_errors.push(RowError {
                    row: row_no,
                    id: Some(id),
                    message,
                });
                continue;
            }
        };

        // Redshift may legitimately be absent (photometry-only object).
        let z_spec = match read_cell(cells.get(z_idx).map(String::as_str)) {
            Cell::Value(v) => v,
            Cell::Missing => f64::NAN,
            Cell::Malformed(raw) => {
                row_errors.push(RowError {
                    row: row_no,
                    id: Some(id.clone()),
                    message: format!("Invalid `z_spec` value '{raw}'."),
                });
                f64::NAN
            }
        };

        let mut band_values = Vec::with_capacity(bands.len());
        for (idx, name, kind) in &bands {
            let raw = match read_cell(cells.get(*idx).map(String::as_str)) {
                Cell::Value(v) => Some(v),
                Cell::Missing => None,
                Cell::Malformed(raw) => {
                    row_errors.push(RowError {
                        row: row_no,
                        id: Some(id.clone()),
                        message: format!("Invalid `{name}` value '{raw}'."),
                    });
                    None
                }
            };
            let value = match (raw, kind) {
                (None, _) => f64::NAN,
                (Some(iv), BandKind::Error) => {
                    // Stored value is an inverse variance; non-positive
                    // inverse variance means the error is undefined.
                    if iv > 0.0 {
                        round3((1.0 / iv.sqrt()) * factor)
                    } else {
                        f64::NAN
                    }
                }
                (Some(v), BandKind::Flux) => round3(v * factor),
            };
            band_values.push(value);
        }

        rows.push(FitterCatalogRow {
            id,
            bands: band_values,
            z_spec,
            spec_obj_id,
        });
    }

    let catalog = FitterCatalog {
        band_columns: bands.into_iter().map(|(_, name, _)| name).collect(),
        rows,
    };

    Ok(ReformatOutput {
        catalog,
        row_errors,
        rows_read: table.rows.len(),
    })
}

fn find_column(table: &RawCatalog, name: &str) -> Result<usize, AppError> {
    table
        .columns
        .iter()
        .position(|c| c == name)
        .ok_or_else(|| AppError::new(2, format!("Missing required catalog column: `{name}`")))
}

/// A numeric cell's three possible states.
enum Cell {
    Value(f64),
    /// Empty (already normalized from `null`) or a serialized NaN.
    Missing,
    /// Non-empty text that does not parse as a number; carries the raw text
    /// so the problem can be surfaced instead of silently reading as
    /// missing.
    Malformed(String),
}

fn read_cell(cell: Option<&str>) -> Cell {
    let Some(s) = cell.map(str::trim) else {
        return Cell::Missing;
    };
    if s.is_empty() {
        return Cell::Missing;
    }
    match s.parse::<f64>() {
        Ok(v) if v.is_nan() => Cell::Missing,
        Ok(v) => Cell::Value(v),
        Err(_) => Cell::Malformed(s.to_string()),
    }
}

fn parse_spec_obj_id(cell: Option<&str>) -> Result<i64, String> {
    let Some(s) = cell.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(0); // no-spectrum sentinel
    };
    if s.eq_ignore_ascii_case("nan") {
        return Ok(0);
    }
    if let Ok(v) = s.parse::<i64>() {
        return Ok(v);
    }
    // Some exports serialize the identifier as a float (e.g. `1.234e18`).
    // Values outside i64 range would saturate under `as`, fabricating an
    // identifier, so they are rejected alongside non-numeric text.
    match s.parse::<f64>() {
        Ok(v) if v.is_nan() => Ok(0),
        Ok(v) if v.is_finite() && v >= i64::MIN as f64 && v < i64::MAX as f64 => Ok(v as i64),
        _ => Err(format!("Invalid `specObjID` value '{s}'.")),
    }
}

fn round3(v: f64) -> f64 {
    (v * 1000.0).round() / 1000.0
}
